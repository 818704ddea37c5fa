//! 审计日志的 HTTP 处理器
//! 仅限管理员查询

use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use std::sync::Arc;

use crate::{
    auth::middleware::{require_role, AuthContext},
    error::AppError,
    middleware::AppState,
    models::audit::AuditListFilters,
    models::common::ListParams,
    models::user::UserRole,
};

use super::ok;

/// 查询审计记录
pub async fn list_audit_records(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Query(params): Query<ListParams>,
    Query(filters): Query<AuditListFilters>,
) -> Result<impl IntoResponse, AppError> {
    require_role(&auth, &[UserRole::Admin])?;

    let records = state
        .audit_service
        .list(&filters, params.limit(), params.offset())
        .await?;
    Ok(ok(records))
}
