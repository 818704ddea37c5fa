//! 供应商管理的 HTTP 处理器

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    auth::middleware::AuthContext,
    error::AppError,
    middleware::AppState,
    models::common::ListParams,
    models::supplier::{CreateSupplierRequest, UpdateSupplierRequest},
};

use super::{created, ok, ok_message};

/// 列出供应商
pub async fn list_suppliers(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, AppError> {
    let suppliers = state
        .supplier_service
        .list(params.include_inactive(), params.limit(), params.offset())
        .await?;
    Ok(ok(suppliers))
}

/// 创建供应商
pub async fn create_supplier(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Json(req): Json<CreateSupplierRequest>,
) -> Result<impl IntoResponse, AppError> {
    let supplier = state.supplier_service.create(req, auth.user_id).await?;
    Ok(created(supplier))
}

/// 获取供应商详情
pub async fn get_supplier(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let supplier = state.supplier_service.get(id).await?;
    Ok(ok(supplier))
}

/// 更新供应商
pub async fn update_supplier(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateSupplierRequest>,
) -> Result<impl IntoResponse, AppError> {
    let supplier = state.supplier_service.update(id, req, auth.user_id).await?;
    Ok(ok(supplier))
}

/// 停用供应商（软删除）
pub async fn delete_supplier(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    state.supplier_service.delete(id, auth.user_id).await?;
    Ok(ok_message("Supplier deactivated"))
}
