//! 用户管理的 HTTP 处理器
//! 全部操作仅限管理员

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    auth::middleware::{require_role, AuthContext},
    error::AppError,
    middleware::AppState,
    models::common::ListParams,
    models::user::{CreateUserRequest, UpdateUserRequest, UserRole},
};

use super::{created, ok, ok_message};

/// 列出用户
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, AppError> {
    require_role(&auth, &[UserRole::Admin])?;

    let users = state
        .user_service
        .list(params.include_inactive(), params.limit(), params.offset())
        .await?;
    Ok(ok(users))
}

/// 创建用户
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Json(req): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    require_role(&auth, &[UserRole::Admin])?;

    let user = state.user_service.create(req, auth.user_id).await?;
    Ok(created(user))
}

/// 获取用户详情
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    require_role(&auth, &[UserRole::Admin])?;

    let user = state.user_service.get(id).await?;
    Ok(ok(user))
}

/// 更新用户
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    require_role(&auth, &[UserRole::Admin])?;

    let user = state.user_service.update(id, req, auth.user_id).await?;
    Ok(ok(user))
}

/// 停用用户（软删除）
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    require_role(&auth, &[UserRole::Admin])?;

    state.user_service.delete(id, auth.user_id).await?;
    Ok(ok_message("User deactivated"))
}
