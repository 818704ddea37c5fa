//! 仓库管理的 HTTP 处理器

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
    models::warehouse::{CreateWarehouseRequest, UpdateWarehouseRequest},
};

use super::{created, ok, ok_message};

/// 列出仓库
pub async fn list_warehouses(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, AppError> {
    let warehouses = state
        .warehouse_service
        .list(params.include_inactive(), params.limit(), params.offset())
        .await?;
    Ok(ok(warehouses))
}

/// 创建仓库
pub async fn create_warehouse(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Json(req): Json<CreateWarehouseRequest>,
) -> Result<impl IntoResponse, AppError> {
    let warehouse = state.warehouse_service.create(req, auth.user_id).await?;
    Ok(created(warehouse))
}

/// 获取仓库详情
pub async fn get_warehouse(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let warehouse = state.warehouse_service.get(id).await?;
    Ok(ok(warehouse))
}

/// 更新仓库
pub async fn update_warehouse(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateWarehouseRequest>,
) -> Result<impl IntoResponse, AppError> {
    let warehouse = state
        .warehouse_service
        .update(id, req, auth.user_id)
        .await?;
    Ok(ok(warehouse))
}

/// 停用仓库（软删除）
pub async fn delete_warehouse(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    state.warehouse_service.delete(id, auth.user_id).await?;
    Ok(ok_message("Warehouse deactivated"))
}
