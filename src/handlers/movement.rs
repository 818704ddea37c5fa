//! 库存移动的 HTTP 处理器

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

use crate::{
    auth::middleware::AuthContext,
    error::AppError,
    middleware::AppState,
    models::common::ListParams,
    models::movement::{CreateMovementRequest, MovementListFilters},
};

use super::{created, ok};

/// 查询库存移动记录
pub async fn list_movements(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
    Query(filters): Query<MovementListFilters>,
) -> Result<impl IntoResponse, AppError> {
    let movements = state
        .stock_service
        .list_movements(&filters, params.limit(), params.offset())
        .await?;
    Ok(ok(movements))
}

/// 登记库存移动并更新商品库存
pub async fn create_movement(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Json(req): Json<CreateMovementRequest>,
) -> Result<impl IntoResponse, AppError> {
    let movement = state.stock_service.create_movement(req, auth.user_id).await?;
    Ok(created(movement))
}
