//! 采购单的 HTTP 处理器

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    auth::middleware::{require_role, AuthContext},
    error::AppError,
    middleware::AppState,
    models::common::ListParams,
    models::order::{
        CreateOrderRequest, OrderResponse, OrderStatus, RejectOrderRequest, UpdateOrderRequest,
    },
    models::user::UserRole,
};

use super::{created, ok, ok_message};

/// 审批与删除允许的角色
const APPROVER_ROLES: &[UserRole] = &[UserRole::Admin, UserRole::EncargadoBodega];

/// 采购单列表过滤
#[derive(Debug, Default, Deserialize)]
pub struct OrderListQuery {
    pub status: Option<OrderStatus>,
    pub supplier_id: Option<Uuid>,
}

/// 列出采购单
pub async fn list_orders(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
    Query(filter): Query<OrderListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let orders = state
        .order_service
        .list(
            filter.status,
            filter.supplier_id,
            params.include_inactive(),
            params.limit(),
            params.offset(),
        )
        .await?;
    let responses: Vec<OrderResponse> = orders.into_iter().map(OrderResponse::from).collect();
    Ok(ok(responses))
}

/// 创建采购单
pub async fn create_order(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Json(req): Json<CreateOrderRequest>,
) -> Result<impl IntoResponse, AppError> {
    let order = state.order_service.create(req, auth.user_id).await?;
    Ok(created(OrderResponse::from(order)))
}

/// 获取采购单详情
pub async fn get_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let order = state.order_service.get(id).await?;
    Ok(ok(OrderResponse::from(order)))
}

/// 修改采购单，仅 pending 状态允许
pub async fn update_order(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateOrderRequest>,
) -> Result<impl IntoResponse, AppError> {
    let order = state.order_service.update(id, req, auth.user_id).await?;
    Ok(ok(OrderResponse::from(order)))
}

/// 批准采购单
pub async fn approve_order(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    require_role(&auth, APPROVER_ROLES)?;

    let order = state.order_service.approve(id, auth.user_id).await?;
    Ok(ok(OrderResponse::from(order)))
}

/// 驳回采购单
pub async fn reject_order(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
    Json(req): Json<RejectOrderRequest>,
) -> Result<impl IntoResponse, AppError> {
    require_role(&auth, APPROVER_ROLES)?;

    let order = state.order_service.reject(id, req, auth.user_id).await?;
    Ok(ok(OrderResponse::from(order)))
}

/// 完成采购单，逐行入库
pub async fn complete_order(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let order = state.order_service.complete(id, auth.user_id).await?;
    Ok(ok(OrderResponse::from(order)))
}

/// 删除采购单，仅 pending 或 rejected 状态允许
pub async fn delete_order(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    require_role(&auth, APPROVER_ROLES)?;

    state.order_service.delete(id, auth.user_id).await?;
    Ok(ok_message("Purchase order deleted"))
}
