//! 商品管理的 HTTP 处理器

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    auth::middleware::AuthContext,
    error::AppError,
    middleware::AppState,
    models::common::ListParams,
    models::product::{CreateProductRequest, UpdateProductRequest},
};

use super::{created, ok, ok_message};

/// 商品列表过滤
#[derive(Debug, Default, Deserialize)]
pub struct ProductListQuery {
    pub supplier_id: Option<Uuid>,
}

/// 列出商品
pub async fn list_products(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
    Query(filter): Query<ProductListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let products = state
        .product_service
        .list(
            filter.supplier_id,
            params.include_inactive(),
            params.limit(),
            params.offset(),
        )
        .await?;
    Ok(ok(products))
}

/// 低库存商品列表
pub async fn list_low_stock_products(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, AppError> {
    let products = state
        .product_service
        .list_low_stock(params.limit(), params.offset())
        .await?;
    Ok(ok(products))
}

/// 创建商品
pub async fn create_product(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Json(req): Json<CreateProductRequest>,
) -> Result<impl IntoResponse, AppError> {
    let product = state.product_service.create(req, auth.user_id).await?;
    Ok(created(product))
}

/// 获取商品详情
pub async fn get_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let product = state.product_service.get(id).await?;
    Ok(ok(product))
}

/// 更新商品
pub async fn update_product(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateProductRequest>,
) -> Result<impl IntoResponse, AppError> {
    let product = state.product_service.update(id, req, auth.user_id).await?;
    Ok(ok(product))
}

/// 停用商品（软删除）
pub async fn delete_product(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    state.product_service.delete(id, auth.user_id).await?;
    Ok(ok_message("Product deactivated"))
}
