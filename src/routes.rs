//! 路由注册
//! 创建所有 API 路由并应用中间件

use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
};

use crate::{handlers, middleware::AppState};

/// 请求体上限
const BODY_LIMIT_BYTES: usize = 1024 * 1024;

/// 创建应用路由
pub fn create_router(state: Arc<AppState>) -> Router {
    // 公开端点（健康检查）
    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check));

    // 认证路由（无需令牌）
    let auth_routes = Router::new().route("/api/v1/auth/login", post(handlers::auth::login));

    // 需要认证的路由
    let authenticated_routes = Router::new()
        // 当前用户信息
        .route("/api/v1/auth/me", get(handlers::auth::get_current_user))

        // 商品
        .route(
            "/api/v1/products",
            get(handlers::product::list_products)
                .post(handlers::product::create_product)
        )
        .route(
            "/api/v1/products/low-stock",
            get(handlers::product::list_low_stock_products)
        )
        .route(
            "/api/v1/products/{id}",
            get(handlers::product::get_product)
                .put(handlers::product::update_product)
                .delete(handlers::product::delete_product)
        )

        // 供应商
        .route(
            "/api/v1/suppliers",
            get(handlers::supplier::list_suppliers)
                .post(handlers::supplier::create_supplier)
        )
        .route(
            "/api/v1/suppliers/{id}",
            get(handlers::supplier::get_supplier)
                .put(handlers::supplier::update_supplier)
                .delete(handlers::supplier::delete_supplier)
        )

        // 仓库
        .route(
            "/api/v1/warehouses",
            get(handlers::warehouse::list_warehouses)
                .post(handlers::warehouse::create_warehouse)
        )
        .route(
            "/api/v1/warehouses/{id}",
            get(handlers::warehouse::get_warehouse)
                .put(handlers::warehouse::update_warehouse)
                .delete(handlers::warehouse::delete_warehouse)
        )

        // 用户管理（仅限管理员）
        .route(
            "/api/v1/users",
            get(handlers::user::list_users)
                .post(handlers::user::create_user)
        )
        .route(
            "/api/v1/users/{id}",
            get(handlers::user::get_user)
                .put(handlers::user::update_user)
                .delete(handlers::user::delete_user)
        )

        // 库存移动
        .route(
            "/api/v1/movements",
            get(handlers::movement::list_movements)
                .post(handlers::movement::create_movement)
        )

        // 采购单
        .route(
            "/api/v1/orders",
            get(handlers::order::list_orders)
                .post(handlers::order::create_order)
        )
        .route(
            "/api/v1/orders/{id}",
            get(handlers::order::get_order)
                .put(handlers::order::update_order)
                .delete(handlers::order::delete_order)
        )
        .route(
            "/api/v1/orders/{id}/approve",
            post(handlers::order::approve_order)
        )
        .route(
            "/api/v1/orders/{id}/reject",
            post(handlers::order::reject_order)
        )
        .route(
            "/api/v1/orders/{id}/complete",
            post(handlers::order::complete_order)
        )

        // 审计日志（仅限管理员）
        .route("/api/v1/audit", get(handlers::audit::list_audit_records))
        .layer(axum::middleware::from_fn_with_state(
            state.jwt_service.clone(),
            crate::auth::middleware::jwt_auth_middleware,
        ));

    // 组合所有路由
    Router::new()
        .merge(public_routes)
        .merge(auth_routes)
        .merge(authenticated_routes)
        .layer(CompressionLayer::new())
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT_BYTES))
        .layer(cors_layer(&state.config.security.cors_allow_origin))
        .layer(axum::middleware::from_fn(
            crate::middleware::request_tracking_middleware,
        ))
        .with_state(state)
}

/// 按配置构建 CORS 层
fn cors_layer(allow_origin: &str) -> CorsLayer {
    if allow_origin == "*" {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    match allow_origin.parse::<HeaderValue>() {
        Ok(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods(Any)
            .allow_headers(Any),
        Err(_) => {
            tracing::warn!(origin = %allow_origin, "Invalid CORS origin, cross-origin requests disabled");
            CorsLayer::new()
        }
    }
}
