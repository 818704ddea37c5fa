//! HTTP 中间件与应用状态

use axum::{
    extract::Request,
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

use crate::{
    auth::jwt::JwtService,
    config::AppConfig,
    error::AppError,
    gateway::TableGateway,
    services::{
        AuditService, AuthService, OrderService, ProductService, StockService, SupplierService,
        UserService, WarehouseService,
    },
};

/// 应用状态，服务以 Arc 共享给各请求
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub gateway: Arc<dyn TableGateway>,
    pub jwt_service: Arc<JwtService>,
    pub audit_service: Arc<AuditService>,
    pub auth_service: Arc<AuthService>,
    pub user_service: Arc<UserService>,
    pub product_service: Arc<ProductService>,
    pub supplier_service: Arc<SupplierService>,
    pub warehouse_service: Arc<WarehouseService>,
    pub stock_service: Arc<StockService>,
    pub order_service: Arc<OrderService>,
}

impl AppState {
    /// 按依赖顺序装配全部服务
    pub fn build(config: Arc<AppConfig>, gateway: Arc<dyn TableGateway>) -> Result<Self, AppError> {
        let jwt_service = Arc::new(JwtService::from_config(&config)?);
        let audit_service = Arc::new(AuditService::new(gateway.clone()));
        let auth_service = Arc::new(AuthService::new(
            gateway.clone(),
            jwt_service.clone(),
            audit_service.clone(),
        ));
        let user_service = Arc::new(UserService::new(
            gateway.clone(),
            config.clone(),
            audit_service.clone(),
        ));
        let product_service = Arc::new(ProductService::new(
            gateway.clone(),
            audit_service.clone(),
        ));
        let supplier_service = Arc::new(SupplierService::new(
            gateway.clone(),
            audit_service.clone(),
        ));
        let warehouse_service = Arc::new(WarehouseService::new(
            gateway.clone(),
            audit_service.clone(),
        ));
        let stock_service = Arc::new(StockService::new(
            gateway.clone(),
            config.clone(),
            audit_service.clone(),
        ));
        let order_service = Arc::new(OrderService::new(
            gateway.clone(),
            stock_service.clone(),
            audit_service.clone(),
        ));

        Ok(Self {
            config,
            gateway,
            jwt_service,
            audit_service,
            auth_service,
            user_service,
            product_service,
            supplier_service,
            warehouse_service,
            stock_service,
            order_service,
        })
    }
}

/// 请求追踪中间件
/// 为每个请求生成 trace_id 和 request_id，并记录指标
pub async fn request_tracking_middleware(req: Request, next: Next) -> Response {
    let trace_id = extract_or_generate_trace_id(req.headers());
    let request_id = Uuid::new_v4().to_string();

    let method = req.method().to_string();
    let uri = req.uri().to_string();

    let span = tracing::info_span!(
        "http_request",
        trace_id = %trace_id,
        request_id = %request_id,
        method = %method,
        uri = %uri,
    );

    async move {
        let start = Instant::now();

        let response = next.run(req).await;

        let elapsed = start.elapsed();

        // 指标标签使用静态字符串
        let status = response.status().as_u16();
        let method_name = match method.as_str() {
            "GET" => "GET",
            "POST" => "POST",
            "PUT" => "PUT",
            "DELETE" => "DELETE",
            "PATCH" => "PATCH",
            _ => "UNKNOWN",
        };
        let status_code = match status {
            200 => "200",
            201 => "201",
            204 => "204",
            400 => "400",
            401 => "401",
            403 => "403",
            404 => "404",
            409 => "409",
            500 => "500",
            _ => "other",
        };

        metrics::counter!("http_requests_total", "method" => method_name, "status" => status_code)
            .increment(1);
        metrics::histogram!("http_request_duration_seconds").record(elapsed.as_secs_f64());

        tracing::info!(
            method = %method,
            uri = %uri,
            status = status,
            elapsed_ms = elapsed.as_millis(),
            "Request completed"
        );

        let mut response = response;
        if let Ok(value) = trace_id.parse() {
            response.headers_mut().insert("x-trace-id", value);
        }
        if let Ok(value) = request_id.parse() {
            response.headers_mut().insert("x-request-id", value);
        }

        response
    }
    .instrument(span)
    .await
}

/// 从请求头中提取或生成 trace_id
fn extract_or_generate_trace_id(headers: &HeaderMap) -> String {
    headers
        .get("x-trace-id")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_or_generate_trace_id() {
        let mut headers = HeaderMap::new();
        headers.insert("x-trace-id", "test-trace-123".parse().unwrap());

        let trace_id = extract_or_generate_trace_id(&headers);
        assert_eq!(trace_id, "test-trace-123");

        let headers = HeaderMap::new();
        let trace_id = extract_or_generate_trace_id(&headers);
        assert!(!trace_id.is_empty());
        assert_ne!(trace_id, "test-trace-123");
    }
}
