//! 健康检查 API 集成测试

use axum::http::StatusCode;

mod common;
use common::{api_request, create_test_app, create_test_router};

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_app();
    let router = create_test_router(&app);

    let (status, json) = api_request(&router, "GET", "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
    assert!(json["uptime_secs"].is_number());
}

#[tokio::test]
async fn test_readiness_endpoint() {
    let app = create_test_app();
    let router = create_test_router(&app);

    let (status, json) = api_request(&router, "GET", "/ready", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["ready"], true);
    assert!(json["checks"].is_array());
    assert_eq!(json["checks"][0]["name"], "gateway");
    assert_eq!(json["checks"][0]["status"], "healthy");
}

#[tokio::test]
async fn test_readiness_reports_gateway_failure() {
    let app = create_test_app();
    let router = create_test_router(&app);

    app.gateway.inject_failure(
        inventory_system::gateway::Table::Products,
        inventory_system::gateway::GatewayOp::Ping,
    );

    let (status, json) = api_request(&router, "GET", "/ready", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["ready"], false);
    assert_eq!(json["checks"][0]["status"], "unhealthy");
}

#[tokio::test]
async fn test_not_found_endpoint() {
    let app = create_test_app();
    let router = create_test_router(&app);

    let (status, _) = api_request(&router, "GET", "/nonexistent", None, None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_trace_headers_on_response() {
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    let app = create_test_app();
    let router = create_test_router(&app);

    let response = router
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("x-trace-id", "trace-abc-123")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("x-trace-id").unwrap(),
        "trace-abc-123"
    );
    assert!(response.headers().get("x-request-id").is_some());
}
