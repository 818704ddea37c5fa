//! 测试公共模块
//! 提供测试辅助函数和测试工具

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use inventory_system::{
    auth::password::PasswordHasher,
    config::{
        AppConfig, DatabaseConfig, GatewayConfig, LoggingConfig, SecurityConfig, ServerConfig,
        StockConfig,
    },
    gateway::MemoryGateway,
    middleware::AppState,
    models::common::Lifecycle,
    models::user::{User, UserRole},
    repository::UserRepository,
    routes,
};
use secrecy::Secret;
use serde_json::json;
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

/// 创建测试配置（内存网关，无需数据库）
pub fn create_test_config() -> AppConfig {
    AppConfig {
        server: ServerConfig {
            addr: "127.0.0.1:0".to_string(),
            graceful_shutdown_timeout_secs: 5,
        },
        gateway: GatewayConfig {
            backend: "memory".to_string(),
        },
        database: DatabaseConfig {
            url: Secret::new(String::new()),
            max_connections: 5,
            min_connections: 1,
            acquire_timeout_secs: 5,
            idle_timeout_secs: 300,
            max_lifetime_secs: 1800,
        },
        logging: LoggingConfig {
            level: "debug".to_string(),
            format: "pretty".to_string(),
        },
        security: SecurityConfig {
            jwt_secret: Secret::new("test-secret-key-for-testing-only-min-32-chars".to_string()),
            access_token_exp_secs: 300,
            password_min_length: 8,
            cors_allow_origin: "*".to_string(),
            bootstrap_admin_username: None,
            bootstrap_admin_password: None,
        },
        stock: StockConfig {
            cas_max_retries: 8,
            cas_retry_delay_ms: 1,
        },
    }
}

/// 测试应用：保留网关句柄用于故障注入
pub struct TestApp {
    pub state: Arc<AppState>,
    pub gateway: Arc<MemoryGateway>,
}

/// 创建测试应用状态
pub fn create_test_app() -> TestApp {
    let gateway = Arc::new(MemoryGateway::new());
    let config = Arc::new(create_test_config());
    let state = Arc::new(
        AppState::build(config, gateway.clone()).expect("Failed to build test app state"),
    );
    TestApp { state, gateway }
}

/// 创建测试路由
pub fn create_test_router(app: &TestApp) -> Router {
    routes::create_router(app.state.clone())
}

/// 直接写入一个测试用户
pub async fn create_test_user(
    app: &TestApp,
    username: &str,
    password: &str,
    role: UserRole,
) -> Uuid {
    let hasher = PasswordHasher::new();
    let now = chrono::Utc::now();
    let user = User {
        id: Uuid::new_v4(),
        username: username.to_string(),
        full_name: None,
        password_hash: hasher.hash(password).expect("Failed to hash test password"),
        role,
        lifecycle: Lifecycle::Active,
        created_at: now,
        updated_at: now,
    };
    let user_id = user.id;

    UserRepository::new(app.state.gateway.clone())
        .insert(&user)
        .await
        .expect("Failed to insert test user");

    user_id
}

/// 发送 JSON 请求并解析响应
pub async fn api_request(
    router: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(uri);

    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    let request = match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))
            .expect("Failed to build request"),
        None => builder.body(Body::empty()).expect("Failed to build request"),
    };

    let response = router
        .clone()
        .oneshot(request)
        .await
        .expect("Request failed");

    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to read body")
        .to_bytes();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("Response body is not JSON")
    };

    (status, json)
}

/// 通过登录接口获取访问令牌
pub async fn login(router: &Router, username: &str, password: &str) -> String {
    let (status, body) = api_request(
        router,
        "POST",
        "/api/v1/auth/login",
        None,
        Some(json!({"username": username, "password": password})),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "login failed: {}", body);
    body["data"]["access_token"]
        .as_str()
        .expect("No access token in login response")
        .to_string()
}

/// 常用组合：管理员账号 + 已登录令牌 + 路由
pub async fn admin_context() -> (TestApp, Router, String) {
    let app = create_test_app();
    create_test_user(&app, "admin", "admin-password-1", UserRole::Admin).await;

    let router = create_test_router(&app);
    let token = login(&router, "admin", "admin-password-1").await;

    (app, router, token)
}
