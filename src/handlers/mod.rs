//! HTTP 处理器模块

pub mod audit;
pub mod auth;
pub mod health;
pub mod movement;
pub mod order;
pub mod product;
pub mod supplier;
pub mod user;
pub mod warehouse;

use axum::{http::StatusCode, Json};
use serde::Serialize;

/// 统一响应信封
/// 成功时 {success: true, data}，失败时由 AppError 产生 {success: false, message}
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// 200 响应
pub fn ok<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        success: true,
        data: Some(data),
        message: None,
    })
}

/// 201 响应
pub fn created<T: Serialize>(data: T) -> (StatusCode, Json<ApiResponse<T>>) {
    (
        StatusCode::CREATED,
        Json(ApiResponse {
            success: true,
            data: Some(data),
            message: None,
        }),
    )
}

/// 无数据的 200 响应，用于删除等操作
pub fn ok_message(message: &str) -> Json<ApiResponse<()>> {
    Json(ApiResponse {
        success: true,
        data: None,
        message: Some(message.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_envelope_shape() {
        let Json(body) = ok(serde_json::json!({"id": 1}));
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value.get("success").unwrap(), true);
        assert!(value.get("data").is_some());
        assert!(value.get("message").is_none());
    }

    #[test]
    fn test_message_envelope_shape() {
        let Json(body) = ok_message("Product deactivated");
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value.get("success").unwrap(), true);
        assert!(value.get("data").is_none());
        assert_eq!(value.get("message").unwrap(), "Product deactivated");
    }
}
