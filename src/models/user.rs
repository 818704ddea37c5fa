//! 用户领域模型

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::common::Lifecycle;

/// 用户角色
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// 系统管理员
    Admin,
    /// 仓库负责人
    EncargadoBodega,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::EncargadoBodega => "encargado_bodega",
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(UserRole::Admin),
            "encargado_bodega" => Ok(UserRole::EncargadoBodega),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

/// 用户账号
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub full_name: Option<String>,
    pub password_hash: String,
    pub role: UserRole,
    pub lifecycle: Lifecycle,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 创建用户请求
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 3, max = 64))]
    pub username: String,
    #[validate(length(min = 1, max = 128))]
    pub password: String,
    #[validate(length(max = 200))]
    pub full_name: Option<String>,
    pub role: UserRole,
}

/// 更新用户请求
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(max = 200))]
    pub full_name: Option<String>,
    pub role: Option<UserRole>,
    /// 管理员重置密码
    #[validate(length(min = 1, max = 128))]
    pub password: Option<String>,
}

/// 用户响应（不包含敏感字段）
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub full_name: Option<String>,
    pub role: UserRole,
    pub lifecycle: Lifecycle,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            full_name: user.full_name,
            role: user.role,
            lifecycle: user.lifecycle,
            created_at: user.created_at,
        }
    }
}

/// 登录请求
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// 登录响应
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub expires_in: u64,
    pub user: UserResponse,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serialization() {
        assert_eq!(
            serde_json::to_value(UserRole::Admin).unwrap(),
            serde_json::json!("admin")
        );
        assert_eq!(
            serde_json::to_value(UserRole::EncargadoBodega).unwrap(),
            serde_json::json!("encargado_bodega")
        );
    }

    #[test]
    fn test_role_from_str() {
        assert_eq!("admin".parse::<UserRole>().unwrap(), UserRole::Admin);
        assert_eq!(
            "encargado_bodega".parse::<UserRole>().unwrap(),
            UserRole::EncargadoBodega
        );
        assert!("root".parse::<UserRole>().is_err());
    }

    #[test]
    fn test_user_response_hides_password_hash() {
        let user = User {
            id: Uuid::new_v4(),
            username: "bodeguero".to_string(),
            full_name: None,
            password_hash: "$argon2id$secret".to_string(),
            role: UserRole::EncargadoBodega,
            lifecycle: Lifecycle::Active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let response = serde_json::to_value(UserResponse::from(user)).unwrap();
        assert!(response.get("password_hash").is_none());
        assert_eq!(response.get("username").unwrap(), "bodeguero");
    }
}
