//! JWT 访问令牌的签发与校验

use crate::{config::AppConfig, error::AppError, models::user::{User, UserRole}};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 访问令牌声明
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,

    /// Username
    pub username: String,

    /// User role
    pub role: String,

    /// Issued at
    pub iat: i64,

    /// Expiration
    pub exp: i64,

    /// JWT ID (unique token identifier)
    pub jti: String,
}

impl Claims {
    pub fn user_id(&self) -> Result<Uuid, AppError> {
        Uuid::parse_str(&self.sub).map_err(|_| AppError::Unauthorized)
    }

    pub fn user_role(&self) -> Result<UserRole, AppError> {
        self.role.parse().map_err(|_| AppError::Unauthorized)
    }
}

/// JWT 服务
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_token_exp_secs: u64,
}

impl JwtService {
    /// 从配置构建
    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        let secret = config.security.jwt_secret.expose_secret();

        // HS256 要求密钥不短于 32 字节
        if secret.len() < 32 {
            return Err(AppError::Config(
                "JWT secret too short (min 32 chars)".to_string(),
            ));
        }

        let encoding_key = EncodingKey::from_secret(secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(secret.as_bytes());

        Ok(Self {
            encoding_key,
            decoding_key,
            access_token_exp_secs: config.security.access_token_exp_secs,
        })
    }

    pub fn access_token_exp_secs(&self) -> u64 {
        self.access_token_exp_secs
    }

    /// 为用户签发访问令牌
    pub fn generate_access_token(&self, user: &User) -> Result<String, AppError> {
        let now = Utc::now();
        let expiration = now + Duration::seconds(self.access_token_exp_secs as i64);

        let claims = Claims {
            sub: user.id.to_string(),
            username: user.username.clone(),
            role: user.role.as_str().to_string(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!("Failed to encode access token: {:?}", e);
            AppError::Internal(format!("Failed to encode access token: {}", e))
        })
    }

    /// 校验并解码令牌
    pub fn validate_access_token(&self, token: &str) -> Result<Claims, AppError> {
        Ok(
            decode::<Claims>(token, &self.decoding_key, &Validation::new(Algorithm::HS256))
                .map_err(|e| {
                    tracing::debug!("Token validation failed: {:?}", e);
                    AppError::Unauthorized
                })?
                .claims,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::common::Lifecycle;

    fn test_user(role: UserRole) -> User {
        User {
            id: Uuid::new_v4(),
            username: "testuser".to_string(),
            full_name: None,
            password_hash: "x".to_string(),
            role,
            lifecycle: Lifecycle::Active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn test_service() -> JwtService {
        let config = AppConfig::for_tests();
        JwtService::from_config(&config).unwrap()
    }

    #[test]
    fn test_generate_and_validate_access_token() {
        let service = test_service();
        let user = test_user(UserRole::Admin);

        let token = service.generate_access_token(&user).unwrap();
        let claims = service.validate_access_token(&token).unwrap();

        assert_eq!(claims.sub, user.id.to_string());
        assert_eq!(claims.username, "testuser");
        assert_eq!(claims.role, "admin");
        assert_eq!(claims.user_id().unwrap(), user.id);
        assert_eq!(claims.user_role().unwrap(), UserRole::Admin);
    }

    #[test]
    fn test_role_round_trip() {
        let service = test_service();
        let user = test_user(UserRole::EncargadoBodega);

        let token = service.generate_access_token(&user).unwrap();
        let claims = service.validate_access_token(&token).unwrap();

        assert_eq!(claims.user_role().unwrap(), UserRole::EncargadoBodega);
    }

    #[test]
    fn test_invalid_token_fails() {
        let service = test_service();
        assert!(service.validate_access_token("invalid_token").is_err());
    }

    #[test]
    fn test_short_secret_rejected() {
        let mut config = AppConfig::for_tests();
        config.security.jwt_secret = secrecy::Secret::new("too-short".to_string());
        assert!(JwtService::from_config(&config).is_err());
    }
}
