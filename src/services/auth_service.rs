//! 认证服务：登录与当前用户查询

use std::sync::Arc;

use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::jwt::JwtService,
    auth::password::PasswordHasher,
    error::AppError,
    gateway::{Table, TableGateway},
    models::user::{LoginRequest, LoginResponse, UserResponse},
    repository::UserRepository,
    services::audit_service::{AuditAction, AuditService},
};

pub struct AuthService {
    gateway: Arc<dyn TableGateway>,
    jwt_service: Arc<JwtService>,
    audit: Arc<AuditService>,
}

impl AuthService {
    pub fn new(
        gateway: Arc<dyn TableGateway>,
        jwt_service: Arc<JwtService>,
        audit: Arc<AuditService>,
    ) -> Self {
        Self {
            gateway,
            jwt_service,
            audit,
        }
    }

    /// 用户登录，密码校验通过后签发访问令牌
    #[instrument(skip(self, req), fields(username = %req.username))]
    pub async fn login(&self, req: LoginRequest) -> Result<LoginResponse, AppError> {
        let users = UserRepository::new(self.gateway.clone());

        // 未知用户与密码错误返回同一错误，不泄露账号是否存在
        let user = users
            .find_by_username(&req.username)
            .await?
            .ok_or_else(|| AppError::authentication("Invalid username or password"))?;

        let hasher = PasswordHasher::new();
        hasher.verify(&req.password, &user.password_hash)?;

        let access_token = self.jwt_service.generate_access_token(&user)?;

        self.audit
            .record(
                user.id,
                AuditAction::UserLogin,
                Table::Users,
                user.id,
                None,
                None,
            )
            .await;

        info!(user_id = %user.id, "User logged in");

        Ok(LoginResponse {
            access_token,
            expires_in: self.jwt_service.access_token_exp_secs(),
            user: UserResponse::from(user),
        })
    }

    /// 令牌对应的当前用户。用户被停用后令牌立即失效
    pub async fn current_user(&self, user_id: Uuid) -> Result<UserResponse, AppError> {
        let users = UserRepository::new(self.gateway.clone());
        let user = users
            .find_by_id(user_id)
            .await?
            .ok_or(AppError::Unauthorized)?;
        Ok(UserResponse::from(user))
    }
}
