//! 用户管理服务

use std::sync::Arc;

use chrono::Utc;
use secrecy::ExposeSecret;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::password::PasswordHasher,
    config::AppConfig,
    error::AppError,
    gateway::{Patch, Table, TableGateway},
    models::{
        common::Lifecycle,
        user::{CreateUserRequest, UpdateUserRequest, User, UserResponse, UserRole},
    },
    repository::UserRepository,
    services::audit_service::{snapshot, AuditAction, AuditService},
};

pub struct UserService {
    gateway: Arc<dyn TableGateway>,
    config: Arc<AppConfig>,
    audit: Arc<AuditService>,
}

impl UserService {
    pub fn new(
        gateway: Arc<dyn TableGateway>,
        config: Arc<AppConfig>,
        audit: Arc<AuditService>,
    ) -> Self {
        Self {
            gateway,
            config,
            audit,
        }
    }

    #[instrument(skip(self, req, actor_id), fields(username = %req.username))]
    pub async fn create(
        &self,
        req: CreateUserRequest,
        actor_id: Uuid,
    ) -> Result<UserResponse, AppError> {
        req.validate()?;
        PasswordHasher::validate_password_policy(&req.password, &self.config)?;

        let hasher = PasswordHasher::new();
        let password_hash = hasher.hash(&req.password)?;

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            username: req.username,
            full_name: req.full_name,
            password_hash,
            role: req.role,
            lifecycle: Lifecycle::Active,
            created_at: now,
            updated_at: now,
        };

        let repo = UserRepository::new(self.gateway.clone());
        let stored = repo.insert(&user).await?;
        let response = UserResponse::from(stored);

        self.audit
            .record(
                actor_id,
                AuditAction::UserCreate,
                Table::Users,
                response.id,
                None,
                snapshot(&response),
            )
            .await;

        info!(user_id = %response.id, "User created");
        Ok(response)
    }

    pub async fn get(&self, id: Uuid) -> Result<UserResponse, AppError> {
        let repo = UserRepository::new(self.gateway.clone());
        let user = repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?;
        Ok(UserResponse::from(user))
    }

    pub async fn list(
        &self,
        include_inactive: bool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<UserResponse>, AppError> {
        let repo = UserRepository::new(self.gateway.clone());
        let users = repo.list(include_inactive, limit, offset).await?;
        Ok(users.into_iter().map(UserResponse::from).collect())
    }

    #[instrument(skip(self, req, actor_id))]
    pub async fn update(
        &self,
        id: Uuid,
        req: UpdateUserRequest,
        actor_id: Uuid,
    ) -> Result<UserResponse, AppError> {
        req.validate()?;

        let repo = UserRepository::new(self.gateway.clone());
        let before = repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?;

        let mut patch = Patch::new();
        if let Some(full_name) = &req.full_name {
            patch = patch.set("full_name", full_name.as_str());
        }
        if let Some(role) = req.role {
            patch = patch.set("role", role.as_str());
        }
        if let Some(password) = &req.password {
            PasswordHasher::validate_password_policy(password, &self.config)?;
            let hasher = PasswordHasher::new();
            patch = patch.set("password_hash", hasher.hash(password)?);
        }

        let updated = repo
            .update(id, patch, Utc::now())
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?;
        let response = UserResponse::from(updated);

        self.audit
            .record(
                actor_id,
                AuditAction::UserUpdate,
                Table::Users,
                id,
                snapshot(&UserResponse::from(before)),
                snapshot(&response),
            )
            .await;

        Ok(response)
    }

    #[instrument(skip(self, actor_id))]
    pub async fn delete(&self, id: Uuid, actor_id: Uuid) -> Result<(), AppError> {
        let repo = UserRepository::new(self.gateway.clone());
        let deleted = repo
            .soft_delete(id, Utc::now())
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?;

        self.audit
            .record(
                actor_id,
                AuditAction::UserDelete,
                Table::Users,
                id,
                snapshot(&UserResponse::from(deleted)),
                None,
            )
            .await;

        info!(user_id = %id, "User deleted");
        Ok(())
    }

    /// 用户表为空时按配置创建首个管理员。已有任何用户（含停用）则跳过
    pub async fn bootstrap_admin(&self) -> Result<Option<UserResponse>, AppError> {
        let (username, password) = match (
            &self.config.security.bootstrap_admin_username,
            &self.config.security.bootstrap_admin_password,
        ) {
            (Some(username), Some(password)) => (username.clone(), password),
            _ => return Ok(None),
        };

        let repo = UserRepository::new(self.gateway.clone());
        if repo.count_all().await? > 0 {
            return Ok(None);
        }

        PasswordHasher::validate_password_policy(password.expose_secret(), &self.config)?;
        let hasher = PasswordHasher::new();
        let password_hash = hasher.hash(password.expose_secret())?;

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            username,
            full_name: None,
            password_hash,
            role: UserRole::Admin,
            lifecycle: Lifecycle::Active,
            created_at: now,
            updated_at: now,
        };

        let stored = repo.insert(&user).await?;
        let response = UserResponse::from(stored);

        self.audit
            .record(
                response.id,
                AuditAction::UserBootstrap,
                Table::Users,
                response.id,
                None,
                snapshot(&response),
            )
            .await;

        info!(user_id = %response.id, username = %response.username, "Bootstrap admin created");
        Ok(Some(response))
    }
}
