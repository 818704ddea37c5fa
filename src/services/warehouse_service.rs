//! 仓库管理服务

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::AppError,
    gateway::{Table, TableGateway},
    models::{
        common::Lifecycle,
        warehouse::{CreateWarehouseRequest, UpdateWarehouseRequest, Warehouse},
    },
    repository::WarehouseRepository,
    services::audit_service::{snapshot, AuditAction, AuditService},
};

pub struct WarehouseService {
    gateway: Arc<dyn TableGateway>,
    audit: Arc<AuditService>,
}

impl WarehouseService {
    pub fn new(gateway: Arc<dyn TableGateway>, audit: Arc<AuditService>) -> Self {
        Self { gateway, audit }
    }

    #[instrument(skip(self, req, actor_id), fields(name = %req.name))]
    pub async fn create(
        &self,
        req: CreateWarehouseRequest,
        actor_id: Uuid,
    ) -> Result<Warehouse, AppError> {
        req.validate()?;

        let now = Utc::now();
        let warehouse = Warehouse {
            id: Uuid::new_v4(),
            name: req.name,
            location: req.location,
            lifecycle: Lifecycle::Active,
            created_at: now,
            updated_at: now,
        };

        let repo = WarehouseRepository::new(self.gateway.clone());
        let stored = repo.insert(&warehouse).await?;

        self.audit
            .record(
                actor_id,
                AuditAction::WarehouseCreate,
                Table::Warehouses,
                stored.id,
                None,
                snapshot(&stored),
            )
            .await;

        info!(warehouse_id = %stored.id, "Warehouse created");
        Ok(stored)
    }

    pub async fn get(&self, id: Uuid) -> Result<Warehouse, AppError> {
        let repo = WarehouseRepository::new(self.gateway.clone());
        repo.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Warehouse not found"))
    }

    pub async fn list(
        &self,
        include_inactive: bool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Warehouse>, AppError> {
        let repo = WarehouseRepository::new(self.gateway.clone());
        repo.list(include_inactive, limit, offset).await
    }

    #[instrument(skip(self, req, actor_id))]
    pub async fn update(
        &self,
        id: Uuid,
        req: UpdateWarehouseRequest,
        actor_id: Uuid,
    ) -> Result<Warehouse, AppError> {
        req.validate()?;

        let repo = WarehouseRepository::new(self.gateway.clone());
        let before = repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Warehouse not found"))?;

        let updated = repo
            .update(id, &req, Utc::now())
            .await?
            .ok_or_else(|| AppError::not_found("Warehouse not found"))?;

        self.audit
            .record(
                actor_id,
                AuditAction::WarehouseUpdate,
                Table::Warehouses,
                id,
                snapshot(&before),
                snapshot(&updated),
            )
            .await;

        Ok(updated)
    }

    #[instrument(skip(self, actor_id))]
    pub async fn delete(&self, id: Uuid, actor_id: Uuid) -> Result<(), AppError> {
        let repo = WarehouseRepository::new(self.gateway.clone());
        let deleted = repo
            .soft_delete(id, Utc::now())
            .await?
            .ok_or_else(|| AppError::not_found("Warehouse not found"))?;

        self.audit
            .record(
                actor_id,
                AuditAction::WarehouseDelete,
                Table::Warehouses,
                id,
                snapshot(&deleted),
                None,
            )
            .await;

        info!(warehouse_id = %id, "Warehouse deleted");
        Ok(())
    }
}
