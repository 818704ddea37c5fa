//! 供应商管理服务

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
        supplier::{CreateSupplierRequest, Supplier, UpdateSupplierRequest},
    },
    repository::SupplierRepository,
    services::audit_service::{snapshot, AuditAction, AuditService},
};

pub struct SupplierService {
    gateway: Arc<dyn TableGateway>,
    audit: Arc<AuditService>,
}

impl SupplierService {
    pub fn new(gateway: Arc<dyn TableGateway>, audit: Arc<AuditService>) -> Self {
        Self { gateway, audit }
    }

    #[instrument(skip(self, req, actor_id), fields(name = %req.name))]
    pub async fn create(
        &self,
        req: CreateSupplierRequest,
        actor_id: Uuid,
    ) -> Result<Supplier, AppError> {
        req.validate()?;

        let now = Utc::now();
        let supplier = Supplier {
            id: Uuid::new_v4(),
            name: req.name,
            contact_email: req.contact_email,
            phone: req.phone,
            lifecycle: Lifecycle::Active,
            created_at: now,
            updated_at: now,
        };

        let repo = SupplierRepository::new(self.gateway.clone());
        let stored = repo.insert(&supplier).await?;

        self.audit
            .record(
                actor_id,
                AuditAction::SupplierCreate,
                Table::Suppliers,
                stored.id,
                None,
                snapshot(&stored),
            )
            .await;

        info!(supplier_id = %stored.id, "Supplier created");
        Ok(stored)
    }

    pub async fn get(&self, id: Uuid) -> Result<Supplier, AppError> {
        let repo = SupplierRepository::new(self.gateway.clone());
        repo.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Supplier not found"))
    }

    pub async fn list(
        &self,
        include_inactive: bool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Supplier>, AppError> {
        let repo = SupplierRepository::new(self.gateway.clone());
        repo.list(include_inactive, limit, offset).await
    }

    #[instrument(skip(self, req, actor_id))]
    pub async fn update(
        &self,
        id: Uuid,
        req: UpdateSupplierRequest,
        actor_id: Uuid,
    ) -> Result<Supplier, AppError> {
        req.validate()?;

        let repo = SupplierRepository::new(self.gateway.clone());
        let before = repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Supplier not found"))?;

        let updated = repo
            .update(id, &req, Utc::now())
            .await?
            .ok_or_else(|| AppError::not_found("Supplier not found"))?;

        self.audit
            .record(
                actor_id,
                AuditAction::SupplierUpdate,
                Table::Suppliers,
                id,
                snapshot(&before),
                snapshot(&updated),
            )
            .await;

        Ok(updated)
    }

    #[instrument(skip(self, actor_id))]
    pub async fn delete(&self, id: Uuid, actor_id: Uuid) -> Result<(), AppError> {
        let repo = SupplierRepository::new(self.gateway.clone());
        let deleted = repo
            .soft_delete(id, Utc::now())
            .await?
            .ok_or_else(|| AppError::not_found("Supplier not found"))?;

        self.audit
            .record(
                actor_id,
                AuditAction::SupplierDelete,
                Table::Suppliers,
                id,
                snapshot(&deleted),
                None,
            )
            .await;

        info!(supplier_id = %id, "Supplier deleted");
        Ok(())
    }
}
