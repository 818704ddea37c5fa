//! 商品目录服务

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
        product::{CreateProductRequest, Product, UpdateProductRequest},
    },
    repository::{ProductRepository, SupplierRepository},
    services::audit_service::{snapshot, AuditAction, AuditService},
};

pub struct ProductService {
    gateway: Arc<dyn TableGateway>,
    audit: Arc<AuditService>,
}

impl ProductService {
    pub fn new(gateway: Arc<dyn TableGateway>, audit: Arc<AuditService>) -> Self {
        Self { gateway, audit }
    }

    /// 创建商品，现有库存从零开始，入库只能走库存移动
    #[instrument(skip(self, req, actor_id), fields(sku = %req.sku))]
    pub async fn create(
        &self,
        req: CreateProductRequest,
        actor_id: Uuid,
    ) -> Result<Product, AppError> {
        req.validate()?;

        if let Some(supplier_id) = req.supplier_id {
            let suppliers = SupplierRepository::new(self.gateway.clone());
            suppliers
                .find_by_id(supplier_id)
                .await?
                .ok_or_else(|| AppError::not_found("Supplier not found"))?;
        }

        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4(),
            name: req.name,
            description: req.description,
            sku: req.sku,
            unit_price: req.unit_price,
            quantity_on_hand: 0,
            min_stock: req.min_stock.unwrap_or(0),
            supplier_id: req.supplier_id,
            lifecycle: Lifecycle::Active,
            created_at: now,
            updated_at: now,
        };

        let repo = ProductRepository::new(self.gateway.clone());
        let stored = repo.insert(&product).await?;

        self.audit
            .record(
                actor_id,
                AuditAction::ProductCreate,
                Table::Products,
                stored.id,
                None,
                snapshot(&stored),
            )
            .await;

        info!(product_id = %stored.id, sku = %stored.sku, "Product created");
        Ok(stored)
    }

    pub async fn get(&self, id: Uuid) -> Result<Product, AppError> {
        let repo = ProductRepository::new(self.gateway.clone());
        repo.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Product not found"))
    }

    pub async fn list(
        &self,
        supplier_id: Option<Uuid>,
        include_inactive: bool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Product>, AppError> {
        let repo = ProductRepository::new(self.gateway.clone());
        repo.list(supplier_id, include_inactive, limit, offset).await
    }

    /// 现有库存不高于阈值的活跃商品
    pub async fn list_low_stock(&self, limit: i64, offset: i64) -> Result<Vec<Product>, AppError> {
        let repo = ProductRepository::new(self.gateway.clone());
        repo.list_low_stock(limit, offset).await
    }

    #[instrument(skip(self, req, actor_id))]
    pub async fn update(
        &self,
        id: Uuid,
        req: UpdateProductRequest,
        actor_id: Uuid,
    ) -> Result<Product, AppError> {
        req.validate()?;

        let repo = ProductRepository::new(self.gateway.clone());
        let before = repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Product not found"))?;

        if let Some(supplier_id) = req.supplier_id {
            let suppliers = SupplierRepository::new(self.gateway.clone());
            suppliers
                .find_by_id(supplier_id)
                .await?
                .ok_or_else(|| AppError::not_found("Supplier not found"))?;
        }

        let updated = repo
            .update(id, &req, Utc::now())
            .await?
            .ok_or_else(|| AppError::not_found("Product not found"))?;

        self.audit
            .record(
                actor_id,
                AuditAction::ProductUpdate,
                Table::Products,
                id,
                snapshot(&before),
                snapshot(&updated),
            )
            .await;

        Ok(updated)
    }

    #[instrument(skip(self, actor_id))]
    pub async fn delete(&self, id: Uuid, actor_id: Uuid) -> Result<(), AppError> {
        let repo = ProductRepository::new(self.gateway.clone());
        let deleted = repo
            .soft_delete(id, Utc::now())
            .await?
            .ok_or_else(|| AppError::not_found("Product not found"))?;

        self.audit
            .record(
                actor_id,
                AuditAction::ProductDelete,
                Table::Products,
                id,
                snapshot(&deleted),
                None,
            )
            .await;

        info!(product_id = %id, "Product deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::MemoryGateway;
    use rust_decimal::Decimal;

    fn create_request(sku: &str) -> CreateProductRequest {
        CreateProductRequest {
            name: "Tornillo 3mm".to_string(),
            description: None,
            sku: sku.to_string(),
            unit_price: Decimal::new(1299, 2),
            min_stock: Some(10),
            supplier_id: None,
        }
    }

    fn setup() -> ProductService {
        let gateway = Arc::new(MemoryGateway::new());
        let audit = Arc::new(AuditService::new(gateway.clone()));
        ProductService::new(gateway, audit)
    }

    #[tokio::test]
    async fn test_create_starts_with_zero_stock() {
        let service = setup();

        let product = service
            .create(create_request("TOR-3MM"), Uuid::new_v4())
            .await
            .unwrap();
        assert_eq!(product.quantity_on_hand, 0);
        assert_eq!(product.min_stock, 10);
    }

    #[tokio::test]
    async fn test_invalid_sku_rejected() {
        let service = setup();

        let err = service
            .create(create_request("tor 3mm"), Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_duplicate_sku_conflicts() {
        let service = setup();

        service
            .create(create_request("TOR-3MM"), Uuid::new_v4())
            .await
            .unwrap();
        let err = service
            .create(create_request("TOR-3MM"), Uuid::new_v4())
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_unknown_supplier_rejected() {
        let service = setup();

        let mut req = create_request("TOR-3MM");
        req.supplier_id = Some(Uuid::new_v4());
        let err = service.create(req, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let service = setup();
        let product = service
            .create(create_request("TOR-3MM"), Uuid::new_v4())
            .await
            .unwrap();

        let updated = service
            .update(
                product.id,
                UpdateProductRequest {
                    name: Some("Tornillo 4mm".to_string()),
                    description: None,
                    sku: None,
                    unit_price: None,
                    min_stock: Some(5),
                    supplier_id: None,
                },
                Uuid::new_v4(),
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "Tornillo 4mm");
        assert_eq!(updated.min_stock, 5);

        service.delete(product.id, Uuid::new_v4()).await.unwrap();
        let err = service.get(product.id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_low_stock_listing() {
        let service = setup();
        let low = service
            .create(create_request("LOW-1"), Uuid::new_v4())
            .await
            .unwrap();
        let mut high_req = create_request("HIGH-1");
        high_req.min_stock = Some(0);
        service.create(high_req, Uuid::new_v4()).await.unwrap();

        // LOW-1: 现有 0 <= 阈值 10；HIGH-1: 0 <= 0 也算低库存
        let listed = service.list_low_stock(50, 0).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert!(listed.iter().any(|p| p.id == low.id));
    }
}
