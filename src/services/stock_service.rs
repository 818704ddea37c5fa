//! 库存台账服务
//! 现有量的读-改-写通过条件更新串行化，竞争失败按配置重试

use std::sync::Arc;

use chrono::Utc;
use tokio::time::{sleep, Duration};
use tracing::{error, info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::{
    config::AppConfig,
    error::AppError,
    gateway::{Table, TableGateway},
    models::movement::{
        CreateMovementRequest, MovementDirection, MovementListFilters, StockMovement,
    },
    repository::{MovementRepository, ProductRepository},
    services::audit_service::{snapshot, AuditAction, AuditService},
};

pub struct StockService {
    gateway: Arc<dyn TableGateway>,
    config: Arc<AppConfig>,
    audit: Arc<AuditService>,
}

impl StockService {
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

    /// 手动库存调整
    #[instrument(skip(self, req, actor_id))]
    pub async fn create_movement(
        &self,
        req: CreateMovementRequest,
        actor_id: Uuid,
    ) -> Result<StockMovement, AppError> {
        req.validate()?;

        let movement = self
            .apply(
                req.product_id,
                req.direction,
                req.quantity,
                None,
                req.reason,
                actor_id,
            )
            .await?;

        self.audit
            .record(
                actor_id,
                AuditAction::StockMovementCreate,
                Table::StockMovements,
                movement.id,
                None,
                snapshot(&movement),
            )
            .await;

        Ok(movement)
    }

    /// 台账核心：条件更新现有量并写入对应的移动记录
    ///
    /// 更新以读到的现有量为前提条件提交，并发修改导致条件不满足时
    /// 重读重试。数量已提交而移动记录写入失败时，回退数量后上抛原错误。
    #[instrument(skip(self, reason, actor_id))]
    pub(crate) async fn apply(
        &self,
        product_id: Uuid,
        direction: MovementDirection,
        quantity: i64,
        order_id: Option<Uuid>,
        reason: Option<String>,
        actor_id: Uuid,
    ) -> Result<StockMovement, AppError> {
        if quantity <= 0 {
            return Err(AppError::validation("Movement quantity must be positive"));
        }

        let products = ProductRepository::new(self.gateway.clone());
        let movements = MovementRepository::new(self.gateway.clone());
        let delta = direction.signed(quantity);

        let max_retries = self.config.stock.cas_max_retries;
        for attempt in 0..max_retries {
            let product = products
                .find_by_id(product_id)
                .await?
                .ok_or_else(|| AppError::not_found("Product not found"))?;

            let current = product.quantity_on_hand;
            let next = current
                .checked_add(delta)
                .ok_or_else(|| AppError::validation("Movement quantity overflows stock counter"))?;
            if next < 0 {
                return Err(AppError::InsufficientStock {
                    available: current,
                    requested: quantity,
                });
            }

            let now = Utc::now();
            if products
                .cas_quantity(product_id, current, next, now)
                .await?
                .is_none()
            {
                // 现有量被并发修改，重读后重试
                metrics::counter!("stock_cas_retries_total").increment(1);
                if attempt + 1 < max_retries {
                    sleep(Duration::from_millis(self.config.stock.cas_retry_delay_ms)).await;
                }
                continue;
            }

            let movement = StockMovement {
                id: Uuid::new_v4(),
                product_id,
                direction,
                quantity,
                quantity_after: next,
                order_id,
                reason,
                actor_id,
                occurred_at: now,
            };

            match movements.insert(&movement).await {
                Ok(stored) => {
                    metrics::counter!("stock_movements_total", "direction" => direction.as_str())
                        .increment(1);
                    info!(
                        product_id = %product_id,
                        direction = direction.as_str(),
                        quantity,
                        quantity_after = next,
                        "Stock movement applied"
                    );
                    return Ok(stored);
                }
                Err(e) => {
                    error!(
                        error = %e,
                        product_id = %product_id,
                        "Movement insert failed after quantity update, reverting quantity"
                    );
                    self.revert_quantity(product_id, delta).await;
                    return Err(e);
                }
            }
        }

        Err(AppError::conflict(
            "Stock update contention, please retry",
        ))
    }

    /// 为一条已落账的移动写入反向移动（冲销）
    pub(crate) async fn reverse(
        &self,
        movement: &StockMovement,
        actor_id: Uuid,
    ) -> Result<StockMovement, AppError> {
        let reversed = self
            .apply(
                movement.product_id,
                movement.direction.reverse(),
                movement.quantity,
                movement.order_id,
                Some(format!("Reversal of movement {}", movement.id)),
                actor_id,
            )
            .await?;

        metrics::counter!("stock_compensations_total").increment(1);
        Ok(reversed)
    }

    /// 仅回退现有量。对应的移动记录从未写入，台账无需冲销
    async fn revert_quantity(&self, product_id: Uuid, delta: i64) {
        let products = ProductRepository::new(self.gateway.clone());
        let max_retries = self.config.stock.cas_max_retries;

        for _ in 0..max_retries {
            let product = match products.find_by_id(product_id).await {
                Ok(Some(p)) => p,
                Ok(None) => {
                    error!(product_id = %product_id, "Product missing while reverting quantity, manual reconciliation required");
                    return;
                }
                Err(e) => {
                    error!(error = %e, product_id = %product_id, "Failed to read product while reverting quantity, manual reconciliation required");
                    return;
                }
            };

            let current = product.quantity_on_hand;
            let next = match current.checked_sub(delta) {
                Some(v) if v >= 0 => v,
                _ => {
                    error!(product_id = %product_id, "Quantity revert not applicable, manual reconciliation required");
                    return;
                }
            };

            match products
                .cas_quantity(product_id, current, next, Utc::now())
                .await
            {
                Ok(Some(_)) => return,
                Ok(None) => {
                    sleep(Duration::from_millis(self.config.stock.cas_retry_delay_ms)).await;
                }
                Err(e) => {
                    error!(error = %e, product_id = %product_id, "Failed to revert quantity, manual reconciliation required");
                    return;
                }
            }
        }

        error!(product_id = %product_id, "Quantity revert exhausted retries, manual reconciliation required");
    }

    /// 查询移动记录
    pub async fn list_movements(
        &self,
        filters: &MovementListFilters,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<StockMovement>, AppError> {
        let repo = MovementRepository::new(self.gateway.clone());
        repo.list(filters, limit, offset).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{GatewayOp, MemoryGateway};
    use crate::models::common::Lifecycle;
    use crate::models::product::Product;
    use rust_decimal::Decimal;

    fn test_product(quantity: i64) -> Product {
        let now = Utc::now();
        Product {
            id: Uuid::new_v4(),
            name: "Widget".to_string(),
            description: None,
            sku: "WID-001".to_string(),
            unit_price: Decimal::new(1050, 2),
            quantity_on_hand: quantity,
            min_stock: 0,
            supplier_id: None,
            lifecycle: Lifecycle::Active,
            created_at: now,
            updated_at: now,
        }
    }

    async fn setup(quantity: i64) -> (Arc<MemoryGateway>, StockService, Uuid) {
        let gateway = Arc::new(MemoryGateway::new());
        let product = test_product(quantity);
        let product_id = product.id;
        ProductRepository::new(gateway.clone())
            .insert(&product)
            .await
            .unwrap();

        let config = Arc::new(AppConfig::for_tests());
        let audit = Arc::new(AuditService::new(gateway.clone()));
        let service = StockService::new(gateway.clone(), config, audit);
        (gateway, service, product_id)
    }

    #[tokio::test]
    async fn test_in_then_out_updates_quantity() {
        let (gateway, service, product_id) = setup(0).await;

        let m1 = service
            .apply(product_id, MovementDirection::In, 10, None, None, Uuid::new_v4())
            .await
            .unwrap();
        assert_eq!(m1.quantity_after, 10);

        let m2 = service
            .apply(product_id, MovementDirection::Out, 3, None, None, Uuid::new_v4())
            .await
            .unwrap();
        assert_eq!(m2.quantity_after, 7);

        let product = ProductRepository::new(gateway)
            .find_by_id(product_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(product.quantity_on_hand, 7);
    }

    #[tokio::test]
    async fn test_overdraw_rejected_quantity_unchanged() {
        let (gateway, service, product_id) = setup(7).await;

        let err = service
            .apply(product_id, MovementDirection::Out, 8, None, None, Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::InsufficientStock {
                available: 7,
                requested: 8
            }
        ));

        let product = ProductRepository::new(gateway)
            .find_by_id(product_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(product.quantity_on_hand, 7);
    }

    #[tokio::test]
    async fn test_non_positive_quantity_rejected() {
        let (_gateway, service, product_id) = setup(5).await;

        let err = service
            .apply(product_id, MovementDirection::In, 0, None, None, Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_unknown_product_not_found() {
        let (_gateway, service, _product_id) = setup(5).await;

        let err = service
            .apply(Uuid::new_v4(), MovementDirection::In, 1, None, None, Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_movement_insert_failure_reverts_quantity() {
        let (gateway, service, product_id) = setup(5).await;
        gateway.inject_failure(Table::StockMovements, GatewayOp::Insert);

        let result = service
            .apply(product_id, MovementDirection::In, 4, None, None, Uuid::new_v4())
            .await;
        assert!(result.is_err());

        // 数量回到调整前，台账无残留
        let product = ProductRepository::new(gateway.clone())
            .find_by_id(product_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(product.quantity_on_hand, 5);

        let movements = service
            .list_movements(&MovementListFilters::default(), 50, 0)
            .await
            .unwrap();
        assert!(movements.is_empty());
    }

    #[tokio::test]
    async fn test_reverse_restores_quantity_and_records_movement() {
        let (gateway, service, product_id) = setup(0).await;

        let actor = Uuid::new_v4();
        let movement = service
            .apply(product_id, MovementDirection::In, 6, None, None, actor)
            .await
            .unwrap();

        let reversed = service.reverse(&movement, actor).await.unwrap();
        assert_eq!(reversed.direction, MovementDirection::Out);
        assert_eq!(reversed.quantity, 6);
        assert_eq!(reversed.quantity_after, 0);

        let product = ProductRepository::new(gateway)
            .find_by_id(product_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(product.quantity_on_hand, 0);
    }

    #[tokio::test]
    async fn test_create_movement_records_audit() {
        let (gateway, service, product_id) = setup(0).await;

        let req = CreateMovementRequest {
            product_id,
            direction: MovementDirection::In,
            quantity: 2,
            reason: Some("initial intake".to_string()),
        };
        service.create_movement(req, Uuid::new_v4()).await.unwrap();

        let audits = crate::repository::AuditRepository::new(gateway)
            .list(&crate::models::audit::AuditListFilters::default(), 50, 0)
            .await
            .unwrap();
        assert_eq!(audits.len(), 1);
        assert_eq!(audits[0].action, "stock_movement.create");
    }
}
