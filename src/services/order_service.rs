//! 采购单生命周期服务
//! 状态机封闭：pending -> approved -> completed，pending -> rejected。
//! 完成是唯一带库存副作用的转移，行项入库全有或全无。

use std::sync::Arc;

use chrono::Utc;
use futures::future::try_join_all;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::AppError,
    gateway::{Patch, Table, TableGateway},
    models::{
        movement::{MovementDirection, StockMovement},
        order::{
            CreateOrderRequest, OrderItem, OrderStatus, PurchaseOrder, RejectOrderRequest,
            UpdateOrderRequest,
        },
    },
    repository::{json_value, MovementRepository, OrderRepository, ProductRepository, SupplierRepository},
    services::audit_service::{snapshot, AuditAction, AuditService},
    services::stock_service::StockService,
};

pub struct OrderService {
    gateway: Arc<dyn TableGateway>,
    stock: Arc<StockService>,
    audit: Arc<AuditService>,
}

impl OrderService {
    pub fn new(
        gateway: Arc<dyn TableGateway>,
        stock: Arc<StockService>,
        audit: Arc<AuditService>,
    ) -> Self {
        Self {
            gateway,
            stock,
            audit,
        }
    }

    /// 创建采购单，初始状态 pending
    #[instrument(skip(self, req, actor_id))]
    pub async fn create(
        &self,
        req: CreateOrderRequest,
        actor_id: Uuid,
    ) -> Result<PurchaseOrder, AppError> {
        req.validate()?;

        let suppliers = SupplierRepository::new(self.gateway.clone());
        suppliers
            .find_by_id(req.supplier_id)
            .await?
            .ok_or_else(|| AppError::not_found("Supplier not found"))?;

        self.ensure_products_exist(req.items.iter().map(|item| item.product_id))
            .await?;

        let now = Utc::now();
        let order = PurchaseOrder {
            id: Uuid::new_v4(),
            supplier_id: req.supplier_id,
            items: req.items.into_iter().map(OrderItem::from).collect(),
            status: OrderStatus::Pending,
            created_by: actor_id,
            created_at: now,
            updated_at: now,
            approved_at: None,
            rejected_at: None,
            completed_at: None,
            rejection_reason: None,
            lifecycle: crate::models::common::Lifecycle::Active,
        };

        let repo = OrderRepository::new(self.gateway.clone());
        let stored = repo.insert(&order).await?;

        self.audit
            .record(
                actor_id,
                AuditAction::OrderCreate,
                Table::PurchaseOrders,
                stored.id,
                None,
                snapshot(&stored),
            )
            .await;

        info!(order_id = %stored.id, items = stored.items.len(), "Purchase order created");
        Ok(stored)
    }

    pub async fn get(&self, id: Uuid) -> Result<PurchaseOrder, AppError> {
        let repo = OrderRepository::new(self.gateway.clone());
        repo.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Purchase order not found"))
    }

    pub async fn list(
        &self,
        status: Option<OrderStatus>,
        supplier_id: Option<Uuid>,
        include_inactive: bool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<PurchaseOrder>, AppError> {
        let repo = OrderRepository::new(self.gateway.clone());
        repo.list(status, supplier_id, include_inactive, limit, offset)
            .await
    }

    /// 修改单据内容，仅 pending 状态允许
    #[instrument(skip(self, req, actor_id))]
    pub async fn update(
        &self,
        id: Uuid,
        req: UpdateOrderRequest,
        actor_id: Uuid,
    ) -> Result<PurchaseOrder, AppError> {
        req.validate()?;

        let before = self.get(id).await?;
        if before.status != OrderStatus::Pending {
            return Err(AppError::invalid_state(&format!(
                "Order in status '{}' cannot be modified",
                before.status
            )));
        }

        if let Some(supplier_id) = req.supplier_id {
            let suppliers = SupplierRepository::new(self.gateway.clone());
            suppliers
                .find_by_id(supplier_id)
                .await?
                .ok_or_else(|| AppError::not_found("Supplier not found"))?;
        }

        let items: Option<Vec<OrderItem>> = req
            .items
            .map(|items| items.into_iter().map(OrderItem::from).collect());
        if let Some(items) = &items {
            self.ensure_products_exist(items.iter().map(|item| item.product_id))
                .await?;
        }

        let repo = OrderRepository::new(self.gateway.clone());
        let updated = repo
            .update_pending(id, req.supplier_id, items.as_deref(), Utc::now())
            .await?
            .ok_or_else(|| {
                AppError::invalid_state("Order left pending status during the update")
            })?;

        self.audit
            .record(
                actor_id,
                AuditAction::OrderUpdate,
                Table::PurchaseOrders,
                id,
                snapshot(&before),
                snapshot(&updated),
            )
            .await;

        Ok(updated)
    }

    /// pending -> approved
    #[instrument(skip(self, actor_id))]
    pub async fn approve(&self, id: Uuid, actor_id: Uuid) -> Result<PurchaseOrder, AppError> {
        let order = self.get(id).await?;
        if !order.status.can_transition(OrderStatus::Approved) {
            return Err(AppError::invalid_state(&format!(
                "Cannot approve order in status '{}'",
                order.status
            )));
        }

        let now = Utc::now();
        let extra = Patch::new().set("approved_at", json_value(&now));
        let repo = OrderRepository::new(self.gateway.clone());
        let approved = repo
            .transition(id, order.status, OrderStatus::Approved, extra, now)
            .await?
            .ok_or_else(|| {
                AppError::invalid_state("Order left pending status during the approval")
            })?;

        self.audit
            .record(
                actor_id,
                AuditAction::OrderApprove,
                Table::PurchaseOrders,
                id,
                snapshot(&order),
                snapshot(&approved),
            )
            .await;

        info!(order_id = %id, "Purchase order approved");
        Ok(approved)
    }

    /// pending -> rejected，终态
    #[instrument(skip(self, req, actor_id))]
    pub async fn reject(
        &self,
        id: Uuid,
        req: RejectOrderRequest,
        actor_id: Uuid,
    ) -> Result<PurchaseOrder, AppError> {
        req.validate()?;

        let order = self.get(id).await?;
        if !order.status.can_transition(OrderStatus::Rejected) {
            return Err(AppError::invalid_state(&format!(
                "Cannot reject order in status '{}'",
                order.status
            )));
        }

        let now = Utc::now();
        let extra = Patch::new()
            .set("rejected_at", json_value(&now))
            .set("rejection_reason", req.reason.as_str());
        let repo = OrderRepository::new(self.gateway.clone());
        let rejected = repo
            .transition(id, order.status, OrderStatus::Rejected, extra, now)
            .await?
            .ok_or_else(|| {
                AppError::invalid_state("Order left pending status during the rejection")
            })?;

        self.audit
            .record(
                actor_id,
                AuditAction::OrderReject,
                Table::PurchaseOrders,
                id,
                snapshot(&order),
                snapshot(&rejected),
            )
            .await;

        info!(order_id = %id, "Purchase order rejected");
        Ok(rejected)
    }

    /// approved -> completed：逐行项入库后提交终态转移
    ///
    /// 行项按净入库量结算，上次失败完成留下的移动不会被重复入账。
    /// 任一行项失败时，本次已入账的行项全部冲销，单据保持 approved。
    /// 终态转移竞争失败同样冲销本次入账。
    #[instrument(skip(self, actor_id))]
    pub async fn complete(&self, id: Uuid, actor_id: Uuid) -> Result<PurchaseOrder, AppError> {
        let order = self.get(id).await?;
        if !order.status.can_transition(OrderStatus::Completed) {
            return Err(AppError::invalid_state(&format!(
                "Cannot complete order in status '{}'",
                order.status
            )));
        }

        let movements = MovementRepository::new(self.gateway.clone());
        let mut applied: Vec<StockMovement> = Vec::new();

        for item in &order.items {
            let prior = movements
                .list_for_order_product(order.id, item.product_id)
                .await;
            let prior = match prior {
                Ok(prior) => prior,
                Err(e) => {
                    self.compensate(&applied, actor_id).await;
                    return Err(e);
                }
            };

            let net_applied: i64 = prior
                .iter()
                .map(|m| m.direction.signed(m.quantity))
                .sum();
            let remaining = item.quantity - net_applied;
            if remaining <= 0 {
                continue;
            }

            let result = self
                .stock
                .apply(
                    item.product_id,
                    MovementDirection::In,
                    remaining,
                    Some(order.id),
                    Some(format!("Purchase order {} completion", order.id)),
                    actor_id,
                )
                .await;

            match result {
                Ok(movement) => applied.push(movement),
                Err(e) => {
                    error!(
                        error = %e,
                        order_id = %order.id,
                        product_id = %item.product_id,
                        "Line item movement failed, compensating applied items"
                    );
                    self.compensate(&applied, actor_id).await;
                    return Err(e);
                }
            }
        }

        let now = Utc::now();
        let extra = Patch::new().set("completed_at", json_value(&now));
        let repo = OrderRepository::new(self.gateway.clone());
        let completed = repo
            .transition(id, OrderStatus::Approved, OrderStatus::Completed, extra, now)
            .await?;

        let completed = match completed {
            Some(completed) => completed,
            None => {
                // 另一并发完成已提交终态，本次入账全部冲销
                warn!(order_id = %id, "Order already left approved status, compensating this attempt");
                self.compensate(&applied, actor_id).await;
                return Err(AppError::invalid_state(
                    "Order left approved status during the completion",
                ));
            }
        };

        self.audit
            .record(
                actor_id,
                AuditAction::OrderComplete,
                Table::PurchaseOrders,
                id,
                snapshot(&order),
                snapshot(&completed),
            )
            .await;

        info!(order_id = %id, items = completed.items.len(), "Purchase order completed");
        Ok(completed)
    }

    /// 软删除，仅 pending 与 rejected 状态允许
    #[instrument(skip(self, actor_id))]
    pub async fn delete(&self, id: Uuid, actor_id: Uuid) -> Result<(), AppError> {
        let order = self.get(id).await?;
        if !matches!(order.status, OrderStatus::Pending | OrderStatus::Rejected) {
            return Err(AppError::invalid_state(&format!(
                "Cannot delete order in status '{}'",
                order.status
            )));
        }

        let repo = OrderRepository::new(self.gateway.clone());
        repo.soft_delete_if_status(id, order.status, Utc::now())
            .await?
            .ok_or_else(|| AppError::invalid_state("Order changed status during the deletion"))?;

        self.audit
            .record(
                actor_id,
                AuditAction::OrderDelete,
                Table::PurchaseOrders,
                id,
                snapshot(&order),
                None,
            )
            .await;

        info!(order_id = %id, "Purchase order deleted");
        Ok(())
    }

    /// 冲销本次完成尝试已入账的移动，失败仅记日志
    async fn compensate(&self, applied: &[StockMovement], actor_id: Uuid) {
        for movement in applied.iter().rev() {
            if let Err(e) = self.stock.reverse(movement, actor_id).await {
                error!(
                    error = %e,
                    movement_id = %movement.id,
                    product_id = %movement.product_id,
                    "Compensation failed, manual reconciliation required"
                );
            }
        }
    }

    async fn ensure_products_exist(
        &self,
        product_ids: impl Iterator<Item = Uuid>,
    ) -> Result<(), AppError> {
        let products = ProductRepository::new(self.gateway.clone());
        let ids: Vec<Uuid> = product_ids.collect();
        let loaded = try_join_all(ids.iter().map(|id| products.find_by_id(*id))).await?;

        for (id, found) in ids.iter().zip(loaded) {
            if found.is_none() {
                return Err(AppError::not_found(&format!("Product {} not found", id)));
            }
        }
        Ok(())
    }
}
