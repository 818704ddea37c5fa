//! 审计服务
//! 写入策略全局一致：落库失败记录日志并继续，不改变触发操作的结果

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

use crate::{
    error::AppError,
    gateway::{Table, TableGateway},
    models::audit::{AuditListFilters, AuditRecord},
    repository::AuditRepository,
};

/// 审计操作类型
#[derive(Debug, Clone, Copy)]
pub enum AuditAction {
    // 商品相关
    ProductCreate,
    ProductUpdate,
    ProductDelete,

    // 供应商相关
    SupplierCreate,
    SupplierUpdate,
    SupplierDelete,

    // 仓库相关
    WarehouseCreate,
    WarehouseUpdate,
    WarehouseDelete,

    // 用户相关
    UserCreate,
    UserUpdate,
    UserDelete,
    UserLogin,
    UserBootstrap,

    // 库存相关
    StockMovementCreate,

    // 采购单相关
    OrderCreate,
    OrderUpdate,
    OrderApprove,
    OrderReject,
    OrderComplete,
    OrderDelete,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::ProductCreate => "product.create",
            AuditAction::ProductUpdate => "product.update",
            AuditAction::ProductDelete => "product.delete",

            AuditAction::SupplierCreate => "supplier.create",
            AuditAction::SupplierUpdate => "supplier.update",
            AuditAction::SupplierDelete => "supplier.delete",

            AuditAction::WarehouseCreate => "warehouse.create",
            AuditAction::WarehouseUpdate => "warehouse.update",
            AuditAction::WarehouseDelete => "warehouse.delete",

            AuditAction::UserCreate => "user.create",
            AuditAction::UserUpdate => "user.update",
            AuditAction::UserDelete => "user.delete",
            AuditAction::UserLogin => "user.login",
            AuditAction::UserBootstrap => "user.bootstrap",

            AuditAction::StockMovementCreate => "stock_movement.create",

            AuditAction::OrderCreate => "purchase_order.create",
            AuditAction::OrderUpdate => "purchase_order.update",
            AuditAction::OrderApprove => "purchase_order.approve",
            AuditAction::OrderReject => "purchase_order.reject",
            AuditAction::OrderComplete => "purchase_order.complete",
            AuditAction::OrderDelete => "purchase_order.delete",
        }
    }
}

/// 实体快照，序列化失败时退化为 None
pub fn snapshot<T: Serialize>(value: &T) -> Option<serde_json::Value> {
    serde_json::to_value(value).ok()
}

pub struct AuditService {
    gateway: Arc<dyn TableGateway>,
}

impl AuditService {
    pub fn new(gateway: Arc<dyn TableGateway>) -> Self {
        Self { gateway }
    }

    /// 记录一条审计。失败不向调用方传播，仅记日志与计数
    pub async fn record(
        &self,
        actor_id: Uuid,
        action: AuditAction,
        entity: Table,
        entity_id: Uuid,
        before: Option<serde_json::Value>,
        after: Option<serde_json::Value>,
    ) {
        let record = AuditRecord {
            id: Uuid::new_v4(),
            actor_id,
            entity_type: entity.as_str().to_string(),
            entity_id,
            action: action.as_str().to_string(),
            before,
            after,
            occurred_at: Utc::now(),
        };

        let repo = AuditRepository::new(self.gateway.clone());
        if let Err(e) = repo.insert(&record).await {
            metrics::counter!("audit_write_failures_total").increment(1);
            warn!(
                error = %e,
                action = action.as_str(),
                entity_type = entity.as_str(),
                entity_id = %entity_id,
                "Audit write failed, continuing"
            );
        }
    }

    /// 查询审计记录
    pub async fn list(
        &self,
        filters: &AuditListFilters,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<AuditRecord>, AppError> {
        let repo = AuditRepository::new(self.gateway.clone());
        repo.list(filters, limit, offset).await
    }
}
