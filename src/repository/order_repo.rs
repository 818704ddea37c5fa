//! 采购单仓储
//! 全部状态转移走条件更新，条件失效返回 None

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    error::AppError,
    gateway::{from_record, to_record, Filter, Patch, Table, TableGateway},
    models::{
        common::Lifecycle,
        order::{OrderItem, OrderStatus, PurchaseOrder},
    },
};

use super::json_value;

pub struct OrderRepository {
    gateway: Arc<dyn TableGateway>,
}

impl OrderRepository {
    pub fn new(gateway: Arc<dyn TableGateway>) -> Self {
        Self { gateway }
    }

    pub async fn insert(&self, order: &PurchaseOrder) -> Result<PurchaseOrder, AppError> {
        let record = to_record(order)?;
        let stored = self.gateway.insert(Table::PurchaseOrders, record).await?;
        Ok(from_record(stored)?)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<PurchaseOrder>, AppError> {
        let filter = Filter::by_id(id).eq("lifecycle", Lifecycle::Active.as_str());
        let mut rows = self.gateway.select(Table::PurchaseOrders, &filter).await?;
        match rows.pop() {
            Some(record) => Ok(Some(from_record(record)?)),
            None => Ok(None),
        }
    }

    pub async fn list(
        &self,
        status: Option<OrderStatus>,
        supplier_id: Option<Uuid>,
        include_inactive: bool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<PurchaseOrder>, AppError> {
        let mut filter = Filter::new();
        if !include_inactive {
            filter = filter.eq("lifecycle", Lifecycle::Active.as_str());
        }
        if let Some(status) = status {
            filter = filter.eq("status", status.as_str());
        }
        if let Some(supplier_id) = supplier_id {
            filter = filter.eq("supplier_id", supplier_id.to_string());
        }

        let rows = self.gateway.select(Table::PurchaseOrders, &filter).await?;
        let mut orders = rows
            .into_iter()
            .map(from_record::<PurchaseOrder>)
            .collect::<Result<Vec<_>, _>>()?;

        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    /// 仅当单据仍为 pending 时更新内容
    pub async fn update_pending(
        &self,
        id: Uuid,
        supplier_id: Option<Uuid>,
        items: Option<&[OrderItem]>,
        now: DateTime<Utc>,
    ) -> Result<Option<PurchaseOrder>, AppError> {
        let mut patch = Patch::new();
        if let Some(supplier_id) = supplier_id {
            patch = patch.set("supplier_id", supplier_id.to_string());
        }
        if let Some(items) = items {
            patch = patch.set("items", json_value(&items));
        }
        patch = patch.set("updated_at", json_value(&now));

        let filter = Filter::by_id(id)
            .eq("status", OrderStatus::Pending.as_str())
            .eq("lifecycle", Lifecycle::Active.as_str());
        let updated = self
            .gateway
            .update(Table::PurchaseOrders, &filter, &patch)
            .await?;
        match updated {
            Some(record) => Ok(Some(from_record(record)?)),
            None => Ok(None),
        }
    }

    /// 状态转移：仅当现状态仍为 from 时提交，单条语句落库
    pub async fn transition(
        &self,
        id: Uuid,
        from: OrderStatus,
        to: OrderStatus,
        extra: Patch,
        now: DateTime<Utc>,
    ) -> Result<Option<PurchaseOrder>, AppError> {
        let mut patch = Patch::new().set("status", to.as_str());
        for (field, value) in extra.changes() {
            patch = patch.set(field, value.clone());
        }
        patch = patch.set("updated_at", json_value(&now));

        let filter = Filter::by_id(id)
            .eq("status", from.as_str())
            .eq("lifecycle", Lifecycle::Active.as_str());
        let updated = self
            .gateway
            .update(Table::PurchaseOrders, &filter, &patch)
            .await?;
        match updated {
            Some(record) => Ok(Some(from_record(record)?)),
            None => Ok(None),
        }
    }

    /// 软删除，仅当状态仍为 expected 时生效
    pub async fn soft_delete_if_status(
        &self,
        id: Uuid,
        expected: OrderStatus,
        now: DateTime<Utc>,
    ) -> Result<Option<PurchaseOrder>, AppError> {
        let filter = Filter::by_id(id)
            .eq("status", expected.as_str())
            .eq("lifecycle", Lifecycle::Active.as_str());
        let patch = Patch::new()
            .set("lifecycle", Lifecycle::Inactive.as_str())
            .set("updated_at", json_value(&now));
        let updated = self
            .gateway
            .update(Table::PurchaseOrders, &filter, &patch)
            .await?;
        match updated {
            Some(record) => Ok(Some(from_record(record)?)),
            None => Ok(None),
        }
    }
}
