//! 库存移动仓储
//! 移动记录只增不改，无生命周期标记

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    error::AppError,
    gateway::{from_record, to_record, Filter, Table, TableGateway},
    models::movement::{MovementListFilters, StockMovement},
};

pub struct MovementRepository {
    gateway: Arc<dyn TableGateway>,
}

impl MovementRepository {
    pub fn new(gateway: Arc<dyn TableGateway>) -> Self {
        Self { gateway }
    }

    pub async fn insert(&self, movement: &StockMovement) -> Result<StockMovement, AppError> {
        let record = to_record(movement)?;
        let stored = self.gateway.insert(Table::StockMovements, record).await?;
        Ok(from_record(stored)?)
    }

    pub async fn list(
        &self,
        filters: &MovementListFilters,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<StockMovement>, AppError> {
        let mut filter = Filter::new();
        if let Some(product_id) = filters.product_id {
            filter = filter.eq("product_id", product_id.to_string());
        }
        if let Some(direction) = filters.direction {
            filter = filter.eq("direction", direction.as_str());
        }
        if let Some(order_id) = filters.order_id {
            filter = filter.eq("order_id", order_id.to_string());
        }

        let rows = self.gateway.select(Table::StockMovements, &filter).await?;
        let mut movements = rows
            .into_iter()
            .map(from_record::<StockMovement>)
            .collect::<Result<Vec<_>, _>>()?;

        // 时间范围是非等值条件，网关不支持，在此过滤
        if let Some(from) = filters.from {
            movements.retain(|m| m.occurred_at >= from);
        }
        if let Some(to) = filters.to {
            movements.retain(|m| m.occurred_at <= to);
        }

        movements.sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at));
        Ok(movements
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    /// 某采购单在某商品上的全部移动（完成续跑时结算净入库量）
    pub async fn list_for_order_product(
        &self,
        order_id: Uuid,
        product_id: Uuid,
    ) -> Result<Vec<StockMovement>, AppError> {
        let filter = Filter::new()
            .eq("order_id", order_id.to_string())
            .eq("product_id", product_id.to_string());
        let rows = self.gateway.select(Table::StockMovements, &filter).await?;
        Ok(rows
            .into_iter()
            .map(from_record::<StockMovement>)
            .collect::<Result<Vec<_>, _>>()?)
    }
}
