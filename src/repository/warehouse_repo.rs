//! 仓库仓储

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    error::AppError,
    gateway::{from_record, to_record, Filter, Patch, Table, TableGateway},
    models::{
        common::Lifecycle,
        warehouse::{UpdateWarehouseRequest, Warehouse},
    },
};

use super::json_value;

pub struct WarehouseRepository {
    gateway: Arc<dyn TableGateway>,
}

impl WarehouseRepository {
    pub fn new(gateway: Arc<dyn TableGateway>) -> Self {
        Self { gateway }
    }

    pub async fn insert(&self, warehouse: &Warehouse) -> Result<Warehouse, AppError> {
        let record = to_record(warehouse)?;
        let stored = self.gateway.insert(Table::Warehouses, record).await?;
        Ok(from_record(stored)?)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Warehouse>, AppError> {
        let filter = Filter::by_id(id).eq("lifecycle", Lifecycle::Active.as_str());
        let mut rows = self.gateway.select(Table::Warehouses, &filter).await?;
        match rows.pop() {
            Some(record) => Ok(Some(from_record(record)?)),
            None => Ok(None),
        }
    }

    pub async fn list(
        &self,
        include_inactive: bool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Warehouse>, AppError> {
        let mut filter = Filter::new();
        if !include_inactive {
            filter = filter.eq("lifecycle", Lifecycle::Active.as_str());
        }

        let rows = self.gateway.select(Table::Warehouses, &filter).await?;
        let mut warehouses = rows
            .into_iter()
            .map(from_record::<Warehouse>)
            .collect::<Result<Vec<_>, _>>()?;

        warehouses.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(warehouses
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    pub async fn update(
        &self,
        id: Uuid,
        req: &UpdateWarehouseRequest,
        now: DateTime<Utc>,
    ) -> Result<Option<Warehouse>, AppError> {
        let mut patch = Patch::new();
        if let Some(name) = &req.name {
            patch = patch.set("name", name.as_str());
        }
        if let Some(location) = &req.location {
            patch = patch.set("location", location.as_str());
        }
        patch = patch.set("updated_at", json_value(&now));

        let filter = Filter::by_id(id).eq("lifecycle", Lifecycle::Active.as_str());
        let updated = self
            .gateway
            .update(Table::Warehouses, &filter, &patch)
            .await?;
        match updated {
            Some(record) => Ok(Some(from_record(record)?)),
            None => Ok(None),
        }
    }

    pub async fn soft_delete(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<Warehouse>, AppError> {
        let filter = Filter::by_id(id).eq("lifecycle", Lifecycle::Active.as_str());
        let patch = Patch::new()
            .set("lifecycle", Lifecycle::Inactive.as_str())
            .set("updated_at", json_value(&now));
        let updated = self
            .gateway
            .update(Table::Warehouses, &filter, &patch)
            .await?;
        match updated {
            Some(record) => Ok(Some(from_record(record)?)),
            None => Ok(None),
        }
    }
}
