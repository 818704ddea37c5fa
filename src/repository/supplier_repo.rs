//! 供应商仓储

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    error::AppError,
    gateway::{from_record, to_record, Filter, Patch, Table, TableGateway},
    models::{
        common::Lifecycle,
        supplier::{Supplier, UpdateSupplierRequest},
    },
};

use super::json_value;

pub struct SupplierRepository {
    gateway: Arc<dyn TableGateway>,
}

impl SupplierRepository {
    pub fn new(gateway: Arc<dyn TableGateway>) -> Self {
        Self { gateway }
    }

    pub async fn insert(&self, supplier: &Supplier) -> Result<Supplier, AppError> {
        let record = to_record(supplier)?;
        let stored = self.gateway.insert(Table::Suppliers, record).await?;
        Ok(from_record(stored)?)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Supplier>, AppError> {
        let filter = Filter::by_id(id).eq("lifecycle", Lifecycle::Active.as_str());
        let mut rows = self.gateway.select(Table::Suppliers, &filter).await?;
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
    ) -> Result<Vec<Supplier>, AppError> {
        let mut filter = Filter::new();
        if !include_inactive {
            filter = filter.eq("lifecycle", Lifecycle::Active.as_str());
        }

        let rows = self.gateway.select(Table::Suppliers, &filter).await?;
        let mut suppliers = rows
            .into_iter()
            .map(from_record::<Supplier>)
            .collect::<Result<Vec<_>, _>>()?;

        suppliers.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(suppliers
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    pub async fn update(
        &self,
        id: Uuid,
        req: &UpdateSupplierRequest,
        now: DateTime<Utc>,
    ) -> Result<Option<Supplier>, AppError> {
        let mut patch = Patch::new();
        if let Some(name) = &req.name {
            patch = patch.set("name", name.as_str());
        }
        if let Some(contact_email) = &req.contact_email {
            patch = patch.set("contact_email", contact_email.as_str());
        }
        if let Some(phone) = &req.phone {
            patch = patch.set("phone", phone.as_str());
        }
        patch = patch.set("updated_at", json_value(&now));

        let filter = Filter::by_id(id).eq("lifecycle", Lifecycle::Active.as_str());
        let updated = self
            .gateway
            .update(Table::Suppliers, &filter, &patch)
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
    ) -> Result<Option<Supplier>, AppError> {
        let filter = Filter::by_id(id).eq("lifecycle", Lifecycle::Active.as_str());
        let patch = Patch::new()
            .set("lifecycle", Lifecycle::Inactive.as_str())
            .set("updated_at", json_value(&now));
        let updated = self
            .gateway
            .update(Table::Suppliers, &filter, &patch)
            .await?;
        match updated {
            Some(record) => Ok(Some(from_record(record)?)),
            None => Ok(None),
        }
    }
}
