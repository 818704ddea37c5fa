//! 商品仓储

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    error::AppError,
    gateway::{from_record, to_record, Filter, Patch, Table, TableGateway},
    models::{
        common::Lifecycle,
        product::{Product, UpdateProductRequest},
    },
};

use super::json_value;

pub struct ProductRepository {
    gateway: Arc<dyn TableGateway>,
}

impl ProductRepository {
    pub fn new(gateway: Arc<dyn TableGateway>) -> Self {
        Self { gateway }
    }

    pub async fn insert(&self, product: &Product) -> Result<Product, AppError> {
        let record = to_record(product)?;
        let stored = self.gateway.insert(Table::Products, record).await?;
        Ok(from_record(stored)?)
    }

    /// 按 id 查询活跃商品
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, AppError> {
        let filter = Filter::by_id(id).eq("lifecycle", Lifecycle::Active.as_str());
        let mut rows = self.gateway.select(Table::Products, &filter).await?;
        match rows.pop() {
            Some(record) => Ok(Some(from_record(record)?)),
            None => Ok(None),
        }
    }

    pub async fn list(
        &self,
        supplier_id: Option<Uuid>,
        include_inactive: bool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Product>, AppError> {
        let mut filter = Filter::new();
        if !include_inactive {
            filter = filter.eq("lifecycle", Lifecycle::Active.as_str());
        }
        if let Some(supplier_id) = supplier_id {
            filter = filter.eq("supplier_id", supplier_id.to_string());
        }

        let rows = self.gateway.select(Table::Products, &filter).await?;
        let mut products = rows
            .into_iter()
            .map(from_record::<Product>)
            .collect::<Result<Vec<_>, _>>()?;

        // 网关不提供排序与分页，在此按创建时间倒序截取
        products.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(products
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    /// 低库存商品（现有库存 <= 阈值）
    pub async fn list_low_stock(&self, limit: i64, offset: i64) -> Result<Vec<Product>, AppError> {
        let filter = Filter::new().eq("lifecycle", Lifecycle::Active.as_str());
        let rows = self.gateway.select(Table::Products, &filter).await?;
        let mut products = rows
            .into_iter()
            .map(from_record::<Product>)
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .filter(Product::is_low_stock)
            .collect::<Vec<_>>();

        products.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(products
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    pub async fn update(
        &self,
        id: Uuid,
        req: &UpdateProductRequest,
        now: DateTime<Utc>,
    ) -> Result<Option<Product>, AppError> {
        let mut patch = Patch::new();
        if let Some(name) = &req.name {
            patch = patch.set("name", name.as_str());
        }
        if let Some(description) = &req.description {
            patch = patch.set("description", description.as_str());
        }
        if let Some(sku) = &req.sku {
            patch = patch.set("sku", sku.as_str());
        }
        if let Some(unit_price) = &req.unit_price {
            patch = patch.set("unit_price", json_value(unit_price));
        }
        if let Some(min_stock) = req.min_stock {
            patch = patch.set("min_stock", min_stock);
        }
        if let Some(supplier_id) = req.supplier_id {
            patch = patch.set("supplier_id", supplier_id.to_string());
        }
        patch = patch.set("updated_at", json_value(&now));

        let filter = Filter::by_id(id).eq("lifecycle", Lifecycle::Active.as_str());
        let updated = self.gateway.update(Table::Products, &filter, &patch).await?;
        match updated {
            Some(record) => Ok(Some(from_record(record)?)),
            None => Ok(None),
        }
    }

    /// 库存数量条件更新：仅当现值仍为 expected 时提交
    pub async fn cas_quantity(
        &self,
        id: Uuid,
        expected: i64,
        new_quantity: i64,
        now: DateTime<Utc>,
    ) -> Result<Option<Product>, AppError> {
        let filter = Filter::by_id(id)
            .eq("lifecycle", Lifecycle::Active.as_str())
            .eq("quantity_on_hand", expected);
        let patch = Patch::new()
            .set("quantity_on_hand", new_quantity)
            .set("updated_at", json_value(&now));

        let updated = self.gateway.update(Table::Products, &filter, &patch).await?;
        match updated {
            Some(record) => Ok(Some(from_record(record)?)),
            None => Ok(None),
        }
    }

    pub async fn soft_delete(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<Product>, AppError> {
        let filter = Filter::by_id(id).eq("lifecycle", Lifecycle::Active.as_str());
        let patch = Patch::new()
            .set("lifecycle", Lifecycle::Inactive.as_str())
            .set("updated_at", json_value(&now));
        let updated = self.gateway.update(Table::Products, &filter, &patch).await?;
        match updated {
            Some(record) => Ok(Some(from_record(record)?)),
            None => Ok(None),
        }
    }
}
