//! 审计记录仓储
//! 只提供插入与查询，不存在更新或删除路径

use std::sync::Arc;

use crate::{
    error::AppError,
    gateway::{from_record, to_record, Filter, Table, TableGateway},
    models::audit::{AuditListFilters, AuditRecord},
};

pub struct AuditRepository {
    gateway: Arc<dyn TableGateway>,
}

impl AuditRepository {
    pub fn new(gateway: Arc<dyn TableGateway>) -> Self {
        Self { gateway }
    }

    pub async fn insert(&self, record: &AuditRecord) -> Result<AuditRecord, AppError> {
        let doc = to_record(record)?;
        let stored = self.gateway.insert(Table::AuditRecords, doc).await?;
        Ok(from_record(stored)?)
    }

    pub async fn list(
        &self,
        filters: &AuditListFilters,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<AuditRecord>, AppError> {
        let mut filter = Filter::new();
        if let Some(entity_type) = &filters.entity_type {
            filter = filter.eq("entity_type", entity_type.as_str());
        }
        if let Some(entity_id) = filters.entity_id {
            filter = filter.eq("entity_id", entity_id.to_string());
        }
        if let Some(actor_id) = filters.actor_id {
            filter = filter.eq("actor_id", actor_id.to_string());
        }
        if let Some(action) = &filters.action {
            filter = filter.eq("action", action.as_str());
        }

        let rows = self.gateway.select(Table::AuditRecords, &filter).await?;
        let mut records = rows
            .into_iter()
            .map(from_record::<AuditRecord>)
            .collect::<Result<Vec<_>, _>>()?;

        records.sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at));
        Ok(records
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }
}
