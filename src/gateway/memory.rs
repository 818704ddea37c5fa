//! 内存网关实现
//! 测试与本地运行用，不依赖外部存储

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{Filter, GatewayError, Patch, Record, Table, TableGateway};

/// 网关操作类型（故障注入用）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayOp {
    Select,
    Insert,
    Update,
    Ping,
}

/// 与迁移中的唯一索引保持一致
const NATURAL_KEYS: &[(Table, &str)] = &[(Table::Users, "username"), (Table::Products, "sku")];

/// 内存表网关
///
/// 记录按插入顺序保存。inject_failure 注入一次性故障，
/// 下一个匹配的操作在产生任何副作用之前失败。
pub struct MemoryGateway {
    tables: RwLock<HashMap<Table, Vec<Record>>>,
    faults: Mutex<Vec<(Table, GatewayOp)>>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        let tables = Table::ALL.iter().map(|t| (*t, Vec::new())).collect();
        Self {
            tables: RwLock::new(tables),
            faults: Mutex::new(Vec::new()),
        }
    }

    /// 注入一次性故障
    pub fn inject_failure(&self, table: Table, op: GatewayOp) {
        if let Ok(mut faults) = self.faults.lock() {
            faults.push((table, op));
        }
    }

    fn take_fault(&self, table: Table, op: GatewayOp) -> bool {
        let mut faults = match self.faults.lock() {
            Ok(guard) => guard,
            Err(_) => return false,
        };
        if let Some(pos) = faults.iter().position(|(t, o)| *t == table && *o == op) {
            faults.remove(pos);
            true
        } else {
            false
        }
    }

    fn check_natural_keys(
        table: Table,
        rows: &[Record],
        candidate: &Record,
        skip_index: Option<usize>,
    ) -> Result<(), GatewayError> {
        for (t, field) in NATURAL_KEYS {
            if *t != table {
                continue;
            }
            let Some(value) = candidate.get(*field) else {
                continue;
            };
            if value.is_null() {
                continue;
            }
            let clash = rows.iter().enumerate().any(|(i, row)| {
                Some(i) != skip_index && row.get(*field) == Some(value)
            });
            if clash {
                return Err(GatewayError::Duplicate(format!(
                    "Duplicate value for {}",
                    field
                )));
            }
        }
        Ok(())
    }
}

impl Default for MemoryGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TableGateway for MemoryGateway {
    async fn select(&self, table: Table, filter: &Filter) -> Result<Vec<Record>, GatewayError> {
        if self.take_fault(table, GatewayOp::Select) {
            return Err(GatewayError::Unavailable("injected fault".to_string()));
        }

        let tables = self.tables.read().await;
        let rows = tables
            .get(&table)
            .ok_or_else(|| GatewayError::Query(format!("unknown table {}", table)))?;

        Ok(rows
            .iter()
            .filter(|row| filter.matches(row))
            .cloned()
            .collect())
    }

    async fn insert(&self, table: Table, record: Record) -> Result<Record, GatewayError> {
        if self.take_fault(table, GatewayOp::Insert) {
            return Err(GatewayError::Unavailable("injected fault".to_string()));
        }

        let id = record
            .get("id")
            .and_then(|v| v.as_str())
            .ok_or_else(|| GatewayError::Malformed("record missing string id".to_string()))?
            .to_string();

        let mut tables = self.tables.write().await;
        let rows = tables
            .get_mut(&table)
            .ok_or_else(|| GatewayError::Query(format!("unknown table {}", table)))?;

        if rows
            .iter()
            .any(|row| row.get("id").and_then(|v| v.as_str()) == Some(id.as_str()))
        {
            return Err(GatewayError::Duplicate(format!(
                "Duplicate value for id in {}",
                table
            )));
        }
        Self::check_natural_keys(table, rows, &record, None)?;

        rows.push(record.clone());
        Ok(record)
    }

    async fn update(
        &self,
        table: Table,
        filter: &Filter,
        patch: &Patch,
    ) -> Result<Option<Record>, GatewayError> {
        if self.take_fault(table, GatewayOp::Update) {
            return Err(GatewayError::Unavailable("injected fault".to_string()));
        }

        let mut tables = self.tables.write().await;
        let rows = tables
            .get_mut(&table)
            .ok_or_else(|| GatewayError::Query(format!("unknown table {}", table)))?;

        let Some(pos) = rows.iter().position(|row| filter.matches(row)) else {
            return Ok(None);
        };

        let mut updated = rows[pos].clone();
        patch.apply(&mut updated);
        Self::check_natural_keys(table, rows, &updated, Some(pos))?;

        rows[pos] = updated.clone();
        Ok(Some(updated))
    }

    async fn ping(&self) -> Result<(), GatewayError> {
        if self.take_fault(Table::Products, GatewayOp::Ping) {
            return Err(GatewayError::Unavailable("injected fault".to_string()));
        }
        Ok(())
    }
}
