//! 持久化网关
//! 面向表的统一存取接口：select / insert / update / ping

pub mod memory;
pub mod postgres;

pub use memory::{GatewayOp, MemoryGateway};
pub use postgres::PgGateway;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use thiserror::Error;

/// 一条记录：扁平 JSON 对象
pub type Record = serde_json::Map<String, Value>;

/// 网关管理的表
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Products,
    Suppliers,
    Warehouses,
    Users,
    StockMovements,
    PurchaseOrders,
    AuditRecords,
}

impl Table {
    pub const ALL: [Table; 7] = [
        Table::Products,
        Table::Suppliers,
        Table::Warehouses,
        Table::Users,
        Table::StockMovements,
        Table::PurchaseOrders,
        Table::AuditRecords,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Table::Products => "products",
            Table::Suppliers => "suppliers",
            Table::Warehouses => "warehouses",
            Table::Users => "users",
            Table::StockMovements => "stock_movements",
            Table::PurchaseOrders => "purchase_orders",
            Table::AuditRecords => "audit_records",
        }
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 等值过滤条件（字段 -> 期望值）
#[derive(Debug, Clone, Default)]
pub struct Filter {
    terms: Vec<(String, Value)>,
}

impl Filter {
    pub fn new() -> Self {
        Self { terms: Vec::new() }
    }

    /// 按 id 过滤
    pub fn by_id(id: uuid::Uuid) -> Self {
        Self::new().eq("id", id.to_string())
    }

    pub fn eq(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.terms.push((field.to_string(), value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn terms(&self) -> &[(String, Value)] {
        &self.terms
    }

    /// 转为 JSONB 包含查询用的文档
    pub fn to_doc(&self) -> Value {
        let mut doc = serde_json::Map::new();
        for (field, value) in &self.terms {
            doc.insert(field.clone(), value.clone());
        }
        Value::Object(doc)
    }

    /// 记录是否满足所有条件
    pub fn matches(&self, record: &Record) -> bool {
        self.terms
            .iter()
            .all(|(field, value)| record.get(field) == Some(value))
    }
}

/// 部分更新（字段 -> 新值），浅合并语义
#[derive(Debug, Clone, Default)]
pub struct Patch {
    changes: Vec<(String, Value)>,
}

impl Patch {
    pub fn new() -> Self {
        Self {
            changes: Vec::new(),
        }
    }

    pub fn set(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.changes.push((field.to_string(), value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn changes(&self) -> &[(String, Value)] {
        &self.changes
    }

    pub fn to_doc(&self) -> Value {
        let mut doc = serde_json::Map::new();
        for (field, value) in &self.changes {
            doc.insert(field.clone(), value.clone());
        }
        Value::Object(doc)
    }

    pub fn apply(&self, record: &mut Record) {
        for (field, value) in &self.changes {
            record.insert(field.clone(), value.clone());
        }
    }
}

/// 网关错误类型
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Gateway unavailable: {0}")]
    Unavailable(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Duplicate value: {0}")]
    Duplicate(String),

    #[error("Malformed record: {0}")]
    Malformed(String),
}

impl From<sqlx::Error> for GatewayError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                let field = db.constraint().unwrap_or("unique field");
                GatewayError::Duplicate(format!("Duplicate value for {}", field))
            }
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                GatewayError::Unavailable(e.to_string())
            }
            _ => GatewayError::Query(e.to_string()),
        }
    }
}

/// 表网关能力
///
/// update 是单行条件更新：filter 在行锁内重新校验，
/// 并发修改导致条件失效时返回 None（CAS 语义）。
#[async_trait]
pub trait TableGateway: Send + Sync {
    /// 查询满足过滤条件的所有记录
    async fn select(&self, table: Table, filter: &Filter) -> Result<Vec<Record>, GatewayError>;

    /// 插入一条记录，返回存储后的记录
    async fn insert(&self, table: Table, record: Record) -> Result<Record, GatewayError>;

    /// 条件更新至多一行，返回更新后的记录；无行匹配返回 None
    async fn update(
        &self,
        table: Table,
        filter: &Filter,
        patch: &Patch,
    ) -> Result<Option<Record>, GatewayError>;

    /// 连通性检查
    async fn ping(&self) -> Result<(), GatewayError>;
}

/// 领域对象 -> 记录
pub fn to_record<T: Serialize>(value: &T) -> Result<Record, GatewayError> {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(GatewayError::Malformed(
            "entity did not serialize to a JSON object".to_string(),
        )),
        Err(e) => Err(GatewayError::Malformed(e.to_string())),
    }
}

/// 记录 -> 领域对象
pub fn from_record<T: DeserializeOwned>(record: Record) -> Result<T, GatewayError> {
    serde_json::from_value(Value::Object(record)).map_err(|e| GatewayError::Malformed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_table_names() {
        assert_eq!(Table::Products.as_str(), "products");
        assert_eq!(Table::StockMovements.as_str(), "stock_movements");
        assert_eq!(Table::AuditRecords.as_str(), "audit_records");
        assert_eq!(Table::ALL.len(), 7);
    }

    #[test]
    fn test_filter_matches() {
        let filter = Filter::new().eq("status", "pending").eq("quantity", 5);

        let mut record = Record::new();
        record.insert("status".to_string(), json!("pending"));
        record.insert("quantity".to_string(), json!(5));
        record.insert("extra".to_string(), json!("ignored"));
        assert!(filter.matches(&record));

        record.insert("status".to_string(), json!("approved"));
        assert!(!filter.matches(&record));
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let filter = Filter::new();
        assert!(filter.is_empty());
        assert!(filter.matches(&Record::new()));
    }

    #[test]
    fn test_patch_apply() {
        let mut record = Record::new();
        record.insert("status".to_string(), json!("pending"));
        record.insert("quantity".to_string(), json!(5));

        let patch = Patch::new().set("status", "approved").set("note", "ok");
        patch.apply(&mut record);

        assert_eq!(record.get("status"), Some(&json!("approved")));
        assert_eq!(record.get("quantity"), Some(&json!(5)));
        assert_eq!(record.get("note"), Some(&json!("ok")));
    }

    #[test]
    fn test_filter_doc_shape() {
        let filter = Filter::new().eq("id", "abc").eq("lifecycle", "active");
        assert_eq!(filter.to_doc(), json!({"id": "abc", "lifecycle": "active"}));
    }

    #[test]
    fn test_record_round_trip() {
        #[derive(serde::Serialize, serde::Deserialize, PartialEq, Debug)]
        struct Widget {
            id: String,
            size: i64,
        }

        let widget = Widget {
            id: "w1".to_string(),
            size: 3,
        };
        let record = to_record(&widget).unwrap();
        assert_eq!(record.get("size"), Some(&json!(3)));

        let back: Widget = from_record(record).unwrap();
        assert_eq!(back, widget);
    }

    #[test]
    fn test_non_object_to_record_fails() {
        let result = to_record(&42);
        assert!(matches!(result, Err(GatewayError::Malformed(_))));
    }
}
