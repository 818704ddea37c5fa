//! 审计记录领域模型

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 审计记录，只增不改
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    pub id: Uuid,
    pub actor_id: Uuid,
    /// 实体表名，如 "products"、"purchase_orders"
    pub entity_type: String,
    pub entity_id: Uuid,
    /// 点分动作名，如 "purchase_order.approve"
    pub action: String,
    /// 变更前快照
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before: Option<serde_json::Value>,
    /// 变更后快照
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<serde_json::Value>,
    pub occurred_at: DateTime<Utc>,
}

/// 审计记录查询过滤
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuditListFilters {
    pub entity_type: Option<String>,
    pub entity_id: Option<Uuid>,
    pub actor_id: Option<Uuid>,
    pub action: Option<String>,
}
