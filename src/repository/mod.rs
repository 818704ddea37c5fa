//! 数据访问层
//! 每个实体一个仓储，把领域操作翻译为网关调用

pub mod audit_repo;
pub mod movement_repo;
pub mod order_repo;
pub mod product_repo;
pub mod supplier_repo;
pub mod user_repo;
pub mod warehouse_repo;

pub use audit_repo::*;
pub use movement_repo::*;
pub use order_repo::*;
pub use product_repo::*;
pub use supplier_repo::*;
pub use user_repo::*;
pub use warehouse_repo::*;

use serde::Serialize;
use serde_json::Value;

/// 序列化为 JSON 值，供过滤与补丁使用
/// 领域类型的序列化不会失败，失败时落回 Null
pub(crate) fn json_value<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}
