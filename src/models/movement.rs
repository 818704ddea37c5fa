//! 库存移动领域模型

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// 移动方向
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MovementDirection {
    In,
    Out,
}

impl MovementDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementDirection::In => "in",
            MovementDirection::Out => "out",
        }
    }

    /// 带符号的数量变化
    pub fn signed(&self, quantity: i64) -> i64 {
        match self {
            MovementDirection::In => quantity,
            MovementDirection::Out => -quantity,
        }
    }

    pub fn reverse(&self) -> MovementDirection {
        match self {
            MovementDirection::In => MovementDirection::Out,
            MovementDirection::Out => MovementDirection::In,
        }
    }
}

impl std::fmt::Display for MovementDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 库存移动记录，创建后不可变
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockMovement {
    pub id: Uuid,
    pub product_id: Uuid,
    pub direction: MovementDirection,
    /// 移动数量，恒为正
    pub quantity: i64,
    /// 提交后的现有库存
    pub quantity_after: i64,
    /// 由采购单完成产生的移动带单号
    pub order_id: Option<Uuid>,
    pub reason: Option<String>,
    pub actor_id: Uuid,
    pub occurred_at: DateTime<Utc>,
}

/// 创建库存移动请求
#[derive(Debug, Deserialize, Validate)]
pub struct CreateMovementRequest {
    pub product_id: Uuid,
    pub direction: MovementDirection,
    #[validate(range(min = 1))]
    pub quantity: i64,
    #[validate(length(max = 500))]
    pub reason: Option<String>,
}

/// 库存移动查询过滤
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MovementListFilters {
    pub product_id: Option<Uuid>,
    pub direction: Option<MovementDirection>,
    pub order_id: Option<Uuid>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_signed() {
        assert_eq!(MovementDirection::In.signed(5), 5);
        assert_eq!(MovementDirection::Out.signed(5), -5);
    }

    #[test]
    fn test_direction_reverse() {
        assert_eq!(MovementDirection::In.reverse(), MovementDirection::Out);
        assert_eq!(MovementDirection::Out.reverse(), MovementDirection::In);
    }

    #[test]
    fn test_direction_serialization() {
        assert_eq!(
            serde_json::to_value(MovementDirection::In).unwrap(),
            serde_json::json!("in")
        );
        assert_eq!(
            serde_json::to_value(MovementDirection::Out).unwrap(),
            serde_json::json!("out")
        );
    }

    #[test]
    fn test_quantity_must_be_positive() {
        let request = CreateMovementRequest {
            product_id: Uuid::new_v4(),
            direction: MovementDirection::In,
            quantity: 0,
            reason: None,
        };
        assert!(request.validate().is_err());

        let request = CreateMovementRequest {
            product_id: Uuid::new_v4(),
            direction: MovementDirection::Out,
            quantity: 1,
            reason: None,
        };
        assert!(request.validate().is_ok());
    }
}
