//! 采购单领域模型

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::common::Lifecycle;

/// 采购单状态
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// 待审批
    Pending,
    /// 已批准
    Approved,
    /// 已驳回
    Rejected,
    /// 已完成（库存已入账）
    Completed,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Approved => "approved",
            OrderStatus::Rejected => "rejected",
            OrderStatus::Completed => "completed",
        }
    }

    /// 状态机转移表，此处未列出的组合一律拒绝
    pub fn can_transition(self, next: OrderStatus) -> bool {
        matches!(
            (self, next),
            (OrderStatus::Pending, OrderStatus::Approved)
                | (OrderStatus::Pending, OrderStatus::Rejected)
                | (OrderStatus::Approved, OrderStatus::Completed)
        )
    }

    /// 终态不再接受任何转移
    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Rejected | OrderStatus::Completed)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 采购单行项
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderItem {
    pub product_id: Uuid,
    pub quantity: i64,
    pub unit_cost: Decimal,
}

/// 采购单，行项内嵌于单据
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseOrder {
    pub id: Uuid,
    pub supplier_id: Uuid,
    pub items: Vec<OrderItem>,
    pub status: OrderStatus,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub approved_at: Option<DateTime<Utc>>,
    pub rejected_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
    pub lifecycle: Lifecycle,
}

impl PurchaseOrder {
    /// 单据总额，按行项推导，不落库
    pub fn total_cost(&self) -> Decimal {
        self.items
            .iter()
            .map(|item| item.unit_cost * Decimal::from(item.quantity))
            .sum()
    }
}

/// 行项请求
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct OrderItemRequest {
    pub product_id: Uuid,
    #[validate(range(min = 1))]
    pub quantity: i64,
    pub unit_cost: Decimal,
}

impl From<OrderItemRequest> for OrderItem {
    fn from(req: OrderItemRequest) -> Self {
        Self {
            product_id: req.product_id,
            quantity: req.quantity,
            unit_cost: req.unit_cost,
        }
    }
}

/// 创建采购单请求
#[derive(Debug, Deserialize, Validate)]
pub struct CreateOrderRequest {
    pub supplier_id: Uuid,
    #[validate(length(min = 1), nested)]
    pub items: Vec<OrderItemRequest>,
}

/// 更新采购单请求，仅 pending 状态可用
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateOrderRequest {
    pub supplier_id: Option<Uuid>,
    #[validate(length(min = 1), nested)]
    pub items: Option<Vec<OrderItemRequest>>,
}

/// 驳回请求
#[derive(Debug, Deserialize, Validate)]
pub struct RejectOrderRequest {
    #[validate(length(min = 1, max = 500))]
    pub reason: String,
}

/// 采购单响应，附带推导总额
#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub id: Uuid,
    pub supplier_id: Uuid,
    pub items: Vec<OrderItem>,
    pub status: OrderStatus,
    pub total_cost: Decimal,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejected_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    pub lifecycle: Lifecycle,
}

impl From<PurchaseOrder> for OrderResponse {
    fn from(order: PurchaseOrder) -> Self {
        let total_cost = order.total_cost();
        Self {
            id: order.id,
            supplier_id: order.supplier_id,
            items: order.items,
            status: order.status,
            total_cost,
            created_by: order.created_by,
            created_at: order.created_at,
            updated_at: order.updated_at,
            approved_at: order.approved_at,
            rejected_at: order.rejected_at,
            completed_at: order.completed_at,
            rejection_reason: order.rejection_reason,
            lifecycle: order.lifecycle,
        }
    }
}
