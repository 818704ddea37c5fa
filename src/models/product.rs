//! 商品领域模型

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::common::Lifecycle;

/// SKU 格式：大写字母数字开头，允许连字符，2-32 位
static SKU_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z0-9][A-Z0-9-]{1,31}$").unwrap());

pub fn validate_sku(sku: &str) -> Result<(), ValidationError> {
    if SKU_PATTERN.is_match(sku) {
        Ok(())
    } else {
        Err(ValidationError::new("sku_format"))
    }
}

/// 商品
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    /// 库存单位编码，全局唯一
    pub sku: String,
    pub unit_price: Decimal,
    /// 现有库存，只允许通过库存台账变更
    pub quantity_on_hand: i64,
    /// 低库存阈值
    pub min_stock: i64,
    pub supplier_id: Option<Uuid>,
    pub lifecycle: Lifecycle,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn is_low_stock(&self) -> bool {
        self.quantity_on_hand <= self.min_stock
    }
}

/// 创建商品请求
/// 新商品库存从 0 开始，入库走库存移动
#[derive(Debug, Deserialize, Validate)]
pub struct CreateProductRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[validate(custom(function = validate_sku))]
    pub sku: String,
    pub unit_price: Decimal,
    #[validate(range(min = 0))]
    pub min_stock: Option<i64>,
    pub supplier_id: Option<Uuid>,
}

/// 更新商品请求
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProductRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[validate(custom(function = validate_sku))]
    pub sku: Option<String>,
    pub unit_price: Option<Decimal>,
    #[validate(range(min = 0))]
    pub min_stock: Option<i64>,
    pub supplier_id: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sku_pattern() {
        assert!(validate_sku("SKU-001").is_ok());
        assert!(validate_sku("A1").is_ok());
        assert!(validate_sku("9X-200-B").is_ok());

        assert!(validate_sku("sku-001").is_err());
        assert!(validate_sku("A").is_err());
        assert!(validate_sku("-A1").is_err());
        assert!(validate_sku("SKU 001").is_err());
        assert!(validate_sku("").is_err());
    }

    #[test]
    fn test_low_stock() {
        let mut product = Product {
            id: Uuid::new_v4(),
            name: "Widget".to_string(),
            description: None,
            sku: "WID-1".to_string(),
            unit_price: Decimal::new(1050, 2),
            quantity_on_hand: 5,
            min_stock: 5,
            supplier_id: None,
            lifecycle: Lifecycle::Active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(product.is_low_stock());

        product.quantity_on_hand = 6;
        assert!(!product.is_low_stock());
    }

    #[test]
    fn test_create_request_validation() {
        let valid = CreateProductRequest {
            name: "Widget".to_string(),
            description: None,
            sku: "WID-1".to_string(),
            unit_price: Decimal::ONE,
            min_stock: Some(0),
            supplier_id: None,
        };
        assert!(valid.validate().is_ok());

        let bad_sku = CreateProductRequest {
            name: "Widget".to_string(),
            description: None,
            sku: "wid 1".to_string(),
            unit_price: Decimal::ONE,
            min_stock: None,
            supplier_id: None,
        };
        assert!(bad_sku.validate().is_err());

        let negative_min = CreateProductRequest {
            name: "Widget".to_string(),
            description: None,
            sku: "WID-1".to_string(),
            unit_price: Decimal::ONE,
            min_stock: Some(-1),
            supplier_id: None,
        };
        assert!(negative_min.validate().is_err());
    }
}
