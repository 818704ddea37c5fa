//! 跨实体共享的模型类型

use serde::{Deserialize, Serialize};

/// 实体生命周期标记
/// 软删除即把 lifecycle 置为 inactive，记录永不物理删除
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Lifecycle {
    Active,
    Inactive,
}

impl Lifecycle {
    pub fn as_str(&self) -> &'static str {
        match self {
            Lifecycle::Active => "active",
            Lifecycle::Inactive => "inactive",
        }
    }
}

impl std::fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 列表查询参数
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub include_inactive: Option<bool>,
}

impl ListParams {
    const DEFAULT_LIMIT: i64 = 50;
    const MAX_LIMIT: i64 = 200;

    pub fn limit(&self) -> i64 {
        self.limit
            .unwrap_or(Self::DEFAULT_LIMIT)
            .clamp(1, Self::MAX_LIMIT)
    }

    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }

    pub fn include_inactive(&self) -> bool {
        self.include_inactive.unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifecycle_serialization() {
        assert_eq!(
            serde_json::to_value(Lifecycle::Active).unwrap(),
            serde_json::json!("active")
        );
        assert_eq!(
            serde_json::to_value(Lifecycle::Inactive).unwrap(),
            serde_json::json!("inactive")
        );
    }

    #[test]
    fn test_list_params_clamping() {
        let params = ListParams {
            limit: Some(10_000),
            offset: Some(-5),
            include_inactive: None,
        };
        assert_eq!(params.limit(), 200);
        assert_eq!(params.offset(), 0);
        assert!(!params.include_inactive());

        let defaults = ListParams::default();
        assert_eq!(defaults.limit(), 50);
        assert_eq!(defaults.offset(), 0);
    }
}
