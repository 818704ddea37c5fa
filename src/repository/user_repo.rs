//! 用户仓储

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    error::AppError,
    gateway::{from_record, to_record, Filter, Patch, Table, TableGateway},
    models::{common::Lifecycle, user::User},
};

use super::json_value;

pub struct UserRepository {
    gateway: Arc<dyn TableGateway>,
}

impl UserRepository {
    pub fn new(gateway: Arc<dyn TableGateway>) -> Self {
        Self { gateway }
    }

    pub async fn insert(&self, user: &User) -> Result<User, AppError> {
        let record = to_record(user)?;
        let stored = self.gateway.insert(Table::Users, record).await?;
        Ok(from_record(stored)?)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let filter = Filter::by_id(id).eq("lifecycle", Lifecycle::Active.as_str());
        let mut rows = self.gateway.select(Table::Users, &filter).await?;
        match rows.pop() {
            Some(record) => Ok(Some(from_record(record)?)),
            None => Ok(None),
        }
    }

    /// 按用户名查询活跃用户（登录用）
    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let filter = Filter::new()
            .eq("username", username)
            .eq("lifecycle", Lifecycle::Active.as_str());
        let mut rows = self.gateway.select(Table::Users, &filter).await?;
        match rows.pop() {
            Some(record) => Ok(Some(from_record(record)?)),
            None => Ok(None),
        }
    }

    /// 全量用户数（含停用），引导管理员判定用
    pub async fn count_all(&self) -> Result<usize, AppError> {
        let rows = self.gateway.select(Table::Users, &Filter::new()).await?;
        Ok(rows.len())
    }

    pub async fn list(
        &self,
        include_inactive: bool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<User>, AppError> {
        let mut filter = Filter::new();
        if !include_inactive {
            filter = filter.eq("lifecycle", Lifecycle::Active.as_str());
        }

        let rows = self.gateway.select(Table::Users, &filter).await?;
        let mut users = rows
            .into_iter()
            .map(from_record::<User>)
            .collect::<Result<Vec<_>, _>>()?;

        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(users
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    /// 更新资料字段，password_hash 与 role 由服务层决定后传入
    pub async fn update(
        &self,
        id: Uuid,
        patch: Patch,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, AppError> {
        let filter = Filter::by_id(id).eq("lifecycle", Lifecycle::Active.as_str());
        let patch = patch.set("updated_at", json_value(&now));
        let updated = self.gateway.update(Table::Users, &filter, &patch).await?;
        match updated {
            Some(record) => Ok(Some(from_record(record)?)),
            None => Ok(None),
        }
    }

    pub async fn soft_delete(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, AppError> {
        let filter = Filter::by_id(id).eq("lifecycle", Lifecycle::Active.as_str());
        let patch = Patch::new()
            .set("lifecycle", Lifecycle::Inactive.as_str())
            .set("updated_at", json_value(&now));
        let updated = self.gateway.update(Table::Users, &filter, &patch).await?;
        match updated {
            Some(record) => Ok(Some(from_record(record)?)),
            None => Ok(None),
        }
    }
}
