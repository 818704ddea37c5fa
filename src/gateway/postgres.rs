//! PostgreSQL 网关实现
//! 每张表为 (id UUID, doc JSONB) 文档表，过滤走 JSONB 包含查询

use async_trait::async_trait;
use serde_json::Value;
use sqlx::{postgres::PgRow, PgPool, Row};
use uuid::Uuid;

use super::{Filter, GatewayError, Patch, Record, Table, TableGateway};

pub struct PgGateway {
    db: PgPool,
}

impl PgGateway {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    fn doc_from_row(row: PgRow) -> Result<Record, GatewayError> {
        let doc: Value = row
            .try_get("doc")
            .map_err(|e| GatewayError::Malformed(e.to_string()))?;
        match doc {
            Value::Object(map) => Ok(map),
            _ => Err(GatewayError::Malformed(
                "stored doc is not a JSON object".to_string(),
            )),
        }
    }
}

#[async_trait]
impl TableGateway for PgGateway {
    async fn select(&self, table: Table, filter: &Filter) -> Result<Vec<Record>, GatewayError> {
        let mut query = format!("SELECT doc FROM {}", table.as_str());
        if !filter.is_empty() {
            query.push_str(" WHERE doc @> $1");
        }

        let rows = if filter.is_empty() {
            sqlx::query(&query).fetch_all(&self.db).await?
        } else {
            sqlx::query(&query)
                .bind(filter.to_doc())
                .fetch_all(&self.db)
                .await?
        };

        rows.into_iter().map(Self::doc_from_row).collect()
    }

    async fn insert(&self, table: Table, record: Record) -> Result<Record, GatewayError> {
        let id = record
            .get("id")
            .and_then(|v| v.as_str())
            .and_then(|s| Uuid::parse_str(s).ok())
            .ok_or_else(|| GatewayError::Malformed("record missing uuid id".to_string()))?;

        let query = format!(
            "INSERT INTO {} (id, doc) VALUES ($1, $2) RETURNING doc",
            table.as_str()
        );

        let row = sqlx::query(&query)
            .bind(id)
            .bind(Value::Object(record))
            .fetch_one(&self.db)
            .await?;

        Self::doc_from_row(row)
    }

    async fn update(
        &self,
        table: Table,
        filter: &Filter,
        patch: &Patch,
    ) -> Result<Option<Record>, GatewayError> {
        if filter.is_empty() {
            return Err(GatewayError::Query(
                "conditional update requires a filter".to_string(),
            ));
        }

        // 行锁后包含条件重新校验；并发修改使其失效时整条语句不更新任何行
        let query = format!(
            "UPDATE {t} SET doc = doc || $2 \
             WHERE id = (SELECT id FROM {t} WHERE doc @> $1 ORDER BY id LIMIT 1 FOR UPDATE) \
               AND doc @> $1 \
             RETURNING doc",
            t = table.as_str()
        );

        let row = sqlx::query(&query)
            .bind(filter.to_doc())
            .bind(patch.to_doc())
            .fetch_optional(&self.db)
            .await?;

        row.map(Self::doc_from_row).transpose()
    }

    async fn ping(&self) -> Result<(), GatewayError> {
        sqlx::query("SELECT 1").fetch_one(&self.db).await?;
        Ok(())
    }
}
