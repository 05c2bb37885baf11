//! Snippet repository backed by PostgreSQL

use async_trait::async_trait;
use chrono::{TimeDelta, Utc};
use sqlx::PgPool;
use tracing::info;

use super::{LATEST_SNIPPETS, ModelError, SnippetStore};
use crate::models::Snippet;

/// Snippet repository
#[derive(Clone)]
pub struct PgSnippetRepository {
    pool: PgPool,
}

impl PgSnippetRepository {
    /// Create a new snippet repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SnippetStore for PgSnippetRepository {
    async fn insert(
        &self,
        title: &str,
        content: &str,
        expires_days: i64,
    ) -> Result<i64, ModelError> {
        let created = Utc::now();
        let expires = TimeDelta::try_days(expires_days)
            .and_then(|period| created.checked_add_signed(period))
            .ok_or_else(|| anyhow::anyhow!("expiry of {} days is out of range", expires_days))?;

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO snippets (title, content, created, expires)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(title)
        .bind(content)
        .bind(created)
        .bind(expires)
        .fetch_one(&self.pool)
        .await?;

        info!(snippet_id = id, "Created snippet");
        Ok(id)
    }

    async fn get(&self, id: i64) -> Result<Snippet, ModelError> {
        sqlx::query_as::<_, Snippet>(
            r#"
            SELECT id, title, content, created, expires
            FROM snippets
            WHERE expires >= NOW() AND id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(ModelError::NoRecord)
    }

    async fn latest(&self) -> Result<Vec<Snippet>, ModelError> {
        let snippets = sqlx::query_as::<_, Snippet>(
            r#"
            SELECT id, title, content, created, expires
            FROM snippets
            WHERE expires >= NOW()
            ORDER BY id DESC
            LIMIT $1
            "#,
        )
        .bind(LATEST_SNIPPETS)
        .fetch_all(&self.pool)
        .await?;

        Ok(snippets)
    }
}
