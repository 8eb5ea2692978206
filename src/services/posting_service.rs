use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;

/// Read-only view of the posting/position catalogue owned by the wider
/// platform. The engine only ever asks these two questions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PostingDirectory: Send + Sync {
    async fn is_posting_active(&self, job_posting_id: Uuid) -> Result<bool>;

    async fn position_belongs_to_posting(
        &self,
        position_id: Uuid,
        job_posting_id: Uuid,
    ) -> Result<bool>;
}

#[derive(Clone)]
pub struct PgPostingDirectory {
    pool: PgPool,
}

impl PgPostingDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostingDirectory for PgPostingDirectory {
    async fn is_posting_active(&self, job_posting_id: Uuid) -> Result<bool> {
        let active: Option<bool> = sqlx::query_scalar(
            r#"SELECT is_active FROM job_postings WHERE id = $1"#,
        )
        .bind(job_posting_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(active.unwrap_or(false))
    }

    async fn position_belongs_to_posting(
        &self,
        position_id: Uuid,
        job_posting_id: Uuid,
    ) -> Result<bool> {
        let count: i64 = sqlx::query_scalar(
            r#"SELECT COUNT(*) FROM job_positions WHERE id = $1 AND job_posting_id = $2"#,
        )
        .bind(position_id)
        .bind(job_posting_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count > 0)
    }
}
