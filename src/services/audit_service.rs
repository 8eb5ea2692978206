use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;
use crate::models::activity::ActivityEvent;

/// One-way sink for structured activity events. The engine fires one event
/// per mutation (and per denied attempt) and never consumes a return value;
/// a sink failure must not fail the mutation it describes.
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn record(&self, event: ActivityEvent) -> Result<()>;
}

#[derive(Clone)]
pub struct PgAuditSink {
    pool: PgPool,
}

impl PgAuditSink {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditSink for PgAuditSink {
    async fn record(&self, event: ActivityEvent) -> Result<()> {
        let state_change = event
            .state_change
            .as_ref()
            .map(serde_json::to_value)
            .transpose()?;
        sqlx::query(
            r#"
            INSERT INTO activity_logs (
                id, action, category, resource_type, resource_id,
                state_change, actor, outcome
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&event.action)
        .bind(event.category.as_str())
        .bind(&event.resource_type)
        .bind(event.resource_id)
        .bind(state_change)
        .bind(&event.actor)
        .bind(&event.outcome)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
