//! PostgreSQL implementation of WebhookAuditLog.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::{WebhookAuditLog, WebhookAuditRecord};

/// Appends webhook delivery records to `webhook_events`.
///
/// The table has no unique constraint on `event_id`; redeliveries add rows.
pub struct PostgresWebhookAuditLog {
    pool: PgPool,
}

impl PostgresWebhookAuditLog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WebhookAuditLog for PostgresWebhookAuditLog {
    async fn record(&self, record: WebhookAuditRecord) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO webhook_events (
                event_id, event_type, tenant_id, livemode, result, detail, processed_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(&record.event_id)
        .bind(&record.event_type)
        .bind(record.tenant_id.map(|id| *id.as_uuid()))
        .bind(record.livemode)
        .bind(record.result.as_str())
        .bind(&record.detail)
        .bind(record.processed_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to save webhook event: {}", e),
            )
        })?;

        Ok(())
    }
}
