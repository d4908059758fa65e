//! In-memory implementation of WebhookAuditLog.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::foundation::DomainError;
use crate::ports::{WebhookAuditLog, WebhookAuditRecord};

#[derive(Default)]
pub struct InMemoryWebhookAuditLog {
    records: RwLock<Vec<WebhookAuditRecord>>,
}

impl InMemoryWebhookAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    // === Test Helpers ===

    /// Returns all records in insertion order.
    pub async fn records(&self) -> Vec<WebhookAuditRecord> {
        self.records.read().await.clone()
    }

    /// Returns records for one Stripe event id.
    pub async fn records_for_event(&self, event_id: &str) -> Vec<WebhookAuditRecord> {
        self.records
            .read()
            .await
            .iter()
            .filter(|r| r.event_id == event_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl WebhookAuditLog for InMemoryWebhookAuditLog {
    async fn record(&self, record: WebhookAuditRecord) -> Result<(), DomainError> {
        self.records.write().await.push(record);
        Ok(())
    }
}
