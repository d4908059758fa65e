//! In-memory implementation of TenantSubscriptionStore.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, ErrorCode, TenantId};
use crate::domain::subscription::{StatusUpdate, TenantSubscription};
use crate::ports::TenantSubscriptionStore;

/// Tenant subscription records held in a map.
///
/// Every update runs under the write guard, so concurrent updates for the
/// same tenant are serialized and each leaves a complete record.
#[derive(Default)]
pub struct InMemoryTenantSubscriptionStore {
    records: RwLock<HashMap<TenantId, TenantSubscription>>,
}

impl InMemoryTenantSubscriptionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a freshly provisioned (`trial`) tenant.
    pub async fn provision(&self, tenant_id: TenantId) -> TenantSubscription {
        let record = TenantSubscription::provisioned(tenant_id);
        self.records.write().await.insert(tenant_id, record.clone());
        record
    }
}

#[async_trait]
impl TenantSubscriptionStore for InMemoryTenantSubscriptionStore {
    async fn apply_status_update(
        &self,
        update: &StatusUpdate,
    ) -> Result<TenantSubscription, DomainError> {
        let mut records = self.records.write().await;
        let record = records.get_mut(&update.tenant_id).ok_or_else(|| {
            DomainError::new(
                ErrorCode::TenantNotFound,
                format!("Tenant {} not found", update.tenant_id),
            )
        })?;
        record.apply(update, Utc::now());
        Ok(record.clone())
    }

    async fn find_by_tenant_id(
        &self,
        tenant_id: &TenantId,
    ) -> Result<Option<TenantSubscription>, DomainError> {
        Ok(self.records.read().await.get(tenant_id).cloned())
    }
}
