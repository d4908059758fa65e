//! GetTenantSubscriptionHandler - Query handler for a tenant's subscription view.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, TenantId};
use crate::domain::subscription::TenantSubscription;
use crate::ports::TenantSubscriptionStore;

/// Query to get a tenant's subscription record.
#[derive(Debug, Clone)]
pub struct GetTenantSubscriptionQuery {
    pub tenant_id: TenantId,
}

/// Result of successful subscription query.
pub type GetTenantSubscriptionResult = Option<TenantSubscription>;

/// Returns the stored record for the billing page, or `None` if the tenant
/// is unknown.
pub struct GetTenantSubscriptionHandler {
    store: Arc<dyn TenantSubscriptionStore>,
}

impl GetTenantSubscriptionHandler {
    pub fn new(store: Arc<dyn TenantSubscriptionStore>) -> Self {
        Self { store }
    }

    pub async fn handle(
        &self,
        query: GetTenantSubscriptionQuery,
    ) -> Result<GetTenantSubscriptionResult, DomainError> {
        self.store.find_by_tenant_id(&query.tenant_id).await
    }
}
