//! CheckTenantAccessHandler - Access Gate query.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, ErrorCode, TenantId};
use crate::domain::subscription::SubscriptionStatus;
use crate::ports::TenantSubscriptionStore;

/// Query to check if a tenant may use the application.
#[derive(Debug, Clone)]
pub struct CheckTenantAccessQuery {
    pub tenant_id: TenantId,
}

/// Result of access check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckTenantAccessResult {
    /// Whether the tenant's users may log in.
    pub has_access: bool,
    pub status: SubscriptionStatus,
}

/// Handler for the Access Gate.
///
/// Reads the record the webhook synchronizer writes; no caching, so a
/// processed event is visible on the next check.
pub struct CheckTenantAccessHandler {
    store: Arc<dyn TenantSubscriptionStore>,
}

impl CheckTenantAccessHandler {
    pub fn new(store: Arc<dyn TenantSubscriptionStore>) -> Self {
        Self { store }
    }

    pub async fn handle(
        &self,
        query: CheckTenantAccessQuery,
    ) -> Result<CheckTenantAccessResult, DomainError> {
        let record = self
            .store
            .find_by_tenant_id(&query.tenant_id)
            .await?
            .ok_or_else(|| {
                DomainError::new(
                    ErrorCode::TenantNotFound,
                    format!("Tenant {} not found", query.tenant_id),
                )
            })?;

        Ok(CheckTenantAccessResult {
            has_access: record.has_access(),
            status: record.status,
        })
    }
}
