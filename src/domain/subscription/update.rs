//! The single mutation a webhook event can produce.

use super::status::SubscriptionStatus;
use crate::domain::foundation::TenantId;

/// Status write computed from one verified provider event.
///
/// Applied atomically by the tenant store. The optional ids follow
/// different rules: a subscription id replaces the stored one but is never
/// cleared, a customer id is only written when none is stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate {
    pub tenant_id: TenantId,
    pub status: SubscriptionStatus,
    pub stripe_subscription_id: Option<String>,
    pub stripe_customer_id: Option<String>,
}

impl StatusUpdate {
    /// Creates an update that only touches the status.
    pub fn new(tenant_id: TenantId, status: SubscriptionStatus) -> Self {
        Self {
            tenant_id,
            status,
            stripe_subscription_id: None,
            stripe_customer_id: None,
        }
    }

    pub fn with_subscription_id(mut self, subscription_id: Option<String>) -> Self {
        self.stripe_subscription_id = subscription_id.filter(|id| !id.is_empty());
        self
    }

    pub fn with_customer_id(mut self, customer_id: Option<String>) -> Self {
        self.stripe_customer_id = customer_id.filter(|id| !id.is_empty());
        self
    }
}
