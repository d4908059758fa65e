//! Tenant subscription record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::status::SubscriptionStatus;
use super::update::StatusUpdate;
use crate::domain::foundation::TenantId;

/// Subscription state held for one tenant.
///
/// Created as `trial` when the tenant is provisioned, mutated only through
/// [`TenantSubscription::apply`], never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantSubscription {
    pub tenant_id: TenantId,
    pub status: SubscriptionStatus,
    pub stripe_subscription_id: Option<String>,
    pub stripe_customer_id: Option<String>,
    /// Purchased tier label, informational only.
    pub plan_type: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl TenantSubscription {
    /// The record a freshly provisioned tenant starts with.
    pub fn provisioned(tenant_id: TenantId) -> Self {
        Self {
            tenant_id,
            status: SubscriptionStatus::Trial,
            stripe_subscription_id: None,
            stripe_customer_id: None,
            plan_type: None,
            updated_at: Utc::now(),
        }
    }

    /// Applies a status update.
    ///
    /// The status is overwritten unconditionally: there is no ordering check,
    /// so whichever event is processed last wins. Applying the same update
    /// twice leaves the record as applying it once.
    pub fn apply(&mut self, update: &StatusUpdate, at: DateTime<Utc>) {
        self.status = update.status;
        if let Some(subscription_id) = &update.stripe_subscription_id {
            self.stripe_subscription_id = Some(subscription_id.clone());
        }
        if self.stripe_customer_id.is_none() {
            self.stripe_customer_id = update.stripe_customer_id.clone();
        }
        self.updated_at = at;
    }

    /// Whether the Access Gate lets this tenant in.
    pub fn has_access(&self) -> bool {
        self.status.grants_access()
    }
}
