//! Subscription lookup port.
//!
//! Invoice events do not always carry the subscription's metadata. This
//! port asks the payment provider which tenant a subscription belongs to.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, TenantId};

#[async_trait]
pub trait SubscriptionLookup: Send + Sync {
    /// Resolve the tenant linked to a provider subscription id.
    ///
    /// Returns `None` when the subscription exists but carries no tenant
    /// linkage, or when the provider does not know the subscription.
    ///
    /// # Errors
    ///
    /// - `ProviderUnavailable` on transport failures or provider 5xx
    async fn tenant_for_subscription(
        &self,
        subscription_id: &str,
    ) -> Result<Option<TenantId>, DomainError>;
}
