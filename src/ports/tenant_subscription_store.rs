//! Tenant subscription store port.
//!
//! The synchronizer writes through this port and the Access Gate reads
//! through it. Both sides see the same record.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, TenantId};
use crate::domain::subscription::{StatusUpdate, TenantSubscription};

/// Persistence port for per-tenant subscription records.
///
/// Records are provisioned outside this component and never deleted here.
#[async_trait]
pub trait TenantSubscriptionStore: Send + Sync {
    /// Applies a status update as one atomic write and returns the stored
    /// record.
    ///
    /// The write must follow `TenantSubscription::apply`: status overwritten,
    /// subscription id replaced only when present, customer id set only when
    /// empty. Concurrent calls for the same tenant must each see a complete
    /// record; the last one to commit wins.
    ///
    /// # Errors
    ///
    /// - `TenantNotFound` if no record exists for the tenant
    /// - `DatabaseError` on persistence failure
    async fn apply_status_update(
        &self,
        update: &StatusUpdate,
    ) -> Result<TenantSubscription, DomainError>;

    /// Find a tenant's subscription record.
    ///
    /// Returns `None` if the tenant is unknown.
    async fn find_by_tenant_id(
        &self,
        tenant_id: &TenantId,
    ) -> Result<Option<TenantSubscription>, DomainError>;
}
