//! Subscription handlers.
//!
//! ## Commands
//! - Synchronizing tenant status from Stripe webhooks
//!
//! ## Queries
//! - Check tenant access (Access Gate)
//! - Get tenant subscription details

mod check_tenant_access;
mod get_tenant_subscription;
mod sync_subscription_status;

// Commands
pub use sync_subscription_status::{
    SyncOutcome, SyncSubscriptionStatusCommand, SyncSubscriptionStatusHandler,
};

// Queries
pub use check_tenant_access::{
    CheckTenantAccessHandler, CheckTenantAccessQuery, CheckTenantAccessResult,
};
pub use get_tenant_subscription::{
    GetTenantSubscriptionHandler, GetTenantSubscriptionQuery, GetTenantSubscriptionResult,
};
