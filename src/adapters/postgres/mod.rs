//! PostgreSQL adapters - Database implementations for repository ports.
//!
//! - `PostgresTenantSubscriptionStore` - Subscription columns of `organizations`
//! - `PostgresWebhookAuditLog` - Append-only `webhook_events` table

mod tenant_subscription_store;
mod webhook_audit_log;

pub use tenant_subscription_store::PostgresTenantSubscriptionStore;
pub use webhook_audit_log::PostgresWebhookAuditLog;
