//! In-memory adapters.
//!
//! Process-local implementations of the store and audit ports, used by
//! integration tests and local development without PostgreSQL.
//!
//! - `InMemoryTenantSubscriptionStore` - Tenant records behind one lock
//! - `InMemoryWebhookAuditLog` - Append-only vector of audit records

mod tenant_subscription_store;
mod webhook_audit_log;

pub use tenant_subscription_store::InMemoryTenantSubscriptionStore;
pub use webhook_audit_log::InMemoryWebhookAuditLog;
