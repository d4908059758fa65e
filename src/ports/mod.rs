//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `TenantSubscriptionStore` - Per-tenant subscription record (read and write)
//! - `SubscriptionLookup` - Tenant linkage lookup at the payment provider
//! - `WebhookAuditLog` - Best-effort log of webhook deliveries

mod subscription_lookup;
mod tenant_subscription_store;
mod webhook_audit_log;

pub use subscription_lookup::SubscriptionLookup;
pub use tenant_subscription_store::TenantSubscriptionStore;
pub use webhook_audit_log::{AuditResult, WebhookAuditLog, WebhookAuditRecord};
