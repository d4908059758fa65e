//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `http` - Axum REST API
//! - `postgres` - PostgreSQL tenant store and webhook audit log
//! - `memory` - In-process store and audit log for tests and local runs
//! - `stripe` - Stripe REST subscription lookup

pub mod http;
pub mod memory;
pub mod postgres;
pub mod stripe;

pub use memory::{InMemoryTenantSubscriptionStore, InMemoryWebhookAuditLog};
pub use postgres::{PostgresTenantSubscriptionStore, PostgresWebhookAuditLog};
pub use stripe::{DisabledSubscriptionLookup, StripeLookupConfig, StripeSubscriptionLookup};
