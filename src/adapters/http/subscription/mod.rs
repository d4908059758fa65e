//! HTTP adapter for subscription endpoints.
//!
//! - `POST /api/webhooks/stripe` - Handle Stripe webhooks
//! - `GET /api/tenants/:tenant_id/subscription` - Tenant subscription view
//! - `GET /api/tenants/:tenant_id/access` - Access Gate check

pub mod dto;
pub mod handlers;
pub mod routes;

pub use dto::*;
pub use handlers::{SubscriptionAppState, SubscriptionApiError, WebhookApiError, STRIPE_SIGNATURE_HEADER};
pub use routes::subscription_router;
