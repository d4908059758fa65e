//! Subscription domain module.
//!
//! Tenant subscription lifecycle as driven by Stripe webhooks.
//!
//! # Module Structure
//!
//! - `status` - SubscriptionStatus and the provider status mapping
//! - `record` - TenantSubscription, the stored per-tenant record
//! - `update` - StatusUpdate, the single mutation a webhook produces
//! - `provider_event` - Typed, fail-closed Stripe event envelope
//! - `webhook_verifier` - Stripe-Signature HMAC verification
//! - `webhook_errors` - Error taxonomy and HTTP mapping

mod provider_event;
mod record;
mod status;
mod update;
mod webhook_errors;
mod webhook_verifier;

pub use provider_event::{
    tenant_from_metadata, EventMeta, InvoiceObject, ProviderEvent, SubscriptionDetails,
    SubscriptionObject, INVOICE_PAYMENT_SUCCEEDED, SUBSCRIPTION_DELETED, SUBSCRIPTION_UPDATED,
    TENANT_METADATA_KEY,
};
pub use record::TenantSubscription;
pub use status::SubscriptionStatus;
pub use update::StatusUpdate;
pub use webhook_errors::{WebhookError, WebhookErrorKind};
pub use webhook_verifier::{SignatureHeader, WebhookVerifier, DEFAULT_TOLERANCE_SECS};
