//! Axum router configuration for subscription endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    check_tenant_access, get_tenant_subscription, handle_stripe_webhook, SubscriptionAppState,
};

/// Tenant read endpoints.
///
/// # Routes
/// - `GET /:tenant_id/subscription` - Subscription view for the billing page
/// - `GET /:tenant_id/access` - Access Gate check
pub fn tenant_routes() -> Router<SubscriptionAppState> {
    Router::new()
        .route("/:tenant_id/subscription", get(get_tenant_subscription))
        .route("/:tenant_id/access", get(check_tenant_access))
}

/// Create the Stripe webhook router.
///
/// Webhooks carry no user authentication; they are verified by signature.
///
/// # Routes
/// - `POST /stripe` - Handle Stripe webhooks
pub fn webhook_routes() -> Router<SubscriptionAppState> {
    Router::new().route("/stripe", post(handle_stripe_webhook))
}

/// Combines tenant and webhook routes, for mounting under `/api`.
pub fn subscription_router() -> Router<SubscriptionAppState> {
    Router::new()
        .nest("/tenants", tenant_routes())
        .nest("/webhooks", webhook_routes())
}
