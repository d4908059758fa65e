//! Stripe subscription lookup adapter.
//!
//! Implements the `SubscriptionLookup` port with `GET /v1/subscriptions/{id}`
//! and reads the tenant linkage from the subscription's metadata.
//!
//! # Configuration
//!
//! ```ignore
//! let config = StripeLookupConfig::new(api_key);
//! let lookup = StripeSubscriptionLookup::new(config);
//! ```

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use crate::domain::foundation::{DomainError, ErrorCode, TenantId};
use crate::domain::subscription::SubscriptionObject;
use crate::ports::SubscriptionLookup;

/// Stripe API configuration for subscription lookups.
#[derive(Clone)]
pub struct StripeLookupConfig {
    /// Stripe secret API key (sk_live_... or sk_test_...).
    api_key: SecretString,

    /// Base URL for Stripe API (default: https://api.stripe.com).
    api_base_url: String,
}

impl StripeLookupConfig {
    pub fn new(api_key: SecretString) -> Self {
        Self {
            api_key,
            api_base_url: "https://api.stripe.com".to_string(),
        }
    }

    /// Set a custom API base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }
}

/// Looks subscriptions up on the Stripe REST API.
pub struct StripeSubscriptionLookup {
    config: StripeLookupConfig,
    http_client: reqwest::Client,
}

impl StripeSubscriptionLookup {
    pub fn new(config: StripeLookupConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }
}

fn unavailable(message: impl Into<String>) -> DomainError {
    DomainError::new(ErrorCode::ProviderUnavailable, message)
}

#[async_trait]
impl SubscriptionLookup for StripeSubscriptionLookup {
    async fn tenant_for_subscription(
        &self,
        subscription_id: &str,
    ) -> Result<Option<TenantId>, DomainError> {
        let url = format!(
            "{}/v1/subscriptions/{}",
            self.config.api_base_url, subscription_id
        );

        let response = self
            .http_client
            .get(&url)
            .basic_auth(self.config.api_key.expose_secret(), Option::<&str>::None)
            .send()
            .await
            .map_err(|e| unavailable(format!("Stripe request failed: {}", e)))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            tracing::warn!(subscription_id = %subscription_id, "Stripe does not know subscription");
            return Ok(None);
        }

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, error = %error_text, "Stripe subscription lookup failed");
            return Err(unavailable(format!("Stripe API error {}: {}", status, error_text)));
        }

        let subscription: SubscriptionObject = response
            .json()
            .await
            .map_err(|e| unavailable(format!("Failed to parse Stripe response: {}", e)))?;

        match subscription.tenant_id() {
            Ok(tenant_id) => Ok(tenant_id),
            Err(e) => {
                tracing::warn!(subscription_id = %subscription_id, error = %e, "Ignoring subscription metadata");
                Ok(None)
            }
        }
    }
}

/// Lookup used when no Stripe API key is configured.
///
/// Invoices without metadata linkage then resolve to no tenant.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledSubscriptionLookup;

#[async_trait]
impl SubscriptionLookup for DisabledSubscriptionLookup {
    async fn tenant_for_subscription(
        &self,
        subscription_id: &str,
    ) -> Result<Option<TenantId>, DomainError> {
        tracing::debug!(
            subscription_id = %subscription_id,
            "Subscription lookup disabled, no Stripe API key configured"
        );
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Path;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;

    const TENANT: &str = "550e8400-e29b-41d4-a716-446655440000";

    /// Serves a fake `/v1/subscriptions/:id` on an ephemeral port.
    async fn fake_stripe() -> String {
        async fn subscription(
            Path(id): Path<String>,
            headers: HeaderMap,
        ) -> Result<Json<serde_json::Value>, StatusCode> {
            if !headers.contains_key("authorization") {
                return Err(StatusCode::UNAUTHORIZED);
            }
            match id.as_str() {
                "sub_linked" => Ok(Json(json!({
                    "id": id,
                    "object": "subscription",
                    "metadata": {"organization_id": TENANT}
                }))),
                "sub_bare" => Ok(Json(json!({"id": id, "metadata": {}}))),
                "sub_garbled" => Ok(Json(json!({"id": id, "metadata": {"organization_id": "x"}}))),
                "sub_broken" => Err(StatusCode::BAD_GATEWAY),
                _ => Err(StatusCode::NOT_FOUND),
            }
        }

        let app = Router::new().route("/v1/subscriptions/:id", get(subscription));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn lookup(base_url: &str) -> StripeSubscriptionLookup {
        StripeSubscriptionLookup::new(
            StripeLookupConfig::new(SecretString::new("sk_test_123".to_string()))
                .with_base_url(base_url),
        )
    }

    #[tokio::test]
    async fn resolves_tenant_from_subscription_metadata() {
        let base = fake_stripe().await;

        let tenant = lookup(&base).tenant_for_subscription("sub_linked").await.unwrap();

        assert_eq!(tenant.unwrap().to_string(), TENANT);
    }

    #[tokio::test]
    async fn missing_or_invalid_linkage_is_none() {
        let base = fake_stripe().await;
        let lookup = lookup(&base);

        assert!(lookup.tenant_for_subscription("sub_bare").await.unwrap().is_none());
        assert!(lookup.tenant_for_subscription("sub_garbled").await.unwrap().is_none());
        assert!(lookup.tenant_for_subscription("sub_unknown").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn server_error_is_provider_unavailable() {
        let base = fake_stripe().await;

        let err = lookup(&base)
            .tenant_for_subscription("sub_broken")
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::ProviderUnavailable);
    }

    #[tokio::test]
    async fn connection_failure_is_provider_unavailable() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = lookup(&format!("http://{}", addr))
            .tenant_for_subscription("sub_linked")
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::ProviderUnavailable);
    }

    #[tokio::test]
    async fn disabled_lookup_resolves_nothing() {
        let tenant = DisabledSubscriptionLookup
            .tenant_for_subscription("sub_linked")
            .await
            .unwrap();

        assert!(tenant.is_none());
    }
}
