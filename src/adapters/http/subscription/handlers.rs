//! HTTP handlers for subscription endpoints.
//!
//! These handlers connect Axum routes to application layer command/query handlers.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::{Json, Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;

use crate::application::handlers::subscription::{
    CheckTenantAccessHandler, CheckTenantAccessQuery, GetTenantSubscriptionHandler,
    GetTenantSubscriptionQuery, SyncSubscriptionStatusCommand, SyncSubscriptionStatusHandler,
};
use crate::domain::foundation::{DomainError, ErrorCode, TenantId};
use crate::domain::subscription::{WebhookError, WebhookErrorKind, WebhookVerifier};
use crate::ports::{SubscriptionLookup, TenantSubscriptionStore, WebhookAuditLog};

use super::dto::{
    ErrorResponse, TenantAccessResponse, TenantSubscriptionResponse, WebhookReceivedResponse,
};

/// Header carrying Stripe's webhook signature.
pub const STRIPE_SIGNATURE_HEADER: &str = "Stripe-Signature";

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared application state containing all dependencies.
///
/// Cloned for each request; dependencies are Arc-wrapped and immutable.
#[derive(Clone)]
pub struct SubscriptionAppState {
    pub verifier: WebhookVerifier,
    pub store: Arc<dyn TenantSubscriptionStore>,
    pub lookup: Arc<dyn SubscriptionLookup>,
    pub audit_log: Arc<dyn WebhookAuditLog>,
    /// Limit on the tenant store write; kept below the request timeout so a
    /// hung write is reported as a retryable store error.
    pub store_timeout: Duration,
}

impl SubscriptionAppState {
    /// Create handlers on demand from the shared state.
    pub fn sync_handler(&self) -> SyncSubscriptionStatusHandler {
        SyncSubscriptionStatusHandler::new(
            self.verifier.clone(),
            self.store.clone(),
            self.lookup.clone(),
            self.audit_log.clone(),
        )
        .with_store_timeout(self.store_timeout)
    }

    pub fn check_access_handler(&self) -> CheckTenantAccessHandler {
        CheckTenantAccessHandler::new(self.store.clone())
    }

    pub fn get_subscription_handler(&self) -> GetTenantSubscriptionHandler {
        GetTenantSubscriptionHandler::new(self.store.clone())
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/webhooks/stripe - Handle Stripe webhook events
///
/// The body is taken as raw bytes: the signature covers them exactly.
pub async fn handle_stripe_webhook(
    State(state): State<SubscriptionAppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, WebhookApiError> {
    let signature = headers
        .get(STRIPE_SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let cmd = SyncSubscriptionStatusCommand {
        payload: body.to_vec(),
        signature,
    };

    state.sync_handler().handle(cmd).await?;

    Ok(Json(WebhookReceivedResponse::received()))
}

/// GET /api/tenants/:tenant_id/subscription - Get a tenant's subscription
pub async fn get_tenant_subscription(
    State(state): State<SubscriptionAppState>,
    Path(tenant_id): Path<String>,
) -> Result<impl IntoResponse, SubscriptionApiError> {
    let tenant_id = parse_tenant_id(&tenant_id)?;
    let query = GetTenantSubscriptionQuery { tenant_id };

    let record = state
        .get_subscription_handler()
        .handle(query)
        .await?
        .ok_or_else(|| {
            DomainError::new(
                ErrorCode::TenantNotFound,
                format!("Tenant {} not found", tenant_id),
            )
        })?;

    Ok(Json(TenantSubscriptionResponse::from(record)))
}

/// GET /api/tenants/:tenant_id/access - Access Gate check
pub async fn check_tenant_access(
    State(state): State<SubscriptionAppState>,
    Path(tenant_id): Path<String>,
) -> Result<impl IntoResponse, SubscriptionApiError> {
    let tenant_id = parse_tenant_id(&tenant_id)?;
    let query = CheckTenantAccessQuery { tenant_id };

    let result = state.check_access_handler().handle(query).await?;

    Ok(Json(TenantAccessResponse::new(tenant_id, result)))
}

fn parse_tenant_id(raw: &str) -> Result<TenantId, DomainError> {
    raw.parse::<TenantId>()
        .map_err(|_| DomainError::validation("tenant_id", "Tenant ID must be a valid UUID"))
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts webhook errors to HTTP responses.
///
/// 4xx tells Stripe not to retry; 5xx asks for redelivery.
#[derive(Debug)]
pub struct WebhookApiError(WebhookError);

impl From<WebhookError> for WebhookApiError {
    fn from(err: WebhookError) -> Self {
        Self(err)
    }
}

impl IntoResponse for WebhookApiError {
    fn into_response(self) -> axum::response::Response {
        if self.0.is_acknowledged() {
            return (StatusCode::OK, Json(WebhookReceivedResponse::received())).into_response();
        }

        let error_code = match self.0.kind() {
            WebhookErrorKind::Authentication => "INVALID_SIGNATURE",
            WebhookErrorKind::MalformedPayload => "MALFORMED_PAYLOAD",
            WebhookErrorKind::UnresolvableTenant => "UNRESOLVABLE_TENANT",
            WebhookErrorKind::UnsupportedStatus => "UNSUPPORTED_STATUS",
            WebhookErrorKind::TransientStore => "STORE_UNAVAILABLE",
            WebhookErrorKind::ProviderUnavailable => "PROVIDER_UNAVAILABLE",
        };

        let body = ErrorResponse::new(error_code, self.0.to_string());
        (self.0.status_code(), Json(body)).into_response()
    }
}

/// API error type that converts query errors to HTTP responses.
#[derive(Debug)]
pub struct SubscriptionApiError(DomainError);

impl From<DomainError> for SubscriptionApiError {
    fn from(err: DomainError) -> Self {
        Self(err)
    }
}

impl IntoResponse for SubscriptionApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.0.code {
            ErrorCode::TenantNotFound => StatusCode::NOT_FOUND,
            ErrorCode::ValidationFailed => StatusCode::BAD_REQUEST,
            ErrorCode::DatabaseError | ErrorCode::ProviderUnavailable | ErrorCode::InternalError => {
                tracing::error!(error = %self.0, "Subscription query failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = ErrorResponse::new(self.0.code.to_string(), self.0.message);
        (status, Json(body)).into_response()
    }
}
