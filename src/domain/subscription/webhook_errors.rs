//! Webhook error types for Stripe webhook handling.
//!
//! Every failure the synchronizer can hit is one of these variants. Each
//! carries its HTTP status mapping and retryability, which together decide
//! whether Stripe redelivers the event.

use axum::http::StatusCode;
use thiserror::Error;

/// Errors that occur during webhook processing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WebhookError {
    /// The Stripe-Signature header was absent.
    #[error("Missing Stripe-Signature header")]
    MissingSignature,

    /// The Stripe-Signature header could not be parsed.
    #[error("Malformed signature header: {0}")]
    MalformedSignature(String),

    /// Signature timestamp is too old or too far in the future.
    #[error("Timestamp outside the tolerance zone")]
    TimestampOutOfTolerance,

    /// No v1 signature matched the expected HMAC.
    #[error("Invalid signature")]
    InvalidSignature,

    /// Body does not parse into the expected envelope or object shape.
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    /// Event carries no usable tenant linkage.
    #[error("Unresolvable tenant: {0}")]
    UnresolvableTenant(String),

    /// Provider reported a subscription status outside the known vocabulary.
    #[error("Unsupported subscription status: {0}")]
    UnsupportedStatus(String),

    /// Durable write to the tenant store failed.
    #[error("Store error: {0}")]
    TransientStore(String),

    /// Stripe API lookup failed for a transport or server reason.
    #[error("Payment provider unavailable: {0}")]
    ProviderUnavailable(String),
}

/// Coarse classification of [`WebhookError`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookErrorKind {
    Authentication,
    MalformedPayload,
    UnresolvableTenant,
    UnsupportedStatus,
    TransientStore,
    ProviderUnavailable,
}

impl WebhookError {
    /// Returns the taxonomy bucket for this error.
    pub fn kind(&self) -> WebhookErrorKind {
        match self {
            WebhookError::MissingSignature
            | WebhookError::MalformedSignature(_)
            | WebhookError::TimestampOutOfTolerance
            | WebhookError::InvalidSignature => WebhookErrorKind::Authentication,
            WebhookError::MalformedPayload(_) => WebhookErrorKind::MalformedPayload,
            WebhookError::UnresolvableTenant(_) => WebhookErrorKind::UnresolvableTenant,
            WebhookError::UnsupportedStatus(_) => WebhookErrorKind::UnsupportedStatus,
            WebhookError::TransientStore(_) => WebhookErrorKind::TransientStore,
            WebhookError::ProviderUnavailable(_) => WebhookErrorKind::ProviderUnavailable,
        }
    }

    /// Returns true if Stripe should retry delivering this webhook.
    ///
    /// Only infrastructure failures are retryable; the mutation is naturally
    /// idempotent so a redelivery is always safe.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind(),
            WebhookErrorKind::TransientStore | WebhookErrorKind::ProviderUnavailable
        )
    }

    /// Returns true if the delivery should be acknowledged despite the error.
    ///
    /// Retrying cannot fix these, so a 2xx keeps Stripe from redelivering.
    pub fn is_acknowledged(&self) -> bool {
        matches!(
            self.kind(),
            WebhookErrorKind::UnresolvableTenant | WebhookErrorKind::UnsupportedStatus
        )
    }

    /// Maps the error to an HTTP status code.
    ///
    /// - 2xx: Event acknowledged, no retry
    /// - 4xx: Client error, no retry
    /// - 5xx: Server error, Stripe will retry
    pub fn status_code(&self) -> StatusCode {
        match self.kind() {
            WebhookErrorKind::Authentication | WebhookErrorKind::MalformedPayload => {
                StatusCode::BAD_REQUEST
            }
            WebhookErrorKind::UnresolvableTenant | WebhookErrorKind::UnsupportedStatus => {
                StatusCode::OK
            }
            WebhookErrorKind::TransientStore | WebhookErrorKind::ProviderUnavailable => {
                StatusCode::SERVICE_UNAVAILABLE
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ══════════════════════════════════════════════════════════════
    // Display
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn invalid_signature_displays_correctly() {
        assert_eq!(WebhookError::InvalidSignature.to_string(), "Invalid signature");
    }

    #[test]
    fn malformed_payload_displays_message() {
        let err = WebhookError::MalformedPayload("missing field `id`".to_string());
        assert_eq!(err.to_string(), "Malformed payload: missing field `id`");
    }

    #[test]
    fn unsupported_status_displays_status() {
        let err = WebhookError::UnsupportedStatus("paused".to_string());
        assert_eq!(err.to_string(), "Unsupported subscription status: paused");
    }

    // ══════════════════════════════════════════════════════════════
    // Classification
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn signature_failures_are_authentication_errors() {
        for err in [
            WebhookError::MissingSignature,
            WebhookError::MalformedSignature("no t".to_string()),
            WebhookError::TimestampOutOfTolerance,
            WebhookError::InvalidSignature,
        ] {
            assert_eq!(err.kind(), WebhookErrorKind::Authentication);
            assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
            assert!(!err.is_retryable());
            assert!(!err.is_acknowledged());
        }
    }

    #[test]
    fn malformed_payload_is_terminal_bad_request() {
        let err = WebhookError::MalformedPayload("bad json".to_string());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(!err.is_retryable());
    }

    #[test]
    fn unresolvable_tenant_is_acknowledged() {
        let err = WebhookError::UnresolvableTenant("no organization_id".to_string());
        assert_eq!(err.status_code(), StatusCode::OK);
        assert!(err.is_acknowledged());
        assert!(!err.is_retryable());
    }

    #[test]
    fn unsupported_status_is_acknowledged() {
        let err = WebhookError::UnsupportedStatus("paused".to_string());
        assert_eq!(err.status_code(), StatusCode::OK);
        assert!(err.is_acknowledged());
    }

    #[test]
    fn store_error_is_retryable_server_error() {
        let err = WebhookError::TransientStore("connection reset".to_string());
        assert!(err.is_retryable());
        assert!(err.status_code().is_server_error());
    }

    #[test]
    fn provider_unavailable_is_retryable_server_error() {
        let err = WebhookError::ProviderUnavailable("timeout".to_string());
        assert!(err.is_retryable());
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
