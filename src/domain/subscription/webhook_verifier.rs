//! Stripe webhook signature verification.
//!
//! HMAC-SHA256 over `"{timestamp}." ++ raw body`, compared in constant time
//! against every `v1` signature in the header. The timestamp must fall
//! inside the tolerance window to limit replays.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use super::webhook_errors::WebhookError;

type HmacSha256 = Hmac<Sha256>;

/// Default maximum age of a signature (5 minutes), same as Stripe's SDKs.
pub const DEFAULT_TOLERANCE_SECS: i64 = 300;

/// Allowed clock skew for signatures stamped in the future.
const MAX_CLOCK_SKEW_SECS: i64 = 60;

/// Parsed components from the Stripe-Signature header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHeader {
    /// Unix timestamp when the signature was generated.
    pub timestamp: i64,
    /// All v1 signatures; Stripe sends several while a secret is rolled.
    pub v1_signatures: Vec<Vec<u8>>,
}

impl SignatureHeader {
    /// Parses a Stripe-Signature header string.
    ///
    /// Format: `t=<timestamp>,v1=<signature>[,v1=<signature>][,v0=<legacy>]`
    ///
    /// # Errors
    ///
    /// Returns `WebhookError::MalformedSignature` if the header format is invalid.
    pub fn parse(header: &str) -> Result<Self, WebhookError> {
        let mut timestamp: Option<i64> = None;
        let mut v1_signatures = Vec::new();

        for part in header.split(',') {
            let (key, value) = part
                .split_once('=')
                .ok_or_else(|| malformed("invalid header format"))?;

            match key.trim() {
                "t" => {
                    timestamp = Some(
                        value
                            .trim()
                            .parse()
                            .map_err(|_| malformed("invalid timestamp"))?,
                    );
                }
                "v1" => {
                    let signature = hex::decode(value.trim())
                        .map_err(|_| malformed("invalid v1 signature hex"))?;
                    v1_signatures.push(signature);
                }
                // v0 is a legacy test-mode scheme and never trusted
                _ => {}
            }
        }

        let timestamp = timestamp.ok_or_else(|| malformed("missing timestamp"))?;
        if v1_signatures.is_empty() {
            return Err(malformed("missing v1 signature"));
        }

        Ok(SignatureHeader {
            timestamp,
            v1_signatures,
        })
    }
}

fn malformed(reason: &str) -> WebhookError {
    WebhookError::MalformedSignature(reason.to_string())
}

/// Verifier for Stripe webhook signatures.
#[derive(Clone)]
pub struct WebhookVerifier {
    /// The webhook signing secret from the Stripe dashboard.
    secret: SecretString,
    tolerance_secs: i64,
}

impl WebhookVerifier {
    /// Creates a verifier with the default 5 minute tolerance.
    pub fn new(secret: SecretString) -> Self {
        Self {
            secret,
            tolerance_secs: DEFAULT_TOLERANCE_SECS,
        }
    }

    /// Overrides the signature age tolerance.
    pub fn with_tolerance_secs(mut self, tolerance_secs: i64) -> Self {
        self.tolerance_secs = tolerance_secs;
        self
    }

    /// Verifies a delivery against the current wall clock.
    pub fn verify(&self, payload: &[u8], signature_header: &str) -> Result<(), WebhookError> {
        self.verify_at(payload, signature_header, chrono::Utc::now().timestamp())
    }

    /// Verifies a delivery as of `now` (unix seconds).
    ///
    /// # Verification Steps
    ///
    /// 1. Parse the signature header
    /// 2. Validate timestamp is within the tolerance window
    /// 3. Compute expected signature over the exact payload bytes
    /// 4. Compare against each v1 signature in constant time
    ///
    /// # Errors
    ///
    /// - `MalformedSignature` - Header could not be parsed
    /// - `TimestampOutOfTolerance` - Signature too old or from the future
    /// - `InvalidSignature` - No v1 signature matched
    pub fn verify_at(
        &self,
        payload: &[u8],
        signature_header: &str,
        now: i64,
    ) -> Result<(), WebhookError> {
        let header = SignatureHeader::parse(signature_header)?;

        let within_window = now
            .checked_sub(header.timestamp)
            .is_some_and(|age| age <= self.tolerance_secs && age >= -MAX_CLOCK_SKEW_SECS);
        if !within_window {
            tracing::warn!(
                signature_timestamp = header.timestamp,
                now = now,
                "Webhook signature outside tolerance window"
            );
            return Err(WebhookError::TimestampOutOfTolerance);
        }

        let expected = self.compute_signature(header.timestamp, payload)?;

        let matched = header
            .v1_signatures
            .iter()
            .any(|candidate| constant_time_compare(&expected, candidate));

        if !matched {
            return Err(WebhookError::InvalidSignature);
        }

        Ok(())
    }

    /// Produces a Stripe-Signature header value for `payload`.
    ///
    /// Used by test harnesses and local replay tooling to build deliveries
    /// the verifier will accept.
    pub fn sign(&self, timestamp: i64, payload: &[u8]) -> Result<String, WebhookError> {
        let signature = self.compute_signature(timestamp, payload)?;
        Ok(format!("t={},v1={}", timestamp, hex::encode(signature)))
    }

    /// Computes the HMAC-SHA256 signature for the given timestamp and payload.
    fn compute_signature(&self, timestamp: i64, payload: &[u8]) -> Result<Vec<u8>, WebhookError> {
        let mut mac = HmacSha256::new_from_slice(self.secret.expose_secret().as_bytes())
            .map_err(|_| WebhookError::InvalidSignature)?;
        mac.update(timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);
        Ok(mac.finalize().into_bytes().to_vec())
    }
}

/// Performs constant-time comparison of two byte slices.
fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}
