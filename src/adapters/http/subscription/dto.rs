//! Data Transfer Objects for subscription HTTP endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::application::handlers::subscription::CheckTenantAccessResult;
use crate::domain::foundation::TenantId;
use crate::domain::subscription::{SubscriptionStatus, TenantSubscription};

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Acknowledgement returned to Stripe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookReceivedResponse {
    pub received: bool,
}

impl WebhookReceivedResponse {
    pub fn received() -> Self {
        Self { received: true }
    }
}

/// Tenant subscription view for the billing page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenantSubscriptionResponse {
    pub tenant_id: String,
    pub status: SubscriptionStatus,
    pub plan_type: Option<String>,
    pub has_access: bool,
    pub updated_at: DateTime<Utc>,
}

impl From<TenantSubscription> for TenantSubscriptionResponse {
    fn from(record: TenantSubscription) -> Self {
        Self {
            tenant_id: record.tenant_id.to_string(),
            has_access: record.has_access(),
            status: record.status,
            plan_type: record.plan_type,
            updated_at: record.updated_at,
        }
    }
}

/// Access Gate answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenantAccessResponse {
    pub tenant_id: String,
    pub status: SubscriptionStatus,
    pub has_access: bool,
}

impl TenantAccessResponse {
    pub fn new(tenant_id: TenantId, result: CheckTenantAccessResult) -> Self {
        Self {
            tenant_id: tenant_id.to_string(),
            status: result.status,
            has_access: result.has_access,
        }
    }
}

/// Standard error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
    /// Error code for programmatic handling.
    pub error_code: String,
}

impl ErrorResponse {
    pub fn new(error_code: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            error_code: error_code.into(),
        }
    }
}
