//! Tenant subscription status and the provider vocabulary mapping.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::webhook_errors::WebhookError;
use crate::domain::foundation::DomainError;

/// Subscription status stored on a tenant.
///
/// This is the only vocabulary the tenant store accepts; Stripe's own
/// statuses are translated through [`SubscriptionStatus::from_provider`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    /// Newly provisioned tenant, not yet paying.
    Trial,

    /// Paid and current.
    Active,

    /// Payment failed; Stripe is retrying.
    PastDue,

    /// Subscription ended.
    Canceled,

    /// First payment never completed.
    Incomplete,
}

impl SubscriptionStatus {
    /// Every status, in declaration order.
    pub const ALL: [SubscriptionStatus; 5] = [
        SubscriptionStatus::Trial,
        SubscriptionStatus::Active,
        SubscriptionStatus::PastDue,
        SubscriptionStatus::Canceled,
        SubscriptionStatus::Incomplete,
    ];

    /// Translates a Stripe subscription status into the internal vocabulary.
    ///
    /// | Stripe | Internal |
    /// |---|---|
    /// | `trialing` | `trial` |
    /// | `active` | `active` |
    /// | `past_due`, `unpaid` | `past_due` |
    /// | `canceled` | `canceled` |
    /// | `incomplete`, `incomplete_expired` | `incomplete` |
    ///
    /// # Errors
    ///
    /// Anything else (e.g. `paused`) yields `WebhookError::UnsupportedStatus`.
    pub fn from_provider(provider_status: &str) -> Result<Self, WebhookError> {
        match provider_status {
            "trialing" => Ok(SubscriptionStatus::Trial),
            "active" => Ok(SubscriptionStatus::Active),
            "past_due" | "unpaid" => Ok(SubscriptionStatus::PastDue),
            "canceled" => Ok(SubscriptionStatus::Canceled),
            "incomplete" | "incomplete_expired" => Ok(SubscriptionStatus::Incomplete),
            other => Err(WebhookError::UnsupportedStatus(other.to_string())),
        }
    }

    /// Returns true if a tenant with this status may log in.
    ///
    /// Trial and active tenants are allowed; past due, canceled and
    /// incomplete tenants are blocked at the next session check.
    pub fn grants_access(&self) -> bool {
        matches!(self, SubscriptionStatus::Trial | SubscriptionStatus::Active)
    }

    /// Stored string form.
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Trial => "trial",
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::PastDue => "past_due",
            SubscriptionStatus::Canceled => "canceled",
            SubscriptionStatus::Incomplete => "incomplete",
        }
    }
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubscriptionStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SubscriptionStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| {
                DomainError::validation(
                    "subscription_status",
                    format!("Invalid status value: {}", s),
                )
            })
    }
}
