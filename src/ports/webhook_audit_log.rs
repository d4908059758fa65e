//! WebhookAuditLog port - Record of webhook deliveries and their outcomes.
//!
//! Entries are written after the outcome is decided and exist for
//! debugging and support. They are never consulted to skip an event:
//! redelivered events are always processed again.

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::foundation::{DomainError, TenantId};

/// What the synchronizer did with a delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditResult {
    /// Tenant record was written.
    Applied,
    /// Event type does not affect subscription status.
    Ignored,
    /// No tenant could be linked to the event.
    Unresolvable,
    /// Provider status outside the known vocabulary; nothing written.
    Dropped,
    /// Processing failed; Stripe will redeliver.
    Failed,
}

impl AuditResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditResult::Applied => "applied",
            AuditResult::Ignored => "ignored",
            AuditResult::Unresolvable => "unresolvable",
            AuditResult::Dropped => "dropped",
            AuditResult::Failed => "failed",
        }
    }
}

impl fmt::Display for AuditResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One processed webhook delivery.
#[derive(Debug, Clone, PartialEq)]
pub struct WebhookAuditRecord {
    /// Stripe event ID (evt_xxx format). Not unique across rows.
    pub event_id: String,

    /// Type of Stripe event (e.g., "customer.subscription.updated").
    pub event_type: String,

    /// Tenant the event resolved to, if any.
    pub tenant_id: Option<TenantId>,

    /// Whether the event came from Stripe live mode rather than test mode.
    pub livemode: bool,

    pub result: AuditResult,

    /// Reason for non-applied results.
    pub detail: Option<String>,

    pub processed_at: DateTime<Utc>,
}

impl WebhookAuditRecord {
    pub fn applied(
        event_id: impl Into<String>,
        event_type: impl Into<String>,
        tenant_id: TenantId,
    ) -> Self {
        Self::new(event_id, event_type, Some(tenant_id), AuditResult::Applied, None)
    }

    pub fn ignored(event_id: impl Into<String>, event_type: impl Into<String>) -> Self {
        Self::new(event_id, event_type, None, AuditResult::Ignored, None)
    }

    pub fn unresolvable(
        event_id: impl Into<String>,
        event_type: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::new(
            event_id,
            event_type,
            None,
            AuditResult::Unresolvable,
            Some(reason.into()),
        )
    }

    pub fn dropped(
        event_id: impl Into<String>,
        event_type: impl Into<String>,
        tenant_id: TenantId,
        reason: impl Into<String>,
    ) -> Self {
        Self::new(
            event_id,
            event_type,
            Some(tenant_id),
            AuditResult::Dropped,
            Some(reason.into()),
        )
    }

    pub fn failed(
        event_id: impl Into<String>,
        event_type: impl Into<String>,
        tenant_id: Option<TenantId>,
        error: impl Into<String>,
    ) -> Self {
        Self::new(
            event_id,
            event_type,
            tenant_id,
            AuditResult::Failed,
            Some(error.into()),
        )
    }

    fn new(
        event_id: impl Into<String>,
        event_type: impl Into<String>,
        tenant_id: Option<TenantId>,
        result: AuditResult,
        detail: Option<String>,
    ) -> Self {
        Self {
            event_id: event_id.into(),
            event_type: event_type.into(),
            tenant_id,
            livemode: false,
            result,
            detail,
            processed_at: Utc::now(),
        }
    }

    pub fn with_livemode(mut self, livemode: bool) -> Self {
        self.livemode = livemode;
        self
    }
}

/// Append-only log of webhook deliveries.
#[async_trait]
pub trait WebhookAuditLog: Send + Sync {
    /// Append one record. Duplicate event ids are allowed.
    async fn record(&self, record: WebhookAuditRecord) -> Result<(), DomainError>;
}
