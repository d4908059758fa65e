//! Stripe webhook event types.
//!
//! Payloads are parsed into a closed set of variants. Only the three event
//! types that move a tenant's status have their `data.object` inspected;
//! any shape mismatch there fails closed with `MalformedPayload`.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer};

use super::webhook_errors::WebhookError;
use crate::domain::foundation::TenantId;

/// Metadata key written on Stripe subscriptions by the checkout flow.
pub const TENANT_METADATA_KEY: &str = "organization_id";

pub const INVOICE_PAYMENT_SUCCEEDED: &str = "invoice.payment_succeeded";
pub const SUBSCRIPTION_UPDATED: &str = "customer.subscription.updated";
pub const SUBSCRIPTION_DELETED: &str = "customer.subscription.deleted";

/// Envelope fields shared by every event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventMeta {
    /// Unique identifier for the event (evt_xxx format).
    pub id: String,
    /// Raw event type string.
    pub event_type: String,
    /// False for deliveries from Stripe test mode.
    pub livemode: bool,
}

/// A verified Stripe event, classified by type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderEvent {
    InvoicePaymentSucceeded {
        meta: EventMeta,
        invoice: InvoiceObject,
    },
    SubscriptionUpdated {
        meta: EventMeta,
        subscription: SubscriptionObject,
    },
    SubscriptionDeleted {
        meta: EventMeta,
        subscription: SubscriptionObject,
    },
    /// Any other event type; acknowledged without inspection.
    Other { meta: EventMeta },
}

/// Subset of a Stripe subscription object.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SubscriptionObject {
    pub id: String,
    #[serde(default, deserialize_with = "expandable_id")]
    pub customer: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub metadata: Option<HashMap<String, String>>,
}

/// Subset of a Stripe invoice object.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InvoiceObject {
    pub id: String,
    #[serde(default, deserialize_with = "expandable_id")]
    pub customer: Option<String>,
    #[serde(default, deserialize_with = "expandable_id")]
    pub subscription: Option<String>,
    #[serde(default)]
    pub metadata: Option<HashMap<String, String>>,
    /// Snapshot of the subscription's metadata at invoice time.
    #[serde(default)]
    pub subscription_details: Option<SubscriptionDetails>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SubscriptionDetails {
    #[serde(default)]
    pub metadata: Option<HashMap<String, String>>,
}

#[derive(Deserialize)]
struct RawEnvelope {
    id: String,
    #[serde(rename = "type")]
    event_type: String,
    #[serde(default)]
    livemode: bool,
    data: RawEventData,
}

#[derive(Deserialize)]
struct RawEventData {
    object: serde_json::Map<String, serde_json::Value>,
}

impl ProviderEvent {
    /// Parses a raw webhook body.
    ///
    /// # Errors
    ///
    /// `MalformedPayload` if the body is not a JSON event envelope, or if a
    /// handled event's object does not have the expected shape.
    pub fn parse(payload: &[u8]) -> Result<Self, WebhookError> {
        let raw: RawEnvelope = serde_json::from_slice(payload)
            .map_err(|e| WebhookError::MalformedPayload(e.to_string()))?;

        let meta = EventMeta {
            id: raw.id,
            event_type: raw.event_type,
            livemode: raw.livemode,
        };
        let object = serde_json::Value::Object(raw.data.object);

        let event = match meta.event_type.as_str() {
            INVOICE_PAYMENT_SUCCEEDED => ProviderEvent::InvoicePaymentSucceeded {
                invoice: decode_object(object, &meta)?,
                meta,
            },
            SUBSCRIPTION_UPDATED => {
                let subscription: SubscriptionObject = decode_object(object, &meta)?;
                if subscription.status.is_none() {
                    return Err(WebhookError::MalformedPayload(format!(
                        "{} without subscription status",
                        SUBSCRIPTION_UPDATED
                    )));
                }
                ProviderEvent::SubscriptionUpdated { subscription, meta }
            }
            SUBSCRIPTION_DELETED => ProviderEvent::SubscriptionDeleted {
                subscription: decode_object(object, &meta)?,
                meta,
            },
            _ => ProviderEvent::Other { meta },
        };

        Ok(event)
    }

    pub fn meta(&self) -> &EventMeta {
        match self {
            ProviderEvent::InvoicePaymentSucceeded { meta, .. }
            | ProviderEvent::SubscriptionUpdated { meta, .. }
            | ProviderEvent::SubscriptionDeleted { meta, .. }
            | ProviderEvent::Other { meta } => meta,
        }
    }
}

fn decode_object<T: serde::de::DeserializeOwned>(
    object: serde_json::Value,
    meta: &EventMeta,
) -> Result<T, WebhookError> {
    serde_json::from_value(object).map_err(|e| {
        WebhookError::MalformedPayload(format!("{} data.object: {}", meta.event_type, e))
    })
}

impl SubscriptionObject {
    /// Tenant linkage carried in the subscription metadata.
    pub fn tenant_id(&self) -> Result<Option<TenantId>, WebhookError> {
        tenant_from_metadata(self.metadata.as_ref())
    }
}

impl InvoiceObject {
    /// Tenant linkage carried on the invoice itself.
    ///
    /// Looks at the subscription metadata snapshot first, then the invoice's
    /// own metadata. A source whose value is not a tenant id is skipped.
    /// `None` means the caller has to look the subscription up at Stripe.
    pub fn tenant_id(&self) -> Option<TenantId> {
        let snapshot = self
            .subscription_details
            .as_ref()
            .and_then(|details| details.metadata.as_ref());

        [snapshot, self.metadata.as_ref()]
            .into_iter()
            .find_map(|metadata| match tenant_from_metadata(metadata) {
                Ok(tenant_id) => tenant_id,
                Err(e) => {
                    tracing::warn!(
                        invoice_id = %self.id,
                        error = %e,
                        "Skipping invoice tenant linkage"
                    );
                    None
                }
            })
    }
}

/// Reads the tenant id out of a metadata map.
///
/// A missing or blank key is `Ok(None)`; a value that is not a UUID cannot
/// name any tenant and is reported as `UnresolvableTenant`.
pub fn tenant_from_metadata(
    metadata: Option<&HashMap<String, String>>,
) -> Result<Option<TenantId>, WebhookError> {
    let Some(value) = metadata
        .and_then(|m| m.get(TENANT_METADATA_KEY))
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
    else {
        return Ok(None);
    };

    value.parse::<TenantId>().map(Some).map_err(|_| {
        WebhookError::UnresolvableTenant(format!("{} is not a tenant id: {}", TENANT_METADATA_KEY, value))
    })
}

/// Accepts either a bare id or an expanded object carrying an `id`.
fn expandable_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Expandable {
        Id(String),
        Object { id: String },
    }

    Ok(Option::<Expandable>::deserialize(deserializer)?.map(|value| match value {
        Expandable::Id(id) | Expandable::Object { id } => id,
    }))
}
