//! SyncSubscriptionStatusHandler - Command handler for Stripe subscription webhooks.
//!
//! Turns one signed Stripe delivery into at most one write to the tenant's
//! subscription record. Events are applied in the order they are processed,
//! with no timestamp comparison and no event-id deduplication: a late
//! redelivery of an older event moves the status back.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::foundation::{ErrorCode, TenantId};
use crate::domain::subscription::{
    EventMeta, InvoiceObject, ProviderEvent, StatusUpdate, SubscriptionStatus, WebhookError,
    WebhookVerifier, TENANT_METADATA_KEY,
};
use crate::ports::{
    SubscriptionLookup, TenantSubscriptionStore, WebhookAuditLog, WebhookAuditRecord,
};

/// Command to process one webhook delivery.
#[derive(Debug, Clone)]
pub struct SyncSubscriptionStatusCommand {
    /// Raw request body, exactly as received.
    pub payload: Vec<u8>,
    /// Stripe-Signature header value, if the request had one.
    pub signature: Option<String>,
}

/// Acknowledged outcome of a delivery.
///
/// Every variant means Stripe should stop retrying.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Tenant record written with this status.
    Applied {
        tenant_id: TenantId,
        status: SubscriptionStatus,
    },
    /// Event type does not affect subscription status.
    Ignored,
    /// No tenant could be linked to the event.
    Unresolvable { reason: String },
    /// Provider status outside the known vocabulary; nothing written.
    Dropped {
        tenant_id: TenantId,
        provider_status: String,
    },
}

/// Upper bound on the durable write before it counts as a store failure.
const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(10);

/// Handler for Stripe subscription lifecycle webhooks.
pub struct SyncSubscriptionStatusHandler {
    verifier: WebhookVerifier,
    store: Arc<dyn TenantSubscriptionStore>,
    lookup: Arc<dyn SubscriptionLookup>,
    audit_log: Arc<dyn WebhookAuditLog>,
    store_timeout: Duration,
}

impl SyncSubscriptionStatusHandler {
    pub fn new(
        verifier: WebhookVerifier,
        store: Arc<dyn TenantSubscriptionStore>,
        lookup: Arc<dyn SubscriptionLookup>,
        audit_log: Arc<dyn WebhookAuditLog>,
    ) -> Self {
        Self {
            verifier,
            store,
            lookup,
            audit_log,
            store_timeout: DEFAULT_STORE_TIMEOUT,
        }
    }

    /// Overrides how long the tenant store write may take.
    pub fn with_store_timeout(mut self, store_timeout: Duration) -> Self {
        self.store_timeout = store_timeout;
        self
    }

    /// Verifies, parses and applies one delivery.
    ///
    /// # Errors
    ///
    /// - Authentication errors and `MalformedPayload`: terminal, nothing written
    /// - `TransientStore`, `ProviderUnavailable`: retryable, nothing written
    pub async fn handle(
        &self,
        cmd: SyncSubscriptionStatusCommand,
    ) -> Result<SyncOutcome, WebhookError> {
        // 1. Authenticity
        let signature = cmd.signature.as_deref().ok_or_else(|| {
            tracing::warn!("Webhook rejected: missing Stripe-Signature header");
            WebhookError::MissingSignature
        })?;
        if let Err(e) = self.verifier.verify(&cmd.payload, signature) {
            tracing::warn!(error = %e, "Webhook rejected: signature verification failed");
            return Err(e);
        }

        // 2. Shape
        let event = ProviderEvent::parse(&cmd.payload).map_err(|e| {
            tracing::warn!(error = %e, "Webhook rejected: malformed payload");
            e
        })?;

        // 3-6. Classify, resolve, map, apply
        let result = match self.process(&event).await {
            Err(WebhookError::UnresolvableTenant(reason)) => {
                Ok(SyncOutcome::Unresolvable { reason })
            }
            other => other,
        };

        log_result(event.meta(), &result);
        self.audit(event.meta(), &result).await;

        result
    }

    async fn process(&self, event: &ProviderEvent) -> Result<SyncOutcome, WebhookError> {
        let update = match event {
            ProviderEvent::Other { .. } => return Ok(SyncOutcome::Ignored),

            ProviderEvent::InvoicePaymentSucceeded { invoice, .. } => {
                let tenant_id = self.invoice_tenant(invoice).await?;
                StatusUpdate::new(tenant_id, SubscriptionStatus::Active)
                    .with_subscription_id(invoice.subscription.clone())
                    .with_customer_id(invoice.customer.clone())
            }

            ProviderEvent::SubscriptionUpdated { subscription, .. } => {
                let tenant_id = required(subscription.tenant_id()?, || {
                    format!("subscription {} carries no {}", subscription.id, TENANT_METADATA_KEY)
                })?;
                let provider_status = subscription.status.as_deref().unwrap_or_default();
                let status = match SubscriptionStatus::from_provider(provider_status) {
                    Ok(status) => status,
                    Err(_) => {
                        return Ok(SyncOutcome::Dropped {
                            tenant_id,
                            provider_status: provider_status.to_string(),
                        })
                    }
                };
                StatusUpdate::new(tenant_id, status)
                    .with_subscription_id(Some(subscription.id.clone()))
                    .with_customer_id(subscription.customer.clone())
            }

            ProviderEvent::SubscriptionDeleted { subscription, .. } => {
                let tenant_id = required(subscription.tenant_id()?, || {
                    format!("subscription {} carries no {}", subscription.id, TENANT_METADATA_KEY)
                })?;
                StatusUpdate::new(tenant_id, SubscriptionStatus::Canceled)
                    .with_subscription_id(Some(subscription.id.clone()))
                    .with_customer_id(subscription.customer.clone())
            }
        };

        let applied = tokio::time::timeout(
            self.store_timeout,
            self.store.apply_status_update(&update),
        )
        .await
        .map_err(|_| {
            WebhookError::TransientStore(format!(
                "store write timed out after {}ms",
                self.store_timeout.as_millis()
            ))
        })?;

        match applied {
            Ok(record) => Ok(SyncOutcome::Applied {
                tenant_id: record.tenant_id,
                status: record.status,
            }),
            Err(e) if e.code == ErrorCode::TenantNotFound => Ok(SyncOutcome::Unresolvable {
                reason: format!("tenant {} is not provisioned", update.tenant_id),
            }),
            Err(e) => Err(WebhookError::TransientStore(e.to_string())),
        }
    }

    /// Invoice linkage: metadata on the invoice first, then the subscription
    /// as Stripe currently has it.
    async fn invoice_tenant(&self, invoice: &InvoiceObject) -> Result<TenantId, WebhookError> {
        if let Some(tenant_id) = invoice.tenant_id() {
            return Ok(tenant_id);
        }

        let subscription_id = required(invoice.subscription.clone(), || {
            format!("invoice {} has no subscription", invoice.id)
        })?;

        let tenant_id = self
            .lookup
            .tenant_for_subscription(&subscription_id)
            .await
            .map_err(|e| WebhookError::ProviderUnavailable(e.message))?;

        required(tenant_id, || {
            format!("subscription {} carries no {}", subscription_id, TENANT_METADATA_KEY)
        })
    }

    /// Best-effort: a failed audit write never changes the outcome.
    async fn audit(&self, meta: &EventMeta, result: &Result<SyncOutcome, WebhookError>) {
        let record = match result {
            Ok(SyncOutcome::Applied { tenant_id, .. }) => {
                WebhookAuditRecord::applied(&meta.id, &meta.event_type, *tenant_id)
            }
            Ok(SyncOutcome::Ignored) => WebhookAuditRecord::ignored(&meta.id, &meta.event_type),
            Ok(SyncOutcome::Unresolvable { reason }) => {
                WebhookAuditRecord::unresolvable(&meta.id, &meta.event_type, reason)
            }
            Ok(SyncOutcome::Dropped {
                tenant_id,
                provider_status,
            }) => WebhookAuditRecord::dropped(
                &meta.id,
                &meta.event_type,
                *tenant_id,
                format!("unsupported status {:?}", provider_status),
            ),
            Err(e) => WebhookAuditRecord::failed(&meta.id, &meta.event_type, None, e.to_string()),
        };

        if let Err(e) = self.audit_log.record(record.with_livemode(meta.livemode)).await {
            tracing::warn!(event_id = %meta.id, error = %e, "Failed to write webhook audit record");
        }
    }
}

fn required<T>(value: Option<T>, reason: impl FnOnce() -> String) -> Result<T, WebhookError> {
    value.ok_or_else(|| WebhookError::UnresolvableTenant(reason()))
}

fn log_result(meta: &EventMeta, result: &Result<SyncOutcome, WebhookError>) {
    match result {
        Ok(SyncOutcome::Applied { tenant_id, status }) => tracing::info!(
            event_id = %meta.id,
            event_type = %meta.event_type,
            tenant_id = %tenant_id,
            status = %status,
            livemode = meta.livemode,
            "Subscription status applied"
        ),
        Ok(SyncOutcome::Ignored) => tracing::debug!(
            event_id = %meta.id,
            event_type = %meta.event_type,
            "Ignoring webhook event type"
        ),
        Ok(SyncOutcome::Unresolvable { reason }) => tracing::warn!(
            event_id = %meta.id,
            event_type = %meta.event_type,
            reason = %reason,
            "Webhook acknowledged without tenant"
        ),
        Ok(SyncOutcome::Dropped {
            tenant_id,
            provider_status,
        }) => tracing::warn!(
            event_id = %meta.id,
            tenant_id = %tenant_id,
            provider_status = %provider_status,
            "Unsupported subscription status, event dropped"
        ),
        Err(e) => tracing::error!(
            event_id = %meta.id,
            event_type = %meta.event_type,
            error = %e,
            "Webhook processing failed, Stripe will retry"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::DomainError;
    use crate::domain::subscription::TenantSubscription;
    use async_trait::async_trait;
    use secrecy::SecretString;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Mutex;

    const SECRET: &str = "whsec_sync_handler_test";

    // ════════════════════════════════════════════════════════════════════════════
    // Mock Implementations
    // ════════════════════════════════════════════════════════════════════════════

    struct MockStore {
        records: Mutex<HashMap<TenantId, TenantSubscription>>,
        writes: Mutex<u32>,
        fail_write: bool,
        delay: Option<Duration>,
    }

    impl MockStore {
        fn with_tenant(tenant_id: TenantId) -> Self {
            let mut records = HashMap::new();
            records.insert(tenant_id, TenantSubscription::provisioned(tenant_id));
            Self {
                records: Mutex::new(records),
                writes: Mutex::new(0),
                fail_write: false,
                delay: None,
            }
        }

        fn empty() -> Self {
            Self {
                records: Mutex::new(HashMap::new()),
                writes: Mutex::new(0),
                fail_write: false,
                delay: None,
            }
        }

        fn failing(tenant_id: TenantId) -> Self {
            Self {
                fail_write: true,
                ..Self::with_tenant(tenant_id)
            }
        }

        fn slow(tenant_id: TenantId, delay: Duration) -> Self {
            Self {
                delay: Some(delay),
                ..Self::with_tenant(tenant_id)
            }
        }

        fn get(&self, tenant_id: &TenantId) -> TenantSubscription {
            self.records.lock().unwrap().get(tenant_id).cloned().unwrap()
        }

        fn write_count(&self) -> u32 {
            *self.writes.lock().unwrap()
        }
    }

    #[async_trait]
    impl TenantSubscriptionStore for MockStore {
        async fn apply_status_update(
            &self,
            update: &StatusUpdate,
        ) -> Result<TenantSubscription, DomainError> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if self.fail_write {
                return Err(DomainError::new(ErrorCode::DatabaseError, "Simulated write failure"));
            }
            let mut records = self.records.lock().unwrap();
            let record = records.get_mut(&update.tenant_id).ok_or_else(|| {
                DomainError::new(ErrorCode::TenantNotFound, "Tenant not found")
            })?;
            record.apply(update, chrono::Utc::now());
            *self.writes.lock().unwrap() += 1;
            Ok(record.clone())
        }

        async fn find_by_tenant_id(
            &self,
            tenant_id: &TenantId,
        ) -> Result<Option<TenantSubscription>, DomainError> {
            Ok(self.records.lock().unwrap().get(tenant_id).cloned())
        }
    }

    struct MockLookup {
        tenant_id: Option<TenantId>,
        fail: bool,
    }

    impl MockLookup {
        fn none() -> Self {
            Self {
                tenant_id: None,
                fail: false,
            }
        }

        fn returning(tenant_id: TenantId) -> Self {
            Self {
                tenant_id: Some(tenant_id),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                tenant_id: None,
                fail: true,
            }
        }
    }

    #[async_trait]
    impl SubscriptionLookup for MockLookup {
        async fn tenant_for_subscription(
            &self,
            _subscription_id: &str,
        ) -> Result<Option<TenantId>, DomainError> {
            if self.fail {
                return Err(DomainError::new(
                    ErrorCode::ProviderUnavailable,
                    "Stripe API returned 502",
                ));
            }
            Ok(self.tenant_id)
        }
    }

    #[derive(Default)]
    struct MockAuditLog {
        records: Mutex<Vec<WebhookAuditRecord>>,
        fail: bool,
    }

    #[async_trait]
    impl WebhookAuditLog for MockAuditLog {
        async fn record(&self, record: WebhookAuditRecord) -> Result<(), DomainError> {
            if self.fail {
                return Err(DomainError::new(ErrorCode::DatabaseError, "audit down"));
            }
            self.records.lock().unwrap().push(record);
            Ok(())
        }
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Test Helpers
    // ════════════════════════════════════════════════════════════════════════════

    struct Fixture {
        handler: SyncSubscriptionStatusHandler,
        store: Arc<MockStore>,
        audit: Arc<MockAuditLog>,
    }

    fn verifier() -> WebhookVerifier {
        WebhookVerifier::new(SecretString::new(SECRET.to_string()))
    }

    fn fixture_with(store: MockStore, lookup: MockLookup, audit: MockAuditLog) -> Fixture {
        let store = Arc::new(store);
        let audit = Arc::new(audit);
        let handler =
            SyncSubscriptionStatusHandler::new(verifier(), store.clone(), Arc::new(lookup), audit.clone());
        Fixture {
            handler,
            store,
            audit,
        }
    }

    fn fixture(tenant_id: TenantId) -> Fixture {
        fixture_with(
            MockStore::with_tenant(tenant_id),
            MockLookup::none(),
            MockAuditLog::default(),
        )
    }

    fn signed(payload: serde_json::Value) -> SyncSubscriptionStatusCommand {
        let payload = serde_json::to_vec(&payload).unwrap();
        let signature = verifier()
            .sign(chrono::Utc::now().timestamp(), &payload)
            .unwrap();
        SyncSubscriptionStatusCommand {
            payload,
            signature: Some(signature),
        }
    }

    fn subscription_event(
        event_type: &str,
        tenant_id: TenantId,
        status: &str,
    ) -> serde_json::Value {
        json!({
            "id": "evt_sub",
            "type": event_type,
            "data": {"object": {
                "id": "sub_1",
                "customer": "cus_1",
                "status": status,
                "metadata": {"organization_id": tenant_id.to_string()}
            }}
        })
    }

    fn invoice_event(object: serde_json::Value) -> serde_json::Value {
        json!({"id": "evt_inv", "type": "invoice.payment_succeeded", "data": {"object": object}})
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Authentication Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn missing_signature_is_rejected() {
        let tenant_id = TenantId::new();
        let f = fixture(tenant_id);
        let mut cmd = signed(subscription_event("customer.subscription.updated", tenant_id, "active"));
        cmd.signature = None;

        let result = f.handler.handle(cmd).await;

        assert_eq!(result, Err(WebhookError::MissingSignature));
        assert_eq!(f.store.write_count(), 0);
    }

    #[tokio::test]
    async fn tampered_body_is_rejected_without_mutation() {
        let tenant_id = TenantId::new();
        let f = fixture(tenant_id);
        let mut cmd = signed(subscription_event("customer.subscription.updated", tenant_id, "active"));
        let tampered = String::from_utf8(cmd.payload.clone())
            .unwrap()
            .replace("active", "past_due");
        cmd.payload = tampered.into_bytes();

        let result = f.handler.handle(cmd).await;

        assert_eq!(result, Err(WebhookError::InvalidSignature));
        assert_eq!(f.store.write_count(), 0);
        assert!(f.audit.records.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn valid_signature_over_garbage_is_malformed() {
        let f = fixture(TenantId::new());
        let payload = b"{not json".to_vec();
        let signature = verifier().sign(chrono::Utc::now().timestamp(), &payload).unwrap();

        let result = f
            .handler
            .handle(SyncSubscriptionStatusCommand {
                payload,
                signature: Some(signature),
            })
            .await;

        assert!(matches!(result, Err(WebhookError::MalformedPayload(_))));
        assert_eq!(f.store.write_count(), 0);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Subscription Event Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn subscription_updated_maps_provider_status() {
        let tenant_id = TenantId::new();
        let f = fixture(tenant_id);

        let result = f
            .handler
            .handle(signed(subscription_event(
                "customer.subscription.updated",
                tenant_id,
                "unpaid",
            )))
            .await
            .unwrap();

        assert_eq!(
            result,
            SyncOutcome::Applied {
                tenant_id,
                status: SubscriptionStatus::PastDue
            }
        );
        let record = f.store.get(&tenant_id);
        assert_eq!(record.status, SubscriptionStatus::PastDue);
        assert_eq!(record.stripe_subscription_id.as_deref(), Some("sub_1"));
        assert_eq!(record.stripe_customer_id.as_deref(), Some("cus_1"));
    }

    #[tokio::test]
    async fn repeated_update_is_idempotent() {
        let tenant_id = TenantId::new();
        let f = fixture(tenant_id);
        let event = subscription_event("customer.subscription.updated", tenant_id, "trialing");

        f.handler.handle(signed(event.clone())).await.unwrap();
        let once = f.store.get(&tenant_id);
        f.handler.handle(signed(event)).await.unwrap();
        let twice = f.store.get(&tenant_id);

        assert_eq!(once.status, twice.status);
        assert_eq!(once.stripe_subscription_id, twice.stripe_subscription_id);
        assert_eq!(once.stripe_customer_id, twice.stripe_customer_id);
    }

    #[tokio::test]
    async fn subscription_deleted_forces_canceled() {
        let tenant_id = TenantId::new();
        let f = fixture(tenant_id);

        let result = f
            .handler
            .handle(signed(subscription_event(
                "customer.subscription.deleted",
                tenant_id,
                "active",
            )))
            .await
            .unwrap();

        assert_eq!(
            result,
            SyncOutcome::Applied {
                tenant_id,
                status: SubscriptionStatus::Canceled
            }
        );
    }

    #[tokio::test]
    async fn unknown_provider_status_is_dropped() {
        let tenant_id = TenantId::new();
        let f = fixture(tenant_id);

        let result = f
            .handler
            .handle(signed(subscription_event(
                "customer.subscription.updated",
                tenant_id,
                "paused",
            )))
            .await
            .unwrap();

        assert_eq!(
            result,
            SyncOutcome::Dropped {
                tenant_id,
                provider_status: "paused".to_string()
            }
        );
        assert_eq!(f.store.write_count(), 0);
        assert_eq!(f.store.get(&tenant_id).status, SubscriptionStatus::Trial);
    }

    #[tokio::test]
    async fn subscription_without_metadata_is_unresolvable() {
        let f = fixture(TenantId::new());
        let event = json!({
            "id": "evt_sub",
            "type": "customer.subscription.updated",
            "data": {"object": {"id": "sub_1", "status": "active", "metadata": {}}}
        });

        let result = f.handler.handle(signed(event)).await.unwrap();

        assert!(matches!(result, SyncOutcome::Unresolvable { .. }));
        assert_eq!(f.store.write_count(), 0);
    }

    #[tokio::test]
    async fn unknown_tenant_is_acknowledged_as_unresolvable() {
        let f = fixture_with(MockStore::empty(), MockLookup::none(), MockAuditLog::default());

        let result = f
            .handler
            .handle(signed(subscription_event(
                "customer.subscription.updated",
                TenantId::new(),
                "active",
            )))
            .await
            .unwrap();

        assert!(matches!(result, SyncOutcome::Unresolvable { .. }));
    }

    #[tokio::test]
    async fn store_failure_is_retryable() {
        let tenant_id = TenantId::new();
        let f = fixture_with(
            MockStore::failing(tenant_id),
            MockLookup::none(),
            MockAuditLog::default(),
        );

        let result = f
            .handler
            .handle(signed(subscription_event(
                "customer.subscription.updated",
                tenant_id,
                "active",
            )))
            .await;

        let err = result.unwrap_err();
        assert!(matches!(err, WebhookError::TransientStore(_)));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn slow_store_write_is_retryable() {
        let tenant_id = TenantId::new();
        let store = Arc::new(MockStore::slow(tenant_id, Duration::from_secs(5)));
        let handler = SyncSubscriptionStatusHandler::new(
            verifier(),
            store.clone(),
            Arc::new(MockLookup::none()),
            Arc::new(MockAuditLog::default()),
        )
        .with_store_timeout(Duration::from_millis(50));

        let err = handler
            .handle(signed(subscription_event(
                "customer.subscription.updated",
                tenant_id,
                "active",
            )))
            .await
            .unwrap_err();

        assert!(matches!(err, WebhookError::TransientStore(_)));
        assert_eq!(err.status_code(), axum::http::StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(store.write_count(), 0);
        assert_eq!(store.get(&tenant_id).status, SubscriptionStatus::Trial);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Invoice Event Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn invoice_payment_forces_active() {
        let tenant_id = TenantId::new();
        let f = fixture(tenant_id);
        let event = invoice_event(json!({
            "id": "in_1",
            "customer": "cus_9",
            "subscription": "sub_9",
            "subscription_details": {"metadata": {"organization_id": tenant_id.to_string()}}
        }));

        let result = f.handler.handle(signed(event)).await.unwrap();

        assert_eq!(
            result,
            SyncOutcome::Applied {
                tenant_id,
                status: SubscriptionStatus::Active
            }
        );
        let record = f.store.get(&tenant_id);
        assert_eq!(record.stripe_subscription_id.as_deref(), Some("sub_9"));
        assert_eq!(record.stripe_customer_id.as_deref(), Some("cus_9"));
    }

    #[tokio::test]
    async fn invoice_falls_back_to_subscription_lookup() {
        let tenant_id = TenantId::new();
        let f = fixture_with(
            MockStore::with_tenant(tenant_id),
            MockLookup::returning(tenant_id),
            MockAuditLog::default(),
        );
        let event = invoice_event(json!({"id": "in_1", "subscription": "sub_9"}));

        let result = f.handler.handle(signed(event)).await.unwrap();

        assert_eq!(
            result,
            SyncOutcome::Applied {
                tenant_id,
                status: SubscriptionStatus::Active
            }
        );
    }

    #[tokio::test]
    async fn invoice_with_garbled_snapshot_falls_back_to_lookup() {
        let tenant_id = TenantId::new();
        let f = fixture_with(
            MockStore::with_tenant(tenant_id),
            MockLookup::returning(tenant_id),
            MockAuditLog::default(),
        );
        let event = invoice_event(json!({
            "id": "in_1",
            "subscription": "sub_9",
            "subscription_details": {"metadata": {"organization_id": "clinic-7"}}
        }));

        let result = f.handler.handle(signed(event)).await.unwrap();

        assert_eq!(
            result,
            SyncOutcome::Applied {
                tenant_id,
                status: SubscriptionStatus::Active
            }
        );
    }

    #[tokio::test]
    async fn invoice_lookup_failure_is_retryable() {
        let tenant_id = TenantId::new();
        let f = fixture_with(
            MockStore::with_tenant(tenant_id),
            MockLookup::failing(),
            MockAuditLog::default(),
        );
        let event = invoice_event(json!({"id": "in_1", "subscription": "sub_9"}));

        let err = f.handler.handle(signed(event)).await.unwrap_err();

        assert!(matches!(err, WebhookError::ProviderUnavailable(_)));
        assert!(err.is_retryable());
        assert_eq!(f.store.write_count(), 0);
    }

    #[tokio::test]
    async fn invoice_without_subscription_is_unresolvable() {
        let f = fixture(TenantId::new());
        let event = invoice_event(json!({"id": "in_1", "subscription": null}));

        let result = f.handler.handle(signed(event)).await.unwrap();

        assert!(matches!(result, SyncOutcome::Unresolvable { .. }));
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Classification and Audit Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn unrelated_event_type_is_ignored() {
        let f = fixture(TenantId::new());
        let event = json!({"id": "evt_c", "type": "customer.created", "data": {"object": {"id": "cus_1"}}});

        let result = f.handler.handle(signed(event)).await.unwrap();

        assert_eq!(result, SyncOutcome::Ignored);
        assert_eq!(f.store.write_count(), 0);
        let audit = f.audit.records.lock().unwrap();
        assert_eq!(audit.len(), 1);
        assert_eq!(audit[0].event_id, "evt_c");
    }

    #[tokio::test]
    async fn audit_failure_does_not_change_outcome() {
        let tenant_id = TenantId::new();
        let f = fixture_with(
            MockStore::with_tenant(tenant_id),
            MockLookup::none(),
            MockAuditLog {
                fail: true,
                ..Default::default()
            },
        );

        let result = f
            .handler
            .handle(signed(subscription_event(
                "customer.subscription.updated",
                tenant_id,
                "active",
            )))
            .await;

        assert!(matches!(result, Ok(SyncOutcome::Applied { .. })));
    }

    #[tokio::test]
    async fn audit_record_carries_livemode() {
        let tenant_id = TenantId::new();
        let f = fixture(tenant_id);
        let mut live = subscription_event("customer.subscription.updated", tenant_id, "active");
        live["livemode"] = json!(true);

        f.handler.handle(signed(live)).await.unwrap();
        f.handler
            .handle(signed(subscription_event(
                "customer.subscription.updated",
                tenant_id,
                "active",
            )))
            .await
            .unwrap();

        let audit = f.audit.records.lock().unwrap();
        assert!(audit[0].livemode);
        assert!(!audit[1].livemode);
    }
}
