//! clinic-billing-sync service binary.
//!
//! Loads configuration, connects to PostgreSQL and serves the webhook and
//! tenant subscription endpoints.

use std::sync::Arc;

use clinic_billing_sync::adapters::http::{app_router, SubscriptionAppState};
use clinic_billing_sync::adapters::{
    DisabledSubscriptionLookup, PostgresTenantSubscriptionStore, PostgresWebhookAuditLog,
    StripeLookupConfig, StripeSubscriptionLookup,
};
use clinic_billing_sync::config::{AppConfig, ServerConfig};
use clinic_billing_sync::domain::subscription::WebhookVerifier;
use clinic_billing_sync::ports::SubscriptionLookup;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    init_tracing(&config.server);
    tracing::info!(
        environment = %config.server.environment,
        "Starting clinic-billing-sync"
    );

    let pool = config
        .database
        .pool_options()
        .connect(&config.database.url)
        .await?;

    if config.database.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Database migrations applied");
    }

    let lookup: Arc<dyn SubscriptionLookup> = match config.payment.api_key() {
        Some(api_key) => Arc::new(StripeSubscriptionLookup::new(
            StripeLookupConfig::new(api_key).with_base_url(&config.payment.api_base_url),
        )),
        None => {
            tracing::warn!(
                "No Stripe API key configured; invoices without tenant metadata will not resolve"
            );
            Arc::new(DisabledSubscriptionLookup)
        }
    };

    let state = SubscriptionAppState {
        verifier: WebhookVerifier::new(config.payment.webhook_secret())
            .with_tolerance_secs(config.payment.signature_tolerance_secs),
        store: Arc::new(PostgresTenantSubscriptionStore::new(pool.clone())),
        lookup,
        audit_log: Arc::new(PostgresWebhookAuditLog::new(pool)),
        store_timeout: config.database.write_timeout(),
    };

    let app = app_router(state, config.server.request_timeout());

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("clinic-billing-sync listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// JSON logs in production, human-readable otherwise. `RUST_LOG` overrides
/// the configured filter.
fn init_tracing(server: &ServerConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&server.log_level));

    if server.is_production() {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .pretty()
            .init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
