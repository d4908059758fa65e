//! PostgreSQL implementation of TenantSubscriptionStore.
//!
//! Tenant subscription state lives on the `organizations` table. Updates are
//! a single `UPDATE ... RETURNING` statement, so concurrent webhooks for the
//! same tenant never interleave a read and a write.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{DomainError, ErrorCode, TenantId};
use crate::domain::subscription::{StatusUpdate, SubscriptionStatus, TenantSubscription};
use crate::ports::TenantSubscriptionStore;

/// PostgreSQL implementation of the TenantSubscriptionStore port.
pub struct PostgresTenantSubscriptionStore {
    pool: PgPool,
}

impl PostgresTenantSubscriptionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of an organization's subscription columns.
#[derive(Debug, sqlx::FromRow)]
struct SubscriptionRow {
    id: Uuid,
    subscription_status: String,
    stripe_subscription_id: Option<String>,
    stripe_customer_id: Option<String>,
    plan_type: Option<String>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<SubscriptionRow> for TenantSubscription {
    type Error = DomainError;

    fn try_from(row: SubscriptionRow) -> Result<Self, Self::Error> {
        let status = row
            .subscription_status
            .parse::<SubscriptionStatus>()
            .map_err(|_| {
                DomainError::new(
                    ErrorCode::DatabaseError,
                    format!("Invalid subscription_status value: {}", row.subscription_status),
                )
            })?;

        Ok(TenantSubscription {
            tenant_id: TenantId::from_uuid(row.id),
            status,
            stripe_subscription_id: row.stripe_subscription_id,
            stripe_customer_id: row.stripe_customer_id,
            plan_type: row.plan_type,
            updated_at: row.updated_at,
        })
    }
}

#[async_trait]
impl TenantSubscriptionStore for PostgresTenantSubscriptionStore {
    async fn apply_status_update(
        &self,
        update: &StatusUpdate,
    ) -> Result<TenantSubscription, DomainError> {
        let row: Option<SubscriptionRow> = sqlx::query_as(
            r#"
            UPDATE organizations SET
                subscription_status = $2,
                stripe_subscription_id = COALESCE($3, stripe_subscription_id),
                stripe_customer_id = COALESCE(stripe_customer_id, $4),
                updated_at = now()
            WHERE id = $1
            RETURNING id, subscription_status, stripe_subscription_id, stripe_customer_id,
                      plan_type, updated_at
            "#,
        )
        .bind(update.tenant_id.as_uuid())
        .bind(update.status.as_str())
        .bind(&update.stripe_subscription_id)
        .bind(&update.stripe_customer_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to update subscription status: {}", e),
            )
        })?;

        let row = row.ok_or_else(|| {
            DomainError::new(
                ErrorCode::TenantNotFound,
                format!("Tenant {} not found", update.tenant_id),
            )
        })?;

        TenantSubscription::try_from(row)
    }

    async fn find_by_tenant_id(
        &self,
        tenant_id: &TenantId,
    ) -> Result<Option<TenantSubscription>, DomainError> {
        let row: Option<SubscriptionRow> = sqlx::query_as(
            r#"
            SELECT id, subscription_status, stripe_subscription_id, stripe_customer_id,
                   plan_type, updated_at
            FROM organizations
            WHERE id = $1
            "#,
        )
        .bind(tenant_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to find tenant subscription: {}", e),
            )
        })?;

        row.map(TenantSubscription::try_from).transpose()
    }
}
