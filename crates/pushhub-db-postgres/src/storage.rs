//! `SubscriptionStore` implementation backed by PostgreSQL.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pushhub_core::{NewSubscription, Subscription, SubscriptionId, SubscriptionKeys, now_utc};
use pushhub_storage::{StorageError, SubscriptionStore};
use sqlx_postgres::PgPool;
use time::OffsetDateTime;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::PostgresConfig;
use crate::error::{is_unique_violation, query_error};
use crate::{migrations, pool};

type SubscriptionRow = (Uuid, String, String, String, DateTime<Utc>);

/// PostgreSQL subscription store.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Connects to the database and applies pending migrations when
    /// `run_migrations` is set.
    ///
    /// # Errors
    ///
    /// Returns an error if the pool cannot be created or a migration fails.
    pub async fn new(config: PostgresConfig) -> Result<Self, StorageError> {
        let pool = pool::create_pool(&config).await?;

        if config.run_migrations {
            migrations::run(&pool).await?;
        }

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn time_to_chrono(t: OffsetDateTime) -> DateTime<Utc> {
        DateTime::from_timestamp(t.unix_timestamp(), t.nanosecond()).unwrap_or_else(Utc::now)
    }

    fn chrono_to_time(t: DateTime<Utc>) -> Result<OffsetDateTime, StorageError> {
        OffsetDateTime::from_unix_timestamp(t.timestamp())
            .and_then(|ts| ts.replace_nanosecond(t.timestamp_subsec_nanos()))
            .map_err(|e| StorageError::corrupt_record(format!("created_at out of range: {e}")))
    }

    fn from_row(row: SubscriptionRow) -> Result<Subscription, StorageError> {
        let (id, endpoint, p256dh, auth, created_at) = row;
        Ok(Subscription {
            id: SubscriptionId::from_uuid(id),
            endpoint,
            keys: SubscriptionKeys { p256dh, auth },
            created_at: Self::chrono_to_time(created_at)?,
        })
    }
}

#[async_trait]
impl SubscriptionStore for PostgresStore {
    async fn insert(&self, subscription: NewSubscription) -> Result<Subscription, StorageError> {
        let stored = subscription.into_subscription(SubscriptionId::generate(), now_utc());

        let result = sqlx_core::query::query(
            r#"
            INSERT INTO subscriptions (id, endpoint, p256dh, auth, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(*stored.id.as_uuid())
        .bind(&stored.endpoint)
        .bind(&stored.keys.p256dh)
        .bind(&stored.keys.auth)
        .bind(Self::time_to_chrono(stored.created_at))
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => {
                debug!(subscription_id = %stored.id, "Inserted subscription");
                Ok(stored)
            }
            Err(e) if is_unique_violation(&e) => Err(StorageError::already_exists(stored.endpoint)),
            Err(e) => Err(query_error(e)),
        }
    }

    async fn find_by_id(&self, id: &SubscriptionId) -> Result<Option<Subscription>, StorageError> {
        let row: Option<SubscriptionRow> = sqlx_core::query_as::query_as(
            r#"
            SELECT id, endpoint, p256dh, auth, created_at
            FROM subscriptions WHERE id = $1
            "#,
        )
        .bind(*id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(query_error)?;

        row.map(Self::from_row).transpose()
    }

    async fn find_by_endpoint(
        &self,
        endpoint: &str,
    ) -> Result<Option<Subscription>, StorageError> {
        let row: Option<SubscriptionRow> = sqlx_core::query_as::query_as(
            r#"
            SELECT id, endpoint, p256dh, auth, created_at
            FROM subscriptions WHERE endpoint = $1
            "#,
        )
        .bind(endpoint)
        .fetch_optional(&self.pool)
        .await
        .map_err(query_error)?;

        row.map(Self::from_row).transpose()
    }

    async fn delete(&self, id: &SubscriptionId) -> Result<bool, StorageError> {
        let result = sqlx_core::query::query("DELETE FROM subscriptions WHERE id = $1")
            .bind(*id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(query_error)?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            debug!(subscription_id = %id, "Deleted subscription");
        }
        Ok(deleted)
    }

    async fn list_all(&self) -> Result<Vec<Subscription>, StorageError> {
        let rows: Vec<SubscriptionRow> = sqlx_core::query_as::query_as(
            r#"
            SELECT id, endpoint, p256dh, auth, created_at
            FROM subscriptions ORDER BY created_at
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(query_error)?;

        rows.into_iter().map(Self::from_row).collect()
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&self) -> Result<(), StorageError> {
        pool::ping(&self.pool).await.map_err(Into::into)
    }

    async fn close(&self) {
        info!("Closing PostgreSQL connection pool");
        self.pool.close().await;
    }
}
