//! Embedded database migrations.

use sqlx_core::migrate::{Migration, MigrationType};
use sqlx_postgres::PgPool;
use std::borrow::Cow;
use tracing::{info, instrument};

use crate::error::Result;

/// Migrations compiled into the binary, in chronological order.
/// Each entry is `(version, description, sql)`.
macro_rules! embedded_migrations {
    () => {
        &[(
            20260301000001i64,
            "subscriptions",
            include_str!("../../migrations/20260301000001_subscriptions.sql"),
        )]
    };
}

fn build_migrations() -> Vec<Migration> {
    embedded_migrations!()
        .iter()
        .map(|(version, description, sql)| Migration {
            version: *version,
            description: Cow::Borrowed(description),
            migration_type: MigrationType::Simple,
            sql: Cow::Borrowed(sql),
            checksum: Cow::Borrowed(&[]),
            no_tx: false,
        })
        .collect()
}

/// Runs all pending migrations. Applied versions are tracked in
/// `_sqlx_migrations`.
///
/// # Errors
///
/// Returns an error if a migration fails to execute.
#[instrument(skip(pool))]
pub async fn run(pool: &PgPool) -> Result<()> {
    let migrations = build_migrations();
    info!(count = migrations.len(), "Running database migrations (embedded)");

    let migrator = sqlx_core::migrate::Migrator {
        migrations: Cow::Owned(migrations),
        ignore_missing: false,
        locking: true,
        no_tx: false,
    };

    migrator
        .run(pool)
        .await
        .map_err(|e| crate::error::PostgresError::Migration(format!("Migration failed: {e}")))?;

    info!("Database migrations completed successfully");

    Ok(())
}
