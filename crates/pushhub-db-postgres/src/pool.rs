//! Connection pool for the subscription store.
//!
//! The store issues short single-row statements plus one `list_all` per
//! sweep tick, so the pool keeps a small warm floor and recycles
//! connections on a fixed lifetime.

use std::time::Duration;

use sqlx_core::pool::PoolOptions;
use sqlx_postgres::{PgPool, Postgres};
use tracing::{debug, info, instrument};

use crate::config::PostgresConfig;
use crate::error::{PostgresError, Result};

/// Pool options derived from `config`, without connecting.
pub(crate) fn pool_options(config: &PostgresConfig) -> PoolOptions<Postgres> {
    let options = PoolOptions::<Postgres>::new()
        .max_connections(config.pool_size)
        .min_connections(config.effective_min_connections())
        .acquire_timeout(Duration::from_millis(config.connect_timeout_ms))
        .idle_timeout(config.idle_timeout_ms.map(Duration::from_millis))
        .max_lifetime(config.max_lifetime_secs.map(Duration::from_secs));

    // A dropped connection surfaces as a connection fault on the next query
    // instead of a stale handle.
    options.test_before_acquire(true)
}

/// Connects a pool for `config.url`.
#[instrument(skip(config), fields(url = %mask_password(&config.url)))]
pub async fn create_pool(config: &PostgresConfig) -> Result<PgPool> {
    info!(
        pool_size = config.pool_size,
        min_connections = config.effective_min_connections(),
        connect_timeout_ms = config.connect_timeout_ms,
        "Creating PostgreSQL connection pool"
    );

    let pool = pool_options(config).connect(&config.url).await?;
    debug!("PostgreSQL connection pool ready");
    Ok(pool)
}

/// Round-trips `SELECT 1`; backs store readiness.
#[instrument(skip(pool))]
pub async fn ping(pool: &PgPool) -> Result<()> {
    sqlx_core::query::query("SELECT 1")
        .execute(pool)
        .await
        .map_err(PostgresError::from)?;
    Ok(())
}

/// Replaces the password in a connection URL with `****` for logs.
pub(crate) fn mask_password(url: &str) -> String {
    let Some(scheme_end) = url.find("://").map(|p| p + 3) else {
        return url.to_string();
    };
    let Some(at) = url[scheme_end..].find('@').map(|p| p + scheme_end) else {
        return url.to_string();
    };
    match url[scheme_end..at].find(':') {
        Some(colon) => format!("{}:****{}", &url[..scheme_end + colon], &url[at..]),
        None => url.to_string(),
    }
}
