//! Store selection from configuration.

use pushhub_storage::{DynSubscriptionStore, StorageError};
use tracing::info;

use crate::config::{StorageBackend, StorageConfig};

/// Opens the configured subscription store.
///
/// The postgres backend connects, runs migrations when enabled and checks
/// the connection before returning.
pub async fn create_store(config: &StorageConfig) -> Result<DynSubscriptionStore, StorageError> {
    match config.backend {
        StorageBackend::Memory => {
            info!("Using in-memory subscription store; subscriptions are lost on restart");
            Ok(pushhub_db_memory::create_memory_store())
        }
        StorageBackend::Postgres => {
            let pg = config.postgres.as_ref().ok_or_else(|| {
                StorageError::internal("storage.postgres config is required for the postgres backend")
            })?;
            pushhub_db_postgres::create_postgres_store(pg.to_postgres_config()).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_backend() {
        let config = StorageConfig {
            backend: StorageBackend::Memory,
            postgres: None,
        };
        let store = create_store(&config).await.unwrap();
        assert_eq!(store.backend_name(), "memory");
        assert!(store.ping().await.is_ok());
    }

    #[tokio::test]
    async fn test_postgres_backend_requires_section() {
        let config = StorageConfig {
            backend: StorageBackend::Postgres,
            postgres: None,
        };
        assert!(create_store(&config).await.is_err());
    }
}
