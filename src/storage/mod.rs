pub mod memory;
pub mod mongo;
#[cfg(feature = "postgres")]
pub mod postgres;
pub mod traits;

use crate::{
    config::{Config, RecordBackend},
    error::{RelayError, Result},
};
use std::sync::Arc;

pub use memory::MemoryRecordStore;
pub use mongo::MongoRecordStore;
#[cfg(feature = "postgres")]
pub use postgres::PostgresRecordStore;
pub use traits::RecordStore;

pub struct RecordStoreManager {
    backend: Arc<dyn RecordStore>,
}

impl RecordStoreManager {
    pub async fn new(config: &Config) -> Result<Self> {
        let backend: Arc<dyn RecordStore> = match config.backend {
            RecordBackend::Mongo => Arc::new(MongoRecordStore::new(&config.mongo).await?),
            RecordBackend::Postgres => {
                #[cfg(feature = "postgres")]
                {
                    Arc::new(PostgresRecordStore::new(&config.postgres).await?)
                }
                #[cfg(not(feature = "postgres"))]
                {
                    return Err(RelayError::Configuration(
                        "PostgreSQL feature not enabled".into(),
                    ));
                }
            }
            RecordBackend::Memory => {
                log::warn!("Using in-memory record store, records are lost on restart");
                Arc::new(MemoryRecordStore::new())
            }
        };

        Self::from_store(backend).await
    }

    pub async fn from_store(backend: Arc<dyn RecordStore>) -> Result<Self> {
        if !backend.health_check().await? {
            return Err(RelayError::Persistence(format!(
                "{} record store reported unhealthy",
                backend.backend_name()
            )));
        }
        log::info!("Record store '{}' is healthy", backend.backend_name());

        Ok(Self { backend })
    }

    pub fn storage(&self) -> Arc<dyn RecordStore> {
        Arc::clone(&self.backend)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::models::ImageRecord;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CheckedStore {
        healthy: Option<bool>,
        checks: AtomicUsize,
    }

    impl CheckedStore {
        fn new(healthy: Option<bool>) -> Arc<Self> {
            Arc::new(Self {
                healthy,
                checks: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl RecordStore for CheckedStore {
        async fn save(&self, _record: &ImageRecord) -> Result<()> {
            Ok(())
        }

        async fn health_check(&self) -> Result<bool> {
            self.checks.fetch_add(1, Ordering::SeqCst);
            self.healthy
                .ok_or_else(|| RelayError::Persistence("connection refused".into()))
        }

        fn backend_name(&self) -> &'static str {
            "checked"
        }
    }

    #[tokio::test]
    async fn test_memory_backend_selected() {
        let config = Config::new().with_memory_records();
        let manager = RecordStoreManager::new(&config).await.unwrap();
        assert_eq!(manager.storage().backend_name(), "memory");
    }

    #[tokio::test]
    async fn test_mongo_requires_connection_string() {
        let err = RecordStoreManager::new(&Config::new()).await.err().unwrap();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[tokio::test]
    async fn test_health_checked_once_on_connect() {
        let store = CheckedStore::new(Some(true));
        let manager = RecordStoreManager::from_store(store.clone()).await.unwrap();
        assert_eq!(store.checks.load(Ordering::SeqCst), 1);
        assert_eq!(manager.storage().backend_name(), "checked");
    }

    #[tokio::test]
    async fn test_unhealthy_store_rejected() {
        let err = RecordStoreManager::from_store(CheckedStore::new(Some(false)))
            .await
            .err()
            .unwrap();
        assert_eq!(err.kind(), ErrorKind::Persistence);

        let err = RecordStoreManager::from_store(CheckedStore::new(None))
            .await
            .err()
            .unwrap();
        assert_eq!(err.kind(), ErrorKind::Persistence);
    }
}
