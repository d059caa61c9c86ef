use crate::{
    config::PostgresConfig,
    error::{RelayError, Result},
    models::ImageRecord,
    storage::traits::RecordStore,
};

use async_trait::async_trait;
use deadpool_postgres::{Config, Pool, Runtime};
use tokio_postgres::NoTls;

pub struct PostgresRecordStore {
    pool: Pool,
}

impl PostgresRecordStore {
    pub async fn new(config: &PostgresConfig) -> Result<Self> {
        let mut cfg = Config::new();
        cfg.host = config.host.clone();
        cfg.port = config.port;
        cfg.user = config.username.clone();
        cfg.password = config.password.clone();
        cfg.dbname = config.database.clone();

        let pool = cfg
            .create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(|e| RelayError::Configuration(format!("Failed to create pool: {}", e)))?;

        let store = Self { pool };
        store.initialize_schema().await?;

        Ok(store)
    }

    async fn client(&self) -> Result<deadpool_postgres::Object> {
        self.pool
            .get()
            .await
            .map_err(|e| RelayError::Persistence(format!("Failed to get connection: {}", e)))
    }

    async fn initialize_schema(&self) -> Result<()> {
        let client = self.client().await?;

        client
            .execute(
                "CREATE TABLE IF NOT EXISTS generated_images (
                id BIGSERIAL PRIMARY KEY,
                user_id TEXT NOT NULL,
                prompt TEXT NOT NULL,
                image_url TEXT NOT NULL,
                timestamp TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )",
                &[],
            )
            .await
            .map_err(|e| {
                RelayError::Persistence(format!("Failed to create generated_images table: {}", e))
            })?;

        log::info!("PostgreSQL record storage schema initialized");
        Ok(())
    }
}

#[async_trait]
impl RecordStore for PostgresRecordStore {
    async fn save(&self, record: &ImageRecord) -> Result<()> {
        let client = self.client().await?;

        client
            .execute(
                "INSERT INTO generated_images (user_id, prompt, image_url, timestamp)
             VALUES ($1, $2, $3, $4)",
                &[
                    &record.requester_id,
                    &record.prompt,
                    &record.image_url,
                    &record.timestamp,
                ],
            )
            .await
            .map_err(|e| RelayError::Persistence(format!("Failed to insert record: {}", e)))?;

        Ok(())
    }

    async fn health_check(&self) -> Result<bool> {
        let client = self.client().await?;

        client
            .execute("SELECT 1", &[])
            .await
            .map_err(|_| RelayError::Persistence("Health check query failed".into()))?;

        Ok(true)
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}
