use crate::{error::Result, models::ImageRecord};
use async_trait::async_trait;

/// Append-only: records are never updated or deleted.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn save(&self, record: &ImageRecord) -> Result<()>;

    async fn health_check(&self) -> Result<bool>;

    fn backend_name(&self) -> &'static str;
}
