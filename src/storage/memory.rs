use crate::{error::Result, models::ImageRecord, storage::traits::RecordStore};
use async_trait::async_trait;
use std::sync::Mutex;

#[derive(Default)]
pub struct MemoryRecordStore {
    records: Mutex<Vec<ImageRecord>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<ImageRecord> {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.records.lock().map(|records| records.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn save(&self, record: &ImageRecord) -> Result<()> {
        let mut records = self.records.lock().map_err(|_| {
            crate::error::RelayError::Persistence("record list lock poisoned".into())
        })?;
        records.push(record.clone());
        Ok(())
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GenerationRequest;

    #[tokio::test]
    async fn test_same_prompt_appends_new_rows() {
        let store = MemoryRecordStore::new();
        let request = GenerationRequest::parse("1", "a red fox").unwrap();
        let record = ImageRecord::for_request(&request, "https://img.example/a").unwrap();

        store.save(&record).await.unwrap();
        store.save(&record).await.unwrap();

        assert_eq!(store.len(), 2);
        assert_eq!(store.records()[1].prompt, "a red fox");
        assert!(store.health_check().await.unwrap());
    }
}
