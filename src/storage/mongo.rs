use crate::{
    config::MongoConfig,
    error::{RelayError, Result},
    models::ImageRecord,
    storage::traits::RecordStore,
};
use async_trait::async_trait;
use mongodb::{
    bson::{doc, DateTime as BsonDateTime},
    options::ClientOptions,
    Client, Collection, Database,
};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct RecordDocument {
    user_id: String,
    prompt: String,
    image_url: String,
    timestamp: BsonDateTime,
}

impl From<&ImageRecord> for RecordDocument {
    fn from(record: &ImageRecord) -> Self {
        Self {
            user_id: record.requester_id.clone(),
            prompt: record.prompt.clone(),
            image_url: record.image_url.clone(),
            timestamp: BsonDateTime::from_millis(record.timestamp.timestamp_millis()),
        }
    }
}

pub struct MongoRecordStore {
    database: Database,
    collection: Collection<RecordDocument>,
}

impl MongoRecordStore {
    pub async fn new(config: &MongoConfig) -> Result<Self> {
        let uri = config.connection_string.as_deref().ok_or_else(|| {
            RelayError::Configuration("MongoDB connection string is required".into())
        })?;

        let mut options = ClientOptions::parse(uri).await.map_err(|e| {
            RelayError::Configuration(format!("Invalid MongoDB connection string: {}", e))
        })?;
        options.app_name = Some(env!("CARGO_PKG_NAME").to_string());

        let client = Client::with_options(options)
            .map_err(|e| RelayError::Persistence(format!("Failed to create MongoDB client: {}", e)))?;
        let database = client.database(&config.database);
        let collection = database.collection::<RecordDocument>(&config.collection);

        log::info!(
            "MongoDB client ready: {}.{}",
            config.database,
            config.collection
        );

        Ok(Self {
            database,
            collection,
        })
    }
}

#[async_trait]
impl RecordStore for MongoRecordStore {
    async fn save(&self, record: &ImageRecord) -> Result<()> {
        let result = self
            .collection
            .insert_one(RecordDocument::from(record), None)
            .await
            .map_err(|e| RelayError::Persistence(format!("MongoDB insert failed: {}", e)))?;

        log::debug!("Stored generation record {:?}", result.inserted_id);
        Ok(())
    }

    async fn health_check(&self) -> Result<bool> {
        self.database
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| RelayError::Persistence(format!("MongoDB ping failed: {}", e)))?;

        Ok(true)
    }

    fn backend_name(&self) -> &'static str {
        "mongo"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GenerationRequest;
    use mongodb::bson::{self, Bson};

    #[test]
    fn test_record_document_layout() {
        let request = GenerationRequest::parse("7", "a red fox").unwrap();
        let record = ImageRecord::for_request(&request, "https://img.example/abc").unwrap();

        let document = bson::to_document(&RecordDocument::from(&record)).unwrap();
        let mut keys: Vec<&str> = document.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, vec!["image_url", "prompt", "timestamp", "user_id"]);

        assert_eq!(document.get_str("user_id").unwrap(), "7");
        assert_eq!(document.get_str("prompt").unwrap(), "a red fox");
        assert_eq!(document.get_str("image_url").unwrap(), "https://img.example/abc");
        match document.get("timestamp") {
            Some(Bson::DateTime(stamp)) => {
                assert_eq!(stamp.timestamp_millis(), record.timestamp.timestamp_millis())
            }
            other => panic!("timestamp stored as {:?}", other),
        }
    }
}
