pub mod config;
pub mod discord;
pub mod error;
pub mod generation;
pub mod hosting;
pub mod logger;
pub mod models;
pub mod router;
pub mod sink;
pub mod storage;

pub use config::{Config, DiscordConfig, GenerationConfig, ImgurConfig, MongoConfig, RecordBackend};
pub use error::{ErrorKind, RelayError, Result};
pub use generation::{HuggingFaceClient, ImageGenerator};
pub use hosting::{ImageHost, ImgurClient};
pub use models::{GeneratedImage, GenerationOutcome, GenerationRequest, ImageRecord, ReplyMessage};
pub use router::{CommandRouter, Invocation, PipelineStage};
pub use sink::ResponseSink;
pub use storage::{MemoryRecordStore, RecordStore, RecordStoreManager};
