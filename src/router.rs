use crate::{
    config::{Config, DEFAULT_COMMAND_PREFIX},
    error::{RelayError, Result},
    generation::{HuggingFaceClient, ImageGenerator},
    hosting::{ImageHost, ImgurClient},
    logger::Timer,
    models::{GeneratedImage, GenerationRequest, ImageRecord, ReplyMessage},
    sink::ResponseSink,
    storage::RecordStore,
};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

const PROMPT_LOG_CHARS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Idle,
    Parsed,
    AwaitingGeneration,
    AwaitingUpload,
    Persisted,
    Failed,
    Replied,
}

pub struct Invocation<'a> {
    pub requester_id: String,
    pub sink: &'a dyn ResponseSink,
}

struct StageTracker {
    request_id: String,
    stage: PipelineStage,
}

impl StageTracker {
    fn new() -> Self {
        let id = Uuid::new_v4().simple().to_string();
        Self {
            request_id: id[..8].to_string(),
            stage: PipelineStage::Idle,
        }
    }

    fn advance(&mut self, next: PipelineStage) {
        log::debug!("[req:{}] {:?} -> {:?}", self.request_id, self.stage, next);
        self.stage = next;
    }
}

pub struct CommandRouter {
    generator: Arc<dyn ImageGenerator>,
    host: Arc<dyn ImageHost>,
    store: Arc<dyn RecordStore>,
    command_prefix: String,
    retry_backoff: Duration,
}

impl CommandRouter {
    pub fn new(
        generator: Arc<dyn ImageGenerator>,
        host: Arc<dyn ImageHost>,
        store: Arc<dyn RecordStore>,
    ) -> Self {
        Self {
            generator,
            host,
            store,
            command_prefix: DEFAULT_COMMAND_PREFIX.to_string(),
            retry_backoff: Duration::from_millis(500),
        }
    }

    pub fn from_config(config: &Config, store: Arc<dyn RecordStore>) -> Result<Self> {
        let generator = HuggingFaceClient::new(&config.generation)?;
        let host = ImgurClient::new(&config.imgur)?;

        Ok(Self::new(Arc::new(generator), Arc::new(host), store)
            .with_command_prefix(config.discord.command_prefix.clone())
            .with_retry_backoff(config.retry_backoff))
    }

    pub fn with_command_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.command_prefix = prefix.into();
        self
    }

    pub fn with_retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }

    pub fn command_prefix(&self) -> &str {
        &self.command_prefix
    }

    pub async fn handle(&self, invocation: Invocation<'_>, raw_prompt: &str) {
        let mut tracker = StageTracker::new();
        let reply = self
            .process(&mut tracker, &invocation.requester_id, raw_prompt)
            .await;

        invocation.sink.reply(reply).await;
        tracker.advance(PipelineStage::Replied);
    }

    async fn process(
        &self,
        tracker: &mut StageTracker,
        requester_id: &str,
        raw_prompt: &str,
    ) -> ReplyMessage {
        let Some(request) = GenerationRequest::parse(requester_id, raw_prompt) else {
            log::info!(
                "[req:{}] Empty prompt from user {}, sending usage",
                tracker.request_id,
                requester_id
            );
            return ReplyMessage::usage(&self.command_prefix);
        };
        tracker.advance(PipelineStage::Parsed);

        log::info!(
            "[req:{}] Generating image | User: {} | Prompt: '{}'",
            tracker.request_id,
            request.requester_id,
            request.prompt.chars().take(PROMPT_LOG_CHARS).collect::<String>()
        );

        match self.run(tracker, &request).await {
            Ok(url) => {
                log::info!("[req:{}] Image ready: {}", tracker.request_id, url);
                ReplyMessage::image_url(url)
            }
            Err(err) => {
                log::error!(
                    "[req:{}] Error generating image during {:?} ({}): {}",
                    tracker.request_id,
                    tracker.stage,
                    err.kind(),
                    err
                );
                tracker.advance(PipelineStage::Failed);
                ReplyMessage::apology()
            }
        }
    }

    async fn run(&self, tracker: &mut StageTracker, request: &GenerationRequest) -> Result<String> {
        tracker.advance(PipelineStage::AwaitingGeneration);
        let generated = self
            .with_network_retry(&tracker.request_id, "generation", || {
                self.generator.generate(&request.prompt)
            })
            .await?;

        let url = match generated {
            GeneratedImage::Url(url) => {
                log::debug!(
                    "[req:{}] Backend returned a hosted URL, skipping upload",
                    tracker.request_id
                );
                url
            }
            GeneratedImage::Bytes(bytes) => {
                tracker.advance(PipelineStage::AwaitingUpload);
                self.with_network_retry(&tracker.request_id, "upload", || {
                    self.host.upload(bytes.clone())
                })
                .await?
            }
        };

        let record = ImageRecord::for_request(request, &url)
            .ok_or_else(|| RelayError::UpstreamShape("empty image URL".into()))?;

        // The user already has an image at this point; a lost record is not
        // worth an apology.
        if let Err(err) = self.store.save(&record).await {
            log::error!(
                "[req:{}] Failed to persist record to {}, replying anyway: {}",
                tracker.request_id,
                self.store.backend_name(),
                err
            );
        }
        tracker.advance(PipelineStage::Persisted);

        Ok(record.image_url)
    }

    async fn with_network_retry<T, F, Fut>(&self, request_id: &str, step: &str, mut call: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let _timer = Timer::new(format!("[req:{}] {}", request_id, step));

        match call().await {
            Err(err) if err.is_retryable() => {
                log::warn!(
                    "[req:{}] {} failed ({}), retrying once",
                    request_id,
                    step,
                    err
                );
                if !self.retry_backoff.is_zero() {
                    tokio::time::sleep(self.retry_backoff).await;
                }
                call().await
            }
            other => other,
        }
    }
}
