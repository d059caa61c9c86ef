use crate::models::ReplyMessage;
use async_trait::async_trait;

/// Called exactly once per invocation. Delivery failures are logged, not returned.
#[async_trait]
pub trait ResponseSink: Send + Sync {
    async fn reply(&self, message: ReplyMessage);
}
