pub mod imgur;

use crate::error::Result;
use async_trait::async_trait;

pub use imgur::ImgurClient;

#[async_trait]
pub trait ImageHost: Send + Sync {
    async fn upload(&self, image: Vec<u8>) -> Result<String>;
}
