use crate::error::RelayError;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub requester_id: String,
    pub prompt: String,
    pub requested_at: DateTime<Utc>,
}

impl GenerationRequest {
    pub fn parse(requester_id: impl Into<String>, raw_prompt: &str) -> Option<Self> {
        let prompt = raw_prompt.trim();
        if prompt.is_empty() {
            return None;
        }

        Some(Self {
            requester_id: requester_id.into(),
            prompt: prompt.to_string(),
            requested_at: Utc::now(),
        })
    }
}

#[derive(Clone, PartialEq, Eq)]
pub enum GeneratedImage {
    Bytes(Vec<u8>),
    Url(String),
}

impl std::fmt::Debug for GeneratedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeneratedImage::Bytes(bytes) => write!(f, "Bytes({} bytes)", bytes.len()),
            GeneratedImage::Url(url) => f.debug_tuple("Url").field(url).finish(),
        }
    }
}

pub type GenerationOutcome = std::result::Result<GeneratedImage, RelayError>;
