use super::generation::GenerationRequest;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq)]
pub struct ImageRecord {
    pub requester_id: String,
    pub prompt: String,
    pub image_url: String,
    pub timestamp: DateTime<Utc>,
}

impl ImageRecord {
    pub fn for_request(request: &GenerationRequest, image_url: &str) -> Option<Self> {
        let image_url = image_url.trim();
        if image_url.is_empty() {
            return None;
        }

        Some(Self {
            requester_id: request.requester_id.clone(),
            prompt: request.prompt.clone(),
            image_url: image_url.to_string(),
            timestamp: request.requested_at,
        })
    }
}
