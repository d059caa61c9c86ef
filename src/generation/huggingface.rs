use crate::{
    config::GenerationConfig,
    error::{body_snippet, RelayError, Result},
    generation::{normalize::normalize_response, ImageGenerator},
    models::GenerationOutcome,
};
use async_trait::async_trait;
use reqwest::{header, Client};
use serde_json::json;

#[derive(Clone)]
pub struct HuggingFaceClient {
    client: Client,
    endpoint: String,
    token: String,
    model: String,
    guidance_scale: f32,
}

impl HuggingFaceClient {
    pub fn new(config: &GenerationConfig) -> Result<Self> {
        let token = config
            .api_token
            .clone()
            .ok_or_else(|| RelayError::Configuration("Hugging Face token is required".into()))?;

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                RelayError::Configuration(format!("Failed to build generation client: {}", e))
            })?;

        Ok(Self {
            client,
            endpoint: format!(
                "{}/models/{}",
                config.base_url.trim_end_matches('/'),
                config.model
            ),
            token,
            model: config.model.clone(),
            guidance_scale: config.guidance_scale,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl ImageGenerator for HuggingFaceClient {
    async fn generate(&self, prompt: &str) -> GenerationOutcome {
        let payload = json!({
            "inputs": prompt,
            "parameters": {
                "guidance_scale": self.guidance_scale
            }
        });

        log::debug!("Generating image with model: {}", self.model);

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.token)
            .header(header::ACCEPT, "image/png, application/json")
            .json(&payload)
            .send()
            .await
            .map_err(|e| RelayError::from_transport("generation", &e))?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = response
            .bytes()
            .await
            .map_err(|e| RelayError::from_transport("generation", &e))?;

        if !status.is_success() {
            return Err(RelayError::Upstream(format!(
                "{}: {}",
                status,
                body_snippet(&body)
            )));
        }

        normalize_response(content_type.as_deref(), &body)
    }
}
