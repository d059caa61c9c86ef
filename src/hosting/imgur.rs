use crate::{
    config::ImgurConfig,
    error::{body_snippet, RelayError, Result},
    hosting::ImageHost,
};
use async_trait::async_trait;
use reqwest::{
    header,
    multipart::{Form, Part},
    Client, StatusCode,
};
use serde_json::Value;

#[derive(Clone)]
pub struct ImgurClient {
    client: Client,
    endpoint: String,
    client_id: String,
}

impl ImgurClient {
    pub fn new(config: &ImgurConfig) -> Result<Self> {
        let client_id = config
            .client_id
            .clone()
            .ok_or_else(|| RelayError::Configuration("Imgur client id is required".into()))?;

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| RelayError::Configuration(format!("Failed to build upload client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: format!("{}/3/image", config.base_url.trim_end_matches('/')),
            client_id,
        })
    }
}

/// Pulls `data.link` out of an upload response body.
pub fn extract_link(body: &[u8]) -> Result<String> {
    let json: Value = serde_json::from_slice(body)
        .map_err(|e| RelayError::Parsing(format!("invalid JSON from image host: {}", e)))?;

    json["data"]["link"]
        .as_str()
        .map(str::trim)
        .filter(|link| !link.is_empty())
        .map(String::from)
        .ok_or_else(|| RelayError::UpstreamShape("upload response has no data.link".into()))
}

#[async_trait]
impl ImageHost for ImgurClient {
    async fn upload(&self, image: Vec<u8>) -> Result<String> {
        log::debug!("Uploading {} bytes to image host", image.len());

        let form = Form::new()
            .part("image", Part::bytes(image).file_name("image.png"))
            .text("type", "file");

        let response = self
            .client
            .post(&self.endpoint)
            .header(header::AUTHORIZATION, format!("Client-ID {}", self.client_id))
            .multipart(form)
            .send()
            .await
            .map_err(|e| RelayError::from_transport("upload", &e))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| RelayError::from_transport("upload", &e))?;

        if status != StatusCode::OK {
            return Err(RelayError::Upstream(format!(
                "{}: {}",
                status,
                body_snippet(&body)
            )));
        }

        extract_link(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::time::Duration;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> ImgurClient {
        let config = ImgurConfig::new()
            .with_client_id("imgur-test")
            .with_base_url(server.uri())
            .with_timeout(Duration::from_millis(300));
        ImgurClient::new(&config).unwrap()
    }

    #[test]
    fn extract_link_shapes() {
        assert_eq!(
            extract_link(br#"{"data":{"link":"https://i.imgur.com/abc.png"},"success":true}"#).unwrap(),
            "https://i.imgur.com/abc.png"
        );
        assert_eq!(
            extract_link(br#"{"data":{}}"#).unwrap_err().kind(),
            ErrorKind::UpstreamShape
        );
        assert_eq!(
            extract_link(br#"{"data":{"link":""}}"#).unwrap_err().kind(),
            ErrorKind::UpstreamShape
        );
        assert_eq!(extract_link(b"<html>").unwrap_err().kind(), ErrorKind::Parsing);
    }

    #[tokio::test]
    async fn upload_returns_link() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/3/image"))
            .and(header("authorization", "Client-ID imgur-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": { "link": "https://img.example/abc" },
                "success": true,
                "status": 200
            })))
            .expect(1)
            .mount(&server)
            .await;

        let link = client_for(&server).upload(b"png".to_vec()).await.unwrap();
        assert_eq!(link, "https://img.example/abc");
    }

    #[tokio::test]
    async fn server_error_is_upstream() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let err = client_for(&server).upload(b"png".to_vec()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Upstream);
        assert!(err.detail().starts_with("500"));
    }

    #[tokio::test]
    async fn non_200_success_is_upstream() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "data": { "link": "https://img.example/abc" }
            })))
            .mount(&server)
            .await;

        let err = client_for(&server).upload(b"png".to_vec()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Upstream);
    }

    #[tokio::test]
    async fn unparsable_body_is_parsing_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json at all"))
            .mount(&server)
            .await;

        let err = client_for(&server).upload(b"png".to_vec()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parsing);
    }

    #[tokio::test]
    async fn missing_link_is_shape_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "data": {} })),
            )
            .mount(&server)
            .await;

        let err = client_for(&server).upload(b"png".to_vec()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UpstreamShape);
    }

    #[tokio::test]
    async fn timeout_is_network_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .mount(&server)
            .await;

        let err = client_for(&server).upload(b"png".to_vec()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Network);
    }
}
