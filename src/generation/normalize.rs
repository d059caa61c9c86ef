use crate::{
    error::RelayError,
    models::{GeneratedImage, GenerationOutcome},
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::{Map, Value};

const IMAGE_FIELD: &str = "image";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyKind {
    Image,
    Json,
    Unknown,
}

/// Falls back to sniffing the body when the content type is missing or generic.
pub fn normalize_response(content_type: Option<&str>, body: &[u8]) -> GenerationOutcome {
    match classify(content_type, body) {
        BodyKind::Image => normalize_binary(body),
        BodyKind::Json => normalize_json(body),
        BodyKind::Unknown => Err(RelayError::UpstreamShape(format!(
            "unrecognized response body ({}, {} bytes)",
            content_type.unwrap_or("no content type"),
            body.len()
        ))),
    }
}

pub fn normalize_binary(body: &[u8]) -> GenerationOutcome {
    if body.is_empty() {
        return Err(RelayError::UpstreamShape("empty image body".into()));
    }
    Ok(GeneratedImage::Bytes(body.to_vec()))
}

pub fn normalize_json(body: &[u8]) -> GenerationOutcome {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| RelayError::Parsing(format!("invalid JSON from generator: {}", e)))?;

    match value {
        Value::Object(map) => normalize_object(&map),
        Value::Array(items) => normalize_array(&items),
        other => Err(RelayError::UpstreamShape(format!(
            "unexpected JSON value: {}",
            json_type(&other)
        ))),
    }
}

/// `{ "image": "<base64>" }`
pub fn normalize_object(map: &Map<String, Value>) -> GenerationOutcome {
    match map.get(IMAGE_FIELD) {
        None | Some(Value::Null) => Err(RelayError::UpstreamShape("missing image field".into())),
        Some(Value::String(payload)) => {
            let bytes = decode_image_payload(payload)?;
            normalize_binary(&bytes)
        }
        Some(other) => Err(RelayError::UpstreamShape(format!(
            "image field is {}, expected string",
            json_type(other)
        ))),
    }
}

/// `[ "<url>", ... ]`, only the first element matters.
pub fn normalize_array(items: &[Value]) -> GenerationOutcome {
    match items.first() {
        Some(Value::String(url)) if is_http_url(url) => {
            Ok(GeneratedImage::Url(url.trim().to_string()))
        }
        Some(other) => Err(RelayError::UpstreamShape(format!(
            "first array element is not a URL ({})",
            json_type(other)
        ))),
        None => Err(RelayError::UpstreamShape("empty result array".into())),
    }
}

fn decode_image_payload(payload: &str) -> Result<Vec<u8>, RelayError> {
    // data:image/png;base64,....
    let encoded = match payload.strip_prefix("data:") {
        Some(rest) => rest.split_once(',').map(|(_, data)| data).unwrap_or(rest),
        None => payload,
    };

    let encoded: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();

    STANDARD
        .decode(encoded)
        .map_err(|e| RelayError::Parsing(format!("image field is not valid base64: {}", e)))
}

fn classify(content_type: Option<&str>, body: &[u8]) -> BodyKind {
    let content_type = content_type
        .map(|ct| ct.split(';').next().unwrap_or("").trim().to_ascii_lowercase())
        .unwrap_or_default();

    if content_type.starts_with("image/") || content_type == "application/octet-stream" {
        return BodyKind::Image;
    }
    if content_type.contains("json") {
        return BodyKind::Json;
    }
    if has_image_signature(body) {
        return BodyKind::Image;
    }
    match body.iter().find(|b| !b.is_ascii_whitespace()) {
        Some(b'{') | Some(b'[') => BodyKind::Json,
        _ => BodyKind::Unknown,
    }
}

fn has_image_signature(body: &[u8]) -> bool {
    body.starts_with(b"\x89PNG\r\n\x1a\n")
        || body.starts_with(&[0xFF, 0xD8, 0xFF])
        || body.starts_with(b"GIF87a")
        || body.starts_with(b"GIF89a")
        || (body.len() >= 12 && &body[0..4] == b"RIFF" && &body[8..12] == b"WEBP")
}

fn is_http_url(value: &str) -> bool {
    let value = value.trim();
    value.starts_with("https://") || value.starts_with("http://")
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
