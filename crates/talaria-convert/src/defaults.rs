//! Built-in converter sets.
//!
//! Registration order matters: restrictive entries come first, the `*/*`
//! fallbacks last, so a well-formed request always finds some converter
//! unless the value kind itself is unsupported.

use crate::traits::{Negotiated, RequestDeserializer, ResponseSerializer};
use bytes::Bytes;
use std::sync::Arc;
use talaria_core::{HttpError, Payload, PayloadKind};
use talaria_mime::MediaType;

/// The built-in request deserializers, in scan order.
#[must_use]
pub(crate) fn default_deserializers() -> Vec<Arc<dyn RequestDeserializer>> {
    vec![
        Arc::new(JsonDeserializer),
        Arc::new(FormDeserializer),
        Arc::new(RawBytesDeserializer),
        Arc::new(TextDeserializer),
    ]
}

/// The built-in response serializers, in scan order.
#[must_use]
pub(crate) fn default_serializers() -> Vec<Arc<dyn ResponseSerializer>> {
    vec![
        Arc::new(JsonSerializer),
        Arc::new(TextSerializer),
        Arc::new(BinarySerializer),
        Arc::new(StructuredTextSerializer),
        Arc::new(StructuredFallbackSerializer),
        Arc::new(TextFallbackSerializer),
    ]
}

fn decode_text(body: &Bytes, content_type: &MediaType) -> Result<String, HttpError> {
    let charset = content_type.charset();
    if !matches!(
        charset.to_ascii_lowercase().as_str(),
        "utf-8" | "utf8" | "us-ascii" | "ascii"
    ) {
        return Err(HttpError::bad_request(format!(
            "unsupported charset {charset:?}"
        )));
    }
    String::from_utf8(body.to_vec())
        .map_err(|_| HttpError::bad_request("request body is not valid UTF-8"))
}

/// Decodes `application/json` (and `application/problem+json`) bodies into
/// structured values.
pub struct JsonDeserializer;

impl RequestDeserializer for JsonDeserializer {
    fn content_types(&self) -> Option<&[&'static str]> {
        Some(&["application/json", "application/problem+json"])
    }

    fn target_kind(&self) -> PayloadKind {
        PayloadKind::Structured
    }

    fn deserialize(&self, body: &Bytes, _content_type: &MediaType) -> Result<Payload, HttpError> {
        serde_json::from_slice(body)
            .map(Payload::Structured)
            .map_err(|err| HttpError::bad_request(format!("invalid JSON body: {err}")))
    }
}

/// Decodes URL-encoded form bodies into structured values.
pub struct FormDeserializer;

impl RequestDeserializer for FormDeserializer {
    fn content_types(&self) -> Option<&[&'static str]> {
        Some(&["application/x-www-form-urlencoded", "application/x-url-encoded"])
    }

    fn target_kind(&self) -> PayloadKind {
        PayloadKind::Structured
    }

    fn deserialize(&self, body: &Bytes, _content_type: &MediaType) -> Result<Payload, HttpError> {
        if body.is_empty() {
            return Ok(Payload::Structured(serde_json::Value::Object(
                serde_json::Map::new(),
            )));
        }
        let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(body)
            .map_err(|err| HttpError::bad_request(format!("invalid form body: {err}")))?;
        let mut map = serde_json::Map::new();
        for (key, value) in pairs {
            map.insert(key, serde_json::Value::String(value));
        }
        Ok(Payload::Structured(serde_json::Value::Object(map)))
    }
}

/// Passes body bytes through untouched; no content-type restriction.
pub struct RawBytesDeserializer;

impl RequestDeserializer for RawBytesDeserializer {
    fn content_types(&self) -> Option<&[&'static str]> {
        None
    }

    fn target_kind(&self) -> PayloadKind {
        PayloadKind::Binary
    }

    fn deserialize(&self, body: &Bytes, _content_type: &MediaType) -> Result<Payload, HttpError> {
        Ok(Payload::Binary(body.clone()))
    }
}

/// Decodes body bytes as text per the declared charset; no content-type
/// restriction.
pub struct TextDeserializer;

impl RequestDeserializer for TextDeserializer {
    fn content_types(&self) -> Option<&[&'static str]> {
        None
    }

    fn target_kind(&self) -> PayloadKind {
        PayloadKind::Text
    }

    fn deserialize(&self, body: &Bytes, content_type: &MediaType) -> Result<Payload, HttpError> {
        decode_text(body, content_type).map(Payload::Text)
    }
}

/// Encodes structured values as JSON.
pub struct JsonSerializer;

impl ResponseSerializer for JsonSerializer {
    fn media_types(&self) -> &[&'static str] {
        &["application/json", "application/problem+json"]
    }

    fn payload_kind(&self) -> PayloadKind {
        PayloadKind::Structured
    }

    fn serialize(
        &self,
        payload: &Payload,
        negotiated: &Negotiated,
    ) -> Result<(Bytes, String), HttpError> {
        let value = payload
            .as_structured()
            .ok_or_else(|| HttpError::internal("JSON serializer applied to non-structured value"))?;
        let bytes = serde_json::to_vec(value)
            .map_err(|err| HttpError::internal_with_source("encoding JSON response", err))?;
        Ok((Bytes::from(bytes), negotiated.candidate.clone()))
    }
}

/// Encodes text values as `text/plain`.
pub struct TextSerializer;

impl ResponseSerializer for TextSerializer {
    fn media_types(&self) -> &[&'static str] {
        &["text/plain"]
    }

    fn payload_kind(&self) -> PayloadKind {
        PayloadKind::Text
    }

    fn serialize(
        &self,
        payload: &Payload,
        _negotiated: &Negotiated,
    ) -> Result<(Bytes, String), HttpError> {
        let text = payload
            .as_text()
            .ok_or_else(|| HttpError::internal("text serializer applied to non-text value"))?;
        Ok((Bytes::from(text.to_string()), "text/plain".to_string()))
    }
}

/// Passes byte values through for octet-stream or `text/*` requests.
pub struct BinarySerializer;

impl ResponseSerializer for BinarySerializer {
    fn media_types(&self) -> &[&'static str] {
        &["application/octet-stream", "text/*"]
    }

    fn payload_kind(&self) -> PayloadKind {
        PayloadKind::Binary
    }

    fn serialize(
        &self,
        payload: &Payload,
        negotiated: &Negotiated,
    ) -> Result<(Bytes, String), HttpError> {
        let bytes = payload
            .as_binary()
            .ok_or_else(|| HttpError::internal("binary serializer applied to non-binary value"))?;
        Ok((
            bytes.clone(),
            negotiated.concrete_content_type("application", "octet-stream"),
        ))
    }
}

/// Encodes structured values as JSON bytes served under `text/plain`.
pub struct StructuredTextSerializer;

impl ResponseSerializer for StructuredTextSerializer {
    fn media_types(&self) -> &[&'static str] {
        &["text/plain"]
    }

    fn payload_kind(&self) -> PayloadKind {
        PayloadKind::Structured
    }

    fn serialize(
        &self,
        payload: &Payload,
        negotiated: &Negotiated,
    ) -> Result<(Bytes, String), HttpError> {
        let (bytes, _) = JsonSerializer.serialize(payload, negotiated)?;
        Ok((bytes, "text/plain".to_string()))
    }
}

/// Catch-all for structured values: any accept list gets JSON.
pub struct StructuredFallbackSerializer;

impl ResponseSerializer for StructuredFallbackSerializer {
    fn media_types(&self) -> &[&'static str] {
        &["*/*"]
    }

    fn payload_kind(&self) -> PayloadKind {
        PayloadKind::Structured
    }

    fn serialize(
        &self,
        payload: &Payload,
        negotiated: &Negotiated,
    ) -> Result<(Bytes, String), HttpError> {
        let (bytes, _) = JsonSerializer.serialize(payload, negotiated)?;
        Ok((bytes, "application/json".to_string()))
    }
}

/// Catch-all for text values, guessing `text/html` for markup-shaped
/// bodies and `text/plain` otherwise.
pub struct TextFallbackSerializer;

impl ResponseSerializer for TextFallbackSerializer {
    fn media_types(&self) -> &[&'static str] {
        &["*/*"]
    }

    fn payload_kind(&self) -> PayloadKind {
        PayloadKind::Text
    }

    fn serialize(
        &self,
        payload: &Payload,
        _negotiated: &Negotiated,
    ) -> Result<(Bytes, String), HttpError> {
        let text = payload
            .as_text()
            .ok_or_else(|| HttpError::internal("text serializer applied to non-text value"))?;
        let subtype = guess_text_subtype(text);
        Ok((Bytes::from(text.to_string()), format!("text/{subtype}")))
    }
}

fn guess_text_subtype(text: &str) -> &'static str {
    let trimmed = text.trim_start().to_ascii_lowercase();
    if trimmed.starts_with("<!doctype html")
        || trimmed.starts_with("<html")
        || trimmed.starts_with("<title")
    {
        "html"
    } else {
        "plain"
    }
}
