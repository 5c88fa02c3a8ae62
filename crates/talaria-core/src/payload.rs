//! The in-memory value union converters translate to and from.

use bytes::Bytes;
use std::fmt;

/// The kind of value a converter consumes or produces.
///
/// Converters declare their kind explicitly; registries select by comparing
/// declared kinds against [`Payload::kind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PayloadKind {
    /// JSON-compatible structured data (objects, arrays, scalars).
    Structured,
    /// Plain text.
    Text,
    /// Raw bytes.
    Binary,
}

impl fmt::Display for PayloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Structured => f.write_str("structured"),
            Self::Text => f.write_str("text"),
            Self::Binary => f.write_str("binary"),
        }
    }
}

/// A typed in-memory value: the decoded form of a request body, or the
/// handler-produced value a response serializer encodes.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Structured data, held as a JSON value.
    Structured(serde_json::Value),
    /// Plain text.
    Text(String),
    /// Raw bytes.
    Binary(Bytes),
}

impl Payload {
    /// The kind tag for this value.
    #[must_use]
    pub fn kind(&self) -> PayloadKind {
        match self {
            Self::Structured(_) => PayloadKind::Structured,
            Self::Text(_) => PayloadKind::Text,
            Self::Binary(_) => PayloadKind::Binary,
        }
    }

    /// The structured value, if this is a [`Payload::Structured`].
    #[must_use]
    pub fn as_structured(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Structured(value) => Some(value),
            _ => None,
        }
    }

    /// The text value, if this is a [`Payload::Text`].
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value),
            _ => None,
        }
    }

    /// The byte value, if this is a [`Payload::Binary`].
    #[must_use]
    pub fn as_binary(&self) -> Option<&Bytes> {
        match self {
            Self::Binary(value) => Some(value),
            _ => None,
        }
    }
}

impl From<serde_json::Value> for Payload {
    fn from(value: serde_json::Value) -> Self {
        Self::Structured(value)
    }
}

impl From<String> for Payload {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for Payload {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<Bytes> for Payload {
    fn from(value: Bytes) -> Self {
        Self::Binary(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_tags() {
        assert_eq!(Payload::from(json!({"a": 1})).kind(), PayloadKind::Structured);
        assert_eq!(Payload::from("hi").kind(), PayloadKind::Text);
        assert_eq!(Payload::from(Bytes::from_static(b"x")).kind(), PayloadKind::Binary);
    }

    #[test]
    fn test_accessors() {
        let payload = Payload::from(json!([1, 2]));
        assert_eq!(payload.as_structured(), Some(&json!([1, 2])));
        assert_eq!(payload.as_text(), None);
        assert_eq!(payload.as_binary(), None);
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(PayloadKind::Structured.to_string(), "structured");
        assert_eq!(PayloadKind::Text.to_string(), "text");
        assert_eq!(PayloadKind::Binary.to_string(), "binary");
    }
}
