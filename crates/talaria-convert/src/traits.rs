//! Converter traits and the negotiated-match handed to serializers.

use bytes::Bytes;
use talaria_core::{HttpError, Payload, PayloadKind};
use talaria_mime::MediaType;

/// Turns request body bytes into a typed [`Payload`].
///
/// A deserializer declares the content-type patterns it accepts (or no
/// restriction at all) and the single value kind it produces. Entries must
/// be shareable across threads; registries store them as `Arc<dyn ...>`.
pub trait RequestDeserializer: Send + Sync {
    /// Content-type patterns this entry accepts (wildcards allowed), or
    /// `None` for no restriction — only the target kind matters then.
    fn content_types(&self) -> Option<&[&'static str]>;

    /// The value kind this entry produces.
    fn target_kind(&self) -> PayloadKind;

    /// Decodes the body bytes.
    ///
    /// # Errors
    ///
    /// A malformed body is a client error; implementations return a
    /// 400-class [`HttpError`].
    fn deserialize(&self, body: &Bytes, content_type: &MediaType) -> Result<Payload, HttpError>;
}

/// The accept-list match a serializer was selected with.
///
/// Carries the producer candidate that matched (possibly a wildcard
/// pattern such as `text/*`) and the client's accept entry it matched
/// against, so serializers can resolve a concrete wire content type.
#[derive(Debug, Clone)]
pub struct Negotiated {
    /// The producer-declared candidate that matched.
    pub candidate: String,
    /// The accept entry that matched it.
    pub media_type: MediaType,
}

impl Negotiated {
    /// Resolves the candidate into a concrete `type/subtype` string.
    ///
    /// Wildcard components take the concrete component of the accept entry
    /// when it has one, and the given defaults otherwise.
    #[must_use]
    pub fn concrete_content_type(&self, default_type: &str, default_subtype: &str) -> String {
        let (ctype, csubtype) = self
            .candidate
            .split_once('/')
            .unwrap_or((self.candidate.as_str(), "*"));

        let resolved_type = if ctype == "*" {
            self.media_type.type_name().unwrap_or(default_type)
        } else {
            ctype
        };
        let resolved_subtype = if csubtype == "*" {
            self.media_type.subtype().unwrap_or(default_subtype)
        } else {
            csubtype
        };
        format!("{resolved_type}/{resolved_subtype}")
    }
}

/// Turns a typed [`Payload`] into response bytes plus a content type.
///
/// A serializer declares the media types it can produce and the single
/// value kind it encodes. The returned content-type string must be
/// concrete — wildcard candidates are resolved via [`Negotiated`].
pub trait ResponseSerializer: Send + Sync {
    /// Media types this entry can produce, in preference order.
    fn media_types(&self) -> &[&'static str];

    /// The value kind this entry encodes.
    fn payload_kind(&self) -> PayloadKind;

    /// Encodes the payload, returning the body bytes and the concrete
    /// content type chosen.
    ///
    /// # Errors
    ///
    /// Encoding failures are internal errors; implementations return a
    /// 500-class [`HttpError`].
    fn serialize(
        &self,
        payload: &Payload,
        negotiated: &Negotiated,
    ) -> Result<(Bytes, String), HttpError>;
}
