//! Priority-ordered converter registries with joint content-type and
//! value-kind selection.

use crate::defaults;
use crate::traits::{Negotiated, RequestDeserializer, ResponseSerializer};
use bytes::Bytes;
use parking_lot::RwLock;
use std::cmp::Ordering;
use std::sync::Arc;
use talaria_core::{HttpError, Payload, PayloadKind};
use talaria_mime::{AcceptList, MediaType};
use tracing::debug;

/// The ordered set of request-body deserializers.
///
/// Entries are scanned front to back: custom entries registered with
/// [`register_front`](Self::register_front) come before the defaults, and
/// the most recently registered custom entry comes first. State is guarded
/// by a reader-writer lock, so re-registration is safe while concurrent
/// requests read the registry.
pub struct DeserializerRegistry {
    entries: RwLock<Vec<Arc<dyn RequestDeserializer>>>,
}

impl DeserializerRegistry {
    /// Creates a registry holding the built-in deserializer set.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self {
            entries: RwLock::new(defaults::default_deserializers()),
        }
    }

    /// Creates an empty registry.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
        }
    }

    /// Inserts a deserializer before all existing entries, letting
    /// application code override the defaults.
    pub fn register_front(&self, entry: Arc<dyn RequestDeserializer>) {
        self.entries.write().insert(0, entry);
    }

    /// Removes every entry, including the defaults.
    pub fn clear_all(&self) {
        self.entries.write().clear();
    }

    /// Resets the registry to the built-in entry set.
    pub fn restore_defaults(&self) {
        *self.entries.write() = defaults::default_deserializers();
    }

    /// Decodes body bytes into a value of the requested kind.
    ///
    /// Scans the registry for the first entry that accepts `content_type`
    /// (via MediaType wildcard matching, or unconditionally when the entry
    /// declares no restriction) and produces `target`.
    ///
    /// # Errors
    ///
    /// [`HttpError::UnsupportedMediaType`] when no entry accepts the
    /// content type at all, [`HttpError::NoConverterForType`] when the
    /// content type is accepted but no entry produces the target kind, and
    /// whatever client error the selected entry reports for a malformed
    /// body.
    pub fn deserialize(
        &self,
        body: &Bytes,
        content_type: &MediaType,
        target: PayloadKind,
    ) -> Result<Payload, HttpError> {
        let entries = self.entries.read();
        let mut content_type_supported = false;

        for entry in entries.iter() {
            let accepts = match entry.content_types() {
                None => true,
                Some(patterns) => patterns.iter().any(|pattern| content_type.matches(pattern)),
            };
            if !accepts {
                continue;
            }
            content_type_supported = true;
            if entry.target_kind() == target {
                if entry.content_types().is_none() {
                    debug!(
                        content_type = %content_type,
                        kind = %target,
                        "no restricted deserializer claimed the content type; using fallback"
                    );
                }
                return entry.deserialize(body, content_type);
            }
        }

        if content_type_supported {
            Err(HttpError::NoConverterForType { kind: target })
        } else {
            Err(HttpError::UnsupportedMediaType {
                content_type: content_type.render(false),
            })
        }
    }
}

impl Default for DeserializerRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// The ordered set of response-body serializers.
///
/// Selection is driven by the client's [`AcceptList`]: every entry whose
/// declared media types best-match the list is collected, the matches are
/// ranked by the quality of the accept entry they matched (stable, so
/// registry order breaks ties), and the best-ranked entry whose declared
/// kind equals the payload's kind performs the encoding. Locking follows
/// the same reader-writer policy as [`DeserializerRegistry`].
pub struct SerializerRegistry {
    entries: RwLock<Vec<Arc<dyn ResponseSerializer>>>,
}

impl SerializerRegistry {
    /// Creates a registry holding the built-in serializer set.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self {
            entries: RwLock::new(defaults::default_serializers()),
        }
    }

    /// Creates an empty registry.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
        }
    }

    /// Inserts a serializer before all existing entries.
    pub fn register_front(&self, entry: Arc<dyn ResponseSerializer>) {
        self.entries.write().insert(0, entry);
    }

    /// Removes every entry, including the defaults.
    pub fn clear_all(&self) {
        self.entries.write().clear();
    }

    /// Resets the registry to the built-in entry set.
    pub fn restore_defaults(&self) {
        *self.entries.write() = defaults::default_serializers();
    }

    /// Encodes a payload for the given accept list, returning the body
    /// bytes and the concrete content type chosen.
    ///
    /// # Errors
    ///
    /// [`HttpError::NotAcceptable`] when no serializer's declared media
    /// types intersect the accept list, and
    /// [`HttpError::NoConverterForType`] when some do but none of them
    /// encodes the payload's kind.
    pub fn serialize(
        &self,
        payload: &Payload,
        accept: &AcceptList,
    ) -> Result<(Bytes, String), HttpError> {
        let entries = self.entries.read();

        let mut matching: Vec<(&Arc<dyn ResponseSerializer>, Negotiated)> = Vec::new();
        for entry in entries.iter() {
            if let Some((candidate, media_type)) = accept.best_match(entry.media_types()) {
                matching.push((
                    entry,
                    Negotiated {
                        candidate: candidate.to_string(),
                        media_type: media_type.clone(),
                    },
                ));
            }
        }

        if matching.is_empty() {
            return Err(HttpError::NotAcceptable {
                accept: accept.to_string(),
            });
        }

        // Stable sort: registry order breaks quality ties.
        matching.sort_by(|a, b| {
            b.1.media_type
                .quality()
                .partial_cmp(&a.1.media_type.quality())
                .unwrap_or(Ordering::Equal)
        });

        for (entry, negotiated) in &matching {
            if entry.payload_kind() == payload.kind() {
                debug!(
                    candidate = %negotiated.candidate,
                    kind = %payload.kind(),
                    "selected response serializer"
                );
                return entry.serialize(payload, negotiated);
            }
        }

        Err(HttpError::NoConverterForType {
            kind: payload.kind(),
        })
    }
}

impl Default for SerializerRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
