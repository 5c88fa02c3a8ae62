//! Pluggable wire-format converters for Talaria.
//!
//! Two structurally symmetric, priority-ordered registries translate between
//! wire bytes and typed [`Payload`] values:
//!
//! - [`DeserializerRegistry`] — request direction: bytes + `Content-Type`
//!   → a typed value.
//! - [`SerializerRegistry`] — response direction: a typed value + the
//!   client's [`AcceptList`] → bytes + a concrete content type.
//!
//! Selection is joint over declared content types (MediaType wildcard
//! matching) and declared value kinds. Custom converters registered with
//! `register_front` take precedence over the built-in defaults; within a
//! response selection, converters are additionally ranked by the quality of
//! the accept entry they matched.
//!
//! # Example
//!
//! ```rust
//! use bytes::Bytes;
//! use talaria_convert::{DeserializerRegistry, SerializerRegistry};
//! use talaria_core::{Payload, PayloadKind};
//! use talaria_mime::{AcceptList, MediaType};
//!
//! let deserializers = DeserializerRegistry::with_defaults();
//! let content_type = MediaType::parse("application/json").unwrap();
//! let value = deserializers
//!     .deserialize(&Bytes::from_static(b"{\"a\":1}"), &content_type, PayloadKind::Structured)
//!     .unwrap();
//! assert_eq!(value.as_structured().unwrap()["a"], 1);
//!
//! let serializers = SerializerRegistry::with_defaults();
//! let accept = AcceptList::parse("application/json").unwrap();
//! let (bytes, content_type) = serializers.serialize(&value, &accept).unwrap();
//! assert_eq!(content_type, "application/json");
//! assert_eq!(&bytes[..], b"{\"a\":1}");
//! ```
//!
//! # Concurrency
//!
//! Registry state lives behind a [`parking_lot::RwLock`]: selection takes
//! the read lock, the mutators (`register_front`, `clear_all`,
//! `restore_defaults`) take the write lock, so dynamic re-registration is
//! safe while concurrent requests are in flight. Tests that need isolation
//! should construct their own registry instances.

mod defaults;
mod registry;
mod traits;

pub use defaults::{
    BinarySerializer, FormDeserializer, JsonDeserializer, JsonSerializer, RawBytesDeserializer,
    StructuredFallbackSerializer, StructuredTextSerializer, TextDeserializer,
    TextFallbackSerializer, TextSerializer,
};
pub use registry::{DeserializerRegistry, SerializerRegistry};
pub use traits::{Negotiated, RequestDeserializer, ResponseSerializer};

// Re-exported so downstream crates can implement converters without naming
// the leaf crates directly.
pub use talaria_core::{Payload, PayloadKind};
pub use talaria_mime::{AcceptList, MediaType};
