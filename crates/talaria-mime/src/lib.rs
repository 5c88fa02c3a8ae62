//! Media type model and Accept-header negotiation for Talaria.
//!
//! This crate implements the HTTP media type vocabulary the rest of the
//! framework negotiates with: a single parsed [`MediaType`] (one entry of an
//! `Accept` or `Content-Type` header, with quality and parameters) and the
//! [`AcceptList`] (a client's ranked media type preferences with best-match
//! selection against a producer's candidate set).
//!
//! # Example
//!
//! ```rust
//! use talaria_mime::{AcceptList, MediaType};
//!
//! let accept = AcceptList::parse("text/html;q=0.5, application/json;q=0.9").unwrap();
//!
//! // Client quality dominates the producer's candidate order.
//! let (candidate, entry) = accept
//!     .best_match(&["text/html", "application/json"])
//!     .unwrap();
//! assert_eq!(candidate, "application/json");
//! assert_eq!(entry.quality(), 0.9);
//!
//! // Wildcard matching is symmetric.
//! let html = MediaType::new("text", "html").unwrap();
//! assert!(html.matches("text/*"));
//! ```
//!
//! # Matching rules
//!
//! - `type` and `subtype` are compared case-insensitively; `*` on either
//!   side of either operand matches anything.
//! - A concrete subtype under a wildcard type (`*/html`) is structurally
//!   invalid and fails construction.
//! - [`AcceptList`] entries are sorted by descending quality with a stable
//!   sort, so equal-quality entries keep their header order.

mod accept;
mod media_type;

pub use accept::AcceptList;
pub use media_type::{MediaType, MediaTypeError, DEFAULT_CHARSET};
