//! Core types for the Talaria request-handling runtime.
//!
//! This crate defines the vocabulary shared by the router, the converter
//! registries and the dispatcher:
//!
//! - [`Payload`] / [`PayloadKind`] — the tagged in-memory value union that
//!   flows between wire bytes and handlers. Converters declare the kind
//!   they handle, so selection is a linear scan over declared kinds rather
//!   than runtime type introspection.
//! - [`HttpError`] — every failure kind the runtime distinguishes, each
//!   with its HTTP status mapping.
//! - [`ProblemDetail`] — the RFC 7807 payload shape every error renders to.
//!
//! # Example
//!
//! ```rust
//! use http::StatusCode;
//! use talaria_core::{HttpError, Payload, PayloadKind};
//!
//! let payload = Payload::Text("hello".into());
//! assert_eq!(payload.kind(), PayloadKind::Text);
//!
//! let err = HttpError::RouteNotFound { path: "/missing".into() };
//! assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
//!
//! let problem = err.to_problem(Some("/missing"), false);
//! assert_eq!(problem.status, 404);
//! assert_eq!(problem.title, "Not Found");
//! ```

mod error;
mod payload;

pub use error::{HttpError, ProblemDetail};
pub use payload::{Payload, PayloadKind};
