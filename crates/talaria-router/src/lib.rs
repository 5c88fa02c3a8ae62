//! Typed path-template compiler and matcher for Talaria.
//!
//! A [`PathTemplate`] compiles a route pattern with typed placeholders
//! (`/orders/:year/:month<int>/:id`) into a token list plus an anchored
//! matcher. The same token list drives three operations:
//!
//! - **Matching**: extract and convert path parameters from a URL.
//! - **Reverse generation**: build a concrete URL from parameter values.
//! - **Specificity ranking**: order templates so literal routes outrank
//!   placeholder routes at route-table build time.
//!
//! # Example
//!
//! ```rust
//! use talaria_router::PathTemplate;
//!
//! let template = PathTemplate::compile("/users/:id<int>").unwrap();
//!
//! let params = template.match_url("/users/42").unwrap().unwrap();
//! assert_eq!(params.get_int("id"), Some(42));
//!
//! // No match at all is `Ok(None)`, not an error.
//! assert!(template.match_url("/users").unwrap().is_none());
//!
//! // Generation is the inverse of matching.
//! let url = template.generate_url(&[("id", &42)]).unwrap();
//! assert_eq!(url, "/users/42");
//! ```
//!
//! Placeholder types are checked at compile time: an unknown annotation
//! fails [`PathTemplate::compile`] immediately rather than at match time.

mod params;
mod template;

pub use params::{ParamValue, PathParams};
pub use template::{ParamConversionError, ParamType, PathTemplate, Specificity, TemplateError};
