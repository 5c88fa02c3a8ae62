//! # Talaria
//!
//! A small HTTP request-handling runtime: typed routing by URL pattern,
//! wire-format negotiation driven by `Content-Type`/`Accept` semantics, and
//! RFC 7807 problem-detail error normalization.
//!
//! Talaria is transport-agnostic. The surrounding application hands the
//! [`Dispatcher`] a parsed method, a path, raw header strings and fully-read
//! body bytes; it gets back a status, a concrete content type and encoded
//! body bytes. Sockets, TLS, schema validation and API documentation are
//! external collaborators.
//!
//! ## The negotiation pipeline
//!
//! 1. **Routing** — the request path is matched against a [`RouteTable`] of
//!    compiled [`PathTemplate`]s, ranked once at build time so literal
//!    segments outrank placeholders. Typed path parameters
//!    (`/users/:id<int>`) are extracted and converted.
//! 2. **Request body** — if the route declares a body, the
//!    [`DeserializerRegistry`] turns the raw bytes into a typed [`Payload`]
//!    based on the request's content type and the declared target kind.
//! 3. **Handler** — a synchronous function from [`RequestContext`] to
//!    [`HandlerResponse`].
//! 4. **Response body** — the [`SerializerRegistry`] picks an encoder by
//!    intersecting the client's [`AcceptList`] with each serializer's
//!    declared media types, ranked by accept quality.
//! 5. **Errors** — any failure renders as a problem detail, itself
//!    negotiated (HTML, JSON, problem+json or plain text) against the same
//!    accept list.
//!
//! ## Example
//!
//! ```rust
//! use http::{Method, StatusCode};
//! use serde_json::json;
//! use talaria::{
//!     Dispatcher, HandlerResponse, HttpError, Payload, Request, RequestContext, Route,
//!     RouteTable,
//! };
//!
//! fn get_user(ctx: RequestContext) -> Result<HandlerResponse, HttpError> {
//!     let id = ctx.params.get_int("id").unwrap_or_default();
//!     Ok(HandlerResponse::ok(Payload::Structured(json!({ "id": id }))))
//! }
//!
//! let table = RouteTable::builder()
//!     .route(Route::get("/users/:id<int>", get_user))
//!     .build()
//!     .unwrap();
//! let dispatcher = Dispatcher::new(table);
//!
//! let response = dispatcher.dispatch(
//!     Request::new(Method::GET, "/users/42").with_accept("application/json"),
//! );
//! assert_eq!(response.status, StatusCode::OK);
//! assert_eq!(response.content_type, "application/json");
//!
//! // Unmatched paths come back as negotiated problem details.
//! let response = dispatcher.dispatch(
//!     Request::new(Method::GET, "/nope").with_accept("application/problem+json"),
//! );
//! assert_eq!(response.status, StatusCode::NOT_FOUND);
//! assert_eq!(response.content_type, "application/problem+json");
//! ```
//!
//! ## Concurrency
//!
//! Request handling is synchronous with no internal suspension points. The
//! route table is immutable after [`RouteTable::builder`] finishes, and the
//! converter registries guard their state with a reader-writer lock, so one
//! `Dispatcher` may serve any number of threads concurrently.

mod dispatcher;
mod route;

pub use dispatcher::{
    Dispatcher, DispatcherConfig, Request, Response, RouteTable, RouteTableBuilder,
};
pub use route::{Handler, HandlerResponse, RequestContext, Route};

// The vocabulary crates, re-exported for one-stop imports.
pub use talaria_convert::{
    DeserializerRegistry, Negotiated, RequestDeserializer, ResponseSerializer, SerializerRegistry,
};
pub use talaria_core::{HttpError, Payload, PayloadKind, ProblemDetail};
pub use talaria_mime::{AcceptList, MediaType, MediaTypeError};
pub use talaria_router::{
    ParamConversionError, ParamValue, PathParams, PathTemplate, Specificity, TemplateError,
};
