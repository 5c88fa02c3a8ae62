//! Route registration and the handler seam.
//!
//! Routes are explicit registration structs: pattern, method, handler and
//! the optional body/response declarations the dispatcher consumes. All
//! metadata is assembled once at startup; nothing is attached to handler
//! functions dynamically.

use http::{Method, StatusCode};
use std::collections::BTreeMap;
use std::sync::Arc;
use talaria_core::{HttpError, Payload, PayloadKind};
use talaria_mime::{AcceptList, MediaType};
use talaria_router::PathParams;

/// A request handler.
///
/// Handling is synchronous: the core has no internal suspension points, and
/// the host may invoke the dispatcher from many threads, so handlers must
/// be `Send + Sync`. Any `Fn(RequestContext) -> Result<HandlerResponse,
/// HttpError>` is a handler.
pub trait Handler: Send + Sync {
    /// Handles one request.
    ///
    /// # Errors
    ///
    /// Returns an [`HttpError`] that the dispatcher renders as a problem
    /// detail.
    fn handle(&self, ctx: RequestContext) -> Result<HandlerResponse, HttpError>;
}

impl<F> Handler for F
where
    F: Fn(RequestContext) -> Result<HandlerResponse, HttpError> + Send + Sync,
{
    fn handle(&self, ctx: RequestContext) -> Result<HandlerResponse, HttpError> {
        self(ctx)
    }
}

/// Everything a handler receives about the request.
///
/// All fields are request-scoped values; the context is consumed by the
/// handler invocation.
#[derive(Debug)]
pub struct RequestContext {
    /// The request method.
    pub method: Method,
    /// The request path.
    pub path: String,
    /// Typed path parameters extracted by the matched template.
    pub params: PathParams,
    /// The decoded request body, present when the route declares one.
    pub body: Option<Payload>,
    /// The client's parsed accept list.
    pub accept: AcceptList,
    /// The parsed `Content-Type` header, when the request carried one.
    pub content_type: Option<MediaType>,
}

/// A handler's result before response-body negotiation.
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerResponse {
    /// The response status.
    pub status: StatusCode,
    /// The value the response registry will encode.
    pub payload: Payload,
}

impl HandlerResponse {
    /// A 200 OK response.
    #[must_use]
    pub fn ok(payload: impl Into<Payload>) -> Self {
        Self {
            status: StatusCode::OK,
            payload: payload.into(),
        }
    }

    /// A 201 Created response.
    #[must_use]
    pub fn created(payload: impl Into<Payload>) -> Self {
        Self {
            status: StatusCode::CREATED,
            payload: payload.into(),
        }
    }

    /// A response with an explicit status.
    #[must_use]
    pub fn with_status(status: StatusCode, payload: impl Into<Payload>) -> Self {
        Self {
            status,
            payload: payload.into(),
        }
    }
}

/// One route registration: pattern, method, handler and declarations.
///
/// # Example
///
/// ```rust
/// use talaria::{HandlerResponse, HttpError, PayloadKind, RequestContext, Route};
///
/// fn echo(ctx: RequestContext) -> Result<HandlerResponse, HttpError> {
///     let body = ctx.body.expect("route declares a body");
///     Ok(HandlerResponse::ok(body))
/// }
///
/// let route = Route::post("/echo", echo).with_request_body(PayloadKind::Structured);
/// assert_eq!(route.pattern(), "/echo");
/// ```
pub struct Route {
    pattern: String,
    method: Method,
    handler: Arc<dyn Handler>,
    request_body: Option<PayloadKind>,
    response_kinds: BTreeMap<u16, PayloadKind>,
}

impl Route {
    /// Creates a route for an arbitrary method.
    #[must_use]
    pub fn new(method: Method, pattern: impl Into<String>, handler: impl Handler + 'static) -> Self {
        Self {
            pattern: pattern.into(),
            method,
            handler: Arc::new(handler),
            request_body: None,
            response_kinds: BTreeMap::new(),
        }
    }

    /// Creates a GET route.
    #[must_use]
    pub fn get(pattern: impl Into<String>, handler: impl Handler + 'static) -> Self {
        Self::new(Method::GET, pattern, handler)
    }

    /// Creates a POST route.
    #[must_use]
    pub fn post(pattern: impl Into<String>, handler: impl Handler + 'static) -> Self {
        Self::new(Method::POST, pattern, handler)
    }

    /// Creates a PUT route.
    #[must_use]
    pub fn put(pattern: impl Into<String>, handler: impl Handler + 'static) -> Self {
        Self::new(Method::PUT, pattern, handler)
    }

    /// Creates a DELETE route.
    #[must_use]
    pub fn delete(pattern: impl Into<String>, handler: impl Handler + 'static) -> Self {
        Self::new(Method::DELETE, pattern, handler)
    }

    /// Declares that requests carry a body of the given kind; the
    /// dispatcher deserializes it before invoking the handler.
    #[must_use]
    pub fn with_request_body(mut self, kind: PayloadKind) -> Self {
        self.request_body = Some(kind);
        self
    }

    /// Declares the payload kind a given response status produces. The
    /// dispatcher checks the handler's actual payload against this and
    /// logs a warning on mismatch.
    #[must_use]
    pub fn with_response_kind(mut self, status: u16, kind: PayloadKind) -> Self {
        self.response_kinds.insert(status, kind);
        self
    }

    /// The route pattern.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// The route method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    pub(crate) fn into_parts(
        self,
    ) -> (
        String,
        Method,
        Arc<dyn Handler>,
        Option<PayloadKind>,
        BTreeMap<u16, PayloadKind>,
    ) {
        (
            self.pattern,
            self.method,
            self.handler,
            self.request_body,
            self.response_kinds,
        )
    }
}

impl std::fmt::Debug for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route")
            .field("pattern", &self.pattern)
            .field("method", &self.method)
            .field("request_body", &self.request_body)
            .field("response_kinds", &self.response_kinds)
            .finish_non_exhaustive()
    }
}
