//! Request dispatch: route resolution, body negotiation and error
//! rendering.

use crate::route::{Handler, HandlerResponse, RequestContext, Route};
use bytes::Bytes;
use http::{Method, StatusCode};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use talaria_convert::{DeserializerRegistry, SerializerRegistry};
use talaria_core::{HttpError, Payload, PayloadKind, ProblemDetail};
use talaria_mime::{AcceptList, MediaType};
use talaria_router::{PathParams, PathTemplate, TemplateError};
use tracing::{debug, warn};

/// Content type assumed when a request carries none.
const DEFAULT_CONTENT_TYPE: &str = "text/plain";

/// Media types the error renderer negotiates among, in producer preference
/// order; anything else falls back to plain text.
const ERROR_MEDIA_TYPES: [&str; 4] = [
    "text/html",
    "application/xhtml+xml",
    "application/json",
    "application/problem+json",
];

/// An incoming request, as handed over by the transport layer: parsed
/// method and path, raw header strings, fully-read body bytes.
#[derive(Debug, Clone)]
pub struct Request {
    /// The request method.
    pub method: Method,
    /// The request path.
    pub path: String,
    /// The raw `Accept` header value, if present.
    pub accept: Option<String>,
    /// The raw `Content-Type` header value, if present.
    pub content_type: Option<String>,
    /// The request body.
    pub body: Bytes,
}

impl Request {
    /// Creates a request with no headers and an empty body.
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            accept: None,
            content_type: None,
            body: Bytes::new(),
        }
    }

    /// Sets the `Accept` header.
    #[must_use]
    pub fn with_accept(mut self, accept: impl Into<String>) -> Self {
        self.accept = Some(accept.into());
        self
    }

    /// Sets the `Content-Type` header.
    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Sets the request body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }
}

/// The dispatcher's outgoing response: status, concrete content type and
/// encoded body.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    /// The response status.
    pub status: StatusCode,
    /// The negotiated content type.
    pub content_type: String,
    /// The encoded body.
    pub body: Bytes,
}

struct CompiledRoute {
    template: PathTemplate,
    method: Method,
    handler: Arc<dyn Handler>,
    request_body: Option<PayloadKind>,
    response_kinds: BTreeMap<u16, PayloadKind>,
}

impl std::fmt::Debug for CompiledRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledRoute")
            .field("template", &self.template)
            .field("method", &self.method)
            .field("handler", &"<handler>")
            .field("request_body", &self.request_body)
            .field("response_kinds", &self.response_kinds)
            .finish()
    }
}

/// The ranked route table, built once at startup.
///
/// Templates are compiled and sorted by [`Specificity`] when the table is
/// built — a literal segment outranks a placeholder segment at the same
/// position regardless of registration order — and are immutable (and
/// freely shareable) afterwards.
///
/// [`Specificity`]: talaria_router::Specificity
pub struct RouteTable {
    routes: Vec<CompiledRoute>,
}

impl RouteTable {
    /// Starts building a route table.
    #[must_use]
    pub fn builder() -> RouteTableBuilder {
        RouteTableBuilder { routes: Vec::new() }
    }

    /// The number of routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns `true` when no routes are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    fn resolve(
        &self,
        method: &Method,
        path: &str,
    ) -> Result<(&CompiledRoute, PathParams), HttpError> {
        let mut allowed: Vec<Method> = Vec::new();
        for route in &self.routes {
            match route.template.match_url(path)? {
                Some(params) if route.method == *method => return Ok((route, params)),
                Some(_) => {
                    if !allowed.contains(&route.method) {
                        allowed.push(route.method.clone());
                    }
                }
                None => {}
            }
        }

        if allowed.is_empty() {
            Err(HttpError::RouteNotFound {
                path: path.to_string(),
            })
        } else {
            Err(HttpError::MethodNotAllowed {
                method: method.clone(),
                path: path.to_string(),
                allowed,
            })
        }
    }
}

/// Builder collecting [`Route`] registrations.
pub struct RouteTableBuilder {
    routes: Vec<Route>,
}

impl RouteTableBuilder {
    /// Adds a route.
    #[must_use]
    pub fn route(mut self, route: Route) -> Self {
        self.routes.push(route);
        self
    }

    /// Compiles every pattern and ranks the table by specificity.
    ///
    /// # Errors
    ///
    /// Fails fast with the offending route's [`TemplateError`] — an unknown
    /// placeholder annotation never reaches request time.
    pub fn build(self) -> Result<RouteTable, TemplateError> {
        let mut routes = Vec::with_capacity(self.routes.len());
        for route in self.routes {
            let (pattern, method, handler, request_body, response_kinds) = route.into_parts();
            routes.push(CompiledRoute {
                template: PathTemplate::compile(&pattern)?,
                method,
                handler,
                request_body,
                response_kinds,
            });
        }
        // Stable sort: registration order breaks specificity ties.
        routes.sort_by(|a, b| b.template.specificity().cmp(&a.template.specificity()));
        Ok(RouteTable { routes })
    }
}

/// Dispatcher configuration.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct DispatcherConfig {
    /// When set, 500-class problem details expose the internal error chain
    /// instead of a generic message.
    pub debug: bool,
}

/// Routes requests to handlers and negotiates both body directions.
///
/// One dispatcher serves the whole process: the route table is immutable
/// after construction, the converter registries handle their own locking,
/// and request handling is synchronous, so `&self` dispatch may run on any
/// number of threads concurrently.
///
/// # Example
///
/// ```rust
/// use http::{Method, StatusCode};
/// use serde_json::json;
/// use talaria::{
///     Dispatcher, HandlerResponse, HttpError, Payload, Request, RequestContext, Route,
///     RouteTable,
/// };
///
/// fn get_user(ctx: RequestContext) -> Result<HandlerResponse, HttpError> {
///     let id = ctx.params.get_int("id").unwrap_or_default();
///     Ok(HandlerResponse::ok(Payload::Structured(json!({ "id": id }))))
/// }
///
/// let table = RouteTable::builder()
///     .route(Route::get("/users/:id<int>", get_user))
///     .build()
///     .unwrap();
/// let dispatcher = Dispatcher::new(table);
///
/// let response = dispatcher.dispatch(
///     Request::new(Method::GET, "/users/42").with_accept("application/json"),
/// );
///
/// assert_eq!(response.status, StatusCode::OK);
/// assert_eq!(response.content_type, "application/json");
/// assert_eq!(&response.body[..], br#"{"id":42}"#);
/// ```
pub struct Dispatcher {
    table: RouteTable,
    deserializers: DeserializerRegistry,
    serializers: SerializerRegistry,
    config: DispatcherConfig,
}

impl Dispatcher {
    /// Creates a dispatcher with the default converter registries.
    #[must_use]
    pub fn new(table: RouteTable) -> Self {
        Self::with_config(table, DispatcherConfig::default())
    }

    /// Creates a dispatcher with explicit configuration.
    #[must_use]
    pub fn with_config(table: RouteTable, config: DispatcherConfig) -> Self {
        Self {
            table,
            deserializers: DeserializerRegistry::with_defaults(),
            serializers: SerializerRegistry::with_defaults(),
            config,
        }
    }

    /// The request-deserializer registry.
    #[must_use]
    pub fn deserializers(&self) -> &DeserializerRegistry {
        &self.deserializers
    }

    /// The response-serializer registry.
    #[must_use]
    pub fn serializers(&self) -> &SerializerRegistry {
        &self.serializers
    }

    /// Handles one request, always producing a response.
    ///
    /// Every failure — match, negotiation, handler — is rendered as a
    /// problem detail negotiated against the same accept list as the
    /// regular response body.
    pub fn dispatch(&self, request: Request) -> Response {
        let accept = match AcceptList::from_header(request.accept.as_deref()) {
            Ok(accept) => accept,
            Err(err) => {
                // The accept header itself is unusable; render for */*.
                return self.error_response(&err.into(), &AcceptList::any(), &request.path);
            }
        };

        match self.try_dispatch(&request, &accept) {
            Ok(response) => response,
            Err(err) => self.error_response(&err, &accept, &request.path),
        }
    }

    fn try_dispatch(
        &self,
        request: &Request,
        accept: &AcceptList,
    ) -> Result<Response, HttpError> {
        let (route, params) = self.table.resolve(&request.method, &request.path)?;
        debug!(
            method = %request.method,
            path = %request.path,
            pattern = route.template.pattern(),
            "matched route"
        );

        let content_type = match request.content_type.as_deref() {
            Some(raw) => Some(MediaType::parse(raw)?),
            None => None,
        };

        let body = match route.request_body {
            Some(target) => {
                let effective = match &content_type {
                    Some(content_type) => content_type.clone(),
                    None => MediaType::parse(DEFAULT_CONTENT_TYPE)?,
                };
                Some(
                    self.deserializers
                        .deserialize(&request.body, &effective, target)?,
                )
            }
            None => None,
        };

        let ctx = RequestContext {
            method: request.method.clone(),
            path: request.path.clone(),
            params,
            body,
            accept: accept.clone(),
            content_type,
        };
        let reply = route.handler.handle(ctx)?;
        self.check_declared_kind(route, &reply);

        let (bytes, content_type) = self.serializers.serialize(&reply.payload, accept)?;
        Ok(Response {
            status: reply.status,
            content_type,
            body: bytes,
        })
    }

    fn check_declared_kind(&self, route: &CompiledRoute, reply: &HandlerResponse) {
        if let Some(declared) = route.response_kinds.get(&reply.status.as_u16()) {
            if *declared != reply.payload.kind() {
                warn!(
                    pattern = route.template.pattern(),
                    status = reply.status.as_u16(),
                    declared = %declared,
                    actual = %reply.payload.kind(),
                    "handler payload kind differs from declared response kind"
                );
            }
        }
    }

    /// Renders an error as a problem detail, negotiated against the same
    /// accept list as a regular response. Never fails: when even the error
    /// payload cannot be negotiated, the plain-text rendering is emitted
    /// directly.
    fn error_response(&self, err: &HttpError, accept: &AcceptList, instance: &str) -> Response {
        let status = err.status_code();
        if status.is_server_error() {
            warn!(error = %err, status = %status, path = instance, "request failed");
        } else {
            debug!(error = %err, status = %status, path = instance, "request failed");
        }

        let problem = err.to_problem(Some(instance), self.config.debug);
        let payload = match accept.best_match(&ERROR_MEDIA_TYPES) {
            Some((candidate, _)) if candidate == "text/html" || candidate == "application/xhtml+xml" => {
                Payload::Text(render_html(&problem))
            }
            Some(_) => Payload::Structured(problem.to_value()),
            None => Payload::Text(render_text(&problem)),
        };

        match self.serializers.serialize(&payload, accept) {
            Ok((body, content_type)) => Response {
                status,
                content_type,
                body,
            },
            Err(render_err) => {
                debug!(error = %render_err, "error payload not negotiable; emitting plain text");
                Response {
                    status,
                    content_type: "text/plain".to_string(),
                    body: Bytes::from(render_text(&problem)),
                }
            }
        }
    }
}

fn render_html(problem: &ProblemDetail) -> String {
    format!(
        "<title>{status} {title}</title>\n<h1>{title}</h1>\n<p>{detail}</p>\n",
        status = problem.status,
        title = problem.title,
        detail = problem.detail,
    )
}

fn render_text(problem: &ProblemDetail) -> String {
    format!(
        "{} {}: {}",
        problem.status, problem.title, problem.detail
    )
}
