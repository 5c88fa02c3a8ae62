//! Request-time error kinds and the RFC 7807 problem-detail shape.
//!
//! Every failure the runtime can produce while serving a request is a
//! distinct [`HttpError`] variant with its own status-code mapping; the
//! dispatcher is the single place that renders them. Startup-time template
//! errors ([`talaria_router::TemplateError`]) are deliberately *not* part of
//! this enum — they are programmer errors surfaced when the route table is
//! built, not per-request conditions.

use crate::payload::PayloadKind;
use http::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use talaria_mime::MediaTypeError;
use talaria_router::ParamConversionError;
use thiserror::Error;

/// Errors raised while handling a single request.
///
/// Parsing and matching failures are returned as values to the dispatcher,
/// never logged and swallowed; the dispatcher maps each kind to a status
/// code and a [`ProblemDetail`].
#[derive(Debug, Error)]
pub enum HttpError {
    /// A malformed `Accept` or `Content-Type` header.
    #[error(transparent)]
    MediaType(#[from] MediaTypeError),

    /// A captured path segment could not be converted to its declared type.
    #[error(transparent)]
    PathParameter(#[from] ParamConversionError),

    /// No route template matches the request path.
    #[error("no route matches path {path:?}")]
    RouteNotFound {
        /// The request path.
        path: String,
    },

    /// A route matches the path, but not the request method.
    #[error("method {method} is not allowed for {path:?}")]
    MethodNotAllowed {
        /// The request method.
        method: Method,
        /// The request path.
        path: String,
        /// Methods the matched routes do accept.
        allowed: Vec<Method>,
    },

    /// No request deserializer declares support for the request's content
    /// type.
    #[error("no deserializer accepts content type {content_type:?}")]
    UnsupportedMediaType {
        /// The request's content type.
        content_type: String,
    },

    /// The content type is handled, but no converter exists for the
    /// requested or produced value kind. A missing registration, not a
    /// client mistake.
    #[error("no converter registered for {kind} values")]
    NoConverterForType {
        /// The unhandled value kind.
        kind: PayloadKind,
    },

    /// No response serializer's declared content types intersect the
    /// client's accept list.
    #[error("no acceptable representation for {accept:?}")]
    NotAcceptable {
        /// The rendered accept list.
        accept: String,
    },

    /// A handler-raised error with an explicit status code.
    #[error("{detail}")]
    Custom {
        /// The response status.
        status: StatusCode,
        /// Human-readable description.
        detail: String,
    },

    /// An unexpected internal failure.
    #[error("internal error: {message}")]
    Internal {
        /// Human-readable description.
        message: String,
        /// The underlying error, not exposed to clients unless debug
        /// rendering is enabled.
        #[source]
        source: Option<anyhow::Error>,
    },
}

impl HttpError {
    /// Creates a 400 Bad Request error.
    #[must_use]
    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::Custom {
            status: StatusCode::BAD_REQUEST,
            detail: detail.into(),
        }
    }

    /// Creates an error with an arbitrary status code.
    #[must_use]
    pub fn with_status(status: StatusCode, detail: impl Into<String>) -> Self {
        Self::Custom {
            status,
            detail: detail.into(),
        }
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an internal error wrapping an underlying cause.
    pub fn internal_with_source(
        message: impl Into<String>,
        source: impl Into<anyhow::Error>,
    ) -> Self {
        Self::Internal {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// The HTTP status code this error maps to.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MediaType(_) | Self::PathParameter(_) => StatusCode::BAD_REQUEST,
            Self::RouteNotFound { .. } => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            Self::UnsupportedMediaType { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::NotAcceptable { .. } => StatusCode::NOT_ACCEPTABLE,
            Self::NoConverterForType { .. } | Self::Internal { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Custom { status, .. } => *status,
        }
    }

    /// Renders this error as an RFC 7807 problem detail.
    ///
    /// `instance` identifies the specific occurrence (the dispatcher passes
    /// the request path). With `debug` unset, 500-class details hide the
    /// internal message behind a generic line; with it set, the full error
    /// chain is included.
    #[must_use]
    pub fn to_problem(&self, instance: Option<&str>, debug: bool) -> ProblemDetail {
        let status = self.status_code();
        let detail = match self {
            Self::Internal { message, source } => {
                if debug {
                    match source {
                        Some(source) => format!("{message}: {source:#}"),
                        None => message.clone(),
                    }
                } else {
                    "An unexpected error occurred.".to_string()
                }
            }
            other => other.to_string(),
        };

        ProblemDetail {
            type_uri: format!(
                "https://developer.mozilla.org/docs/Web/HTTP/Status/{}",
                status.as_u16()
            ),
            title: status
                .canonical_reason()
                .unwrap_or("Unknown Error")
                .to_string(),
            status: status.as_u16(),
            detail,
            instance: instance.map(ToString::to_string),
        }
    }
}

/// The RFC 7807 problem-detail payload.
///
/// This is the canonical error shape the runtime produces for every
/// [`HttpError`] kind; an external HTML/JSON renderer consumes it.
/// `instance` serializes as `null` when absent rather than being omitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemDetail {
    /// A URI identifying the problem type.
    #[serde(rename = "type")]
    pub type_uri: String,
    /// Short human-readable summary (the status line reason).
    pub title: String,
    /// The HTTP status code.
    pub status: u16,
    /// Human-readable explanation of this occurrence.
    pub detail: String,
    /// URI identifying this specific occurrence, if known.
    pub instance: Option<String>,
}

impl ProblemDetail {
    /// The problem detail as a JSON value.
    #[must_use]
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::json!({
            "type": self.type_uri,
            "title": self.title,
            "status": self.status,
            "detail": self.detail,
            "instance": self.instance,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_code_mapping() {
        assert_eq!(
            HttpError::RouteNotFound { path: "/x".into() }.status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            HttpError::UnsupportedMediaType {
                content_type: "application/msgpack".into()
            }
            .status_code(),
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        );
        assert_eq!(
            HttpError::NotAcceptable {
                accept: "application/xml".into()
            }
            .status_code(),
            StatusCode::NOT_ACCEPTABLE
        );
        assert_eq!(
            HttpError::NoConverterForType {
                kind: PayloadKind::Binary
            }
            .status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            HttpError::bad_request("nope").status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_media_type_error_is_client_error() {
        let err = HttpError::from(MediaTypeError::Parse {
            input: "bogus".into(),
        });
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_method_not_allowed() {
        let err = HttpError::MethodNotAllowed {
            method: Method::DELETE,
            path: "/users".into(),
            allowed: vec![Method::GET, Method::POST],
        };
        assert_eq!(err.status_code(), StatusCode::METHOD_NOT_ALLOWED);
        assert!(err.to_string().contains("DELETE"));
    }

    #[test]
    fn test_problem_detail_shape() {
        let err = HttpError::RouteNotFound {
            path: "/missing".into(),
        };
        let problem = err.to_problem(Some("/missing"), false);

        assert_eq!(problem.status, 404);
        assert_eq!(problem.title, "Not Found");
        assert!(problem.type_uri.ends_with("/404"));
        assert_eq!(problem.instance.as_deref(), Some("/missing"));
        assert!(problem.detail.contains("/missing"));
    }

    #[test]
    fn test_problem_detail_serializes_null_instance() {
        let problem = HttpError::bad_request("bad").to_problem(None, false);

        let json = serde_json::to_string(&problem).unwrap();
        assert!(json.contains("\"instance\":null"));
        assert!(json.contains("\"type\":"));
    }

    #[test]
    fn test_internal_detail_hidden_without_debug() {
        let err = HttpError::internal("database exploded");

        let hidden = err.to_problem(None, false);
        assert_eq!(hidden.detail, "An unexpected error occurred.");

        let shown = err.to_problem(None, true);
        assert!(shown.detail.contains("database exploded"));
    }

    #[test]
    fn test_internal_debug_includes_source_chain() {
        let err = HttpError::internal_with_source(
            "loading config",
            anyhow::anyhow!("file not found"),
        );
        let problem = err.to_problem(None, true);
        assert!(problem.detail.contains("loading config"));
        assert!(problem.detail.contains("file not found"));
    }

    #[test]
    fn test_conversion_error_message_names_parameter() {
        let err = HttpError::from(ParamConversionError {
            name: "id".into(),
            declared: "int",
            value: "abc".into(),
        });
        let problem = err.to_problem(None, false);
        assert!(problem.detail.contains("id"));
        assert!(problem.detail.contains("int"));
        assert!(problem.detail.contains("abc"));
    }
}
