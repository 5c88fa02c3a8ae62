//! A single parsed media type with quality and parameters.

use indexmap::IndexMap;
use std::fmt;
use thiserror::Error;

/// Charset assumed when a media type carries no `charset` parameter.
pub const DEFAULT_CHARSET: &str = "utf-8";

/// Errors produced while parsing or constructing a [`MediaType`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MediaTypeError {
    /// The `type/subtype` segment does not match the token grammar.
    #[error("malformed media type {input:?}")]
    Parse {
        /// The offending input segment.
        input: String,
    },

    /// A concrete subtype was combined with a wildcard type (`*/html`).
    #[error("wildcard media type with concrete subtype */{subtype}")]
    WildcardHierarchy {
        /// The concrete subtype that was rejected.
        subtype: String,
    },
}

/// One parsed entry of an `Accept` or `Content-Type` header.
///
/// Wildcard components are stored as `None`; quality defaults to `1.0`;
/// parameters keep their declaration order. Instances are immutable after
/// construction.
///
/// # Example
///
/// ```rust
/// use talaria_mime::MediaType;
///
/// let parsed = MediaType::parse("application/signed-exchange;v=b3;q=0.9").unwrap();
/// assert_eq!(parsed.type_name(), Some("application"));
/// assert_eq!(parsed.subtype(), Some("signed-exchange"));
/// assert_eq!(parsed.quality(), 0.9);
/// assert_eq!(parsed.parameter("v"), Some("b3"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct MediaType {
    type_: Option<String>,
    subtype: Option<String>,
    quality: f32,
    parameters: IndexMap<String, String>,
    charset: String,
}

impl MediaType {
    /// Creates a media type from literal components, `"*"` meaning wildcard.
    ///
    /// # Errors
    ///
    /// Returns [`MediaTypeError::WildcardHierarchy`] for a concrete subtype
    /// under a wildcard type, or [`MediaTypeError::Parse`] when a component
    /// is not a valid token.
    pub fn new(type_: &str, subtype: &str) -> Result<Self, MediaTypeError> {
        Self::build(type_, subtype, 1.0, IndexMap::new(), None)
    }

    /// Creates a media type with an explicit quality value.
    ///
    /// The quality is clamped into `[0, 1]` and mirrored into the parameter
    /// map as `q` when it differs from the default.
    pub fn with_quality(type_: &str, subtype: &str, quality: f32) -> Result<Self, MediaTypeError> {
        Self::build(type_, subtype, quality, IndexMap::new(), None)
    }

    /// The full wildcard `*/*`.
    #[must_use]
    pub fn any() -> Self {
        Self {
            type_: None,
            subtype: None,
            quality: 1.0,
            parameters: IndexMap::new(),
            charset: DEFAULT_CHARSET.to_string(),
        }
    }

    /// Parses one comma-separated segment of an `Accept` or `Content-Type`
    /// header, e.g. `application/json; charset=utf-8; q=0.8`.
    ///
    /// Leading and trailing whitespace around the segment is accepted. The
    /// `q` and `charset` parameters are extracted (keys compared
    /// case-insensitively); all parameters stay available in declaration
    /// order via [`parameter`](Self::parameter).
    ///
    /// # Errors
    ///
    /// [`MediaTypeError::Parse`] when the `type/subtype` segment does not
    /// match the grammar `token "/" token`, and
    /// [`MediaTypeError::WildcardHierarchy`] for `*/concrete`.
    pub fn parse(input: &str) -> Result<Self, MediaTypeError> {
        let trimmed = input.trim();
        let (essence, rest) = match trimmed.split_once(';') {
            Some((essence, rest)) => (essence.trim(), Some(rest)),
            None => (trimmed, None),
        };

        let (type_, subtype) = essence.split_once('/').ok_or_else(|| MediaTypeError::Parse {
            input: input.to_string(),
        })?;
        if !is_token(type_) || !is_token(subtype) {
            return Err(MediaTypeError::Parse {
                input: input.to_string(),
            });
        }

        let mut parameters = IndexMap::new();
        if let Some(rest) = rest {
            for segment in rest.split(';') {
                if let Some((key, value)) = segment.split_once('=') {
                    parameters.insert(
                        key.trim().to_ascii_lowercase(),
                        value.trim().to_string(),
                    );
                }
            }
        }

        let quality = match parameters.get("q") {
            Some(raw) => raw.parse::<f32>().map_err(|_| MediaTypeError::Parse {
                input: input.to_string(),
            })?,
            None => 1.0,
        };
        let charset = parameters.get("charset").cloned();

        Self::build(type_, subtype, quality, parameters, charset)
    }

    fn build(
        type_: &str,
        subtype: &str,
        quality: f32,
        mut parameters: IndexMap<String, String>,
        charset: Option<String>,
    ) -> Result<Self, MediaTypeError> {
        let type_ = normalize(type_, MediaTypeError::Parse {
            input: format!("{type_}/{subtype}"),
        })?;
        let subtype = normalize(subtype, MediaTypeError::Parse {
            input: format!("{}/{subtype}", type_.as_deref().unwrap_or("*")),
        })?;

        if type_.is_none() && subtype.is_some() {
            return Err(MediaTypeError::WildcardHierarchy {
                subtype: subtype.unwrap_or_default(),
            });
        }

        let quality = quality.clamp(0.0, 1.0);
        if (quality - 1.0).abs() > f32::EPSILON && !parameters.contains_key("q") {
            parameters.insert("q".to_string(), format!("{quality}"));
        }

        Ok(Self {
            type_,
            subtype,
            quality,
            parameters,
            charset: charset.unwrap_or_else(|| DEFAULT_CHARSET.to_string()),
        })
    }

    /// The type component, `None` meaning wildcard.
    #[must_use]
    pub fn type_name(&self) -> Option<&str> {
        self.type_.as_deref()
    }

    /// The subtype component, `None` meaning wildcard.
    #[must_use]
    pub fn subtype(&self) -> Option<&str> {
        self.subtype.as_deref()
    }

    /// The quality value in `[0, 1]`, default `1.0`.
    #[must_use]
    pub fn quality(&self) -> f32 {
        self.quality
    }

    /// Looks up a parameter by case-insensitive key.
    #[must_use]
    pub fn parameter(&self, key: &str) -> Option<&str> {
        self.parameters
            .get(&key.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// The declared charset, defaulting to [`DEFAULT_CHARSET`].
    #[must_use]
    pub fn charset(&self) -> &str {
        &self.charset
    }

    /// Returns `true` if this media type accepts the candidate
    /// `type/subtype` string.
    ///
    /// A wildcard on either side of either operand matches; comparisons are
    /// case-insensitive. A candidate without a `/` never matches.
    #[must_use]
    pub fn matches(&self, candidate: &str) -> bool {
        let Some((ctype, csubtype)) = candidate.trim().split_once('/') else {
            return false;
        };

        let type_ok = self.type_.is_none()
            || ctype == "*"
            || self
                .type_
                .as_deref()
                .is_some_and(|t| t.eq_ignore_ascii_case(ctype));
        let subtype_ok = self.subtype.is_none()
            || csubtype == "*"
            || self
                .subtype
                .as_deref()
                .is_some_and(|s| s.eq_ignore_ascii_case(csubtype));

        type_ok && subtype_ok
    }

    /// Renders `type/subtype`, optionally followed by `;key=value` pairs in
    /// declaration order.
    #[must_use]
    pub fn render(&self, with_parameters: bool) -> String {
        let mut out = format!(
            "{}/{}",
            self.type_.as_deref().unwrap_or("*"),
            self.subtype.as_deref().unwrap_or("*")
        );
        if with_parameters && !self.parameters.is_empty() {
            for (key, value) in &self.parameters {
                out.push(';');
                out.push_str(key);
                out.push('=');
                out.push_str(value);
            }
        }
        out
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(false))
    }
}

fn normalize(component: &str, error: MediaTypeError) -> Result<Option<String>, MediaTypeError> {
    if component == "*" {
        Ok(None)
    } else if is_token(component) {
        Ok(Some(component.to_ascii_lowercase()))
    } else {
        Err(error)
    }
}

/// HTTP token grammar (RFC 7230 `tchar`), which already covers the
/// `+`/`-`/`_`/`*` characters media subtypes use.
fn is_token(component: &str) -> bool {
    !component.is_empty()
        && component.chars().all(|c| {
            c.is_ascii_alphanumeric()
                || matches!(
                    c,
                    '!' | '#' | '$' | '%' | '&' | '\'' | '*' | '+' | '-' | '.' | '^' | '_' | '`'
                        | '|' | '~'
                )
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_parameters() {
        let mime = MediaType::parse("application/signed-exchange+xml;v=b3;q=0.9").unwrap();

        assert_eq!(mime.type_name(), Some("application"));
        assert_eq!(mime.subtype(), Some("signed-exchange+xml"));
        assert_eq!(mime.quality(), 0.9);
        assert_eq!(mime.parameter("v"), Some("b3"));
    }

    #[test]
    fn test_parse_without_parameters() {
        let mime = MediaType::parse("text/html").unwrap();

        assert_eq!(mime.type_name(), Some("text"));
        assert_eq!(mime.subtype(), Some("html"));
        assert_eq!(mime.quality(), 1.0);
        assert_eq!(mime.parameter("q"), None);
    }

    #[test]
    fn test_parse_full_wildcard() {
        let mime = MediaType::parse("*/*;q=0.8").unwrap();

        assert_eq!(mime.type_name(), None);
        assert_eq!(mime.subtype(), None);
        assert_eq!(mime.quality(), 0.8);
    }

    #[test]
    fn test_wildcard_hierarchy_rejected() {
        let err = MediaType::parse("*/html").unwrap_err();
        assert_eq!(
            err,
            MediaTypeError::WildcardHierarchy {
                subtype: "html".to_string()
            }
        );

        let err = MediaType::new("*", "json").unwrap_err();
        assert!(matches!(err, MediaTypeError::WildcardHierarchy { .. }));
    }

    #[test]
    fn test_parse_failure() {
        assert!(matches!(
            MediaType::parse("can not parse me"),
            Err(MediaTypeError::Parse { .. })
        ));
        assert!(matches!(
            MediaType::parse(""),
            Err(MediaTypeError::Parse { .. })
        ));
    }

    #[test]
    fn test_parse_with_surrounding_whitespace() {
        let mime = MediaType::parse(" image/jpeg").unwrap();
        assert_eq!(mime.type_name(), Some("image"));
    }

    #[test]
    fn test_parse_invalid_quality() {
        assert!(matches!(
            MediaType::parse("text/html;q=high"),
            Err(MediaTypeError::Parse { .. })
        ));
    }

    #[test]
    fn test_matches_wildcard_symmetry() {
        assert!(MediaType::new("text", "html").unwrap().matches("text/html"));
        assert!(MediaType::new("text", "*").unwrap().matches("text/html"));
        assert!(MediaType::new("text", "html").unwrap().matches("text/*"));
        assert!(MediaType::new("*", "*").unwrap().matches("text/*"));

        assert!(!MediaType::new("text", "*").unwrap().matches("application/json"));
    }

    #[test]
    fn test_matches_is_case_insensitive() {
        let mime = MediaType::parse("Text/HTML").unwrap();
        assert!(mime.matches("text/html"));
        assert!(mime.matches("TEXT/HTML"));
    }

    #[test]
    fn test_matches_rejects_malformed_candidate() {
        assert!(!MediaType::any().matches("no-slash-here"));
    }

    #[test]
    fn test_render() {
        let mime = MediaType::with_quality("application", "json", 0.9).unwrap();

        assert_eq!(mime.render(false), "application/json");
        assert_eq!(mime.render(true), "application/json;q=0.9");
        assert_eq!(mime.to_string(), "application/json");
    }

    #[test]
    fn test_render_parameters_keep_declaration_order() {
        let mime = MediaType::parse("application/json;v=b3;q=0.9").unwrap();
        assert_eq!(mime.render(true), "application/json;v=b3;q=0.9");
    }

    #[test]
    fn test_charset_parameter() {
        let mime = MediaType::parse("application/json; charset=utf-8").unwrap();
        assert_eq!(mime.charset(), "utf-8");

        let mime = MediaType::parse("application/json").unwrap();
        assert_eq!(mime.charset(), DEFAULT_CHARSET);
    }

    #[test]
    fn test_equality() {
        assert_eq!(
            MediaType::with_quality("application", "json", 0.9).unwrap(),
            MediaType::with_quality("application", "json", 0.9).unwrap()
        );
        assert_ne!(
            MediaType::new("application", "json").unwrap(),
            MediaType::new("text", "html").unwrap()
        );
    }

    #[test]
    fn test_quality_clamped() {
        let mime = MediaType::with_quality("text", "html", 3.0).unwrap();
        assert_eq!(mime.quality(), 1.0);

        let mime = MediaType::with_quality("text", "html", -1.0).unwrap();
        assert_eq!(mime.quality(), 0.0);
    }
}
