//! Path template compilation, matching and reverse URL generation.

use crate::params::{ParamValue, PathParams};
use regex::Regex;
use std::cmp::Ordering;
use std::fmt;
use std::sync::OnceLock;
use thiserror::Error;

/// Errors raised while compiling a template or generating a URL from it.
///
/// These are programmer errors: they surface at route registration or
/// link-building time, never while serving a request.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// A placeholder carries a type annotation the compiler does not know.
    #[error("unknown path type annotation '{annotation}'")]
    UnknownTypeAnnotation {
        /// The unrecognized annotation text.
        annotation: String,
    },

    /// The same placeholder name appears twice in one pattern.
    #[error("duplicate path parameter '{name}'")]
    DuplicateParameter {
        /// The repeated placeholder name.
        name: String,
    },

    /// `generate_url` was called without a value for a declared placeholder.
    #[error("missing value for path parameter '{name}'")]
    MissingParameter {
        /// The placeholder that had no value.
        name: String,
    },
}

/// A captured path segment could not be converted to its declared type.
///
/// Reported to the caller as a bad-request condition, naming the parameter,
/// its declared type and the raw value.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("path parameter '{name}' of type {declared} does not accept value {value:?}")]
pub struct ParamConversionError {
    /// The placeholder name.
    pub name: String,
    /// The declared placeholder type.
    pub declared: &'static str,
    /// The raw captured text.
    pub value: String,
}

/// Placeholder types recognized in a template pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    /// `str`, `string` or no annotation: any run of non-separator characters.
    Str,
    /// `int` or `integer`: a run of ASCII digits, converted to `i64`.
    Int,
}

impl ParamType {
    fn from_annotation(annotation: Option<&str>) -> Result<Self, TemplateError> {
        match annotation {
            None | Some("str" | "string") => Ok(Self::Str),
            Some("int" | "integer") => Ok(Self::Int),
            Some(other) => Err(TemplateError::UnknownTypeAnnotation {
                annotation: other.to_string(),
            }),
        }
    }

    fn capture_class(self) -> &'static str {
        match self {
            Self::Str => "[^/]+",
            Self::Int => r"\d+",
        }
    }

    fn declared_name(self) -> &'static str {
        match self {
            Self::Str => "str",
            Self::Int => "int",
        }
    }

    fn convert(self, name: &str, raw: &str) -> Result<ParamValue, ParamConversionError> {
        match self {
            Self::Str => Ok(ParamValue::Str(raw.to_string())),
            // The digits-only capture class means the only reachable
            // failure here is an i64 overflow.
            Self::Int => raw
                .parse::<i64>()
                .map(ParamValue::Int)
                .map_err(|_| ParamConversionError {
                    name: name.to_string(),
                    declared: self.declared_name(),
                    value: raw.to_string(),
                }),
        }
    }
}

/// One element of a compiled template.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Literal(String),
    Param { name: String, ty: ParamType },
}

/// Template rank used to order routes: more path segments first, then fewer
/// placeholder segments, so `/orders/api` outranks `/orders/:id`.
///
/// A greater `Specificity` means a more specific template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Specificity {
    segments: usize,
    capture_segments: usize,
}

impl Ord for Specificity {
    fn cmp(&self, other: &Self) -> Ordering {
        self.segments
            .cmp(&other.segments)
            .then_with(|| other.capture_segments.cmp(&self.capture_segments))
    }
}

impl PartialOrd for Specificity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn placeholder_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r":(\w+)(?:<(\w+)>)?").expect("placeholder pattern is a valid regex")
    })
}

/// A compiled route pattern with typed placeholders.
///
/// Compiled once at registration time and immutable afterwards; matching is
/// anchored at both ends of the path (`/a` and `/a/` are distinct).
///
/// # Example
///
/// ```rust
/// use talaria_router::{PathTemplate, TemplateError};
///
/// let template = PathTemplate::compile("/orders/:year<int>/:slug").unwrap();
///
/// let params = template.match_url("/orders/2024/summary").unwrap().unwrap();
/// assert_eq!(params.get_int("year"), Some(2024));
/// assert_eq!(params.get_str("slug"), Some("summary"));
///
/// // Unknown annotations fail compilation, not matching.
/// let err = PathTemplate::compile("/x/:id<bogus>").unwrap_err();
/// assert_eq!(
///     err,
///     TemplateError::UnknownTypeAnnotation { annotation: "bogus".into() }
/// );
/// ```
#[derive(Debug, Clone)]
pub struct PathTemplate {
    pattern: String,
    tokens: Vec<Token>,
    matcher: Regex,
    specificity: Specificity,
}

impl PathTemplate {
    /// Compiles a route pattern.
    ///
    /// Placeholders take the form `:name` or `:name<type>` with the types
    /// `int`/`integer` and `str`/`string` (the default). The anchored
    /// matcher and the specificity rank are both derived from the compiled
    /// token list.
    ///
    /// # Errors
    ///
    /// [`TemplateError::UnknownTypeAnnotation`] for an unrecognized type and
    /// [`TemplateError::DuplicateParameter`] for a repeated placeholder name.
    pub fn compile(pattern: &str) -> Result<Self, TemplateError> {
        let mut tokens = Vec::new();
        let mut names: Vec<&str> = Vec::new();
        let mut last = 0;

        for caps in placeholder_re().captures_iter(pattern) {
            let whole = caps.get(0).expect("capture 0 is the whole match");
            if whole.start() > last {
                tokens.push(Token::Literal(pattern[last..whole.start()].to_string()));
            }

            let name = caps
                .get(1)
                .expect("placeholder always captures a name")
                .as_str();
            let ty = ParamType::from_annotation(caps.get(2).map(|m| m.as_str()))?;
            if names.contains(&name) {
                return Err(TemplateError::DuplicateParameter {
                    name: name.to_string(),
                });
            }
            names.push(name);
            tokens.push(Token::Param {
                name: name.to_string(),
                ty,
            });
            last = whole.end();
        }
        if last < pattern.len() {
            tokens.push(Token::Literal(pattern[last..].to_string()));
        }

        let mut source = String::from("^");
        for token in &tokens {
            match token {
                Token::Literal(literal) => source.push_str(&regex::escape(literal)),
                Token::Param { ty, .. } => {
                    source.push('(');
                    source.push_str(ty.capture_class());
                    source.push(')');
                }
            }
        }
        source.push('$');
        let matcher =
            Regex::new(&source).expect("matcher derived from escaped tokens is a valid regex");

        let specificity = Self::rank(pattern);

        Ok(Self {
            pattern: pattern.to_string(),
            tokens,
            matcher,
            specificity,
        })
    }

    fn rank(pattern: &str) -> Specificity {
        let segments: Vec<&str> = pattern.split('/').filter(|s| !s.is_empty()).collect();
        let capture_segments = segments
            .iter()
            .filter(|segment| placeholder_re().is_match(segment))
            .count();
        Specificity {
            segments: segments.len(),
            capture_segments,
        }
    }

    /// The original route pattern.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// The template's rank for route ordering, computed at compile time.
    #[must_use]
    pub fn specificity(&self) -> Specificity {
        self.specificity
    }

    /// The declared placeholder names, in pattern order.
    pub fn parameter_names(&self) -> impl Iterator<Item = &str> {
        self.parameter_types().map(|(name, _)| name)
    }

    /// The declared placeholders and their types, in pattern order.
    pub fn parameter_types(&self) -> impl Iterator<Item = (&str, ParamType)> {
        self.tokens.iter().filter_map(|token| match token {
            Token::Param { name, ty } => Some((name.as_str(), *ty)),
            Token::Literal(_) => None,
        })
    }

    /// Attempts an anchored match against a URL path.
    ///
    /// Returns `Ok(None)` when the path does not match at all, and
    /// `Ok(Some(params))` with each capture converted through its declared
    /// type on success.
    ///
    /// # Errors
    ///
    /// [`ParamConversionError`] when a captured segment cannot be converted
    /// to its declared type; callers surface this as a bad request.
    pub fn match_url(&self, url: &str) -> Result<Option<PathParams>, ParamConversionError> {
        let Some(caps) = self.matcher.captures(url) else {
            return Ok(None);
        };

        let mut params = PathParams::new();
        let mut group = 1;
        for token in &self.tokens {
            if let Token::Param { name, ty } = token {
                let raw = caps
                    .get(group)
                    .expect("each parameter token owns one capture group")
                    .as_str();
                params.push(name.clone(), ty.convert(name, raw)?);
                group += 1;
            }
        }
        Ok(Some(params))
    }

    /// Builds a concrete URL by substituting placeholder values.
    ///
    /// Values are looked up by placeholder name and rendered with
    /// [`fmt::Display`].
    ///
    /// # Errors
    ///
    /// [`TemplateError::MissingParameter`] when a declared placeholder has
    /// no value. This is a programmer error (e.g. building a hyperlink),
    /// never a request-time condition.
    pub fn generate_url(
        &self,
        values: &[(&str, &dyn fmt::Display)],
    ) -> Result<String, TemplateError> {
        let mut url = String::new();
        for token in &self.tokens {
            match token {
                Token::Literal(literal) => url.push_str(literal),
                Token::Param { name, .. } => {
                    let (_, value) = values
                        .iter()
                        .find(|(n, _)| n == name)
                        .ok_or_else(|| TemplateError::MissingParameter { name: name.clone() })?;
                    url.push_str(&value.to_string());
                }
            }
        }
        Ok(url)
    }

    /// Joins a base (e.g. `https://host`) and a generated path into a full
    /// hyperlink.
    ///
    /// # Errors
    ///
    /// Propagates [`TemplateError::MissingParameter`] from URL generation.
    pub fn href(
        &self,
        base: &str,
        values: &[(&str, &dyn fmt::Display)],
    ) -> Result<String, TemplateError> {
        let path = self.generate_url(values)?;
        Ok(format!(
            "{}/{}",
            base.trim_end_matches('/'),
            path.trim_start_matches('/')
        ))
    }
}
