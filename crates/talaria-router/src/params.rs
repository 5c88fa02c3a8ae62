//! Typed path parameter storage.
//!
//! Extracted parameters are stored as ordered (name, value) pairs with a
//! small-vector optimization, since routes rarely declare more than a
//! handful of placeholders.

use smallvec::SmallVec;
use std::fmt;

/// Parameters stored inline before spilling to the heap.
const INLINE_PARAMS: usize = 4;

/// A path parameter value, converted according to the placeholder's
/// declared type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    /// Untyped (or explicitly `str`/`string`) placeholder value.
    Str(String),
    /// `int`/`integer` placeholder value.
    Int(i64),
}

impl ParamValue {
    /// The string value, if this parameter was captured as a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(value) => Some(value),
            Self::Int(_) => None,
        }
    }

    /// The integer value, if this parameter was captured as an integer.
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            Self::Str(_) => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(value) => f.write_str(value),
            Self::Int(value) => write!(f, "{value}"),
        }
    }
}

/// Typed path parameters extracted from a template match.
///
/// # Example
///
/// ```rust
/// use talaria_router::{ParamValue, PathParams};
///
/// let mut params = PathParams::new();
/// params.push("year", ParamValue::Int(2024));
/// params.push("slug", ParamValue::Str("summary".into()));
///
/// assert_eq!(params.get_int("year"), Some(2024));
/// assert_eq!(params.get_str("slug"), Some("summary"));
/// assert_eq!(params.get("missing"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PathParams {
    inner: SmallVec<[(String, ParamValue); INLINE_PARAMS]>,
}

impl PathParams {
    /// Creates an empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a parameter.
    pub fn push(&mut self, name: impl Into<String>, value: ParamValue) {
        self.inner.push((name.into(), value));
    }

    /// Returns the value for a parameter by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.inner
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Returns a string parameter by name.
    #[must_use]
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(ParamValue::as_str)
    }

    /// Returns an integer parameter by name.
    #[must_use]
    pub fn get_int(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(ParamValue::as_int)
    }

    /// Returns `true` if there are no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns the number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Iterates the parameters in extraction order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.inner.iter().map(|(n, v)| (n.as_str(), v))
    }
}

impl FromIterator<(String, ParamValue)> for PathParams {
    fn from_iter<I: IntoIterator<Item = (String, ParamValue)>>(iter: I) -> Self {
        Self {
            inner: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_get() {
        let mut params = PathParams::new();
        params.push("id", ParamValue::Int(42));
        params.push("name", ParamValue::Str("alice".into()));

        assert_eq!(params.get_int("id"), Some(42));
        assert_eq!(params.get_str("name"), Some("alice"));
        assert_eq!(params.get("unknown"), None);
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_typed_getters_do_not_coerce() {
        let mut params = PathParams::new();
        params.push("id", ParamValue::Str("42".into()));

        assert_eq!(params.get_int("id"), None);
        assert_eq!(params.get_str("id"), Some("42"));
    }

    #[test]
    fn test_display() {
        assert_eq!(ParamValue::Int(7).to_string(), "7");
        assert_eq!(ParamValue::Str("x".into()).to_string(), "x");
    }

    #[test]
    fn test_iter_preserves_order() {
        let mut params = PathParams::new();
        params.push("a", ParamValue::Int(1));
        params.push("b", ParamValue::Int(2));

        let names: Vec<_> = params.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_spills_past_inline_capacity() {
        let mut params = PathParams::new();
        for i in 0..10 {
            params.push(format!("key{i}"), ParamValue::Int(i));
        }

        assert_eq!(params.len(), 10);
        assert_eq!(params.get_int("key7"), Some(7));
    }
}
