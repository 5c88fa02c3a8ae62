//! The client's ranked list of acceptable media types.

use crate::media_type::{MediaType, MediaTypeError};
use std::cmp::Ordering;
use std::fmt;

/// An ordered collection of [`MediaType`] entries built from an `Accept`
/// header, sorted by descending quality.
///
/// The sort is stable: entries with equal quality keep their header order.
/// An absent or empty header is treated as `*/*`.
///
/// # Example
///
/// ```rust
/// use talaria_mime::AcceptList;
///
/// let accept = AcceptList::parse("application/json;q=0.8, application/xml;q=0.9").unwrap();
/// let (candidate, entry) = accept
///     .best_match(&["application/json", "application/xml"])
///     .unwrap();
///
/// assert_eq!(candidate, "application/xml");
/// assert_eq!(entry.quality(), 0.9);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct AcceptList {
    entries: Vec<MediaType>,
}

impl AcceptList {
    /// Parses a raw `Accept` header value.
    ///
    /// Splits on commas and parses each segment as a [`MediaType`]; a
    /// malformed segment fails the whole header. Empty header text yields
    /// the single entry `*/*`.
    ///
    /// # Errors
    ///
    /// Propagates the [`MediaTypeError`] of the first malformed segment.
    pub fn parse(header: &str) -> Result<Self, MediaTypeError> {
        if header.trim().is_empty() {
            return Ok(Self::any());
        }

        let mut entries = header
            .split(',')
            .map(MediaType::parse)
            .collect::<Result<Vec<_>, _>>()?;
        // Stable sort: equal qualities keep their header order.
        entries.sort_by(|a, b| {
            b.quality()
                .partial_cmp(&a.quality())
                .unwrap_or(Ordering::Equal)
        });

        Ok(Self { entries })
    }

    /// Builds an accept list from an optional header value, defaulting to
    /// `*/*` when the header is absent.
    ///
    /// # Errors
    ///
    /// Propagates the [`MediaTypeError`] of the first malformed segment.
    pub fn from_header(header: Option<&str>) -> Result<Self, MediaTypeError> {
        match header {
            Some(header) => Self::parse(header),
            None => Ok(Self::any()),
        }
    }

    /// The accept-anything list, a single `*/*` entry.
    #[must_use]
    pub fn any() -> Self {
        Self {
            entries: vec![MediaType::any()],
        }
    }

    /// The entries in descending quality order.
    #[must_use]
    pub fn entries(&self) -> &[MediaType] {
        &self.entries
    }

    /// Finds the best pairing of an accept entry and a producer candidate.
    ///
    /// Iterates the accept entries in quality order (best first) and, for
    /// each entry, the candidates in the order supplied by the caller. The
    /// first matching pair wins: client preference dominates, and within one
    /// preference tier the producer's candidate order is the tie-break.
    ///
    /// Returns `None` when no combination matches, which callers must treat
    /// as "not acceptable".
    #[must_use]
    pub fn best_match<'c>(&self, candidates: &[&'c str]) -> Option<(&'c str, &MediaType)> {
        for entry in &self.entries {
            for candidate in candidates {
                if entry.matches(candidate) {
                    return Some((candidate, entry));
                }
            }
        }
        None
    }
}

impl fmt::Display for AcceptList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, entry) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(&entry.render(true))?;
        }
        Ok(())
    }
}
