//! Notation ordering: comparison of classification codes.
//!
//! Three encodings are supported (see [`NotationFormat`]). Parsing is separate
//! from comparison so that a malformed value is reported once, as a
//! [`NotationError`], before any sibling set is touched.

use std::cmp::Ordering;

use miette::Diagnostic;
use thiserror::Error;

use crate::config::NotationFormat;

/// A notation value that could not be read in the configured format.
#[derive(Debug, Clone, PartialEq, Error, Diagnostic)]
pub enum NotationError {
    #[error("notation \"{notation}\" of {iri} is not dotted-numeric (bad segment \"{segment}\")")]
    #[diagnostic(
        code(skos::notation::dotted),
        help(
            "Dotted notations are dot-separated non-negative integers such as \"2.10.3\". \
             Fix the notation or switch the notation format to alpha; sorting by \
             notation has been disabled for this view."
        )
    )]
    MalformedDotted {
        notation: String,
        iri: String,
        segment: String,
    },

    #[error("notation \"{notation}\" of {iri} is not a finite number")]
    #[diagnostic(
        code(skos::notation::float),
        help(
            "Float notations must parse as finite decimal numbers such as \"3.25\". \
             Fix the notation or switch the notation format to alpha; sorting by \
             notation has been disabled for this view."
        )
    )]
    MalformedFloat { notation: String, iri: String },
}

impl NotationError {
    /// One-paragraph explanation for end users.
    pub fn explanation(&self) -> String {
        match self {
            NotationError::MalformedDotted { notation, iri, .. } => format!(
                "Sorting by notation is unavailable: \"{notation}\" on {iri} is not a \
                 dotted number like 1.2.3."
            ),
            NotationError::MalformedFloat { notation, iri } => format!(
                "Sorting by notation is unavailable: \"{notation}\" on {iri} is not a number."
            ),
        }
    }
}

/// A parsed, comparable notation.
#[derive(Debug, Clone, PartialEq)]
pub enum NotationKey {
    Alpha(String),
    Dotted(Vec<u64>),
    Float(f64),
}

impl NotationFormat {
    /// Parse `raw` (found on the resource `iri`) into a comparable key.
    pub fn parse(self, raw: &str, iri: &str) -> Result<NotationKey, NotationError> {
        match self {
            NotationFormat::Alpha => Ok(NotationKey::Alpha(raw.to_lowercase())),
            NotationFormat::Dotted => {
                let mut segments = Vec::new();
                for segment in raw.trim().split('.') {
                    let value = segment.parse::<u64>().map_err(|_| {
                        NotationError::MalformedDotted {
                            notation: raw.to_string(),
                            iri: iri.to_string(),
                            segment: segment.to_string(),
                        }
                    })?;
                    segments.push(value);
                }
                Ok(NotationKey::Dotted(segments))
            }
            NotationFormat::Float => match raw.trim().parse::<f64>() {
                Ok(value) if value.is_finite() => Ok(NotationKey::Float(value)),
                _ => Err(NotationError::MalformedFloat {
                    notation: raw.to_string(),
                    iri: iri.to_string(),
                }),
            },
        }
    }

    /// Compare two raw notations. Convenience for one-off comparisons.
    pub fn compare(self, a: &str, b: &str) -> Result<Ordering, NotationError> {
        Ok(self.parse(a, "")?.cmp(&self.parse(b, "")?))
    }
}

fn compare_dotted(a: &[u64], b: &[u64]) -> Ordering {
    let len = a.len().max(b.len());
    for i in 0..len {
        let x = a.get(i).copied().unwrap_or(0);
        let y = b.get(i).copied().unwrap_or(0);
        match x.cmp(&y) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    Ordering::Equal
}

impl NotationKey {
    fn rank(&self) -> u8 {
        match self {
            NotationKey::Alpha(_) => 0,
            NotationKey::Dotted(_) => 1,
            NotationKey::Float(_) => 2,
        }
    }
}

impl Eq for NotationKey {}

impl PartialOrd for NotationKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for NotationKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (NotationKey::Alpha(a), NotationKey::Alpha(b)) => a.cmp(b),
            (NotationKey::Dotted(a), NotationKey::Dotted(b)) => compare_dotted(a, b),
            (NotationKey::Float(a), NotationKey::Float(b)) => a.total_cmp(b),
            // Keys of one sort run always share a format.
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

/// Compare optional keys: present notations first, absent ones last.
pub fn compare_optional(a: Option<&NotationKey>, b: Option<&NotationKey>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.cmp(y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
