//! SData URI path segments and the path-segment parser
//!
//! SData paths are `/`-separated segments where each segment may carry a
//! parenthesized predicate, e.g. `accounts('A001')`. Predicates may contain
//! nested parentheses and single-quoted literals; parentheses inside a quoted
//! literal are plain characters and never affect nesting.

use crate::error::{Error, Result};
use std::fmt;

/// One parsed path segment: a name plus an optional predicate
///
/// The predicate is stored without its delimiting parentheses, exactly as it
/// appeared between them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UriPathSegment {
    text: String,
    predicate: Option<String>,
}

impl UriPathSegment {
    /// Create a segment with no predicate
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            predicate: None,
        }
    }

    /// Create a segment with a predicate
    pub fn with_predicate(text: impl Into<String>, predicate: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            predicate: Some(predicate.into()),
        }
    }

    /// The segment name
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The predicate, without its delimiting parentheses
    pub fn predicate(&self) -> Option<&str> {
        self.predicate.as_deref()
    }

    /// Whether this segment carries a predicate
    pub fn has_predicate(&self) -> bool {
        self.predicate.is_some()
    }
}

impl fmt::Display for UriPathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.predicate {
            Some(predicate) => write!(f, "{}({})", self.text, predicate),
            None => write!(f, "{}", self.text),
        }
    }
}

/// Parse an SData path string into its ordered segments
///
/// Empty segments produced by leading, trailing, or doubled slashes are
/// skipped, so `""`, `"/"`, and `"-"` are all legal inputs (the first two
/// yield zero segments).
pub fn parse_path(path: &str) -> Result<Vec<UriPathSegment>> {
    let mut segments = Vec::new();
    let mut name = String::new();
    let mut chars = path.chars();

    let mut commit = |name: &mut String, predicate: Option<String>| {
        if !name.is_empty() || predicate.is_some() {
            segments.push(UriPathSegment {
                text: std::mem::take(name),
                predicate,
            });
        }
    };

    while let Some(c) = chars.next() {
        match c {
            '/' => commit(&mut name, None),
            '(' => {
                // Predicate scan: track nesting depth, but a single-quoted
                // literal suppresses paren counting entirely.
                let mut predicate = String::new();
                let mut depth = 1usize;
                let mut in_literal = false;
                loop {
                    match chars.next() {
                        Some('\'') => {
                            in_literal = !in_literal;
                            predicate.push('\'');
                        }
                        Some('(') => {
                            if !in_literal {
                                depth += 1;
                            }
                            predicate.push('(');
                        }
                        Some(')') => {
                            if in_literal {
                                predicate.push(')');
                            } else {
                                depth -= 1;
                                if depth == 0 {
                                    break;
                                }
                                predicate.push(')');
                            }
                        }
                        Some(other) => predicate.push(other),
                        None => {
                            return Err(Error::Format(format!(
                                "unbalanced parentheses in path segment '{}('",
                                name
                            )))
                        }
                    }
                }
                commit(&mut name, Some(predicate));
                // A predicate terminates its segment; the only thing allowed
                // before the next segment is a slash.
                match chars.next() {
                    None => {}
                    Some('/') => {}
                    Some(other) => {
                        return Err(Error::Format(format!(
                            "unexpected character '{}' after predicate in path '{}'",
                            other, path
                        )))
                    }
                }
            }
            ')' => {
                return Err(Error::Format(format!(
                    "unbalanced parentheses in path '{}'",
                    path
                )))
            }
            other => name.push(other),
        }
    }
    commit(&mut name, None);

    Ok(segments)
}

/// Render segments back into a path string
pub fn format_path(segments: &[UriPathSegment]) -> String {
    segments
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>()
        .join("/")
}
