//! Error types for sdata-model
//!
//! This module defines all error types used throughout the library.

use std::fmt;
use thiserror::Error;

/// Result type alias using the sdata-model Error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for sdata-model operations
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed input (URI path, query string)
    #[error("format error: {0}")]
    Format(String),

    /// Structural schema violation detected while reading a document
    #[error("structural error: {0}")]
    Structural(#[from] StructuralError),

    /// XML parsing or writing error
    #[error("XML error: {0}")]
    Xml(String),

    /// URL parsing error
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),
}

/// A schema document whose shape cannot be modeled
///
/// Carries the local name of the offending element so the caller can locate
/// the declaration that broke the load.
#[derive(Debug, Clone)]
pub struct StructuralError {
    /// Error message
    pub message: String,
    /// Local name of the offending element or type declaration
    pub element: Option<String>,
}

impl StructuralError {
    /// Create a new structural error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            element: None,
        }
    }

    /// Set the offending element name
    pub fn with_element(mut self, element: impl Into<String>) -> Self {
        self.element = Some(element.into());
        self
    }
}

impl fmt::Display for StructuralError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(ref element) = self.element {
            write!(f, " (element '{}')", element)?;
        }
        Ok(())
    }
}

impl std::error::Error for StructuralError {}
