//! Error types for relq

use crate::dialect::{Dialect, Feature};
use thiserror::Error;

/// Result type alias for relq operations
pub type QueryResult<T> = Result<T, QueryError>;

/// Errors raised while constructing or rendering a query
#[derive(Debug, Error)]
pub enum QueryError {
    /// The active dialect has no way to express the requested feature
    #[error("{feature} is not supported by the {dialect} backend")]
    Unsupported { feature: Feature, dialect: Dialect },

    /// A predicate's `?` markers do not line up with its bound values
    #[error("placeholder mismatch in `{clause}`: {markers} marker(s), {values} value(s)")]
    PlaceholderMismatch {
        clause: String,
        markers: usize,
        values: usize,
    },

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl QueryError {
    /// Create a backend-capability error
    pub fn unsupported(feature: Feature, dialect: Dialect) -> Self {
        Self::Unsupported { feature, dialect }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Check if this is a backend-capability error
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported { .. })
    }

    /// Check if this is a placeholder mismatch
    pub fn is_placeholder_mismatch(&self) -> bool {
        matches!(self, Self::PlaceholderMismatch { .. })
    }
}

impl From<toml::de::Error> for QueryError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}
