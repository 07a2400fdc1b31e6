//! Error types for the legisearch library.
//!
//! Every fallible operation in the crate returns [`Result`], whose error side is
//! [`LegisearchError`]. Presentation layers use
//! [`LegisearchError::is_recoverable`] to tell a request that should be
//! re-prompted apart from one that failed on the server side.

use std::error::Error as StdError;

use thiserror::Error;

/// Boxed error used as the attached cause of model and search failures.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, LegisearchError>;

/// The main error type for legisearch operations.
#[derive(Error, Debug)]
pub enum LegisearchError {
    /// Empty or blank query/text, or an out-of-domain parameter.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The embedding model failed to load or to run inference.
    #[error("Model error: {message}")]
    Model {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// Candidate retrieval or statistics failed in the document store.
    #[error("Search error: {message}")]
    Search {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// The model produced a vector of the wrong length.
    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Document store failures (missing documents, rejected writes, snapshots).
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl LegisearchError {
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        LegisearchError::InvalidInput(msg.into())
    }

    pub fn model<S: Into<String>>(msg: S) -> Self {
        LegisearchError::Model {
            message: msg.into(),
            source: None,
        }
    }

    pub fn model_with_source<S, E>(msg: S, source: E) -> Self
    where
        S: Into<String>,
        E: Into<BoxError>,
    {
        LegisearchError::Model {
            message: msg.into(),
            source: Some(source.into()),
        }
    }

    pub fn search<S: Into<String>>(msg: S) -> Self {
        LegisearchError::Search {
            message: msg.into(),
            source: None,
        }
    }

    /// Wrap a lower-level failure as a search error, keeping it as the cause.
    pub fn search_with_source<S, E>(msg: S, source: E) -> Self
    where
        S: Into<String>,
        E: Into<BoxError>,
    {
        LegisearchError::Search {
            message: msg.into(),
            source: Some(source.into()),
        }
    }

    pub fn dimension_mismatch(expected: usize, actual: usize) -> Self {
        LegisearchError::DimensionMismatch { expected, actual }
    }

    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        LegisearchError::InvalidConfig(msg.into())
    }

    pub fn storage<S: Into<String>>(msg: S) -> Self {
        LegisearchError::Storage(msg.into())
    }

    pub fn internal<S: Into<String>>(msg: S) -> Self {
        LegisearchError::Internal(msg.into())
    }

    /// Returns true when the caller can fix the request and retry.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, LegisearchError::InvalidInput(_))
    }
}
