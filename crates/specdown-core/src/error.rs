//! Error types for the specdown core library
//!
//! Uses thiserror for ergonomic error definitions and anyhow for flexible
//! error sources. The taxonomy mirrors the recovery policy of the engine:
//! only depth explosions and unreadable documents are fatal, and only for
//! the document they occur in.

use thiserror::Error;

/// Main error type for core operations
#[derive(Error, Debug)]
pub enum Error {
    /// A schema nested deeper than the hard recursion bound.
    ///
    /// Fatal for the schema/operation it occurred in; callers are expected
    /// to report it per document and keep processing siblings.
    #[error("max schema depth exceeded ({depth} levels) while {operation}")]
    DepthExceeded { depth: usize, operation: String },

    /// Sample synthesis could not produce a value for a schema shape.
    ///
    /// Recoverable: the sampling entry point falls back to echoing the
    /// resolved schema after logging the message once.
    #[error("sample synthesis failed: {message}")]
    Synthesis { message: String },

    /// The input document could not be parsed or is structurally unusable
    #[error("malformed document: {message}")]
    Document {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// JSON parsing and serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },

    /// IO errors
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// True if this error should abort processing of the current document
    /// rather than being absorbed locally.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Error::Synthesis { .. })
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io {
            message: err.to_string(),
            source: err,
        }
    }
}
