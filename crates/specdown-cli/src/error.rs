//! Error types and handling for the CLI

use std::io;
use std::path::PathBuf;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for CLI operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error (file operations, etc.)
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Error from the specdown-core engine
    #[error("Core error: {0}")]
    Core(#[from] specdown_core::Error),

    /// File not found
    #[error("File not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// The document parsed as neither JSON nor YAML
    #[error("Could not parse {}: {reason}", path.display())]
    Unparseable { path: PathBuf, reason: String },

    /// No input document produced any output
    #[error("All {count} input document(s) failed")]
    AllInputsFailed { count: usize },

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Io(_) => 1,
            Self::Core(_) => 2,
            Self::FileNotFound { .. } => 3,
            Self::Unparseable { .. } => 4,
            Self::AllInputsFailed { .. } => 5,
            Self::Json(_) => 12,
        }
    }
}
