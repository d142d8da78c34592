//! Error types for the CLI.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

/// Main error type for CLI operations.
#[derive(Debug, Error)]
pub enum CliError {
    /// Failed to read an input file.
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Input file held invalid JSON.
    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The schema file could not be compiled.
    #[error("failed to compile schema: {0}")]
    Compile(#[from] typeguard::CompileError),

    /// The value did not conform to the schema.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Failed to serialize output.
    #[error("JSON serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Generic IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Create a read error with path context.
    pub fn read(path: PathBuf, source: std::io::Error) -> Self {
        Self::Read { path, source }
    }

    /// Create a JSON error with path context.
    pub fn json(path: PathBuf, source: serde_json::Error) -> Self {
        Self::Json { path, source }
    }
}
