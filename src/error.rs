//! Error types for the md2zim library.

use thiserror::Error;

/// Result type alias for this library.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the library.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Conversion error: {0}")]
    Convert(#[from] ConvertError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by the file collaborators around the engine.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Input file not found: {0}")]
    InputNotFound(String),

    #[error("Failed to write {path}: {message}")]
    Write { path: String, message: String },
}

/// Errors in user-supplied configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Invalid TOML in {path}: {message}")]
    Toml { path: String, message: String },
}

/// Errors that occur inside the conversion engine.
///
/// `StructuralLimit` never reaches callers of [`crate::convert`]: the pass
/// that hits it leaves the offending construct as plain text.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("Nesting deeper than {limit} levels")]
    StructuralLimit { limit: usize },

    #[error("Failed to compile pattern: {0}")]
    Pattern(String),
}

impl From<regex::Error> for Error {
    fn from(err: regex::Error) -> Self {
        Error::Convert(ConvertError::Pattern(err.to_string()))
    }
}
