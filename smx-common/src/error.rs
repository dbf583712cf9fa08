//! Common error types for SMX

use std::path::PathBuf;
use thiserror::Error;

/// Common result type for SMX operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across SMX crates
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// XML reading or writing error
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Field catalog parse error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Structurally invalid field content (empty key, unusable tag name)
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// A field's declared type contradicts its key's naming convention.
    /// Reported, never fatal.
    #[error("Integrity violation: {0}")]
    IntegrityViolation(String),

    /// Directory enumeration failed
    #[error("Scan error {path}: {message}")]
    Scan { path: PathBuf, message: String },

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),
}
