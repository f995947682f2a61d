//! Error types for opdotenv operations.

use thiserror::Error;

/// Result type alias using [`OpdotenvError`].
pub type Result<T> = std::result::Result<T, OpdotenvError>;

/// Errors that can occur while resolving or exporting secrets.
///
/// All errors implement `std::error::Error` and can be chained with `source()`.
#[derive(Debug, Error)]
pub enum OpdotenvError {
    /// Address string does not match `op://Vault/Item[/Field]`.
    #[error("invalid address: {0}")]
    AddressFormat(String),

    /// Unknown decode/encode format was requested.
    #[error("unsupported format: {0} (supported: dotenv, json, yaml)")]
    UnsupportedFormat(String),

    /// Vault or item does not exist in the backend.
    #[error("not found: {0}")]
    NotFound(String),

    /// Credential rejected or insufficient for the operation.
    #[error("{0}")]
    Authorization(String),

    /// Backend-side failure (5xx or unclassified non-success status).
    ///
    /// The message never contains a raw response body; only whitelisted
    /// structured fields or a generic fallback.
    #[error("API error ({status}): {message}")]
    Server {
        /// HTTP status code
        status: u16,
        /// Sanitized error message
        message: String,
    },

    /// Subprocess exited non-zero. Carries only the command name and exit
    /// code; captured output may hold secret values and is never surfaced.
    #[error("{command} failed with exit code {code}")]
    CommandFailed {
        /// Command name (e.g. "op")
        command: String,
        /// Exit code, -1 if terminated by signal
        code: i32,
    },

    /// Required CLI tool is not installed.
    #[error("CLI not installed: {0}")]
    CliNotInstalled(String),

    /// Transport failure (timeout, connection reset). Retried once inside
    /// the Connect backend, then propagated unwrapped.
    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    /// I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML deserialization error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Other error (catch-all).
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
