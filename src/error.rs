//! Error types for betwire.

use thiserror::Error;

/// Main error type for all betwire operations.
#[derive(Debug, Error)]
pub enum BetwireError {
    /// Invalid configuration, rejected before any I/O happens.
    #[error("configuration error: {0}")]
    Config(String),

    /// The server connection could not be established.
    #[error("connection to {addr} failed: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// I/O error during socket or file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON configuration could not be parsed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A raw record line with the wrong field count.
    #[error("malformed record (expected 5 comma-separated fields): {line:?}")]
    MalformedRecord { line: String },

    /// Protocol error (non-UTF-8 payload, etc.).
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The archive source could not be opened or read.
    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// Connection closed before a full message was exchanged.
    #[error("connection closed")]
    ConnectionClosed,
}

/// Result type alias using BetwireError.
pub type Result<T> = std::result::Result<T, BetwireError>;
