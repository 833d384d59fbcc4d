//! Error types for the GNTP client
//!
//! Every failure is returned to the caller as a value. Messages are written
//! to be read directly by someone running the CLI.

use std::io;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the GNTP client
#[derive(Error, Debug)]
pub enum Error {
    // === Authentication ===
    #[error("Unsupported hash algorithm '{0}'. Expected one of: md5, sha1, sha256, sha512")]
    UnsupportedHashAlgorithm(String),

    // === Connection Errors ===
    #[error("Failed to connect to {addr}: {source}")]
    ConnectionFailed {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("Connection to {addr} timed out after {secs} seconds")]
    ConnectTimeout { addr: String, secs: u64 },

    #[error("Failed to write request: {0}")]
    TransportWrite(#[source] io::Error),

    #[error("Failed to read response: {0}")]
    TransportRead(#[source] io::Error),

    #[error("No complete response after {0} seconds")]
    ReadTimeout(u64),

    // === Request Building ===
    #[error("Unknown message kind '{0}'. Expected REGISTER, NOTIFY or SUBSCRIBE")]
    UnknownMessageKind(String),

    #[error("{kind} request is missing required header '{header}'")]
    MissingHeader { kind: String, header: String },

    #[error("Notification '{0}' is registered more than once")]
    DuplicateNotification(String),

    #[error("Refusing to send an empty request")]
    EmptyRequest,

    #[error("Invalid boolean value '{0}'. Use true/false or yes/no")]
    InvalidBoolean(String),

    // === Response Errors ===
    #[error("Malformed GNTP response: {0}")]
    MalformedResponse(String),

    #[error("Daemon rejected the request (code {code}): {description}")]
    Rejected { code: String, description: String },

    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    #[error("Failed to read file '{path}': {error}")]
    FileRead { path: String, error: String },

    // === Serialization Errors ===
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a connection failed error for an address
    pub fn connection_failed(addr: &str, source: io::Error) -> Self {
        Self::ConnectionFailed {
            addr: addr.to_string(),
            source,
        }
    }

    /// Create a rejection error from the daemon's error headers
    pub fn rejected(code: Option<&str>, description: Option<&str>) -> Self {
        Self::Rejected {
            code: code.unwrap_or("unknown").to_string(),
            description: description.unwrap_or("no description given").to_string(),
        }
    }

    /// Whether the failure happened before anything was sent
    pub fn is_connect_error(&self) -> bool {
        matches!(self, Self::ConnectionFailed { .. } | Self::ConnectTimeout { .. })
    }
}
