//! Error taxonomy for the Pixelblaze client.
//!
//! Connection and handshake failures are fatal to a session. Command errors
//! (`UnknownCommand`, `Argument`) are meant to be reported to the user (the
//! one-shot CLI prints usage) or swallowed (the bridge still answers `OK`).

use thiserror::Error;

/// Convenience alias used throughout the library.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by the protocol core and command mapper.
#[derive(Debug, Error)]
pub enum Error {
    /// TCP connect to the device failed.
    #[error("failed to connect to {addr}: {source}")]
    Connection {
        /// `host:port` that was dialed.
        addr: String,
        /// Underlying socket error.
        #[source]
        source: std::io::Error,
    },

    /// The upgrade response was not acceptable.
    #[error("WebSocket handshake failed: {0}")]
    Handshake(String),

    /// Payload exceeds the 7-bit frame length field.
    #[error("payload too large for a single frame: {len} bytes (max {max})")]
    PayloadTooLarge {
        /// Offending payload length.
        len: usize,
        /// Largest encodable payload.
        max: usize,
    },

    /// Command word not in the vocabulary.
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    /// Wrong arity or malformed argument.
    #[error("invalid arguments: {0}")]
    Argument(String),

    /// Socket or stdio failure after the connection was established.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Shorthand for a handshake rejection.
    #[must_use]
    pub fn handshake(message: impl Into<String>) -> Self {
        Self::Handshake(message.into())
    }

    /// Shorthand for an argument error.
    #[must_use]
    pub fn argument(message: impl Into<String>) -> Self {
        Self::Argument(message.into())
    }

    /// True for errors caused by user input rather than the device or socket.
    #[must_use]
    pub fn is_command_error(&self) -> bool {
        matches!(self, Self::UnknownCommand(_) | Self::Argument(_))
    }
}
