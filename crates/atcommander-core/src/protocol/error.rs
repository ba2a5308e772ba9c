//! Protocol errors

use thiserror::Error;

use super::commands::CommandKind;

/// Errors that can occur while talking to an AT command device
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("Not in command mode")]
    NotConnected,

    #[error("Unexpected response: expected '{expected}', got '{actual}'")]
    UnexpectedResponse { expected: String, actual: String },

    #[error("Device returned error response '{0}'")]
    KnownErrorResponse(String),

    #[error("Platform does not support the {0} command")]
    UnsupportedOperation(CommandKind),

    #[error("Request too large: {length} bytes exceeds maximum of {max}")]
    RequestTooLarge { length: usize, max: usize },

    #[error("Invalid request format: {0}")]
    InvalidFormat(String),

    #[error("Platform has no device code for baud rate {0}")]
    UnsupportedBaudRate(u32),

    #[error("Response buffer too small")]
    BufferTooSmall,

    #[error("Serial port error: {0}")]
    SerialError(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
