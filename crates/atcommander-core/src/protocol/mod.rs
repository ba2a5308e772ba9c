//! AT Command Protocol
//!
//! Implements command mode handshakes and configuration exchanges for serial
//! radio modules driven by textual AT-style commands.
//!
//! The engine is transport-agnostic: everything goes through the
//! [`Transport`] trait, and the caller owns the [`ConnectionState`].

mod baud;
pub mod command_builder;
mod commander;
pub mod commands;
mod connection;
mod error;
pub mod exchange;
pub mod mock;
pub mod platform;
mod reader;
pub mod serial;
mod transport;

pub use baud::BaudSequencer;
pub use command_builder::{CommandBuilder, FormatArg};
pub use commander::AtCommander;
pub use commands::{AtCommand, CommandKind};
pub use connection::{ConnectionState, SessionMode};
pub use error::ProtocolError;
pub use exchange::{get_request, set_request, RetryPolicy};
pub use mock::MockTransport;
pub use platform::{PlatformKind, PlatformProfile, RN42, XBEE};
pub use reader::read_response;
pub use serial::{list_ports, PortInfo, SerialTransport};
pub use transport::Transport;

/// Host baud rate assumed before autodetection has run
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// Autodetection order, most likely rates first
pub const CANDIDATE_BAUD_RATES: [u32; 7] = [230400, 115200, 9600, 19200, 38400, 57600, 460800];

/// Empty reads tolerated while waiting for one response
pub const MAX_RETRIES: u32 = 3;

/// Sleep after each empty read in milliseconds
pub const RETRY_DELAY_MS: u64 = 100;

/// Hard cap on a formatted request in bytes
pub const MAX_REQUEST_LENGTH: usize = 64;
