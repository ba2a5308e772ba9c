//! # AT Commander Core Library
//!
//! Protocol engine for configuring serial radio modules that speak textual
//! AT-style commands, such as RN-42 Bluetooth modules and XBee radios.

//!
//! This library provides:
//! - Baud rate autodetection and command mode entry/exit
//! - Bounded request formatting and retry-limited response reading
//! - Per-family platform profiles (RN-42, XBee)
//! - A `serialport` backed transport for host-side use
//!
//! ## Example
//!
//! ```rust,no_run
//! use atcommander_core::protocol::{AtCommander, ConnectionState, SerialTransport, RN42};
//!
//! # fn main() -> Result<(), atcommander_core::protocol::ProtocolError> {
//! let mut port = SerialTransport::open("/dev/ttyUSB0", 9600)?;
//! let mut state = ConnectionState::default();
//! let commander = AtCommander::new(RN42);
//!
//! commander.set_baud(&mut port, &mut state, 115200)?;
//! commander.reboot(&mut port, &mut state)?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod config;
pub mod protocol;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{CommanderConfig, ConfigError};
    pub use crate::protocol::{
        AtCommander, CommandKind, ConnectionState, PlatformKind, PlatformProfile, ProtocolError,
        SessionMode, Transport,
    };
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
