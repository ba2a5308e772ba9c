//! Connection state
//!
//! The session state is owned by the caller and threaded through every engine
//! call, so the engine itself stays immutable.

use serde::{Deserialize, Serialize};

/// Whether the device is currently accepting AT commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionMode {
    /// Device is passing data through (or its state is unknown)
    Disconnected,
    /// Device is accepting AT commands
    CommandMode,
}

/// Per-session link state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionState {
    /// True while the device is in command mode
    pub connected: bool,
    /// Baud rate the host UART is currently running at
    pub host_baud: u32,
    /// Last baud rate successfully configured on the device
    pub device_baud: u32,
}

impl Default for ConnectionState {
    fn default() -> Self {
        Self::new(super::DEFAULT_BAUD_RATE)
    }
}

impl ConnectionState {
    /// A disconnected session where host and device are assumed to run at `baud`
    pub fn new(baud: u32) -> Self {
        Self {
            connected: false,
            host_baud: baud,
            device_baud: baud,
        }
    }

    /// Current state machine position
    pub fn mode(&self) -> SessionMode {
        if self.connected {
            SessionMode::CommandMode
        } else {
            SessionMode::Disconnected
        }
    }

    pub fn is_command_mode(&self) -> bool {
        self.connected
    }
}
