//! AT command templates
//!
//! Each device family describes its wire syntax as a set of request/response
//! templates. Responses are stored without line terminators because the
//! response reader strips CR and LF before comparison.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The operations a platform can provide a template for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CommandKind {
    /// Switch from data mode to command mode
    EnterCommandMode,
    /// Return to data mode
    ExitCommandMode,
    /// Change the device UART speed
    SetBaudRate,
    /// Change how long the device accepts the command mode escape after boot
    SetConfigurationTimer,
    /// Persist settings to flash
    StoreSettings,
    /// Soft reset the device
    Reboot,
    /// Set the advertised device name
    SetName,
    /// Set the device name with a unique suffix appended by the device
    SetSerializedName,
    /// Query the device name
    GetName,
    /// Query the device address / serial number
    GetDeviceId,
}

impl CommandKind {
    /// Every command kind, in profile order
    pub const ALL: [CommandKind; 10] = [
        CommandKind::EnterCommandMode,
        CommandKind::ExitCommandMode,
        CommandKind::SetBaudRate,
        CommandKind::SetConfigurationTimer,
        CommandKind::StoreSettings,
        CommandKind::Reboot,
        CommandKind::SetName,
        CommandKind::SetSerializedName,
        CommandKind::GetName,
        CommandKind::GetDeviceId,
    ];

    /// Human readable name used in logs and errors
    pub fn name(&self) -> &'static str {
        match self {
            CommandKind::EnterCommandMode => "enter command mode",
            CommandKind::ExitCommandMode => "exit command mode",
            CommandKind::SetBaudRate => "set baud rate",
            CommandKind::SetConfigurationTimer => "set configuration timer",
            CommandKind::StoreSettings => "store settings",
            CommandKind::Reboot => "reboot",
            CommandKind::SetName => "set name",
            CommandKind::SetSerializedName => "set serialized name",
            CommandKind::GetName => "get name",
            CommandKind::GetDeviceId => "get device id",
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single request/response template
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AtCommand {
    /// Request template with at most one `%d` or `%s` slot
    pub request_format: &'static str,
    /// Exact token signalling success. `None` for fire-and-forget commands
    /// and for queries.
    pub expected_response: Option<&'static str>,
    /// Token the device sends when a query fails
    pub error_response: Option<&'static str>,
}

impl AtCommand {
    /// A command whose response must match `expected` exactly
    pub const fn new(request_format: &'static str, expected: &'static str) -> Self {
        Self {
            request_format,
            expected_response: Some(expected),
            error_response: None,
        }
    }

    /// A query whose response is returned unless it starts with `error`
    pub const fn query(request_format: &'static str, error: &'static str) -> Self {
        Self {
            request_format,
            expected_response: None,
            error_response: Some(error),
        }
    }

    /// A command that is written without reading any response
    pub const fn fire_and_forget(request_format: &'static str) -> Self {
        Self {
            request_format,
            expected_response: None,
            error_response: None,
        }
    }
}
