//! Platform profiles
//!
//! A profile is the immutable description of one device family: its command
//! templates, how long it needs before answering, and how it encodes baud
//! rates on the wire.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::commands::{AtCommand, CommandKind};

/// Response delay used by most devices
pub const DEFAULT_RESPONSE_DELAY_MS: u64 = 1000;

/// Maps a host baud rate to the short code the device expects
pub type BaudRateMapper = fn(u32) -> Option<u32>;

/// Command templates and timing for one device family
#[derive(Debug, Clone, Copy)]
pub struct PlatformProfile {
    /// Display name
    pub name: &'static str,
    /// Settle time after writing a request before reading the response
    pub response_delay_ms: u64,
    /// Baud rate to device code mapping
    pub baud_rate_mapper: BaudRateMapper,
    pub enter_command_mode: Option<AtCommand>,
    pub exit_command_mode: Option<AtCommand>,
    pub set_baud_rate: Option<AtCommand>,
    pub set_configuration_timer: Option<AtCommand>,
    pub store_settings: Option<AtCommand>,
    pub reboot: Option<AtCommand>,
    pub set_name: Option<AtCommand>,
    pub set_serialized_name: Option<AtCommand>,
    pub get_name: Option<AtCommand>,
    pub get_device_id: Option<AtCommand>,
}

/// Roving Networks RN-42 / RN-41 Bluetooth modules
pub const RN42: PlatformProfile = PlatformProfile {
    name: "RN-42",
    response_delay_ms: DEFAULT_RESPONSE_DELAY_MS,
    baud_rate_mapper: rn42_baud_rate_mapper,
    enter_command_mode: Some(AtCommand::new("$$$", "CMD")),
    exit_command_mode: Some(AtCommand::new("---\r", "END")),
    set_baud_rate: Some(AtCommand::new("SU,%d\r", "AOK")),
    set_configuration_timer: Some(AtCommand::new("ST,%d\r", "AOK")),
    store_settings: None,
    reboot: Some(AtCommand::new("R,1\r", "Reboot!")),
    set_name: Some(AtCommand::new("SN,%s\r", "AOK")),
    set_serialized_name: Some(AtCommand::new("S-,%s\r", "AOK")),
    get_name: Some(AtCommand::query("GN\r", "ERR")),
    get_device_id: Some(AtCommand::query("GB\r", "ERR")),
};

/// Digi XBee modules
pub const XBEE: PlatformProfile = PlatformProfile {
    name: "XBee",
    response_delay_ms: 3000,
    baud_rate_mapper: xbee_baud_rate_mapper,
    enter_command_mode: Some(AtCommand::new("+++", "OK")),
    exit_command_mode: None,
    set_baud_rate: Some(AtCommand::new("ATBD %d\r\n", "OK")),
    set_configuration_timer: Some(AtCommand::new("ATCT %d\r\n", "OK")),
    store_settings: Some(AtCommand::new("ATWR\r\n", "OK")),
    reboot: None,
    set_name: Some(AtCommand::new("ATNI %s\r\n", "OK")),
    set_serialized_name: None,
    get_name: Some(AtCommand::query("ATNI\r\n", "ERROR")),
    get_device_id: Some(AtCommand::query("ATSL\r\n", "ERROR")),
};

impl PlatformProfile {
    /// Look up the template for a command, if this platform has one
    pub fn command(&self, kind: CommandKind) -> Option<&AtCommand> {
        match kind {
            CommandKind::EnterCommandMode => self.enter_command_mode.as_ref(),
            CommandKind::ExitCommandMode => self.exit_command_mode.as_ref(),
            CommandKind::SetBaudRate => self.set_baud_rate.as_ref(),
            CommandKind::SetConfigurationTimer => self.set_configuration_timer.as_ref(),
            CommandKind::StoreSettings => self.store_settings.as_ref(),
            CommandKind::Reboot => self.reboot.as_ref(),
            CommandKind::SetName => self.set_name.as_ref(),
            CommandKind::SetSerializedName => self.set_serialized_name.as_ref(),
            CommandKind::GetName => self.get_name.as_ref(),
            CommandKind::GetDeviceId => self.get_device_id.as_ref(),
        }
    }

    /// Check if the platform defines a template for a command
    pub fn supports(&self, kind: CommandKind) -> bool {
        self.command(kind).is_some()
    }

    /// Device code for a host baud rate
    pub fn baud_code(&self, baud: u32) -> Option<u32> {
        (self.baud_rate_mapper)(baud)
    }
}

/// RN-42 `SU` codes are the first two significant digits of the rate
pub fn rn42_baud_rate_mapper(baud: u32) -> Option<u32> {
    let code = match baud {
        1200 => 12,
        2400 => 24,
        4800 => 48,
        9600 => 96,
        19200 => 19,
        28800 => 28,
        38400 => 38,
        57600 => 57,
        115200 => 11,
        230400 => 23,
        460800 => 46,
        921600 => 92,
        _ => return None,
    };
    Some(code)
}

/// XBee `BD` register values
pub fn xbee_baud_rate_mapper(baud: u32) -> Option<u32> {
    let code = match baud {
        1200 => 0,
        2400 => 1,
        4800 => 2,
        9600 => 3,
        19200 => 4,
        38400 => 5,
        57600 => 6,
        115200 => 7,
        230400 => 8,
        _ => return None,
    };
    Some(code)
}

/// Named selector for the built-in profiles
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformKind {
    #[default]
    Rn42,
    Xbee,
}

impl PlatformKind {
    /// The profile for this platform
    pub fn profile(&self) -> &'static PlatformProfile {
        match self {
            PlatformKind::Rn42 => &RN42,
            PlatformKind::Xbee => &XBEE,
        }
    }
}

impl fmt::Display for PlatformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlatformKind::Rn42 => f.write_str("rn42"),
            PlatformKind::Xbee => f.write_str("xbee"),
        }
    }
}

impl FromStr for PlatformKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "").as_str() {
            "rn42" | "rn41" => Ok(PlatformKind::Rn42),
            "xbee" => Ok(PlatformKind::Xbee),
            other => Err(format!("Unknown platform '{}' (expected rn42 or xbee)", other)),
        }
    }
}
