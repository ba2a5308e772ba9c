//! AT command engine
//!
//! Stateful operations built on single exchanges: command mode entry with
//! baud autodetection, exit, reboot, and the configuration setters/queries.
//! The engine holds only immutable configuration; the caller owns the
//! [`ConnectionState`] and passes it into every call.

use super::{
    command_builder::{CommandBuilder, FormatArg},
    exchange::{get_request, set_request, RetryPolicy},
    AtCommand, BaudSequencer, CommandKind, ConnectionState, PlatformProfile, ProtocolError,
    Transport,
};

/// Protocol engine for one device family
#[derive(Debug, Clone)]
pub struct AtCommander {
    /// Wire syntax and timing of the attached device
    profile: PlatformProfile,
    /// Host baud rates tried during command mode entry
    bauds: BaudSequencer,
    /// Retry bounds for every response read
    retry_policy: RetryPolicy,
    /// Request formatter with a hard length cap
    builder: CommandBuilder,
}

impl AtCommander {
    /// Create an engine with the reference baud list and retry policy
    pub fn new(profile: PlatformProfile) -> Self {
        Self {
            profile,
            bauds: BaudSequencer::default(),
            retry_policy: RetryPolicy::default(),
            builder: CommandBuilder::default(),
        }
    }

    /// Replace the autodetection candidate list
    pub fn with_bauds(mut self, bauds: BaudSequencer) -> Self {
        self.bauds = bauds;
        self
    }

    /// Replace the response retry bounds
    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    /// Replace the request formatter
    pub fn with_builder(mut self, builder: CommandBuilder) -> Self {
        self.builder = builder;
        self
    }

    pub fn profile(&self) -> &PlatformProfile {
        &self.profile
    }

    pub fn bauds(&self) -> &BaudSequencer {
        &self.bauds
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry_policy
    }

    fn command(&self, kind: CommandKind) -> Result<AtCommand, ProtocolError> {
        self.profile.command(kind).copied().ok_or_else(|| {
            tracing::warn!("{} has no {} command", self.profile.name, kind);
            ProtocolError::UnsupportedOperation(kind)
        })
    }

    fn set<T: Transport + ?Sized>(
        &self,
        transport: &mut T,
        command: &AtCommand,
        arg: Option<FormatArg<'_>>,
    ) -> Result<(), ProtocolError> {
        set_request(
            transport,
            &self.profile,
            &self.builder,
            &self.retry_policy,
            command,
            arg,
        )
    }

    /// Enter command mode before running `kind`, logging why it could not
    fn enter_for<T: Transport + ?Sized>(
        &self,
        kind: CommandKind,
        transport: &mut T,
        state: &mut ConnectionState,
    ) -> Result<(), ProtocolError> {
        self.enter_command_mode(transport, state).map_err(|e| {
            tracing::warn!("Unable to enter command mode, can't {}", kind);
            e
        })
    }

    /// Switch the device to command mode, autodetecting its baud rate.
    ///
    /// Each candidate rate is tried in order; the first one that yields the
    /// platform's handshake token wins and the rest are skipped. Succeeds
    /// immediately without I/O if the session is already in command mode.
    pub fn enter_command_mode<T: Transport + ?Sized>(
        &self,
        transport: &mut T,
        state: &mut ConnectionState,
    ) -> Result<(), ProtocolError> {
        if state.is_command_mode() {
            tracing::debug!("Already in command mode");
            return Ok(());
        }

        let command = self.command(CommandKind::EnterCommandMode)?;

        for baud in self.bauds.iter() {
            tracing::debug!("Initializing at baud {}", baud);
            if let Err(e) = transport.set_host_baud(baud) {
                tracing::warn!("Unable to switch host UART to {} baud: {}", baud, e);
                continue;
            }
            state.host_baud = baud;

            tracing::debug!("Attempting to enter command mode");
            match self.set(transport, &command, None) {
                Ok(()) => {
                    state.connected = true;
                    tracing::info!(
                        "Initialized UART and entered command mode at baud {}",
                        baud
                    );
                    return Ok(());
                }
                Err(ProtocolError::UnexpectedResponse { .. }) => continue,
                Err(e) => return Err(e),
            }
        }

        tracing::warn!("Unable to enter command mode at any baud rate");
        Err(ProtocolError::NotConnected)
    }

    /// Return the device to data mode. Succeeds without I/O if not in command mode.
    pub fn exit_command_mode<T: Transport + ?Sized>(
        &self,
        transport: &mut T,
        state: &mut ConnectionState,
    ) -> Result<(), ProtocolError> {
        if !state.is_command_mode() {
            tracing::debug!("Not in command mode");
            return Ok(());
        }

        let command = self.command(CommandKind::ExitCommandMode)?;
        match self.set(transport, &command, None) {
            Ok(()) => {
                state.connected = false;
                tracing::info!("Switched back to data mode");
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Unable to exit command mode: {}", e);
                Err(e)
            }
        }
    }

    /// Soft reset the device. The session drops back to disconnected.
    pub fn reboot<T: Transport + ?Sized>(
        &self,
        transport: &mut T,
        state: &mut ConnectionState,
    ) -> Result<(), ProtocolError> {
        let command = self.command(CommandKind::Reboot)?;
        self.enter_for(CommandKind::Reboot, transport, state)?;

        self.set(transport, &command, None)?;
        state.connected = false;
        tracing::info!("Rebooting {}", self.profile.name);
        Ok(())
    }

    /// Persist the device settings to flash.
    ///
    /// Platforms that save automatically have no store command; for those this
    /// is a successful no-op.
    pub fn store_settings<T: Transport + ?Sized>(
        &self,
        transport: &mut T,
        state: &ConnectionState,
    ) -> Result<(), ProtocolError> {
        let Some(command) = self.profile.store_settings else {
            tracing::debug!("{} does not need settings stored", self.profile.name);
            return Ok(());
        };

        if !state.is_command_mode() {
            return Err(ProtocolError::NotConnected);
        }

        match self.set(transport, &command, None) {
            Ok(()) => {
                tracing::info!("Stored settings into flash memory");
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Unable to store settings in flash memory: {}", e);
                Err(e)
            }
        }
    }

    /// Change the device UART speed.
    ///
    /// The new rate takes effect on the device side (usually after a reboot);
    /// the host UART is left alone. Storing the change to flash is attempted
    /// but a store failure does not fail the call.
    pub fn set_baud<T: Transport + ?Sized>(
        &self,
        transport: &mut T,
        state: &mut ConnectionState,
        baud: u32,
    ) -> Result<(), ProtocolError> {
        let command = self.command(CommandKind::SetBaudRate)?;
        let code = self.profile.baud_code(baud).ok_or_else(|| {
            tracing::warn!("{} has no device code for {} baud", self.profile.name, baud);
            ProtocolError::UnsupportedBaudRate(baud)
        })?;
        self.enter_for(CommandKind::SetBaudRate, transport, state)?;

        if let Err(e) = self.set(transport, &command, Some(FormatArg::Int(i64::from(code)))) {
            tracing::warn!("Unable to change device baud rate: {}", e);
            return Err(e);
        }

        tracing::info!("Changed device baud rate to {}", baud);
        state.device_baud = baud;

        if let Err(e) = self.store_settings(transport, state) {
            tracing::warn!("Baud rate changed but not stored: {}", e);
        }
        Ok(())
    }

    /// Change the device baud rate and reboot it so the new rate is live.
    ///
    /// Platforms without a reboot command only get the baud change.
    pub fn ensure_baud<T: Transport + ?Sized>(
        &self,
        transport: &mut T,
        state: &mut ConnectionState,
        baud: u32,
    ) -> Result<(), ProtocolError> {
        self.set_baud(transport, state, baud)?;
        if self.profile.supports(CommandKind::Reboot) {
            self.reboot(transport, state)?;
        }
        Ok(())
    }

    /// Set how long after power-up the device accepts the command mode escape
    pub fn set_configuration_timer<T: Transport + ?Sized>(
        &self,
        transport: &mut T,
        state: &mut ConnectionState,
        seconds: u32,
    ) -> Result<(), ProtocolError> {
        let command = self.command(CommandKind::SetConfigurationTimer)?;
        self.enter_for(CommandKind::SetConfigurationTimer, transport, state)?;

        self.set(transport, &command, Some(FormatArg::Int(i64::from(seconds))))?;
        tracing::info!("Set configuration timer to {}", seconds);
        Ok(())
    }

    /// Set the device name. With `serialized`, the device appends a unique
    /// suffix derived from its address.
    pub fn set_name<T: Transport + ?Sized>(
        &self,
        transport: &mut T,
        state: &mut ConnectionState,
        name: &str,
        serialized: bool,
    ) -> Result<(), ProtocolError> {
        let kind = if serialized {
            CommandKind::SetSerializedName
        } else {
            CommandKind::SetName
        };
        let command = self.command(kind)?;
        self.enter_for(kind, transport, state)?;

        self.set(transport, &command, Some(FormatArg::Text(name)))?;
        tracing::info!("Set device name to {:?}", name);
        Ok(())
    }

    /// Read the device name into `buffer`, returning its length
    pub fn get_name<T: Transport + ?Sized>(
        &self,
        transport: &mut T,
        state: &mut ConnectionState,
        buffer: &mut [u8],
    ) -> Result<usize, ProtocolError> {
        self.query(CommandKind::GetName, transport, state, buffer)
    }

    /// Read the device address / serial number into `buffer`, returning its length
    pub fn get_device_id<T: Transport + ?Sized>(
        &self,
        transport: &mut T,
        state: &mut ConnectionState,
        buffer: &mut [u8],
    ) -> Result<usize, ProtocolError> {
        self.query(CommandKind::GetDeviceId, transport, state, buffer)
    }

    fn query<T: Transport + ?Sized>(
        &self,
        kind: CommandKind,
        transport: &mut T,
        state: &mut ConnectionState,
        buffer: &mut [u8],
    ) -> Result<usize, ProtocolError> {
        let command = self.command(kind)?;
        self.enter_for(kind, transport, state)?;

        get_request(
            transport,
            &self.profile,
            &self.builder,
            &self.retry_policy,
            &command,
            buffer,
        )
    }
}
