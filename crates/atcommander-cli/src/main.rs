//! AT Commander CLI
//!
//! Host-side driver: opens a serial port, autodetects the radio's baud rate
//! and runs a single configuration command.

use anyhow::{bail, Context};
use atcommander_core::config::CommanderConfig;
use atcommander_core::protocol::{
    list_ports, AtCommander, ConnectionState, PlatformKind, ProtocolError, SerialTransport,
    Transport, DEFAULT_BAUD_RATE,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Query buffer size for get-name / get-id
const RESPONSE_BUFFER_SIZE: usize = 64;

/// Back-off between set-baud attempts in milliseconds
const BAUD_RETRY_DELAY_MS: u64 = 5000;

#[derive(Parser, Debug)]
#[command(
    name = "atcommander",
    version,
    about = "Configure RN-42 and XBee serial radios over AT commands",
    long_about = None
)]
struct Cli {
    /// Config file (defaults to the user config directory)
    #[arg(long, env = "ATCOMMANDER_CONFIG")]
    config: Option<PathBuf>,

    /// Serial port name (e.g., COM3, /dev/ttyUSB0)
    #[arg(short, long)]
    port: Option<String>,

    /// Device family
    #[arg(long)]
    platform: Option<PlatformKind>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List available serial ports
    ListPorts,

    /// Autodetect the baud rate and enter command mode
    Enter,

    /// Leave command mode
    Exit,

    /// Soft reset the device
    Reboot,

    /// Change the device baud rate
    SetBaud {
        baud: u32,

        /// Reboot afterwards so the new rate takes effect
        #[arg(long)]
        reboot: bool,

        /// Extra attempts after a failure, 5 seconds apart
        #[arg(long, default_value_t = 0)]
        retry: u32,
    },

    /// Set the configuration timer
    SetTimer { seconds: u32 },

    /// Set the device name
    SetName {
        name: String,

        /// Let the device append a unique suffix
        #[arg(long)]
        serialized: bool,
    },

    /// Print the device name
    GetName,

    /// Print the device address / serial number
    GetId,

    /// Store settings to flash
    Store,

    /// Write the effective configuration to the config file
    InitConfig,
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .with_target(false)
        .init();
}

fn print_ports() {
    for port in list_ports() {
        match (&port.product, port.vid, port.pid) {
            (Some(product), Some(vid), Some(pid)) => {
                println!("{}  {:04x}:{:04x}  {}", port.name, vid, pid, product)
            }
            _ => println!("{}", port.name),
        }
    }
}

fn config_path(cli: &Cli) -> anyhow::Result<PathBuf> {
    match &cli.config {
        Some(path) => Ok(path.clone()),
        None => CommanderConfig::default_path().context("locating config directory"),
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<CommanderConfig> {
    let path = config_path(cli)?;
    let mut config = CommanderConfig::load_or_default(&path)
        .with_context(|| format!("loading config from {}", path.display()))?;

    if let Some(port) = &cli.port {
        config.port = Some(port.clone());
    }
    if let Some(platform) = cli.platform {
        config.platform = platform;
    }
    Ok(config)
}

/// Keep trying to change the device baud rate, backing off between attempts
fn set_baud_with_retry<T: Transport + ?Sized>(
    commander: &AtCommander,
    port: &mut T,
    state: &mut ConnectionState,
    baud: u32,
    reboot: bool,
    retries: u32,
) -> Result<(), ProtocolError> {
    let mut attempt = 0;
    loop {
        let result = if reboot {
            commander.ensure_baud(port, state, baud)
        } else {
            commander.set_baud(port, state, baud)
        };

        match result {
            Ok(()) => return Ok(()),
            // Nothing changes between attempts for these
            Err(e @ (ProtocolError::UnsupportedOperation(_)
            | ProtocolError::UnsupportedBaudRate(_)
            | ProtocolError::RequestTooLarge { .. }
            | ProtocolError::InvalidFormat(_))) => return Err(e),
            Err(e) if attempt < retries => {
                attempt += 1;
                tracing::warn!(
                    "Set baud attempt {} of {} failed: {}",
                    attempt,
                    retries + 1,
                    e
                );
                port.delay_ms(BAUD_RETRY_DELAY_MS);
            }
            Err(e) => return Err(e),
        }
    }
}

fn run(
    command: &Commands,
    commander: &AtCommander,
    port: &mut SerialTransport,
    state: &mut ConnectionState,
) -> anyhow::Result<()> {
    let mut buffer = [0u8; RESPONSE_BUFFER_SIZE];

    match command {
        Commands::ListPorts | Commands::InitConfig => {}
        Commands::Enter => {
            commander.enter_command_mode(port, state)?;
            println!("In command mode at {} baud", state.host_baud);
        }
        Commands::Exit => {
            commander.enter_command_mode(port, state)?;
            commander.exit_command_mode(port, state)?;
            println!("Back in data mode");
        }
        Commands::Reboot => {
            commander.reboot(port, state)?;
            println!("Rebooted");
        }
        Commands::SetBaud {
            baud,
            reboot,
            retry,
        } => {
            set_baud_with_retry(commander, port, state, *baud, *reboot, *retry)?;
            println!("Device baud rate set to {}", state.device_baud);
        }
        Commands::SetTimer { seconds } => {
            commander.set_configuration_timer(port, state, *seconds)?;
            println!("Configuration timer set to {}", seconds);
        }
        Commands::SetName { name, serialized } => {
            commander.set_name(port, state, name, *serialized)?;
            println!("Name set to {}", name);
        }
        Commands::GetName => {
            let length = commander.get_name(port, state, &mut buffer)?;
            println!("{}", String::from_utf8_lossy(&buffer[..length]));
        }
        Commands::GetId => {
            let length = commander.get_device_id(port, state, &mut buffer)?;
            println!("{}", String::from_utf8_lossy(&buffer[..length]));
        }
        Commands::Store => {
            commander.enter_command_mode(port, state)?;
            commander.store_settings(port, state)?;
            println!("Settings stored");
        }
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Listing needs no port or config
    if let Commands::ListPorts = cli.command {
        print_ports();
        return Ok(());
    }

    let config = load_config(&cli)?;

    if let Commands::InitConfig = cli.command {
        let path = config_path(&cli)?;
        config
            .save(&path)
            .with_context(|| format!("writing config to {}", path.display()))?;
        println!("Wrote {}", path.display());
        return Ok(());
    }

    let Some(port_name) = config.port.clone() else {
        bail!("no serial port given (use --port or set \"port\" in the config file)");
    };

    tracing::info!(
        "Starting atcommander v{} on {} ({})",
        env!("CARGO_PKG_VERSION"),
        port_name,
        config.platform
    );

    let commander = config.build_commander();
    tracing::debug!(
        "Each response may take up to {} ms",
        commander.profile().response_delay_ms + commander.retry_policy().worst_case_ms()
    );
    let mut port = SerialTransport::open(&port_name, DEFAULT_BAUD_RATE)
        .with_context(|| format!("opening {}", port_name))?;
    let mut state = ConnectionState::new(DEFAULT_BAUD_RATE);

    run(&cli.command, &commander, &mut port, &mut state)
        .with_context(|| format!("{} on {}", commander.profile().name, port_name))
}
