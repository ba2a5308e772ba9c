//! Session configuration
//!
//! Stored as `config.json`. Every field has a default so partial files load.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::protocol::{
    AtCommander, BaudSequencer, CommandBuilder, PlatformKind, RetryPolicy, CANDIDATE_BAUD_RATES,
    MAX_REQUEST_LENGTH, MAX_RETRIES, RETRY_DELAY_MS,
};

/// Errors that can occur while loading or validating configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Configuration for one AT command session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommanderConfig {
    /// Device family attached to the port
    pub platform: PlatformKind,

    /// Serial port name
    pub port: Option<String>,

    /// Host baud rates tried during autodetection, in order
    pub candidate_bauds: Vec<u32>,

    /// Empty reads tolerated per response
    pub max_retries: u32,

    /// Sleep after each empty read in milliseconds
    pub retry_delay_ms: u64,

    /// Hard cap on a formatted request in bytes
    pub max_request_length: usize,
}

impl Default for CommanderConfig {
    fn default() -> Self {
        Self {
            platform: PlatformKind::default(),
            port: None,
            candidate_bauds: CANDIDATE_BAUD_RATES.to_vec(),
            max_retries: MAX_RETRIES,
            retry_delay_ms: RETRY_DELAY_MS,
            max_request_length: MAX_REQUEST_LENGTH,
        }
    }
}

impl CommanderConfig {
    /// Default location of the config file
    pub fn default_path() -> io::Result<PathBuf> {
        let base = dirs::config_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| {
                io::Error::new(io::ErrorKind::NotFound, "Could not find home directory")
            })?;
        Ok(base.join("atcommander").join("config.json"))
    }

    /// Load and validate a config file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: CommanderConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file, falling back to defaults if it does not exist
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        match Self::load(path) {
            Err(ConfigError::Io(e)) if e.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            other => other,
        }
    }

    /// Save as pretty-printed JSON, creating parent directories
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Reject settings the engine cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.candidate_bauds.is_empty() {
            return Err(ConfigError::Invalid(
                "candidate_bauds must list at least one baud rate".to_string(),
            ));
        }
        if let Some(zero) = self.candidate_bauds.iter().find(|&&b| b == 0) {
            return Err(ConfigError::Invalid(format!(
                "candidate_bauds contains invalid rate {}",
                zero
            )));
        }
        if self.max_retries == 0 {
            return Err(ConfigError::Invalid(
                "max_retries must be at least 1".to_string(),
            ));
        }
        if self.max_request_length == 0 {
            return Err(ConfigError::Invalid(
                "max_request_length must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Retry bounds described by this config
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            retry_delay_ms: self.retry_delay_ms,
        }
    }

    /// Build an engine for the configured platform
    pub fn build_commander(&self) -> AtCommander {
        AtCommander::new(*self.platform.profile())
            .with_bauds(BaudSequencer::new(self.candidate_bauds.clone()))
            .with_retry_policy(self.retry_policy())
            .with_builder(CommandBuilder::new(self.max_request_length))
    }
}
