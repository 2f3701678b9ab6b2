//! Configuration type definitions
//!
//! These types represent the logger configuration. Configuration is stored
//! on the raw medium as postcard-serialized binary data.

use heapless::String;
use serde::{Deserialize, Serialize};
use thermolog_hal::StorageError;

use crate::store::ConfirmPolicy;

/// Maximum label length
pub const MAX_LABEL_LEN: usize = 16;

/// Default number of records in the log
pub const DEFAULT_RECORD_COUNT: u16 = 256;

/// Default time between samples
pub const DEFAULT_SAMPLE_INTERVAL_MS: u32 = 60_000;

/// Unit readings are logged in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Log must hold at least one record
    ZeroRecords,
    /// Sample interval must be non-zero
    ZeroInterval,
    /// Clear prompt must poll at least once
    ZeroTries,
    /// Encoded config does not fit its region
    TooLarge,
    /// Stored bytes are not a valid config
    Decode,
    /// Stored config was written by an incompatible version
    VersionMismatch,
    /// Medium failure
    Storage(StorageError),
}

impl From<StorageError> for ConfigError {
    fn from(e: StorageError) -> Self {
        ConfigError::Storage(e)
    }
}

/// Logger configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LoggerConfig {
    /// Device label echoed at boot
    pub label: String<MAX_LABEL_LEN>,
    /// Number of records in the circular log
    pub record_count: u16,
    /// Time between samples in milliseconds
    pub sample_interval_ms: u32,
    /// Unit readings are stored in
    pub unit: TemperatureUnit,
    /// Polling budget of the clear prompt
    pub confirm: ConfirmPolicy,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            label: String::new(),
            record_count: DEFAULT_RECORD_COUNT,
            sample_interval_ms: DEFAULT_SAMPLE_INTERVAL_MS,
            unit: TemperatureUnit::Celsius,
            confirm: ConfirmPolicy::default(),
        }
    }
}

impl LoggerConfig {
    /// Check the configuration is usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.record_count == 0 {
            return Err(ConfigError::ZeroRecords);
        }
        if self.sample_interval_ms == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        if self.confirm.max_tries == 0 {
            return Err(ConfigError::ZeroTries);
        }
        Ok(())
    }

    /// Log length in time at the configured sample rate, in seconds
    pub fn history_span_s(&self) -> u64 {
        u64::from(self.record_count) * u64::from(self.sample_interval_ms) / 1000
    }
}
