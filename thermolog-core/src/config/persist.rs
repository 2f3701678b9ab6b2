//! Configuration persistence
//!
//! Stores the logger configuration in a small fixed region of the raw
//! medium, ahead of the record log. Falls back to defaults when the region
//! has never been written.
//!
//! # Layout
//!
//! ```text
//! ┌─────────────┬─────────┬──────────┬──────────────────────┐
//! │ magic (u16) │ version │ len (u8) │ postcard payload ... │
//! └─────────────┴─────────┴──────────┴──────────────────────┘
//! ```

use thermolog_hal::RawStorage;

use super::types::{ConfigError, LoggerConfig};

/// Magic number to identify a stored config ("TL")
pub const CONFIG_MAGIC: u16 = 0x544C;

/// Current config data version
pub const CONFIG_VERSION: u8 = 1;

/// Header size in bytes
const HEADER_LEN: usize = 4;

/// Largest encoded payload
const MAX_PAYLOAD_LEN: usize = 60;

/// Where the config lives by default: the first 64 bytes of the medium
pub const DEFAULT_CONFIG_REGION: ConfigRegion = ConfigRegion::new(0, HEADER_LEN + MAX_PAYLOAD_LEN);

/// Byte region holding a persisted [`LoggerConfig`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConfigRegion {
    /// First byte of the region
    pub base_address: usize,
    /// Region size in bytes, header included
    pub len: usize,
}

impl ConfigRegion {
    pub const fn new(base_address: usize, len: usize) -> Self {
        Self { base_address, len }
    }

    /// One past the last byte of the region
    pub const fn end(&self) -> usize {
        self.base_address + self.len
    }

    /// Largest payload this region can hold
    fn payload_capacity(&self) -> usize {
        self.len.saturating_sub(HEADER_LEN).min(MAX_PAYLOAD_LEN)
    }

    /// Load the stored config
    ///
    /// Returns `Ok(None)` if the region holds no config (magic absent).
    pub fn load<S: RawStorage + ?Sized>(&self, storage: &mut S) -> Result<Option<LoggerConfig>, ConfigError> {
        let mut header = [0u8; HEADER_LEN];
        storage.read(self.base_address, &mut header)?;

        let magic = u16::from_le_bytes([header[0], header[1]]);
        if magic != CONFIG_MAGIC {
            return Ok(None);
        }
        if header[2] != CONFIG_VERSION {
            return Err(ConfigError::VersionMismatch);
        }

        let len = usize::from(header[3]);
        if len > self.payload_capacity() {
            return Err(ConfigError::Decode);
        }

        let mut payload = [0u8; MAX_PAYLOAD_LEN];
        storage.read(self.base_address + HEADER_LEN, &mut payload[..len])?;

        let config: LoggerConfig =
            postcard::from_bytes(&payload[..len]).map_err(|_| ConfigError::Decode)?;
        config.validate()?;
        Ok(Some(config))
    }

    /// Load the stored config, or defaults if none was stored
    pub fn load_or_default<S: RawStorage + ?Sized>(&self, storage: &mut S) -> Result<LoggerConfig, ConfigError> {
        match self.load(storage)? {
            Some(config) => {
                info!("config loaded: {} records", config.record_count);
                Ok(config)
            }
            None => {
                info!("no stored config, using defaults");
                Ok(LoggerConfig::default())
            }
        }
    }

    /// Validate and store `config`
    ///
    /// Payload is written before the header so an interrupted store leaves
    /// either the old header or none.
    pub fn store<S: RawStorage + ?Sized>(&self, storage: &mut S, config: &LoggerConfig) -> Result<(), ConfigError> {
        config.validate()?;

        let mut payload = [0u8; MAX_PAYLOAD_LEN];
        let encoded = postcard::to_slice(config, &mut payload).map_err(|_| ConfigError::TooLarge)?;
        let len = encoded.len();
        if len > self.payload_capacity() {
            return Err(ConfigError::TooLarge);
        }

        storage.write(self.base_address + HEADER_LEN, &payload[..len])?;

        let magic = CONFIG_MAGIC.to_le_bytes();
        // len <= MAX_PAYLOAD_LEN, so it fits in a byte
        let header = [magic[0], magic[1], CONFIG_VERSION, len as u8];
        storage.write(self.base_address, &header)?;

        Ok(())
    }
}
