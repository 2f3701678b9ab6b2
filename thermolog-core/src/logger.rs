//! Periodic sample-and-store loop
//!
//! Ties a [`TempMonitor`] to a [`CircularStore`] of `f32` readings. The
//! board's main loop calls [`TemperatureLogger::run_cycle`] forever.
//!
//! # Boot sequence
//!
//! 1. Load the config from its region (defaults on a blank medium)
//! 2. Place the record log directly after the config region
//! 3. Recover the log, offering the operator a chance to wipe it
//! 4. Sample at the configured interval

use thermolog_hal::{Console, DelayNs, RawStorage};

use crate::config::{ConfigError, ConfigRegion, LoggerConfig, TemperatureUnit};
use crate::monitor::{celsius_to_fahrenheit, TempMonitor};
use crate::store::{CircularStore, InitError, InitOutcome, WriteError};
use crate::traits::TemperatureSensor;

/// Sentinel for `f32` logs: an erased EEPROM cell pattern (`0xFFFF_FFFF`)
///
/// This is a NaN bit pattern, and the monitor never passes NaN readings
/// on, so a real sample can not collide with it. A factory-fresh medium
/// reads back as an empty log.
pub fn erased_record() -> f32 {
    f32::from_bits(u32::MAX)
}

/// Errors from the logger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LogError {
    /// Stored configuration could not be used
    Config(ConfigError),
    /// Record log failed to initialize
    Init(InitError),
    /// Record could not be written
    Write(WriteError),
}

impl From<ConfigError> for LogError {
    fn from(e: ConfigError) -> Self {
        LogError::Config(e)
    }
}

impl From<InitError> for LogError {
    fn from(e: InitError) -> Self {
        LogError::Init(e)
    }
}

impl From<WriteError> for LogError {
    fn from(e: WriteError) -> Self {
        LogError::Write(e)
    }
}

/// Temperature logger
pub struct TemperatureLogger<Sen, S: RawStorage> {
    monitor: TempMonitor<Sen>,
    store: CircularStore<f32, S>,
    config: LoggerConfig,
    samples_written: u32,
}

impl<Sen: TemperatureSensor, S: RawStorage> TemperatureLogger<Sen, S> {
    /// Create a logger over an already initialized store
    pub fn new(sensor: Sen, store: CircularStore<f32, S>, config: LoggerConfig) -> Self {
        Self {
            monitor: TempMonitor::new(sensor),
            store,
            config,
            samples_written: 0,
        }
    }

    /// Bring the logger up from a raw medium
    ///
    /// Loads the config from `region`, places the log right after it and
    /// runs the recovery scan and clear prompt on `console`.
    pub fn boot<C, D>(
        sensor: Sen,
        mut storage: S,
        region: ConfigRegion,
        console: &mut C,
        delay: &mut D,
    ) -> Result<(Self, InitOutcome), LogError>
    where
        C: Console + ?Sized,
        D: DelayNs + ?Sized,
    {
        let config = region.load_or_default(&mut storage)?;
        if !config.label.is_empty() {
            let _ = writeln!(console, "{}", config.label);
        }

        let mut store = CircularStore::new(storage, usize::from(config.record_count), erased_record())
            .with_base_address(region.end())
            .with_policy(config.confirm);
        let outcome = store.init(console, delay)?;

        Ok((Self::new(sensor, store, config), outcome))
    }

    /// Take one reading and append it to the log
    ///
    /// Returns the logged value, or `None` while the sensor has not yet
    /// produced a valid reading. A failed read after a good one logs the
    /// last good value again, keeping the sample spacing regular.
    pub fn sample(&mut self) -> Result<Option<f32>, LogError> {
        if let Err(e) = self.monitor.update() {
            debug!("logging last good value after sensor error: {}", e);
        }

        let Some(celsius) = self.monitor.celsius() else {
            return Ok(None);
        };

        let value = match self.config.unit {
            TemperatureUnit::Celsius => celsius,
            TemperatureUnit::Fahrenheit => celsius_to_fahrenheit(celsius),
        };

        self.store.write(&value)?;
        self.samples_written = self.samples_written.wrapping_add(1);
        Ok(Some(value))
    }

    /// Sample, then wait out the sample interval
    pub fn run_cycle<D: DelayNs + ?Sized>(&mut self, delay: &mut D) -> Result<Option<f32>, LogError> {
        let result = self.sample();
        delay.delay_ms(self.config.sample_interval_ms);
        result
    }

    /// Last good sensor reading in °C
    pub fn last_reading(&self) -> Option<f32> {
        self.monitor.celsius()
    }

    /// Most recent sensor failure count
    pub fn sensor_failures(&self) -> u16 {
        self.monitor.consecutive_failures()
    }

    /// Records written since boot
    pub fn samples_written(&self) -> u32 {
        self.samples_written
    }

    pub fn config(&self) -> &LoggerConfig {
        &self.config
    }

    pub fn store(&mut self) -> &mut CircularStore<f32, S> {
        &mut self.store
    }

    /// Tear down, returning the medium
    pub fn release(self) -> S {
        self.store.release()
    }
}
