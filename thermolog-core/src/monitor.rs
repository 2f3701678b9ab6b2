//! Temperature monitor
//!
//! Wraps a sensor and keeps the last good reading, so a single failed or
//! garbage conversion does not reach the log.

use crate::traits::{SensorError, TemperatureSensor};

/// Convert degrees Celsius to degrees Fahrenheit
pub fn celsius_to_fahrenheit(celsius: f32) -> f32 {
    celsius * (9.0 / 5.0) + 32.0
}

/// Last-good-value cache over a [`TemperatureSensor`]
#[derive(Debug)]
pub struct TempMonitor<S> {
    sensor: S,
    /// Last valid reading in °C
    last_c: Option<f32>,
    /// Consecutive failed updates
    failures: u16,
}

impl<S: TemperatureSensor> TempMonitor<S> {
    /// Create a monitor with no reading yet
    pub fn new(sensor: S) -> Self {
        Self {
            sensor,
            last_c: None,
            failures: 0,
        }
    }

    /// Take a new reading
    ///
    /// On error, including a NaN conversion, the previous reading is kept
    /// and the error returned.
    pub fn update(&mut self) -> Result<f32, SensorError> {
        let reading = self
            .sensor
            .read_celsius()
            .and_then(|c| if c.is_nan() { Err(SensorError::NotANumber) } else { Ok(c) });

        match reading {
            Ok(celsius) => {
                self.last_c = Some(celsius);
                self.failures = 0;
                Ok(celsius)
            }
            Err(e) => {
                self.failures = self.failures.saturating_add(1);
                warn!("sensor read failed ({} in a row): {}", self.failures, e);
                Err(e)
            }
        }
    }

    /// Last valid reading in degrees Celsius
    pub fn celsius(&self) -> Option<f32> {
        self.last_c
    }

    /// Last valid reading in degrees Fahrenheit
    pub fn fahrenheit(&self) -> Option<f32> {
        self.last_c.map(celsius_to_fahrenheit)
    }

    /// Number of consecutive failed updates
    pub fn consecutive_failures(&self) -> u16 {
        self.failures
    }

    pub fn sensor(&mut self) -> &mut S {
        &mut self.sensor
    }
}
