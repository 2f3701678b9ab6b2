//! Temperature sensor trait

/// Errors that can occur with temperature sensing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorError {
    /// Sensor did not respond in time
    Timeout,
    /// Transfer checksum mismatch
    Checksum,
    /// Conversion produced no number
    NotANumber,
    /// Reading out of the sensor's rated range
    OutOfRange,
}

/// Trait for temperature sensors
///
/// Implementations handle the specific sensor type (DHT, thermistor,
/// thermocouple, ...). Takes `&mut self` because bus transfers and ADC
/// reads typically require mutable access.
pub trait TemperatureSensor {
    /// Read the current temperature in degrees Celsius
    fn read_celsius(&mut self) -> Result<f32, SensorError>;

    /// Check if the sensor currently produces a reading
    fn is_valid(&mut self) -> bool {
        self.read_celsius().is_ok()
    }
}

impl<T: TemperatureSensor + ?Sized> TemperatureSensor for &mut T {
    fn read_celsius(&mut self) -> Result<f32, SensorError> {
        (**self).read_celsius()
    }
}
