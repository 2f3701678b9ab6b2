//! Hardware abstraction traits
//!
//! These traits define the interface between the logging logic and
//! sensor-specific implementations. Storage and console traits live in
//! `thermolog-hal`.

pub mod sensor;

pub use sensor::{SensorError, TemperatureSensor};
