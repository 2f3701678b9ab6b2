//! DHT11 / DHT22 temperature and humidity sensor
//!
//! Single-wire sensors common on hobby boards. One transfer yields a
//! 5-byte frame:
//!
//! ```text
//! ┌────────────┬────────────┬────────────┬────────────┬──────────┐
//! │ humidity H │ humidity L │ temp H     │ temp L     │ checksum │
//! └────────────┴────────────┴────────────┴────────────┴──────────┘
//! ```
//!
//! The checksum is the low byte of the sum of the first four bytes.
//! DHT22 sends tenths as 16-bit values with bit 15 of the temperature as a
//! sign flag; DHT11 sends whole units in the high byte and tenths in the low
//! byte.
//!
//! The sensor needs about two seconds between conversions; sampling faster
//! returns the previous conversion or times out.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use thermolog_core::traits::{SensorError, TemperatureSensor};

/// Bits in one transfer
const FRAME_BITS: usize = 40;

/// High pulses longer than this are a `1` bit (nominal 26-28us vs 70us)
const ONE_BIT_THRESHOLD_US: u32 = 40;

/// Longest any single line level may last during a transfer
const LEVEL_TIMEOUT_US: u32 = 100;

/// Sensor variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DhtModel {
    /// DHT11: 0-50°C, 1°C resolution
    Dht11,
    /// DHT22 / AM2302: -40-80°C, 0.1°C resolution
    Dht22,
}

impl DhtModel {
    /// How long the host holds the line low to request a conversion
    pub fn start_signal_ms(self) -> u32 {
        match self {
            DhtModel::Dht11 => 18,
            DhtModel::Dht22 => 1,
        }
    }

    /// Rated temperature range in °C
    pub fn range_c(self) -> (f32, f32) {
        match self {
            DhtModel::Dht11 => (0.0, 50.0),
            DhtModel::Dht22 => (-40.0, 80.0),
        }
    }
}

/// One decoded conversion
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DhtReading {
    /// Temperature in °C
    pub celsius: f32,
    /// Relative humidity in %
    pub humidity: f32,
}

/// Single-wire transfer trait for platform abstraction
///
/// Performs the start handshake and returns the raw 5-byte frame.
pub trait DhtBus {
    fn read_frame(&mut self, model: DhtModel) -> Result<[u8; 5], SensorError>;
}

/// Pack measured high-pulse widths into frame bytes, MSB first
pub fn pulses_to_frame(high_us: &[u32; FRAME_BITS]) -> [u8; 5] {
    let mut frame = [0u8; 5];
    for (bit, &width) in high_us.iter().enumerate() {
        if width > ONE_BIT_THRESHOLD_US {
            frame[bit / 8] |= 0x80 >> (bit % 8);
        }
    }
    frame
}

/// Validate and decode a raw frame
pub fn decode_frame(model: DhtModel, frame: &[u8; 5]) -> Result<DhtReading, SensorError> {
    let sum = frame[..4].iter().fold(0u8, |acc, &b| acc.wrapping_add(b));
    if sum != frame[4] {
        return Err(SensorError::Checksum);
    }

    let reading = match model {
        DhtModel::Dht11 => {
            let mut celsius = f32::from(frame[2]) + f32::from(frame[3] & 0x7F) / 10.0;
            // Newer DHT11 revisions flag sub-zero readings in the tenths byte
            if frame[3] & 0x80 != 0 {
                celsius = -celsius;
            }
            DhtReading {
                celsius,
                humidity: f32::from(frame[0]) + f32::from(frame[1]) / 10.0,
            }
        }
        DhtModel::Dht22 => {
            let raw_t = u16::from_be_bytes([frame[2] & 0x7F, frame[3]]);
            let mut celsius = f32::from(raw_t) / 10.0;
            if frame[2] & 0x80 != 0 {
                celsius = -celsius;
            }
            DhtReading {
                celsius,
                humidity: f32::from(u16::from_be_bytes([frame[0], frame[1]])) / 10.0,
            }
        }
    };

    let (min, max) = model.range_c();
    if reading.celsius < min || reading.celsius > max {
        return Err(SensorError::OutOfRange);
    }

    Ok(reading)
}

/// DHT sensor
pub struct Dht<B> {
    bus: B,
    model: DhtModel,
}

impl<B: DhtBus> Dht<B> {
    pub fn new(bus: B, model: DhtModel) -> Self {
        Self { bus, model }
    }

    pub fn model(&self) -> DhtModel {
        self.model
    }

    /// Run one conversion
    pub fn read(&mut self) -> Result<DhtReading, SensorError> {
        let frame = self.bus.read_frame(self.model)?;
        decode_frame(self.model, &frame)
    }
}

impl<B: DhtBus> TemperatureSensor for Dht<B> {
    fn read_celsius(&mut self) -> Result<f32, SensorError> {
        self.read().map(|r| r.celsius)
    }
}

/// Bit-banged bus on an open-drain GPIO
///
/// The pin must be configured open-drain with a pull-up so that driving it
/// high releases the line. Pulse widths are measured by polling at 1us
/// steps; interrupts during a transfer stretch the measurement and may
/// cost a checksum error, never a wrong value.
pub struct GpioDhtBus<P, D> {
    pin: P,
    delay: D,
}

impl<P, D> GpioDhtBus<P, D>
where
    P: InputPin + OutputPin,
    D: DelayNs,
{
    pub fn new(pin: P, delay: D) -> Self {
        Self { pin, delay }
    }

    /// Consume the bus and return the pin and delay
    pub fn release(self) -> (P, D) {
        (self.pin, self.delay)
    }

    /// Wait while the line stays at `level`, returning how long that took
    fn wait_while(&mut self, level: bool) -> Result<u32, SensorError> {
        let mut elapsed_us = 0;
        while self.pin.is_high().map_err(|_| SensorError::Timeout)? == level {
            if elapsed_us >= LEVEL_TIMEOUT_US {
                return Err(SensorError::Timeout);
            }
            self.delay.delay_us(1);
            elapsed_us += 1;
        }
        Ok(elapsed_us)
    }
}

impl<P, D> DhtBus for GpioDhtBus<P, D>
where
    P: InputPin + OutputPin,
    D: DelayNs,
{
    fn read_frame(&mut self, model: DhtModel) -> Result<[u8; 5], SensorError> {
        // Start signal
        self.pin.set_low().map_err(|_| SensorError::Timeout)?;
        self.delay.delay_ms(model.start_signal_ms());
        self.pin.set_high().map_err(|_| SensorError::Timeout)?;

        // Sensor acknowledges with ~80us low then ~80us high
        self.wait_while(true)?;
        self.wait_while(false)?;
        self.wait_while(true)?;

        // Each bit: ~50us low, then a high pulse whose width is the value
        let mut high_us = [0u32; FRAME_BITS];
        for width in high_us.iter_mut() {
            self.wait_while(false)?;
            *width = self.wait_while(true)?;
        }

        Ok(pulses_to_frame(&high_us))
    }
}
