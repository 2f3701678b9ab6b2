//! Temperature sensor drivers

pub mod dht;

pub use dht::{Dht, DhtBus, DhtModel, DhtReading, GpioDhtBus};
