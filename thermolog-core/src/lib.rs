//! Board-agnostic core logic for the temperature logger
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Fixed-size record encoding
//! - Circular record log over raw storage, with power-cycle recovery and
//!   an operator-confirmed wipe
//! - Temperature sensor trait and last-good-value monitor
//! - Logger configuration and its persistence
//! - The periodic sample-and-store step

#![no_std]
#![deny(unsafe_code)]

// Must come first so the logging macros are visible to later modules
#[macro_use]
mod fmt;

pub mod config;
pub mod logger;
pub mod monitor;
pub mod record;
pub mod store;
pub mod traits;

pub use logger::{LogError, TemperatureLogger};
pub use record::Record;
pub use store::{CircularStore, InitError, InitOutcome, Slot, WriteError};
