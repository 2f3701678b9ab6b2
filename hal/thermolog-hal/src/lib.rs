//! Thermolog Hardware Abstraction Layer
//!
//! This crate defines the boundary traits the logger core consumes. Boards
//! implement them directly or through the adapters provided here, so the
//! same logging code runs against an AVR EEPROM, an I2C EEPROM, or a plain
//! byte array on the host.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  thermolog-core (CircularStore, logger) │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  thermolog-hal (this crate - traits)    │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │  embedded-    │       │  embedded-io  │
//! │  storage      │       │  serial port  │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`storage::RawStorage`] - Byte-addressable non-volatile memory
//! - [`console::Console`] - Interactive text channel
//!
//! Blocking delays use [`embedded_hal::delay::DelayNs`] directly.

#![no_std]
#![deny(unsafe_code)]

pub mod console;
pub mod ram;
pub mod storage;

// Re-export key traits at crate root for convenience
pub use console::{BufferedConsole, Console, SerialConsole};
pub use embedded_hal::delay::DelayNs;
pub use ram::RamStorage;
pub use storage::{EmbeddedStorage, RawStorage, StorageError};
