//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in thermolog-core for various hardware components:
//!
//! - Temperature/humidity sensors (DHT11, DHT22/AM2302)

#![no_std]
#![deny(unsafe_code)]

pub mod sensor;
