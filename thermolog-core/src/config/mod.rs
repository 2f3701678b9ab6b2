//! Configuration types
//!
//! Logger settings and their postcard-encoded home on the raw medium.

pub mod persist;
pub mod types;

pub use persist::{ConfigRegion, CONFIG_MAGIC, CONFIG_VERSION, DEFAULT_CONFIG_REGION};
pub use types::*;
