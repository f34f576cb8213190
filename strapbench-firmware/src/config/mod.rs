//! Configuration and counter persistence
//!
//! The rig configuration comes from a TOML copy in flash or the embedded
//! rig.toml; durable counters live under their own flash keys.

pub mod counters;
pub mod loader;

pub use counters::{load_counters, save_counter};
pub use loader::{ConfigPersistence, LoadError};
