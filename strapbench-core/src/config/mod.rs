//! Configuration types
//!
//! Rig constants and policy flags. Defaults match the bench rig; a TOML
//! file can override any of them at boot.

pub mod rig;
pub mod toml;

pub use rig::*;
pub use toml::{parse_rig_config, ParseError};
