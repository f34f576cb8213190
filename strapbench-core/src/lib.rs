//! Board-agnostic core logic for the strapping test rig firmware
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Collaborator traits (actuator, digital input, analog sensor)
//! - Non-blocking timers over a millisecond clock
//! - Pressure signal conditioning (smoothing, calming, force)
//! - The step catalogue and the step sequencer
//! - Machine mode controller (step / auto / reset / error)
//! - Supervisory monitor (material presence, stall escalation)
//! - Durable counter contract and operator bounds
//! - Rig configuration and its TOML subset parser
//! - The control loop tying it together ([`machine::Machine`])

#![no_std]
#![deny(unsafe_code)]

pub mod config;
pub mod machine;
pub mod pressure;
pub mod rig;
pub mod safety;
pub mod sequence;
pub mod state;
pub mod status;
pub mod store;
pub mod timer;
pub mod traits;

#[cfg(test)]
pub(crate) mod testing;
