//! Strapbench Hardware Abstraction Layer
//!
//! This crate defines hardware abstraction traits that can be implemented
//! by chip-specific HALs. The rig engine and its drivers only ever see
//! these traits, so the same sequencing code runs on the RP2040 board and
//! in host-side tests.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  strapbench-firmware                    │
//! └─────────────────────────────────────────┘
//!          │                      │
//!          ▼                      ▼
//! ┌──────────────────┐   ┌──────────────────┐
//! │ strapbench-      │   │ strapbench-core  │
//! │ drivers          │──▶│ (engine)         │
//! └──────────────────┘   └──────────────────┘
//!          │
//!          ▼
//! ┌─────────────────────────────────────────┐
//! │  strapbench-hal (this crate - traits)   │
//! └─────────────────────────────────────────┘
//!          │
//!          ▼
//! ┌─────────────────────────────────────────┐
//! │  strapbench-hal-rp2040                  │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::ValveOutput`], [`gpio::SensorInput`] - Valve coils and sensor lines
//! - [`analog::AnalogInput`] - Raw ADC counts (pressure transducer)
//! - [`flash::FlashStorage`] - Persistent key-value storage

#![no_std]
#![deny(unsafe_code)]

pub mod analog;
pub mod flash;
pub mod gpio;

// Re-export key traits at crate root for convenience
pub use analog::AnalogInput;
pub use flash::{FlashError, FlashStorage, StorageKey};
pub use gpio::{SensorInput, ValveOutput};
