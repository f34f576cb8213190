//! RP2040-specific HAL for the strapping rig firmware
//!
//! This crate provides RP2040 implementations of the shared
//! `strapbench-hal` traits:
//!
//! - GPIO output wrappers for the valve bank
//! - GPIO input wrappers for sensors and panel buttons
//! - Blocking ADC channel for the pressure transducer
//! - Flash storage driver (implements `strapbench_hal::FlashStorage`)

#![no_std]

pub mod adc;
pub mod flash;
pub mod gpio;

// Re-export shared traits from strapbench-hal for convenience
pub use strapbench_hal::{FlashStorage as FlashStorageTrait, StorageKey};
