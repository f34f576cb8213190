//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in strapbench-core on top of the strapbench-hal pin traits:
//!
//! - Cylinders (solenoid valve with timed double stroke)
//! - Debounced digital inputs (strap detectors, limit switches, buttons)
//! - Pressure transducer on an analog channel
//! - Input sampler assembling one tick's [`SensorInputs`](strapbench_core::traits::SensorInputs)
//! - RAM-cached counter bank with dirty tracking for flash write-back

#![no_std]
#![deny(unsafe_code)]

pub mod actuator;
pub mod input;
pub mod sensor;
pub mod store;
