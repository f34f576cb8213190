//! Pressure signal conditioning
//!
//! Raw converter counts become bar, are smoothed, calmed by a hysteresis
//! filter and finally turned into a quantized cylinder force.

pub mod conditioner;

pub use conditioner::{
    force_from_bar, gauge_position, quantize_force, CalmFilter, PressureConditioner,
    PressureSample, CALM_RUN_LENGTH, GAUGE_POSITIONS, SMOOTHING_WEIGHT,
};
