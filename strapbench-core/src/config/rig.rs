//! Rig configuration definitions

use heapless::String;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum label length
pub const MAX_LABEL_LEN: usize = 16;

/// Configuration validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Tick interval must be non-zero
    ZeroTickInterval,
    /// Stall timeout shorter than one tick
    StallTimeoutTooShort,
    /// Converter scale must be positive
    InvalidPressureScale,
    /// Force factor must be positive
    InvalidForceFactor,
    /// Deadband and vent threshold must not be negative
    NegativeThreshold,
    /// Tool force range must be positive
    InvalidToolForce,
    /// Stroke or settle time of zero where motion is required
    ZeroStrokeTime,
}

/// Per-step timing constants
///
/// Stroke pairs are (extend, retract) in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StepTimings {
    pub wake_extend_ms: u32,
    pub wake_retract_ms: u32,
    pub cut_extend_ms: u32,
    pub cut_retract_ms: u32,
    pub tail_feed_ms: u32,
    pub clamp_settle_ms: u32,
    /// Minimum pause between two fill pulses
    pub fill_wait_ms: u32,
    /// Minimum fill pulse length
    pub fill_pulse_ms: u32,
    /// Force margin below the setpoint that still counts as full [N]
    pub fill_margin_n: i32,
    /// Consecutive "full" checks needed to finish pressurizing
    pub fill_confirmations: u8,
    pub tension_settle_ms: u32,
    pub weld_extend_ms: u32,
    pub weld_retract_ms: u32,
    pub vent_settle_ms: u32,
    pub rocker_extend_ms: u32,
    pub rocker_retract_ms: u32,
    pub release_settle_ms: u32,
    pub return_settle_ms: u32,
}

impl Default for StepTimings {
    fn default() -> Self {
        Self {
            wake_extend_ms: 1500,
            wake_retract_ms: 1000,
            cut_extend_ms: 1500,
            cut_retract_ms: 500,
            tail_feed_ms: 500,
            clamp_settle_ms: 400,
            fill_wait_ms: 500,
            fill_pulse_ms: 100,
            fill_margin_n: 20,
            fill_confirmations: 20,
            tension_settle_ms: 400,
            weld_extend_ms: 1000,
            weld_retract_ms: 2000,
            vent_settle_ms: 4000,
            rocker_extend_ms: 1500,
            rocker_retract_ms: 1000,
            release_settle_ms: 500,
            return_settle_ms: 500,
        }
    }
}

impl StepTimings {
    fn validate(&self) -> Result<(), ConfigError> {
        let strokes = [
            self.wake_extend_ms,
            self.cut_extend_ms,
            self.weld_extend_ms,
            self.rocker_extend_ms,
            self.fill_pulse_ms,
        ];
        if strokes.iter().any(|&ms| ms == 0) || self.fill_confirmations == 0 {
            return Err(ConfigError::ZeroStrokeTime);
        }
        Ok(())
    }
}

/// Complete rig configuration
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RigConfig {
    /// Rig name shown in the boot log
    pub label: String<MAX_LABEL_LEN>,
    /// Control loop period
    pub tick_interval_ms: u32,
    /// Wait after power-on before the first tick
    pub startup_delay_ms: u32,
    /// A step running longer than this counts as a stall
    pub stall_timeout_ms: u32,
    /// Hold time on the counter reset button that also clears the long counter
    pub counter_reset_hold_ms: u32,
    /// Raw ADC counts per bar
    pub counts_per_bar: f32,
    /// Cylinder force per bar [N]
    pub force_per_bar: f32,
    /// Minimum change accepted by the calming filter [bar]
    pub calm_deadband_bar: f32,
    /// Pressure regarded as vented [bar]
    pub vent_threshold_bar: f32,
    /// Force at full scale of the force gauge [N]
    pub max_tool_force: i32,
    /// Bench mode: no strap, no position sensors
    pub dry_run: bool,
    /// Missing strap raises ERROR mode instead of only stopping
    pub material_absence_is_error: bool,
    pub timings: StepTimings,
}

impl Default for RigConfig {
    fn default() -> Self {
        let mut label = String::new();
        let _ = label.push_str("strapbench");
        Self {
            label,
            tick_interval_ms: 10,
            startup_delay_ms: 2000,
            stall_timeout_ms: 15_000,
            counter_reset_hold_ms: 5000,
            counts_per_bar: 27.778,
            force_per_bar: 1472.6,
            calm_deadband_bar: 0.0,
            vent_threshold_bar: 0.1,
            max_tool_force: 2500,
            dry_run: false,
            material_absence_is_error: false,
            timings: StepTimings::default(),
        }
    }
}

impl RigConfig {
    /// Check the configuration for values the engine cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::ZeroTickInterval);
        }
        if self.stall_timeout_ms < self.tick_interval_ms {
            return Err(ConfigError::StallTimeoutTooShort);
        }
        // NaN fails these comparisons too
        if !(self.counts_per_bar > 0.0) {
            return Err(ConfigError::InvalidPressureScale);
        }
        if !(self.force_per_bar > 0.0) {
            return Err(ConfigError::InvalidForceFactor);
        }
        if !(self.calm_deadband_bar >= 0.0) || !(self.vent_threshold_bar >= 0.0) {
            return Err(ConfigError::NegativeThreshold);
        }
        if self.max_tool_force <= 0 {
            return Err(ConfigError::InvalidToolForce);
        }
        self.timings.validate()
    }
}
