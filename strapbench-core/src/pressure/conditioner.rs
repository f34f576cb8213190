//! Pressure conditioner implementation

use crate::config::RigConfig;

/// Weight of the previous value in the smoothing filter
pub const SMOOTHING_WEIGHT: f32 = 4.0;

/// Consecutive same-direction samples needed to move the calmed value
pub const CALM_RUN_LENGTH: i32 = 5;

/// Highest force gauge position
pub const GAUGE_POSITIONS: u8 = 11;

fn abs(x: f32) -> f32 {
    if x < 0.0 {
        -x
    } else {
        x
    }
}

/// One tick's conditioned pressure
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PressureSample {
    /// Converter counts as read
    pub raw_counts: u16,
    /// Counts scaled to bar
    pub raw_bar: f32,
    /// Low-pass filtered value [bar]
    pub smoothed_bar: f32,
    /// Hysteresis-confirmed value [bar]
    pub calmed_bar: f32,
    /// Cylinder force from the calmed value, multiple of 10 [N]
    pub force: i32,
}

/// Round a force down to a multiple of 10 N; negative forces read as 0
pub fn quantize_force(force: i32) -> i32 {
    (force.max(0) / 10) * 10
}

/// Convert a pressure to quantized force
pub fn force_from_bar(bar: f32, force_per_bar: f32) -> i32 {
    // `as` saturates and maps NaN to 0
    quantize_force((bar * force_per_bar) as i32)
}

/// Force gauge needle position, `0..=GAUGE_POSITIONS`
pub fn gauge_position(force: i32, max_tool_force: i32) -> u8 {
    if force <= 0 || max_tool_force <= 0 {
        return 0;
    }
    let scaled = force as f32 / max_tool_force as f32 * GAUGE_POSITIONS as f32;
    let rounded = (scaled + 0.5) as i32;
    rounded.clamp(0, GAUGE_POSITIONS as i32) as u8
}

/// Hysteresis "calming" filter
///
/// Keeps a signed run length of samples above (positive) or below
/// (negative) the calmed value. A sample on the other side ends the run.
/// After [`CALM_RUN_LENGTH`] samples the run's mean becomes the new calmed
/// value, provided it moved by more than the deadband.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalmFilter {
    counter: i32,
    sum: f32,
    calmed: f32,
    prev_calmed: f32,
    deadband: f32,
}

impl CalmFilter {
    pub fn new(deadband: f32) -> Self {
        Self {
            counter: 0,
            sum: 0.0,
            calmed: 0.0,
            prev_calmed: 0.0,
            deadband,
        }
    }

    /// Current calmed value
    pub fn value(&self) -> f32 {
        self.calmed
    }

    /// Signed length of the current run
    pub fn run_length(&self) -> i32 {
        self.counter
    }

    /// Feed one smoothed sample, returning the calmed value
    pub fn push(&mut self, sample: f32) -> f32 {
        if sample > self.calmed {
            if self.counter >= 0 {
                self.counter += 1;
                self.sum += sample;
            } else {
                self.restart_run();
            }
        } else if sample < self.calmed {
            if self.counter <= 0 {
                self.counter -= 1;
                self.sum += sample;
            } else {
                self.restart_run();
            }
        }

        if self.counter.abs() >= CALM_RUN_LENGTH {
            let candidate = self.sum / self.counter.abs() as f32;
            if abs(candidate - self.prev_calmed) > self.deadband {
                self.calmed = candidate;
                self.prev_calmed = candidate;
            }
            self.restart_run();
        }

        self.calmed
    }

    fn restart_run(&mut self) {
        self.counter = 0;
        self.sum = 0.0;
    }
}

/// Raw counts to force pipeline
///
/// Holds the filter state across ticks; create one per sensor.
#[derive(Debug, Clone)]
pub struct PressureConditioner {
    counts_per_bar: f32,
    force_per_bar: f32,
    smoothed: f32,
    calm: CalmFilter,
    sample: PressureSample,
}

impl PressureConditioner {
    /// Create a conditioner from the rig's instrument constants
    pub fn new(config: &RigConfig) -> Self {
        Self {
            counts_per_bar: config.counts_per_bar,
            force_per_bar: config.force_per_bar,
            smoothed: 0.0,
            calm: CalmFilter::new(config.calm_deadband_bar),
            sample: PressureSample::default(),
        }
    }

    /// Run one raw reading through the pipeline
    pub fn update(&mut self, raw_counts: u16) -> PressureSample {
        let raw_bar = raw_counts as f32 / self.counts_per_bar;
        self.smoothed = (self.smoothed * SMOOTHING_WEIGHT + raw_bar) / (SMOOTHING_WEIGHT + 1.0);
        let calmed_bar = self.calm.push(self.smoothed);

        self.sample = PressureSample {
            raw_counts,
            raw_bar,
            smoothed_bar: self.smoothed,
            calmed_bar,
            force: force_from_bar(calmed_bar, self.force_per_bar),
        };
        self.sample
    }

    /// Last conditioned sample
    pub fn sample(&self) -> PressureSample {
        self.sample
    }
}
