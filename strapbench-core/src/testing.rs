//! Mock collaborators shared by the unit tests

use crate::rig::Valves;
use crate::store::{CounterKey, CounterStore, COUNTER_COUNT};
use crate::timer::elapsed;
use crate::traits::Actuator;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum StrokePhase {
    #[default]
    Idle,
    Extending(u32),
    Retracting(u32),
    Done,
}

/// Valve with a real timed stroke
#[derive(Debug, Default)]
pub struct MockValve {
    pub on: bool,
    phase: StrokePhase,
}

impl Actuator for MockValve {
    fn set(&mut self, on: bool) {
        self.on = on;
        self.phase = StrokePhase::Idle;
    }

    fn get_state(&self) -> bool {
        self.on
    }

    fn stroke(&mut self, now_ms: u32, extend_ms: u32, retract_ms: u32) {
        match self.phase {
            StrokePhase::Idle => {
                self.on = true;
                self.phase = StrokePhase::Extending(now_ms);
            }
            StrokePhase::Extending(start) if elapsed(now_ms, start, extend_ms) => {
                self.on = false;
                self.phase = StrokePhase::Retracting(now_ms);
            }
            StrokePhase::Retracting(start) if elapsed(now_ms, start, retract_ms) => {
                self.phase = StrokePhase::Done;
            }
            _ => {}
        }
    }

    fn stroke_completed(&mut self) -> bool {
        if self.phase == StrokePhase::Done {
            self.phase = StrokePhase::Idle;
            true
        } else {
            false
        }
    }
}

pub fn valves() -> Valves<MockValve> {
    Valves::new(core::array::from_fn(|_| MockValve::default()))
}

/// In-memory counter store seeded with defaults
#[derive(Debug, Clone)]
pub struct MockStore {
    values: [i32; COUNTER_COUNT],
}

impl MockStore {
    pub fn new() -> Self {
        Self {
            values: CounterKey::ALL.map(CounterKey::default_value),
        }
    }
}

impl CounterStore for MockStore {
    fn get(&self, key: CounterKey) -> i32 {
        self.values[key.slot() as usize]
    }

    fn set(&mut self, key: CounterKey, value: i32) {
        self.values[key.slot() as usize] = value;
    }
}
