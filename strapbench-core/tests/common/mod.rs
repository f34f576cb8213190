//! Simulated rig for driving the full machine on the host

#![allow(dead_code)]

use strapbench_core::config::RigConfig;
use strapbench_core::machine::{Command, Events, Machine};
use strapbench_core::rig::{Valve, Valves};
use strapbench_core::state::Event;
use strapbench_core::store::{CounterKey, CounterStore, COUNTER_COUNT};
use strapbench_core::timer::elapsed;
use strapbench_core::traits::{Actuator, SensorInputs};

pub const TICK_MS: u32 = 10;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum Phase {
    #[default]
    Idle,
    Extending(u32),
    Retracting(u32),
    Done,
}

#[derive(Debug, Default)]
pub struct SimValve {
    on: bool,
    phase: Phase,
}

impl Actuator for SimValve {
    fn set(&mut self, on: bool) {
        self.on = on;
        self.phase = Phase::Idle;
    }

    fn get_state(&self) -> bool {
        self.on
    }

    fn stroke(&mut self, now_ms: u32, extend_ms: u32, retract_ms: u32) {
        match self.phase {
            Phase::Idle => {
                self.on = true;
                self.phase = Phase::Extending(now_ms);
            }
            Phase::Extending(start) if elapsed(now_ms, start, extend_ms) => {
                self.on = false;
                self.phase = Phase::Retracting(now_ms);
            }
            Phase::Retracting(start) if elapsed(now_ms, start, retract_ms) => {
                self.phase = Phase::Done;
            }
            _ => {}
        }
    }

    fn stroke_completed(&mut self) -> bool {
        if self.phase == Phase::Done {
            self.phase = Phase::Idle;
            true
        } else {
            false
        }
    }
}

#[derive(Debug, Clone)]
pub struct MemStore {
    values: [i32; COUNTER_COUNT],
}

impl MemStore {
    pub fn new() -> Self {
        Self {
            values: CounterKey::ALL.map(CounterKey::default_value),
        }
    }
}

impl CounterStore for MemStore {
    fn get(&self, key: CounterKey) -> i32 {
        self.values[key.slot() as usize]
    }

    fn set(&mut self, key: CounterKey, value: i32) {
        self.values[key.slot() as usize] = value;
    }
}

/// Machine plus a crude physical model of the spring cylinder
pub struct Rig {
    pub machine: Machine<SimValve, MemStore>,
    pub now_ms: u32,
    pub bar: f32,
    pub strap: bool,
    /// Spring reached the end position when tensioning
    pub end_switch_works: bool,
    at_start: bool,
    counts_per_bar: f32,
}

impl Rig {
    pub fn new(config: RigConfig) -> Self {
        let counts_per_bar = config.counts_per_bar;
        let valves = Valves::new(core::array::from_fn(|_| SimValve::default()));
        Self {
            machine: Machine::new(config, valves, MemStore::new()),
            now_ms: 0,
            bar: 0.0,
            strap: true,
            end_switch_works: true,
            at_start: true,
            counts_per_bar,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(RigConfig::default())
    }

    fn simulate(&mut self) -> SensorInputs {
        let valves = self.machine.valves();
        let supply = valves.is_on(Valve::SpringSupply);
        let exhaust = valves.is_on(Valve::SpringExhaust);

        if supply && exhaust {
            self.bar = (self.bar + 0.02).min(4.0);
        } else if !exhaust {
            self.bar *= 0.9;
        }
        if supply && !exhaust {
            self.at_start = true;
        }
        if valves.is_on(Valve::TensionKey) {
            self.at_start = false;
        }

        SensorInputs {
            pressure_raw: (self.bar * self.counts_per_bar) as u16,
            strap_upper: self.strap,
            strap_lower: self.strap,
            start_position: self.at_start,
            end_position: self.end_switch_works && valves.is_on(Valve::TensionKey),
        }
    }

    pub fn tick(&mut self) -> Events {
        self.now_ms += TICK_MS;
        let inputs = self.simulate();
        self.machine.tick(self.now_ms, &inputs)
    }

    pub fn command(&mut self, command: Command) -> Option<Event> {
        self.machine.command(command, self.now_ms)
    }

    /// Switch to auto mode and start running
    pub fn start_auto(&mut self) {
        self.command(Command::ToggleMode);
        self.command(Command::ToggleRunning);
    }

    /// Tick until `pred` matches an event, for at most `limit_ms`
    pub fn run_until(&mut self, limit_ms: u32, pred: impl Fn(&Event) -> bool) -> Option<Event> {
        let end = self.now_ms + limit_ms;
        while self.now_ms < end {
            if let Some(e) = self.tick().into_iter().find(|e| pred(e)) {
                return Some(e);
            }
        }
        None
    }

    /// Tick for `ms`, collecting every event
    pub fn run_for(&mut self, ms: u32) -> std::vec::Vec<Event> {
        let end = self.now_ms + ms;
        let mut all = std::vec::Vec::new();
        while self.now_ms < end {
            all.extend(self.tick());
        }
        all
    }
}
