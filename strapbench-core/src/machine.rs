//! Control loop
//!
//! [`Machine`] is the explicit machine context: it owns every piece of
//! process state and runs one tick at a time. Within a tick the order is
//! fixed: condition pressure, poll the counter reset button, check the
//! strap, check the stall deadline, dispatch on the mode, then apply what
//! the active step reported.

use heapless::Vec;

use crate::config::RigConfig;
use crate::pressure::{gauge_position, PressureConditioner, PressureSample};
use crate::rig::{Valve, Valves};
use crate::safety::{MaterialChange, StallAction, SupervisoryMonitor};
use crate::sequence::{Sequencer, StepContext, StepReport};
use crate::state::{Dispatch, Event, Mode, ModeController, ModeEvent};
use crate::status::{Snapshot, StatusMessage};
use crate::store::{self, CounterKey, CounterStore, Direction};
use crate::timer::Delay;
use crate::traits::{Actuator, SensorInputs};

/// Events one tick can raise
///
/// Worst case is seven: long counter cleared, strap edge, stall action,
/// step entered or reset resolved, cycle counted, cooldown started and
/// cooldown finished.
pub const MAX_EVENTS: usize = 8;

/// Events raised during one tick
pub type Events = Vec<Event, MAX_EVENTS>;

/// Operator commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// Run/pause
    ToggleRunning,
    /// Switch between step and auto mode
    ToggleMode,
    StepForward,
    StepBack,
    /// Full reset: idle valves, first step, step mode, escalation cleared
    ResetMachine,
    /// Move a bounded setpoint one step
    Adjust { key: CounterKey, direction: Direction },
    /// Service page: flip one valve
    ToggleValve(Valve),
    /// Service page: hold-to-run valve buttons
    SetValve { valve: Valve, on: bool },
    /// Counter reset button went down
    CounterResetPressed,
    /// Counter reset button came up
    CounterResetReleased,
}

fn emit(events: &mut Events, event: Event) {
    let pushed = events.push(event);
    debug_assert!(pushed.is_ok(), "tick raised more than MAX_EVENTS events");
}

/// The strapping rig
pub struct Machine<A: Actuator, S: CounterStore> {
    config: RigConfig,
    valves: Valves<A>,
    store: S,
    conditioner: PressureConditioner,
    sequencer: Sequencer,
    mode: ModeController,
    monitor: SupervisoryMonitor,
    status: StatusMessage,
    cooldown_remaining_ms: u32,
    counter_reset_hold: Delay,
}

impl<A: Actuator, S: CounterStore> Machine<A, S> {
    /// Create the machine in its power-on state
    ///
    /// Main air closed, tool held down, first step selected, step mode,
    /// stopped.
    pub fn new(config: RigConfig, mut valves: Valves<A>, store: S) -> Self {
        valves.power_on();
        Self {
            conditioner: PressureConditioner::new(&config),
            monitor: SupervisoryMonitor::new(config.stall_timeout_ms),
            config,
            valves,
            store,
            sequencer: Sequencer::new(),
            mode: ModeController::new(),
            status: StatusMessage::None,
            cooldown_remaining_ms: 0,
            counter_reset_hold: Delay::new(),
        }
    }

    /// Run one control tick
    pub fn tick(&mut self, now_ms: u32, inputs: &SensorInputs) -> Events {
        let mut events = Events::new();

        let pressure = self.conditioner.update(inputs.pressure_raw);
        self.poll_counter_reset(now_ms, &mut events);
        self.check_material(inputs, &mut events);
        if self.check_stall(now_ms, &mut events) {
            // Reset mode resolves on the next tick
            return events;
        }

        let mut report = StepReport::default();
        match self.mode.dispatch() {
            Dispatch::DriveSequencer => {
                let mut ctx = StepContext {
                    now_ms,
                    valves: &mut self.valves,
                    store: &mut self.store,
                    pressure: &pressure,
                    inputs,
                    config: &self.config,
                    report: &mut report,
                };
                if let Some(kind) = self.sequencer.tick(self.mode.is_running(), &mut ctx) {
                    emit(&mut events, Event::StepEntered(kind));
                }
                self.sequencer.advance_if_completed();
                self.consume_step_switch(now_ms);
            }
            Dispatch::ResolveReset => {
                if let Some(auto) = self.mode.resolve_reset() {
                    self.sequencer.take_step_switch();
                    self.monitor.refresh_deadline(now_ms);
                    emit(&mut events, Event::ResetResolved { auto });
                }
            }
            Dispatch::Hold => {}
        }

        self.apply_report(&report, now_ms, &mut events);
        events
    }

    /// Apply one operator command
    pub fn command(&mut self, command: Command, now_ms: u32) -> Option<Event> {
        match command {
            Command::ToggleRunning => self.mode.toggle_running(),
            Command::ToggleMode => self.mode.toggle_step_auto(),
            Command::StepForward | Command::StepBack => {
                // Only an operator reset leaves error mode
                if self.mode.mode() != Mode::Error {
                    self.mode.apply(ModeEvent::ForceStep);
                    if command == Command::StepForward {
                        self.sequencer.step_forward();
                    } else {
                        self.sequencer.step_back();
                    }
                    // Already stopped; the switch is the operator's own
                    self.sequencer.take_step_switch();
                }
            }
            Command::ResetMachine => {
                self.reset_machine(now_ms);
                return Some(Event::MachineReset);
            }
            Command::Adjust { key, direction } => {
                store::adjust(&mut self.store, key, direction);
            }
            Command::ToggleValve(valve) => self.valves.toggle(valve),
            Command::SetValve { valve, on } => self.valves.set(valve, on),
            Command::CounterResetPressed => {
                self.store.set(CounterKey::ShortCounter, 0);
                self.counter_reset_hold.reset(now_ms);
                return Some(Event::ShortCounterCleared);
            }
            Command::CounterResetReleased => self.counter_reset_hold.set_unstarted(),
        }
        None
    }

    /// Read-only projection for displays
    pub fn snapshot(&self) -> Snapshot {
        let pressure = self.conditioner.sample();
        let step = self.sequencer.current();
        Snapshot {
            step_index: self.sequencer.index() as u8,
            step: step.kind(),
            step_name: step.name(),
            running: self.mode.is_running(),
            mode: self.mode.mode(),
            pressure_bar: pressure.calmed_bar,
            force: pressure.force,
            gauge: gauge_position(pressure.force, self.config.max_tool_force),
            stall_count: self.monitor.stall_count(),
            short_counter: self.store.get(CounterKey::ShortCounter),
            long_counter: self.store.get(CounterKey::LongCounter),
            cooldown_remaining_s: self.cooldown_remaining_ms.div_ceil(1000),
            status: self.status,
            valves: self.valves.bitmask(),
        }
    }

    pub fn config(&self) -> &RigConfig {
        &self.config
    }

    pub fn mode(&self) -> Mode {
        self.mode.mode()
    }

    pub fn is_running(&self) -> bool {
        self.mode.is_running()
    }

    pub fn status(&self) -> StatusMessage {
        self.status
    }

    pub fn pressure(&self) -> PressureSample {
        self.conditioner.sample()
    }

    pub fn sequencer(&self) -> &Sequencer {
        &self.sequencer
    }

    pub fn monitor(&self) -> &SupervisoryMonitor {
        &self.monitor
    }

    pub fn valves(&self) -> &Valves<A> {
        &self.valves
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    fn poll_counter_reset(&mut self, now_ms: u32, events: &mut Events) {
        if self
            .counter_reset_hold
            .elapsed_at_least(now_ms, self.config.counter_reset_hold_ms)
        {
            self.counter_reset_hold.set_unstarted();
            self.store.set(CounterKey::LongCounter, 0);
            emit(events, Event::LongCounterCleared);
        }
    }

    fn check_material(&mut self, inputs: &SensorInputs, events: &mut Events) {
        if self.config.dry_run {
            return;
        }
        let present = inputs.material_present();

        match self.monitor.check_material(present) {
            Some(MaterialChange::Missing) => {
                emit(events, Event::MaterialMissing);
                if self.status != StatusMessage::Stopped {
                    self.status = StatusMessage::NoStrap;
                    if self.config.material_absence_is_error {
                        self.mode.enter_error();
                    }
                }
            }
            Some(MaterialChange::Restored) => {
                emit(events, Event::MaterialRestored);
                if self.status == StatusMessage::NoStrap {
                    self.status = StatusMessage::None;
                    self.mode.clear_error();
                }
            }
            None => {}
        }

        if !present {
            self.mode.stop();
        }
    }

    /// Returns true when a soft recovery put the machine into reset mode
    fn check_stall(&mut self, now_ms: u32, events: &mut Events) -> bool {
        match self.monitor.check_stall(now_ms, self.mode.is_running()) {
            StallAction::None => false,
            StallAction::SoftRecovery { attempt } => {
                self.valves.reset_to_idle();
                self.sequencer.activate(0);
                self.mode.enter_reset(self.mode.mode() == Mode::Auto);
                self.status = StatusMessage::Retry(attempt);
                self.cooldown_remaining_ms = 0;
                emit(events, Event::StallRecovery { attempt });
                true
            }
            StallAction::HardStop => {
                self.valves.hard_stop();
                self.mode.enter_error();
                self.status = StatusMessage::Stopped;
                emit(events, Event::HardStop);
                false
            }
        }
    }

    /// Step mode stops after every switch; auto mode only restarts the
    /// stall deadline
    fn consume_step_switch(&mut self, now_ms: u32) {
        if !self.sequencer.take_step_switch() {
            return;
        }
        self.cooldown_remaining_ms = 0;
        match self.mode.mode() {
            Mode::Step => self.mode.stop(),
            _ => self.monitor.refresh_deadline(now_ms),
        }
    }

    fn apply_report(&mut self, report: &StepReport, now_ms: u32, events: &mut Events) {
        if report.cycle_closed {
            self.monitor.clear_escalation();
            if self.status != StatusMessage::NoStrap {
                self.status = StatusMessage::None;
            }
        }
        if let Some((short, long)) = report.cycle_counted {
            emit(events, Event::CycleCompleted { short, long });
        }
        if let Some(seconds) = report.cooldown_started {
            emit(events, Event::CooldownStarted { seconds });
        }
        if let Some(remaining) = report.cooldown_remaining_ms {
            // A deliberate pause is not a stall
            self.monitor.refresh_deadline(now_ms);
            self.cooldown_remaining_ms = remaining;
        }
        if report.cooldown_finished {
            self.cooldown_remaining_ms = 0;
            emit(events, Event::CooldownFinished);
        }
    }

    fn reset_machine(&mut self, now_ms: u32) {
        self.valves.reset_to_idle();
        self.mode.apply(ModeEvent::OperatorReset);
        self.sequencer.activate(0);
        // The operator chose the step; a later run must not stop on it
        self.sequencer.take_step_switch();
        self.status = StatusMessage::None;
        self.cooldown_remaining_ms = 0;
        self.monitor.clear_escalation();
        self.monitor.reset_material();
        self.monitor.refresh_deadline(now_ms);
    }
}
