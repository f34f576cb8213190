//! Step definitions
//!
//! Steps are a tagged variant: [`StepKind`] picks the behavior and
//! `StepData` holds the private state of the kinds that need any.
//! Waiting is never an error here. A step whose sensor never asserts
//! simply stays incomplete; stall detection belongs to the monitor.

use crate::config::RigConfig;
use crate::pressure::PressureSample;
use crate::rig::{Valve, Valves};
use crate::store::{CounterKey, CounterStore};
use crate::timer::Delay;
use crate::traits::{Actuator, SensorInputs};

/// Number of steps in the strapping cycle
pub const STEP_COUNT: usize = 13;

/// Stages of the strapping cycle, in cycle order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StepKind {
    /// Rocker stroke to wake the tool
    Wake,
    /// Eject strap for the configured feed time
    Feed,
    /// Cutter stroke
    Cut,
    /// Short feed for the strap tail
    TailFeed,
    /// Clamp the strap start
    Clamp,
    /// Closed-loop fill of the spring cylinder to the force setpoint
    Pressurize,
    /// Tension until the spring reaches its end position
    Tension,
    /// Weld key stroke
    Weld,
    /// Vent the spring and let the weld cool
    Vent,
    /// Rocker stroke to open the tool
    Rocker,
    /// Open the start clamp
    Release,
    /// Drive the spring back to start and count the cycle
    Return,
    /// Cycle counting and cooldown
    Pause,
}

impl StepKind {
    /// Canonical cycle order
    pub const ALL: [StepKind; STEP_COUNT] = [
        StepKind::Wake,
        StepKind::Feed,
        StepKind::Cut,
        StepKind::TailFeed,
        StepKind::Clamp,
        StepKind::Pressurize,
        StepKind::Tension,
        StepKind::Weld,
        StepKind::Vent,
        StepKind::Rocker,
        StepKind::Release,
        StepKind::Return,
        StepKind::Pause,
    ];

    /// Display name
    pub fn name(self) -> &'static str {
        match self {
            StepKind::Wake => "WAKE",
            StepKind::Feed => "FEED",
            StepKind::Cut => "CUT",
            StepKind::TailFeed => "TAIL FEED",
            StepKind::Clamp => "CLAMP",
            StepKind::Pressurize => "PRESSURIZE",
            StepKind::Tension => "TENSION",
            StepKind::Weld => "WELD",
            StepKind::Vent => "VENT",
            StepKind::Rocker => "ROCKER",
            StepKind::Release => "RELEASE",
            StepKind::Return => "RETURN",
            StepKind::Pause => "PAUSE",
        }
    }
}

/// What a step did this tick that the control loop must act on
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StepReport {
    /// Cycle counted, new (short, long) counter values
    pub cycle_counted: Option<(i32, i32)>,
    /// Pause step entered: the cycle closed cleanly
    pub cycle_closed: bool,
    /// Cooldown began, length in seconds
    pub cooldown_started: Option<u32>,
    /// Cooldown in progress, milliseconds left
    pub cooldown_remaining_ms: Option<u32>,
    /// Cooldown elapsed this tick
    pub cooldown_finished: bool,
}

/// Everything a step may read or command during one tick
pub struct StepContext<'a, A: Actuator, S: CounterStore> {
    pub now_ms: u32,
    pub valves: &'a mut Valves<A>,
    pub store: &'a mut S,
    pub pressure: &'a PressureSample,
    pub inputs: &'a SensorInputs,
    pub config: &'a RigConfig,
    pub report: &'a mut StepReport,
}

/// Private per-step state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum StepData {
    None,
    Feed {
        feed_time_ms: u32,
    },
    Pressurize {
        wait: Delay,
        fill: Delay,
        full_count: u8,
    },
    Pause {
        cycles: u8,
        cooldown_ms: u32,
    },
}

/// One step of the cycle with its latches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Step {
    kind: StepKind,
    entered: bool,
    completed: bool,
    delay: Delay,
    data: StepData,
}

impl Step {
    pub fn new(kind: StepKind) -> Self {
        let data = match kind {
            StepKind::Feed => StepData::Feed { feed_time_ms: 0 },
            StepKind::Pressurize => StepData::Pressurize {
                wait: Delay::new(),
                fill: Delay::new(),
                full_count: 0,
            },
            StepKind::Pause => StepData::Pause {
                cycles: 0,
                cooldown_ms: 0,
            },
            _ => StepData::None,
        };
        Self {
            kind,
            entered: false,
            completed: false,
            delay: Delay::new(),
            data,
        }
    }

    pub fn kind(&self) -> StepKind {
        self.kind
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn is_entered(&self) -> bool {
        self.entered
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Cycles counted towards the next cooldown (pause step only)
    pub fn pause_cycles(&self) -> Option<u8> {
        match self.data {
            StepData::Pause { cycles, .. } => Some(cycles),
            _ => None,
        }
    }

    /// Clear the entered and completed latches
    ///
    /// Private counters survive; timers are restarted by the entry action.
    pub fn reset_latches(&mut self) {
        self.entered = false;
        self.completed = false;
    }

    /// Run one tick of this step
    ///
    /// The entry action runs once per activation, before the first
    /// per-tick action. A completed step does nothing until its latches
    /// are reset. Returns true when the entry action ran.
    pub fn run<A: Actuator, S: CounterStore>(&mut self, ctx: &mut StepContext<'_, A, S>) -> bool {
        if self.completed {
            return false;
        }
        let entering = !self.entered;
        if entering {
            self.entered = true;
            self.enter(ctx);
        }
        self.update(ctx);
        entering
    }

    fn complete(&mut self) {
        self.completed = true;
    }

    fn enter<A: Actuator, S: CounterStore>(&mut self, ctx: &mut StepContext<'_, A, S>) {
        self.delay.set_unstarted();
        let valves = &mut *ctx.valves;

        match self.kind {
            // Releasing a stroke valve drops any stroke left from an
            // abandoned activation
            StepKind::Wake | StepKind::Rocker => valves.set(Valve::RockerLever, false),
            StepKind::Cut => valves.set(Valve::Cutter, false),
            StepKind::Feed => {
                let feed_time_ms = ctx.store.get(CounterKey::FeedTimeMs).max(0) as u32;
                self.data = StepData::Feed { feed_time_ms };
                valves.set(Valve::RockerLever, true);
                valves.set(Valve::FeedClamp, true);
                valves.set(Valve::FeedMotor, true);
            }
            StepKind::TailFeed => {
                valves.set(Valve::FeedClamp, true);
                valves.set(Valve::FeedMotor, true);
            }
            StepKind::Clamp => valves.set(Valve::StartClamp, true),
            StepKind::Pressurize => {
                self.data = StepData::Pressurize {
                    wait: Delay::new(),
                    fill: Delay::new(),
                    full_count: 0,
                };
            }
            StepKind::Tension => {
                valves.spring_block();
                valves.set(Valve::TensionKey, true);
                valves.set(Valve::FeedClamp, false);
            }
            StepKind::Weld => {
                valves.set(Valve::TensionKey, false);
                valves.set(Valve::WeldKey, false);
            }
            StepKind::Vent => {
                valves.set(Valve::FeedClamp, false);
                valves.spring_vent();
            }
            StepKind::Release => valves.set(Valve::StartClamp, false),
            StepKind::Return => valves.spring_move(),
            StepKind::Pause => {
                ctx.report.cycle_closed = true;
                let cooldown_ms = (ctx.store.get(CounterKey::CooldownSeconds).max(0) as u32)
                    .saturating_mul(1000);
                let cycles = match self.data {
                    StepData::Pause { cycles, .. } => cycles.saturating_add(1),
                    _ => 1,
                };
                self.data = StepData::Pause {
                    cycles,
                    cooldown_ms,
                };
            }
        }
    }

    fn update<A: Actuator, S: CounterStore>(&mut self, ctx: &mut StepContext<'_, A, S>) {
        let now = ctx.now_ms;
        let t = &ctx.config.timings;
        let vented = ctx.pressure.calmed_bar < ctx.config.vent_threshold_bar;

        match self.kind {
            StepKind::Wake => {
                ctx.valves
                    .stroke(Valve::RockerLever, now, t.wake_extend_ms, t.wake_retract_ms);
                if ctx.valves.stroke_completed(Valve::RockerLever) {
                    self.complete();
                }
            }
            StepKind::Feed => {
                let feed_time_ms = match self.data {
                    StepData::Feed { feed_time_ms } => feed_time_ms,
                    _ => 0,
                };
                if self.delay.is_up(now, feed_time_ms) {
                    ctx.valves.set(Valve::RockerLever, false);
                    ctx.valves.set(Valve::FeedMotor, false);
                    self.complete();
                }
            }
            StepKind::Cut => {
                ctx.valves
                    .stroke(Valve::Cutter, now, t.cut_extend_ms, t.cut_retract_ms);
                if ctx.valves.stroke_completed(Valve::Cutter) {
                    self.complete();
                }
            }
            StepKind::TailFeed => {
                if self.delay.is_up(now, t.tail_feed_ms) {
                    ctx.valves.set(Valve::FeedClamp, false);
                    ctx.valves.set(Valve::FeedMotor, false);
                    self.complete();
                }
            }
            StepKind::Clamp => {
                if self.delay.is_up(now, t.clamp_settle_ms) {
                    self.complete();
                }
            }
            StepKind::Pressurize => self.pressurize(ctx),
            StepKind::Tension => {
                if ctx.config.dry_run {
                    self.complete();
                } else if ctx.inputs.end_position && self.delay.is_up(now, t.tension_settle_ms) {
                    self.complete();
                }
            }
            StepKind::Weld => {
                ctx.valves
                    .stroke(Valve::WeldKey, now, t.weld_extend_ms, t.weld_retract_ms);
                if ctx.valves.stroke_completed(Valve::WeldKey) {
                    self.complete();
                }
            }
            StepKind::Vent => {
                if vented && self.delay.is_up(now, t.vent_settle_ms) {
                    self.complete();
                }
            }
            StepKind::Rocker => {
                ctx.valves
                    .stroke(Valve::RockerLever, now, t.rocker_extend_ms, t.rocker_retract_ms);
                if ctx.valves.stroke_completed(Valve::RockerLever) {
                    self.complete();
                }
            }
            StepKind::Release => {
                if self.delay.is_up(now, t.release_settle_ms) {
                    self.complete();
                }
            }
            StepKind::Return => {
                if ctx.config.dry_run {
                    self.count_cycle(ctx);
                } else if ctx.inputs.start_position {
                    ctx.valves.spring_vent();
                    if vented && self.delay.is_up(now, t.return_settle_ms) {
                        self.count_cycle(ctx);
                    }
                }
            }
            StepKind::Pause => self.pause(ctx),
        }
    }

    fn count_cycle<A: Actuator, S: CounterStore>(&mut self, ctx: &mut StepContext<'_, A, S>) {
        ctx.store.increment(CounterKey::ShortCounter);
        ctx.store.increment(CounterKey::LongCounter);
        ctx.report.cycle_counted = Some((
            ctx.store.get(CounterKey::ShortCounter),
            ctx.store.get(CounterKey::LongCounter),
        ));
        self.complete();
    }

    /// Pulse air into the spring until the force holds at the setpoint
    fn pressurize<A: Actuator, S: CounterStore>(&mut self, ctx: &mut StepContext<'_, A, S>) {
        let StepData::Pressurize {
            mut wait,
            mut fill,
            mut full_count,
        } = self.data
        else {
            return;
        };

        let now = ctx.now_ms;
        let t = &ctx.config.timings;
        let setpoint = ctx.store.get(CounterKey::FillForceSetpoint);

        if ctx.pressure.force.saturating_add(t.fill_margin_n) <= setpoint {
            if wait.is_up(now, t.fill_wait_ms) {
                ctx.valves.spring_build_pressure();
                fill.reset(now);
                full_count = 0;
            }
        } else if fill.is_up(now, t.fill_pulse_ms) {
            ctx.valves.spring_block();
            wait.reset(now);
            full_count = full_count.saturating_add(1);
        }

        self.data = StepData::Pressurize {
            wait,
            fill,
            full_count,
        };

        if full_count >= t.fill_confirmations {
            ctx.valves.spring_block();
            self.complete();
        }
    }

    /// Count the cycle; every Nth cycle hold for the cooldown
    fn pause<A: Actuator, S: CounterStore>(&mut self, ctx: &mut StepContext<'_, A, S>) {
        let StepData::Pause {
            cycles,
            cooldown_ms,
        } = self.data
        else {
            return;
        };

        let cycles_per_cooldown = ctx.store.get(CounterKey::CyclesPerCooldown);
        if i32::from(cycles) < cycles_per_cooldown {
            self.complete();
            return;
        }

        let now = ctx.now_ms;
        if !self.delay.is_started() {
            ctx.report.cooldown_started = Some(cooldown_ms / 1000);
        }
        if self.delay.is_up(now, cooldown_ms) {
            self.data = StepData::Pause {
                cycles: 0,
                cooldown_ms,
            };
            ctx.report.cooldown_finished = true;
            self.complete();
        } else {
            ctx.report.cooldown_remaining_ms = Some(self.delay.remaining(now, cooldown_ms));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{valves, MockStore, MockValve};

    struct Bench {
        valves: Valves<MockValve>,
        store: MockStore,
        pressure: PressureSample,
        inputs: SensorInputs,
        config: RigConfig,
        report: StepReport,
    }

    impl Bench {
        fn new() -> Self {
            Self {
                valves: valves(),
                store: MockStore::new(),
                pressure: PressureSample::default(),
                inputs: SensorInputs::default(),
                config: RigConfig::default(),
                report: StepReport::default(),
            }
        }

        fn run(&mut self, step: &mut Step, now_ms: u32) -> bool {
            self.report = StepReport::default();
            let mut ctx = StepContext {
                now_ms,
                valves: &mut self.valves,
                store: &mut self.store,
                pressure: &self.pressure,
                inputs: &self.inputs,
                config: &self.config,
                report: &mut self.report,
            };
            step.run(&mut ctx)
        }

        /// Run every `dt` ms until the step completes, returning the time
        fn run_until_complete(&mut self, step: &mut Step, start: u32, dt: u32, limit: u32) -> Option<u32> {
            let mut now = start;
            while now <= start + limit {
                self.run(step, now);
                if step.is_completed() {
                    return Some(now);
                }
                now += dt;
            }
            None
        }
    }

    #[test]
    fn test_catalogue_order() {
        assert_eq!(StepKind::ALL[0], StepKind::Wake);
        assert_eq!(StepKind::ALL[STEP_COUNT - 1], StepKind::Pause);
        assert_eq!(StepKind::ALL[5].name(), "PRESSURIZE");
    }

    #[test]
    fn test_entry_runs_once_per_activation() {
        let mut bench = Bench::new();
        let mut step = Step::new(StepKind::Clamp);
        assert!(bench.run(&mut step, 0));
        assert!(bench.valves.is_on(Valve::StartClamp));

        // Operator releases the clamp by hand; entry must not re-run
        bench.valves.set(Valve::StartClamp, false);
        assert!(!bench.run(&mut step, 10));
        assert!(!bench.valves.is_on(Valve::StartClamp));

        step.reset_latches();
        assert!(bench.run(&mut step, 20));
        assert!(bench.valves.is_on(Valve::StartClamp));
    }

    #[test]
    fn test_completed_latch_holds() {
        let mut bench = Bench::new();
        let mut step = Step::new(StepKind::Clamp);
        let done = bench.run_until_complete(&mut step, 0, 10, 1000);
        assert_eq!(done, Some(400));
        assert!(!bench.run(&mut step, 2000));
        assert!(step.is_completed());
    }

    #[test]
    fn test_feed_uses_stored_time() {
        let mut bench = Bench::new();
        bench.store.set(CounterKey::FeedTimeMs, 800);
        let mut step = Step::new(StepKind::Feed);
        bench.run(&mut step, 0);
        assert!(bench.valves.is_on(Valve::FeedMotor));
        assert!(bench.valves.is_on(Valve::RockerLever));

        let done = bench.run_until_complete(&mut step, 10, 10, 2000);
        assert_eq!(done, Some(800));
        assert!(!bench.valves.is_on(Valve::FeedMotor));
        assert!(!bench.valves.is_on(Valve::RockerLever));
        // The clamp wheel stays closed for the cut
        assert!(bench.valves.is_on(Valve::FeedClamp));
    }

    #[test]
    fn test_stroke_step_completes_after_stroke() {
        let mut bench = Bench::new();
        let mut step = Step::new(StepKind::Weld);
        let done = bench.run_until_complete(&mut step, 0, 10, 10_000);
        assert_eq!(done, Some(3000));
        assert!(!bench.valves.is_on(Valve::WeldKey));
    }

    #[test]
    fn test_tension_waits_for_end_position() {
        let mut bench = Bench::new();
        let mut step = Step::new(StepKind::Tension);
        assert_eq!(bench.run_until_complete(&mut step, 0, 10, 60_000), None);
        assert!(bench.valves.is_on(Valve::TensionKey));
        assert!(bench.valves.is_on(Valve::SpringExhaust));

        bench.inputs.end_position = true;
        let done = bench.run_until_complete(&mut step, 70_000, 10, 1000);
        assert_eq!(done, Some(70_400));
    }

    #[test]
    fn test_dry_run_skips_position_sensors() {
        let mut bench = Bench::new();
        bench.config.dry_run = true;
        let mut step = Step::new(StepKind::Tension);
        bench.run(&mut step, 0);
        assert!(step.is_completed());

        let mut step = Step::new(StepKind::Return);
        bench.run(&mut step, 0);
        assert!(step.is_completed());
        assert_eq!(bench.report.cycle_counted, Some((1, 1)));
    }

    #[test]
    fn test_vent_waits_for_pressure() {
        let mut bench = Bench::new();
        bench.pressure.calmed_bar = 2.0;
        let mut step = Step::new(StepKind::Vent);
        assert_eq!(bench.run_until_complete(&mut step, 0, 10, 10_000), None);

        bench.pressure.calmed_bar = 0.05;
        let done = bench.run_until_complete(&mut step, 20_000, 10, 10_000);
        assert_eq!(done, Some(24_000));
    }

    #[test]
    fn test_return_counts_cycle() {
        let mut bench = Bench::new();
        bench.store.set(CounterKey::LongCounter, 41);
        let mut step = Step::new(StepKind::Return);
        bench.run(&mut step, 0);
        assert!(bench.valves.is_on(Valve::SpringSupply));

        bench.inputs.start_position = true;
        bench.run(&mut step, 10);
        assert!(!bench.valves.is_on(Valve::SpringSupply));

        let done = bench.run_until_complete(&mut step, 20, 10, 1000);
        assert_eq!(done, Some(510));
        assert_eq!(bench.store.get(CounterKey::ShortCounter), 1);
        assert_eq!(bench.store.get(CounterKey::LongCounter), 42);
        assert_eq!(bench.report.cycle_counted, Some((1, 42)));
    }

    #[test]
    fn test_pressurize_fills_then_confirms() {
        let mut bench = Bench::new();
        bench.store.set(CounterKey::FillForceSetpoint, 1500);
        let mut step = Step::new(StepKind::Pressurize);

        // Below setpoint: first fill pulse after the wait gate
        bench.run(&mut step, 0);
        assert!(!bench.valves.is_on(Valve::SpringSupply));
        bench.run(&mut step, 500);
        assert!(bench.valves.is_on(Valve::SpringSupply));
        assert!(bench.valves.is_on(Valve::SpringExhaust));

        // Force within the margin of the setpoint
        bench.pressure.force = 1490;
        bench.run(&mut step, 600);
        assert!(!bench.valves.is_on(Valve::SpringSupply));
        assert!(bench.valves.is_on(Valve::SpringExhaust));

        // 19 more confirmations, one per fill gate interval
        let done = bench.run_until_complete(&mut step, 610, 10, 10_000).unwrap();
        assert!(done >= 600 + 19 * 100);
        assert!(done <= 600 + 19 * 110);
    }

    #[test]
    fn test_pressurize_sagging_force_restarts_count() {
        let mut bench = Bench::new();
        let mut step = Step::new(StepKind::Pressurize);
        bench.pressure.force = 1500;
        bench.run(&mut step, 0);
        bench.run(&mut step, 100);
        bench.run(&mut step, 200);

        bench.pressure.force = 0;
        bench.run(&mut step, 210);
        bench.run(&mut step, 710);
        assert!(bench.valves.is_on(Valve::SpringSupply));

        bench.pressure.force = 1500;
        let done = bench.run_until_complete(&mut step, 720, 10, 10_000);
        // A full set of confirmations after the sag
        assert!(done.is_some_and(|t| t >= 720 + 19 * 100));
    }

    #[test]
    fn test_pause_cooldown_every_third_cycle() {
        let mut bench = Bench::new();
        bench.store.set(CounterKey::CyclesPerCooldown, 3);
        bench.store.set(CounterKey::CooldownSeconds, 10);
        let mut step = Step::new(StepKind::Pause);

        for run in 1..=2u8 {
            step.reset_latches();
            bench.run(&mut step, 0);
            assert!(step.is_completed(), "run {} should not cool down", run);
            assert!(bench.report.cycle_closed);
            assert_eq!(step.pause_cycles(), Some(run));
        }

        step.reset_latches();
        bench.run(&mut step, 100_000);
        assert!(!step.is_completed());
        assert_eq!(bench.report.cooldown_started, Some(10));
        assert_eq!(bench.report.cooldown_remaining_ms, Some(10_000));

        bench.run(&mut step, 104_000);
        assert_eq!(bench.report.cooldown_started, None);
        assert_eq!(bench.report.cooldown_remaining_ms, Some(6000));

        bench.run(&mut step, 110_000);
        assert!(step.is_completed());
        assert!(bench.report.cooldown_finished);
        assert_eq!(step.pause_cycles(), Some(0));
    }

    #[test]
    fn test_step_back_abandons_stroke() {
        let mut bench = Bench::new();
        let mut step = Step::new(StepKind::Rocker);
        bench.run(&mut step, 0);
        bench.run(&mut step, 1000);
        assert!(bench.valves.is_on(Valve::RockerLever));

        // Re-activation starts a fresh stroke
        step.reset_latches();
        let done = bench.run_until_complete(&mut step, 5000, 10, 10_000);
        assert_eq!(done, Some(7500));
    }
}
