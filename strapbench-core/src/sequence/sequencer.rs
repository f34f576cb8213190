//! Step sequencer
//!
//! Owns the fixed step list and the current index. Any index change
//! clears the latches of the step left and the step selected, and raises
//! the step-switch signal for exactly one consumer.

use super::step::{Step, StepContext, StepKind, STEP_COUNT};
use crate::store::CounterStore;
use crate::traits::Actuator;

/// Ordered strapping cycle and its position
#[derive(Debug, Clone)]
pub struct Sequencer {
    steps: [Step; STEP_COUNT],
    index: usize,
    switched: bool,
}

impl Default for Sequencer {
    fn default() -> Self {
        Self::new()
    }
}

impl Sequencer {
    /// Create the canonical cycle, positioned on the first step
    pub fn new() -> Self {
        Self {
            steps: StepKind::ALL.map(Step::new),
            index: 0,
            switched: false,
        }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> &Step {
        &self.steps[self.index]
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Select the step at `index`
    ///
    /// # Panics
    /// If `index` is out of range. Indices come from the sequencer itself
    /// or from [`StepKind::ALL`]; anything else is a programming error.
    pub fn activate(&mut self, index: usize) {
        assert!(index < self.steps.len(), "step index {} out of range", index);
        self.steps[self.index].reset_latches();
        self.index = index;
        self.steps[index].reset_latches();
        self.switched = true;
    }

    /// Run the current step if the machine is running
    ///
    /// Returns the step kind when its entry action ran this tick.
    pub fn tick<A: Actuator, S: CounterStore>(
        &mut self,
        running: bool,
        ctx: &mut StepContext<'_, A, S>,
    ) -> Option<StepKind> {
        if !running {
            return None;
        }
        let step = &mut self.steps[self.index];
        step.run(ctx).then_some(step.kind())
    }

    /// Move to the next step if the current one completed
    pub fn advance_if_completed(&mut self) -> bool {
        if !self.current().is_completed() {
            return false;
        }
        self.step_forward();
        true
    }

    /// Select the next step, wrapping after the last
    pub fn step_forward(&mut self) {
        self.activate((self.index + 1) % self.steps.len());
    }

    /// Select the previous step, wrapping before the first
    pub fn step_back(&mut self) {
        let len = self.steps.len();
        self.activate((self.index + len - 1) % len);
    }

    /// Check the step-switch signal without consuming it
    pub fn step_switched(&self) -> bool {
        self.switched
    }

    /// Consume the step-switch signal
    pub fn take_step_switch(&mut self) -> bool {
        core::mem::take(&mut self.switched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RigConfig;
    use crate::pressure::PressureSample;
    use crate::sequence::StepReport;
    use crate::testing::{valves, MockStore};
    use crate::traits::SensorInputs;

    fn tick(seq: &mut Sequencer, running: bool, now_ms: u32) -> Option<StepKind> {
        let mut valves = valves();
        let mut store = MockStore::new();
        let pressure = PressureSample::default();
        let inputs = SensorInputs::default();
        let config = RigConfig::default();
        let mut report = StepReport::default();
        let mut ctx = StepContext {
            now_ms,
            valves: &mut valves,
            store: &mut store,
            pressure: &pressure,
            inputs: &inputs,
            config: &config,
            report: &mut report,
        };
        seq.tick(running, &mut ctx)
    }

    #[test]
    fn test_starts_at_first_step() {
        let seq = Sequencer::new();
        assert_eq!(seq.len(), STEP_COUNT);
        assert_eq!(seq.index(), 0);
        assert_eq!(seq.current().kind(), StepKind::Wake);
        assert!(!seq.step_switched());
    }

    #[test]
    fn test_not_running_is_noop() {
        let mut seq = Sequencer::new();
        assert_eq!(tick(&mut seq, false, 0), None);
        assert!(!seq.current().is_entered());
    }

    #[test]
    fn test_activate_then_tick_enters_once() {
        for index in 0..STEP_COUNT {
            let mut seq = Sequencer::new();
            seq.activate(index);
            assert!(!seq.current().is_entered());
            assert_eq!(tick(&mut seq, true, 0), Some(StepKind::ALL[index]));
            assert!(seq.current().is_entered() || seq.current().is_completed());
            assert_eq!(tick(&mut seq, true, 1), None);
        }
    }

    #[test]
    fn test_wraps_forward_and_back() {
        let mut seq = Sequencer::new();
        seq.step_back();
        assert_eq!(seq.index(), STEP_COUNT - 1);
        seq.step_forward();
        assert_eq!(seq.index(), 0);
    }

    #[test]
    fn test_advance_from_last_wraps() {
        let mut seq = Sequencer::new();
        seq.activate(STEP_COUNT - 1);
        seq.take_step_switch();

        // Pause with default cycles-per-cooldown completes on first tick
        tick(&mut seq, true, 0);
        assert!(seq.current().is_completed());
        assert!(seq.advance_if_completed());
        assert_eq!(seq.index(), 0);
        assert!(seq.take_step_switch());
        assert!(!seq.take_step_switch());
    }

    #[test]
    fn test_advance_without_completion_is_noop() {
        let mut seq = Sequencer::new();
        tick(&mut seq, true, 0);
        assert!(!seq.advance_if_completed());
        assert_eq!(seq.index(), 0);
        assert!(!seq.step_switched());
    }

    #[test]
    fn test_activate_clears_both_latches() {
        let mut seq = Sequencer::new();
        tick(&mut seq, true, 0);
        assert!(seq.current().is_entered());
        seq.step_forward();
        assert!(!seq.steps()[0].is_entered());
        seq.step_back();
        assert!(!seq.current().is_entered());
    }

    #[test]
    #[should_panic]
    fn test_invalid_index_panics() {
        let mut seq = Sequencer::new();
        seq.activate(STEP_COUNT);
    }
}
