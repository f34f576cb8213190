//! Machine mode controller
//!
//! Mode is one of step / auto / reset / error; `running` is an
//! independent flag. Reset never survives a second tick: the control loop
//! resolves it into step or auto mode on the next dispatch.

/// Machine modes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// Manual: the rig stops after every step
    Step,
    /// Continuous cycling
    Auto,
    /// Transient recovery mode, resolved on the next dispatch
    Reset,
    /// Fault; outputs held until an operator reset
    Error,
}

/// Inputs to the mode controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ModeEvent {
    /// Run/pause button
    ToggleRunning,
    /// Step/auto button
    ToggleStepAuto,
    /// Operator moved the sequence by hand
    ForceStep,
    /// Stop motion without changing mode
    Stop,
    /// Supervisory recovery with resume intent
    EnterReset { run_after: bool },
    /// Dispatch found the controller in reset mode
    ResolveReset,
    /// Fault declared
    EnterError,
    /// The fault condition went away by itself
    ClearError,
    /// Operator reset action, clears every mode including error
    OperatorReset,
}

/// What the control loop should do this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Dispatch {
    /// Step or auto mode: tick and advance the sequencer
    DriveSequencer,
    /// Reset mode: resolve it once
    ResolveReset,
    /// Error mode: wait for the operator
    Hold,
}

/// Mode state plus the running flag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ModeController {
    mode: Mode,
    running: bool,
    run_after_reset: bool,
}

impl Default for ModeController {
    fn default() -> Self {
        Self::new()
    }
}

impl ModeController {
    /// Power-on state: step mode, stopped
    pub fn new() -> Self {
        Self {
            mode: Mode::Step,
            running: false,
            run_after_reset: false,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn run_after_reset(&self) -> bool {
        self.run_after_reset
    }

    /// Routing decision for this tick
    pub fn dispatch(&self) -> Dispatch {
        match self.mode {
            Mode::Step | Mode::Auto => Dispatch::DriveSequencer,
            Mode::Reset => Dispatch::ResolveReset,
            Mode::Error => Dispatch::Hold,
        }
    }

    /// Process an event
    ///
    /// This is the core transition logic. Events that make no sense in the
    /// current mode leave the state unchanged.
    pub fn apply(&mut self, event: ModeEvent) {
        use Mode::*;
        use ModeEvent::*;

        match (self.mode, event) {
            (Step | Auto, ToggleRunning) => self.running = !self.running,
            (Step, ToggleStepAuto) => self.mode = Auto,
            (Auto, ToggleStepAuto) => self.mode = Step,

            (_, Stop) => self.running = false,
            (Error, ForceStep) => {}
            (_, ForceStep) => {
                self.running = false;
                self.mode = Step;
            }

            (Error, EnterReset { .. }) => {}
            (_, EnterReset { run_after }) => {
                self.running = false;
                self.run_after_reset = run_after;
                self.mode = Reset;
            }
            (Reset, ResolveReset) => {
                if self.run_after_reset {
                    self.mode = Auto;
                    self.running = true;
                } else {
                    self.mode = Step;
                    self.running = false;
                }
            }

            (_, EnterError) => {
                self.running = false;
                self.mode = Error;
            }
            (Error, ClearError) => self.mode = Step,
            (_, OperatorReset) => {
                self.running = false;
                self.run_after_reset = false;
                self.mode = Step;
            }

            // Default: stay in current state
            _ => {}
        }
    }

    pub fn toggle_running(&mut self) {
        self.apply(ModeEvent::ToggleRunning);
    }

    pub fn toggle_step_auto(&mut self) {
        self.apply(ModeEvent::ToggleStepAuto);
    }

    pub fn stop(&mut self) {
        self.apply(ModeEvent::Stop);
    }

    pub fn enter_reset(&mut self, run_after: bool) {
        self.apply(ModeEvent::EnterReset { run_after });
    }

    pub fn enter_error(&mut self) {
        self.apply(ModeEvent::EnterError);
    }

    pub fn clear_error(&mut self) {
        self.apply(ModeEvent::ClearError);
    }

    /// Resolve reset mode, returning `Some(auto)` if it was pending
    pub fn resolve_reset(&mut self) -> Option<bool> {
        if self.mode != Mode::Reset {
            return None;
        }
        self.apply(ModeEvent::ResolveReset);
        Some(self.mode == Mode::Auto)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_power_on_state() {
        let c = ModeController::new();
        assert_eq!(c.mode(), Mode::Step);
        assert!(!c.is_running());
        assert_eq!(c.dispatch(), Dispatch::DriveSequencer);
    }

    #[test]
    fn test_toggle_step_auto() {
        let mut c = ModeController::new();
        c.toggle_step_auto();
        assert_eq!(c.mode(), Mode::Auto);
        c.toggle_step_auto();
        assert_eq!(c.mode(), Mode::Step);
    }

    #[test]
    fn test_toggle_ignored_in_error_and_reset() {
        let mut c = ModeController::new();
        c.enter_error();
        c.toggle_step_auto();
        c.toggle_running();
        assert_eq!(c.mode(), Mode::Error);
        assert!(!c.is_running());

        let mut c = ModeController::new();
        c.enter_reset(true);
        c.toggle_step_auto();
        c.toggle_running();
        assert_eq!(c.mode(), Mode::Reset);
        assert!(!c.is_running());
    }

    #[test]
    fn test_error_forces_stop_and_holds() {
        let mut c = ModeController::new();
        c.toggle_step_auto();
        c.toggle_running();
        assert!(c.is_running());
        c.enter_error();
        assert!(!c.is_running());
        assert_eq!(c.dispatch(), Dispatch::Hold);

        // Step buttons and supervisory reset do not clear an error
        c.apply(ModeEvent::ForceStep);
        c.enter_reset(true);
        assert_eq!(c.mode(), Mode::Error);

        c.apply(ModeEvent::OperatorReset);
        assert_eq!(c.mode(), Mode::Step);
        assert!(!c.is_running());
    }

    #[test]
    fn test_reset_resolves_to_auto_running() {
        let mut c = ModeController::new();
        c.toggle_step_auto();
        c.toggle_running();
        c.enter_reset(true);
        assert_eq!(c.dispatch(), Dispatch::ResolveReset);
        assert!(!c.is_running());

        assert_eq!(c.resolve_reset(), Some(true));
        assert_eq!(c.mode(), Mode::Auto);
        assert!(c.is_running());
        assert_eq!(c.resolve_reset(), None);
    }

    #[test]
    fn test_reset_resolves_to_step_stopped() {
        let mut c = ModeController::new();
        c.enter_reset(false);
        assert_eq!(c.resolve_reset(), Some(false));
        assert_eq!(c.mode(), Mode::Step);
        assert!(!c.is_running());
    }

    #[test]
    fn test_clear_error_lands_in_step_mode() {
        let mut c = ModeController::new();
        c.toggle_step_auto();
        c.enter_error();
        c.clear_error();
        assert_eq!(c.mode(), Mode::Step);
        assert!(!c.is_running());

        // Only meaningful in error mode
        c.toggle_step_auto();
        c.clear_error();
        assert_eq!(c.mode(), Mode::Auto);
    }

    #[test]
    fn test_force_step_leaves_auto() {
        let mut c = ModeController::new();
        c.toggle_step_auto();
        c.toggle_running();
        c.apply(ModeEvent::ForceStep);
        assert_eq!(c.mode(), Mode::Step);
        assert!(!c.is_running());
    }
}
