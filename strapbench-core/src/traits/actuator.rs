//! Valve / cylinder actuator trait

/// One electrically switched valve, optionally driving a cylinder
///
/// Implementations are simple on/off outputs with a timed double stroke
/// (extend, then retract) on top.
pub trait Actuator {
    /// Energise or release the valve
    ///
    /// Setting the valve cancels any stroke in progress.
    fn set(&mut self, on: bool);

    /// Flip the valve state
    fn toggle(&mut self) {
        let on = self.get_state();
        self.set(!on);
    }

    /// Check whether the valve is energised
    fn get_state(&self) -> bool;

    /// Drive a timed double stroke
    ///
    /// Starts a stroke when none is running; repeated calls while one is
    /// in progress only advance it against `now_ms`. The valve is held
    /// on for `extend_ms`, then off for `retract_ms`.
    fn stroke(&mut self, now_ms: u32, extend_ms: u32, retract_ms: u32);

    /// Check whether the last stroke has finished
    ///
    /// Returns true once per finished stroke; the next call to
    /// [`Actuator::stroke`] starts a new one.
    fn stroke_completed(&mut self) -> bool;
}
