//! Non-blocking timers
//!
//! Nothing here waits. A timer remembers when it was started and answers
//! questions about the current millisecond clock, which the caller passes
//! in. Arithmetic wraps, so the `u32` clock may roll over after ~49 days.

/// Check whether `duration_ms` has passed since `start_ms`
pub fn elapsed(now_ms: u32, start_ms: u32, duration_ms: u32) -> bool {
    now_ms.wrapping_sub(start_ms) >= duration_ms
}

/// Restartable delay
///
/// An unstarted delay never reports as elapsed. [`Delay::is_up`] is the
/// polled one-shot form used by steps: it arms itself on first call and
/// disarms when it fires, so the next call starts a fresh interval.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Delay {
    start_ms: Option<u32>,
}

impl Delay {
    /// Create an unstarted delay
    pub const fn new() -> Self {
        Self { start_ms: None }
    }

    /// Start (or restart) the delay at `now_ms`
    pub fn reset(&mut self, now_ms: u32) {
        self.start_ms = Some(now_ms);
    }

    /// Disarm the delay
    pub fn set_unstarted(&mut self) {
        self.start_ms = None;
    }

    pub fn is_started(&self) -> bool {
        self.start_ms.is_some()
    }

    /// Milliseconds since start, 0 when unstarted
    pub fn since(&self, now_ms: u32) -> u32 {
        self.start_ms.map_or(0, |start| now_ms.wrapping_sub(start))
    }

    /// Check whether at least `duration_ms` has passed since start
    pub fn elapsed_at_least(&self, now_ms: u32, duration_ms: u32) -> bool {
        match self.start_ms {
            Some(start) => elapsed(now_ms, start, duration_ms),
            None => false,
        }
    }

    /// Milliseconds left until `duration_ms` has passed
    ///
    /// Returns the full duration when unstarted and 0 once elapsed.
    pub fn remaining(&self, now_ms: u32, duration_ms: u32) -> u32 {
        match self.start_ms {
            Some(_) => duration_ms.saturating_sub(self.since(now_ms)),
            None => duration_ms,
        }
    }

    /// Polled one-shot
    ///
    /// Arms the delay if unstarted and returns false. Once `duration_ms`
    /// has passed, disarms and returns true.
    pub fn is_up(&mut self, now_ms: u32, duration_ms: u32) -> bool {
        match self.start_ms {
            None => {
                self.start_ms = Some(now_ms);
                false
            }
            Some(start) if elapsed(now_ms, start, duration_ms) => {
                self.start_ms = None;
                true
            }
            Some(_) => false,
        }
    }
}
