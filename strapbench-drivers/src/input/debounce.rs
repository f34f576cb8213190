//! Time-based input debouncing
//!
//! A new level is accepted once the raw pin has held it for the debounce
//! time. Contact bounce shorter than that never reaches the debounced
//! state.

use strapbench_core::timer::elapsed;
use strapbench_core::traits::DigitalInput;
use strapbench_hal::SensorInput;

/// Default debounce time in milliseconds
pub const DEFAULT_DEBOUNCE_MS: u32 = 30;

/// Debounced state change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Edge {
    /// Input became asserted
    Rising,
    /// Input was released
    Falling,
}

/// Debounced digital input
pub struct Debounced<P> {
    pin: P,
    debounce_ms: u32,
    state: bool,
    candidate: bool,
    candidate_since_ms: u32,
}

impl<P: SensorInput> Debounced<P> {
    /// Create a debounced input, taking the current pin level as settled
    pub fn new(pin: P, debounce_ms: u32) -> Self {
        let state = pin.is_asserted();
        Self {
            pin,
            debounce_ms,
            state,
            candidate: state,
            candidate_since_ms: 0,
        }
    }

    /// Sample the pin, returning the edge if the debounced state changed
    pub fn update(&mut self, now_ms: u32) -> Option<Edge> {
        let raw = self.pin.is_asserted();
        if raw != self.candidate {
            self.candidate = raw;
            self.candidate_since_ms = now_ms;
        }

        if self.candidate != self.state && elapsed(now_ms, self.candidate_since_ms, self.debounce_ms) {
            self.state = self.candidate;
            return Some(if self.state { Edge::Rising } else { Edge::Falling });
        }
        None
    }

    /// Current debounced state
    pub fn is_active(&self) -> bool {
        self.state
    }
}

impl<P: SensorInput> DigitalInput for Debounced<P> {
    fn raw_state(&self) -> bool {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;

    struct MockInput<'a> {
        level: &'a Cell<bool>,
    }

    impl SensorInput for MockInput<'_> {
        fn is_asserted(&self) -> bool {
            self.level.get()
        }
    }

    #[test]
    fn test_initial_state_from_pin() {
        let level = Cell::new(true);
        let input = Debounced::new(MockInput { level: &level }, 30);
        assert!(input.raw_state());
    }

    #[test]
    fn test_stable_press_reports_edge_once() {
        let level = Cell::new(false);
        let mut input = Debounced::new(MockInput { level: &level }, 30);

        level.set(true);
        assert_eq!(input.update(100), None);
        assert_eq!(input.update(120), None);
        assert_eq!(input.update(130), Some(Edge::Rising));
        assert_eq!(input.update(140), None);
        assert!(input.is_active());

        level.set(false);
        input.update(200);
        assert_eq!(input.update(230), Some(Edge::Falling));
        assert!(!input.raw_state());
    }

    #[test]
    fn test_bounce_is_filtered() {
        let level = Cell::new(false);
        let mut input = Debounced::new(MockInput { level: &level }, 30);

        for t in (0..200).step_by(10) {
            level.set(t % 20 == 0);
            assert_eq!(input.update(t), None);
        }
        assert!(!input.is_active());
    }

    #[test]
    fn test_zero_debounce_follows_pin() {
        let level = Cell::new(false);
        let mut input = Debounced::new(MockInput { level: &level }, 0);
        level.set(true);
        assert_eq!(input.update(5), Some(Edge::Rising));
    }
}
