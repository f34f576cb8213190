//! Durable counter contract
//!
//! The rig persists a flat set of integers: operator setpoints and the
//! cycle counters. Storage itself is a collaborator; this module names the
//! keys and enforces the operator bounds at the write boundary.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Number of durable counters
pub const COUNTER_COUNT: usize = 6;

/// Durable counter keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CounterKey {
    /// Target force for the pressurize step [N]
    FillForceSetpoint,
    /// Resettable cycle counter
    ShortCounter,
    /// Lifetime cycle counter
    LongCounter,
    /// Cycles run back to back before a cooldown pause
    CyclesPerCooldown,
    /// Cooldown pause length [s]
    CooldownSeconds,
    /// Strap feed duration [ms]
    FeedTimeMs,
}

/// Operator adjustment bounds for a counter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Bounds {
    pub min: i32,
    pub max: i32,
    pub step: i32,
}

impl Bounds {
    pub const fn new(min: i32, max: i32, step: i32) -> Self {
        Self { min, max, step }
    }

    /// Clamp a value into `[min, max]`
    pub fn clamp(&self, value: i32) -> i32 {
        value.clamp(self.min, self.max)
    }

    /// One step up, stopping at `max`
    pub fn increase(&self, value: i32) -> i32 {
        if value <= self.max - self.step {
            value + self.step
        } else {
            self.max
        }
    }

    /// One step down, stopping at `min`
    pub fn decrease(&self, value: i32) -> i32 {
        if value >= self.min + self.step {
            value - self.step
        } else {
            self.min
        }
    }
}

impl CounterKey {
    /// All keys in slot order
    pub const ALL: [CounterKey; COUNTER_COUNT] = [
        CounterKey::FillForceSetpoint,
        CounterKey::ShortCounter,
        CounterKey::LongCounter,
        CounterKey::CyclesPerCooldown,
        CounterKey::CooldownSeconds,
        CounterKey::FeedTimeMs,
    ];

    /// Storage slot of this key
    pub fn slot(self) -> u8 {
        match self {
            CounterKey::FillForceSetpoint => 0,
            CounterKey::ShortCounter => 1,
            CounterKey::LongCounter => 2,
            CounterKey::CyclesPerCooldown => 3,
            CounterKey::CooldownSeconds => 4,
            CounterKey::FeedTimeMs => 5,
        }
    }

    pub fn from_slot(slot: u8) -> Option<Self> {
        Self::ALL.get(slot as usize).copied()
    }

    /// Value used when nothing has been stored yet
    pub fn default_value(self) -> i32 {
        match self {
            CounterKey::FillForceSetpoint => 1500,
            CounterKey::ShortCounter | CounterKey::LongCounter => 0,
            CounterKey::CyclesPerCooldown => 3,
            CounterKey::CooldownSeconds => 60,
            CounterKey::FeedTimeMs => 600,
        }
    }

    /// Operator bounds, `None` for the cycle counters
    pub fn bounds(self) -> Option<Bounds> {
        match self {
            CounterKey::FillForceSetpoint => Some(Bounds::new(0, 3000, 100)),
            CounterKey::CyclesPerCooldown => Some(Bounds::new(0, 10, 1)),
            CounterKey::CooldownSeconds => Some(Bounds::new(0, 600, 10)),
            CounterKey::FeedTimeMs => Some(Bounds::new(0, 2000, 100)),
            CounterKey::ShortCounter | CounterKey::LongCounter => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            CounterKey::FillForceSetpoint => "fill_force_setpoint",
            CounterKey::ShortCounter => "short_counter",
            CounterKey::LongCounter => "long_counter",
            CounterKey::CyclesPerCooldown => "cycles_per_cooldown",
            CounterKey::CooldownSeconds => "cooldown_seconds",
            CounterKey::FeedTimeMs => "feed_time_ms",
        }
    }
}

/// Durable integer store
///
/// Implementations persist across power loss. Bounds are not checked here.
pub trait CounterStore {
    fn get(&self, key: CounterKey) -> i32;

    fn set(&mut self, key: CounterKey, value: i32);

    fn increment(&mut self, key: CounterKey) {
        let value = self.get(key);
        self.set(key, value.saturating_add(1));
    }
}

/// Adjustment direction for operator setpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    Up,
    Down,
}

/// Move a bounded counter one step in `direction`
///
/// A stored value outside the bounds is pulled back inside. Returns the
/// new value, or `None` for keys without operator bounds.
pub fn adjust<S: CounterStore>(store: &mut S, key: CounterKey, direction: Direction) -> Option<i32> {
    let bounds = key.bounds()?;
    let current = bounds.clamp(store.get(key));
    let next = match direction {
        Direction::Up => bounds.increase(current),
        Direction::Down => bounds.decrease(current),
    };
    store.set(key, next);
    Some(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockStore;

    #[test]
    fn test_slots_roundtrip() {
        for key in CounterKey::ALL {
            assert_eq!(CounterKey::from_slot(key.slot()), Some(key));
        }
        assert_eq!(CounterKey::from_slot(COUNTER_COUNT as u8), None);
    }

    #[test]
    fn test_defaults_inside_bounds() {
        for key in CounterKey::ALL {
            if let Some(b) = key.bounds() {
                let v = key.default_value();
                assert!(v >= b.min && v <= b.max, "{} out of bounds", key.name());
            }
        }
    }

    #[test]
    fn test_adjust_stops_at_max() {
        let mut store = MockStore::new();
        store.set(CounterKey::FillForceSetpoint, 2950);
        assert_eq!(
            adjust(&mut store, CounterKey::FillForceSetpoint, Direction::Up),
            Some(3000)
        );
        assert_eq!(
            adjust(&mut store, CounterKey::FillForceSetpoint, Direction::Up),
            Some(3000)
        );
    }

    #[test]
    fn test_adjust_stops_at_min() {
        let mut store = MockStore::new();
        store.set(CounterKey::CooldownSeconds, 5);
        assert_eq!(
            adjust(&mut store, CounterKey::CooldownSeconds, Direction::Down),
            Some(0)
        );
        assert_eq!(store.get(CounterKey::CooldownSeconds), 0);
    }

    #[test]
    fn test_adjust_pulls_stored_value_into_range() {
        let mut store = MockStore::new();
        store.set(CounterKey::CyclesPerCooldown, 42);
        assert_eq!(
            adjust(&mut store, CounterKey::CyclesPerCooldown, Direction::Down),
            Some(9)
        );
    }

    #[test]
    fn test_counters_not_adjustable() {
        let mut store = MockStore::new();
        store.set(CounterKey::LongCounter, 7);
        assert_eq!(adjust(&mut store, CounterKey::LongCounter, Direction::Up), None);
        assert_eq!(store.get(CounterKey::LongCounter), 7);
    }

    #[test]
    fn test_increment_saturates() {
        let mut store = MockStore::new();
        store.set(CounterKey::LongCounter, i32::MAX);
        store.increment(CounterKey::LongCounter);
        assert_eq!(store.get(CounterKey::LongCounter), i32::MAX);
    }
}
