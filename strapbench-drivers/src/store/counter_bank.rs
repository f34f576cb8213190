//! RAM-cached counter bank
//!
//! The control loop reads and writes counters every tick; flash is far too
//! slow and wears out. The bank keeps every value in RAM and remembers
//! which ones changed so the firmware can write them back at its own pace.

use heapless::Vec;
use strapbench_core::store::{CounterKey, CounterStore, COUNTER_COUNT};

/// Counter values waiting to be written back
pub type DirtyCounters = Vec<(CounterKey, i32), COUNTER_COUNT>;

/// Durable counters cached in RAM
#[derive(Debug, Clone)]
pub struct CounterBank {
    values: [i32; COUNTER_COUNT],
    /// Bit `n` set when slot `n` changed since the last write-back
    dirty: u8,
}

impl Default for CounterBank {
    fn default() -> Self {
        Self::new()
    }
}

impl CounterBank {
    /// Create a bank holding the default value of every counter
    pub fn new() -> Self {
        Self {
            values: CounterKey::ALL.map(CounterKey::default_value),
            dirty: 0,
        }
    }

    /// Seed a value read back from flash without marking it dirty
    ///
    /// Bounded setpoints are clamped so a stale record can never drive the
    /// rig outside its limits.
    pub fn load(&mut self, key: CounterKey, value: i32) {
        let value = match key.bounds() {
            Some(bounds) => bounds.clamp(value),
            None => value,
        };
        self.values[key.slot() as usize] = value;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty != 0
    }

    /// Take every changed counter, clearing the dirty marks
    pub fn take_dirty(&mut self) -> DirtyCounters {
        let mut changed = DirtyCounters::new();
        for key in CounterKey::ALL {
            let bit = 1 << key.slot();
            if self.dirty & bit != 0 {
                // Capacity equals the counter count
                let _ = changed.push((key, self.values[key.slot() as usize]));
            }
        }
        self.dirty = 0;
        changed
    }
}

impl CounterStore for CounterBank {
    fn get(&self, key: CounterKey) -> i32 {
        self.values[key.slot() as usize]
    }

    fn set(&mut self, key: CounterKey, value: i32) {
        let slot = key.slot() as usize;
        if self.values[slot] != value {
            self.values[slot] = value;
            self.dirty |= 1 << slot;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strapbench_core::store::{adjust, Direction};

    #[test]
    fn test_defaults() {
        let bank = CounterBank::new();
        assert_eq!(bank.get(CounterKey::FillForceSetpoint), 1500);
        assert_eq!(bank.get(CounterKey::ShortCounter), 0);
        assert!(!bank.is_dirty());
    }

    #[test]
    fn test_load_is_clean_and_clamped() {
        let mut bank = CounterBank::new();
        bank.load(CounterKey::LongCounter, 120_000);
        bank.load(CounterKey::FeedTimeMs, 9000);
        assert!(!bank.is_dirty());
        assert_eq!(bank.get(CounterKey::LongCounter), 120_000);
        assert_eq!(bank.get(CounterKey::FeedTimeMs), 2000);
    }

    #[test]
    fn test_writes_mark_dirty() {
        let mut bank = CounterBank::new();
        bank.increment(CounterKey::ShortCounter);
        bank.increment(CounterKey::LongCounter);
        // Same value again: nothing to write
        bank.set(CounterKey::CooldownSeconds, 60);

        let dirty = bank.take_dirty();
        assert_eq!(
            dirty.as_slice(),
            &[(CounterKey::ShortCounter, 1), (CounterKey::LongCounter, 1)]
        );
        assert!(!bank.is_dirty());
        assert!(bank.take_dirty().is_empty());
    }

    #[test]
    fn test_operator_adjust_through_bank() {
        let mut bank = CounterBank::new();
        assert_eq!(adjust(&mut bank, CounterKey::CooldownSeconds, Direction::Down), Some(50));
        assert_eq!(bank.take_dirty().as_slice(), &[(CounterKey::CooldownSeconds, 50)]);
    }
}
