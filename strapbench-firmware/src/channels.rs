//! Inter-task communication channels
//!
//! Defines the static channels used for communication between Embassy tasks.
//! Uses embassy-sync primitives for safe async communication.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;

use strapbench_core::machine::Command;
use strapbench_core::status::Snapshot;
use strapbench_core::store::{CounterKey, COUNTER_COUNT};

/// Channel capacity for operator commands
const COMMAND_CHANNEL_SIZE: usize = 8;

/// Channel capacity for counter write-back, two full sets
pub const COUNTER_CHANNEL_SIZE: usize = 2 * COUNTER_COUNT;

/// Operator commands from the panel
pub static COMMAND_CHANNEL: Channel<CriticalSectionRawMutex, Command, COMMAND_CHANNEL_SIZE> =
    Channel::new();

/// Changed counters waiting to be written to flash
pub static COUNTER_WRITES: Channel<CriticalSectionRawMutex, (CounterKey, i32), COUNTER_CHANNEL_SIZE> =
    Channel::new();

/// Latest machine snapshot (updated every control tick)
pub static SNAPSHOT: Signal<CriticalSectionRawMutex, Snapshot> = Signal::new();
