//! Embassy async tasks
//!
//! Each task runs independently and communicates via channels/signals.

pub mod control;
pub mod panel;
pub mod persist;
pub mod status;

pub use control::control_task;
pub use panel::panel_task;
pub use persist::persist_task;
pub use status::status_task;

use embassy_time::Instant;

/// Milliseconds since boot on the shared 32-bit rig clock
pub fn now_ms() -> u32 {
    Instant::now().as_millis() as u32
}
