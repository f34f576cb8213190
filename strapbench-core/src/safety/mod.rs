//! Supervisory monitoring
//!
//! Watches strap presence and overall step progress independently of the
//! steps themselves.

pub mod monitor;

pub use monitor::{MaterialChange, StallAction, StallTier, SupervisoryMonitor, HARD_STOP_TIER};
