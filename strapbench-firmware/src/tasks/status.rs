//! Status logging task
//!
//! Logs the parts of the snapshot an operator cares about whenever they
//! change.

use defmt::*;

use strapbench_core::status::Snapshot;

use crate::channels::SNAPSHOT;

/// Whether two snapshots differ in anything worth a log line
fn changed(previous: &Snapshot, current: &Snapshot) -> bool {
    previous.step_index != current.step_index
        || previous.mode != current.mode
        || previous.running != current.running
        || previous.status != current.status
        || previous.cooldown_remaining_s / 10 != current.cooldown_remaining_s / 10
}

/// Status task - snapshot change log
#[embassy_executor::task]
pub async fn status_task() {
    info!("Status task started");

    let mut previous: Option<Snapshot> = None;

    loop {
        let snapshot = SNAPSHOT.wait().await;
        if previous.is_some_and(|p| !changed(&p, &snapshot)) {
            continue;
        }

        info!(
            "[{}] {} {:?} {} | {} N (gauge {}) | cycles {}/{} | stalls {} | valves {=u16:#b}",
            snapshot.step_index,
            snapshot.step_name,
            snapshot.mode,
            if snapshot.running { "RUN" } else { "HOLD" },
            snapshot.force,
            snapshot.gauge,
            snapshot.short_counter,
            snapshot.long_counter,
            snapshot.stall_count,
            snapshot.valves,
        );
        if snapshot.cooldown_remaining_s > 0 {
            info!("Cooldown: {} s left", snapshot.cooldown_remaining_s);
        }
        if previous.map_or(true, |p| p.status != snapshot.status) {
            info!("Status: {}", Display2Format(&snapshot.status));
        }

        previous = Some(snapshot);
    }
}
