//! Counter persistence task
//!
//! Writes changed counters to flash one at a time, off the control path.

use defmt::*;

use strapbench_hal_rp2040::flash::Rp2040FlashStorage;

use crate::channels::COUNTER_WRITES;
use crate::config::save_counter;

/// Persist task - drains the counter write queue
#[embassy_executor::task]
pub async fn persist_task(mut storage: Rp2040FlashStorage<'static>) {
    info!("Persist task started");

    loop {
        let (key, value) = COUNTER_WRITES.receive().await;
        if let Err(e) = save_counter(&mut storage, key, value).await {
            error!("Failed to save {}: {:?}", key.name(), e);
        }
    }
}
