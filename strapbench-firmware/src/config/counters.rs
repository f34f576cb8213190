//! Durable counter persistence
//!
//! Each counter is a postcard-encoded `i32` under its own flash key.

use defmt::*;

use strapbench_core::store::{CounterKey, CounterStore};
use strapbench_drivers::store::CounterBank;
use strapbench_hal_rp2040::flash::{FlashError, Rp2040FlashStorage, StorageKey};
use strapbench_hal_rp2040::FlashStorageTrait;

/// Largest postcard encoding of an `i32`
const MAX_COUNTER_SIZE: usize = 5;

/// Counter persistence errors
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PersistError {
    /// Flash operation failed
    Flash(FlashError),
    /// Deserialization failed
    Deserialize,
    /// Serialization failed
    Serialize,
}

impl From<FlashError> for PersistError {
    fn from(e: FlashError) -> Self {
        PersistError::Flash(e)
    }
}

fn storage_key(key: CounterKey) -> StorageKey {
    StorageKey::Counter(key.slot())
}

/// Load every stored counter into the bank
///
/// Counters missing from flash keep their defaults.
pub async fn load_counters(storage: &mut Rp2040FlashStorage<'_>, bank: &mut CounterBank) {
    for key in CounterKey::ALL {
        match load_counter(storage, key).await {
            Ok(value) => bank.load(key, value),
            Err(PersistError::Flash(FlashError::NotFound)) => {
                debug!("No stored {}, using default", key.name());
            }
            Err(e) => warn!("Failed to load {}: {:?}, using default", key.name(), e),
        }
    }

    info!(
        "Counters: short {}, long {}",
        bank.get(CounterKey::ShortCounter),
        bank.get(CounterKey::LongCounter)
    );
}

async fn load_counter(
    storage: &mut Rp2040FlashStorage<'_>,
    key: CounterKey,
) -> Result<i32, PersistError> {
    let mut buffer = [0u8; MAX_COUNTER_SIZE];
    let len = storage.read(storage_key(key), &mut buffer).await?;
    postcard::from_bytes(&buffer[..len]).map_err(|_| PersistError::Deserialize)
}

/// Write one counter value
pub async fn save_counter(
    storage: &mut Rp2040FlashStorage<'_>,
    key: CounterKey,
    value: i32,
) -> Result<(), PersistError> {
    let mut buffer = [0u8; MAX_COUNTER_SIZE];
    let bytes = postcard::to_slice(&value, &mut buffer).map_err(|_| PersistError::Serialize)?;

    storage.write(storage_key(key), bytes).await?;
    trace!("Saved {} = {}", key.name(), value);
    Ok(())
}
