//! Configuration persistence
//!
//! Loads the rig configuration override from flash storage.
//! The caller falls back to the embedded rig.toml if flash is empty.

use core::str;
use defmt::*;

use strapbench_core::config::{parse_rig_config, ParseError, RigConfig};
use strapbench_hal_rp2040::flash::{FlashError, Rp2040FlashStorage, StorageKey};
// Import the FlashStorage trait to bring methods into scope
use strapbench_hal_rp2040::FlashStorageTrait;

/// Maximum TOML config size
const MAX_TOML_SIZE: usize = 2048;

/// Configuration load errors
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LoadError {
    /// Flash operation failed
    Flash(FlashError),
    /// Invalid UTF-8 in TOML data
    InvalidUtf8,
    /// TOML parsing or validation failed
    Parse(ParseError),
}

impl From<FlashError> for LoadError {
    fn from(e: FlashError) -> Self {
        LoadError::Flash(e)
    }
}

impl From<ParseError> for LoadError {
    fn from(e: ParseError) -> Self {
        LoadError::Parse(e)
    }
}

/// Configuration persistence manager
pub struct ConfigPersistence<'d> {
    storage: Rp2040FlashStorage<'d>,
}

impl<'d> ConfigPersistence<'d> {
    pub fn new(storage: Rp2040FlashStorage<'d>) -> Self {
        Self { storage }
    }

    /// Consume this persistence manager and return the underlying storage
    ///
    /// The storage moves on to the counter persistence task.
    pub fn into_storage(self) -> Rp2040FlashStorage<'d> {
        self.storage
    }

    /// Load the TOML override from flash
    pub async fn load(&mut self) -> Result<RigConfig, LoadError> {
        let mut buffer = [0u8; MAX_TOML_SIZE];
        let len = self
            .storage
            .read(StorageKey::RigConfigToml, &mut buffer)
            .await?;

        debug!("Read {} bytes of TOML config from flash", len);

        let text = str::from_utf8(&buffer[..len]).map_err(|_| LoadError::InvalidUtf8)?;
        Ok(parse_rig_config(text)?)
    }
}
