//! Strapbench - Strapping Tool Endurance Rig Firmware
//!
//! Main firmware binary for the RP2040-based rig controller. The rig
//! straps, welds and releases in an endless cycle while counting cycles
//! and guarding against stalls.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use {defmt_rtt as _, panic_probe as _};

use strapbench_core::config::{parse_rig_config, RigConfig};
use strapbench_core::machine::Machine;
use strapbench_drivers::store::CounterBank;
use strapbench_hal_rp2040::flash::FlashError;

use crate::board::Board;
use crate::config::{load_counters, ConfigPersistence, LoadError};

/// Embedded default configuration (compiled into firmware)
/// Edit rig.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../rig.toml");

mod board;
mod channels;
mod config;
mod tasks;

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Strapbench firmware starting...");

    let p = embassy_rp::init(Default::default());
    let board = Board::new(p);
    info!("Peripherals initialized");

    // Flash override first, embedded rig.toml otherwise
    let mut persistence = ConfigPersistence::new(board.flash);
    let rig_config = match persistence.load().await {
        Ok(config) => {
            info!("Loaded rig configuration from flash");
            config
        }
        Err(LoadError::Flash(FlashError::NotFound)) => {
            info!("No configuration in flash, using embedded defaults");
            embedded_config()
        }
        Err(e) => {
            warn!("Flash configuration rejected: {:?}, using embedded defaults", e);
            embedded_config()
        }
    };
    let mut storage = persistence.into_storage();

    let mut counters = CounterBank::new();
    load_counters(&mut storage, &mut counters).await;

    info!(
        "Rig '{}': tick {} ms, stall timeout {} ms",
        rig_config.label.as_str(),
        rig_config.tick_interval_ms,
        rig_config.stall_timeout_ms
    );
    if rig_config.dry_run {
        warn!("Dry run: strap and position sensors are ignored");
    }

    let machine = Machine::new(rig_config, board.valves, counters);

    // Spawn tasks
    spawner.spawn(tasks::control_task(machine, board.sampler)).unwrap();
    spawner.spawn(tasks::panel_task(board.panel)).unwrap();
    spawner.spawn(tasks::persist_task(storage)).unwrap();
    spawner.spawn(tasks::status_task()).unwrap();

    info!("All tasks spawned, firmware running");

    loop {
        embassy_time::Timer::after_secs(60).await;
        trace!("Main loop heartbeat");
    }
}

/// Parse the rig.toml embedded at compile time
///
/// build.rs has already validated it; the built-in defaults are the last
/// resort.
fn embedded_config() -> RigConfig {
    match parse_rig_config(EMBEDDED_CONFIG) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to parse embedded config: {:?}", e);
            error!("Using built-in defaults");
            RigConfig::default()
        }
    }
}
