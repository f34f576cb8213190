//! Control task
//!
//! Runs the machine at the configured tick rate: sample the inputs, apply
//! queued operator commands, tick, then publish the snapshot and hand
//! changed counters to the persistence task.

use defmt::*;
use embassy_time::{Duration, Ticker, Timer};

use strapbench_core::state::Event;
use strapbench_core::store::COUNTER_COUNT;

use super::now_ms;
use crate::board::{RigMachine, RigSampler};
use crate::channels::{COMMAND_CHANNEL, COUNTER_WRITES, SNAPSHOT};

/// Control task - owns the machine
#[embassy_executor::task]
pub async fn control_task(mut machine: RigMachine, mut sampler: RigSampler) {
    let tick_ms = machine.config().tick_interval_ms;
    let startup_ms = machine.config().startup_delay_ms;
    info!("Control task started, first tick in {} ms", startup_ms);

    // Let the air supply and sensors settle
    Timer::after_millis(startup_ms as u64).await;
    SNAPSHOT.signal(machine.snapshot());

    let mut ticker = Ticker::every(Duration::from_millis(tick_ms as u64));
    let mut conversion_failures = 0;

    loop {
        ticker.next().await;
        let now = now_ms();

        while let Ok(command) = COMMAND_CHANNEL.try_receive() {
            debug!("Command: {:?}", command);
            if let Some(event) = machine.command(command, now) {
                log_event(&event);
            }
        }

        let inputs = sampler.sample(now);
        if sampler.pressure_failures() != conversion_failures {
            conversion_failures = sampler.pressure_failures();
            warn!("Pressure conversion failed ({} total)", conversion_failures);
        }

        for event in machine.tick(now, &inputs) {
            log_event(&event);
        }

        SNAPSHOT.signal(machine.snapshot());

        // Counters stay dirty until the queue has room for all of them
        let store = machine.store_mut();
        if store.is_dirty() && COUNTER_WRITES.free_capacity() >= COUNTER_COUNT {
            for write in store.take_dirty() {
                let _ = COUNTER_WRITES.try_send(write);
            }
        }
    }
}

fn log_event(event: &Event) {
    match event {
        Event::StepEntered(kind) => info!("Step {}", kind.name()),
        Event::CycleCompleted { short, long } => {
            info!("Cycle complete: short {}, long {}", short, long)
        }
        Event::MaterialMissing => warn!("Strap missing, rig paused"),
        Event::MaterialRestored => info!("Strap restored"),
        Event::StallRecovery { attempt } => warn!("Stall detected, recovery attempt {}", attempt),
        Event::HardStop => error!("Repeated stalls, rig stopped until reset"),
        Event::ResetResolved { auto } => info!("Recovery reset done, auto: {}", auto),
        Event::CooldownStarted { seconds } => info!("Cooling down for {} s", seconds),
        Event::CooldownFinished => info!("Cooldown finished"),
        Event::ShortCounterCleared => info!("Short counter cleared"),
        Event::LongCounterCleared => info!("Long counter cleared"),
        Event::MachineReset => info!("Machine reset"),
    }
}
