//! Operator panel task
//!
//! Polls the debounced push buttons and turns presses into commands.

use defmt::*;
use embassy_time::{Duration, Ticker};

use strapbench_core::machine::Command;
use strapbench_drivers::input::{Debounced, Edge};
use strapbench_hal_rp2040::gpio::SensorPin;

use super::now_ms;
use crate::channels::COMMAND_CHANNEL;

/// Button poll interval in milliseconds
const PANEL_POLL_MS: u64 = 5;

/// Number of panel buttons
pub const PANEL_BUTTONS: usize = 6;

/// Panel push buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PanelButton {
    RunPause,
    Mode,
    StepBack,
    StepForward,
    Reset,
    /// Press clears the short counter, holding also clears the long one
    CounterReset,
}

impl PanelButton {
    /// Command for a debounced edge, if the button acts on it
    pub fn command(self, edge: Edge) -> Option<Command> {
        match (self, edge) {
            (PanelButton::RunPause, Edge::Rising) => Some(Command::ToggleRunning),
            (PanelButton::Mode, Edge::Rising) => Some(Command::ToggleMode),
            (PanelButton::StepBack, Edge::Rising) => Some(Command::StepBack),
            (PanelButton::StepForward, Edge::Rising) => Some(Command::StepForward),
            (PanelButton::Reset, Edge::Rising) => Some(Command::ResetMachine),
            (PanelButton::CounterReset, Edge::Rising) => Some(Command::CounterResetPressed),
            (PanelButton::CounterReset, Edge::Falling) => Some(Command::CounterResetReleased),
            _ => None,
        }
    }
}

pub type PanelInputs = [(PanelButton, Debounced<SensorPin<'static>>); PANEL_BUTTONS];

/// Panel task - button edges to commands
#[embassy_executor::task]
pub async fn panel_task(mut buttons: PanelInputs) {
    info!("Panel task started");

    let mut ticker = Ticker::every(Duration::from_millis(PANEL_POLL_MS));

    loop {
        ticker.next().await;
        let now = now_ms();

        for (button, input) in buttons.iter_mut() {
            let Some(command) = input.update(now).and_then(|edge| button.command(edge)) else {
                continue;
            };
            debug!("Button {:?}: {:?}", button, command);
            COMMAND_CHANNEL.send(command).await;
        }
    }
}
