//! Rig valve bank
//!
//! Every pneumatic function of the rig is one valve. The 800 mm spring
//! cylinder is driven by a supply/exhaust pair whose four combinations
//! are named here.

use crate::traits::Actuator;

/// Number of valves on the rig
pub const VALVE_COUNT: usize = 11;

/// Rig valves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Valve {
    /// Main air supply to the tool
    MainAir,
    /// Spring cylinder supply
    SpringSupply,
    /// Spring cylinder exhaust block
    SpringExhaust,
    /// Clamp holding the strap start
    StartClamp,
    /// Tool rocker lever
    RockerLever,
    /// Tool tension key
    TensionKey,
    /// Tool weld key
    WeldKey,
    /// Holds the tool on the bench
    ToolHoldDown,
    /// Strap cutter
    Cutter,
    /// Feed clamp wheel
    FeedClamp,
    /// Strap feed motor
    FeedMotor,
}

impl Valve {
    /// All valves in bank order
    pub const ALL: [Valve; VALVE_COUNT] = [
        Valve::MainAir,
        Valve::SpringSupply,
        Valve::SpringExhaust,
        Valve::StartClamp,
        Valve::RockerLever,
        Valve::TensionKey,
        Valve::WeldKey,
        Valve::ToolHoldDown,
        Valve::Cutter,
        Valve::FeedClamp,
        Valve::FeedMotor,
    ];

    /// Position in the bank (and bit in [`Valves::bitmask`])
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Valve::MainAir => "main_air",
            Valve::SpringSupply => "spring_supply",
            Valve::SpringExhaust => "spring_exhaust",
            Valve::StartClamp => "start_clamp",
            Valve::RockerLever => "rocker_lever",
            Valve::TensionKey => "tension_key",
            Valve::WeldKey => "weld_key",
            Valve::ToolHoldDown => "tool_hold_down",
            Valve::Cutter => "cutter",
            Valve::FeedClamp => "feed_clamp",
            Valve::FeedMotor => "feed_motor",
        }
    }
}

/// The rig's valve bank
pub struct Valves<A: Actuator> {
    bank: [A; VALVE_COUNT],
}

impl<A: Actuator> Valves<A> {
    /// Wrap actuators given in [`Valve::ALL`] order
    pub fn new(bank: [A; VALVE_COUNT]) -> Self {
        Self { bank }
    }

    pub fn get(&self, valve: Valve) -> &A {
        &self.bank[valve.index()]
    }

    pub fn get_mut(&mut self, valve: Valve) -> &mut A {
        &mut self.bank[valve.index()]
    }

    pub fn set(&mut self, valve: Valve, on: bool) {
        self.get_mut(valve).set(on);
    }

    pub fn toggle(&mut self, valve: Valve) {
        self.get_mut(valve).toggle();
    }

    pub fn is_on(&self, valve: Valve) -> bool {
        self.get(valve).get_state()
    }

    /// Advance a timed stroke on `valve`
    pub fn stroke(&mut self, valve: Valve, now_ms: u32, extend_ms: u32, retract_ms: u32) {
        self.get_mut(valve).stroke(now_ms, extend_ms, retract_ms);
    }

    pub fn stroke_completed(&mut self, valve: Valve) -> bool {
        self.get_mut(valve).stroke_completed()
    }

    /// Spring free: supply off, exhaust open
    pub fn spring_vent(&mut self) {
        self.set_spring(false, false);
    }

    /// Spring moves without building pressure
    pub fn spring_move(&mut self) {
        self.set_spring(true, false);
    }

    /// Spring holds its pressure
    pub fn spring_block(&mut self) {
        self.set_spring(false, true);
    }

    /// Spring fills
    pub fn spring_build_pressure(&mut self) {
        self.set_spring(true, true);
    }

    fn set_spring(&mut self, supply: bool, exhaust: bool) {
        self.set(Valve::SpringSupply, supply);
        self.set(Valve::SpringExhaust, exhaust);
    }

    /// Startup configuration
    ///
    /// Main air stays closed until the operator resets the rig;
    /// the tool is held down.
    pub fn power_on(&mut self) {
        self.set(Valve::MainAir, false);
        self.set(Valve::ToolHoldDown, true);
    }

    /// Safe idle: air on, every tool function released, spring vented
    pub fn reset_to_idle(&mut self) {
        self.set(Valve::MainAir, true);
        for valve in [
            Valve::RockerLever,
            Valve::TensionKey,
            Valve::WeldKey,
            Valve::FeedClamp,
            Valve::Cutter,
            Valve::FeedMotor,
        ] {
            self.set(valve, false);
        }
        self.spring_vent();
    }

    /// Safe idle with the main air closed
    pub fn hard_stop(&mut self) {
        self.reset_to_idle();
        self.set(Valve::MainAir, false);
    }

    /// Valve states, bit `n` for `Valve::ALL[n]`
    pub fn bitmask(&self) -> u16 {
        Valve::ALL
            .iter()
            .filter(|v| self.is_on(**v))
            .fold(0u16, |mask, v| mask | (1 << v.index()))
    }
}
