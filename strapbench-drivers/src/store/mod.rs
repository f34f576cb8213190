//! Counter storage

pub mod counter_bank;

pub use counter_bank::CounterBank;
