//! Digital inputs and per-tick sampling

pub mod debounce;
pub mod sampler;

pub use debounce::{Debounced, Edge};
pub use sampler::InputSampler;
