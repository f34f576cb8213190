//! Valve and cylinder drivers

pub mod cylinder;

pub use cylinder::Cylinder;
