//! Statistical analysis of generated datasets.

pub mod stats;
mod verification;

pub use verification::*;
