//! Data fabric for synthetic survey data generation.
//!
//! The fabric turns a configuration into a dataset: a seeded random source,
//! demographic draws, correlated latent scores, deterministic group effects,
//! and the mapping of latent scores onto Likert items.

mod seed;
mod demographics;
mod latent_gen;
mod effects;
mod items;
mod pipeline;

pub use seed::*;
pub use demographics::*;
pub use latent_gen::*;
pub use effects::*;
pub use items::*;
pub use pipeline::*;
