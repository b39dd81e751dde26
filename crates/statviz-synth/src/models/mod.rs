//! Core data models for the synthetic study.
//!
//! Constructs are addressed by name through [`Construct`] and
//! [`PerConstruct`] rather than by column position.

mod construct;
mod dataset;
mod latent;
mod subject;

pub use construct::*;
pub use dataset::*;
pub use latent::*;
pub use subject::*;
