//! # statviz-synth
//!
//! Seeded synthesis of survey datasets with known statistical structure.
//!
//! The crate generates a fictional adolescent study of social-media use, body
//! image and depression: subjects with demographics, three correlated latent
//! constructs, deterministic gender and sector effects, and ordinal Likert
//! items per construct. A verification engine then recomputes the statistics
//! the data was tuned for.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//! │ Demographics │──▶│ Latent (Chol)│──▶│   Effects    │──▶│ Item mapper  │
//! └──────────────┘   └──────────────┘   └──────────────┘   └──────────────┘
//!         ▲                  ▲                                     │
//!         └──── SeedContext ─┴─────────────────────────────────────┤
//!                                                                  ▼
//!                                      ┌──────────────┐   ┌──────────────┐
//!                                      │ Verification │◀──│   Dataset    │
//!                                      └──────────────┘   └──────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use statviz_synth::prelude::*;
//!
//! let mut pipeline = SynthesisPipeline::new(SynthConfig::reference())?;
//! let (output, report) = pipeline.run_and_verify()?;
//!
//! for row in output.dataset.rows().iter().take(3) {
//!     println!("{:?}", row.cells());
//! }
//! if let Some(gender) = &report.gender {
//!     println!("d = {:.2}, p = {:.4}", gender.achieved_d(), gender.test.p_value);
//! }
//! # Ok::<(), statviz_synth::SynthError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod analytics;
pub mod config;
pub mod error;
pub mod fabric;
pub mod models;

pub use error::{Result, SynthError};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::models::{
        // Core types
        Construct, PerConstruct, Gender, Sector, Subject,
        // Data
        LatentMatrix, ItemMatrix, Dataset, DatasetRow,
    };

    pub use crate::config::{
        SynthConfig, CorrelationTargets, ScaleSpec, CategoricalSpec, AgeRange,
        DemographicsConfig, EffectConfig, ItemNoise,
    };

    pub use crate::fabric::{
        SeedContext, CorrelatedLatentGenerator, TargetCorrelationMatrix,
        EffectInjector, EffectReport, ItemMapper, SynthesisPipeline,
        SynthesisOutput, PipelineStage, PipelineStats, synthesize,
    };

    pub use crate::analytics::{
        VerificationEngine, VerificationReport, VerificationWarning, Analysis,
    };

    pub use crate::error::{Result, SynthError};
}

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
