//! End-to-end synthesis pipeline.
//!
//! Stages run strictly in order against one [`SeedContext`]:
//! demographics → latent generation → effect injection → item mapping →
//! aggregation. Configuration and the correlation matrix are validated when
//! the pipeline is built, so a failing run never consumes a draw.

use super::{
    CorrelatedLatentGenerator, DemographicGenerator, EffectInjector, EffectReport, ItemMapper,
    SeedContext,
};
use crate::analytics::{VerificationEngine, VerificationReport};
use crate::config::SynthConfig;
use crate::error::Result;
use crate::models::{Dataset, LatentMatrix, PerConstruct};
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Pipeline stage, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineStage {
    /// Subject attributes.
    Demographics,
    /// Correlated latent scores.
    Latent,
    /// Gender and sector shifts.
    Effects,
    /// Scale-to-range and item expansion.
    Items,
    /// Mean scores and dataset assembly.
    Aggregate,
}

impl PipelineStage {
    /// All stages in execution order.
    pub const ALL: [PipelineStage; 5] = [
        PipelineStage::Demographics,
        PipelineStage::Latent,
        PipelineStage::Effects,
        PipelineStage::Items,
        PipelineStage::Aggregate,
    ];

    /// Stage name.
    pub fn name(&self) -> &'static str {
        match self {
            PipelineStage::Demographics => "demographics",
            PipelineStage::Latent => "latent",
            PipelineStage::Effects => "effects",
            PipelineStage::Items => "items",
            PipelineStage::Aggregate => "aggregate",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Pipeline statistics.
#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    /// Completed runs
    pub runs: u64,
    /// Subjects generated across all runs
    pub subjects_generated: u64,
    /// Random draws consumed by the last run
    pub draws: u64,
    /// Stage timings of the last run
    pub stage_durations: Vec<(PipelineStage, Duration)>,
    /// Wall time of the last run (seconds)
    pub running_time_seconds: f64,
}

impl PipelineStats {
    /// Duration of one stage in the last run.
    pub fn stage_duration(&self, stage: PipelineStage) -> Option<Duration> {
        self.stage_durations
            .iter()
            .find(|(s, _)| *s == stage)
            .map(|(_, d)| *d)
    }
}

/// Result of one run.
#[derive(Debug, Clone)]
pub struct SynthesisOutput {
    /// The generated dataset.
    pub dataset: Dataset,
    /// Latent scores after effect injection.
    pub latent: LatentMatrix,
    /// What the effect injector applied.
    pub effects: EffectReport,
    /// Stage-1 target mean scores per construct.
    pub target_means: PerConstruct<Vec<f64>>,
}

/// The synthesis pipeline.
pub struct SynthesisPipeline {
    /// Configuration
    config: SynthConfig,
    /// Latent generator with the factorized target matrix
    generator: CorrelatedLatentGenerator,
    /// Effect injector
    injector: EffectInjector,
    /// Statistics
    stats: PipelineStats,
}

impl SynthesisPipeline {
    /// Validate the configuration and factorize the target matrix.
    ///
    /// Fails with a configuration error for invalid inputs and a numerical
    /// error for a matrix that is not positive definite.
    pub fn new(config: SynthConfig) -> Result<Self> {
        config.validate()?;
        let generator = CorrelatedLatentGenerator::from_targets(&config.correlations)?;
        let injector = EffectInjector::from_config(&config.effects, &config.demographics)?;
        Ok(Self {
            config,
            generator,
            injector,
            stats: PipelineStats::default(),
        })
    }

    /// Configuration.
    pub fn config(&self) -> &SynthConfig {
        &self.config
    }

    /// Latent generator.
    pub fn generator(&self) -> &CorrelatedLatentGenerator {
        &self.generator
    }

    /// Statistics.
    pub fn stats(&self) -> &PipelineStats {
        &self.stats
    }

    /// Run with a fresh context on the configured seed and stream.
    pub fn run(&mut self) -> Result<SynthesisOutput> {
        let mut ctx = SeedContext::with_stream(self.config.seed, self.config.stream);
        self.run_with(&mut ctx)
    }

    /// Run against a caller-supplied context.
    pub fn run_with(&mut self, ctx: &mut SeedContext) -> Result<SynthesisOutput> {
        let n = self.config.sample_size;
        let start = Instant::now();
        let draws_before = ctx.draws();
        let mut timings = Vec::with_capacity(PipelineStage::ALL.len());

        info!(subjects = n, seed = ctx.seed(), stream = ctx.stream(), "synthesis started");

        let t = Instant::now();
        let subjects = DemographicGenerator::new(&self.config.demographics).generate(n, ctx)?;
        timings.push((PipelineStage::Demographics, t.elapsed()));
        debug!(stage = %PipelineStage::Demographics, draws = ctx.draws(), "stage complete");

        let t = Instant::now();
        let mut latent = self.generator.generate(n, ctx)?;
        timings.push((PipelineStage::Latent, t.elapsed()));
        debug!(stage = %PipelineStage::Latent, draws = ctx.draws(), "stage complete");

        let t = Instant::now();
        let effects = self.injector.apply(&mut latent, &subjects)?;
        timings.push((PipelineStage::Effects, t.elapsed()));
        debug!(
            stage = %PipelineStage::Effects,
            gender_shift = effects.gender.shift,
            sector_shifts = ?effects.sector.shifts,
            "stage complete"
        );

        let t = Instant::now();
        let mapper = ItemMapper::new(&self.config.scales, self.config.noise);
        let (items, target_means) = mapper.map(&latent, ctx);
        timings.push((PipelineStage::Items, t.elapsed()));
        debug!(stage = %PipelineStage::Items, draws = ctx.draws(), "stage complete");

        let t = Instant::now();
        let dataset = Dataset::new(
            subjects,
            items,
            self.config.demographics.gender.labels.clone(),
            self.config.demographics.sector.labels.clone(),
        );
        timings.push((PipelineStage::Aggregate, t.elapsed()));
        debug!(stage = %PipelineStage::Aggregate, "stage complete");

        self.stats.runs += 1;
        self.stats.subjects_generated += n as u64;
        self.stats.draws = ctx.draws() - draws_before;
        self.stats.stage_durations = timings;
        self.stats.running_time_seconds = start.elapsed().as_secs_f64();

        info!(
            subjects = n,
            draws = self.stats.draws,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "synthesis finished"
        );

        Ok(SynthesisOutput {
            dataset,
            latent,
            effects,
            target_means,
        })
    }

    /// Run, then verify the dataset against the configured targets.
    pub fn run_and_verify(&mut self) -> Result<(SynthesisOutput, VerificationReport)> {
        let output = self.run()?;
        let report = VerificationEngine::from_config(&self.config)?.verify(&output.dataset);
        Ok((output, report))
    }
}

/// Build a pipeline for `config` and run it once.
pub fn synthesize(config: SynthConfig) -> Result<SynthesisOutput> {
    SynthesisPipeline::new(config)?.run()
}
