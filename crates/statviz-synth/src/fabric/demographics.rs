//! Subject (participant) generation.

use super::SeedContext;
use crate::config::DemographicsConfig;
use crate::error::{Result, SynthError};
use crate::models::{Gender, Sector, Subject};

/// Draws the demographic attributes of every subject.
///
/// Draw order is all genders, then all ages, then all sectors.
pub struct DemographicGenerator<'a> {
    config: &'a DemographicsConfig,
}

impl<'a> DemographicGenerator<'a> {
    /// Create a generator over a demographic configuration.
    pub fn new(config: &'a DemographicsConfig) -> Self {
        Self { config }
    }

    /// Generate `n` subjects with ids `1..=n`.
    pub fn generate(&self, n: usize, ctx: &mut SeedContext) -> Result<Vec<Subject>> {
        if n == 0 {
            return Err(SynthError::config("sample size must be positive"));
        }
        let genders = ctx.categorical_many(&self.config.gender.probabilities, n)?;
        let ages: Vec<u8> = (0..n)
            .map(|_| ctx.int_inclusive(self.config.age.min, self.config.age.max))
            .collect();
        let sectors = ctx.categorical_many(&self.config.sector.probabilities, n)?;

        let subjects = genders
            .into_iter()
            .zip(ages)
            .zip(sectors)
            .enumerate()
            .map(|(i, ((g, age), s))| {
                Subject::new((i + 1) as u32, Gender(g as u8), age, Sector(s as u8))
            })
            .collect();
        Ok(subjects)
    }
}
