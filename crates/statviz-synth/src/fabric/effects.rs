//! Deterministic demographic effects on latent scores.
//!
//! Two independent mean shifts, each on its own latent column:
//!
//! - **Gender**: every subject in the lower-scoring gender group has
//!   `d × sd(body_image)` subtracted from their body-image latent score. The
//!   SD is the overall population SD of the column before the shift, not a
//!   pooled within-group SD, so the achieved Cohen's d only approximates `d`.
//! - **Sector**: every subject gets `multiplier[sector] × sd(social_media)`
//!   added to their social-media latent score. The multipliers are empirical
//!   tuning constants; the resulting η² is close to, not equal to, the
//!   configured target.
//!
//! Because the shifts touch different columns, applying them in either order
//! yields the same matrix.

use crate::analytics::stats::population_std;
use crate::config::EffectConfig;
use crate::error::{Result, SynthError};
use crate::models::{Construct, Gender, LatentMatrix, Subject};
use tracing::debug;

/// Construct shifted by the gender effect.
pub const GENDER_EFFECT_CONSTRUCT: Construct = Construct::BodyImage;

/// Construct shifted by the sector effect.
pub const SECTOR_EFFECT_CONSTRUCT: Construct = Construct::SocialMedia;

/// Applies configured group effects to a latent matrix in place.
pub struct EffectInjector {
    gender_effect_size: f64,
    lower_gender: Gender,
    sector_multipliers: Vec<f64>,
}

impl EffectInjector {
    /// Create an injector with explicit parameters.
    pub fn new(
        gender_effect_size: f64,
        lower_gender: Gender,
        sector_multipliers: Vec<f64>,
    ) -> Self {
        Self {
            gender_effect_size,
            lower_gender,
            sector_multipliers,
        }
    }

    /// Create from configuration, resolving the lower gender label.
    pub fn from_config(
        effects: &EffectConfig,
        demographics: &crate::config::DemographicsConfig,
    ) -> Result<Self> {
        Ok(Self::new(
            effects.gender_effect_size,
            effects.lower_gender(demographics)?,
            effects.sector_multipliers.clone(),
        ))
    }

    /// Apply both effects.
    pub fn apply(&self, latent: &mut LatentMatrix, subjects: &[Subject]) -> Result<EffectReport> {
        let gender = self.apply_gender_effect(latent, subjects)?;
        let sector = self.apply_sector_effect(latent, subjects)?;
        Ok(EffectReport { gender, sector })
    }

    /// Shift the body-image latent scores of the lower gender group.
    pub fn apply_gender_effect(
        &self,
        latent: &mut LatentMatrix,
        subjects: &[Subject],
    ) -> Result<GenderShift> {
        check_lengths(latent, subjects)?;
        let column = latent.column_mut(GENDER_EFFECT_CONSTRUCT);
        let reference_sd = population_std(column);
        let shift = self.gender_effect_size * reference_sd;

        let mut affected = 0;
        for (value, subject) in column.iter_mut().zip(subjects) {
            if subject.gender == self.lower_gender {
                *value -= shift;
                affected += 1;
            }
        }

        debug!(
            effect_size = self.gender_effect_size,
            reference_sd, shift, affected, "applied gender effect"
        );

        Ok(GenderShift {
            effect_size: self.gender_effect_size,
            lower_gender: self.lower_gender,
            reference_sd,
            shift,
            affected,
        })
    }

    /// Shift every social-media latent score by its sector's offset.
    pub fn apply_sector_effect(
        &self,
        latent: &mut LatentMatrix,
        subjects: &[Subject],
    ) -> Result<SectorShift> {
        check_lengths(latent, subjects)?;
        if let Some(s) = subjects
            .iter()
            .find(|s| s.sector.index() >= self.sector_multipliers.len())
        {
            return Err(SynthError::config(format!(
                "subject {} has sector {} but only {} multipliers are configured",
                s.id,
                s.sector.index(),
                self.sector_multipliers.len()
            )));
        }

        let column = latent.column_mut(SECTOR_EFFECT_CONSTRUCT);
        let reference_sd = population_std(column);
        let shifts: Vec<f64> = self
            .sector_multipliers
            .iter()
            .map(|m| m * reference_sd)
            .collect();

        let mut counts = vec![0usize; shifts.len()];
        for (value, subject) in column.iter_mut().zip(subjects) {
            let k = subject.sector.index();
            *value += shifts[k];
            counts[k] += 1;
        }

        debug!(reference_sd, ?shifts, ?counts, "applied sector effect");

        Ok(SectorShift {
            multipliers: self.sector_multipliers.clone(),
            reference_sd,
            shifts,
            counts,
        })
    }
}

fn check_lengths(latent: &LatentMatrix, subjects: &[Subject]) -> Result<()> {
    if latent.len() != subjects.len() {
        return Err(SynthError::config(format!(
            "latent matrix has {} rows but there are {} subjects",
            latent.len(),
            subjects.len()
        )));
    }
    Ok(())
}

/// What the gender effect did.
#[derive(Debug, Clone, PartialEq)]
pub struct GenderShift {
    /// Configured Cohen's d.
    pub effect_size: f64,
    /// Group that was shifted down.
    pub lower_gender: Gender,
    /// Population SD of the body-image column before the shift.
    pub reference_sd: f64,
    /// Amount subtracted from each affected subject.
    pub shift: f64,
    /// Number of shifted subjects.
    pub affected: usize,
}

/// What the sector effect did.
#[derive(Debug, Clone, PartialEq)]
pub struct SectorShift {
    /// Configured multipliers per sector.
    pub multipliers: Vec<f64>,
    /// Population SD of the social-media column before the shift.
    pub reference_sd: f64,
    /// Amount added per sector.
    pub shifts: Vec<f64>,
    /// Subjects per sector.
    pub counts: Vec<usize>,
}

/// Record of both applied effects.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectReport {
    /// Gender effect.
    pub gender: GenderShift,
    /// Sector effect.
    pub sector: SectorShift,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PerConstruct, Sector};

    fn fixture() -> (LatentMatrix, Vec<Subject>) {
        let latent = LatentMatrix::from_columns(PerConstruct::new(
            vec![-1.0, 0.0, 1.0, 2.0],
            vec![0.5, -0.5, 1.5, -1.5],
            vec![0.1, 0.2, 0.3, 0.4],
        ))
        .unwrap();
        let subjects = vec![
            Subject::new(1, Gender(0), 15, Sector(0)),
            Subject::new(2, Gender(1), 15, Sector(1)),
            Subject::new(3, Gender(1), 16, Sector(2)),
            Subject::new(4, Gender(0), 17, Sector(0)),
        ];
        (latent, subjects)
    }

    fn injector() -> EffectInjector {
        EffectInjector::new(0.5, Gender(1), vec![0.4, 0.0, -0.5])
    }

    #[test]
    fn test_gender_shift_uses_overall_sd() {
        let (mut latent, subjects) = fixture();
        let before = latent.column(Construct::BodyImage).to_vec();
        let sd = population_std(&before);

        let shift = injector().apply_gender_effect(&mut latent, &subjects).unwrap();
        assert_eq!(shift.affected, 2);
        assert!((shift.shift - 0.5 * sd).abs() < 1e-12);

        let after = latent.column(Construct::BodyImage);
        assert_eq!(after[0], before[0]);
        assert_eq!(after[3], before[3]);
        assert!((after[1] - (before[1] - 0.5 * sd)).abs() < 1e-12);
        assert!((after[2] - (before[2] - 0.5 * sd)).abs() < 1e-12);

        // Other columns untouched
        assert_eq!(latent.column(Construct::SocialMedia), &[-1.0, 0.0, 1.0, 2.0]);
    }

    #[test]
    fn test_sector_shift_per_multiplier() {
        let (mut latent, subjects) = fixture();
        let before = latent.column(Construct::SocialMedia).to_vec();
        let sd = population_std(&before);

        let shift = injector().apply_sector_effect(&mut latent, &subjects).unwrap();
        assert_eq!(shift.counts, vec![2, 1, 1]);

        let after = latent.column(Construct::SocialMedia);
        assert!((after[0] - (before[0] + 0.4 * sd)).abs() < 1e-12);
        assert_eq!(after[1], before[1]); // multiplier 0
        assert!((after[2] - (before[2] - 0.5 * sd)).abs() < 1e-12);
        assert!((after[3] - (before[3] + 0.4 * sd)).abs() < 1e-12);
    }

    #[test]
    fn test_effects_are_order_insensitive() {
        let (mut a, subjects) = fixture();
        let mut b = a.clone();
        let inj = injector();

        inj.apply_gender_effect(&mut a, &subjects).unwrap();
        inj.apply_sector_effect(&mut a, &subjects).unwrap();

        inj.apply_sector_effect(&mut b, &subjects).unwrap();
        inj.apply_gender_effect(&mut b, &subjects).unwrap();

        assert_eq!(a, b);
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let (mut latent, mut subjects) = fixture();
        subjects.pop();
        assert!(injector().apply(&mut latent, &subjects).unwrap_err().is_config());
    }

    #[test]
    fn test_unknown_sector_rejected() {
        let (mut latent, mut subjects) = fixture();
        subjects[0].sector = Sector(7);
        assert!(injector()
            .apply_sector_effect(&mut latent, &subjects)
            .unwrap_err()
            .is_config());
    }
}
