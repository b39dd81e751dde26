//! Synthesis configuration.
//!
//! All inputs of a run live in [`SynthConfig`]. It deserializes from TOML
//! (missing sections fall back to the reference scenario) and is validated
//! as a whole before any random draw happens.

use crate::error::{Result, SynthError};
use crate::models::{Construct, Gender, PerConstruct};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tolerance for probability vectors summing to one.
pub const PROBABILITY_TOLERANCE: f64 = 1e-6;

/// Stream id of the reference scenario.
pub const REFERENCE_STREAM: u64 = 54;

/// Complete configuration of a synthesis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthConfig {
    /// Number of subjects (N).
    pub sample_size: usize,
    /// Seed of the single random source.
    pub seed: u64,
    /// Stream id of the random source under `seed`.
    pub stream: u64,
    /// Pairwise target correlations between latent constructs.
    pub correlations: CorrelationTargets,
    /// Item scale per construct.
    pub scales: PerConstruct<ScaleSpec>,
    /// Demographic distributions.
    pub demographics: DemographicsConfig,
    /// Deterministic group effects.
    pub effects: EffectConfig,
    /// Item-level noise.
    pub noise: ItemNoise,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self::reference()
    }
}

impl SynthConfig {
    /// The reference adolescent study: N = 180, seed 42, stream 54.
    ///
    /// At this seed and stream the verified statistics fall inside the
    /// study's bands: r(social media, body image) in [−0.55, −0.25], a
    /// significant gender difference, and η² in [0.03, 0.15].
    pub fn reference() -> Self {
        Self {
            sample_size: 180,
            seed: 42,
            stream: REFERENCE_STREAM,
            correlations: CorrelationTargets::default(),
            scales: PerConstruct::new(
                ScaleSpec::new(10, 1.5, 4.5, 5),
                ScaleSpec::new(12, 2.0, 5.0, 6),
                ScaleSpec::new(8, 1.2, 3.2, 4),
            ),
            demographics: DemographicsConfig::default(),
            effects: EffectConfig::default(),
            noise: ItemNoise::default(),
        }
    }

    /// Same configuration with a different seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Same configuration on a different stream of the same seed.
    pub fn with_stream(mut self, stream: u64) -> Self {
        self.stream = stream;
        self
    }

    /// Same configuration with a different sample size.
    pub fn with_sample_size(mut self, sample_size: usize) -> Self {
        self.sample_size = sample_size;
        self
    }

    /// Parse from a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Read and parse a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Serialize to TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| SynthError::Parse(e.to_string()))
    }

    /// Check every configuration constraint.
    ///
    /// Correlation targets are range-checked here; positive definiteness is
    /// checked when the matrix is factorized.
    pub fn validate(&self) -> Result<()> {
        if self.sample_size == 0 {
            return Err(SynthError::config("sample_size must be positive"));
        }
        self.correlations.validate()?;
        for (construct, scale) in self.scales.iter() {
            scale.validate(construct)?;
        }
        self.demographics.validate()?;
        self.effects.validate(&self.demographics)?;
        self.noise.validate()?;
        Ok(())
    }
}

/// Pairwise target correlations of the latent constructs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorrelationTargets {
    /// social_media ↔ body_image
    pub social_media_body_image: f64,
    /// social_media ↔ depression
    pub social_media_depression: f64,
    /// body_image ↔ depression
    pub body_image_depression: f64,
}

impl Default for CorrelationTargets {
    fn default() -> Self {
        Self {
            social_media_body_image: -0.40,
            social_media_depression: 0.35,
            body_image_depression: -0.45,
        }
    }
}

impl CorrelationTargets {
    /// Target correlation between two constructs (1 on the diagonal).
    pub fn get(&self, a: Construct, b: Construct) -> f64 {
        use Construct::*;
        match (a, b) {
            _ if a == b => 1.0,
            (SocialMedia, BodyImage) | (BodyImage, SocialMedia) => self.social_media_body_image,
            (SocialMedia, Depression) | (Depression, SocialMedia) => self.social_media_depression,
            _ => self.body_image_depression,
        }
    }

    /// Full 3×3 matrix in canonical construct order.
    pub fn to_rows(&self) -> [[f64; 3]; 3] {
        let mut rows = [[0.0; 3]; 3];
        for a in Construct::ALL {
            for b in Construct::ALL {
                rows[a.index()][b.index()] = self.get(a, b);
            }
        }
        rows
    }

    fn validate(&self) -> Result<()> {
        for (a, b) in Construct::pairs() {
            let r = self.get(a, b);
            if !r.is_finite() || !(-1.0..=1.0).contains(&r) {
                return Err(SynthError::config(format!(
                    "correlation {a} ↔ {b} must lie in [-1, 1], got {r}"
                )));
            }
        }
        Ok(())
    }
}

/// Likert scale of one construct.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaleSpec {
    /// Number of items.
    pub items: usize,
    /// Lower bound of the target mean-score range.
    pub min_mean: f64,
    /// Upper bound of the target mean-score range.
    pub max_mean: f64,
    /// Highest item response (responses lie in 1..=scale_max).
    pub scale_max: u8,
}

impl Default for ScaleSpec {
    fn default() -> Self {
        Self::new(10, 1.5, 4.5, 5)
    }
}

impl ScaleSpec {
    /// Create a scale specification.
    pub fn new(items: usize, min_mean: f64, max_mean: f64, scale_max: u8) -> Self {
        Self {
            items,
            min_mean,
            max_mean,
            scale_max,
        }
    }

    fn validate(&self, construct: Construct) -> Result<()> {
        if self.items == 0 {
            return Err(SynthError::config(format!(
                "{construct}: item count must be positive"
            )));
        }
        if self.scale_max < 2 {
            return Err(SynthError::config(format!(
                "{construct}: scale_max must be at least 2, got {}",
                self.scale_max
            )));
        }
        if !self.min_mean.is_finite() || !self.max_mean.is_finite() {
            return Err(SynthError::config(format!(
                "{construct}: mean-score bounds must be finite"
            )));
        }
        if self.min_mean >= self.max_mean {
            return Err(SynthError::config(format!(
                "{construct}: min_mean ({}) must be strictly less than max_mean ({})",
                self.min_mean, self.max_mean
            )));
        }
        if self.min_mean < 1.0 || self.max_mean > self.scale_max as f64 {
            return Err(SynthError::config(format!(
                "{construct}: mean-score range [{}, {}] must lie within [1, {}]",
                self.min_mean, self.max_mean, self.scale_max
            )));
        }
        Ok(())
    }
}

/// Labelled categorical distribution. Labels are opaque to the generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoricalSpec {
    /// Category labels.
    pub labels: Vec<String>,
    /// Category probabilities, same order as `labels`.
    pub probabilities: Vec<f64>,
}

impl CategoricalSpec {
    /// Create from `(label, probability)` pairs.
    pub fn new<S: Into<String>>(categories: impl IntoIterator<Item = (S, f64)>) -> Self {
        let (labels, probabilities): (Vec<String>, Vec<f64>) = categories
            .into_iter()
            .map(|(l, p)| (Into::<String>::into(l), p))
            .unzip();
        Self {
            labels,
            probabilities,
        }
    }

    /// Number of categories.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether there are no categories.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Index of a label.
    pub fn position(&self, label: &str) -> Option<usize> {
        self.labels.iter().position(|l| l == label)
    }

    fn validate(&self, name: &str) -> Result<()> {
        if self.labels.len() != self.probabilities.len() {
            return Err(SynthError::config(format!(
                "{name}: {} labels but {} probabilities",
                self.labels.len(),
                self.probabilities.len()
            )));
        }
        if self.labels.len() > u8::MAX as usize {
            return Err(SynthError::config(format!("{name}: too many categories")));
        }
        validate_probabilities(name, &self.probabilities)
    }
}

/// Check that a probability vector is non-empty, non-negative and sums to one.
pub fn validate_probabilities(name: &str, probabilities: &[f64]) -> Result<()> {
    if probabilities.is_empty() {
        return Err(SynthError::config(format!("{name}: no categories")));
    }
    if let Some(p) = probabilities.iter().find(|p| !p.is_finite() || **p < 0.0) {
        return Err(SynthError::config(format!(
            "{name}: probabilities must be finite and non-negative, got {p}"
        )));
    }
    let total: f64 = probabilities.iter().sum();
    if (total - 1.0).abs() > PROBABILITY_TOLERANCE {
        return Err(SynthError::config(format!(
            "{name}: probabilities must sum to 1.0, got {total}"
        )));
    }
    Ok(())
}

/// Inclusive integer age range, sampled uniformly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeRange {
    /// Youngest age.
    pub min: u8,
    /// Oldest age.
    pub max: u8,
}

impl Default for AgeRange {
    fn default() -> Self {
        Self { min: 14, max: 18 }
    }
}

/// Demographic distributions of the sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemographicsConfig {
    /// Two gender categories.
    pub gender: CategoricalSpec,
    /// Age range.
    pub age: AgeRange,
    /// Sector categories, ordered by effect strength.
    pub sector: CategoricalSpec,
}

impl Default for DemographicsConfig {
    fn default() -> Self {
        Self {
            gender: CategoricalSpec::new([("boy", 0.45), ("girl", 0.55)]),
            age: AgeRange::default(),
            sector: CategoricalSpec::new([
                ("state", 0.5),
                ("state_religious", 0.3),
                ("ultra_orthodox", 0.2),
            ]),
        }
    }
}

impl DemographicsConfig {
    fn validate(&self) -> Result<()> {
        self.gender.validate("gender")?;
        if self.gender.len() != 2 {
            return Err(SynthError::config(format!(
                "gender must have exactly 2 categories, got {}",
                self.gender.len()
            )));
        }
        self.sector.validate("sector")?;
        if self.age.min > self.age.max {
            return Err(SynthError::config(format!(
                "age range is empty: {}..={}",
                self.age.min, self.age.max
            )));
        }
        Ok(())
    }
}

/// Deterministic demographic effects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectConfig {
    /// Target standardized mean difference on body image (Cohen's d).
    pub gender_effect_size: f64,
    /// Label of the gender group shifted downwards.
    pub lower_gender: String,
    /// Social-media offset per sector, in units of the column's SD.
    pub sector_multipliers: Vec<f64>,
    /// η² the multipliers were tuned towards. Reported, not enforced.
    pub target_eta_squared: f64,
}

impl Default for EffectConfig {
    fn default() -> Self {
        Self {
            gender_effect_size: 0.5,
            lower_gender: "girl".to_string(),
            sector_multipliers: vec![0.4, 0.0, -0.5],
            target_eta_squared: 0.08,
        }
    }
}

impl EffectConfig {
    /// Resolve the lower-scoring gender label against the configured labels.
    pub fn lower_gender(&self, demographics: &DemographicsConfig) -> Result<Gender> {
        demographics
            .gender
            .position(&self.lower_gender)
            .map(|i| Gender(i as u8))
            .ok_or_else(|| {
                SynthError::config(format!(
                    "lower_gender '{}' is not one of {:?}",
                    self.lower_gender, demographics.gender.labels
                ))
            })
    }

    fn validate(&self, demographics: &DemographicsConfig) -> Result<()> {
        if !self.gender_effect_size.is_finite() {
            return Err(SynthError::config("gender_effect_size must be finite"));
        }
        self.lower_gender(demographics)?;
        if self.sector_multipliers.len() != demographics.sector.len() {
            return Err(SynthError::config(format!(
                "expected {} sector multipliers, got {}",
                demographics.sector.len(),
                self.sector_multipliers.len()
            )));
        }
        if self.sector_multipliers.iter().any(|m| !m.is_finite()) {
            return Err(SynthError::config("sector multipliers must be finite"));
        }
        Ok(())
    }
}

/// Standard deviations of item-level noise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemNoise {
    /// SD of the per-item offset shared by all subjects.
    pub item_shift_sd: f64,
    /// SD of the per-response noise.
    pub response_sd: f64,
}

impl Default for ItemNoise {
    fn default() -> Self {
        Self {
            item_shift_sd: 0.3,
            response_sd: 0.8,
        }
    }
}

impl ItemNoise {
    /// No noise: every item equals the rounded target mean.
    pub fn none() -> Self {
        Self {
            item_shift_sd: 0.0,
            response_sd: 0.0,
        }
    }

    fn validate(&self) -> Result<()> {
        for (name, sd) in [
            ("item_shift_sd", self.item_shift_sd),
            ("response_sd", self.response_sd),
        ] {
            if !sd.is_finite() || sd < 0.0 {
                return Err(SynthError::config(format!(
                    "{name} must be finite and non-negative, got {sd}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_config_is_valid() {
        let config = SynthConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.sample_size, 180);
        assert_eq!(config.scales.body_image.items, 12);
    }

    #[test]
    fn test_probabilities_must_sum_to_one() {
        let mut config = SynthConfig::default();
        config.demographics.sector.probabilities = vec![0.5, 0.3, 0.1];
        let err = config.validate().unwrap_err();
        assert!(err.is_config(), "{err}");
    }

    #[test]
    fn test_negative_probability_rejected() {
        assert!(validate_probabilities("p", &[1.2, -0.2]).is_err());
        assert!(validate_probabilities("p", &[]).is_err());
        assert!(validate_probabilities("p", &[0.25, 0.75]).is_ok());
    }

    #[test]
    fn test_scale_bounds() {
        let mut config = SynthConfig::default();
        config.scales.depression.min_mean = 3.2;
        assert!(config.validate().unwrap_err().is_config());

        let mut config = SynthConfig::default();
        config.scales.social_media.items = 0;
        assert!(config.validate().unwrap_err().is_config());

        let mut config = SynthConfig::default();
        config.scales.depression.max_mean = 4.5;
        assert!(config.validate().unwrap_err().is_config());
    }

    #[test]
    fn test_sample_size_positive() {
        let config = SynthConfig::default().with_sample_size(0);
        assert!(config.validate().unwrap_err().is_config());
    }

    #[test]
    fn test_lower_gender_resolution() {
        let config = SynthConfig::default();
        let lower = config.effects.lower_gender(&config.demographics).unwrap();
        assert_eq!(lower, Gender(1));

        let mut config = SynthConfig::default();
        config.effects.lower_gender = "other".to_string();
        assert!(config.validate().unwrap_err().is_config());
    }

    #[test]
    fn test_multiplier_count_must_match_sectors() {
        let mut config = SynthConfig::default();
        config.effects.sector_multipliers.pop();
        assert!(config.validate().unwrap_err().is_config());
    }

    #[test]
    fn test_correlation_range() {
        let mut config = SynthConfig::default();
        config.correlations.body_image_depression = -1.5;
        assert!(config.validate().unwrap_err().is_config());
    }

    #[test]
    fn test_correlation_rows_symmetric() {
        let rows = CorrelationTargets::default().to_rows();
        for i in 0..3 {
            assert_eq!(rows[i][i], 1.0);
            for j in 0..3 {
                assert_eq!(rows[i][j], rows[j][i]);
            }
        }
        assert_eq!(rows[0][1], -0.40);
    }

    #[test]
    fn test_toml_partial_override() {
        let config = SynthConfig::from_toml_str(
            r#"
            sample_size = 500
            seed = 7

            [effects]
            gender_effect_size = 0.8
            "#,
        )
        .unwrap();

        assert_eq!(config.sample_size, 500);
        assert_eq!(config.seed, 7);
        assert_eq!(config.stream, REFERENCE_STREAM);
        assert_eq!(config.effects.gender_effect_size, 0.8);
        assert_eq!(config.effects.lower_gender, "girl");
        assert_eq!(config.scales, SynthConfig::reference().scales);
    }

    #[test]
    fn test_toml_round_trip_of_reference() {
        let text = SynthConfig::reference().to_toml_string().unwrap();
        let parsed = SynthConfig::from_toml_str(&text).unwrap();
        assert_eq!(parsed, SynthConfig::reference());
    }

    #[test]
    fn test_toml_syntax_error() {
        let err = SynthConfig::from_toml_str("sample_size = ").unwrap_err();
        assert!(matches!(err, SynthError::Parse(_)));
    }
}
