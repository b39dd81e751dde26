//! Read-only verification of a finished dataset.
//!
//! Recomputes the statistics the synthesis was tuned for: pairwise
//! correlations of the mean scores, the gender comparison on body image, the
//! sector ANOVA on social media, and a Sobel mediation test. Problems with the
//! data (groups too small, zero variance) become [`VerificationWarning`]s on
//! the report rather than errors.

use super::stats::{
    mean, one_way_anova, pearson, sample_std, sobel_test, two_sample_t_test, Anova, SobelTest,
    TTest,
};
use crate::config::{CorrelationTargets, SynthConfig};
use crate::error::Result;
use crate::fabric::{GENDER_EFFECT_CONSTRUCT, SECTOR_EFFECT_CONSTRUCT};
use crate::models::{group_indices, Construct, Dataset, Gender, Subject};
use std::fmt;
use tracing::{debug, warn};

/// Minimum members for a group to enter a comparison.
pub const MIN_GROUP_SIZE: usize = 2;

/// Observations needed for the mediation regressions.
pub const MIN_MEDIATION_SAMPLE: usize = 4;

/// What the engine compares achieved statistics against.
#[derive(Debug, Clone, PartialEq)]
pub struct VerificationTargets {
    /// Latent correlation targets.
    pub correlations: CorrelationTargets,
    /// Configured Cohen's d of the gender effect.
    pub gender_effect_size: f64,
    /// Group that was shifted down.
    pub lower_gender: Gender,
    /// η² the sector multipliers were tuned towards.
    pub target_eta_squared: f64,
    /// Allowed |achieved d − configured d| before a gap warning.
    pub d_tolerance: f64,
    /// Allowed |achieved η² − target η²| before a gap warning.
    pub eta_squared_tolerance: f64,
}

impl Default for VerificationTargets {
    fn default() -> Self {
        Self {
            correlations: CorrelationTargets::default(),
            gender_effect_size: 0.5,
            lower_gender: Gender(1),
            target_eta_squared: 0.08,
            d_tolerance: 0.3,
            eta_squared_tolerance: 0.06,
        }
    }
}

/// Analysis a warning belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Analysis {
    /// Gender t-test on body image.
    GenderComparison,
    /// Sector ANOVA on social media.
    SectorAnova,
    /// Sobel test social media → body image → depression.
    Mediation,
}

impl fmt::Display for Analysis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Analysis::GenderComparison => write!(f, "gender comparison"),
            Analysis::SectorAnova => write!(f, "sector ANOVA"),
            Analysis::Mediation => write!(f, "mediation"),
        }
    }
}

/// Non-fatal problem found during verification.
#[derive(Debug, Clone, PartialEq)]
pub enum VerificationWarning {
    /// A group has fewer members than the analysis needs.
    DegenerateGroup {
        /// Affected analysis.
        analysis: Analysis,
        /// Group label.
        label: String,
        /// Group size.
        size: usize,
    },
    /// The groups exist but the outcome has no variance.
    ZeroVariance {
        /// Affected analysis.
        analysis: Analysis,
    },
    /// A correlation is undefined because a mean-score column is constant.
    UndefinedCorrelation {
        /// First construct.
        first: Construct,
        /// Second construct.
        second: Construct,
    },
    /// Achieved effect differs from the configured one by more than the
    /// tolerance.
    EffectGap {
        /// Affected analysis.
        analysis: Analysis,
        /// Configured value.
        configured: f64,
        /// Achieved value.
        achieved: f64,
    },
}

impl fmt::Display for VerificationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DegenerateGroup {
                analysis,
                label,
                size,
            } => write!(
                f,
                "{analysis}: group '{label}' has {size} member(s), at least {MIN_GROUP_SIZE} needed"
            ),
            Self::ZeroVariance { analysis } => write!(f, "{analysis}: outcome has zero variance"),
            Self::UndefinedCorrelation { first, second } => {
                write!(f, "correlation {first} ↔ {second} is undefined")
            }
            Self::EffectGap {
                analysis,
                configured,
                achieved,
            } => write!(
                f,
                "{analysis}: achieved {achieved:.3} differs from configured {configured:.3}"
            ),
        }
    }
}

/// Target vs achieved correlation of two mean scores.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CorrelationCheck {
    /// First construct.
    pub first: Construct,
    /// Second construct.
    pub second: Construct,
    /// Latent target.
    pub target: f64,
    /// Pearson r of the mean scores, if defined.
    pub achieved: Option<f64>,
}

/// Descriptive summary of one group.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupSummary {
    /// Group label.
    pub label: String,
    /// Group size.
    pub n: usize,
    /// Mean of the outcome, `None` for an empty group.
    pub mean: Option<f64>,
    /// Sample SD, `None` below two members.
    pub std_dev: Option<f64>,
}

impl GroupSummary {
    fn of(label: &str, values: &[f64]) -> Self {
        Self {
            label: label.to_string(),
            n: values.len(),
            mean: (!values.is_empty()).then(|| mean(values)),
            std_dev: sample_std(values),
        }
    }
}

/// Gender comparison on the body-image mean score.
///
/// Oriented as reference group minus lower group, so a realized effect has a
/// positive `t` and positive Cohen's d.
#[derive(Debug, Clone, PartialEq)]
pub struct TwoGroupComparison {
    /// Outcome construct.
    pub construct: Construct,
    /// Group expected to score higher.
    pub reference: GroupSummary,
    /// Group that was shifted down.
    pub lower: GroupSummary,
    /// Pooled-variance t-test.
    pub test: TTest,
    /// Configured Cohen's d.
    pub configured_d: f64,
}

impl TwoGroupComparison {
    /// Achieved Cohen's d.
    pub fn achieved_d(&self) -> f64 {
        self.test.cohens_d
    }

    /// Achieved minus configured d.
    pub fn d_gap(&self) -> f64 {
        self.test.cohens_d - self.configured_d
    }
}

/// Sector ANOVA on the social-media mean score.
#[derive(Debug, Clone, PartialEq)]
pub struct AnovaResult {
    /// Outcome construct.
    pub construct: Construct,
    /// Groups that entered the ANOVA.
    pub groups: Vec<GroupSummary>,
    /// ANOVA table.
    pub anova: Anova,
    /// Configured target η².
    pub target_eta_squared: f64,
}

impl AnovaResult {
    /// Achieved minus target η².
    pub fn eta_squared_gap(&self) -> f64 {
        self.anova.eta_squared - self.target_eta_squared
    }
}

/// Sobel test of the indirect path.
#[derive(Debug, Clone, PartialEq)]
pub struct MediationResult {
    /// Predictor.
    pub predictor: Construct,
    /// Mediator.
    pub mediator: Construct,
    /// Outcome.
    pub outcome: Construct,
    /// Path estimates and test.
    pub sobel: SobelTest,
}

/// Everything the engine computed.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VerificationReport {
    /// Number of subjects.
    pub subjects: usize,
    /// One entry per construct pair.
    pub correlations: Vec<CorrelationCheck>,
    /// Body-image summary per gender.
    pub gender_groups: Vec<GroupSummary>,
    /// Social-media summary per sector.
    pub sector_groups: Vec<GroupSummary>,
    /// Gender t-test, `None` when degenerate.
    pub gender: Option<TwoGroupComparison>,
    /// Sector ANOVA, `None` when degenerate.
    pub sector: Option<AnovaResult>,
    /// Mediation test, `None` when degenerate.
    pub mediation: Option<MediationResult>,
    /// Non-fatal problems.
    pub warnings: Vec<VerificationWarning>,
}

impl VerificationReport {
    /// Achieved correlation of a pair, in either order.
    pub fn correlation(&self, a: Construct, b: Construct) -> Option<f64> {
        self.correlations
            .iter()
            .find(|c| (c.first == a && c.second == b) || (c.first == b && c.second == a))
            .and_then(|c| c.achieved)
    }

    /// True when no warnings were raised.
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    /// Whether any degenerate-group warning concerns `analysis`.
    pub fn has_degenerate_group(&self, analysis: Analysis) -> bool {
        self.warnings.iter().any(|w| {
            matches!(w, VerificationWarning::DegenerateGroup { analysis: a, .. } if *a == analysis)
        })
    }
}

/// Recomputes achieved statistics of a dataset.
pub struct VerificationEngine {
    /// Comparison targets.
    pub targets: VerificationTargets,
}

impl Default for VerificationEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl VerificationEngine {
    /// Engine with the reference targets.
    pub fn new() -> Self {
        Self {
            targets: VerificationTargets::default(),
        }
    }

    /// Engine with explicit targets.
    pub fn with_targets(targets: VerificationTargets) -> Self {
        Self { targets }
    }

    /// Engine whose targets are taken from a synthesis configuration.
    pub fn from_config(config: &SynthConfig) -> Result<Self> {
        Ok(Self::with_targets(VerificationTargets {
            correlations: config.correlations,
            gender_effect_size: config.effects.gender_effect_size,
            lower_gender: config.effects.lower_gender(&config.demographics)?,
            target_eta_squared: config.effects.target_eta_squared,
            ..VerificationTargets::default()
        }))
    }

    /// Run every analysis.
    pub fn verify(&self, dataset: &Dataset) -> VerificationReport {
        let mut report = VerificationReport {
            subjects: dataset.len(),
            ..Default::default()
        };

        report.correlations = self.correlations(dataset, &mut report.warnings);

        let (gender_groups, gender) = self.gender_comparison(dataset, &mut report.warnings);
        report.gender_groups = gender_groups;
        report.gender = gender;

        let (sector_groups, sector) = self.sector_anova(dataset, &mut report.warnings);
        report.sector_groups = sector_groups;
        report.sector = sector;

        report.mediation = self.mediation(dataset, &mut report.warnings);

        for w in &report.warnings {
            warn!(warning = %w, "verification warning");
        }
        debug!(
            subjects = report.subjects,
            warnings = report.warnings.len(),
            "verification complete"
        );
        report
    }

    /// Pearson r of every pair of mean scores.
    pub fn correlations(
        &self,
        dataset: &Dataset,
        warnings: &mut Vec<VerificationWarning>,
    ) -> Vec<CorrelationCheck> {
        Construct::pairs()
            .into_iter()
            .map(|(first, second)| {
                let achieved = pearson(dataset.mean_scores(first), dataset.mean_scores(second));
                if achieved.is_none() {
                    warnings.push(VerificationWarning::UndefinedCorrelation { first, second });
                }
                CorrelationCheck {
                    first,
                    second,
                    target: self.targets.correlations.get(first, second),
                    achieved,
                }
            })
            .collect()
    }

    /// t-test and Cohen's d between the two gender groups on body image.
    pub fn gender_comparison(
        &self,
        dataset: &Dataset,
        warnings: &mut Vec<VerificationWarning>,
    ) -> (Vec<GroupSummary>, Option<TwoGroupComparison>) {
        let construct = GENDER_EFFECT_CONSTRUCT;
        let analysis = Analysis::GenderComparison;
        let labels = dataset.gender_labels();
        let scores = dataset.mean_scores(construct);
        let groups = grouped_values(dataset, labels.len().max(2), scores, |s| {
            s.gender.index()
        });
        let summaries: Vec<GroupSummary> = groups
            .iter()
            .enumerate()
            .map(|(i, g)| GroupSummary::of(&group_label(labels, i), g))
            .collect();

        let lower = self.targets.lower_gender.index();
        let reference = if lower == 0 { 1 } else { 0 };
        if lower >= groups.len() {
            warnings.push(VerificationWarning::DegenerateGroup {
                analysis,
                label: group_label(labels, lower),
                size: 0,
            });
            return (summaries, None);
        }

        let mut degenerate = false;
        for k in [reference, lower] {
            if groups[k].len() < MIN_GROUP_SIZE {
                degenerate = true;
                warnings.push(VerificationWarning::DegenerateGroup {
                    analysis,
                    label: summaries[k].label.clone(),
                    size: groups[k].len(),
                });
            }
        }
        if degenerate {
            return (summaries, None);
        }

        let Some(test) = two_sample_t_test(&groups[reference], &groups[lower]) else {
            warnings.push(VerificationWarning::ZeroVariance { analysis });
            return (summaries, None);
        };

        let comparison = TwoGroupComparison {
            construct,
            reference: summaries[reference].clone(),
            lower: summaries[lower].clone(),
            test,
            configured_d: self.targets.gender_effect_size,
        };
        if comparison.d_gap().abs() > self.targets.d_tolerance {
            warnings.push(VerificationWarning::EffectGap {
                analysis,
                configured: comparison.configured_d,
                achieved: comparison.achieved_d(),
            });
        }
        debug!(
            t = test.t,
            p = test.p_value,
            d = test.cohens_d,
            "gender comparison"
        );
        (summaries, Some(comparison))
    }

    /// One-way ANOVA across sectors on social media.
    ///
    /// Groups below [`MIN_GROUP_SIZE`] are reported and left out; the ANOVA
    /// runs if at least two groups remain.
    pub fn sector_anova(
        &self,
        dataset: &Dataset,
        warnings: &mut Vec<VerificationWarning>,
    ) -> (Vec<GroupSummary>, Option<AnovaResult>) {
        let construct = SECTOR_EFFECT_CONSTRUCT;
        let analysis = Analysis::SectorAnova;
        let labels = dataset.sector_labels();
        let scores = dataset.mean_scores(construct);
        let groups = grouped_values(dataset, labels.len(), scores, |s| s.sector.index());
        let summaries: Vec<GroupSummary> = groups
            .iter()
            .enumerate()
            .map(|(i, g)| GroupSummary::of(&group_label(labels, i), g))
            .collect();

        let mut included = Vec::new();
        let mut included_summaries = Vec::new();
        for (g, summary) in groups.iter().zip(&summaries) {
            if g.len() < MIN_GROUP_SIZE {
                warnings.push(VerificationWarning::DegenerateGroup {
                    analysis,
                    label: summary.label.clone(),
                    size: g.len(),
                });
            } else {
                included.push(g.as_slice());
                included_summaries.push(summary.clone());
            }
        }
        if included.len() < 2 {
            return (summaries, None);
        }

        let Some(anova) = one_way_anova(&included) else {
            warnings.push(VerificationWarning::ZeroVariance { analysis });
            return (summaries, None);
        };

        let result = AnovaResult {
            construct,
            groups: included_summaries,
            anova,
            target_eta_squared: self.targets.target_eta_squared,
        };
        if result.eta_squared_gap().abs() > self.targets.eta_squared_tolerance {
            warnings.push(VerificationWarning::EffectGap {
                analysis,
                configured: result.target_eta_squared,
                achieved: anova.eta_squared,
            });
        }
        debug!(
            f = anova.f,
            p = anova.p_value,
            eta_squared = anova.eta_squared,
            "sector ANOVA"
        );
        (summaries, Some(result))
    }

    /// Sobel test of social media → body image → depression.
    pub fn mediation(
        &self,
        dataset: &Dataset,
        warnings: &mut Vec<VerificationWarning>,
    ) -> Option<MediationResult> {
        let analysis = Analysis::Mediation;
        if dataset.len() < MIN_MEDIATION_SAMPLE {
            warnings.push(VerificationWarning::DegenerateGroup {
                analysis,
                label: "all subjects".to_string(),
                size: dataset.len(),
            });
            return None;
        }

        let (predictor, mediator, outcome) = (
            Construct::SocialMedia,
            Construct::BodyImage,
            Construct::Depression,
        );
        match sobel_test(
            dataset.mean_scores(predictor),
            dataset.mean_scores(mediator),
            dataset.mean_scores(outcome),
        ) {
            Some(sobel) => {
                debug!(z = sobel.z, p = sobel.p_value, indirect = sobel.indirect, "mediation");
                Some(MediationResult {
                    predictor,
                    mediator,
                    outcome,
                    sobel,
                })
            }
            None => {
                warnings.push(VerificationWarning::ZeroVariance { analysis });
                None
            }
        }
    }
}

fn grouped_values<F>(dataset: &Dataset, groups: usize, scores: &[f64], key: F) -> Vec<Vec<f64>>
where
    F: Fn(&Subject) -> usize,
{
    group_indices(dataset.subjects(), groups, key)
        .into_iter()
        .map(|idx| idx.into_iter().map(|i| scores[i]).collect())
        .collect()
}

fn group_label(labels: &[String], index: usize) -> String {
    labels
        .get(index)
        .cloned()
        .unwrap_or_else(|| format!("group {index}"))
}
