//! Mapping of latent scores onto bounded Likert items.
//!
//! Stage 1 squashes each latent score through the standard normal CDF and
//! maps it affinely into the construct's mean-score range. Stage 2 expands
//! each target mean into integer item responses: one offset per item shared
//! by all subjects, independent noise per response, clipped to the scale and
//! rounded. Items correlate only through the shared subject mean.

use super::SeedContext;
use crate::analytics::stats::normal_cdf;
use crate::config::{ItemNoise, ScaleSpec};
use crate::models::{Construct, ItemMatrix, LatentMatrix, PerConstruct};

/// Map a latent score into `[min_mean, max_mean]` through Φ.
///
/// Monotone non-decreasing in `latent`.
pub fn scale_to_range(latent: f64, min_mean: f64, max_mean: f64) -> f64 {
    normal_cdf(latent) * (max_mean - min_mean) + min_mean
}

/// Clip to `[1, scale_max]` and round half to even.
pub fn to_response(value: f64, scale_max: u8) -> u8 {
    value.clamp(1.0, scale_max as f64).round_ties_even() as u8
}

/// Expands latent scores into item matrices.
pub struct ItemMapper<'a> {
    scales: &'a PerConstruct<ScaleSpec>,
    noise: ItemNoise,
}

impl<'a> ItemMapper<'a> {
    /// Create a mapper for the given scales and noise levels.
    pub fn new(scales: &'a PerConstruct<ScaleSpec>, noise: ItemNoise) -> Self {
        Self { scales, noise }
    }

    /// Stage 1: per-subject target mean scores of one construct.
    pub fn target_means(&self, construct: Construct, latent: &[f64]) -> Vec<f64> {
        let scale = &self.scales[construct];
        latent
            .iter()
            .map(|&z| scale_to_range(z, scale.min_mean, scale.max_mean))
            .collect()
    }

    /// Stage 2: integer item responses around the target means.
    ///
    /// Per item, draws the shared offset first and then one noise value per
    /// subject in subject order.
    pub fn expand(
        &self,
        construct: Construct,
        target_means: &[f64],
        ctx: &mut SeedContext,
    ) -> ItemMatrix {
        let scale = &self.scales[construct];
        let mut matrix =
            ItemMatrix::new(construct, target_means.len(), scale.items, scale.scale_max);

        for item in 0..scale.items {
            let item_shift = ctx.normal(0.0, self.noise.item_shift_sd);
            for (subject, &mean) in target_means.iter().enumerate() {
                let raw = mean + item_shift + ctx.normal(0.0, self.noise.response_sd);
                matrix.set(subject, item, to_response(raw, scale.scale_max));
            }
        }
        matrix
    }

    /// Both stages for every construct, in canonical order.
    ///
    /// Returns the item matrices and the stage-1 target means.
    pub fn map(
        &self,
        latent: &LatentMatrix,
        ctx: &mut SeedContext,
    ) -> (PerConstruct<ItemMatrix>, PerConstruct<Vec<f64>>) {
        let targets = PerConstruct::from_fn(|c| self.target_means(c, latent.column(c)));
        let items = PerConstruct::from_fn(|c| self.expand(c, &targets[c], ctx));
        (items, targets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::stats::mean;
    use crate::config::SynthConfig;

    #[test]
    fn test_scale_to_range_bounds_and_midpoint() {
        assert!((scale_to_range(0.0, 1.5, 4.5) - 3.0).abs() < 1e-6);
        let low = scale_to_range(-8.0, 1.5, 4.5);
        let high = scale_to_range(8.0, 1.5, 4.5);
        assert!(low >= 1.5 && low < 1.501);
        assert!(high <= 4.5 && high > 4.499);
    }

    #[test]
    fn test_scale_to_range_monotone() {
        let mut prev = f64::NEG_INFINITY;
        for i in -1000..=1000 {
            let z = i as f64 * 0.006;
            let v = scale_to_range(z, 2.0, 5.0);
            assert!(v >= prev, "not monotone at z = {z}");
            prev = v;
        }
    }

    #[test]
    fn test_to_response_clips_and_rounds() {
        assert_eq!(to_response(-3.0, 5), 1);
        assert_eq!(to_response(9.7, 5), 5);
        assert_eq!(to_response(2.4, 5), 2);
        assert_eq!(to_response(2.6, 5), 3);
        assert_eq!(to_response(2.5, 5), 2);
        assert_eq!(to_response(3.5, 5), 4);
    }

    #[test]
    fn test_noise_free_items_equal_rounded_target() {
        let config = SynthConfig::reference();
        let mapper = ItemMapper::new(&config.scales, ItemNoise::none());
        let targets = vec![1.2, 2.49, 3.51, 4.9];
        let mut ctx = SeedContext::new(3);

        let m = mapper.expand(Construct::SocialMedia, &targets, &mut ctx);
        assert_eq!(m.items(), 10);
        for item in 0..10 {
            let col: Vec<u8> = m.column(item).collect();
            assert_eq!(col, vec![1, 2, 4, 5]);
        }
    }

    #[test]
    fn test_items_within_scale() {
        let config = SynthConfig::reference();
        let noise = ItemNoise {
            item_shift_sd: 1.0,
            response_sd: 3.0,
        };
        let mapper = ItemMapper::new(&config.scales, noise);
        let mut ctx = SeedContext::new(11);
        let latent: Vec<f64> = ctx.standard_normal_vec(300);

        for c in Construct::ALL {
            let targets = mapper.target_means(c, &latent);
            let m = mapper.expand(c, &targets, &mut ctx);
            let max = config.scales[c].scale_max;
            assert!(m.values().iter().all(|&v| v >= 1 && v <= max));
        }
    }

    #[test]
    fn test_row_means_track_targets() {
        let config = SynthConfig::reference();
        let mapper = ItemMapper::new(&config.scales, config.noise);
        let mut ctx = SeedContext::new(21);
        let latent: Vec<f64> = ctx.standard_normal_vec(2000);

        let targets = mapper.target_means(Construct::BodyImage, &latent);
        let m = mapper.expand(Construct::BodyImage, &targets, &mut ctx);
        let means = m.row_means();

        let diff: Vec<f64> = means.iter().zip(&targets).map(|(a, b)| a - b).collect();
        // Offsets are shared per item, so the average error is the mean of
        // 12 item shifts plus rounding; it stays well inside one scale point.
        assert!(mean(&diff).abs() < 0.35, "mean diff {}", mean(&diff));
        let corr = crate::analytics::stats::pearson(&means, &targets).unwrap();
        assert!(corr > 0.9, "corr {corr}");
    }
}
