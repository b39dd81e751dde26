//! Integration tests for end-to-end synthesis properties.

use statviz_synth::analytics::stats::mean;
use statviz_synth::prelude::*;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn group_mean(dataset: &Dataset, construct: Construct, pick: impl Fn(&Subject) -> bool) -> f64 {
    let scores = dataset.mean_scores(construct);
    let values: Vec<f64> = dataset
        .subjects()
        .iter()
        .zip(scores)
        .filter(|(s, _)| pick(s))
        .map(|(_, v)| *v)
        .collect();
    mean(&values)
}

/// Same seed and configuration produce identical datasets.
#[test]
fn test_determinism() {
    init_tracing();
    let a = synthesize(SynthConfig::reference()).unwrap();
    let b = synthesize(SynthConfig::reference()).unwrap();
    assert_eq!(a.dataset, b.dataset);
    assert_eq!(a.latent, b.latent);

    let c = synthesize(SynthConfig::reference().with_seed(43)).unwrap();
    assert_ne!(a.dataset, c.dataset);
}

/// A separate stream of the same seed gives a different dataset.
#[test]
fn test_streams_differ() {
    let config = SynthConfig::reference();
    let mut pipeline = SynthesisPipeline::new(config.clone()).unwrap();
    let primary = pipeline.run().unwrap();
    let mut ctx = SeedContext::with_stream(config.seed, config.stream + 1);
    let secondary = pipeline.run_with(&mut ctx).unwrap();
    assert_ne!(primary.dataset, secondary.dataset);
    assert_eq!(pipeline.stats().runs, 2);
}

/// Every item lies in its closed integer range.
#[test]
fn test_item_range() {
    let config = SynthConfig::reference().with_sample_size(400);
    let output = synthesize(config.clone()).unwrap();
    for c in Construct::ALL {
        let items = output.dataset.items(c);
        assert_eq!(items.items(), config.scales[c].items);
        assert_eq!(items.subjects(), 400);
        let max = config.scales[c].scale_max;
        assert!(items.values().iter().all(|&v| (1..=max).contains(&v)));
    }
}

/// Mean scores are the simple average of the construct's items.
#[test]
fn test_mean_scores_are_item_averages() {
    let output = synthesize(SynthConfig::reference()).unwrap();
    for c in Construct::ALL {
        let items = output.dataset.items(c);
        for (i, &m) in output.dataset.mean_scores(c).iter().enumerate() {
            let row = items.row(i);
            let expected = row.iter().map(|&v| v as f64).sum::<f64>() / row.len() as f64;
            assert!((m - expected).abs() < 1e-12);
        }
    }
}

/// A matrix with a negative eigenvalue fails before any data exists.
#[test]
fn test_invalid_matrix_is_numerical_error() {
    let config = SynthConfig {
        correlations: CorrelationTargets {
            social_media_body_image: 0.95,
            social_media_depression: 0.95,
            body_image_depression: -0.95,
        },
        ..SynthConfig::reference()
    };
    let err = synthesize(config).unwrap_err();
    assert!(err.is_numerical(), "{err}");
}

/// Girls score lower on body image than boys when d = 0.5.
///
/// At d = 0.5 the group means of a small sample still reverse for some
/// seeds (about one seed in twelve at N = 50), so the sample is large
/// enough that sampling error cannot flip the direction.
#[test]
fn test_directional_gender_effect() {
    for seed in 1..=5 {
        let config = SynthConfig::reference().with_seed(seed).with_sample_size(500);
        let output = synthesize(config).unwrap();
        let boys = group_mean(&output.dataset, Construct::BodyImage, |s| s.gender == Gender(0));
        let girls = group_mean(&output.dataset, Construct::BodyImage, |s| s.gender == Gender(1));
        assert!(girls < boys, "seed {seed}: girls {girls:.3} vs boys {boys:.3}");
    }
}

/// Sector multipliers 0.4 / 0.0 / −0.5 order the social-media means.
///
/// The state and state-religious means sit only 0.4 SD apart and the
/// smallest sector holds a fifth of the sample, so N = 100 breaks the
/// order for about one seed in eight. N = 1000 keeps it stable.
#[test]
fn test_sector_ordering() {
    let config = SynthConfig::reference().with_seed(7).with_sample_size(1000);
    let output = synthesize(config).unwrap();
    let means: Vec<f64> = (0..3)
        .map(|k| group_mean(&output.dataset, Construct::SocialMedia, |s| s.sector == Sector(k)))
        .collect();
    assert!(means[0] > means[1], "{means:?}");
    assert!(means[1] > means[2], "{means:?}");
}

/// Reference scenario, seed 42: directions of every effect.
#[test]
fn test_reference_seed_directions() {
    init_tracing();
    let mut pipeline = SynthesisPipeline::new(SynthConfig::reference()).unwrap();
    let (output, report) = pipeline.run_and_verify().unwrap();

    assert_eq!(output.dataset.len(), 180);
    let r = report
        .correlation(Construct::SocialMedia, Construct::BodyImage)
        .unwrap();
    assert!(r < 0.0, "r = {r}");
    assert!(report.correlation(Construct::SocialMedia, Construct::Depression).unwrap() > 0.0);
    assert!(report.correlation(Construct::BodyImage, Construct::Depression).unwrap() < 0.0);

    let gender = report.gender.unwrap();
    assert!(gender.achieved_d() > 0.0);
    assert_eq!(gender.configured_d, 0.5);

    let sector = report.sector.unwrap();
    assert!(sector.anova.eta_squared > 0.0 && sector.anova.eta_squared < 1.0);
    assert_eq!(sector.target_eta_squared, 0.08);
}

/// The reference configuration itself lands in the study's bands.
#[test]
fn test_reference_config_within_bands() {
    init_tracing();
    let config = SynthConfig::reference();
    assert_eq!((config.seed, config.stream), (42, 54));
    let mut pipeline = SynthesisPipeline::new(config).unwrap();
    let (_, report) = pipeline.run_and_verify().unwrap();

    let r = report
        .correlation(Construct::SocialMedia, Construct::BodyImage)
        .unwrap();
    assert!((-0.55..=-0.25).contains(&r), "r = {r}");

    let gender = report.gender.unwrap();
    assert!(gender.test.p_value < 0.05, "p = {}", gender.test.p_value);
    assert!(gender.achieved_d() > 0.0);

    let eta = report.sector.unwrap().anova.eta_squared;
    assert!((0.03..=0.15).contains(&eta), "eta² = {eta}");
}

/// Reference scenario over many seeds lands in the expected bands.
#[test]
fn test_reference_bands_across_seeds() {
    let seeds: Vec<u64> = (1..=20).collect();
    let mut r_values = Vec::new();
    let mut eta_values = Vec::new();
    let mut significant = 0;

    for &seed in &seeds {
        let config = SynthConfig::reference().with_seed(seed);
        let mut pipeline = SynthesisPipeline::new(config).unwrap();
        let (_, report) = pipeline.run_and_verify().unwrap();
        r_values.push(
            report
                .correlation(Construct::SocialMedia, Construct::BodyImage)
                .unwrap(),
        );
        eta_values.push(report.sector.unwrap().anova.eta_squared);
        if report.gender.unwrap().test.p_value < 0.05 {
            significant += 1;
        }
    }

    let r = mean(&r_values);
    let eta = mean(&eta_values);
    assert!((-0.55..=-0.25).contains(&r), "mean r = {r}");
    assert!((0.03..=0.15).contains(&eta), "mean eta² = {eta}");
    assert!(significant >= 12, "{significant}/20 significant gender tests");
}

/// Rows follow the header layout and serialize with rounded means.
#[test]
fn test_rows_and_headers() {
    let output = synthesize(SynthConfig::reference()).unwrap();
    let headers = output.dataset.headers();
    assert_eq!(headers.len(), 37);
    assert_eq!(headers[0], "subject_id");
    assert_eq!(headers[4], "social_media_1");
    assert_eq!(headers[36], "depression_mean");

    let rows = output.dataset.rows();
    assert_eq!(rows.len(), 180);
    assert_eq!(rows[0].subject_id, 1);
    assert_eq!(rows[0].cells().len(), headers.len());
    assert!(rows[0].gender == "boy" || rows[0].gender == "girl");

    let json = serde_json::to_value(&rows[0]).unwrap();
    assert_eq!(json["items"]["body_image"].as_array().unwrap().len(), 12);
    let m = json["means"]["social_media"].as_f64().unwrap();
    assert!(((m * 100.0).round() - m * 100.0).abs() < 1e-6);
}

/// The bundled TOML file describes the reference scenario.
#[test]
fn test_reference_toml_file() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/config/reference.toml");
    let config = SynthConfig::from_file(path).unwrap();
    assert_eq!(config, SynthConfig::reference());
}

/// A missing configuration file is an IO error.
#[test]
fn test_missing_config_file() {
    let err = SynthConfig::from_file("/nonexistent/statviz.toml").unwrap_err();
    assert!(matches!(err, SynthError::Io(_)));
}
