//! Descriptive statistics, distribution tails and classical tests.
//!
//! Everything here is a pure function over slices. Functions whose result is
//! undefined for the input (too few observations, zero variance) return
//! `None`; the caller decides how to surface that.

use statrs::distribution::{ContinuousCDF, FisherSnedecor, Normal, StudentsT};

/// Arithmetic mean. NaN for an empty slice.
pub fn mean(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return f64::NAN;
    }
    xs.iter().sum::<f64>() / xs.len() as f64
}

/// Population standard deviation (divisor n). NaN for an empty slice.
pub fn population_std(xs: &[f64]) -> f64 {
    let m = mean(xs);
    let ss: f64 = xs.iter().map(|x| (x - m) * (x - m)).sum();
    (ss / xs.len() as f64).sqrt()
}

/// Sample variance (divisor n − 1). `None` for fewer than 2 values.
pub fn sample_variance(xs: &[f64]) -> Option<f64> {
    if xs.len() < 2 {
        return None;
    }
    let m = mean(xs);
    let ss: f64 = xs.iter().map(|x| (x - m) * (x - m)).sum();
    Some(ss / (xs.len() - 1) as f64)
}

/// Sample standard deviation. `None` for fewer than 2 values.
pub fn sample_std(xs: &[f64]) -> Option<f64> {
    sample_variance(xs).map(f64::sqrt)
}

/// Sum of squared deviations from the mean.
fn sum_of_squares(xs: &[f64], m: f64) -> f64 {
    xs.iter().map(|x| (x - m) * (x - m)).sum()
}

/// Pearson correlation.
///
/// `None` if lengths differ, fewer than 2 pairs, or either side is constant.
pub fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }
    let mx = mean(x);
    let my = mean(y);
    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (a, b) in x.iter().zip(y) {
        let dx = a - mx;
        let dy = b - my;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx <= 0.0 || syy <= 0.0 {
        return None;
    }
    Some((sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0))
}

fn standard_normal() -> Option<Normal> {
    Normal::new(0.0, 1.0).ok()
}

/// Standard normal CDF Φ(x).
pub fn normal_cdf(x: f64) -> f64 {
    standard_normal().map_or(f64::NAN, |n| n.cdf(x))
}

/// Standard normal survival function 1 − Φ(x), accurate in the upper tail.
pub fn normal_sf(x: f64) -> f64 {
    standard_normal().map_or(f64::NAN, |n| n.sf(x))
}

/// Two-tailed p-value of Student's t with `df` degrees of freedom.
///
/// NaN for a NaN statistic or non-positive `df`.
pub fn student_t_two_tailed(t: f64, df: f64) -> f64 {
    if t.is_nan() {
        return f64::NAN;
    }
    if t.is_infinite() {
        return 0.0;
    }
    match StudentsT::new(0.0, 1.0, df) {
        Ok(dist) => (2.0 * dist.sf(t.abs())).clamp(0.0, 1.0),
        Err(_) => f64::NAN,
    }
}

/// Upper-tail probability P(F > f) of the F distribution.
pub fn f_survival(f: f64, df1: f64, df2: f64) -> f64 {
    if f.is_nan() {
        return f64::NAN;
    }
    if f <= 0.0 {
        return 1.0;
    }
    if f.is_infinite() {
        return 0.0;
    }
    match FisherSnedecor::new(df1, df2) {
        Ok(dist) => dist.sf(f).clamp(0.0, 1.0),
        Err(_) => f64::NAN,
    }
}

/// Pooled-variance two-sample t-test, oriented as `first − second`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TTest {
    /// t statistic.
    pub t: f64,
    /// Degrees of freedom (n1 + n2 − 2).
    pub df: f64,
    /// Two-tailed p-value.
    pub p_value: f64,
    /// mean(first) − mean(second).
    pub mean_difference: f64,
    /// Pooled standard deviation.
    pub pooled_sd: f64,
    /// Cohen's d with the pooled standard deviation.
    pub cohens_d: f64,
}

/// Independent two-sample t-test assuming equal variances.
///
/// `None` if either group has fewer than 2 values or the pooled variance is
/// zero.
pub fn two_sample_t_test(first: &[f64], second: &[f64]) -> Option<TTest> {
    let (n1, n2) = (first.len(), second.len());
    let v1 = sample_variance(first)?;
    let v2 = sample_variance(second)?;
    let df = (n1 + n2 - 2) as f64;
    let pooled_var = ((n1 - 1) as f64 * v1 + (n2 - 1) as f64 * v2) / df;
    if pooled_var <= 0.0 {
        return None;
    }
    let pooled_sd = pooled_var.sqrt();
    let mean_difference = mean(first) - mean(second);
    let se = (pooled_var * (1.0 / n1 as f64 + 1.0 / n2 as f64)).sqrt();
    let t = mean_difference / se;

    Some(TTest {
        t,
        df,
        p_value: student_t_two_tailed(t, df),
        mean_difference,
        pooled_sd,
        cohens_d: mean_difference / pooled_sd,
    })
}

/// One-way analysis of variance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Anova {
    /// F statistic.
    pub f: f64,
    /// Between-group degrees of freedom (k − 1).
    pub df_between: f64,
    /// Within-group degrees of freedom (N − k).
    pub df_within: f64,
    /// P(F > f).
    pub p_value: f64,
    /// Between-group sum of squares.
    pub ss_between: f64,
    /// Within-group sum of squares.
    pub ss_within: f64,
    /// SS_between / SS_total.
    pub eta_squared: f64,
}

/// One-way ANOVA over the non-empty groups.
///
/// `None` with fewer than 2 non-empty groups, no within-group degrees of
/// freedom, or zero within-group variation.
pub fn one_way_anova(groups: &[&[f64]]) -> Option<Anova> {
    let groups: Vec<&[f64]> = groups.iter().copied().filter(|g| !g.is_empty()).collect();
    let k = groups.len();
    let n: usize = groups.iter().map(|g| g.len()).sum();
    if k < 2 || n <= k {
        return None;
    }

    let grand_mean = groups.iter().flat_map(|g| g.iter()).sum::<f64>() / n as f64;
    let mut ss_between = 0.0;
    let mut ss_within = 0.0;
    for g in &groups {
        let m = mean(g);
        ss_between += g.len() as f64 * (m - grand_mean) * (m - grand_mean);
        ss_within += sum_of_squares(g, m);
    }
    if ss_within <= 0.0 {
        return None;
    }

    let df_between = (k - 1) as f64;
    let df_within = (n - k) as f64;
    let f = (ss_between / df_between) / (ss_within / df_within);

    Some(Anova {
        f,
        df_between,
        df_within,
        p_value: f_survival(f, df_between, df_within),
        ss_between,
        ss_within,
        eta_squared: ss_between / (ss_between + ss_within),
    })
}

/// Sobel test of the indirect effect x → m → y.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SobelTest {
    /// Slope of m on x.
    pub a: f64,
    /// Standard error of `a`.
    pub se_a: f64,
    /// Partial slope of y on m, controlling for x.
    pub b: f64,
    /// Standard error of `b`.
    pub se_b: f64,
    /// Direct effect of x on y, controlling for m.
    pub direct: f64,
    /// Indirect effect a·b.
    pub indirect: f64,
    /// Sobel z statistic.
    pub z: f64,
    /// Two-tailed normal p-value.
    pub p_value: f64,
}

/// Sobel test with ordinary least squares paths.
///
/// `None` with fewer than 4 observations, mismatched lengths, or collinear /
/// constant predictors.
pub fn sobel_test(x: &[f64], m: &[f64], y: &[f64]) -> Option<SobelTest> {
    let n = x.len();
    if n < 4 || m.len() != n || y.len() != n {
        return None;
    }
    let (mx, mm, my) = (mean(x), mean(m), mean(y));
    let (mut sxx, mut smm, mut syy, mut sxm, mut sxy, mut smy) = (0.0, 0.0, 0.0, 0.0, 0.0, 0.0);
    for i in 0..n {
        let dx = x[i] - mx;
        let dm = m[i] - mm;
        let dy = y[i] - my;
        sxx += dx * dx;
        smm += dm * dm;
        syy += dy * dy;
        sxm += dx * dm;
        sxy += dx * dy;
        smy += dm * dy;
    }
    if sxx <= 0.0 {
        return None;
    }

    // Path a: m ~ x
    let a = sxm / sxx;
    let resid_m = (smm - a * sxm).max(0.0);
    let se_a = (resid_m / (n - 2) as f64 / sxx).sqrt();

    // Path b: y ~ x + m
    let det = sxx * smm - sxm * sxm;
    if det <= 0.0 {
        return None;
    }
    let b = (sxx * smy - sxm * sxy) / det;
    let direct = (smm * sxy - sxm * smy) / det;
    let resid_y = (syy - direct * sxy - b * smy).max(0.0);
    let sigma2 = resid_y / (n - 3) as f64;
    let se_b = (sigma2 * sxx / det).sqrt();

    let indirect = a * b;
    let se_indirect = (b * b * se_a * se_a + a * a * se_b * se_b).sqrt();
    if se_indirect <= 0.0 || !se_indirect.is_finite() {
        return None;
    }
    let z = indirect / se_indirect;

    Some(SobelTest {
        a,
        se_a,
        b,
        se_b,
        direct,
        indirect,
        z,
        p_value: 2.0 * normal_sf(z.abs()),
    })
}
