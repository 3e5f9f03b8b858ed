//! Baseline statistics. Pure, allocation-light, degenerate-input safe:
//! empty slices yield zeros, never a panic or a NaN from division.

/// Mean and population standard deviation.
pub fn mean_std(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

    (mean, var.sqrt())
}

/// Quantile of the absolute values, linear interpolation between order
/// statistics (numpy's default `quantile` semantics).
pub fn quantile_abs(values: &[f64], q: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    let mut abs: Vec<f64> = values.iter().map(|v| v.abs()).collect();
    abs.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let q = q.clamp(0.0, 1.0);
    let pos = q * (abs.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;

    if lo == hi {
        return abs[lo];
    }

    let frac = pos - lo as f64;
    abs[lo] + (abs[hi] - abs[lo]) * frac
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASELINE: [f64; 10] = [
        0.01, -0.02, 0.015, -0.01, 0.03, 0.02, -0.025, 0.01, 0.02, 0.015,
    ];

    #[test]
    fn mean_std_matches_population_formula() {
        let (mean, std) = mean_std(&BASELINE);
        assert!((mean - 0.0065).abs() < 1e-12);
        assert!((std - 0.017_182_84).abs() < 1e-7);
    }

    #[test]
    fn mean_std_of_empty_is_zero() {
        assert_eq!(mean_std(&[]), (0.0, 0.0));
    }

    #[test]
    fn quantile_interpolates_between_order_statistics() {
        // Sorted absolute baseline: [.01 .01 .01 .015 .015 .02 .02 .02 .025 .03]
        // pos = 0.95 * 9 = 8.55 → 0.025 + 0.55 * 0.005 = 0.02775
        let t = quantile_abs(&BASELINE, 0.95);
        assert!((t - 0.02775).abs() < 1e-12);
    }

    #[test]
    fn quantile_extremes_hit_min_and_max() {
        assert_eq!(quantile_abs(&BASELINE, 0.0), 0.01);
        assert_eq!(quantile_abs(&BASELINE, 1.0), 0.03);
    }

    #[test]
    fn quantile_of_empty_is_zero() {
        assert_eq!(quantile_abs(&[], 0.95), 0.0);
    }
}
