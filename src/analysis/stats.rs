/// Summary statistics shared by the discharge and flood-metric stages.
///
/// All helpers return `None` on empty input instead of NaN, so callers
/// decide what an empty sample means for them.

/// Arithmetic mean, refined with one correction pass so a sample of
/// identical values yields exactly that value.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let n = values.len() as f64;
    let rough = values.iter().sum::<f64>() / n;
    let correction = values.iter().map(|v| v - rough).sum::<f64>() / n;
    Some(rough + correction)
}

/// Sample standard deviation (divisor N−1).
///
/// A single observation has no measurable spread and yields `0.0` rather
/// than NaN.
pub fn sample_std_dev(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    if values.len() == 1 {
        return Some(0.0);
    }
    let sum_sq: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    Some((sum_sq / (values.len() - 1) as f64).sqrt())
}

/// Weighted mean `Σwᵢxᵢ / Σwᵢ`. `None` when the slices differ in length,
/// are empty, or the weights sum to zero.
pub fn weighted_mean(values: &[f64], weights: &[f64]) -> Option<f64> {
    if values.is_empty() || values.len() != weights.len() {
        return None;
    }
    let weight_sum: f64 = weights.iter().sum();
    if weight_sum == 0.0 {
        return None;
    }
    let dot: f64 = values.iter().zip(weights).map(|(v, w)| v * w).sum();
    Some(dot / weight_sum)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_of_empty_is_none() {
        assert_eq!(mean(&[]), None);
        assert_eq!(sample_std_dev(&[]), None);
    }

    #[test]
    fn test_mean_of_identical_values_is_exact() {
        let values = [0.1, 0.1, 0.1, 0.1, 0.1, 0.1, 0.1];
        assert_eq!(mean(&values), Some(0.1));
        assert_eq!(sample_std_dev(&values), Some(0.0));
    }

    #[test]
    fn test_sample_std_dev_uses_bessel_correction() {
        // Deviations from mean 5: -3, -1, -1, -1, 0, 0, 2, 4 → Σ² = 32, /7
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let std = sample_std_dev(&values).expect("non-empty sample");
        assert!((std - (32.0_f64 / 7.0).sqrt()).abs() < 1e-12, "got {}", std);
    }

    #[test]
    fn test_single_observation_has_zero_spread() {
        assert_eq!(sample_std_dev(&[42.0]), Some(0.0));
    }

    #[test]
    fn test_weighted_mean_matches_dot_product_for_normalized_weights() {
        let values = [10.0, 20.0, 40.0];
        let weights = [0.5, 0.25, 0.25];
        let result = weighted_mean(&values, &weights).expect("valid weights");
        assert!((result - 20.0).abs() < 1e-12);
    }

    #[test]
    fn test_weighted_mean_rejects_mismatched_or_zero_weights() {
        assert_eq!(weighted_mean(&[1.0, 2.0], &[1.0]), None);
        assert_eq!(weighted_mean(&[1.0, 2.0], &[0.0, 0.0]), None);
    }
}
