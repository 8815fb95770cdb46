//! Percentile estimation.

/// Continuous percentile with linear interpolation between closest ranks.
///
/// For sorted samples `x` of length `n`, the rank is `p * (n - 1)`; the
/// result interpolates between `x[floor(rank)]` and `x[ceil(rank)]`. This is
/// the same definition as Postgres `PERCENTILE_CONT`. Returns `None` when
/// there are no samples.
pub fn percentile_cont(samples: &[f64], p: f64) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }

    let mut sorted = samples.to_vec();
    sorted.sort_by(f64::total_cmp);

    let rank = p.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let fraction = rank - lower as f64;

    Some(sorted[lower] + fraction * (sorted[upper] - sorted[lower]))
}

/// Arithmetic mean, `None` for no values.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(actual: Option<f64>, expected: f64) {
        let actual = actual.expect("percentile");
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_reference_set() {
        let samples = [10.0, 20.0, 30.0, 40.0];
        approx(percentile_cont(&samples, 0.5), 25.0);
        approx(percentile_cont(&samples, 0.95), 38.5);
    }

    #[test]
    fn test_unsorted_input() {
        approx(percentile_cont(&[30.0, 10.0, 20.0], 0.5), 20.0);
    }

    #[test]
    fn test_single_sample() {
        approx(percentile_cont(&[100.0], 0.5), 100.0);
        approx(percentile_cont(&[100.0], 0.95), 100.0);
    }

    #[test]
    fn test_empty() {
        assert_eq!(percentile_cont(&[], 0.5), None);
        assert_eq!(mean(&[]), None);
    }

    #[test]
    fn test_mean() {
        approx(mean(&[20.0, 100.0]), 60.0);
    }
}
