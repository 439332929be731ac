//! Small population statistics over probability lists.

use pcore::SENTINEL_PROBABILITY;

/// Arithmetic mean, `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Population standard deviation (divides by `n`). Zero for an empty slice.
pub fn std_dev(values: &[f64]) -> f64 {
    let Some(mu) = mean(values) else {
        return 0.0;
    };
    let var = values.iter().map(|v| (v - mu).powi(2)).sum::<f64>() / values.len() as f64;
    var.sqrt()
}

/// Mean after dropping `floor(ratio * n)` values from each end.
///
/// If trimming would leave nothing, the untrimmed values are averaged.
/// An empty slice yields the sentinel probability.
pub fn trimmed_mean(values: &[f64], ratio: f64) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let n = sorted.len();
    let drop = (n as f64 * ratio).floor() as usize;
    let kept = if n > 2 * drop {
        &sorted[drop..n - drop]
    } else {
        &sorted[..]
    };
    mean(kept).unwrap_or(SENTINEL_PROBABILITY)
}

/// Round to 4 decimal places.
pub fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn population_std() {
        assert_eq!(std_dev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]), 2.0);
        assert_eq!(std_dev(&[0.3]), 0.0);
        assert_eq!(std_dev(&[]), 0.0);
    }

    #[test]
    fn trimmed_mean_drops_both_ends() {
        // floor(5 * 0.2) = 1 dropped from each end.
        let m = trimmed_mean(&[0.9, 0.1, 0.5, 0.4, 0.6], 0.2);
        assert!((m - 0.5).abs() < 1e-12);
    }

    #[test]
    fn trimmed_mean_falls_back_when_nothing_would_remain() {
        // floor(2 * 0.5) = 1 per end would remove both values.
        assert!((trimmed_mean(&[0.2, 0.4], 0.5) - 0.3).abs() < 1e-12);
        assert_eq!(trimmed_mean(&[0.7], 0.4), 0.7);
    }

    #[test]
    fn trimmed_mean_of_nothing_is_sentinel() {
        assert_eq!(trimmed_mean(&[], 0.2), SENTINEL_PROBABILITY);
    }

    #[test]
    fn rounding() {
        assert_eq!(round4(0.123_456), 0.1235);
        assert_eq!(round4(0.5), 0.5);
    }
}
