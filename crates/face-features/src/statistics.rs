//! Statistical Features Computation

use serde::{Deserialize, Serialize};

/// Summary statistics for a signal window
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StatisticalFeatures {
    /// Number of finite samples used
    pub count: usize,
    /// Mean value
    pub mean: f64,
    /// Standard deviation (population)
    pub std_dev: f64,
    /// Minimum value
    pub min: f64,
    /// Maximum value
    pub max: f64,
    /// Mean absolute change between consecutive samples
    pub rate_of_change: f64,
}

impl StatisticalFeatures {
    /// Compute statistics, skipping non-finite samples
    pub fn compute<I>(values: I) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        let values: Vec<f64> = values.into_iter().filter(|v| v.is_finite()).collect();
        if values.is_empty() {
            return Self::default();
        }

        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let min = values.iter().copied().fold(f64::MAX, f64::min);
        let max = values.iter().copied().fold(f64::MIN, f64::max);

        let variance = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;

        let rate_of_change = if values.len() >= 2 {
            let total: f64 = values.windows(2).map(|w| (w[1] - w[0]).abs()).sum();
            total / (values.len() - 1) as f64
        } else {
            0.0
        };

        Self {
            count: values.len(),
            mean,
            std_dev: variance.sqrt(),
            min,
            max,
            rate_of_change,
        }
    }

    /// Fraction of samples strictly below `threshold`
    pub fn fraction_below<I>(values: I, threshold: f64) -> f64
    where
        I: IntoIterator<Item = f64>,
    {
        let (below, total) = values
            .into_iter()
            .filter(|v| v.is_finite())
            .fold((0usize, 0usize), |(below, total), v| {
                (below + usize::from(v < threshold), total + 1)
            });
        if total == 0 {
            0.0
        } else {
            below as f64 / total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_stats() {
        let stats = StatisticalFeatures::compute([2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert_eq!(stats.count, 8);
        assert!((stats.mean - 5.0).abs() < 1e-12);
        assert!((stats.std_dev - 2.0).abs() < 1e-12);
        assert_eq!(stats.min, 2.0);
        assert_eq!(stats.max, 9.0);
        assert!((stats.rate_of_change - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_and_non_finite() {
        assert_eq!(StatisticalFeatures::compute(Vec::<f64>::new()), StatisticalFeatures::default());

        let stats = StatisticalFeatures::compute([1.0, f64::NAN, 3.0, f64::INFINITY]);
        assert_eq!(stats.count, 2);
        assert!((stats.mean - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_fraction_below() {
        let values = [0.1, 0.3, 0.05, 0.25];
        assert!((StatisticalFeatures::fraction_below(values, 0.15) - 0.5).abs() < 1e-12);
        assert_eq!(StatisticalFeatures::fraction_below([0.0f64; 0], 0.15), 0.0);
    }
}
