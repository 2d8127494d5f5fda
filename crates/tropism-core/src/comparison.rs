use std::cell::OnceCell;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Least-squares line fit of virus values as a function of host values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineFit {
    pub slope: f64,
    pub intercept: f64,
}

/// Compares two key-aligned usage profiles (host, virus) via linear
/// regression, R² and cosine similarity. Each scalar is computed once and
/// cached.
///
/// Degenerate cases return documented neutral values instead of NaN: a
/// constant host profile fits slope 0.0 with the virus mean as intercept, a
/// constant virus profile has R² 0.0, and a zero-norm vector has cosine
/// similarity 0.0.
#[derive(Debug)]
pub struct UsageComparison {
    host: Vec<f64>,
    virus: Vec<f64>,
    fit: OnceCell<LineFit>,
    r2: OnceCell<f64>,
    cosine: OnceCell<f64>,
}

impl UsageComparison {
    /// Pair two profiles over the same key universe in sorted-key order.
    pub fn from_profiles<K: Ord>(host: &BTreeMap<K, f64>, virus: &BTreeMap<K, f64>) -> Self {
        debug_assert!(host.keys().eq(virus.keys()));
        Self::from_values(
            host.values().copied().collect(),
            virus.values().copied().collect(),
        )
    }

    /// Build from two equal-length, already-aligned value vectors.
    pub fn from_values(host: Vec<f64>, virus: Vec<f64>) -> Self {
        debug_assert_eq!(host.len(), virus.len());
        UsageComparison {
            host,
            virus,
            fit: OnceCell::new(),
            r2: OnceCell::new(),
            cosine: OnceCell::new(),
        }
    }

    /// Closed-form ordinary least squares: slope = covariance / variance,
    /// intercept from the means.
    pub fn linear_fit(&self) -> LineFit {
        *self.fit.get_or_init(|| {
            let n = self.host.len();
            if n == 0 {
                return LineFit { slope: 0.0, intercept: 0.0 };
            }
            let mean_x = self.host.iter().sum::<f64>() / n as f64;
            let mean_y = self.virus.iter().sum::<f64>() / n as f64;

            let mut cov = 0.0;
            let mut var_x = 0.0;
            for (x, y) in self.host.iter().zip(&self.virus) {
                cov += (x - mean_x) * (y - mean_y);
                var_x += (x - mean_x) * (x - mean_x);
            }
            if var_x == 0.0 {
                return LineFit { slope: 0.0, intercept: mean_y };
            }
            let slope = cov / var_x;
            LineFit {
                slope,
                intercept: mean_y - slope * mean_x,
            }
        })
    }

    /// Coefficient of determination of the fitted line: 1 − RSS/TSS around
    /// the virus mean.
    pub fn r_squared(&self) -> f64 {
        *self.r2.get_or_init(|| {
            let n = self.virus.len();
            if n == 0 {
                return 0.0;
            }
            let fit = self.linear_fit();
            let mean_y = self.virus.iter().sum::<f64>() / n as f64;

            let mut residual_sum_sq = 0.0;
            let mut total_sum_sq = 0.0;
            for (x, y) in self.host.iter().zip(&self.virus) {
                let predicted = fit.slope * x + fit.intercept;
                residual_sum_sq += (y - predicted) * (y - predicted);
                total_sum_sq += (y - mean_y) * (y - mean_y);
            }
            if total_sum_sq == 0.0 {
                return 0.0;
            }
            1.0 - residual_sum_sq / total_sum_sq
        })
    }

    /// Cosine similarity of the two raw value vectors (not the regression
    /// residuals): 1.0 for identical direction, 0.0 for orthogonal, negative
    /// for opposing.
    pub fn cosine_similarity(&self) -> f64 {
        *self.cosine.get_or_init(|| {
            let mut dot = 0.0;
            let mut norm_host = 0.0;
            let mut norm_virus = 0.0;
            for (x, y) in self.host.iter().zip(&self.virus) {
                dot += x * y;
                norm_host += x * x;
                norm_virus += y * y;
            }
            let denom = (norm_host * norm_virus).sqrt();
            if denom == 0.0 {
                return 0.0;
            }
            dot / denom
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-12;

    #[test]
    fn test_perfect_line() {
        let host = vec![1.0, 2.0, 3.0, 4.0];
        let virus: Vec<f64> = host.iter().map(|x| 2.5 * x - 1.0).collect();
        let comparison = UsageComparison::from_values(host, virus);
        let fit = comparison.linear_fit();
        assert!((fit.slope - 2.5).abs() < TOL);
        assert!((fit.intercept + 1.0).abs() < TOL);
        assert!((comparison.r_squared() - 1.0).abs() < TOL);
    }

    #[test]
    fn test_cosine_self_similarity() {
        let values = vec![0.2, 0.3, 0.5];
        let comparison = UsageComparison::from_values(values.clone(), values);
        assert!((comparison.cosine_similarity() - 1.0).abs() < TOL);
    }

    #[test]
    fn test_cosine_orthogonal() {
        let comparison = UsageComparison::from_values(vec![1.0, 0.0], vec![0.0, 1.0]);
        assert!(comparison.cosine_similarity().abs() < TOL);
    }

    #[test]
    fn test_cosine_opposing() {
        let comparison = UsageComparison::from_values(vec![1.0, 2.0], vec![-1.0, -2.0]);
        assert!((comparison.cosine_similarity() + 1.0).abs() < TOL);
    }

    #[test]
    fn test_constant_host_profile() {
        let comparison = UsageComparison::from_values(vec![2.0, 2.0, 2.0], vec![1.0, 3.0, 5.0]);
        let fit = comparison.linear_fit();
        assert_eq!(fit.slope, 0.0);
        assert_eq!(fit.intercept, 3.0);
    }

    #[test]
    fn test_constant_virus_profile_r2_is_zero() {
        let comparison = UsageComparison::from_values(vec![1.0, 2.0, 3.0], vec![4.0, 4.0, 4.0]);
        assert_eq!(comparison.r_squared(), 0.0);
    }

    #[test]
    fn test_zero_vectors() {
        let comparison = UsageComparison::from_values(vec![0.0, 0.0], vec![0.0, 0.0]);
        assert_eq!(comparison.cosine_similarity(), 0.0);
        assert_eq!(comparison.r_squared(), 0.0);
    }

    #[test]
    fn test_from_profiles_sorted_alignment() {
        let mut host = BTreeMap::new();
        let mut virus = BTreeMap::new();
        for (key, h, v) in [("AAA", 1.0, 2.0), ("CCC", 2.0, 4.0), ("GGG", 3.0, 6.0)] {
            host.insert(key.to_string(), h);
            virus.insert(key.to_string(), v);
        }
        let comparison = UsageComparison::from_profiles(&host, &virus);
        let fit = comparison.linear_fit();
        assert!((fit.slope - 2.0).abs() < TOL);
        assert!(fit.intercept.abs() < TOL);
        assert!((comparison.r_squared() - 1.0).abs() < TOL);
    }

    #[test]
    fn test_fit_is_cached() {
        let comparison = UsageComparison::from_values(vec![1.0, 2.0], vec![3.0, 4.0]);
        assert_eq!(comparison.linear_fit(), comparison.linear_fit());
    }
}
