//! Feature Standardization
//!
//! Centers and scales feature rows to zero mean and unit variance before
//! they reach the isolation forest. Variance uses the population (n)
//! denominator to match the scaler the screening profile was tuned
//! against.

use super::{FeatureRow, FEATURE_COUNT};

/// Floor keeps zero-variance features from dividing by zero.
const STD_FLOOR: f64 = 1e-8;

/// Per-feature mean and standard deviation fitted on training rows.
#[derive(Debug, Clone)]
pub struct StandardScaler {
    mean: FeatureRow,
    std: FeatureRow,
}

impl StandardScaler {
    /// Fit means and deviations on a training set.
    pub fn fit(rows: &[FeatureRow]) -> Self {
        let n = rows.len().max(1) as f64;

        let mut mean = [0.0; FEATURE_COUNT];
        for row in rows {
            for (m, v) in mean.iter_mut().zip(row) {
                *m += v;
            }
        }
        for m in &mut mean {
            *m /= n;
        }

        let mut std = [0.0; FEATURE_COUNT];
        for row in rows {
            for ((s, v), m) in std.iter_mut().zip(row).zip(&mean) {
                let d = v - m;
                *s += d * d;
            }
        }
        for s in &mut std {
            *s = (*s / n).sqrt().max(STD_FLOOR);
        }

        Self { mean, std }
    }

    /// Standardize one feature row.
    pub fn transform(&self, row: &FeatureRow) -> FeatureRow {
        let mut out = [0.0; FEATURE_COUNT];
        for i in 0..FEATURE_COUNT {
            out[i] = (row[i] - self.mean[i]) / self.std[i];
        }
        out
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_standardization() {
        // Feature 0 has values 1..=5: mean 3, population std sqrt(2).
        let rows: Vec<FeatureRow> =
            (1..=5).map(|i| [i as f64, 0.0, 0.0, 0.0, 0.0]).collect();
        let scaler = StandardScaler::fit(&rows);

        let z = scaler.transform(&[5.0, 0.0, 0.0, 0.0, 0.0]);
        let expected = 2.0 / 2.0f64.sqrt();
        assert!((z[0] - expected).abs() < 1e-12, "got {}", z[0]);
    }

    #[test]
    fn test_constant_feature_maps_to_zero() {
        let rows: Vec<FeatureRow> = (0..10).map(|_| [7.0, 1.0, 2.0, 3.0, 4.0]).collect();
        let scaler = StandardScaler::fit(&rows);

        let z = scaler.transform(&[7.0, 1.0, 2.0, 3.0, 4.0]);
        for (i, v) in z.iter().enumerate() {
            assert!(v.abs() < 1e-9, "feature {i} should be ~0, got {v}");
        }
    }

    #[test]
    fn test_transformed_training_set_has_zero_mean_unit_variance() {
        let rows: Vec<FeatureRow> = (0..50)
            .map(|i| {
                let x = i as f64;
                [x, x * 2.0 + 3.0, x.mul_add(-0.5, 10.0), 1.0, x * x]
            })
            .collect();
        let scaler = StandardScaler::fit(&rows);
        let transformed: Vec<FeatureRow> = rows.iter().map(|r| scaler.transform(r)).collect();

        let n = transformed.len() as f64;
        for i in 0..FEATURE_COUNT {
            let mean: f64 = transformed.iter().map(|r| r[i]).sum::<f64>() / n;
            let var: f64 = transformed.iter().map(|r| (r[i] - mean).powi(2)).sum::<f64>() / n;
            assert!(mean.abs() < 1e-9, "feature {i} mean {mean}");
            if i == 3 {
                // Constant feature collapses to zero variance.
                assert!(var.abs() < 1e-9, "feature {i} var {var}");
            } else {
                assert!((var - 1.0).abs() < 1e-9, "feature {i} var {var}");
            }
        }
    }
}
