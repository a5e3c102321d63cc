//! Composite Scoring
//!
//! Folds the three detector verdicts and the spending flag into a single
//! 0-100 risk score. Z-scores convert to points only past the flag
//! threshold, at a fixed rate with a per-signal cap, so one extreme
//! signal cannot saturate the score alone.

/// Points per standard deviation once a z-score crosses the threshold.
pub const Z_POINTS_PER_SIGMA: f64 = 5.0;
/// Cap on each z-score contribution.
pub const Z_CONTRIBUTION_CAP: f64 = 30.0;
/// Flat contribution of an ML flag.
pub const ML_CONTRIBUTION: f64 = 25.0;
/// Flat contribution of a high-spend flag.
pub const HIGH_SPEND_CONTRIBUTION: f64 = 15.0;
/// Ceiling on the composite score.
pub const SCORE_CAP: f64 = 100.0;

/// Compute the composite risk score for one transaction.
///
/// Z-scores below or exactly at `z_threshold` contribute nothing.
pub fn composite_score(
    cost_z: f64,
    volume_z: f64,
    is_ml_anomaly: bool,
    is_high_spend: bool,
    z_threshold: f64,
) -> f64 {
    let mut score = 0.0;

    if cost_z > z_threshold {
        score += (cost_z * Z_POINTS_PER_SIGMA).min(Z_CONTRIBUTION_CAP);
    }
    if volume_z > z_threshold {
        score += (volume_z * Z_POINTS_PER_SIGMA).min(Z_CONTRIBUTION_CAP);
    }
    if is_ml_anomaly {
        score += ML_CONTRIBUTION;
    }
    if is_high_spend {
        score += HIGH_SPEND_CONTRIBUTION;
    }

    score.min(SCORE_CAP)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const Z: f64 = 3.0;

    #[test]
    fn test_clean_row_scores_zero() {
        assert_eq!(composite_score(0.0, 0.0, false, false, Z), 0.0);
        assert_eq!(composite_score(2.9, 2.9, false, false, Z), 0.0);
    }

    #[test]
    fn test_threshold_is_strict() {
        assert_eq!(composite_score(3.0, 0.0, false, false, Z), 0.0);
        assert!(composite_score(3.000_001, 0.0, false, false, Z) > 15.0);
    }

    #[test]
    fn test_z_points_scale_then_cap() {
        // 4 sigma: 20 points, under the cap.
        assert!((composite_score(4.0, 0.0, false, false, Z) - 20.0).abs() < 1e-12);
        // 7 sigma: 35 raw, capped at 30.
        assert!((composite_score(7.0, 0.0, false, false, Z) - 30.0).abs() < 1e-12);
        // Exactly at the cap boundary.
        assert!((composite_score(6.0, 0.0, false, false, Z) - 30.0).abs() < 1e-12);
    }

    #[test]
    fn test_flat_contributions() {
        assert!((composite_score(0.0, 0.0, true, false, Z) - 25.0).abs() < 1e-12);
        assert!((composite_score(0.0, 0.0, false, true, Z) - 15.0).abs() < 1e-12);
        assert!((composite_score(0.0, 0.0, true, true, Z) - 40.0).abs() < 1e-12);
    }

    #[test]
    fn test_combined_signals_add() {
        // 4 sigma cost (20) + ML (25) + spend (15) = 60.
        let score = composite_score(4.0, 0.0, true, true, Z);
        assert!((score - 60.0).abs() < 1e-12);

        // 4.2 sigma both axes (21 + 21) + ML (25) = 67.
        let score = composite_score(4.2, 4.2, true, false, Z);
        assert!((score - 67.0).abs() < 1e-12);
    }

    #[test]
    fn test_score_saturates_at_one_hundred() {
        // 30 + 30 + 25 + 15 = 100 exactly.
        assert_eq!(composite_score(10.0, 10.0, true, true, Z), 100.0);
        assert_eq!(composite_score(50.0, 50.0, true, true, Z), 100.0);
    }
}
