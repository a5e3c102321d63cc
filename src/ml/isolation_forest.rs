//! Isolation Forest
//!
//! Unsupervised outlier detection over standardized feature rows.
//! Anomalies isolate in fewer random splits than inliers, so short mean
//! path lengths across the ensemble translate into high anomaly scores.
//!
//! The decision threshold is calibrated on the training scores: the
//! (1 - contamination) quantile splits the population so roughly the
//! contamination share lands above it. Flagging is strictly greater-than,
//! so a degenerate population whose scores all collapse onto the
//! threshold flags nothing.

use rand::rngs::StdRng;
use rand::Rng;
use rayon::prelude::*;
use statrs::statistics::{Data, OrderStatistics};

use super::{FeatureRow, FEATURE_COUNT};

/// Rows subsampled per tree, capped by the training set size.
const SUBSAMPLE_SIZE: usize = 256;

const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

/// Mean unsuccessful-search path length in a binary search tree of n
/// nodes. Normalizes raw path lengths and extends paths at truncated
/// leaves.
fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
        }
    }
}

// ============================================================================
// Trees
// ============================================================================

enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
    Leaf {
        size: usize,
    },
}

struct IsoTree {
    root: Node,
}

impl IsoTree {
    fn fit(rows: &[FeatureRow], indices: &[usize], max_depth: usize, rng: &mut StdRng) -> Self {
        Self {
            root: build_node(rows, indices, 0, max_depth, rng),
        }
    }

    /// Depth at which a row lands, plus the expected remaining depth for
    /// the leaf it lands in.
    fn path_length(&self, row: &FeatureRow) -> f64 {
        let mut node = &self.root;
        let mut depth = 0.0;
        loop {
            match node {
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    depth += 1.0;
                    node = if row[*feature] < *threshold { left } else { right };
                }
                Node::Leaf { size } => return depth + average_path_length(*size),
            }
        }
    }
}

fn build_node(
    rows: &[FeatureRow],
    indices: &[usize],
    depth: usize,
    max_depth: usize,
    rng: &mut StdRng,
) -> Node {
    if indices.len() <= 1 || depth >= max_depth {
        return Node::Leaf {
            size: indices.len(),
        };
    }

    // Only features with spread in this partition can split it.
    let mut ranges = [(0.0f64, 0.0f64); FEATURE_COUNT];
    let mut varying = [false; FEATURE_COUNT];
    let mut any_varying = false;
    for (feature, (range, flag)) in ranges.iter_mut().zip(&mut varying).enumerate() {
        let mut lo = f64::INFINITY;
        let mut hi = f64::NEG_INFINITY;
        for &i in indices {
            lo = lo.min(rows[i][feature]);
            hi = hi.max(rows[i][feature]);
        }
        *range = (lo, hi);
        if hi > lo {
            *flag = true;
            any_varying = true;
        }
    }
    if !any_varying {
        return Node::Leaf {
            size: indices.len(),
        };
    }

    let feature = loop {
        let candidate = rng.gen_range(0..FEATURE_COUNT);
        if varying[candidate] {
            break candidate;
        }
    };
    let (lo, hi) = ranges[feature];
    let threshold = rng.gen_range(lo..hi);

    let (left, right): (Vec<usize>, Vec<usize>) = indices
        .iter()
        .copied()
        .partition(|&i| rows[i][feature] < threshold);

    Node::Split {
        feature,
        threshold,
        left: Box::new(build_node(rows, &left, depth + 1, max_depth, rng)),
        right: Box::new(build_node(rows, &right, depth + 1, max_depth, rng)),
    }
}

// ============================================================================
// Forest
// ============================================================================

/// Ensemble of isolation trees with a calibrated decision threshold.
pub struct IsolationForest {
    trees: Vec<IsoTree>,
    normalizer: f64,
    threshold: f64,
}

impl IsolationForest {
    /// Fit the ensemble and calibrate the threshold on the training rows.
    ///
    /// Tree construction is sequential so a seeded RNG reproduces the
    /// forest exactly.
    pub fn fit(train: &[FeatureRow], n_estimators: usize, contamination: f64, rng: &mut StdRng) -> Self {
        let subsample = SUBSAMPLE_SIZE.min(train.len());
        let max_depth = (subsample as f64).log2().ceil() as usize;

        let mut trees = Vec::with_capacity(n_estimators);
        for _ in 0..n_estimators {
            let indices = rand::seq::index::sample(rng, train.len(), subsample).into_vec();
            trees.push(IsoTree::fit(train, &indices, max_depth, rng));
        }

        let normalizer = match average_path_length(subsample) {
            c if c > 0.0 => c,
            _ => 1.0,
        };

        let mut forest = Self {
            trees,
            normalizer,
            threshold: 0.0,
        };
        let train_scores: Vec<f64> = train.par_iter().map(|row| forest.score(row)).collect();
        forest.threshold = score_quantile(train_scores, 1.0 - contamination);
        forest
    }

    /// Anomaly score in (0, 1]; higher isolates faster.
    pub fn score(&self, row: &FeatureRow) -> f64 {
        if self.trees.is_empty() {
            return 0.0;
        }
        let total: f64 = self.trees.iter().map(|t| t.path_length(row)).sum();
        let mean_path = total / self.trees.len() as f64;
        2.0f64.powf(-mean_path / self.normalizer)
    }

    /// Flag every row scoring strictly above the calibrated threshold.
    pub fn predict(&self, rows: &[FeatureRow]) -> Vec<bool> {
        rows.par_iter()
            .map(|row| self.score(row) > self.threshold)
            .collect()
    }

    #[cfg(test)]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }
}

fn score_quantile(scores: Vec<f64>, tau: f64) -> f64 {
    if scores.is_empty() {
        return 0.0;
    }
    let mut data = Data::new(scores);
    data.quantile(tau)
}

// ============================================================================
// Tests
// ============================================================================
