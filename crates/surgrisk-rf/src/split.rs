use rand::Rng;

use crate::node::{FeatureIndex, Impurity};

/// Criterion for measuring the quality of a split.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitCriterion {
    /// Gini impurity: `2 p (1 - p)` for positive fraction `p`.
    Gini,
    /// Binary entropy in nats: `-p ln p - (1 - p) ln (1 - p)`.
    Entropy,
}

impl SplitCriterion {
    /// Impurity of a node holding `n_positive` positives out of `n_samples`.
    ///
    /// An empty node has impurity 0.
    #[must_use]
    pub fn impurity(&self, n_positive: usize, n_samples: usize) -> Impurity {
        if n_samples == 0 {
            return Impurity::new(0.0);
        }
        let p = n_positive as f64 / n_samples as f64;
        let q = 1.0 - p;
        let value = match self {
            SplitCriterion::Gini => 1.0 - p * p - q * q,
            SplitCriterion::Entropy => {
                let term = |x: f64| if x > 0.0 { -x * x.ln() } else { 0.0 };
                term(p) + term(q)
            }
        };
        Impurity::new(value)
    }
}

/// Best split found for a node.
#[derive(Debug, Clone)]
pub(crate) struct SplitResult {
    pub(crate) feature: FeatureIndex,
    pub(crate) threshold: f64,
    /// `n * I(parent) - n_left * I(left) - n_right * I(right)`.
    pub(crate) impurity_decrease: f64,
    pub(crate) left_indices: Vec<usize>,
    pub(crate) right_indices: Vec<usize>,
}

/// Parameters shared by every split search within one tree.
pub(crate) struct SplitSearch<'a> {
    /// Column-major: `columns[feature_idx][sample_idx]`.
    pub(crate) columns: &'a [Vec<f64>],
    pub(crate) labels: &'a [bool],
    pub(crate) criterion: SplitCriterion,
    pub(crate) max_features: usize,
    pub(crate) min_samples_leaf: usize,
}

impl SplitSearch<'_> {
    /// Find the best threshold split over `max_features` randomly drawn
    /// features.
    ///
    /// Each candidate feature is sorted once and scanned left to right with
    /// running positive counts. Thresholds sit midway between consecutive
    /// distinct values. Returns `None` when every candidate is constant on
    /// these samples or every boundary violates `min_samples_leaf`.
    pub(crate) fn best_split(
        &self,
        sample_indices: &[usize],
        rng: &mut impl Rng,
    ) -> Option<SplitResult> {
        let n_features = self.columns.len();
        let n_samples = sample_indices.len();
        if n_samples < 2 || n_features == 0 {
            return None;
        }

        let n_positive = sample_indices.iter().filter(|&&si| self.labels[si]).count();
        let parent = self.criterion.impurity(n_positive, n_samples).value();

        // Partial Fisher-Yates over the feature order.
        let mut order: Vec<usize> = (0..n_features).collect();
        let take = self.max_features.min(n_features);
        for i in 0..take {
            let j = rng.gen_range(i..n_features);
            order.swap(i, j);
        }

        let mut best_decrease = f64::NEG_INFINITY;
        let mut best: Option<(usize, f64)> = None;
        let mut sorted: Vec<(f64, bool)> = Vec::with_capacity(n_samples);

        for &feat_idx in &order[..take] {
            let column = &self.columns[feat_idx];
            sorted.clear();
            sorted.extend(sample_indices.iter().map(|&si| (column[si], self.labels[si])));
            sorted.sort_unstable_by(|a, b| a.0.total_cmp(&b.0));

            let mut left_positive = 0usize;
            for i in 0..(n_samples - 1) {
                let (value, label) = sorted[i];
                if label {
                    left_positive += 1;
                }
                let next = sorted[i + 1].0;
                if value == next {
                    continue;
                }

                let n_left = i + 1;
                let n_right = n_samples - n_left;
                if n_left < self.min_samples_leaf || n_right < self.min_samples_leaf {
                    continue;
                }

                let left = self.criterion.impurity(left_positive, n_left).value();
                let right = self
                    .criterion
                    .impurity(n_positive - left_positive, n_right)
                    .value();
                let decrease =
                    n_samples as f64 * parent - n_left as f64 * left - n_right as f64 * right;

                if decrease > best_decrease {
                    best_decrease = decrease;
                    best = Some((feat_idx, (value + next) / 2.0));
                }
            }
        }

        let (feature, threshold) = best?;
        let column = &self.columns[feature];
        let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = sample_indices
            .iter()
            .partition(|&&si| column[si] <= threshold);

        Some(SplitResult {
            feature: FeatureIndex::new(feature),
            threshold,
            impurity_decrease: best_decrease,
            left_indices,
            right_indices,
        })
    }
}
