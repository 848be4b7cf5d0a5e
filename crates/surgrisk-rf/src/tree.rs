use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, instrument};

use crate::{
    RfError,
    node::{Node, NodeIndex, NodeStats},
    split::{SplitCriterion, SplitSearch},
};

/// Configuration for a single CART decision tree.
///
/// Construct via [`DecisionTreeConfig::new`], then chain `with_*` methods.
///
/// # Defaults
///
/// | Parameter           | Default               |
/// |---------------------|-----------------------|
/// | `criterion`         | `Gini`                |
/// | `max_depth`         | `None` (unlimited)    |
/// | `min_samples_split` | 2                     |
/// | `min_samples_leaf`  | 1                     |
/// | `max_features`      | `None` (all features) |
/// | `seed`              | 38                    |
#[derive(Debug, Clone)]
pub struct DecisionTreeConfig {
    pub(crate) criterion: SplitCriterion,
    pub(crate) max_depth: Option<usize>,
    pub(crate) min_samples_split: usize,
    pub(crate) min_samples_leaf: usize,
    pub(crate) max_features: Option<usize>,
    pub(crate) seed: u64,
}

impl DecisionTreeConfig {
    /// Create a new config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            criterion: SplitCriterion::Gini,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            seed: 38,
        }
    }

    /// Set the split quality criterion.
    #[must_use]
    pub fn with_criterion(mut self, criterion: SplitCriterion) -> Self {
        self.criterion = criterion;
        self
    }

    /// Set the maximum tree depth (root is depth 0). `None` means unlimited.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the minimum number of samples required to attempt a split.
    #[must_use]
    pub fn with_min_samples_split(mut self, min_samples_split: usize) -> Self {
        self.min_samples_split = min_samples_split;
        self
    }

    /// Set the minimum number of samples required in each leaf after a split.
    #[must_use]
    pub fn with_min_samples_leaf(mut self, min_samples_leaf: usize) -> Self {
        self.min_samples_leaf = min_samples_leaf;
        self
    }

    /// Set the number of features drawn at each split. `None` means all.
    #[must_use]
    pub fn with_max_features(mut self, max_features: Option<usize>) -> Self {
        self.max_features = max_features;
        self
    }

    /// Set the random seed for feature subsampling.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Grow a tree on a row-major dataset.
    ///
    /// `features[sample_idx][feature_idx]`; `labels[sample_idx]` is the
    /// binary outcome.
    ///
    /// # Errors
    ///
    /// | Variant                               | When                                            |
    /// |---------------------------------------|-------------------------------------------------|
    /// | [`RfError::EmptyDataset`]             | `features` is empty                             |
    /// | [`RfError::ZeroFeatures`]             | rows have zero feature columns                  |
    /// | [`RfError::LabelCountMismatch`]       | `labels.len() != features.len()`                |
    /// | [`RfError::FeatureCountMismatch`]     | rows have inconsistent lengths                  |
    /// | [`RfError::NonFiniteValue`]           | any value is NaN or infinite                    |
    /// | [`RfError::InvalidMaxDepth`]          | `max_depth` is `Some(0)`                        |
    /// | [`RfError::InvalidMinSamplesSplit`]   | `min_samples_split` < 2                         |
    /// | [`RfError::InvalidMinSamplesLeaf`]    | `min_samples_leaf` < 1                          |
    /// | [`RfError::InvalidMaxFeatures`]       | `max_features` resolves outside [1, n_features] |
    #[instrument(skip(self, features, labels), fields(n_samples = features.len()))]
    pub fn fit(&self, features: &[Vec<f64>], labels: &[bool]) -> Result<DecisionTree, RfError> {
        let n_features = crate::forest::validate_dataset(features, labels)?;
        let max_features = self.validate(n_features)?;

        let columns: Vec<Vec<f64>> = (0..n_features)
            .map(|j| features.iter().map(|row| row[j]).collect())
            .collect();
        let all: Vec<usize> = (0..features.len()).collect();
        Ok(self.grow(&columns, labels, &all, max_features))
    }

    /// Check the tree parameters and resolve `max_features`.
    pub(crate) fn validate(&self, n_features: usize) -> Result<usize, RfError> {
        if self.max_depth == Some(0) {
            return Err(RfError::InvalidMaxDepth { max_depth: 0 });
        }
        if self.min_samples_split < 2 {
            return Err(RfError::InvalidMinSamplesSplit {
                min_samples_split: self.min_samples_split,
            });
        }
        if self.min_samples_leaf < 1 {
            return Err(RfError::InvalidMinSamplesLeaf {
                min_samples_leaf: self.min_samples_leaf,
            });
        }
        let max_features = self.max_features.unwrap_or(n_features);
        if max_features == 0 || max_features > n_features {
            return Err(RfError::InvalidMaxFeatures {
                max_features,
                n_features,
            });
        }
        Ok(max_features)
    }

    /// Grow a tree on the rows listed in `sample_indices` of a pre-validated
    /// column-major dataset. Repeated indices act as bootstrap weights.
    pub(crate) fn grow(
        &self,
        columns: &[Vec<f64>],
        labels: &[bool],
        sample_indices: &[usize],
        max_features: usize,
    ) -> DecisionTree {
        let mut builder = Builder {
            config: self,
            search: SplitSearch {
                columns,
                labels,
                criterion: self.criterion,
                max_features,
                min_samples_leaf: self.min_samples_leaf,
            },
            rng: ChaCha8Rng::seed_from_u64(self.seed),
            arena: Vec::new(),
        };
        builder.build(sample_indices, 0);

        debug!(
            n_samples = sample_indices.len(),
            n_nodes = builder.arena.len(),
            "decision tree built"
        );

        DecisionTree {
            nodes: builder.arena,
            n_features: columns.len(),
        }
    }
}

impl Default for DecisionTreeConfig {
    fn default() -> Self {
        Self::new()
    }
}

struct Builder<'a> {
    config: &'a DecisionTreeConfig,
    search: SplitSearch<'a>,
    rng: ChaCha8Rng,
    arena: Vec<Node>,
}

impl Builder<'_> {
    /// Depth-first growth; returns the index of the node just created.
    fn build(&mut self, sample_indices: &[usize], depth: usize) -> NodeIndex {
        let n_samples = sample_indices.len();
        let n_positive = sample_indices
            .iter()
            .filter(|&&si| self.search.labels[si])
            .count();
        let stats = NodeStats {
            n_samples,
            n_positive,
            impurity: self.config.criterion.impurity(n_positive, n_samples),
        };

        let stop = n_samples < self.config.min_samples_split
            || stats.impurity.is_pure()
            || self.config.max_depth.is_some_and(|d| depth >= d);

        let split = if stop {
            None
        } else {
            self.search.best_split(sample_indices, &mut self.rng)
        };

        // The parent slot is reserved first so children get larger indices.
        self.arena.push(Node::Leaf(stats));
        let node_idx = NodeIndex::new(self.arena.len() - 1);
        let Some(split) = split else {
            return node_idx;
        };

        let left = self.build(&split.left_indices, depth + 1);
        let right = self.build(&split.right_indices, depth + 1);
        self.arena[node_idx.index()] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
            impurity_decrease: split.impurity_decrease,
            stats,
        };
        node_idx
    }
}

/// A fitted CART decision tree stored as a node arena.
#[derive(Debug, Clone)]
pub struct DecisionTree {
    pub(crate) nodes: Vec<Node>,
    pub(crate) n_features: usize,
}

impl DecisionTree {
    /// Positive fraction of the leaf reached by `sample`.
    ///
    /// At each split the sample goes left when `sample[feature] <= threshold`.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::PredictionFeatureMismatch`] when `sample.len() != n_features`.
    pub fn predict_proba(&self, sample: &[f64]) -> Result<f64, RfError> {
        if sample.len() != self.n_features {
            return Err(RfError::PredictionFeatureMismatch {
                expected: self.n_features,
                got: sample.len(),
            });
        }
        Ok(self.leaf_fraction(sample))
    }

    /// Walk from the root to a leaf; `sample` has already been length-checked.
    pub(crate) fn leaf_fraction(&self, sample: &[f64]) -> f64 {
        let mut idx = 0usize;
        loop {
            match &self.nodes[idx] {
                Node::Leaf(stats) => return stats.positive_fraction(),
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    ..
                } => {
                    idx = if sample[feature.index()] <= *threshold {
                        left.index()
                    } else {
                        right.index()
                    };
                }
            }
        }
    }

    /// Mean decrease in impurity per feature, normalized to sum to 1.
    ///
    /// All zeros when the tree is a single leaf.
    #[must_use]
    pub fn feature_importances(&self) -> Vec<f64> {
        let mut totals = vec![0.0f64; self.n_features];
        for node in &self.nodes {
            if let Node::Split {
                feature,
                impurity_decrease,
                ..
            } = node
            {
                totals[feature.index()] += impurity_decrease;
            }
        }
        let sum: f64 = totals.iter().sum();
        if sum > 0.0 {
            totals.iter_mut().for_each(|v| *v /= sum);
        }
        totals
    }

    /// The node arena; the root is at index 0.
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Return the total number of nodes in the tree.
    #[must_use]
    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Return the number of leaf nodes.
    #[must_use]
    pub fn n_leaves(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    /// Longest root-to-leaf path; a lone root leaf has depth 0.
    #[must_use]
    pub fn depth(&self) -> usize {
        let mut max_depth = 0usize;
        let mut stack = vec![(0usize, 0usize)];
        while let Some((idx, d)) = stack.pop() {
            match &self.nodes[idx] {
                Node::Leaf(_) => max_depth = max_depth.max(d),
                Node::Split { left, right, .. } => {
                    stack.push((left.index(), d + 1));
                    stack.push((right.index(), d + 1));
                }
            }
        }
        max_depth
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn separable() -> (Vec<Vec<f64>>, Vec<bool>) {
        let features = vec![
            vec![1.0, 0.0],
            vec![2.0, 0.0],
            vec![3.0, 0.0],
            vec![10.0, 0.0],
            vec![11.0, 0.0],
            vec![12.0, 0.0],
        ];
        (features, vec![false, false, false, true, true, true])
    }

    fn xor() -> (Vec<Vec<f64>>, Vec<bool>) {
        let features = vec![
            vec![0.0, 0.0],
            vec![0.0, 1.0],
            vec![1.0, 0.0],
            vec![1.0, 1.0],
        ];
        (features, vec![false, true, true, false])
    }

    #[test]
    fn empty_dataset_error() {
        let err = DecisionTreeConfig::new().fit(&[], &[]).unwrap_err();
        assert!(matches!(err, RfError::EmptyDataset));
    }

    #[test]
    fn pure_dataset_single_leaf() {
        let features = vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]];
        let tree = DecisionTreeConfig::new()
            .fit(&features, &[true, true, true])
            .unwrap();
        assert_eq!(tree.n_nodes(), 1);
        assert_eq!(tree.depth(), 0);
        assert_eq!(tree.predict_proba(&[2.0, 3.0]).unwrap(), 1.0);
    }

    #[test]
    fn separable_leaves_are_pure() {
        let (features, labels) = separable();
        let tree = DecisionTreeConfig::new().fit(&features, &labels).unwrap();
        assert_eq!(tree.predict_proba(&[2.0, 0.0]).unwrap(), 0.0);
        assert_eq!(tree.predict_proba(&[11.0, 0.0]).unwrap(), 1.0);
        assert_eq!(tree.n_leaves(), 2);
    }

    #[test]
    fn depth_limit_gives_mixed_leaves() {
        let (features, labels) = xor();
        let full = DecisionTreeConfig::new().fit(&features, &labels).unwrap();
        assert!(full.depth() >= 2);

        let stump = DecisionTreeConfig::new()
            .with_max_depth(Some(1))
            .fit(&features, &labels)
            .unwrap();
        assert!(stump.depth() <= 1);
        for row in &features {
            assert_eq!(stump.predict_proba(row).unwrap(), 0.5);
        }
    }

    #[test]
    fn importances_sum_to_one() {
        let features = vec![
            vec![1.0, 100.0],
            vec![2.0, 200.0],
            vec![3.0, 300.0],
            vec![10.0, 100.0],
            vec![11.0, 200.0],
            vec![12.0, 300.0],
        ];
        let (_, labels) = separable();
        let tree = DecisionTreeConfig::new().fit(&features, &labels).unwrap();
        let importances = tree.feature_importances();
        assert!((importances.iter().sum::<f64>() - 1.0).abs() < 1e-10);
        assert!(importances[0] > importances[1]);
    }

    #[test]
    fn min_samples_split_stops_growth() {
        let (features, labels) = separable();
        let tree = DecisionTreeConfig::new()
            .with_min_samples_split(7)
            .fit(&features, &labels)
            .unwrap();
        assert_eq!(tree.n_nodes(), 1);
        assert_eq!(tree.predict_proba(&[1.0, 0.0]).unwrap(), 0.5);
    }

    #[test]
    fn config_validation() {
        let (features, labels) = separable();
        assert!(matches!(
            DecisionTreeConfig::new().with_max_depth(Some(0)).fit(&features, &labels),
            Err(RfError::InvalidMaxDepth { .. })
        ));
        assert!(matches!(
            DecisionTreeConfig::new().with_min_samples_split(1).fit(&features, &labels),
            Err(RfError::InvalidMinSamplesSplit { .. })
        ));
        assert!(matches!(
            DecisionTreeConfig::new().with_min_samples_leaf(0).fit(&features, &labels),
            Err(RfError::InvalidMinSamplesLeaf { .. })
        ));
        assert!(matches!(
            DecisionTreeConfig::new().with_max_features(Some(3)).fit(&features, &labels),
            Err(RfError::InvalidMaxFeatures { max_features: 3, n_features: 2 })
        ));
    }

    #[test]
    fn data_validation() {
        let err = DecisionTreeConfig::new()
            .fit(&[vec![1.0, 2.0], vec![3.0]], &[false, true])
            .unwrap_err();
        assert!(matches!(err, RfError::FeatureCountMismatch { sample_index: 1, .. }));

        let err = DecisionTreeConfig::new()
            .fit(&[vec![1.0, f64::NAN], vec![3.0, 4.0]], &[false, true])
            .unwrap_err();
        assert!(matches!(
            err,
            RfError::NonFiniteValue { sample_index: 0, feature_index: 1 }
        ));
    }

    #[test]
    fn prediction_feature_mismatch() {
        let (features, labels) = separable();
        let tree = DecisionTreeConfig::new().fit(&features, &labels).unwrap();
        assert!(matches!(
            tree.predict_proba(&[1.0]),
            Err(RfError::PredictionFeatureMismatch { expected: 2, got: 1 })
        ));
    }
}
