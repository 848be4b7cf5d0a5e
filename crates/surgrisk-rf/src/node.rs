//! Node arena types for fitted trees.

/// Zero-based feature column index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FeatureIndex(usize);

impl FeatureIndex {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    /// Column position in the training rows.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Position of a node in a tree's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeIndex(usize);

impl NodeIndex {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Node impurity under the configured criterion; 0 for a pure node.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Impurity(f64);

impl Impurity {
    pub(crate) fn new(value: f64) -> Self {
        Self(value)
    }

    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }

    /// Whether every sample at the node has the same label.
    #[must_use]
    pub fn is_pure(self) -> bool {
        self.0 == 0.0
    }
}

/// Training samples that reached a node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeStats {
    /// Samples at the node, counting bootstrap duplicates.
    pub n_samples: usize,
    /// Of those, samples with a positive label.
    pub n_positive: usize,
    /// Impurity of the label mix.
    pub impurity: Impurity,
}

impl NodeStats {
    /// Share of positive samples; 0 for an empty node.
    #[must_use]
    pub fn positive_fraction(&self) -> f64 {
        if self.n_samples == 0 {
            0.0
        } else {
            self.n_positive as f64 / self.n_samples as f64
        }
    }
}

/// A node in a decision tree arena. The root is at index 0.
#[derive(Debug, Clone)]
pub enum Node {
    /// Interior node; samples with `feature <= threshold` go left.
    Split {
        feature: FeatureIndex,
        threshold: f64,
        left: NodeIndex,
        right: NodeIndex,
        /// `n * impurity - n_left * impurity_left - n_right * impurity_right`.
        impurity_decrease: f64,
        stats: NodeStats,
    },
    /// Terminal node; predicts its positive fraction.
    Leaf(NodeStats),
}

impl Node {
    /// Sample counts and impurity, before splitting for interior nodes.
    #[must_use]
    pub fn stats(&self) -> &NodeStats {
        match self {
            Node::Split { stats, .. } | Node::Leaf(stats) => stats,
        }
    }

    #[must_use]
    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf(_))
    }
}
