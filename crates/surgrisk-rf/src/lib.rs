//! Random forest probability estimation for a binary outcome.
//!
//! CART trees grown on bootstrap samples with random feature subsets at each
//! split. Each leaf stores the fraction of positive training samples that
//! reached it; the forest probability is the mean of those fractions across
//! trees. Trees are trained in parallel with rayon from seeds drawn up front,
//! so results do not depend on the thread count.

mod config;
mod error;
mod forest;
mod importance;
mod node;
mod oob;
mod predict;
mod result;
mod split;
mod tree;

pub use config::{DEFAULT_N_TREES, MaxFeatures, OobMode, RandomForestConfig};
pub use error::RfError;
pub use forest::RandomForest;
pub use importance::RankedFeature;
pub use node::{FeatureIndex, Impurity, Node, NodeIndex, NodeStats};
pub use oob::OobScore;
pub use result::{RandomForestResult, TrainingMetadata};
pub use split::SplitCriterion;
pub use tree::{DecisionTree, DecisionTreeConfig};
