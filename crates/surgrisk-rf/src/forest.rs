//! Random forest training with parallel tree construction.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use tracing::{debug, info, instrument};

use crate::config::{OobMode, RandomForestConfig};
use crate::error::RfError;
use crate::importance::aggregate_importances;
use crate::oob::compute_oob;
use crate::result::{RandomForestResult, TrainingMetadata};
use crate::tree::{DecisionTree, DecisionTreeConfig};

/// A fitted random forest.
#[derive(Debug, Clone)]
pub struct RandomForest {
    pub(crate) trees: Vec<DecisionTree>,
    pub(crate) n_features: usize,
    pub(crate) feature_names: Vec<String>,
}

/// Check shape and finiteness of a training set; returns the column count.
pub(crate) fn validate_dataset(features: &[Vec<f64>], labels: &[bool]) -> Result<usize, RfError> {
    if features.is_empty() {
        return Err(RfError::EmptyDataset);
    }
    let n_samples = features.len();
    let n_features = features[0].len();
    if n_features == 0 {
        return Err(RfError::ZeroFeatures);
    }
    if labels.len() != n_samples {
        return Err(RfError::LabelCountMismatch {
            n_samples,
            n_labels: labels.len(),
        });
    }
    for (sample_index, row) in features.iter().enumerate() {
        if row.len() != n_features {
            return Err(RfError::FeatureCountMismatch {
                expected: n_features,
                got: row.len(),
                sample_index,
            });
        }
        if let Some(feature_index) = row.iter().position(|v| !v.is_finite()) {
            return Err(RfError::NonFiniteValue {
                sample_index,
                feature_index,
            });
        }
    }
    Ok(n_features)
}

/// Draw `draw_count` indices with replacement; also return the never-drawn ones.
fn bootstrap_sample(
    n_samples: usize,
    draw_count: usize,
    rng: &mut impl Rng,
) -> (Vec<usize>, Vec<usize>) {
    let mut in_bag = vec![false; n_samples];
    let drawn: Vec<usize> = (0..draw_count)
        .map(|_| {
            let idx = rng.gen_range(0..n_samples);
            in_bag[idx] = true;
            idx
        })
        .collect();
    let out_of_bag = (0..n_samples).filter(|&i| !in_bag[i]).collect();
    (drawn, out_of_bag)
}

/// Train the ensemble.
#[instrument(skip_all, fields(n_trees = config.n_trees, n_samples = features.len()))]
pub(crate) fn train(
    config: &RandomForestConfig,
    features: &[Vec<f64>],
    labels: &[bool],
    feature_names: &[String],
) -> Result<RandomForestResult, RfError> {
    let n_features = validate_dataset(features, labels)?;
    if feature_names.len() != n_features {
        return Err(RfError::FeatureNameMismatch {
            n_features,
            n_names: feature_names.len(),
        });
    }

    let max_features = config.max_features.resolve(n_features)?;
    if !(config.bootstrap_fraction > 0.0 && config.bootstrap_fraction <= 1.0) {
        return Err(RfError::InvalidBootstrapFraction {
            fraction: config.bootstrap_fraction,
        });
    }

    let tree_template = DecisionTreeConfig::new()
        .with_criterion(config.criterion)
        .with_max_depth(config.max_depth)
        .with_min_samples_split(config.min_samples_split)
        .with_min_samples_leaf(config.min_samples_leaf)
        .with_max_features(Some(max_features));
    tree_template.validate(n_features)?;

    let n_samples = features.len();
    let n_positive = labels.iter().filter(|&&l| l).count();
    let draw_count = (n_samples as f64 * config.bootstrap_fraction).ceil() as usize;

    info!(
        n_trees = config.n_trees,
        n_samples,
        n_positive,
        n_features,
        max_features,
        draw_count,
        "training random forest"
    );

    let columns: Vec<Vec<f64>> = (0..n_features)
        .map(|j| features.iter().map(|row| row[j]).collect())
        .collect();

    // Seeds are fixed before the parallel section so the ensemble does not
    // depend on scheduling.
    let mut master_rng = ChaCha8Rng::seed_from_u64(config.seed);
    let tree_seeds: Vec<u64> = (0..config.n_trees).map(|_| master_rng.r#gen()).collect();

    let grown: Vec<(DecisionTree, Vec<usize>)> = tree_seeds
        .into_par_iter()
        .map(|seed| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let (in_bag, out_of_bag) = bootstrap_sample(n_samples, draw_count, &mut rng);
            let tree = tree_template
                .clone()
                .with_seed(rng.r#gen())
                .grow(&columns, labels, &in_bag, max_features);
            (tree, out_of_bag)
        })
        .collect();

    let (trees, out_of_bag): (Vec<DecisionTree>, Vec<Vec<usize>>) = grown.into_iter().unzip();

    let per_tree: Vec<Vec<f64>> = trees.iter().map(DecisionTree::feature_importances).collect();
    let importances = aggregate_importances(&per_tree, feature_names);

    debug!(n_trees_trained = trees.len(), "tree training complete");

    let oob_score = match config.oob_mode {
        OobMode::Enabled => Some(compute_oob(&trees, features, labels, &out_of_bag)?),
        OobMode::Disabled => None,
    };

    let forest = RandomForest {
        trees,
        n_features,
        feature_names: feature_names.to_vec(),
    };

    let metadata = TrainingMetadata {
        n_trees: config.n_trees,
        n_features,
        n_samples,
        n_positive,
        max_features_resolved: max_features,
    };

    info!(
        oob_accuracy = oob_score.as_ref().map(|s| s.accuracy),
        "random forest training complete"
    );

    Ok(RandomForestResult::new(forest, importances, oob_score, metadata))
}

#[cfg(test)]
mod tests {
    use crate::config::{MaxFeatures, OobMode, RandomForestConfig};
    use crate::error::RfError;

    /// Positives for x >= 10, with a constant second column.
    fn make_separable_data() -> (Vec<Vec<f64>>, Vec<bool>, Vec<String>) {
        let mut features = Vec::new();
        let mut labels = Vec::new();
        for i in 0..30 {
            features.push(vec![i as f64 * 0.1, 0.5]);
            labels.push(false);
        }
        for i in 0..30 {
            features.push(vec![10.0 + i as f64 * 0.1, 0.5]);
            labels.push(true);
        }
        (features, labels, vec!["x".to_string(), "y".to_string()])
    }

    #[test]
    fn separable_probabilities_follow_labels() {
        let (features, labels, names) = make_separable_data();
        let result = RandomForestConfig::new(50)
            .unwrap()
            .with_max_features(MaxFeatures::All)
            .fit(&features, &labels, &names)
            .unwrap();

        let probs = result.forest().predict_proba_batch(&features).unwrap();
        for (p, &label) in probs.iter().zip(&labels) {
            assert!((*p > 0.5) == label, "p = {p}, label = {label}");
        }
    }

    #[test]
    fn oob_score_computed() {
        let (features, labels, names) = make_separable_data();
        let result = RandomForestConfig::new(50)
            .unwrap()
            .with_oob_mode(OobMode::Enabled)
            .fit(&features, &labels, &names)
            .unwrap();

        let oob = result.oob_score().expect("OOB should be computed");
        assert!(oob.accuracy > 0.9, "oob accuracy = {}", oob.accuracy);
        assert!(oob.brier_score < 0.1);
        assert!(oob.n_oob_samples > 0);
    }

    #[test]
    fn oob_skipped_by_default() {
        let (features, labels, names) = make_separable_data();
        let result = RandomForestConfig::new(5)
            .unwrap()
            .fit(&features, &labels, &names)
            .unwrap();
        assert!(result.oob_score().is_none());
    }

    #[test]
    fn importances_favor_informative_column() {
        let (features, labels, names) = make_separable_data();
        let result = RandomForestConfig::new(20)
            .unwrap()
            .fit(&features, &labels, &names)
            .unwrap();

        let total: f64 = result.importances().iter().map(|f| f.importance).sum();
        assert!((total - 1.0).abs() < 1e-10, "total = {total}");
        assert_eq!(result.importances()[0].name, "x");
        assert_eq!(result.importances()[0].rank, 1);
    }

    #[test]
    fn deterministic_with_same_seed() {
        let (features, labels, names) = make_separable_data();
        let fit = |seed| {
            RandomForestConfig::new(10)
                .unwrap()
                .with_seed(seed)
                .fit(&features, &labels, &names)
                .unwrap()
        };
        let a = fit(99).forest().predict_proba_batch(&features).unwrap();
        let b = fit(99).forest().predict_proba_batch(&features).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn metadata_recorded() {
        let (features, labels, names) = make_separable_data();
        let result = RandomForestConfig::new(3)
            .unwrap()
            .fit(&features, &labels, &names)
            .unwrap();
        let meta = result.metadata();
        assert_eq!(meta.n_trees, 3);
        assert_eq!(meta.n_samples, 60);
        assert_eq!(meta.n_positive, 30);
        assert_eq!(meta.max_features_resolved, 2);
        assert_eq!(result.forest().n_trees(), 3);
    }

    #[test]
    fn input_errors() {
        let (features, labels, names) = make_separable_data();
        let cfg = RandomForestConfig::new(5).unwrap();
        assert!(matches!(cfg.fit(&[], &[], &[]), Err(RfError::EmptyDataset)));
        assert!(matches!(
            cfg.fit(&features, &labels[1..], &names),
            Err(RfError::LabelCountMismatch { .. })
        ));
        assert!(matches!(
            cfg.fit(&features, &labels, &names[..1]),
            Err(RfError::FeatureNameMismatch { n_features: 2, n_names: 1 })
        ));
        assert!(matches!(
            cfg.clone()
                .with_bootstrap_fraction(0.0)
                .fit(&features, &labels, &names),
            Err(RfError::InvalidBootstrapFraction { .. })
        ));
        assert!(matches!(
            cfg.with_max_depth(Some(0)).fit(&features, &labels, &names),
            Err(RfError::InvalidMaxDepth { .. })
        ));
    }
}
