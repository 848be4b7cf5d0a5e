//! Out-of-bag scoring.

use serde::Serialize;

use crate::error::RfError;
use crate::tree::DecisionTree;

/// Accuracy and calibration of out-of-bag probabilities on the training set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OobScore {
    /// Share of OOB-scored samples whose class at the 0.5 cut matches the label.
    pub accuracy: f64,
    /// Mean squared error of OOB probabilities against 0/1 labels.
    pub brier_score: f64,
    /// Number of samples left out of at least one tree.
    pub n_oob_samples: usize,
}

/// Score each sample with the trees whose bootstrap missed it.
///
/// Samples that every tree saw are skipped.
pub(crate) fn compute_oob(
    trees: &[DecisionTree],
    features: &[Vec<f64>],
    labels: &[bool],
    out_of_bag: &[Vec<usize>],
) -> Result<OobScore, RfError> {
    let n_samples = features.len();
    let mut sums = vec![0.0f64; n_samples];
    let mut counts = vec![0usize; n_samples];

    for (tree, indices) in trees.iter().zip(out_of_bag) {
        for &i in indices {
            sums[i] += tree.leaf_fraction(&features[i]);
            counts[i] += 1;
        }
    }

    let mut n_oob_samples = 0usize;
    let mut correct = 0usize;
    let mut squared_error = 0.0f64;
    for i in (0..n_samples).filter(|&i| counts[i] > 0) {
        let p = sums[i] / counts[i] as f64;
        let y = if labels[i] { 1.0 } else { 0.0 };
        n_oob_samples += 1;
        if (p > 0.5) == labels[i] {
            correct += 1;
        }
        squared_error += (p - y) * (p - y);
    }

    if n_oob_samples == 0 {
        return Err(RfError::OobEvaluationFailed {
            reason: "no sample has any OOB tree".to_string(),
        });
    }

    let n = n_oob_samples as f64;
    Ok(OobScore {
        accuracy: correct as f64 / n,
        brier_score: squared_error / n,
        n_oob_samples,
    })
}

#[cfg(test)]
mod tests {
    use super::compute_oob;
    use crate::error::RfError;
    use crate::tree::DecisionTreeConfig;

    #[test]
    fn no_out_of_bag_samples_fails() {
        let features = vec![vec![0.0], vec![1.0]];
        let labels = [false, true];
        let tree = DecisionTreeConfig::new().fit(&features, &labels).unwrap();
        let err = compute_oob(&[tree], &features, &labels, &[vec![]]).unwrap_err();
        assert!(matches!(err, RfError::OobEvaluationFailed { .. }));
    }

    #[test]
    fn perfect_tree_scores_perfectly() {
        let features = vec![vec![0.0], vec![1.0], vec![2.0], vec![3.0]];
        let labels = [false, false, true, true];
        let tree = DecisionTreeConfig::new().fit(&features, &labels).unwrap();
        let score = compute_oob(&[tree], &features, &labels, &[vec![0, 3]]).unwrap();
        assert_eq!(score.n_oob_samples, 2);
        assert_eq!(score.accuracy, 1.0);
        assert_eq!(score.brier_score, 0.0);
    }
}
