//! Receiver operating characteristic curve and its area.

use serde::Serialize;

use crate::error::EvalError;

/// One operating point of the ROC curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RocPoint {
    /// Cases with probability `>= threshold` are called positive.
    /// `None` for the origin, where nothing is called positive.
    pub threshold: Option<f64>,
    /// False positive rate, `FP / negatives`.
    pub false_positive_rate: f64,
    /// True positive rate, `TP / positives`.
    pub true_positive_rate: f64,
}

/// ROC curve over every distinct predicted probability.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RocCurve {
    points: Vec<RocPoint>,
    auc: f64,
}

impl RocCurve {
    /// Build the curve from scores and actual outcomes.
    ///
    /// Thresholds are the distinct probabilities in descending order; tied
    /// scores move together, so the curve takes a diagonal step across a tie.
    /// The curve starts at (0, 0) and, with the lowest threshold, ends at
    /// (1, 1).
    ///
    /// # Errors
    ///
    /// | Variant                          | Condition                         |
    /// |----------------------------------|-----------------------------------|
    /// | [`EvalError::EmptyTestSet`]      | no scores                         |
    /// | [`EvalError::LengthMismatch`]    | slices differ in length           |
    /// | [`EvalError::SingleClassTest`]   | all outcomes identical            |
    pub fn from_scores(probabilities: &[f64], actual: &[bool]) -> Result<Self, EvalError> {
        if actual.is_empty() {
            return Err(EvalError::EmptyTestSet);
        }
        if probabilities.len() != actual.len() {
            return Err(EvalError::LengthMismatch {
                n_actual: actual.len(),
                n_predicted: probabilities.len(),
            });
        }
        let n_positive = actual.iter().filter(|&&a| a).count();
        let n_negative = actual.len() - n_positive;
        if n_positive == 0 || n_negative == 0 {
            return Err(EvalError::SingleClassTest {
                outcome: n_positive > 0,
                n_cases: actual.len(),
            });
        }

        let mut order: Vec<usize> = (0..actual.len()).collect();
        order.sort_by(|&a, &b| probabilities[b].total_cmp(&probabilities[a]));

        let mut points = Vec::with_capacity(order.len() + 1);
        points.push(RocPoint {
            threshold: None,
            false_positive_rate: 0.0,
            true_positive_rate: 0.0,
        });

        let (mut tp, mut fp) = (0usize, 0usize);
        for (i, &idx) in order.iter().enumerate() {
            if actual[idx] {
                tp += 1;
            } else {
                fp += 1;
            }
            let last_of_tie = order
                .get(i + 1)
                .is_none_or(|&next| probabilities[next] != probabilities[idx]);
            if last_of_tie {
                points.push(RocPoint {
                    threshold: Some(probabilities[idx]),
                    false_positive_rate: fp as f64 / n_negative as f64,
                    true_positive_rate: tp as f64 / n_positive as f64,
                });
            }
        }

        let auc = trapezoid_area(&points);
        Ok(Self { points, auc })
    }

    /// Points in order of descending threshold.
    #[must_use]
    pub fn points(&self) -> &[RocPoint] {
        &self.points
    }

    /// Area under the curve by the trapezoid rule.
    #[must_use]
    pub fn auc(&self) -> f64 {
        self.auc
    }
}

fn trapezoid_area(points: &[RocPoint]) -> f64 {
    points
        .windows(2)
        .map(|w| {
            let dx = w[1].false_positive_rate - w[0].false_positive_rate;
            dx * (w[0].true_positive_rate + w[1].true_positive_rate) / 2.0
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfect_separation_has_unit_area() {
        let roc = RocCurve::from_scores(&[0.9, 0.8, 0.3, 0.1], &[true, true, false, false]).unwrap();
        assert_eq!(roc.auc(), 1.0);
        let pts = roc.points();
        assert_eq!(pts.len(), 5);
        assert_eq!(pts[2].false_positive_rate, 0.0);
        assert_eq!(pts[2].true_positive_rate, 1.0);
    }

    #[test]
    fn inverted_scores_have_zero_area() {
        let roc = RocCurve::from_scores(&[0.1, 0.2, 0.8, 0.9], &[true, true, false, false]).unwrap();
        assert_eq!(roc.auc(), 0.0);
    }

    #[test]
    fn constant_scores_give_diagonal() {
        let roc = RocCurve::from_scores(&[0.4; 4], &[true, false, true, false]).unwrap();
        assert_eq!(roc.points().len(), 2);
        assert!((roc.auc() - 0.5).abs() < 1e-12);
        assert_eq!(roc.points()[1].threshold, Some(0.4));
    }

    #[test]
    fn known_mixed_ranking() {
        // Positives at 0.9 and 0.4, negatives at 0.7 and 0.2: 3 of 4 pairs ordered.
        let roc = RocCurve::from_scores(&[0.9, 0.7, 0.4, 0.2], &[true, false, true, false]).unwrap();
        assert!((roc.auc() - 0.75).abs() < 1e-12);
    }

    #[test]
    fn endpoints_and_monotone() {
        let probs = [0.05, 0.5, 0.5, 0.7, 0.2, 0.9, 0.5, 0.1];
        let actual = [false, true, false, true, false, true, true, false];
        let roc = RocCurve::from_scores(&probs, &actual).unwrap();
        let pts = roc.points();
        assert_eq!((pts[0].false_positive_rate, pts[0].true_positive_rate), (0.0, 0.0));
        let last = pts.last().unwrap();
        assert_eq!((last.false_positive_rate, last.true_positive_rate), (1.0, 1.0));
        for w in pts.windows(2) {
            assert!(w[1].false_positive_rate >= w[0].false_positive_rate);
            assert!(w[1].true_positive_rate >= w[0].true_positive_rate);
        }
        // Distinct thresholds plus the origin.
        assert_eq!(pts.len(), 7);
    }

    #[test]
    fn single_class_rejected() {
        assert!(matches!(
            RocCurve::from_scores(&[0.2, 0.3], &[false, false]),
            Err(EvalError::SingleClassTest { outcome: false, n_cases: 2 })
        ));
        assert!(matches!(RocCurve::from_scores(&[], &[]), Err(EvalError::EmptyTestSet)));
    }
}
