//! Binary confusion matrix and the rates derived from it.

use std::fmt;

use serde::Serialize;

use crate::error::EvalError;
use crate::ratio::Ratio;

/// Counts of a binary classification against actual outcomes.
///
/// Positive means a 30-day complication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BinaryConfusion {
    /// Predicted positive, actually positive.
    pub true_positive: usize,
    /// Predicted positive, actually negative.
    pub false_positive: usize,
    /// Predicted negative, actually negative.
    pub true_negative: usize,
    /// Predicted negative, actually positive.
    pub false_negative: usize,
}

/// Rates derived from a [`BinaryConfusion`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClassificationMetrics {
    /// `(TP + TN) / n`.
    pub accuracy: Ratio,
    /// Recall of positives, `TP / (TP + FN)`.
    pub sensitivity: Ratio,
    /// Recall of negatives, `TN / (TN + FP)`.
    pub specificity: Ratio,
    /// Precision, `TP / (TP + FP)`.
    pub positive_predictive_value: Ratio,
    /// `TN / (TN + FN)`.
    pub negative_predictive_value: Ratio,
    /// `2TP / (2TP + FP + FN)`.
    pub f1: Ratio,
    /// Mean of sensitivity and specificity.
    pub balanced_accuracy: Ratio,
    /// `(TP + FN) / n`.
    pub prevalence: Ratio,
    /// `TP / n`.
    pub detection_rate: Ratio,
    /// `(TP + FP) / n`.
    pub detection_prevalence: Ratio,
    /// Cohen's kappa against chance agreement from the marginals.
    pub kappa: Ratio,
}

impl BinaryConfusion {
    /// Tally actual against predicted outcomes.
    ///
    /// # Errors
    ///
    /// | Variant                         | Condition                    |
    /// |---------------------------------|------------------------------|
    /// | [`EvalError::EmptyTestSet`]     | zero outcomes provided       |
    /// | [`EvalError::LengthMismatch`]   | slices differ in length      |
    pub fn from_outcomes(actual: &[bool], predicted: &[bool]) -> Result<Self, EvalError> {
        if actual.is_empty() {
            return Err(EvalError::EmptyTestSet);
        }
        if actual.len() != predicted.len() {
            return Err(EvalError::LengthMismatch {
                n_actual: actual.len(),
                n_predicted: predicted.len(),
            });
        }
        let mut cm = Self {
            true_positive: 0,
            false_positive: 0,
            true_negative: 0,
            false_negative: 0,
        };
        for (&a, &p) in actual.iter().zip(predicted) {
            match (a, p) {
                (true, true) => cm.true_positive += 1,
                (false, true) => cm.false_positive += 1,
                (false, false) => cm.true_negative += 1,
                (true, false) => cm.false_negative += 1,
            }
        }
        Ok(cm)
    }

    /// Total number of classified cases.
    #[must_use]
    pub fn total(&self) -> usize {
        self.true_positive + self.false_positive + self.true_negative + self.false_negative
    }

    /// Share of correct classifications.
    #[must_use]
    pub fn accuracy(&self) -> Ratio {
        Ratio::of(self.true_positive + self.true_negative, self.total())
    }

    /// Every derived rate at once.
    #[must_use]
    pub fn metrics(&self) -> ClassificationMetrics {
        let (tp, fp, tn, fn_) = (
            self.true_positive,
            self.false_positive,
            self.true_negative,
            self.false_negative,
        );
        let n = self.total();
        let sensitivity = Ratio::of(tp, tp + fn_);
        let specificity = Ratio::of(tn, tn + fp);
        let balanced_accuracy = sensitivity
            .value()
            .zip(specificity.value())
            .map(|(se, sp)| (se + sp) / 2.0)
            .into();

        ClassificationMetrics {
            accuracy: self.accuracy(),
            sensitivity,
            specificity,
            positive_predictive_value: Ratio::of(tp, tp + fp),
            negative_predictive_value: Ratio::of(tn, tn + fn_),
            f1: Ratio::of(2 * tp, 2 * tp + fp + fn_),
            balanced_accuracy,
            prevalence: Ratio::of(tp + fn_, n),
            detection_rate: Ratio::of(tp, n),
            detection_prevalence: Ratio::of(tp + fp, n),
            kappa: self.kappa(),
        }
    }

    fn kappa(&self) -> Ratio {
        let n = self.total() as f64;
        if n == 0.0 {
            return Ratio::Undefined;
        }
        let (tp, fp, tn, fn_) = (
            self.true_positive as f64,
            self.false_positive as f64,
            self.true_negative as f64,
            self.false_negative as f64,
        );
        let observed = (tp + tn) / n;
        let expected = ((tp + fp) * (tp + fn_) + (fn_ + tn) * (fp + tn)) / (n * n);
        if expected >= 1.0 {
            return Ratio::Undefined;
        }
        Ratio::Defined((observed - expected) / (1.0 - expected))
    }
}

impl fmt::Display for BinaryConfusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:>9} {:>9} {:>9}", "", "pred_neg", "pred_pos")?;
        writeln!(
            f,
            "{:>9} {:>9} {:>9}",
            "true_neg", self.true_negative, self.false_positive
        )?;
        writeln!(
            f,
            "{:>9} {:>9} {:>9}",
            "true_pos", self.false_negative, self.true_positive
        )
    }
}
