//! Scoring a model on the test cases.

use serde::Serialize;
use surgrisk_cohort::Case;
use surgrisk_model::RiskModel;
use tracing::{info, instrument, warn};

use crate::confusion::{BinaryConfusion, ClassificationMetrics};
use crate::error::EvalError;
use crate::ratio::Ratio;
use crate::roc::RocCurve;

/// Probability above which a case is classified positive.
pub const DEFAULT_THRESHOLD: f64 = 0.5;

/// One scored test case.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Prediction {
    /// Position of the case in the test slice.
    pub case_index: usize,
    /// Predicted complication probability.
    pub probability: f64,
    /// `probability > threshold`.
    pub predicted: bool,
    /// Observed outcome.
    pub actual: bool,
}

/// Everything computed for one model on one test set.
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationResult {
    /// [`RiskModel::name`] of the evaluated model.
    pub model: String,
    /// Classification threshold used.
    pub threshold: f64,
    /// Per-case scores in test order.
    pub predictions: Vec<Prediction>,
    /// ROC curve with its AUC; `None` when the test cases share one outcome.
    pub roc: Option<RocCurve>,
    /// Confusion counts at the threshold.
    pub confusion: BinaryConfusion,
    /// Rates derived from the confusion counts.
    pub metrics: ClassificationMetrics,
}

impl EvaluationResult {
    /// Area under the ROC curve, undefined without both outcome classes.
    #[must_use]
    pub fn auc(&self) -> Ratio {
        self.roc.as_ref().map(RocCurve::auc).into()
    }
}

/// Holdout evaluator.
///
/// Construct via [`Evaluator::new`]; the threshold defaults to
/// [`DEFAULT_THRESHOLD`].
#[derive(Debug, Clone)]
pub struct Evaluator {
    threshold: f64,
}

impl Evaluator {
    /// Create an evaluator with the default 0.5 threshold.
    #[must_use]
    pub fn new() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
        }
    }

    /// Set the classification threshold.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError::InvalidThreshold`] unless `threshold` is in (0.0, 1.0).
    pub fn with_threshold(mut self, threshold: f64) -> Result<Self, EvalError> {
        if !(threshold > 0.0 && threshold < 1.0) {
            return Err(EvalError::InvalidThreshold { threshold });
        }
        self.threshold = threshold;
        Ok(self)
    }

    /// Return the classification threshold.
    #[must_use]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Score `test` with `model` and summarize. Neither input is modified.
    ///
    /// A single-class test set still yields predictions, confusion counts and
    /// metrics; the ROC curve is omitted and rates over the missing class are
    /// [`Ratio::Undefined`].
    ///
    /// # Errors
    ///
    /// | Variant                                 | When                                   |
    /// |-----------------------------------------|----------------------------------------|
    /// | [`EvalError::EmptyTestSet`]             | `test` is empty                        |
    /// | [`EvalError::Model`]                    | the model rejects a case               |
    /// | [`EvalError::ProbabilityOutOfRange`]    | a score is NaN or outside [0, 1]       |
    #[instrument(skip_all, fields(model = model.name(), n_cases = test.len()))]
    pub fn evaluate<M: RiskModel + ?Sized>(
        &self,
        model: &M,
        test: &[Case],
    ) -> Result<EvaluationResult, EvalError> {
        if test.is_empty() {
            return Err(EvalError::EmptyTestSet);
        }

        let probabilities = model.predict_probabilities(test)?;
        if let Some((case_index, &value)) = probabilities
            .iter()
            .enumerate()
            .find(|(_, p)| !(0.0..=1.0).contains(*p))
        {
            return Err(EvalError::ProbabilityOutOfRange { case_index, value });
        }

        let actual: Vec<bool> = test.iter().map(|c| c.complication_30d).collect();
        let roc = match RocCurve::from_scores(&probabilities, &actual) {
            Ok(roc) => Some(roc),
            Err(EvalError::SingleClassTest { outcome, n_cases }) => {
                warn!(outcome, n_cases, "single-class test set; ROC and AUC undefined");
                None
            }
            Err(e) => return Err(e),
        };

        let predictions: Vec<Prediction> = probabilities
            .iter()
            .zip(&actual)
            .enumerate()
            .map(|(case_index, (&probability, &actual))| Prediction {
                case_index,
                probability,
                predicted: probability > self.threshold,
                actual,
            })
            .collect();
        let predicted: Vec<bool> = predictions.iter().map(|p| p.predicted).collect();
        let confusion = BinaryConfusion::from_outcomes(&actual, &predicted)?;
        let metrics = confusion.metrics();

        let auc: Ratio = roc.as_ref().map(RocCurve::auc).into();
        info!(
            auc = %auc,
            accuracy = %metrics.accuracy,
            sensitivity = %metrics.sensitivity,
            specificity = %metrics.specificity,
            "model evaluated"
        );

        Ok(EvaluationResult {
            model: model.name().to_string(),
            threshold: self.threshold,
            predictions,
            roc,
            confusion,
            metrics,
        })
    }
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

/// Evaluate at the default threshold.
///
/// # Errors
///
/// See [`Evaluator::evaluate`].
pub fn evaluate<M: RiskModel + ?Sized>(
    model: &M,
    test: &[Case],
) -> Result<EvaluationResult, EvalError> {
    Evaluator::new().evaluate(model, test)
}

#[cfg(test)]
mod tests {
    use surgrisk_cohort::{AsaClass, Case, ProcedureType};
    use surgrisk_model::{ModelError, RiskModel};

    use super::*;

    /// Scores by age, so older cases rank higher.
    struct AgeModel;

    impl RiskModel for AgeModel {
        fn name(&self) -> &'static str {
            "age"
        }

        fn predict_probability(&self, case: &Case) -> Result<f64, ModelError> {
            Ok(f64::from(case.age) / 100.0)
        }
    }

    struct BrokenModel;

    impl RiskModel for BrokenModel {
        fn name(&self) -> &'static str {
            "broken"
        }

        fn predict_probability(&self, _case: &Case) -> Result<f64, ModelError> {
            Ok(1.5)
        }
    }

    fn case(age: u32, complication_30d: bool) -> Case {
        Case {
            age,
            bmi: 27.0,
            asa_class: AsaClass::II,
            procedure_type: ProcedureType::Colectomy,
            surgery_duration_minutes: 90,
            estimated_blood_loss_ml: 100.0,
            intraoperative_event: false,
            complication_30d,
        }
    }

    fn test_set() -> Vec<Case> {
        vec![
            case(30, false),
            case(45, false),
            case(55, true),
            case(60, false),
            case(75, true),
            case(85, true),
        ]
    }

    #[test]
    fn ordered_scores_evaluated() {
        let result = evaluate(&AgeModel, &test_set()).unwrap();
        assert_eq!(result.model, "age");
        assert_eq!(result.predictions.len(), 6);
        // Positives 0.55, 0.75, 0.85 against negatives 0.30, 0.45, 0.60: 8 of 9 pairs.
        let auc = result.auc().value().unwrap();
        assert!((auc - 8.0 / 9.0).abs() < 1e-12);
        assert_eq!(result.confusion.true_positive, 3);
        assert_eq!(result.confusion.false_positive, 1);
        assert_eq!(result.confusion.total(), 6);
    }

    #[test]
    fn threshold_is_strict() {
        let cases = vec![case(50, true), case(20, false)];
        let result = evaluate(&AgeModel, &cases).unwrap();
        assert!(!result.predictions[0].predicted);
    }

    #[test]
    fn custom_threshold_applied() {
        let result = Evaluator::new()
            .with_threshold(0.7)
            .unwrap()
            .evaluate(&AgeModel, &test_set())
            .unwrap();
        assert_eq!(result.confusion.true_positive, 2);
        assert_eq!(result.confusion.false_positive, 0);
        assert!(Evaluator::new().with_threshold(1.0).is_err());
    }

    #[test]
    fn works_through_trait_object() {
        let model: Box<dyn RiskModel> = Box::new(AgeModel);
        assert!(evaluate(model.as_ref(), &test_set()).is_ok());
    }

    #[test]
    fn empty_test_set_rejected() {
        assert!(matches!(evaluate(&AgeModel, &[]), Err(EvalError::EmptyTestSet)));
    }

    #[test]
    fn single_class_test_set_reports_undefined_rates() {
        let negatives = vec![case(40, false), case(55, false), case(70, false)];
        let result = evaluate(&AgeModel, &negatives).unwrap();

        assert!(result.roc.is_none());
        assert_eq!(result.auc(), Ratio::Undefined);
        assert_eq!(result.predictions.len(), 3);
        assert_eq!(result.confusion.total(), 3);
        assert_eq!(result.confusion.false_positive, 2);
        assert_eq!(result.metrics.sensitivity, Ratio::Undefined);
        assert_eq!(result.metrics.specificity, Ratio::Defined(1.0 / 3.0));
        assert_eq!(result.metrics.accuracy, Ratio::Defined(1.0 / 3.0));
    }

    #[test]
    fn out_of_range_probability_rejected() {
        assert!(matches!(
            evaluate(&BrokenModel, &test_set()),
            Err(EvalError::ProbabilityOutOfRange { case_index: 0, .. })
        ));
    }
}
