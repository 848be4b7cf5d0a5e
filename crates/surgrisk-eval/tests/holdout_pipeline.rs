//! Generate, split, fit and evaluate end to end with the default seed.

use surgrisk_cohort::{Case, CohortConfig, SplitConfig};
use surgrisk_eval::{EvaluationResult, Ratio, evaluate};
use surgrisk_model::{ForestRiskConfig, LogisticRiskConfig, RiskFitter, RiskModel};

fn split() -> (Vec<Case>, Vec<Case>) {
    let cohort = CohortConfig::new(1000).unwrap().with_seed(38).generate().unwrap();
    let partition = SplitConfig::new(0.8).unwrap().with_seed(38).split(&cohort).unwrap();
    (partition.train().to_vec(), partition.test().to_vec())
}

fn check_invariants(result: &EvaluationResult, test: &[Case]) {
    assert_eq!(result.confusion.total(), test.len());

    let correct = result
        .predictions
        .iter()
        .filter(|p| p.predicted == p.actual)
        .count();
    assert_eq!(
        result.metrics.accuracy,
        Ratio::Defined(correct as f64 / test.len() as f64)
    );

    let pts = result.roc.as_ref().unwrap().points();
    let first = pts[0];
    let last = pts[pts.len() - 1];
    assert_eq!((first.false_positive_rate, first.true_positive_rate), (0.0, 0.0));
    assert_eq!((last.false_positive_rate, last.true_positive_rate), (1.0, 1.0));
    for w in pts.windows(2) {
        assert!(w[1].false_positive_rate >= w[0].false_positive_rate);
        assert!(w[1].true_positive_rate >= w[0].true_positive_rate);
    }
    assert!((0.0..=1.0).contains(&result.auc().value().unwrap()));
}

#[test]
fn logistic_beats_chance_on_holdout() {
    let (train, test) = split();
    let model = LogisticRiskConfig::new().fit(&train).unwrap();
    let result = evaluate(&model, &test).unwrap();
    check_invariants(&result, &test);
    let auc = result.auc().value().unwrap();
    assert!(auc > 0.5, "logistic AUC = {auc}");
}

#[test]
fn forest_evaluates_with_same_contract() {
    let (train, test) = split();
    let model = ForestRiskConfig::new(150).unwrap().with_seed(38).fit(&train).unwrap();
    let result = evaluate(&model, &test).unwrap();
    check_invariants(&result, &test);
    assert_eq!(result.model, model.name());
}

#[test]
fn evaluation_leaves_inputs_untouched() {
    let (train, test) = split();
    let before = test.clone();
    let model = LogisticRiskConfig::new().fit(&train).unwrap();
    let first = model.predict_probabilities(&test).unwrap();
    let _ = evaluate(&model, &test).unwrap();
    assert_eq!(test, before);
    assert_eq!(model.predict_probabilities(&test).unwrap(), first);
}

#[test]
fn result_serializes_with_undefined_sentinel() {
    let (train, test) = split();
    let model = LogisticRiskConfig::new().fit(&train).unwrap();
    let result = evaluate(&model, &test).unwrap();
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["model"], "logistic_regression");
    assert!(json["roc"]["points"].as_array().unwrap().len() >= 2);
    let ppv = &json["metrics"]["positive_predictive_value"];
    assert!(ppv.is_number() || ppv == "undefined");
}

#[test]
fn negatives_only_test_set_still_evaluated() {
    let (train, test) = split();
    let negatives: Vec<Case> = test.into_iter().filter(|c| !c.complication_30d).collect();
    let model = LogisticRiskConfig::new().fit(&train).unwrap();

    let result = evaluate(&model, &negatives).unwrap();
    assert!(result.roc.is_none());
    assert_eq!(result.auc(), Ratio::Undefined);
    assert_eq!(result.predictions.len(), negatives.len());
    assert_eq!(result.confusion.total(), negatives.len());
    assert_eq!(result.confusion.true_positive + result.confusion.false_negative, 0);
    assert_eq!(result.metrics.sensitivity, Ratio::Undefined);
    assert!(result.metrics.specificity.is_defined());

    let json = serde_json::to_value(&result).unwrap();
    assert!(json["roc"].is_null());
    assert_eq!(json["metrics"]["sensitivity"], "undefined");
}
