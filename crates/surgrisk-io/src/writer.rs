//! JSON result artifacts for one analysis run.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use surgrisk_cohort::{Cohort, Partition, ProcedureType, StratumFallback};
use surgrisk_eval::{
    BinaryConfusion, ClassificationMetrics, EvaluationResult, Prediction, Ratio, RocCurve, RocPoint,
};
use surgrisk_glm::Coefficient;
use surgrisk_model::{ForestRiskModel, LogisticRiskModel};
use surgrisk_rf::{OobScore, RankedFeature, TrainingMetadata};
use tracing::{debug, info, instrument};

use crate::IoError;
use crate::cohort_csv::CohortWriter;
use crate::domain::ExperimentName;

/// Writes per-run result artifacts as pretty-printed JSON.
///
/// Creates the output directory on construction if it does not exist.
/// Output files are named `{experiment}_cohort.csv`, `{experiment}_cohort.json`,
/// `{experiment}_logistic.json`, `{experiment}_forest.json` and
/// `{experiment}_evaluation.json`.
pub struct ResultWriter {
    output_dir: PathBuf,
    experiment: ExperimentName,
}

impl ResultWriter {
    /// Create a new writer targeting the given directory and experiment name.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::OutputDirCreate`] if the directory cannot be created.
    #[instrument(skip_all, fields(dir = %output_dir.display(), experiment = %experiment))]
    pub fn new(output_dir: &Path, experiment: ExperimentName) -> Result<Self, IoError> {
        fs::create_dir_all(output_dir).map_err(|e| IoError::OutputDirCreate {
            path: output_dir.to_path_buf(),
            source: e,
        })?;
        debug!("output directory ready");
        Ok(Self {
            output_dir: output_dir.to_path_buf(),
            experiment,
        })
    }

    /// Directory the artifacts are written to.
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// The generated cases themselves to `{experiment}_cohort.csv`.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::WriteCsv`] or [`IoError::WriteFile`].
    #[instrument(skip_all, fields(n_cases = cohort.len()))]
    pub fn write_cohort_csv(&self, cohort: &Cohort) -> Result<PathBuf, IoError> {
        let path = self.artifact_path("cohort", "csv");
        CohortWriter::new(&path).write(cohort)?;
        Ok(path)
    }

    /// Cohort size, prevalence, seed and split summary to `{experiment}_cohort.json`.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Serialize`] or [`IoError::WriteFile`].
    #[instrument(skip_all)]
    pub fn write_cohort(
        &self,
        cohort: &Cohort,
        partition: &Partition,
        seed: u64,
    ) -> Result<PathBuf, IoError> {
        let artifact = CohortArtifact {
            experiment: self.experiment.as_str(),
            seed,
            n_cases: cohort.len(),
            n_complications: cohort.n_complications(),
            prevalence: cohort.prevalence(),
            split: SplitSummary {
                n_train: partition.train().len(),
                n_test: partition.test().len(),
                train_complications: partition.train().iter().filter(|c| c.complication_30d).count(),
                test_complications: partition.test().iter().filter(|c| c.complication_30d).count(),
                fallbacks: partition.fallbacks().iter().map(FallbackEntry::from).collect(),
            },
        };
        self.write_json("cohort", &artifact)
    }

    /// Coefficient table and fit diagnostics to `{experiment}_logistic.json`.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Serialize`] or [`IoError::WriteFile`].
    #[instrument(skip_all)]
    pub fn write_logistic(&self, model: &LogisticRiskModel) -> Result<PathBuf, IoError> {
        let fit = model.fit();
        let artifact = LogisticArtifact {
            experiment: self.experiment.as_str(),
            reference_procedure: model.mapping().reference(),
            confidence_level: fit.confidence_level(),
            n_samples: fit.n_samples(),
            converged: fit.converged(),
            iterations: fit.iterations(),
            log_likelihood: fit.log_likelihood(),
            null_deviance: fit.null_deviance(),
            deviance: fit.deviance(),
            aic: fit.aic(),
            intercept: fit.intercept(),
            coefficients: model.odds_ratios(),
        };
        self.write_json("logistic", &artifact)
    }

    /// Ranked importances and out-of-bag score to `{experiment}_forest.json`.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Serialize`] or [`IoError::WriteFile`].
    #[instrument(skip_all)]
    pub fn write_forest(&self, model: &ForestRiskModel) -> Result<PathBuf, IoError> {
        let artifact = ForestArtifact {
            experiment: self.experiment.as_str(),
            n_trees: model.forest().n_trees(),
            procedure_levels: model.mapping().levels(),
            training: model.metadata(),
            importances: model.importances(),
            oob: model.oob_score(),
        };
        self.write_json("forest", &artifact)
    }

    /// Per-model holdout evaluation to `{experiment}_evaluation.json`.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Serialize`] or [`IoError::WriteFile`].
    #[instrument(skip_all, fields(n_models = results.len()))]
    pub fn write_evaluation(&self, results: &[EvaluationResult]) -> Result<PathBuf, IoError> {
        let models: Vec<ModelEvaluation<'_>> = results
            .iter()
            .map(|r| ModelEvaluation {
                model: &r.model,
                threshold: r.threshold,
                auc: r.auc(),
                confusion: &r.confusion,
                metrics: &r.metrics,
                roc: r.roc.as_ref().map(RocCurve::points),
                predictions: &r.predictions,
            })
            .collect();
        let artifact = EvaluationArtifact {
            experiment: self.experiment.as_str(),
            models,
        };
        self.write_json("evaluation", &artifact)
    }

    fn artifact_path(&self, kind: &str, extension: &str) -> PathBuf {
        self.output_dir
            .join(format!("{}_{kind}.{extension}", self.experiment.as_str()))
    }

    fn write_json<T: Serialize>(&self, kind: &str, artifact: &T) -> Result<PathBuf, IoError> {
        let path = self.artifact_path(kind, "json");
        let json = serde_json::to_string_pretty(artifact).map_err(|e| IoError::Serialize {
            path: path.clone(),
            source: e,
        })?;
        fs::write(&path, json).map_err(|e| IoError::WriteFile {
            path: path.clone(),
            source: e,
        })?;

        info!(path = %path.display(), kind, "artifact written");
        Ok(path)
    }
}

// Artifact shapes, borrowed from the results they describe.

#[derive(Serialize)]
struct CohortArtifact<'a> {
    experiment: &'a str,
    seed: u64,
    n_cases: usize,
    n_complications: usize,
    prevalence: Option<f64>,
    split: SplitSummary,
}

#[derive(Serialize)]
struct SplitSummary {
    n_train: usize,
    n_test: usize,
    train_complications: usize,
    test_complications: usize,
    fallbacks: Vec<FallbackEntry>,
}

#[derive(Serialize)]
struct FallbackEntry {
    outcome: bool,
    n_cases: usize,
    requested_train: usize,
    applied_train: usize,
}

impl From<&StratumFallback> for FallbackEntry {
    fn from(f: &StratumFallback) -> Self {
        Self {
            outcome: f.outcome,
            n_cases: f.n_cases,
            requested_train: f.requested_train,
            applied_train: f.applied_train,
        }
    }
}

#[derive(Serialize)]
struct LogisticArtifact<'a> {
    experiment: &'a str,
    reference_procedure: Option<ProcedureType>,
    confidence_level: f64,
    n_samples: usize,
    converged: bool,
    iterations: usize,
    log_likelihood: f64,
    null_deviance: f64,
    deviance: f64,
    aic: f64,
    intercept: &'a Coefficient,
    coefficients: &'a [Coefficient],
}

#[derive(Serialize)]
struct ForestArtifact<'a> {
    experiment: &'a str,
    n_trees: usize,
    procedure_levels: &'a [ProcedureType],
    training: &'a TrainingMetadata,
    importances: &'a [RankedFeature],
    oob: Option<&'a OobScore>,
}

#[derive(Serialize)]
struct EvaluationArtifact<'a> {
    experiment: &'a str,
    models: Vec<ModelEvaluation<'a>>,
}

#[derive(Serialize)]
struct ModelEvaluation<'a> {
    model: &'a str,
    threshold: f64,
    auc: Ratio,
    confusion: &'a BinaryConfusion,
    metrics: &'a ClassificationMetrics,
    roc: Option<&'a [RocPoint]>,
    predictions: &'a [Prediction],
}
