use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::info;

use surgrisk_cohort::{Cohort, CohortConfig, SplitConfig};
use surgrisk_eval::{Evaluator, Ratio};
use surgrisk_io::{CohortReader, CohortWriter, ExperimentName, ResultWriter};
use surgrisk_model::{ForestRiskConfig, LogisticRiskConfig, RiskFitter};
use surgrisk_rf::{DEFAULT_N_TREES, MaxFeatures, OobMode, SplitCriterion};

#[derive(Parser)]
#[command(name = "surgrisk")]
#[command(about = "Synthetic surgical cohorts and 30-day complication risk models")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// RNG seed for generation, splitting and forest training
    #[arg(long, default_value_t = 38, global = true)]
    seed: u64,

    /// Enable verbose (debug-level) logging
    #[arg(long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(long, global = true)]
    quiet: bool,

    /// Number of threads for forest training and scoring (defaults to all cores)
    #[arg(long, global = true)]
    threads: Option<usize>,
}

/// Split, model and evaluation parameters shared by `analyze` and `run`.
#[derive(Args, Debug, Clone)]
struct AnalysisArgs {
    /// Experiment name for output files (must match [a-zA-Z0-9_-]+)
    #[arg(long, default_value = "surgrisk")]
    experiment: String,

    /// Output directory for result files
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    /// Fraction of cases assigned to the training set
    #[arg(long, default_value_t = SplitConfig::DEFAULT_TRAIN_FRACTION)]
    train_fraction: f64,

    /// Number of trees in the random forest
    #[arg(long, default_value_t = DEFAULT_N_TREES)]
    n_trees: usize,

    /// Maximum tree depth (unlimited if not set)
    #[arg(long)]
    max_depth: Option<usize>,

    /// Features drawn as split candidates at each node
    #[arg(long, value_enum, default_value_t = FeatureSubset::Sqrt)]
    max_features: FeatureSubset,

    /// Node impurity measure for forest splits
    #[arg(long, value_enum, default_value_t = Criterion::Gini)]
    criterion: Criterion,

    /// Bootstrap draws per tree as a share of the training set, in (0, 1]
    #[arg(long, default_value_t = 1.0)]
    bootstrap_fraction: f64,

    /// Confidence level for odds-ratio intervals
    #[arg(long, default_value_t = 0.95)]
    confidence_level: f64,

    /// Probability above which a case is classified as a complication
    #[arg(long, default_value_t = surgrisk_eval::DEFAULT_THRESHOLD)]
    threshold: f64,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum FeatureSubset {
    Sqrt,
    Log2,
    All,
}

impl From<FeatureSubset> for MaxFeatures {
    fn from(f: FeatureSubset) -> Self {
        match f {
            FeatureSubset::Sqrt => MaxFeatures::Sqrt,
            FeatureSubset::Log2 => MaxFeatures::Log2,
            FeatureSubset::All => MaxFeatures::All,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum Criterion {
    Gini,
    Entropy,
}

impl From<Criterion> for SplitCriterion {
    fn from(c: Criterion) -> Self {
        match c {
            Criterion::Gini => SplitCriterion::Gini,
            Criterion::Entropy => SplitCriterion::Entropy,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Generate a synthetic cohort and write it as CSV
    Generate {
        /// Number of cases to simulate
        #[arg(long, default_value_t = CohortConfig::DEFAULT_N_CASES)]
        n_cases: usize,

        /// Destination CSV file
        #[arg(long)]
        output: PathBuf,
    },

    /// Fit and evaluate both risk models on an existing cohort CSV
    Analyze {
        /// Path to the cohort CSV file
        #[arg(long)]
        data: PathBuf,

        #[command(flatten)]
        analysis: AnalysisArgs,
    },

    /// Generate a cohort, save it, then analyze it
    Run {
        /// Number of cases to simulate
        #[arg(long, default_value_t = CohortConfig::DEFAULT_N_CASES)]
        n_cases: usize,

        #[command(flatten)]
        analysis: AnalysisArgs,
    },
}

// --- JSON stdout output structs ---

#[derive(Serialize)]
struct GenerateOutput {
    path: PathBuf,
    seed: u64,
    n_cases: usize,
    n_complications: usize,
    prevalence: Option<f64>,
}

#[derive(Serialize)]
struct AnalysisOutput {
    experiment: String,
    seed: u64,
    n_cases: usize,
    n_train: usize,
    n_test: usize,
    models: Vec<ModelOutput>,
    artifacts: Vec<PathBuf>,
}

#[derive(Serialize)]
struct ModelOutput {
    model: String,
    auc: Ratio,
    accuracy: Ratio,
    sensitivity: Ratio,
    specificity: Ratio,
}

fn generate_cohort(n_cases: usize, seed: u64) -> Result<Cohort> {
    CohortConfig::new(n_cases)
        .context("invalid cohort size")?
        .with_seed(seed)
        .generate()
        .context("cohort generation failed")
}

fn result_writer(args: &AnalysisArgs) -> Result<ResultWriter> {
    let experiment = ExperimentName::new(args.experiment.clone())?;
    ResultWriter::new(&args.output_dir, experiment).context("failed to prepare output directory")
}

fn analyze(
    cohort: &Cohort,
    args: &AnalysisArgs,
    writer: &ResultWriter,
    seed: u64,
) -> Result<AnalysisOutput> {
    let evaluator = Evaluator::new()
        .with_threshold(args.threshold)
        .context("invalid classification threshold")?;

    // 1. Stratified split
    let partition = SplitConfig::new(args.train_fraction)
        .context("invalid train fraction")?
        .with_seed(seed)
        .split(cohort)
        .context("train/test split failed")?;

    // 2. Fit both models on the training subset
    let logistic = LogisticRiskConfig::new()
        .with_confidence_level(args.confidence_level)
        .fit(partition.train())
        .context("logistic regression fit failed")?;
    let forest = ForestRiskConfig::new(args.n_trees)
        .context("invalid forest configuration")?
        .with_seed(seed)
        .with_max_depth(args.max_depth)
        .with_max_features(args.max_features.into())
        .with_criterion(args.criterion.into())
        .with_bootstrap_fraction(args.bootstrap_fraction)
        .with_oob_mode(OobMode::Enabled)
        .fit(partition.train())
        .context("random forest fit failed")?;

    // 3. Evaluate on the held-out subset
    let results = vec![
        evaluator
            .evaluate(&logistic, partition.test())
            .context("logistic regression evaluation failed")?,
        evaluator
            .evaluate(&forest, partition.test())
            .context("random forest evaluation failed")?,
    ];

    // 4. Write artifacts
    let artifacts = vec![
        writer.write_cohort(cohort, &partition, seed)?,
        writer.write_logistic(&logistic)?,
        writer.write_forest(&forest)?,
        writer.write_evaluation(&results)?,
    ];

    Ok(AnalysisOutput {
        experiment: args.experiment.clone(),
        seed,
        n_cases: cohort.len(),
        n_train: partition.train().len(),
        n_test: partition.test().len(),
        models: results
            .iter()
            .map(|r| ModelOutput {
                model: r.model.clone(),
                auc: r.auc(),
                accuracy: r.metrics.accuracy,
                sensitivity: r.metrics.sensitivity,
                specificity: r.metrics.specificity,
            })
            .collect(),
        artifacts,
    })
}

fn write_cohort(cohort: &Cohort, path: &Path) -> Result<()> {
    CohortWriter::new(path)
        .write(cohort)
        .with_context(|| format!("failed to write cohort CSV to {}", path.display()))
}

/// Generate, save the cohort CSV, then analyze. The CSV is kept when the
/// analysis fails.
fn run(n_cases: usize, args: &AnalysisArgs, seed: u64) -> Result<AnalysisOutput> {
    let writer = result_writer(args)?;
    let cohort = generate_cohort(n_cases, seed)?;
    let csv_path = writer
        .write_cohort_csv(&cohort)
        .context("failed to write cohort CSV")?;

    let mut summary = analyze(&cohort, args, &writer, seed)
        .with_context(|| format!("analysis failed; cohort kept at {}", csv_path.display()))?;
    summary.artifacts.insert(0, csv_path);
    Ok(summary)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match (cli.verbose, cli.quiet) {
        (true, _) => "debug",
        (_, true) => "error",
        _ => "info",
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to configure thread pool")?;
        info!(threads, "thread pool configured");
    }

    match cli.command {
        Command::Generate { n_cases, output } => {
            let cohort = generate_cohort(n_cases, cli.seed)?;
            write_cohort(&cohort, &output)?;

            let summary = GenerateOutput {
                path: output,
                seed: cli.seed,
                n_cases: cohort.len(),
                n_complications: cohort.n_complications(),
                prevalence: cohort.prevalence(),
            };
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }

        Command::Analyze { data, analysis } => {
            let cohort = CohortReader::new(&data)
                .read()
                .context("failed to read cohort CSV")?;
            let writer = result_writer(&analysis)?;
            let summary = analyze(&cohort, &analysis, &writer, cli.seed)?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }

        Command::Run { n_cases, analysis } => {
            let summary = run(n_cases, &analysis, cli.seed)?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }

    Ok(())
}
