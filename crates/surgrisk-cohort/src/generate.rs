//! Seeded cohort synthesis.

use rand::distributions::{Distribution, WeightedIndex};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use statrs::distribution::{LogNormal, Normal};
use tracing::{debug, info, instrument};

use crate::case::{AsaClass, Case, ProcedureType};
use crate::cohort::Cohort;
use crate::config::CohortConfig;
use crate::error::CohortError;
use crate::risk;

const AGE_RANGE: (f64, f64) = (18.0, 90.0);
const BMI_RANGE: (f64, f64) = (15.0, 50.0);
const MAX_BLOOD_LOSS_ML: f64 = 2000.0;
const INTRAOP_EVENT_RATE: f64 = 0.15;

fn invalid(distribution: &'static str, err: impl std::fmt::Display) -> CohortError {
    CohortError::Distribution {
        distribution,
        reason: err.to_string(),
    }
}

/// Per-feature sampling distributions, built once per run.
struct Samplers {
    age: Normal,
    bmi: Normal,
    asa: WeightedIndex<f64>,
    procedure: WeightedIndex<f64>,
    duration: LogNormal,
    blood_loss: LogNormal,
}

impl Samplers {
    fn new() -> Result<Self, CohortError> {
        Ok(Self {
            age: Normal::new(60.0, 15.0).map_err(|e| invalid("age", e))?,
            bmi: Normal::new(27.0, 5.0).map_err(|e| invalid("bmi", e))?,
            asa: WeightedIndex::new(AsaClass::WEIGHTS).map_err(|e| invalid("asa_class", e))?,
            procedure: WeightedIndex::new(ProcedureType::WEIGHTS)
                .map_err(|e| invalid("procedure_type", e))?,
            duration: LogNormal::new(90.0_f64.ln(), 0.4)
                .map_err(|e| invalid("surgery_duration", e))?,
            blood_loss: LogNormal::new(100.0_f64.ln(), 0.7)
                .map_err(|e| invalid("blood_loss", e))?,
        })
    }

    /// Draw one case. Draw order is fixed so a seed pins the whole cohort.
    fn draw(&self, rng: &mut impl Rng) -> Case {
        let age = self.age.sample(rng).round().clamp(AGE_RANGE.0, AGE_RANGE.1) as u32;
        let bmi = ((self.bmi.sample(rng) * 10.0).round() / 10.0).clamp(BMI_RANGE.0, BMI_RANGE.1);
        let asa_class = AsaClass::ALL[self.asa.sample(rng)];
        let procedure_type = ProcedureType::ALL[self.procedure.sample(rng)];
        let surgery_duration_minutes = self.duration.sample(rng).round().max(1.0) as u32;
        let estimated_blood_loss_ml = self.blood_loss.sample(rng).round().min(MAX_BLOOD_LOSS_ML);
        let intraoperative_event = rng.gen_bool(INTRAOP_EVENT_RATE);

        let mut case = Case {
            age,
            bmi,
            asa_class,
            procedure_type,
            surgery_duration_minutes,
            estimated_blood_loss_ml,
            intraoperative_event,
            complication_30d: false,
        };
        case.complication_30d = rng.gen_bool(risk::complication_probability(&case));
        case
    }
}

/// Generate a cohort from the config.
#[instrument(skip_all, fields(n_cases = config.n_cases, seed = config.seed))]
pub(crate) fn generate(config: &CohortConfig) -> Result<Cohort, CohortError> {
    let samplers = Samplers::new()?;
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);

    let cases: Vec<Case> = (0..config.n_cases).map(|_| samplers.draw(&mut rng)).collect();
    debug!(n_generated = cases.len(), "cases drawn");

    let cohort = Cohort::new(cases);
    info!(
        n_cases = cohort.len(),
        n_complications = cohort.n_complications(),
        prevalence = cohort.prevalence(),
        "cohort generated"
    );
    Ok(cohort)
}
