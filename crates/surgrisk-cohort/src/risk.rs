//! Ground-truth complication risk used to draw the generated outcome.
//!
//! ASA class enters as its numeric code (1..=5) and the intraoperative
//! event flag as 0/1.

use crate::case::Case;

/// Baseline log-odds at the reference profile.
pub const INTERCEPT: f64 = -3.5;

/// Log-odds per year of age above 60.
pub const AGE_EFFECT: f64 = 0.03;

/// Log-odds per BMI unit above 27.
pub const BMI_EFFECT: f64 = 0.05;

/// Log-odds per ASA class above II.
pub const ASA_EFFECT: f64 = 0.4;

/// Log-odds per operative minute above 90.
pub const DURATION_EFFECT: f64 = 0.005;

/// Log-odds per millilitre of blood loss above 100.
pub const BLOOD_LOSS_EFFECT: f64 = 0.002;

/// Log-odds added by an intraoperative event.
pub const EVENT_EFFECT: f64 = 1.0;

/// Linear log-odds of a 30-day complication for `case`.
#[must_use]
pub fn log_odds(case: &Case) -> f64 {
    INTERCEPT
        + AGE_EFFECT * (f64::from(case.age) - 60.0)
        + BMI_EFFECT * (case.bmi - 27.0)
        + ASA_EFFECT * (f64::from(case.asa_class.code()) - 2.0)
        + DURATION_EFFECT * (f64::from(case.surgery_duration_minutes) - 90.0)
        + BLOOD_LOSS_EFFECT * (case.estimated_blood_loss_ml - 100.0)
        + EVENT_EFFECT * f64::from(u8::from(case.intraoperative_event))
}

/// Standard logistic transform.
#[must_use]
pub fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

/// True probability of a 30-day complication for `case`.
#[must_use]
pub fn complication_probability(case: &Case) -> f64 {
    sigmoid(log_odds(case))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::case::{AsaClass, ProcedureType};

    fn reference_case() -> Case {
        Case {
            age: 60,
            bmi: 27.0,
            asa_class: AsaClass::II,
            procedure_type: ProcedureType::LapChole,
            surgery_duration_minutes: 90,
            estimated_blood_loss_ml: 100.0,
            intraoperative_event: false,
            complication_30d: false,
        }
    }

    #[test]
    fn reference_profile_is_intercept() {
        assert!((log_odds(&reference_case()) - INTERCEPT).abs() < 1e-12);
    }

    #[test]
    fn each_term_contributes() {
        let case = Case {
            age: 70,
            bmi: 32.0,
            asa_class: AsaClass::IV,
            surgery_duration_minutes: 190,
            estimated_blood_loss_ml: 600.0,
            intraoperative_event: true,
            ..reference_case()
        };
        // -3.5 + 0.3 + 0.25 + 0.8 + 0.5 + 1.0 + 1.0
        assert!((log_odds(&case) - 0.35).abs() < 1e-12);
    }

    #[test]
    fn procedure_does_not_enter_risk() {
        let a = reference_case();
        let b = Case {
            procedure_type: ProcedureType::Gastrectomy,
            ..reference_case()
        };
        assert_eq!(log_odds(&a), log_odds(&b));
    }

    #[test]
    fn sigmoid_midpoint_and_bounds() {
        assert!((sigmoid(0.0) - 0.5).abs() < f64::EPSILON);
        assert!(sigmoid(-40.0) > 0.0);
        assert!(sigmoid(40.0) <= 1.0);
    }

    #[test]
    fn probability_increases_with_event() {
        let base = reference_case();
        let with_event = Case {
            intraoperative_event: true,
            ..reference_case()
        };
        assert!(complication_probability(&with_event) > complication_probability(&base));
    }
}
