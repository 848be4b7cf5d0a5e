use crate::case::Case;

/// An ordered, immutable collection of generated or loaded cases.
#[derive(Debug, Clone, PartialEq)]
pub struct Cohort {
    cases: Vec<Case>,
}

impl Cohort {
    /// Wrap an ordered sequence of cases.
    #[must_use]
    pub fn new(cases: Vec<Case>) -> Self {
        Self { cases }
    }

    /// Borrow the cases in insertion order.
    #[must_use]
    pub fn cases(&self) -> &[Case] {
        &self.cases
    }

    /// Consume the cohort and return its cases.
    #[must_use]
    pub fn into_cases(self) -> Vec<Case> {
        self.cases
    }

    /// Return the number of cases.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cases.len()
    }

    /// Return `true` if the cohort holds no cases.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    /// Number of cases with a 30-day complication.
    #[must_use]
    pub fn n_complications(&self) -> usize {
        self.cases.iter().filter(|c| c.complication_30d).count()
    }

    /// Fraction of cases with a 30-day complication, `None` when empty.
    #[must_use]
    pub fn prevalence(&self) -> Option<f64> {
        if self.cases.is_empty() {
            None
        } else {
            Some(self.n_complications() as f64 / self.cases.len() as f64)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::case::{AsaClass, ProcedureType};

    fn case(outcome: bool) -> Case {
        Case {
            age: 50,
            bmi: 25.0,
            asa_class: AsaClass::I,
            procedure_type: ProcedureType::Appendectomy,
            surgery_duration_minutes: 60,
            estimated_blood_loss_ml: 50.0,
            intraoperative_event: false,
            complication_30d: outcome,
        }
    }

    #[test]
    fn prevalence_counts_positives() {
        let cohort = Cohort::new(vec![case(true), case(false), case(false), case(false)]);
        assert_eq!(cohort.n_complications(), 1);
        assert_eq!(cohort.prevalence(), Some(0.25));
    }

    #[test]
    fn empty_cohort_has_no_prevalence() {
        let cohort = Cohort::new(vec![]);
        assert!(cohort.is_empty());
        assert_eq!(cohort.prevalence(), None);
    }
}
