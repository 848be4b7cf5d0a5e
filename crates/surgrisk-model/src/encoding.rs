//! Numeric encodings of a [`Case`] for the two model families.

use serde::Serialize;
use surgrisk_cohort::{Case, ProcedureType};

use crate::error::ModelError;

/// Procedure levels observed in a training set, in canonical order.
///
/// The first level is the reference for treatment coding. A level's code is
/// its position in [`CategoryMapping::levels`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryMapping {
    levels: Vec<ProcedureType>,
}

impl CategoryMapping {
    /// Collect the procedure levels present in `train`.
    #[must_use]
    pub fn fit(train: &[Case]) -> Self {
        let levels = ProcedureType::ALL
            .into_iter()
            .filter(|p| train.iter().any(|c| c.procedure_type == *p))
            .collect();
        Self { levels }
    }

    /// Observed levels in canonical order.
    #[must_use]
    pub fn levels(&self) -> &[ProcedureType] {
        &self.levels
    }

    /// The treatment-coding reference level, if any level was observed.
    #[must_use]
    pub fn reference(&self) -> Option<ProcedureType> {
        self.levels.first().copied()
    }

    /// Position of `procedure` among the observed levels.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::UnseenCategory`] if `procedure` was not observed.
    pub fn code(&self, procedure: ProcedureType) -> Result<usize, ModelError> {
        self.levels
            .iter()
            .position(|&p| p == procedure)
            .ok_or(ModelError::UnseenCategory { procedure })
    }

    /// One 0/1 indicator per non-reference level.
    fn dummies(&self, procedure: ProcedureType) -> Result<Vec<f64>, ModelError> {
        let code = self.code(procedure)?;
        Ok((1..self.levels.len())
            .map(|level| if level == code { 1.0 } else { 0.0 })
            .collect())
    }
}

/// Design column names for the logistic model.
pub(crate) fn logistic_columns(mapping: &CategoryMapping) -> Vec<String> {
    let mut names = vec!["age".to_string(), "bmi".to_string(), "asa_class".to_string()];
    names.extend(
        mapping
            .levels()
            .iter()
            .skip(1)
            .map(|p| format!("procedure_type[{p}]")),
    );
    names.extend(
        ["surgery_duration_minutes", "estimated_blood_loss_ml", "intraoperative_event"]
            .map(String::from),
    );
    names
}

/// Design row aligned with [`logistic_columns`]; no intercept column.
pub(crate) fn logistic_row(case: &Case, mapping: &CategoryMapping) -> Result<Vec<f64>, ModelError> {
    let mut row = vec![
        f64::from(case.age),
        case.bmi,
        f64::from(case.asa_class.code()),
    ];
    row.extend(mapping.dummies(case.procedure_type)?);
    row.extend([
        f64::from(case.surgery_duration_minutes),
        case.estimated_blood_loss_ml,
        event_flag(case),
    ]);
    Ok(row)
}

/// Feature names for the forest, aligned with [`forest_row`].
pub(crate) const FOREST_COLUMNS: [&str; 7] = [
    "age",
    "bmi",
    "asa_class",
    "procedure_type",
    "surgery_duration_minutes",
    "estimated_blood_loss_ml",
    "intraoperative_event",
];

/// Forest feature row; procedure enters as its mapping code.
pub(crate) fn forest_row(case: &Case, mapping: &CategoryMapping) -> Result<Vec<f64>, ModelError> {
    Ok(vec![
        f64::from(case.age),
        case.bmi,
        f64::from(case.asa_class.code()),
        mapping.code(case.procedure_type)? as f64,
        f64::from(case.surgery_duration_minutes),
        case.estimated_blood_loss_ml,
        event_flag(case),
    ])
}

fn event_flag(case: &Case) -> f64 {
    if case.intraoperative_event { 1.0 } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use surgrisk_cohort::{AsaClass, Case, ProcedureType};

    use super::*;

    fn case(procedure_type: ProcedureType) -> Case {
        Case {
            age: 70,
            bmi: 31.5,
            asa_class: AsaClass::III,
            procedure_type,
            surgery_duration_minutes: 120,
            estimated_blood_loss_ml: 250.0,
            intraoperative_event: true,
            complication_30d: false,
        }
    }

    #[test]
    fn levels_in_canonical_order() {
        let train = [
            case(ProcedureType::Gastrectomy),
            case(ProcedureType::Colectomy),
            case(ProcedureType::Gastrectomy),
        ];
        let mapping = CategoryMapping::fit(&train);
        assert_eq!(
            mapping.levels(),
            [ProcedureType::Colectomy, ProcedureType::Gastrectomy]
        );
        assert_eq!(mapping.reference(), Some(ProcedureType::Colectomy));
        assert_eq!(mapping.code(ProcedureType::Gastrectomy).unwrap(), 1);
    }

    #[test]
    fn unseen_level_rejected() {
        let mapping = CategoryMapping::fit(&[case(ProcedureType::LapChole)]);
        assert!(matches!(
            mapping.code(ProcedureType::Appendectomy),
            Err(ModelError::UnseenCategory {
                procedure: ProcedureType::Appendectomy
            })
        ));
        assert!(logistic_row(&case(ProcedureType::Appendectomy), &mapping).is_err());
        assert!(forest_row(&case(ProcedureType::Appendectomy), &mapping).is_err());
    }

    #[test]
    fn logistic_design_layout() {
        let train: Vec<Case> = ProcedureType::ALL.into_iter().map(case).collect();
        let mapping = CategoryMapping::fit(&train);
        let names = logistic_columns(&mapping);
        assert_eq!(names.len(), 10);
        assert_eq!(names[3], "procedure_type[Colectomy]");
        assert_eq!(names[9], "intraoperative_event");

        let reference = logistic_row(&case(ProcedureType::LapChole), &mapping).unwrap();
        assert_eq!(reference, [70.0, 31.5, 3.0, 0.0, 0.0, 0.0, 0.0, 120.0, 250.0, 1.0]);

        let hernia = logistic_row(&case(ProcedureType::HerniaRepair), &mapping).unwrap();
        assert_eq!(&hernia[3..7], [0.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn single_level_has_no_dummies() {
        let mapping = CategoryMapping::fit(&[case(ProcedureType::Colectomy)]);
        assert_eq!(logistic_columns(&mapping).len(), 6);
        assert_eq!(logistic_row(&case(ProcedureType::Colectomy), &mapping).unwrap().len(), 6);
    }

    #[test]
    fn forest_row_uses_mapping_code() {
        let train = [case(ProcedureType::Colectomy), case(ProcedureType::Gastrectomy)];
        let mapping = CategoryMapping::fit(&train);
        let row = forest_row(&case(ProcedureType::Gastrectomy), &mapping).unwrap();
        assert_eq!(row.len(), FOREST_COLUMNS.len());
        assert_eq!(row[3], 1.0);
        assert_eq!(row[2], 3.0);
        assert_eq!(row[6], 1.0);
    }
}
