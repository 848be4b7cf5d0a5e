//! The simulated patient-encounter record and its categorical fields.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// American Society of Anesthesiologists physical status class.
///
/// Ordinal: the numeric code (1..=5) is used wherever the class enters a
/// numeric formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AsaClass {
    /// ASA I: healthy patient.
    I,
    /// ASA II: mild systemic disease.
    II,
    /// ASA III: severe systemic disease.
    III,
    /// ASA IV: severe systemic disease that is a constant threat to life.
    IV,
    /// ASA V: moribund patient.
    V,
}

impl AsaClass {
    /// All classes in ordinal order.
    pub const ALL: [AsaClass; 5] = [Self::I, Self::II, Self::III, Self::IV, Self::V];

    /// Sampling weights aligned with [`AsaClass::ALL`].
    pub const WEIGHTS: [f64; 5] = [0.10, 0.30, 0.40, 0.15, 0.05];

    /// Return the numeric code (1..=5).
    #[must_use]
    pub fn code(self) -> u8 {
        match self {
            Self::I => 1,
            Self::II => 2,
            Self::III => 3,
            Self::IV => 4,
            Self::V => 5,
        }
    }

    /// Parse a numeric code, returning `None` outside 1..=5.
    #[must_use]
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(usize::from(code).checked_sub(1)?).copied()
    }
}

impl fmt::Display for AsaClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Surgical procedure performed during the encounter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ProcedureType {
    /// Laparoscopic cholecystectomy.
    LapChole,
    /// Colectomy.
    Colectomy,
    /// Hernia repair.
    HerniaRepair,
    /// Appendectomy.
    Appendectomy,
    /// Gastrectomy.
    Gastrectomy,
}

impl ProcedureType {
    /// All procedure types in canonical order.
    pub const ALL: [ProcedureType; 5] = [
        Self::LapChole,
        Self::Colectomy,
        Self::HerniaRepair,
        Self::Appendectomy,
        Self::Gastrectomy,
    ];

    /// Sampling weights aligned with [`ProcedureType::ALL`].
    pub const WEIGHTS: [f64; 5] = [0.30, 0.25, 0.20, 0.15, 0.10];

    /// Return the human-readable label used in the dataset file.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::LapChole => "Lap Chole",
            Self::Colectomy => "Colectomy",
            Self::HerniaRepair => "Hernia Repair",
            Self::Appendectomy => "Appendectomy",
            Self::Gastrectomy => "Gastrectomy",
        }
    }
}

impl fmt::Display for ProcedureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ProcedureType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.label() == s.trim())
            .ok_or_else(|| s.to_string())
    }
}

/// One simulated patient-encounter record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Case {
    /// Age in whole years, in [18, 90].
    pub age: u32,
    /// Body-mass index with one decimal, in [15.0, 50.0].
    pub bmi: f64,
    /// ASA physical status class.
    pub asa_class: AsaClass,
    /// Procedure performed.
    pub procedure_type: ProcedureType,
    /// Operative time in whole minutes (at least 1).
    pub surgery_duration_minutes: u32,
    /// Estimated blood loss in millilitres, in [0, 2000].
    pub estimated_blood_loss_ml: f64,
    /// Whether an intraoperative adverse event occurred.
    pub intraoperative_event: bool,
    /// Whether a complication occurred within 30 days.
    pub complication_30d: bool,
}
