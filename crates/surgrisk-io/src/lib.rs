//! File I/O for the surgrisk pipeline: the cohort CSV and JSON result artifacts.

mod cohort_csv;
mod domain;
mod error;
mod writer;

pub use cohort_csv::{COLUMNS, CohortReader, CohortWriter};
pub use domain::ExperimentName;
pub use error::IoError;
pub use writer::ResultWriter;
