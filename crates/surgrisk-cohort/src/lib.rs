//! Synthetic surgical cohort: generation, ground-truth risk, and partitioning.
//!
//! Provides the [`Case`] record, a seeded [`CohortConfig`] generator whose
//! 30-day complication outcome is drawn from a known logistic risk function,
//! and a stratified [`SplitConfig`] train/test partitioner.

mod case;
mod cohort;
mod config;
mod error;
mod generate;
mod partition;
pub mod risk;

pub use case::{AsaClass, Case, ProcedureType};
pub use cohort::Cohort;
pub use config::CohortConfig;
pub use error::CohortError;
pub use partition::{Partition, SplitConfig, StratumFallback};
