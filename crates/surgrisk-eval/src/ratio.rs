use std::fmt;

use serde::{Serialize, Serializer};

/// A rate that may be undefined because its denominator is zero.
///
/// Serializes as a JSON number, or as the string `"undefined"`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Ratio {
    /// A finite value.
    Defined(f64),
    /// The denominator was zero.
    Undefined,
}

impl Ratio {
    /// `numerator / denominator`, or `Undefined` when the denominator is zero.
    #[must_use]
    pub fn of(numerator: usize, denominator: usize) -> Self {
        if denominator == 0 {
            Ratio::Undefined
        } else {
            Ratio::Defined(numerator as f64 / denominator as f64)
        }
    }

    /// Return the value, if defined.
    #[must_use]
    pub fn value(self) -> Option<f64> {
        match self {
            Ratio::Defined(v) => Some(v),
            Ratio::Undefined => None,
        }
    }

    /// Return `true` if the ratio is defined.
    #[must_use]
    pub fn is_defined(self) -> bool {
        matches!(self, Ratio::Defined(_))
    }
}

impl From<Option<f64>> for Ratio {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Ratio::Undefined, Ratio::Defined)
    }
}

impl fmt::Display for Ratio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ratio::Defined(v) => write!(f, "{v:.4}"),
            Ratio::Undefined => f.write_str("undefined"),
        }
    }
}

impl Serialize for Ratio {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Ratio::Defined(v) => serializer.serialize_f64(*v),
            Ratio::Undefined => serializer.serialize_str("undefined"),
        }
    }
}
