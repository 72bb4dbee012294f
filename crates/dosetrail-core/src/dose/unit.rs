//! Dose units and quantity normalization.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unit a dose quantity is recorded in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DoseUnit {
    Microgram,
    Milligram,
    Gram,
    Milliliter,
    Drop,
    Piece,
    Other(String),
}

impl DoseUnit {
    /// Parse a unit symbol. Unknown symbols are kept verbatim as `Other`.
    pub fn parse(symbol: &str) -> Self {
        let trimmed = symbol.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "mcg" | "ug" | "µg" | "μg" | "microgram" | "micrograms" => Self::Microgram,
            "mg" | "milligram" | "milligrams" => Self::Milligram,
            "g" | "gram" | "grams" => Self::Gram,
            "ml" | "milliliter" | "milliliters" | "millilitre" | "millilitres" => Self::Milliliter,
            "drop" | "drops" | "gtt" => Self::Drop,
            "pc" | "pcs" | "piece" | "pieces" | "tab" | "tabs" | "tablet" | "tablets" | "pill"
            | "pills" => Self::Piece,
            _ => Self::Other(trimmed.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Microgram => "µg",
            Self::Milligram => "mg",
            Self::Gram => "g",
            Self::Milliliter => "ml",
            Self::Drop => "drops",
            Self::Piece => "pcs",
            Self::Other(s) => s,
        }
    }

    /// The unit quantities of this unit are summed in, and the factor that
    /// converts one of this unit into it.
    pub fn canonical(&self) -> (DoseUnit, f64) {
        match self {
            Self::Microgram => (Self::Milligram, 0.001),
            Self::Milligram => (Self::Milligram, 1.0),
            Self::Gram => (Self::Milligram, 1000.0),
            other => (other.clone(), 1.0),
        }
    }

    /// Convert `value` of this unit into its canonical unit.
    pub fn normalize(&self, value: f64) -> Amount {
        let (unit, factor) = self.canonical();
        Amount {
            value: value * factor,
            unit,
        }
    }
}

impl From<String> for DoseUnit {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<&str> for DoseUnit {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl From<DoseUnit> for String {
    fn from(unit: DoseUnit) -> Self {
        unit.as_str().to_string()
    }
}

impl fmt::Display for DoseUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A quantity together with its unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Amount {
    pub value: f64,
    pub unit: DoseUnit,
}

/// Sum quantities per canonical unit.
///
/// Returns one `Amount` per distinct canonical unit, in the order each unit
/// was first seen.
pub fn sum_normalized<'a, I>(quantities: I) -> Vec<Amount>
where
    I: IntoIterator<Item = (f64, &'a DoseUnit)>,
{
    let mut totals: Vec<Amount> = Vec::new();
    for (value, unit) in quantities {
        let amount = unit.normalize(value);
        match totals.iter_mut().find(|t| t.unit == amount.unit) {
            Some(total) => total.value += amount.value,
            None => totals.push(amount),
        }
    }
    totals
}
