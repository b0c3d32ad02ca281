//! Dose units.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Unit a dose is expressed in.
///
/// Every unit except [`DoseUnit::Ml`] measures an amount of active drug. A
/// millilitre dose only appears on pre-diluted solutions, where the amount to
/// give and the volume to draw up are the same number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DoseUnit {
    #[serde(rename = "mg")]
    Mg,
    #[serde(rename = "mcg")]
    Mcg,
    #[serde(rename = "g")]
    G,
    #[serde(rename = "mEq")]
    MEq,
    #[serde(rename = "units")]
    Units,
    #[serde(rename = "mL")]
    Ml,
}

impl DoseUnit {
    /// Display symbol (e.g., "mg", "mL").
    pub fn symbol(self) -> &'static str {
        match self {
            DoseUnit::Mg => "mg",
            DoseUnit::Mcg => "mcg",
            DoseUnit::G => "g",
            DoseUnit::MEq => "mEq",
            DoseUnit::Units => "units",
            DoseUnit::Ml => "mL",
        }
    }

    /// Whether the unit is itself a volume.
    pub fn is_volume(self) -> bool {
        matches!(self, DoseUnit::Ml)
    }
}

impl fmt::Display for DoseUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}
