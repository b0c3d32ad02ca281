//! Dosing calculation output.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::DoseUnit;

/// A triggered safety condition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DoseWarning {
    /// The weight-derived dose exceeded the ceiling and was capped.
    MaxDoseReached { max_dose: f64, unit: DoseUnit },
    /// The dose is under the advisory floor. It was not raised.
    BelowMinDose { min_dose: f64, unit: DoseUnit },
}

impl fmt::Display for DoseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DoseWarning::MaxDoseReached { max_dose, unit } => {
                write!(f, "Maximum dose reached: capped at {} {}", max_dose, unit)
            }
            DoseWarning::BelowMinDose { min_dose, unit } => write!(
                f,
                "Below minimum dose: consider giving the minimum of {} {}",
                min_dose, unit
            ),
        }
    }
}

/// Result of one dosing calculation. Recomputed on every input change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DosingResult {
    /// Dose after the ceiling clamp
    pub dose_value: f64,
    pub dose_unit: DoseUnit,
    /// Volume to administer
    pub volume_ml: f64,
    pub max_dose_reached: bool,
    pub below_min_dose: bool,
    /// Max-dose warning first, then min-dose
    pub warnings: Vec<DoseWarning>,
    pub dose_display: String,
    pub volume_display: String,
    /// Whether patient weight contributed to the dose
    pub weight_based: bool,
}

impl DosingResult {
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Warnings rendered for display, in order.
    pub fn warning_messages(&self) -> Vec<String> {
        self.warnings.iter().map(|w| w.to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warning_messages() {
        let max = DoseWarning::MaxDoseReached {
            max_dose: 1.0,
            unit: DoseUnit::Mg,
        };
        assert_eq!(max.to_string(), "Maximum dose reached: capped at 1 mg");

        let min = DoseWarning::BelowMinDose {
            min_dose: 0.1,
            unit: DoseUnit::Mg,
        };
        assert_eq!(
            min.to_string(),
            "Below minimum dose: consider giving the minimum of 0.1 mg"
        );
    }
}
