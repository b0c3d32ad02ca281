//! Patient weight and kg ⇄ lb conversion.
//!
//! Kilograms are the authoritative unit. Pounds are a derived, rounded view for
//! display and must never be converted back into the dose path.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{LB_PER_KG, PEDIATRIC_WEIGHT_RANGE_KG, PEDIATRIC_WEIGHT_RANGE_LB};

/// Rejected weight input.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum WeightError {
    #[error("weight is not a finite number: {0}")]
    NotFinite(f64),

    #[error("weight must be greater than zero, got {0}")]
    NotPositive(f64),
}

/// Convert kilograms to pounds.
pub fn kg_to_lb(kg: f64) -> f64 {
    kg * LB_PER_KG
}

/// Convert pounds to kilograms.
pub fn lb_to_kg(lb: f64) -> f64 {
    lb / LB_PER_KG
}

/// A validated patient weight in kilograms: finite and strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct WeightKg(f64);

impl WeightKg {
    /// Validate a kilogram value.
    pub fn new(kg: f64) -> Result<Self, WeightError> {
        if !kg.is_finite() {
            return Err(WeightError::NotFinite(kg));
        }
        if kg <= 0.0 {
            return Err(WeightError::NotPositive(kg));
        }
        Ok(Self(kg))
    }

    /// Validate a pound value, storing the exact kilogram equivalent.
    pub fn from_lb(lb: f64) -> Result<Self, WeightError> {
        Self::new(lb_to_kg(lb))
    }

    pub fn kg(self) -> f64 {
        self.0
    }

    pub fn lb(self) -> f64 {
        kg_to_lb(self.0)
    }

    /// Rounded display string in the requested unit (e.g., "22.1 lb").
    pub fn display(self, unit: WeightUnit) -> String {
        let value = match unit {
            WeightUnit::Kg => self.kg(),
            WeightUnit::Lb => self.lb(),
        };
        format!("{:.1} {}", value, unit.label())
    }
}

impl TryFrom<f64> for WeightKg {
    type Error = WeightError;

    fn try_from(kg: f64) -> Result<Self, Self::Error> {
        Self::new(kg)
    }
}

impl From<WeightKg> for f64 {
    fn from(weight: WeightKg) -> Self {
        weight.0
    }
}

/// Unit system the clinician enters weight in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightUnit {
    #[default]
    Kg,
    Lb,
}

impl WeightUnit {
    pub fn label(self) -> &'static str {
        match self {
            WeightUnit::Kg => "kg",
            WeightUnit::Lb => "lb",
        }
    }

    /// Slider bounds for weight entry in this unit.
    pub fn slider_range(self) -> (f64, f64) {
        match self {
            WeightUnit::Kg => PEDIATRIC_WEIGHT_RANGE_KG,
            WeightUnit::Lb => PEDIATRIC_WEIGHT_RANGE_LB,
        }
    }

    /// Normalize a raw value entered in this unit to kilograms.
    pub fn to_kg(self, value: f64) -> Result<WeightKg, WeightError> {
        match self {
            WeightUnit::Kg => WeightKg::new(value),
            WeightUnit::Lb => WeightKg::from_lb(value),
        }
    }
}
