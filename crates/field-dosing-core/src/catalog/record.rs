//! On-disk catalog record.
//!
//! Catalog files use a flat record where `dosePerWeight = 0` marks a fixed
//! adult dose and `doseIsVolume` marks a pre-diluted solution. Records are
//! converted into tagged [`MedicationProfile`]s once, at load.

use serde::{Deserialize, Serialize};

use crate::models::{
    DoseUnit, DosingRule, FixedDoseRange, MedicationProfile, PatientType, ProfileError, RepeatPolicy, Supply,
};

use super::Normalizer;

/// Top-level catalog file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogFile {
    /// Formulary version label
    pub version: String,
    pub medications: Vec<CatalogRecord>,
}

/// One medication entry as written in a catalog file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CatalogRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    pub patient_type: PatientType,
    /// Dose per kg; 0 means fixed adult dose
    #[serde(default)]
    pub dose_per_weight: f64,
    #[serde(default)]
    pub fixed_dose_range: Option<FixedDoseRange>,
    pub dose_unit: String,
    #[serde(default)]
    pub concentration: f64,
    #[serde(default)]
    pub concentration_unit: Option<String>,
    #[serde(default)]
    pub dose_is_volume: bool,
    pub max_dose: f64,
    pub max_dose_unit: String,
    #[serde(default)]
    pub min_dose: Option<f64>,
    #[serde(default)]
    pub repeat: Option<RepeatPolicy>,
    pub route: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl CatalogRecord {
    /// Convert to a validated profile.
    pub fn into_profile(self, normalizer: &Normalizer) -> Result<MedicationProfile, ProfileError> {
        let rule = match (self.dose_per_weight, self.fixed_dose_range) {
            (per_kg, Some(_)) if per_kg > 0.0 => return Err(ProfileError::AmbiguousRule),
            (per_kg, None) if per_kg > 0.0 => DosingRule::WeightScaled { dose_per_kg: per_kg },
            (per_kg, Some(range)) if per_kg == 0.0 => DosingRule::FixedAdult { range },
            (per_kg, None) if per_kg == 0.0 => return Err(ProfileError::MissingRule),
            (per_kg, _) => return Err(ProfileError::InvalidDosePerKg(per_kg)),
        };

        let dose_unit = normalizer
            .parse_unit(&self.dose_unit)
            .ok_or_else(|| ProfileError::UnknownUnit(self.dose_unit.clone()))?;
        let max_dose_unit = normalizer
            .parse_unit(&self.max_dose_unit)
            .ok_or_else(|| ProfileError::UnknownUnit(self.max_dose_unit.clone()))?;

        let supply = if self.dose_is_volume {
            Supply::PreDiluted
        } else {
            let concentration_unit = match self.concentration_unit.as_deref() {
                Some(label) => parse_concentration_unit(normalizer, label, dose_unit)?,
                None => dose_unit,
            };
            Supply::Concentrated {
                concentration: self.concentration,
                concentration_unit,
            }
        };

        let profile = MedicationProfile {
            id: self.id.trim().to_string(),
            name: self.name.trim().to_string(),
            aliases: self.aliases,
            patient_type: self.patient_type,
            rule,
            dose_unit,
            supply,
            max_dose: self.max_dose,
            max_dose_unit,
            min_dose: self.min_dose,
            repeat: self.repeat,
            route: normalizer.canonicalize_route(&self.route),
            color: self.color,
            icon: self.icon,
            notes: self.notes,
        };

        profile.validate()?;
        Ok(profile)
    }
}

/// Parse a "<unit>/mL" label. A non-mL denominator is rejected here; the
/// numerator is checked against the dose unit by `validate`.
fn parse_concentration_unit(
    normalizer: &Normalizer,
    label: &str,
    dose_unit: DoseUnit,
) -> Result<DoseUnit, ProfileError> {
    match normalizer.parse_concentration_unit(label) {
        Some((numerator, DoseUnit::Ml)) => Ok(numerator),
        Some(_) => Err(ProfileError::ConcentrationUnitMismatch {
            dose_unit,
            concentration_unit: label.trim().to_string(),
        }),
        None => Err(ProfileError::UnknownUnit(label.to_string())),
    }
}
