//! Medication profile models.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::DoseUnit;

/// Profile invariant violations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProfileError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("dose per kg must be a positive finite number, got {0}")]
    InvalidDosePerKg(f64),

    #[error("fixed doses are only valid for adult profiles")]
    FixedDoseForPediatric,

    #[error("fixed dose range must satisfy 0 < min <= typical <= max, got {min}/{typical}/{max}")]
    InvalidFixedRange { min: f64, typical: f64, max: f64 },

    #[error("max dose must be a positive finite number, got {0}")]
    InvalidMaxDose(f64),

    #[error("min dose {min} must be non-negative and below max dose {max}")]
    InvalidMinDose { min: f64, max: f64 },

    #[error("max dose unit {max_dose_unit} does not match dose unit {dose_unit}")]
    MaxDoseUnitMismatch {
        dose_unit: DoseUnit,
        max_dose_unit: DoseUnit,
    },

    #[error("concentration must be a positive finite number, got {0}")]
    InvalidConcentration(f64),

    #[error("concentration unit {concentration_unit} does not match dose unit {dose_unit}/mL")]
    ConcentrationUnitMismatch {
        dose_unit: DoseUnit,
        concentration_unit: String,
    },

    #[error("dose unit {dose_unit} is inconsistent with supply (pre-diluted: {pre_diluted})")]
    SupplyUnitMismatch { dose_unit: DoseUnit, pre_diluted: bool },

    #[error("record has both a per-kg dose and a fixed dose range")]
    AmbiguousRule,

    #[error("record has neither a per-kg dose nor a fixed dose range")]
    MissingRule,

    #[error("unknown unit: {0}")]
    UnknownUnit(String),
}

/// Patient population a profile applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatientType {
    Pediatric,
    Adult,
}

/// Adult fixed dose range; `typical` is the dose the calculator returns.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FixedDoseRange {
    pub min: f64,
    pub max: f64,
    pub typical: f64,
}

/// How the raw dose is derived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DosingRule {
    /// `dose_per_kg * weight`
    WeightScaled { dose_per_kg: f64 },
    /// Weight is ignored; the typical adult dose is used.
    FixedAdult { range: FixedDoseRange },
}

/// How the drug is supplied, which decides the dose → volume step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Supply {
    /// `concentration` of `concentration_unit` per mL.
    Concentrated {
        concentration: f64,
        /// Numerator unit; must equal the profile's dose unit
        concentration_unit: DoseUnit,
    },
    /// Pre-mixed solution dosed directly in mL.
    PreDiluted,
}

/// Repeat dosing guidance shown with the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepeatPolicy {
    pub interval_minutes: u32,
    pub max_repeats: u32,
}

impl RepeatPolicy {
    pub fn describe(&self) -> String {
        match self.max_repeats {
            0 => "Do not repeat".to_string(),
            1 => format!("May repeat once after {} min", self.interval_minutes),
            n => format!(
                "May repeat every {} min, up to {} times",
                self.interval_minutes, n
            ),
        }
    }
}

/// One dosing rule for one medication and patient type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicationProfile {
    /// Unique per (medication, patient type)
    pub id: String,
    /// Display name
    pub name: String,
    /// Brand names and abbreviations used for search
    #[serde(default)]
    pub aliases: Vec<String>,
    pub patient_type: PatientType,
    pub rule: DosingRule,
    pub dose_unit: DoseUnit,
    pub supply: Supply,
    /// Hard ceiling, always enforced
    pub max_dose: f64,
    pub max_dose_unit: DoseUnit,
    /// Advisory floor, flagged but never enforced
    pub min_dose: Option<f64>,
    pub repeat: Option<RepeatPolicy>,
    /// Canonical route abbreviation (e.g., "IV/IO")
    pub route: String,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub notes: Option<String>,
}

impl MedicationProfile {
    /// Create a weight-scaled profile with no floor, repeat policy, or display metadata.
    pub fn weight_scaled(
        id: impl Into<String>,
        name: impl Into<String>,
        patient_type: PatientType,
        dose_per_kg: f64,
        dose_unit: DoseUnit,
        supply: Supply,
        max_dose: f64,
    ) -> Self {
        Self::with_rule(
            id.into(),
            name.into(),
            patient_type,
            DosingRule::WeightScaled { dose_per_kg },
            dose_unit,
            supply,
            max_dose,
        )
    }

    /// Create an adult fixed-dose profile.
    pub fn fixed_adult(
        id: impl Into<String>,
        name: impl Into<String>,
        range: FixedDoseRange,
        dose_unit: DoseUnit,
        supply: Supply,
        max_dose: f64,
    ) -> Self {
        Self::with_rule(
            id.into(),
            name.into(),
            PatientType::Adult,
            DosingRule::FixedAdult { range },
            dose_unit,
            supply,
            max_dose,
        )
    }

    fn with_rule(
        id: String,
        name: String,
        patient_type: PatientType,
        rule: DosingRule,
        dose_unit: DoseUnit,
        supply: Supply,
        max_dose: f64,
    ) -> Self {
        Self {
            id,
            name,
            aliases: Vec::new(),
            patient_type,
            rule,
            dose_unit,
            supply,
            max_dose,
            max_dose_unit: dose_unit,
            min_dose: None,
            repeat: None,
            route: String::new(),
            color: None,
            icon: None,
            notes: None,
        }
    }

    pub fn with_min_dose(mut self, min_dose: f64) -> Self {
        self.min_dose = Some(min_dose);
        self
    }

    pub fn with_route(mut self, route: impl Into<String>) -> Self {
        self.route = route.into();
        self
    }

    pub fn with_repeat(mut self, repeat: RepeatPolicy) -> Self {
        self.repeat = Some(repeat);
        self
    }

    /// Whether the dose already is the volume to give.
    pub fn dose_is_volume(&self) -> bool {
        matches!(self.supply, Supply::PreDiluted)
    }

    /// Whether patient weight contributes to the dose.
    pub fn is_weight_based(&self) -> bool {
        matches!(self.rule, DosingRule::WeightScaled { .. })
    }

    /// Supply label such as "0.1 mg/mL", or `None` for pre-diluted solutions.
    pub fn concentration_label(&self) -> Option<String> {
        match &self.supply {
            Supply::Concentrated {
                concentration,
                concentration_unit,
            } => Some(format!("{} {}/mL", concentration, concentration_unit)),
            Supply::PreDiluted => None,
        }
    }

    /// Check every profile invariant.
    pub fn validate(&self) -> Result<(), ProfileError> {
        if self.id.trim().is_empty() {
            return Err(ProfileError::MissingField("id"));
        }
        if self.name.trim().is_empty() {
            return Err(ProfileError::MissingField("name"));
        }

        match self.rule {
            DosingRule::WeightScaled { dose_per_kg } => {
                if !is_positive(dose_per_kg) {
                    return Err(ProfileError::InvalidDosePerKg(dose_per_kg));
                }
            }
            DosingRule::FixedAdult { range } => {
                if self.patient_type != PatientType::Adult {
                    return Err(ProfileError::FixedDoseForPediatric);
                }
                let ordered = is_positive(range.min)
                    && range.min <= range.typical
                    && range.typical <= range.max
                    && range.max.is_finite();
                if !ordered {
                    return Err(ProfileError::InvalidFixedRange {
                        min: range.min,
                        typical: range.typical,
                        max: range.max,
                    });
                }
            }
        }

        if !is_positive(self.max_dose) {
            return Err(ProfileError::InvalidMaxDose(self.max_dose));
        }
        if self.max_dose_unit != self.dose_unit {
            return Err(ProfileError::MaxDoseUnitMismatch {
                dose_unit: self.dose_unit,
                max_dose_unit: self.max_dose_unit,
            });
        }
        if let Some(min) = self.min_dose {
            if !(min.is_finite() && min >= 0.0 && min < self.max_dose) {
                return Err(ProfileError::InvalidMinDose {
                    min,
                    max: self.max_dose,
                });
            }
        }

        match &self.supply {
            Supply::Concentrated {
                concentration,
                concentration_unit,
            } => {
                if !is_positive(*concentration) {
                    return Err(ProfileError::InvalidConcentration(*concentration));
                }
                if self.dose_unit.is_volume() {
                    return Err(ProfileError::SupplyUnitMismatch {
                        dose_unit: self.dose_unit,
                        pre_diluted: false,
                    });
                }
                // Volume is dose / concentration, so both must share a unit
                if *concentration_unit != self.dose_unit {
                    return Err(ProfileError::ConcentrationUnitMismatch {
                        dose_unit: self.dose_unit,
                        concentration_unit: format!("{}/mL", concentration_unit),
                    });
                }
            }
            Supply::PreDiluted => {
                if !self.dose_unit.is_volume() {
                    return Err(ProfileError::SupplyUnitMismatch {
                        dose_unit: self.dose_unit,
                        pre_diluted: true,
                    });
                }
            }
        }

        Ok(())
    }
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mg_per_ml(concentration: f64) -> Supply {
        Supply::Concentrated {
            concentration,
            concentration_unit: DoseUnit::Mg,
        }
    }

    fn pediatric_epi() -> MedicationProfile {
        MedicationProfile::weight_scaled(
            "epi-peds",
            "Epinephrine 0.1 mg/mL",
            PatientType::Pediatric,
            0.01,
            DoseUnit::Mg,
            mg_per_ml(0.1),
            1.0,
        )
    }

    fn adult_amiodarone() -> MedicationProfile {
        MedicationProfile::fixed_adult(
            "amio-adult",
            "Amiodarone",
            FixedDoseRange {
                min: 150.0,
                max: 300.0,
                typical: 300.0,
            },
            DoseUnit::Mg,
            mg_per_ml(50.0),
            300.0,
        )
    }

    #[test]
    fn test_valid_profiles() {
        assert_eq!(pediatric_epi().validate(), Ok(()));
        assert_eq!(adult_amiodarone().validate(), Ok(()));

        let d10 = MedicationProfile::weight_scaled(
            "d10-peds",
            "Dextrose 10%",
            PatientType::Pediatric,
            5.0,
            DoseUnit::Ml,
            Supply::PreDiluted,
            250.0,
        );
        assert_eq!(d10.validate(), Ok(()));
        assert!(d10.dose_is_volume());
        assert_eq!(d10.concentration_label(), None);
    }

    #[test]
    fn test_rejects_non_positive_dose_per_kg() {
        let mut profile = pediatric_epi();
        profile.rule = DosingRule::WeightScaled { dose_per_kg: 0.0 };
        assert_eq!(profile.validate(), Err(ProfileError::InvalidDosePerKg(0.0)));
    }

    #[test]
    fn test_rejects_fixed_dose_for_pediatric() {
        let mut profile = adult_amiodarone();
        profile.patient_type = PatientType::Pediatric;
        assert_eq!(profile.validate(), Err(ProfileError::FixedDoseForPediatric));
    }

    #[test]
    fn test_rejects_unordered_fixed_range() {
        let mut profile = adult_amiodarone();
        profile.rule = DosingRule::FixedAdult {
            range: FixedDoseRange {
                min: 150.0,
                max: 300.0,
                typical: 450.0,
            },
        };
        assert!(matches!(
            profile.validate(),
            Err(ProfileError::InvalidFixedRange { .. })
        ));
    }

    #[test]
    fn test_rejects_bad_ceiling_and_floor() {
        let mut profile = pediatric_epi();
        profile.max_dose = 0.0;
        assert_eq!(profile.validate(), Err(ProfileError::InvalidMaxDose(0.0)));

        let profile = pediatric_epi().with_min_dose(1.0);
        assert_eq!(
            profile.validate(),
            Err(ProfileError::InvalidMinDose { min: 1.0, max: 1.0 })
        );

        let profile = pediatric_epi().with_min_dose(0.05);
        assert_eq!(profile.validate(), Ok(()));
    }

    #[test]
    fn test_rejects_mismatched_max_dose_unit() {
        let mut profile = pediatric_epi();
        profile.max_dose_unit = DoseUnit::Mcg;
        assert!(matches!(
            profile.validate(),
            Err(ProfileError::MaxDoseUnitMismatch { .. })
        ));
    }

    #[test]
    fn test_supply_must_match_dose_unit() {
        let mut profile = pediatric_epi();
        profile.supply = Supply::PreDiluted;
        assert_eq!(
            profile.validate(),
            Err(ProfileError::SupplyUnitMismatch {
                dose_unit: DoseUnit::Mg,
                pre_diluted: true,
            })
        );

        let mut profile = pediatric_epi();
        profile.supply = mg_per_ml(0.0);
        assert_eq!(profile.validate(), Err(ProfileError::InvalidConcentration(0.0)));
    }

    #[test]
    fn test_rejects_concentration_in_other_unit() {
        let mut profile = pediatric_epi();
        profile.dose_unit = DoseUnit::Mcg;
        profile.max_dose_unit = DoseUnit::Mcg;
        profile.max_dose = 1000.0;

        assert_eq!(
            profile.validate(),
            Err(ProfileError::ConcentrationUnitMismatch {
                dose_unit: DoseUnit::Mcg,
                concentration_unit: "mg/mL".into(),
            })
        );
    }

    #[test]
    fn test_builders_fill_display_metadata() {
        let repeat = RepeatPolicy {
            interval_minutes: 5,
            max_repeats: 2,
        };
        let profile = pediatric_epi().with_route("IV/IO").with_repeat(repeat);

        assert_eq!(profile.route, "IV/IO");
        assert_eq!(profile.repeat, Some(repeat));
        assert_eq!(profile.concentration_label().as_deref(), Some("0.1 mg/mL"));
        assert_eq!(profile.validate(), Ok(()));
    }

    #[test]
    fn test_rejects_blank_id() {
        let mut profile = pediatric_epi();
        profile.id = "  ".into();
        assert_eq!(profile.validate(), Err(ProfileError::MissingField("id")));
    }

    #[test]
    fn test_repeat_descriptions() {
        let once = RepeatPolicy {
            interval_minutes: 5,
            max_repeats: 1,
        };
        assert_eq!(once.describe(), "May repeat once after 5 min");

        let many = RepeatPolicy {
            interval_minutes: 3,
            max_repeats: 4,
        };
        assert_eq!(many.describe(), "May repeat every 3 min, up to 4 times");
    }

    #[test]
    fn test_rule_serialization_is_tagged() {
        let json = serde_json::to_value(&pediatric_epi().rule).unwrap();
        assert_eq!(json["kind"], "weight_scaled");
        assert_eq!(json["dose_per_kg"], 0.01);
    }
}
