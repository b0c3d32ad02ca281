//! Dosing calculator.
//!
//! Pipeline: Raw dose → Ceiling clamp → Floor check → Volume → Formatting
//!
//! The ceiling is enforced; the floor is only flagged. A dose is never raised
//! automatically. Raising it is left to the clinician.

use thiserror::Error;

use crate::models::{
    DoseWarning, DosingResult, DosingRule, MedicationProfile, ProfileError, Supply, WeightError,
    WeightKg,
};

/// Calculation refused because an input broke its contract.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DosingError {
    #[error("invalid weight: {0}")]
    InvalidWeight(#[from] WeightError),

    #[error("invalid profile {id}: {source}")]
    InvalidProfile {
        id: String,
        #[source]
        source: ProfileError,
    },
}

pub type DosingOutcome<T> = Result<T, DosingError>;

/// Calculate the dose and volume for a validated weight.
///
/// The profile must satisfy [`MedicationProfile::validate`]; profiles loaded
/// through [`crate::catalog::Catalog`] always do. Debug builds assert this.
pub fn calculate_dose(profile: &MedicationProfile, weight: WeightKg) -> DosingResult {
    debug_assert!(
        profile.validate().is_ok(),
        "invalid medication profile {}: {:?}",
        profile.id,
        profile.validate()
    );

    // Step 1: Raw dose
    let raw_dose = match profile.rule {
        DosingRule::WeightScaled { dose_per_kg } => dose_per_kg * weight.kg(),
        DosingRule::FixedAdult { range } => range.typical,
    };

    let mut warnings = Vec::new();

    // Step 2: Ceiling clamp
    let max_dose_reached = raw_dose > profile.max_dose;
    let dose_value = if max_dose_reached {
        warnings.push(DoseWarning::MaxDoseReached {
            max_dose: profile.max_dose,
            unit: profile.max_dose_unit,
        });
        profile.max_dose
    } else {
        raw_dose
    };

    // Step 3: Floor check (flag only)
    let below_min_dose = match profile.min_dose {
        Some(min_dose) if dose_value < min_dose => {
            warnings.push(DoseWarning::BelowMinDose {
                min_dose,
                unit: profile.dose_unit,
            });
            true
        }
        _ => false,
    };

    // Step 4: Volume
    let volume_ml = match &profile.supply {
        Supply::Concentrated { concentration, .. } => dose_value / concentration,
        Supply::PreDiluted => dose_value,
    };

    tracing::trace!(
        medication = %profile.id,
        weight_kg = weight.kg(),
        dose_value,
        volume_ml,
        max_dose_reached,
        below_min_dose,
        "calculated dose"
    );

    // Step 5: Formatting
    DosingResult {
        dose_value,
        dose_unit: profile.dose_unit,
        volume_ml,
        max_dose_reached,
        below_min_dose,
        warnings,
        dose_display: format!("{} {}", format_dose(dose_value), profile.dose_unit),
        volume_display: format!("{} mL", format_volume(volume_ml)),
        weight_based: profile.is_weight_based(),
    }
}

/// Validate raw inputs, then calculate.
///
/// Returns an error instead of a result when either input breaks its contract,
/// so callers can show nothing rather than a wrong number.
pub fn try_calculate_dose(
    profile: &MedicationProfile,
    weight_kg: f64,
) -> DosingOutcome<DosingResult> {
    let weight = WeightKg::new(weight_kg)?;
    profile
        .validate()
        .map_err(|source| DosingError::InvalidProfile {
            id: profile.id.clone(),
            source,
        })?;
    Ok(calculate_dose(profile, weight))
}

/// One decimal at or above 1, two below (mcg-scale doses would round to zero).
///
/// The branch is chosen on the unrounded value, so 0.996 prints "1.00" while
/// 1.0 prints "1.0".
pub fn format_dose(value: f64) -> String {
    if value >= 1.0 {
        format!("{:.1}", value)
    } else {
        format!("{:.2}", value)
    }
}

/// Two decimals under 0.1 mL, one otherwise.
pub fn format_volume(volume_ml: f64) -> String {
    if volume_ml < 0.1 {
        format!("{:.2}", volume_ml)
    } else {
        format!("{:.1}", volume_ml)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DoseUnit, FixedDoseRange, PatientType};

    fn epi_peds() -> MedicationProfile {
        MedicationProfile::weight_scaled(
            "epi-peds",
            "Epinephrine 0.1 mg/mL",
            PatientType::Pediatric,
            0.01,
            DoseUnit::Mg,
            Supply::Concentrated {
                concentration: 0.1,
                concentration_unit: DoseUnit::Mg,
            },
            1.0,
        )
    }

    fn kg(value: f64) -> WeightKg {
        WeightKg::new(value).unwrap()
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_weight_scaled_without_clamp() {
        let result = calculate_dose(&epi_peds(), kg(10.0));

        assert!(approx(result.dose_value, 0.1));
        assert!(approx(result.volume_ml, 1.0));
        assert!(!result.max_dose_reached);
        assert!(!result.below_min_dose);
        assert!(!result.has_warnings());
        assert!(result.weight_based);
        assert_eq!(result.dose_display, "0.10 mg");
        assert_eq!(result.volume_display, "1.0 mL");
    }

    #[test]
    fn test_weight_scaled_with_clamp() {
        let result = calculate_dose(&epi_peds(), kg(150.0));

        assert_eq!(result.dose_value, 1.0);
        assert!(approx(result.volume_ml, 10.0));
        assert!(result.max_dose_reached);
        assert!(result.has_warnings());
        assert_eq!(
            result.warnings,
            vec![DoseWarning::MaxDoseReached {
                max_dose: 1.0,
                unit: DoseUnit::Mg
            }]
        );
        assert_eq!(result.dose_display, "1.0 mg");
    }

    #[test]
    fn test_exactly_at_ceiling_is_not_clamped() {
        let result = calculate_dose(&epi_peds(), kg(100.0));
        assert!(approx(result.dose_value, 1.0));
        assert!(!result.max_dose_reached);
    }

    #[test]
    fn test_fixed_dose_ignores_weight() {
        let profile = MedicationProfile::fixed_adult(
            "amio-adult",
            "Amiodarone",
            FixedDoseRange {
                min: 150.0,
                max: 300.0,
                typical: 300.0,
            },
            DoseUnit::Mg,
            Supply::Concentrated {
                concentration: 50.0,
                concentration_unit: DoseUnit::Mg,
            },
            300.0,
        );

        let light = calculate_dose(&profile, kg(5.0));
        let heavy = calculate_dose(&profile, kg(50.0));

        assert_eq!(light, heavy);
        assert_eq!(light.dose_value, 300.0);
        assert_eq!(light.volume_ml, 6.0);
        assert!(!light.weight_based);
    }

    #[test]
    fn test_pre_diluted_volume_equals_dose() {
        let profile = MedicationProfile::weight_scaled(
            "d10-peds",
            "Dextrose 10%",
            PatientType::Pediatric,
            5.0,
            DoseUnit::Ml,
            Supply::PreDiluted,
            250.0,
        );

        let result = calculate_dose(&profile, kg(10.0));
        assert_eq!(result.dose_value, 50.0);
        assert_eq!(result.volume_ml, 50.0);
        assert_eq!(result.dose_display, "50.0 mL");
    }

    #[test]
    fn test_below_min_is_flagged_not_raised() {
        let profile = MedicationProfile::weight_scaled(
            "test-min",
            "Test",
            PatientType::Pediatric,
            0.12,
            DoseUnit::Mg,
            Supply::Concentrated {
                concentration: 1.0,
                concentration_unit: DoseUnit::Mg,
            },
            10.0,
        )
        .with_min_dose(2.5);

        let result = calculate_dose(&profile, kg(10.0));
        assert!(approx(result.dose_value, 1.2));
        assert!(result.below_min_dose);
        assert!(!result.max_dose_reached);
        assert_eq!(result.warnings.len(), 1);
        assert!(matches!(
            result.warnings[0],
            DoseWarning::BelowMinDose { min_dose, .. } if min_dose == 2.5
        ));
    }

    #[test]
    fn test_try_calculate_rejects_bad_weight() {
        assert_eq!(
            try_calculate_dose(&epi_peds(), 0.0),
            Err(DosingError::InvalidWeight(WeightError::NotPositive(0.0)))
        );
        assert!(try_calculate_dose(&epi_peds(), f64::NAN).is_err());
    }

    #[test]
    fn test_try_calculate_rejects_bad_profile() {
        let mut profile = epi_peds();
        profile.max_dose = -1.0;

        let err = try_calculate_dose(&profile, 10.0).unwrap_err();
        assert!(matches!(err, DosingError::InvalidProfile { ref id, .. } if id == "epi-peds"));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "invalid medication profile")]
    fn test_invalid_profile_fails_loudly() {
        let mut profile = epi_peds();
        profile.rule = DosingRule::WeightScaled { dose_per_kg: 0.0 };
        calculate_dose(&profile, kg(10.0));
    }

    #[test]
    fn test_format_dose() {
        assert_eq!(format_dose(12.345), "12.3");
        assert_eq!(format_dose(1.0), "1.0");
        assert_eq!(format_dose(0.987), "0.99");
        assert_eq!(format_dose(0.004), "0.00");

        // Just under 1 keeps two decimals even when it rounds up
        assert_eq!(format_dose(0.996), "1.00");
        assert_eq!(format_dose(0.999_999), "1.00");
    }

    #[test]
    fn test_format_volume() {
        assert_eq!(format_volume(0.05), "0.05");
        assert_eq!(format_volume(0.1), "0.1");
        assert_eq!(format_volume(6.0), "6.0");
        assert_eq!(format_volume(12.26), "12.3");
    }
}
