//! Field Dosing Core Library
//!
//! Offline medication dosing calculator for paramedics and EMTs.
//!
//! # Architecture
//!
//! ```text
//!   Weight slider / entry ──► WeightUnit::to_kg ──► WeightKg (authoritative)
//!                                                       │
//!   Medication picker ──► Catalog::get(id) ──► MedicationProfile
//!                                                       │
//!                                        ┌──────────────▼──────────────┐
//!                                        │       calculate_dose        │
//!                                        │  raw dose → ceiling clamp   │
//!                                        │  → floor flag → volume      │
//!                                        └──────────────┬──────────────┘
//!                                                       │
//!                                                  DosingResult
//!                                       (dose, mL, flags, warnings, display)
//! ```
//!
//! # Core Principle
//!
//! **Doses above the ceiling are capped; doses below the floor are only
//! flagged.** The calculator never raises a dose on its own.
//!
//! # Modules
//!
//! - [`models`]: Domain types (MedicationProfile, DosingResult, WeightKg, etc.)
//! - [`calculator`]: The dosing calculation
//! - [`catalog`]: Static medication catalog loading, lookup and search
//! - [`config`]: Application constants

pub mod calculator;
pub mod catalog;
pub mod config;
pub mod models;

// Re-export commonly used types
pub use calculator::{calculate_dose, try_calculate_dose, DosingError};
pub use catalog::{Catalog, CatalogError};
pub use models::{
    category_for, DoseUnit, DoseWarning, DosingResult, DosingRule, FixedDoseRange,
    MedicationProfile, PatientType, RepeatPolicy, Supply, WeightCategory, WeightKg, WeightUnit,
};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum FieldDosingError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Catalog error: {0}")]
    Catalog(String),
}

impl From<CatalogError> for FieldDosingError {
    fn from(e: CatalogError) -> Self {
        FieldDosingError::Catalog(e.to_string())
    }
}

impl From<DosingError> for FieldDosingError {
    fn from(e: DosingError) -> Self {
        FieldDosingError::InvalidInput(e.to_string())
    }
}

impl From<models::WeightError> for FieldDosingError {
    fn from(e: models::WeightError) -> Self {
        FieldDosingError::InvalidInput(e.to_string())
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open the catalog named by `FIELD_DOSING_CATALOG`, or the bundled one.
#[uniffi::export]
pub fn open_default_catalog() -> Result<Arc<FieldDosingCore>, FieldDosingError> {
    Ok(FieldDosingCore::new(Catalog::from_env_or_bundled()?))
}

/// Open a catalog file at the given path.
#[uniffi::export]
pub fn open_catalog_file(path: String) -> Result<Arc<FieldDosingCore>, FieldDosingError> {
    Ok(FieldDosingCore::new(Catalog::from_path(path)?))
}

/// Open a catalog from JSON text.
#[uniffi::export]
pub fn open_catalog_json(json: String) -> Result<Arc<FieldDosingCore>, FieldDosingError> {
    Ok(FieldDosingCore::new(Catalog::from_json(&json)?))
}

// =========================================================================
// Stateless Helpers (exported to FFI)
// =========================================================================

/// Install a `tracing` formatter. Later calls are no-ops.
///
/// Uses `filter` if given, otherwise `RUST_LOG`, otherwise the default filter.
#[uniffi::export]
pub fn init_logging(filter: Option<String>) {
    let env_filter = match filter {
        Some(directives) => EnvFilter::new(directives),
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
    };

    if tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .try_init()
        .is_ok()
    {
        tracing::info!("{} v{} logging initialized", config::APP_NAME, config::APP_VERSION);
    }
}

#[uniffi::export]
pub fn kg_to_lb(kg: f64) -> f64 {
    models::kg_to_lb(kg)
}

#[uniffi::export]
pub fn lb_to_kg(lb: f64) -> f64 {
    models::lb_to_kg(lb)
}

/// Normalize a weight entered in either unit to kilograms.
#[uniffi::export]
pub fn weight_to_kg(value: f64, unit: FfiWeightUnit) -> Result<f64, FieldDosingError> {
    Ok(WeightUnit::from(unit).to_kg(value)?.kg())
}

/// Rounded display string for a kilogram weight (e.g., "22.1 lb").
#[uniffi::export]
pub fn format_weight(weight_kg: f64, unit: FfiWeightUnit) -> Result<String, FieldDosingError> {
    Ok(WeightKg::new(weight_kg)?.display(unit.into()))
}

/// Slider bounds for weight entry in the given unit.
#[uniffi::export]
pub fn weight_slider_range(unit: FfiWeightUnit) -> FfiWeightRange {
    let (min, max) = WeightUnit::from(unit).slider_range();
    FfiWeightRange { min, max }
}

/// Developmental category for a kilogram weight, if one applies.
#[uniffi::export]
pub fn weight_category(weight_kg: f64) -> Result<Option<FfiWeightCategory>, FieldDosingError> {
    let weight = WeightKg::new(weight_kg)?;
    Ok(category_for(weight).map(FfiWeightCategory::from))
}

/// Text the host must show with every dose.
#[uniffi::export]
pub fn reference_disclaimer() -> String {
    config::REFERENCE_DISCLAIMER.to_string()
}

// =========================================================================
// Main API Object
// =========================================================================

/// Read-only catalog handle. No lock: nothing writes after load.
#[derive(uniffi::Object)]
pub struct FieldDosingCore {
    catalog: Arc<Catalog>,
}

impl FieldDosingCore {
    fn new(catalog: Catalog) -> Arc<Self> {
        Arc::new(Self {
            catalog: Arc::new(catalog),
        })
    }
}

#[uniffi::export]
impl FieldDosingCore {
    // =========================================================================
    // Catalog Operations
    // =========================================================================

    pub fn catalog_version(&self) -> String {
        self.catalog.version().to_string()
    }

    /// Hex SHA-256 identifying the loaded formulary.
    pub fn catalog_fingerprint(&self) -> String {
        self.catalog.fingerprint().to_string()
    }

    /// List medications in catalog order, optionally for one patient type.
    pub fn list_medications(&self, patient_type: Option<FfiPatientType>) -> Vec<FfiMedication> {
        match patient_type {
            Some(patient_type) => self
                .catalog
                .for_patient_type(patient_type.into())
                .map(FfiMedication::from)
                .collect(),
            None => self
                .catalog
                .profiles()
                .iter()
                .map(FfiMedication::from)
                .collect(),
        }
    }

    /// Get a medication by id.
    pub fn get_medication(&self, medication_id: String) -> Option<FfiMedication> {
        self.catalog.get(&medication_id).map(FfiMedication::from)
    }

    /// Search medications by name, id, or alias.
    pub fn search_medications(&self, query: String, limit: u32) -> Vec<FfiMedication> {
        self.catalog
            .search(&query, limit as usize)
            .into_iter()
            .map(|hit| FfiMedication::from(hit.profile))
            .collect()
    }

    // =========================================================================
    // Dosing Operations
    // =========================================================================

    /// Calculate the dose of a medication for a kilogram weight.
    ///
    /// Errors mean "show no result". A bad weight or unknown medication never
    /// yields a number.
    pub fn calculate(
        &self,
        medication_id: String,
        weight_kg: f64,
    ) -> Result<FfiDosingResult, FieldDosingError> {
        let profile = self.catalog.get(&medication_id).ok_or_else(|| {
            tracing::warn!(medication = %medication_id, "dose requested for unknown medication");
            FieldDosingError::NotFound(medication_id.clone())
        })?;

        let result = calculator::try_calculate_dose(profile, weight_kg).map_err(|e| {
            tracing::warn!(
                medication = %medication_id,
                weight_kg,
                error = %e,
                "dose calculation refused"
            );
            FieldDosingError::from(e)
        })?;

        Ok(FfiDosingResult::new(profile, result, self.catalog.fingerprint()))
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe patient type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum FfiPatientType {
    Pediatric,
    Adult,
}

impl From<FfiPatientType> for PatientType {
    fn from(patient_type: FfiPatientType) -> Self {
        match patient_type {
            FfiPatientType::Pediatric => PatientType::Pediatric,
            FfiPatientType::Adult => PatientType::Adult,
        }
    }
}

impl From<PatientType> for FfiPatientType {
    fn from(patient_type: PatientType) -> Self {
        match patient_type {
            PatientType::Pediatric => FfiPatientType::Pediatric,
            PatientType::Adult => FfiPatientType::Adult,
        }
    }
}

/// FFI-safe weight unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum FfiWeightUnit {
    Kg,
    Lb,
}

impl From<FfiWeightUnit> for WeightUnit {
    fn from(unit: FfiWeightUnit) -> Self {
        match unit {
            FfiWeightUnit::Kg => WeightUnit::Kg,
            FfiWeightUnit::Lb => WeightUnit::Lb,
        }
    }
}

/// FFI-safe slider bounds.
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct FfiWeightRange {
    pub min: f64,
    pub max: f64,
}

/// FFI-safe weight category.
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct FfiWeightCategory {
    pub name: String,
    pub min_kg: f64,
    pub max_kg: f64,
}

impl From<&WeightCategory> for FfiWeightCategory {
    fn from(category: &WeightCategory) -> Self {
        Self {
            name: category.name.to_string(),
            min_kg: category.min_kg,
            max_kg: category.max_kg,
        }
    }
}

/// FFI-safe medication summary for pickers and cards.
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct FfiMedication {
    pub id: String,
    pub name: String,
    pub aliases: Vec<String>,
    pub patient_type: FfiPatientType,
    pub route: String,
    pub dose_unit: String,
    pub concentration: Option<String>,
    pub weight_based: bool,
    pub dose_is_volume: bool,
    pub max_dose: f64,
    pub min_dose: Option<f64>,
    pub repeat: Option<String>,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub notes: Option<String>,
}

impl From<&MedicationProfile> for FfiMedication {
    fn from(profile: &MedicationProfile) -> Self {
        Self {
            id: profile.id.clone(),
            name: profile.name.clone(),
            aliases: profile.aliases.clone(),
            patient_type: profile.patient_type.into(),
            route: profile.route.clone(),
            dose_unit: profile.dose_unit.to_string(),
            concentration: profile.concentration_label(),
            weight_based: profile.is_weight_based(),
            dose_is_volume: profile.dose_is_volume(),
            max_dose: profile.max_dose,
            min_dose: profile.min_dose,
            repeat: profile.repeat.map(|r| r.describe()),
            color: profile.color.clone(),
            icon: profile.icon.clone(),
            notes: profile.notes.clone(),
        }
    }
}

/// FFI-safe dosing result.
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct FfiDosingResult {
    pub medication_id: String,
    pub medication_name: String,
    pub route: String,
    pub dose_value: f64,
    pub dose_unit: String,
    pub volume_ml: f64,
    pub dose_display: String,
    pub volume_display: String,
    pub concentration: Option<String>,
    pub max_dose_reached: bool,
    pub below_min_dose: bool,
    /// Rendered warnings, max-dose first
    pub warnings: Vec<String>,
    pub repeat: Option<String>,
    pub weight_based: bool,
    pub disclaimer: String,
    /// Fingerprint of the catalog that produced this dose
    pub catalog_fingerprint: String,
}

impl FfiDosingResult {
    fn new(profile: &MedicationProfile, result: DosingResult, catalog_fingerprint: &str) -> Self {
        Self {
            medication_id: profile.id.clone(),
            medication_name: profile.name.clone(),
            route: profile.route.clone(),
            dose_value: result.dose_value,
            dose_unit: result.dose_unit.to_string(),
            volume_ml: result.volume_ml,
            warnings: result.warning_messages(),
            dose_display: result.dose_display,
            volume_display: result.volume_display,
            concentration: profile.concentration_label(),
            max_dose_reached: result.max_dose_reached,
            below_min_dose: result.below_min_dose,
            repeat: profile.repeat.map(|r| r.describe()),
            weight_based: result.weight_based,
            disclaimer: config::REFERENCE_DISCLAIMER.to_string(),
            catalog_fingerprint: catalog_fingerprint.to_string(),
        }
    }
}
