//! Application constants and environment-driven settings.

/// Application-level constants
pub const APP_NAME: &str = "Field Dosing";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Pounds per kilogram used for all weight conversions.
pub const LB_PER_KG: f64 = 2.205;

/// Input bounds for the pediatric weight slider, in kilograms.
pub const PEDIATRIC_WEIGHT_RANGE_KG: (f64, f64) = (1.0, 50.0);

/// Input bounds for the pediatric weight slider, in pounds.
pub const PEDIATRIC_WEIGHT_RANGE_LB: (f64, f64) = (2.0, 110.0);

/// Environment variable naming a catalog JSON file that replaces the bundled one.
pub const CATALOG_PATH_ENV: &str = "FIELD_DOSING_CATALOG";

/// Shown beside every calculated dose.
pub const REFERENCE_DISCLAIMER: &str =
    "For reference only. Verify every dose against your local protocol and medical direction.";

/// Log filter used when neither the host nor `RUST_LOG` provides one.
pub fn default_log_filter() -> &'static str {
    "field_dosing_core=info"
}
