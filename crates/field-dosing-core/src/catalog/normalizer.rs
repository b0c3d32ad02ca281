//! Catalog field normalizer.
//!
//! Handles:
//! - Unit parsing (cc→mL, µg→mcg, etc.)
//! - Concentration labels ("mcg/mL" → mcg per mL)
//! - Route canonicalization (intravenous→IV, intraosseous→IO)

use std::collections::HashMap;

use crate::models::DoseUnit;

/// Normalizer for unit and route spellings found in catalog files.
pub struct Normalizer {
    /// Unit spellings (lowercase) → dose unit
    units: HashMap<String, DoseUnit>,
    /// Route spellings (lowercase) → standard abbreviation
    route_map: HashMap<String, String>,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Normalizer {
    /// Create a new normalizer with default mappings.
    pub fn new() -> Self {
        Self {
            units: Self::default_units(),
            route_map: Self::default_routes(),
        }
    }

    /// Parse a unit spelling, or `None` if it is not a known dose unit.
    pub fn parse_unit(&self, unit: &str) -> Option<DoseUnit> {
        self.units.get(&unit.trim().to_lowercase()).copied()
    }

    /// Split a concentration label such as "mg/mL" into numerator and denominator units.
    ///
    /// `None` if the label has no '/' or either side is not a known unit.
    pub fn parse_concentration_unit(&self, label: &str) -> Option<(DoseUnit, DoseUnit)> {
        let (numerator, denominator) = label.split_once('/')?;
        Some((self.parse_unit(numerator)?, self.parse_unit(denominator)?))
    }

    /// Canonicalize a route. Combined routes ("IV/IO") are canonicalized per part.
    pub fn canonicalize_route(&self, route: &str) -> String {
        route
            .split('/')
            .map(|part| {
                let lower = part.trim().to_lowercase();
                self.route_map
                    .get(&lower)
                    .cloned()
                    .unwrap_or_else(|| part.trim().to_uppercase())
            })
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Add a custom unit spelling.
    pub fn add_unit(&mut self, spelling: &str, unit: DoseUnit) {
        self.units.insert(spelling.to_lowercase(), unit);
    }

    /// Add a custom route mapping.
    pub fn add_route(&mut self, spoken: &str, canonical: &str) {
        self.route_map
            .insert(spoken.to_lowercase(), canonical.to_uppercase());
    }

    fn default_units() -> HashMap<String, DoseUnit> {
        let mut map = HashMap::new();

        // Mass
        map.insert("mg".into(), DoseUnit::Mg);
        map.insert("milligram".into(), DoseUnit::Mg);
        map.insert("milligrams".into(), DoseUnit::Mg);
        map.insert("mcg".into(), DoseUnit::Mcg);
        map.insert("µg".into(), DoseUnit::Mcg);
        // Greek mu spelling
        map.insert("\u{3bc}g".into(), DoseUnit::Mcg);
        map.insert("ug".into(), DoseUnit::Mcg);
        map.insert("microgram".into(), DoseUnit::Mcg);
        map.insert("micrograms".into(), DoseUnit::Mcg);
        map.insert("g".into(), DoseUnit::G);
        map.insert("gm".into(), DoseUnit::G);
        map.insert("gram".into(), DoseUnit::G);
        map.insert("grams".into(), DoseUnit::G);

        // Equivalents and units
        map.insert("meq".into(), DoseUnit::MEq);
        map.insert("unit".into(), DoseUnit::Units);
        map.insert("units".into(), DoseUnit::Units);
        map.insert("iu".into(), DoseUnit::Units);

        // Volume
        map.insert("ml".into(), DoseUnit::Ml);
        map.insert("cc".into(), DoseUnit::Ml);
        map.insert("milliliter".into(), DoseUnit::Ml);
        map.insert("milliliters".into(), DoseUnit::Ml);

        map
    }

    fn default_routes() -> HashMap<String, String> {
        let mut map = HashMap::new();

        // Intravenous
        map.insert("intravenous".into(), "IV".into());
        map.insert("iv".into(), "IV".into());
        map.insert("i.v.".into(), "IV".into());

        // Intraosseous
        map.insert("intraosseous".into(), "IO".into());
        map.insert("io".into(), "IO".into());
        map.insert("i.o.".into(), "IO".into());

        // Intramuscular
        map.insert("intramuscular".into(), "IM".into());
        map.insert("im".into(), "IM".into());
        map.insert("i.m.".into(), "IM".into());

        // Intranasal
        map.insert("intranasal".into(), "IN".into());
        map.insert("in".into(), "IN".into());
        map.insert("nasal".into(), "IN".into());

        // Subcutaneous
        map.insert("subcutaneous".into(), "SQ".into());
        map.insert("subq".into(), "SQ".into());
        map.insert("sq".into(), "SQ".into());
        map.insert("sc".into(), "SQ".into());

        // Oral
        map.insert("oral".into(), "PO".into());
        map.insert("by mouth".into(), "PO".into());
        map.insert("po".into(), "PO".into());

        // Inhaled
        map.insert("nebulized".into(), "NEB".into());
        map.insert("neb".into(), "NEB".into());
        map.insert("inhaled".into(), "NEB".into());

        // Endotracheal
        map.insert("endotracheal".into(), "ETT".into());
        map.insert("ett".into(), "ETT".into());

        // Rectal
        map.insert("rectal".into(), "PR".into());
        map.insert("pr".into(), "PR".into());

        map
    }
}
