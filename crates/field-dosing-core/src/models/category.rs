//! Developmental weight categories.

use serde::Serialize;

use super::WeightKg;

/// A named weight band covering the half-open range `[min_kg, max_kg)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeightCategory {
    pub name: &'static str,
    pub min_kg: f64,
    pub max_kg: f64,
}

impl WeightCategory {
    pub fn contains(&self, kg: f64) -> bool {
        kg >= self.min_kg && kg < self.max_kg
    }
}

/// Ascending, contiguous, non-overlapping.
pub const WEIGHT_CATEGORIES: &[WeightCategory] = &[
    WeightCategory { name: "Newborn", min_kg: 1.0, max_kg: 5.0 },
    WeightCategory { name: "Infant", min_kg: 5.0, max_kg: 10.0 },
    WeightCategory { name: "Toddler", min_kg: 10.0, max_kg: 15.0 },
    WeightCategory { name: "Preschool", min_kg: 15.0, max_kg: 20.0 },
    WeightCategory { name: "School Age", min_kg: 20.0, max_kg: 35.0 },
    WeightCategory { name: "Adolescent", min_kg: 35.0, max_kg: 70.0 },
];

/// First category whose range contains the weight, if any.
pub fn category_for(weight: WeightKg) -> Option<&'static WeightCategory> {
    let kg = weight.kg();
    WEIGHT_CATEGORIES.iter().find(|c| c.contains(kg))
}
