//! Medication search for the picker.
//!
//! Exact or substring matches on name, id, or alias score 1.0. Everything else
//! is scored by fuzzy similarity and dropped below [`MIN_SCORE`].

use strsim::{jaro_winkler, normalized_levenshtein};

use crate::models::MedicationProfile;

/// Minimum similarity for a fuzzy hit.
pub const MIN_SCORE: f64 = 0.70;

/// A profile matched by a search query.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit<'a> {
    pub profile: &'a MedicationProfile,
    /// Match quality (0.0 - 1.0)
    pub score: f64,
}

/// Rank profiles against a query, best first, ties in catalog order.
pub fn search<'a>(
    profiles: &'a [MedicationProfile],
    query: &str,
    limit: usize,
) -> Vec<SearchHit<'a>> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return Vec::new();
    }

    let mut hits: Vec<SearchHit<'a>> = profiles
        .iter()
        .map(|profile| SearchHit {
            profile,
            score: score_profile(profile, &query),
        })
        .filter(|hit| hit.score >= MIN_SCORE)
        .collect();

    // Stable sort keeps catalog order among equal scores
    hits.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    hits.truncate(limit);
    hits
}

fn score_profile(profile: &MedicationProfile, query: &str) -> f64 {
    let candidates = std::iter::once(profile.name.as_str())
        .chain(std::iter::once(profile.id.as_str()))
        .chain(profile.aliases.iter().map(String::as_str))
        .map(str::to_lowercase);

    let mut best: f64 = 0.0;
    for candidate in candidates {
        if candidate.contains(query) {
            return 1.0;
        }
        best = best.max(fuzzy_match(query, &candidate));
        // Multi-word names: "epinephrine 0.1 mg/ml" should match "epinephrin"
        for word in candidate.split_whitespace() {
            best = best.max(fuzzy_match(query, word));
        }
    }
    best
}

fn fuzzy_match(a: &str, b: &str) -> f64 {
    // Jaro-Winkler favours shared prefixes, Levenshtein overall similarity
    let jw = jaro_winkler(a, b);
    let lev = normalized_levenshtein(a, b);

    jw * 0.6 + lev * 0.4
}
