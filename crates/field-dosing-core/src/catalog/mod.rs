//! Static medication catalog.
//!
//! Loaded once at start-up and read-only afterwards. Every record is converted
//! and validated during load, so any profile handed out by a [`Catalog`]
//! satisfies the calculator's preconditions.

mod normalizer;
mod record;
mod search;

pub use normalizer::*;
pub use record::*;
pub use search::*;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::config::CATALOG_PATH_ENV;
use crate::models::{MedicationProfile, PatientType, ProfileError};

/// Reference catalog compiled into the library.
const BUNDLED_CATALOG: &str = include_str!("../../data/catalog.json");

/// Catalog errors.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("failed to read catalog {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid profile {id}: {source}")]
    InvalidProfile {
        id: String,
        #[source]
        source: ProfileError,
    },

    #[error("duplicate medication id: {0}")]
    DuplicateId(String),
}

pub type CatalogResult<T> = Result<T, CatalogError>;

/// Ordered, validated collection of medication profiles.
#[derive(Debug, Clone)]
pub struct Catalog {
    version: String,
    profiles: Vec<MedicationProfile>,
    index: HashMap<String, usize>,
    fingerprint: String,
}

/// Serialized form hashed by [`Catalog::fingerprint`].
#[derive(Serialize)]
struct CanonicalCatalog<'a> {
    version: &'a str,
    profiles: &'a [MedicationProfile],
}

impl Catalog {
    /// Build a catalog from already-constructed profiles.
    pub fn from_profiles(
        version: impl Into<String>,
        profiles: Vec<MedicationProfile>,
    ) -> CatalogResult<Self> {
        let version = version.into();
        let mut index = HashMap::with_capacity(profiles.len());

        for (position, profile) in profiles.iter().enumerate() {
            profile
                .validate()
                .map_err(|source| CatalogError::InvalidProfile {
                    id: profile.id.clone(),
                    source,
                })?;
            if index.insert(profile.id.clone(), position).is_some() {
                return Err(CatalogError::DuplicateId(profile.id.clone()));
            }
        }

        let canonical = serde_json::to_vec(&CanonicalCatalog {
            version: &version,
            profiles: &profiles,
        })?;
        let fingerprint = hex::encode(Sha256::digest(&canonical));

        tracing::info!(
            version = %version,
            profiles = profiles.len(),
            fingerprint = %fingerprint,
            "medication catalog loaded"
        );

        Ok(Self {
            version,
            profiles,
            index,
            fingerprint,
        })
    }

    /// Parse a catalog file.
    pub fn from_json(json: &str) -> CatalogResult<Self> {
        Self::from_json_with(json, &Normalizer::new())
    }

    /// Parse a catalog file, resolving unit and route spellings with `normalizer`.
    pub fn from_json_with(json: &str, normalizer: &Normalizer) -> CatalogResult<Self> {
        let file: CatalogFile = serde_json::from_str(json)?;

        let profiles = file
            .medications
            .into_iter()
            .map(|record| {
                let id = record.id.clone();
                record
                    .into_profile(normalizer)
                    .map_err(|source| CatalogError::InvalidProfile { id, source })
            })
            .collect::<CatalogResult<Vec<_>>>()?;

        Self::from_profiles(file.version, profiles)
    }

    /// Read and parse a catalog file from disk.
    pub fn from_path<P: AsRef<Path>>(path: P) -> CatalogResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// The reference catalog shipped with the library.
    pub fn bundled() -> CatalogResult<Self> {
        Self::from_json(BUNDLED_CATALOG)
    }

    /// Load `path` if given, otherwise the bundled catalog.
    pub fn load(path: Option<&Path>) -> CatalogResult<Self> {
        match path {
            Some(path) => Self::from_path(path),
            None => Self::bundled(),
        }
    }

    /// Load the file named by `FIELD_DOSING_CATALOG`, or the bundled catalog.
    pub fn from_env_or_bundled() -> CatalogResult<Self> {
        let path = std::env::var_os(CATALOG_PATH_ENV).map(PathBuf::from);
        Self::load(path.as_deref())
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Hex SHA-256 of the canonical catalog contents.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// All profiles in catalog order.
    pub fn profiles(&self) -> &[MedicationProfile] {
        &self.profiles
    }

    pub fn get(&self, id: &str) -> Option<&MedicationProfile> {
        self.index.get(id).map(|&position| &self.profiles[position])
    }

    /// Profiles for one patient type, in catalog order.
    pub fn for_patient_type(
        &self,
        patient_type: PatientType,
    ) -> impl Iterator<Item = &MedicationProfile> {
        self.profiles
            .iter()
            .filter(move |p| p.patient_type == patient_type)
    }

    /// Search by name, id, or alias.
    pub fn search(&self, query: &str, limit: usize) -> Vec<SearchHit<'_>> {
        search::search(&self.profiles, query, limit)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}
