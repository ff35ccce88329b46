//! Reference catalog: named character categories and the inverse index.
//!
//! Nineteen categories are always registered, in this order:
//!
//! | Group | Categories |
//! |-------|------------|
//! | HSK 2012 | `HSK (2012) Level 1` … `Level 6` |
//! | HSK 2021 | `HSK (2021) Band 1` … `Band 9` |
//! | Frequency | `Top 500`, `Top 1000`, `Top 1500`, `Top 2000` |
//!
//! Registration is unconditional: a category whose dataset is missing is
//! simply empty, so `categories()` is stable regardless of what loaded.
//! Membership is many-to-many (a character can sit in several HSK levels,
//! a band, and a frequency band at once) and the frequency bands nest by
//! rank threshold (`Top 500 ⊆ Top 1000 ⊆ …`).
//!
//! A [`Catalog`] is constructed once and is immutable afterwards; concurrent
//! reads need no synchronization. [`Catalog::load_cached`] additionally
//! memoizes construction per dataset identity (a SHA-256 digest over the
//! dataset files), so repeated loads of the same data never re-parse.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex};

use once_cell::sync::Lazy;
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::dataset::{self, DatasetPaths, ReferenceTables};

/// Frequency band thresholds: a rank `r` belongs to every band with
/// `r <= threshold`.
const FREQUENCY_BANDS: [(u32, &str); 4] = [
    (500, "Top 500"),
    (1000, "Top 1000"),
    (1500, "Top 1500"),
    (2000, "Top 2000"),
];

/// Errors surfaced by catalog lookups.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    /// The requested category name is not registered. Callers should take
    /// names from [`Catalog::categories`] rather than construct them.
    #[error("unknown category: {0}")]
    CategoryNotFound(String),
}

/// Immutable character categorization data.
pub struct Catalog {
    /// Category names in registration order (the display order).
    names: Vec<String>,
    members: HashMap<String, BTreeSet<char>>,
    /// Inverse index: character → category names, registration-ordered.
    by_char: HashMap<char, Vec<String>>,
}

impl Catalog {
    /// Build a catalog from the configured dataset files.
    ///
    /// Dataset failures degrade to empty categories (see [`crate::dataset`]);
    /// construction itself never fails.
    pub fn load(paths: &DatasetPaths) -> Catalog {
        Self::from_tables(dataset::load_tables(paths))
    }

    /// Build a catalog directly from parsed tables. Exposed for embedders
    /// and tests that synthesize reference data in memory.
    pub fn from_tables(tables: ReferenceTables) -> Catalog {
        let mut names: Vec<String> = Vec::new();
        let mut members: HashMap<String, BTreeSet<char>> = HashMap::new();

        let mut register = |name: String| {
            members.entry(name.clone()).or_default();
            names.push(name);
        };
        for level in 1..=6u8 {
            register(hsk2012_category(level));
        }
        for band in 1..=9u8 {
            register(hsk2021_category(band));
        }
        for (_, name) in FREQUENCY_BANDS {
            register(name.to_string());
        }

        for (ch, level) in &tables.hsk2012 {
            if let Some(set) = members.get_mut(&hsk2012_category(*level)) {
                set.insert(*ch);
            }
        }
        for (ch, band) in &tables.hsk2021 {
            if let Some(set) = members.get_mut(&hsk2021_category(*band)) {
                set.insert(*ch);
            }
        }
        for (ch, rank) in &tables.frequency {
            for (threshold, name) in FREQUENCY_BANDS {
                if *rank <= threshold {
                    if let Some(set) = members.get_mut(name) {
                        set.insert(*ch);
                    }
                }
            }
        }

        let mut by_char: HashMap<char, Vec<String>> = HashMap::new();
        for name in &names {
            for ch in &members[name] {
                by_char.entry(*ch).or_default().push(name.clone());
            }
        }

        Catalog {
            names,
            members,
            by_char,
        }
    }

    /// Load through the process-wide cache. Two calls with identical dataset
    /// contents share one parsed catalog; changed file contents produce a new
    /// identity and a fresh load.
    pub fn load_cached(paths: &DatasetPaths) -> Arc<Catalog> {
        static CACHE: Lazy<Mutex<HashMap<String, Arc<Catalog>>>> =
            Lazy::new(|| Mutex::new(HashMap::new()));

        let identity = dataset_identity(paths);
        let mut cache = CACHE.lock().unwrap();
        cache
            .entry(identity)
            .or_insert_with(|| Arc::new(Catalog::load(paths)))
            .clone()
    }

    /// All registered category names, in display order.
    pub fn categories(&self) -> &[String] {
        &self.names
    }

    /// Member set of a category.
    pub fn members_of(&self, name: &str) -> Result<&BTreeSet<char>, CatalogError> {
        self.members
            .get(name)
            .ok_or_else(|| CatalogError::CategoryNotFound(name.to_string()))
    }

    /// Member count of a category.
    pub fn size_of(&self, name: &str) -> Result<usize, CatalogError> {
        self.members_of(name).map(BTreeSet::len)
    }

    /// Every category `ch` belongs to, in display order. Characters outside
    /// all reference lists yield an empty slice.
    pub fn categories_of(&self, ch: char) -> &[String] {
        self.by_char.get(&ch).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Display name for an HSK 2012 level category.
pub fn hsk2012_category(level: u8) -> String {
    format!("HSK (2012) Level {}", level)
}

/// Display name for an HSK 2021 band category.
pub fn hsk2021_category(band: u8) -> String {
    format!("HSK (2021) Band {}", band)
}

/// Cache key for a dataset configuration: a digest over each configured
/// file's contents. Unreadable files hash as absent, which matches the
/// loader treating them as empty.
fn dataset_identity(paths: &DatasetPaths) -> String {
    let mut hasher = Sha256::new();
    for (tag, path) in [
        ("hsk2012", &paths.hsk2012),
        ("hsk2021", &paths.hsk2021),
        ("frequency", &paths.frequency),
    ] {
        hasher.update(tag.as_bytes());
        match path.as_ref().and_then(|p| std::fs::read(p).ok()) {
            Some(bytes) => {
                hasher.update([1u8]);
                hasher.update(&bytes);
            }
            None => hasher.update([0u8]),
        }
    }
    format!("{:x}", hasher.finalize())
}
