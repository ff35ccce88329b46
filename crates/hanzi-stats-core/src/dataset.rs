//! Reference dataset loaders.
//!
//! Three static CSV tables feed the catalog:
//!
//! | Table | Columns | Produces |
//! |-------|---------|----------|
//! | HSK 2012 | `hanzi,level` | character → level 1–6 rows |
//! | HSK 2021 | `Hanzi,Level,Traditional` | character → band 1–9 rows |
//! | Frequency | `simplified,traditional,frequency_junda` | character → rank |
//!
//! Loading degrades gracefully: a missing or malformed file empties only its
//! own table (a `tracing` warning is emitted), so a broken frequency file
//! never takes the HSK categories down with it. Malformed rows are skipped
//! individually. Nothing here is ever fatal.
//!
//! The HSK 2021 dataset labels its top band `7-9`; those members are loaded
//! as band 7. Traditional variants distinct from the simplified form are
//! indexed at the same level/band/rank as their simplified counterpart.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::warn;

use crate::extract;

/// Paths to the reference tables. Each is optional; an absent path simply
/// yields empty categories for that table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatasetPaths {
    pub hsk2012: Option<PathBuf>,
    pub hsk2021: Option<PathBuf>,
    pub frequency: Option<PathBuf>,
}

/// Raw rows parsed out of the reference tables, before category building.
#[derive(Debug, Default)]
pub struct ReferenceTables {
    /// (character, HSK 2012 level 1–6). Many-to-many: a character may
    /// legitimately appear on several rows.
    pub hsk2012: Vec<(char, u8)>,
    /// (character, HSK 2021 band 1–9).
    pub hsk2021: Vec<(char, u8)>,
    /// Character → frequency rank. The smallest rank wins on duplicates.
    pub frequency: HashMap<char, u32>,
}

#[derive(Debug, Deserialize)]
struct Hsk2012Row {
    hanzi: String,
    level: String,
}

#[derive(Debug, Deserialize)]
struct Hsk2021Row {
    #[serde(rename = "Hanzi")]
    hanzi: String,
    #[serde(rename = "Level")]
    level: String,
    #[serde(rename = "Traditional", default)]
    traditional: String,
}

#[derive(Debug, Deserialize)]
struct FrequencyRow {
    #[serde(default)]
    simplified: String,
    #[serde(default)]
    traditional: String,
    #[serde(default)]
    frequency_junda: String,
}

/// Load all configured tables. Per-table failures are logged and produce
/// empty tables; this function itself cannot fail.
pub fn load_tables(paths: &DatasetPaths) -> ReferenceTables {
    let mut tables = ReferenceTables::default();

    if let Some(path) = &paths.hsk2012 {
        match load_hsk2012(path) {
            Ok(rows) => tables.hsk2012 = rows,
            Err(e) => warn!(path = %path.display(), error = %e, "HSK 2012 table unavailable"),
        }
    }
    if let Some(path) = &paths.hsk2021 {
        match load_hsk2021(path) {
            Ok(rows) => tables.hsk2021 = rows,
            Err(e) => warn!(path = %path.display(), error = %e, "HSK 2021 table unavailable"),
        }
    }
    if let Some(path) = &paths.frequency {
        match load_frequency(path) {
            Ok(map) => tables.frequency = map,
            Err(e) => warn!(path = %path.display(), error = %e, "frequency table unavailable"),
        }
    }

    tables
}

/// Interpret a dataset cell as a single NFC character. Multi-character or
/// empty cells are malformed and skipped by the callers.
fn single_char(cell: &str) -> Option<char> {
    let normalized: String = extract::extract(cell.trim()).into_iter().collect();
    let mut chars = normalized.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

fn load_hsk2012(path: &Path) -> anyhow::Result<Vec<(char, u8)>> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
    let mut rows = Vec::new();
    for record in reader.deserialize::<Hsk2012Row>() {
        let row = match record {
            Ok(row) => row,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "skipping malformed HSK 2012 row");
                continue;
            }
        };
        let (Some(ch), Ok(level)) = (single_char(&row.hanzi), row.level.trim().parse::<u8>())
        else {
            continue;
        };
        if (1..=6).contains(&level) {
            rows.push((ch, level));
        }
    }
    Ok(rows)
}

fn load_hsk2021(path: &Path) -> anyhow::Result<Vec<(char, u8)>> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
    let mut rows = Vec::new();
    for record in reader.deserialize::<Hsk2021Row>() {
        let row = match record {
            Ok(row) => row,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "skipping malformed HSK 2021 row");
                continue;
            }
        };
        // The advanced bands are published as a single "7-9" group.
        let band = match row.level.trim() {
            "7-9" => 7,
            other => match other.parse::<u8>() {
                Ok(b) if (1..=9).contains(&b) => b,
                _ => continue,
            },
        };
        let Some(ch) = single_char(&row.hanzi) else {
            continue;
        };
        rows.push((ch, band));
        if let Some(trad) = single_char(&row.traditional) {
            if trad != ch {
                rows.push((trad, band));
            }
        }
    }
    Ok(rows)
}

fn load_frequency(path: &Path) -> anyhow::Result<HashMap<char, u32>> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
    let mut map: HashMap<char, u32> = HashMap::new();
    for record in reader.deserialize::<FrequencyRow>() {
        let row = match record {
            Ok(row) => row,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "skipping malformed frequency row");
                continue;
            }
        };
        let Ok(rank) = row.frequency_junda.trim().parse::<u32>() else {
            continue;
        };
        let mut insert = |ch: char| {
            map.entry(ch)
                .and_modify(|r| *r = (*r).min(rank))
                .or_insert(rank);
        };
        let simp = single_char(&row.simplified);
        if let Some(ch) = simp {
            insert(ch);
        }
        if let Some(trad) = single_char(&row.traditional) {
            if simp != Some(trad) {
                insert(trad);
            }
        }
    }
    Ok(map)
}
