use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use hanzi_stats_core::dataset::DatasetPaths;
use hanzi_stats_core::models::FieldSpec;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub collection: CollectionConfig,
    #[serde(default)]
    pub datasets: DatasetsConfig,
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default, rename = "selection")]
    pub selections: Vec<SelectionConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CollectionConfig {
    /// Path to the collection database. Opened read-only.
    pub path: PathBuf,
}

/// Reference dataset files. Each is optional; missing entries just leave
/// the corresponding categories empty.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct DatasetsConfig {
    pub hsk2012: Option<PathBuf>,
    pub hsk2021: Option<PathBuf>,
    pub frequency: Option<PathBuf>,
}

impl DatasetsConfig {
    pub fn to_paths(&self) -> DatasetPaths {
        DatasetPaths {
            hsk2012: self.hsk2012.clone(),
            hsk2021: self.hsk2021.clone(),
            frequency: self.frequency.clone(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ReportConfig {
    /// Abort the whole report on the first deck-source failure instead of
    /// producing a labeled partial report.
    #[serde(default)]
    pub fail_fast: bool,
    /// Categories to include, in order. Empty means every registered
    /// category.
    #[serde(default)]
    pub categories: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SelectionConfig {
    /// Deck display name, `::`-separated for subdecks.
    pub deck: String,
    #[serde(default = "default_fields")]
    pub fields: FieldSpecConfig,
    #[serde(default = "default_include_subdecks")]
    pub include_subdecks: bool,
}

fn default_fields() -> FieldSpecConfig {
    FieldSpecConfig::Named("sort".to_string())
}

fn default_include_subdecks() -> bool {
    true
}

/// The TOML form of a field specifier: `"sort"`, `"all"`, or a 1-based
/// field index (as an integer or a digit string).
#[derive(Debug, Deserialize, Clone)]
#[serde(untagged)]
pub enum FieldSpecConfig {
    Index(usize),
    Named(String),
}

impl FieldSpecConfig {
    pub fn to_field_spec(&self) -> Result<FieldSpec> {
        let parsed = match self {
            FieldSpecConfig::Index(n) => FieldSpec::parse(&n.to_string()),
            FieldSpecConfig::Named(s) => FieldSpec::parse(s),
        };
        match parsed {
            Some(spec) => Ok(spec),
            None => bail!(
                "invalid field specifier {:?}: use \"sort\", \"all\", or a 1-based field index",
                self
            ),
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &Config) -> Result<()> {
    if config.collection.path.as_os_str().is_empty() {
        bail!("collection.path must not be empty");
    }
    for selection in &config.selections {
        if selection.deck.trim().is_empty() {
            bail!("selection.deck must not be empty");
        }
        selection
            .fields
            .to_field_spec()
            .with_context(|| format!("in selection for deck {:?}", selection.deck))?;
    }
    Ok(())
}
