//! Read-only SQLite connection to the collection database.
//!
//! The collection belongs to the flashcard application; this tool is a pure
//! reader. Connections are opened read-only and the file is never created:
//! a missing collection is a configuration error, not something to paper
//! over with an empty database.

use anyhow::{bail, Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

use crate::config::Config;

/// Open a read-only pool on the configured collection database.
///
/// # Errors
///
/// Fails if the collection file does not exist or cannot be opened.
pub async fn connect(config: &Config) -> Result<SqlitePool> {
    let db_path = &config.collection.path;

    if !db_path.exists() {
        bail!("collection database not found: {}", db_path.display());
    }

    let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", db_path.display()))?
        .read_only(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .with_context(|| format!("Failed to open collection: {}", db_path.display()))?;

    Ok(pool)
}
