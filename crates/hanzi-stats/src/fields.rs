//! Field listing for a deck. Used by `hzs fields` so users can pick a
//! 1-based field index for their selections.

use anyhow::{bail, Result};

use hanzi_stats_core::source::DeckSource;

use crate::config::Config;
use crate::db;
use crate::sqlite_source::SqliteDeckSource;

/// Run the fields command: print the field names of `deck_name`, numbered
/// the way `--fields <index>` expects them.
pub async fn run_fields(config: &Config, deck_name: &str) -> Result<()> {
    let pool = db::connect(config).await?;
    let source = SqliteDeckSource::new(pool);

    let decks = source.list_decks().await?;
    let Some(deck) = decks.iter().find(|d| d.name == deck_name) else {
        let known: Vec<&str> = decks.iter().map(|d| d.name.as_str()).collect();
        bail!(
            "unknown deck {:?} (known decks: {})",
            deck_name,
            known.join(", ")
        );
    };

    let names = source.field_names(deck.id).await?;
    if names.is_empty() {
        println!("No fields found for {} (deck has no notes?)", deck.name);
        return Ok(());
    }

    println!("Fields of {}:", deck.name);
    for (i, name) in names.iter().enumerate() {
        let marker = if i == 0 { "  (sort field)" } else { "" };
        println!("  {:>2}  {}{}", i + 1, name, marker);
    }

    source.pool().close().await;
    Ok(())
}
