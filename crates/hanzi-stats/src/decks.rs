//! Deck listing and health overview.
//!
//! Gives a quick summary of what the collection contains before picking
//! selections: per-deck active card counts and how recently each deck was
//! reviewed. Used by `hzs decks`.

use std::collections::HashMap;

use anyhow::Result;
use sqlx::Row;

use hanzi_stats_core::source::DeckSource;

use crate::config::Config;
use crate::db;
use crate::sqlite_source::SqliteDeckSource;

/// Run the decks command: list decks with counts and last-review age.
pub async fn run_decks(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;
    let source = SqliteDeckSource::new(pool);

    let decks = source.list_decks().await?;

    // Active (non-suspended) card counts per deck.
    let count_rows = sqlx::query(
        "SELECT did, COUNT(*) AS card_count FROM cards WHERE queue >= 0 GROUP BY did",
    )
    .fetch_all(source.pool())
    .await?;
    let counts: HashMap<i64, i64> = count_rows
        .iter()
        .map(|row| (row.get("did"), row.get("card_count")))
        .collect();

    // Most recent review per deck; revlog ids are epoch milliseconds.
    let review_rows = sqlx::query(
        "SELECT cards.did AS did, MAX(revlog.id) AS last_review \
         FROM revlog INNER JOIN cards ON cards.id = revlog.cid \
         GROUP BY cards.did",
    )
    .fetch_all(source.pool())
    .await?;
    let last_reviews: HashMap<i64, i64> = review_rows
        .iter()
        .map(|row| (row.get("did"), row.get("last_review")))
        .collect();

    println!("Hanzi Stats — Decks");
    println!("===================");
    println!();
    println!("  Collection:  {}", config.collection.path.display());
    println!();
    println!("  {:<36} {:>7}   {}", "DECK", "CARDS", "LAST REVIEW");
    println!("  {}", "-".repeat(64));

    for deck in &decks {
        let cards = counts.get(&deck.id).copied().unwrap_or(0);
        let review_display = match last_reviews.get(&deck.id) {
            Some(ms) => format_ts_relative(ms / 1000),
            None => "never".to_string(),
        };
        println!("  {:<36} {:>7}   {}", deck.name, cards, review_display);
    }

    println!();
    source.pool().close().await;
    Ok(())
}

/// Format a Unix timestamp as a relative time string (e.g. "3 hours ago").
fn format_ts_relative(ts: i64) -> String {
    let now = chrono::Utc::now().timestamp();
    let delta = now - ts;

    if delta < 0 {
        return format_ts_iso(ts);
    }

    if delta < 60 {
        "just now".to_string()
    } else if delta < 3600 {
        let mins = delta / 60;
        format!("{} min{} ago", mins, if mins == 1 { "" } else { "s" })
    } else if delta < 86400 {
        let hours = delta / 3600;
        format!("{} hour{} ago", hours, if hours == 1 { "" } else { "s" })
    } else if delta < 86400 * 30 {
        let days = delta / 86400;
        format!("{} day{} ago", days, if days == 1 { "" } else { "s" })
    } else {
        format_ts_iso(ts)
    }
}

fn format_ts_iso(ts: i64) -> String {
    chrono::DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| ts.to_string())
}
