//! The summary report: total/reviewed Hanzi counts plus the per-category
//! coverage table. Used by `hzs stats`.
//!
//! Human output skips categories whose reference data did not load (size
//! zero); an empty row carries no information there. The JSON output keeps
//! every requested category so downstream consumers see a stable shape.

use anyhow::Result;

use hanzi_stats_core::breakdown::build_report;
use hanzi_stats_core::models::{Report, SkippedSelection};

use crate::config::Config;
use crate::db;
use crate::scan::{report_categories, run_scan, ScanArgs};
use crate::sqlite_source::SqliteDeckSource;

/// Run the stats command.
pub async fn run_stats(config: &Config, args: &ScanArgs, json: bool) -> Result<()> {
    let pool = db::connect(config).await?;
    let source = SqliteDeckSource::new(pool);

    let outcome = run_scan(config, args, &source).await?;
    let categories = report_categories(config, &outcome.catalog);
    let report = build_report(&categories, &outcome.result, &outcome.catalog)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        render_report(config, &report, &outcome.deck_names);
    }

    source.pool().close().await;
    Ok(())
}

fn render_report(
    config: &Config,
    report: &Report,
    deck_names: &std::collections::HashMap<i64, String>,
) {
    let reviewed_pct = percentage(report.reviewed, report.total);

    println!("Hanzi Deck Statistics");
    println!("=====================");
    println!();
    println!("  Collection:   {}", config.collection.path.display());
    println!();
    println!("  Total Hanzi:  {}", report.total);
    println!("  Reviewed:     {} ({:.1}%)", report.reviewed, reviewed_pct);

    let rows: Vec<_> = report
        .categories
        .iter()
        .filter(|c| c.category_size > 0)
        .collect();

    if !rows.is_empty() {
        println!();
        println!(
            "  {:<24} {:>6} {:>9} {:>9}   {}",
            "CATEGORY", "SIZE", "IN DECK", "REVIEWED", "PROGRESS"
        );
        println!("  {}", "-".repeat(68));
        for row in rows {
            let pct = percentage(row.reviewed_count, row.category_size);
            println!(
                "  {:<24} {:>6} {:>9} {:>9}   {:>5.1}%",
                row.name, row.category_size, row.present_count, row.reviewed_count, pct
            );
        }
    } else {
        println!();
        println!("  No category data available (check the [datasets] paths).");
    }

    if !report.skipped.is_empty() {
        println!();
        println!(
            "  WARNING: partial report — {} selection(s) skipped:",
            report.skipped.len()
        );
        for skipped in &report.skipped {
            println!("    - {}", describe_skipped(skipped, deck_names));
        }
    }

    println!();
}

fn describe_skipped(
    skipped: &SkippedSelection,
    deck_names: &std::collections::HashMap<i64, String>,
) -> String {
    let deck = deck_names
        .get(&skipped.selection.deck)
        .cloned()
        .unwrap_or_else(|| format!("deck {}", skipped.selection.deck));
    format!(
        "{} (fields: {}): {}",
        deck, skipped.selection.fields, skipped.error
    )
}

fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage_handles_empty_whole() {
        assert_eq!(percentage(0, 0), 0.0);
        assert_eq!(percentage(1, 4), 25.0);
    }
}
