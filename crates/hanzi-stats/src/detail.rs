//! Per-character category detail: the reviewed / in-deck-unreviewed /
//! not-in-deck partition of one category. Used by `hzs detail`.

use anyhow::{Context, Result};

use hanzi_stats_core::breakdown::breakdown;
use hanzi_stats_core::models::CategoryBreakdown;

use crate::config::Config;
use crate::db;
use crate::scan::{run_scan, ScanArgs};
use crate::sqlite_source::SqliteDeckSource;

/// Characters per line in the human rendering.
const CHARS_PER_LINE: usize = 20;

/// Run the detail command for one category.
pub async fn run_detail(
    config: &Config,
    category: &str,
    args: &ScanArgs,
    json: bool,
) -> Result<()> {
    let pool = db::connect(config).await?;
    let source = SqliteDeckSource::new(pool);

    let outcome = run_scan(config, args, &source).await?;
    let detail = breakdown(category, &outcome.result, &outcome.catalog)
        .context("run `hzs stats` to see the registered category names")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&detail)?);
    } else {
        render_detail(&detail);
        if outcome.result.is_partial() {
            println!(
                "  WARNING: partial report — {} selection(s) skipped.",
                outcome.result.skipped.len()
            );
            println!();
        }
    }

    source.pool().close().await;
    Ok(())
}

fn render_detail(detail: &CategoryBreakdown) {
    let size =
        detail.reviewed.len() + detail.present_unreviewed.len() + detail.absent.len();

    println!("{} — {} characters", detail.category, size);
    println!();
    print_section("Reviewed", detail.reviewed.iter());
    print_section("In deck, unreviewed", detail.present_unreviewed.iter());
    print_section("Not in deck", detail.absent.iter());
}

fn print_section<'a>(label: &str, chars: impl ExactSizeIterator<Item = &'a char>) {
    println!("  {} ({}):", label, chars.len());
    if chars.len() == 0 {
        println!("    (none)");
    } else {
        for line in wrap_chars(chars, CHARS_PER_LINE) {
            println!("    {}", line);
        }
    }
    println!();
}

fn wrap_chars<'a>(
    chars: impl Iterator<Item = &'a char>,
    per_line: usize,
) -> Vec<String> {
    let all: Vec<char> = chars.copied().collect();
    all.chunks(per_line)
        .map(|chunk| {
            chunk
                .iter()
                .map(char::to_string)
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrapping() {
        let chars = ['一', '二', '三', '四', '五'];
        let lines = wrap_chars(chars.iter(), 2);
        assert_eq!(lines, vec!["一 二", "三 四", "五"]);
        assert!(wrap_chars(std::iter::empty::<&char>(), 2).is_empty());
    }
}
