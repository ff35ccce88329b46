//! # Hanzi Stats CLI (`hzs`)
//!
//! The `hzs` binary reports Hanzi coverage statistics for a flashcard
//! collection: which characters the selected decks contain, which have been
//! reviewed, and how that maps onto HSK levels/bands and frequency bands.
//!
//! ## Usage
//!
//! ```bash
//! hzs --config ./config/hanzi.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `hzs decks` | List decks with card counts and last-review age |
//! | `hzs fields <deck>` | List a deck's note fields with their indices |
//! | `hzs stats` | Summary report for the configured selections |
//! | `hzs detail <category>` | Per-character partition of one category |
//!
//! ## Examples
//!
//! ```bash
//! # What does the collection contain?
//! hzs decks
//!
//! # Report over the selections in the config file
//! hzs stats
//!
//! # Ad-hoc report over one deck, all fields, as JSON
//! hzs stats --deck "Chinese" --fields all --json
//!
//! # Which Band 1 characters are still untouched?
//! hzs detail "HSK (2021) Band 1"
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use hanzi_stats::scan::ScanArgs;
use hanzi_stats::{config, decks, detail, fields, stats};

/// Hanzi Stats CLI: Hanzi coverage statistics for flashcard collections.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/hanzi.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "hzs",
    about = "Hanzi Stats — Hanzi coverage statistics for flashcard collections",
    version,
    long_about = "Hanzi Stats scans the decks of a flashcard collection, extracts the Chinese \
    characters appearing in user-selected decks and fields, tracks which of them have been \
    reviewed, and cross-references the result with HSK and frequency reference lists. \
    Strictly read-only: it never modifies study data."
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/hanzi.toml`. The collection path, dataset
    /// paths, report policy, and selections are read from this file.
    #[arg(long, global = true, default_value = "./config/hanzi.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// List decks with card counts and last-review age.
    ///
    /// Useful for checking what the collection contains before configuring
    /// selections.
    Decks,

    /// List a deck's note fields with their 1-based indices.
    ///
    /// The printed indices are exactly what `--fields <index>` and the
    /// `fields` key of a `[[selection]]` expect. The first field is the
    /// sort field.
    Fields {
        /// Deck display name, `::`-separated for subdecks.
        deck: String,
    },

    /// Compute and print the summary report.
    ///
    /// Scans the configured selections (or the decks given with `--deck` /
    /// `--all-decks`), merges their characters, and prints total/reviewed
    /// counts plus the per-category coverage table. Failed selections are
    /// skipped and labeled unless `--fail-fast` is set.
    Stats {
        #[command(flatten)]
        scan: ScanArgs,

        /// Emit the report as JSON on stdout instead of tables.
        #[arg(long)]
        json: bool,
    },

    /// Show the per-character partition of one category.
    ///
    /// Prints the category's characters in three groups: reviewed, in deck
    /// but unreviewed, and not in the selected decks at all. The category
    /// name must be one of the names shown by `hzs stats`.
    Detail {
        /// Category name, e.g. "HSK (2021) Band 1" or "Top 500".
        category: String,

        #[command(flatten)]
        scan: ScanArgs,

        /// Emit the three character sets as JSON on stdout.
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Decks => decks::run_decks(&config).await,
        Commands::Fields { deck } => fields::run_fields(&config, &deck).await,
        Commands::Stats { scan, json } => stats::run_stats(&config, &scan, json).await,
        Commands::Detail {
            category,
            scan,
            json,
        } => detail::run_detail(&config, &category, &scan, json).await,
    }
}
