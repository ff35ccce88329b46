//! Selection resolution and aggregation orchestration.
//!
//! Both `hzs stats` and `hzs detail` run the same pipeline: resolve the
//! requested selections (from CLI flags or the config file) against the
//! collection's deck list, load the reference catalog through the
//! process-wide cache, and aggregate with progress reporting and Ctrl-C
//! cancellation wired up.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Args;
use tracing::warn;

use hanzi_stats_core::aggregate::{
    aggregate, AggregateOptions, CancelToken, FailurePolicy,
};
use hanzi_stats_core::catalog::Catalog;
use hanzi_stats_core::models::{AggregateResult, DeckId, DeckInfo, FieldSpec, Selection};
use hanzi_stats_core::source::DeckSource;

use crate::config::Config;
use crate::progress::ProgressMode;

/// Selection and scan flags shared by `stats` and `detail`.
#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Scan this deck (repeatable). Overrides the configured selections.
    #[arg(long)]
    pub deck: Vec<String>,

    /// Scan every top-level deck, subdecks included.
    #[arg(long, conflicts_with = "deck")]
    pub all_decks: bool,

    /// Field specifier: "sort", "all", or a 1-based field index.
    /// Applies to --deck/--all-decks selections and overrides the
    /// configured `fields` of every selection otherwise.
    #[arg(long)]
    pub fields: Option<String>,

    /// Exclude subdecks for --deck selections.
    #[arg(long)]
    pub no_subdecks: bool,

    /// Abort on the first deck-source failure instead of producing a
    /// labeled partial report.
    #[arg(long)]
    pub fail_fast: bool,

    /// Progress reporting on stderr. Defaults to human when stderr is a
    /// terminal, off otherwise.
    #[arg(long, value_enum)]
    pub progress: Option<ProgressMode>,
}

/// Everything a report renderer needs: the merged sets, the catalog, and
/// deck names for labeling skipped selections.
pub struct ScanOutcome {
    pub result: AggregateResult,
    pub catalog: Arc<Catalog>,
    pub deck_names: HashMap<DeckId, String>,
}

/// Resolve selections and run the aggregation pipeline.
pub async fn run_scan<S: DeckSource + ?Sized>(
    config: &Config,
    args: &ScanArgs,
    source: &S,
) -> Result<ScanOutcome> {
    let decks = source.list_decks().await.context("failed to list decks")?;
    let deck_names: HashMap<DeckId, String> =
        decks.iter().map(|d| (d.id, d.name.clone())).collect();

    let selections = resolve_selections(config, args, &decks)?;
    if selections.is_empty() {
        warn!("no selections configured; the report will be empty");
    }

    let catalog = Catalog::load_cached(&config.datasets.to_paths());

    let policy = if args.fail_fast || config.report.fail_fast {
        FailurePolicy::FailFast
    } else {
        FailurePolicy::BestEffort
    };
    let mode = args.progress.unwrap_or_else(ProgressMode::default_for_tty);
    let reporter = mode.reporter(deck_names.clone());

    // Ctrl-C cancels between selections; a partial scan is never rendered.
    let cancel = CancelToken::new();
    let cancel_on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel_on_signal.cancel();
        }
    });

    let opts = AggregateOptions {
        policy,
        progress: reporter.as_ref(),
        cancel,
    };
    let result = aggregate(&selections, source, &opts)
        .await
        .context("aggregation failed")?;

    Ok(ScanOutcome {
        result,
        catalog,
        deck_names,
    })
}

/// The categories a report covers: the configured subset, or every
/// registered category when none are configured.
pub fn report_categories(config: &Config, catalog: &Catalog) -> Vec<String> {
    if config.report.categories.is_empty() {
        catalog.categories().to_vec()
    } else {
        config.report.categories.clone()
    }
}

/// Build the selection list from CLI flags, falling back to the config.
fn resolve_selections(
    config: &Config,
    args: &ScanArgs,
    decks: &[DeckInfo],
) -> Result<Vec<Selection>> {
    let cli_fields = match &args.fields {
        Some(s) => Some(FieldSpec::parse(s).with_context(|| {
            format!(
                "invalid --fields {:?}: use \"sort\", \"all\", or a 1-based field index",
                s
            )
        })?),
        None => None,
    };

    if args.all_decks {
        let fields = cli_fields.unwrap_or(FieldSpec::SortField);
        return Ok(decks
            .iter()
            .filter(|d| d.parent.is_none())
            .map(|d| Selection::new(d.id, fields, true))
            .collect());
    }

    if !args.deck.is_empty() {
        let fields = cli_fields.unwrap_or(FieldSpec::SortField);
        return args
            .deck
            .iter()
            .map(|name| {
                let deck = find_deck(decks, name)?;
                Ok(Selection::new(deck.id, fields, !args.no_subdecks))
            })
            .collect();
    }

    config
        .selections
        .iter()
        .map(|sel| {
            let deck = find_deck(decks, &sel.deck)?;
            let fields = match cli_fields {
                Some(f) => f,
                None => sel.fields.to_field_spec()?,
            };
            Ok(Selection::new(deck.id, fields, sel.include_subdecks))
        })
        .collect()
}

fn find_deck<'a>(decks: &'a [DeckInfo], name: &str) -> Result<&'a DeckInfo> {
    match decks.iter().find(|d| d.name == name) {
        Some(deck) => Ok(deck),
        None => {
            let known: Vec<&str> = decks.iter().map(|d| d.name.as_str()).collect();
            bail!("unknown deck {:?} (known decks: {})", name, known.join(", "));
        }
    }
}
