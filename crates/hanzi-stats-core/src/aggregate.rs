//! Selection aggregation: merge per-selection observations into the
//! deduplicated Total/Reviewed character sets.
//!
//! # Semantics
//!
//! - `total` is the union of every character observed across all
//!   selections, regardless of reviewed status.
//! - `reviewed` is the union of characters marked reviewed in at least one
//!   contributing selection: reviewed-in-any wins, and a character observed
//!   through several selections still counts once.
//! - Zero selections is a valid input and yields the empty result.
//! - The result is independent of selection order, and `reviewed ⊆ total`
//!   holds for every result produced.
//!
//! Aggregation is a pure function of the selection list plus the live
//! source; no incremental state is kept between calls. Callers triggering
//! rapid refreshes are responsible for serializing or debouncing them;
//! the core assumes at most one in-flight aggregation per report.
//!
//! # Failure policy
//!
//! The only real failure surface is the deck source. Under
//! [`FailurePolicy::FailFast`] the first source error aborts the whole
//! aggregation; under [`FailurePolicy::BestEffort`] the failed selection is
//! recorded in [`AggregateResult::skipped`] and the scan continues, so the
//! caller can render a clearly labeled partial report instead of nothing.
//!
//! # Progress and cancellation
//!
//! A source scan may be slow. Progress is reported per selection through
//! [`ScanProgress`], and a [`CancelToken`] is checked between selections.
//! Coarse-grained cancellation is sufficient; mid-selection cancellation is
//! not attempted.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use thiserror::Error;

use crate::models::{AggregateResult, Selection, SkippedSelection};
use crate::source::DeckSource;

/// What to do when the deck source fails for one selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Propagate the first source error; no partial result.
    FailFast,
    /// Skip the failed selection, record it, and keep scanning.
    BestEffort,
}

/// Errors from [`aggregate`].
#[derive(Debug, Error)]
pub enum AggregateError {
    /// The cancel token was triggered between selections.
    #[error("aggregation cancelled")]
    Cancelled,
    /// A selection's source query failed under [`FailurePolicy::FailFast`].
    #[error("deck source failed for deck {deck}: {error:#}")]
    Source { deck: i64, error: anyhow::Error },
}

/// Cooperative cancellation flag, checked at selection boundaries.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// Receives scan progress at "selections completed / total" granularity.
/// Implementations write to stderr or a UI; they must not block for long.
pub trait ScanProgress: Send + Sync {
    /// Selection `n` of `total` (1-based) is about to be scanned.
    fn selection_started(&self, n: usize, total: usize, selection: &Selection) {
        let _ = (n, total, selection);
    }

    /// Selection `n` of `total` finished (scanned or skipped).
    fn selection_finished(&self, n: usize, total: usize) {
        let _ = (n, total);
    }
}

/// No-op reporter for callers that don't surface progress.
pub struct NoProgress;

impl ScanProgress for NoProgress {}

/// Aggregation knobs. `Default` is best-effort, silent, non-cancellable.
pub struct AggregateOptions<'a> {
    pub policy: FailurePolicy,
    pub progress: &'a dyn ScanProgress,
    pub cancel: CancelToken,
}

impl Default for AggregateOptions<'_> {
    fn default() -> Self {
        Self {
            policy: FailurePolicy::BestEffort,
            progress: &NoProgress,
            cancel: CancelToken::new(),
        }
    }
}

/// Merge the observations of every selection into one [`AggregateResult`].
pub async fn aggregate<S: DeckSource + ?Sized>(
    selections: &[Selection],
    source: &S,
    opts: &AggregateOptions<'_>,
) -> Result<AggregateResult, AggregateError> {
    let total_selections = selections.len();
    let mut result = AggregateResult::default();

    for (i, selection) in selections.iter().enumerate() {
        if opts.cancel.is_cancelled() {
            return Err(AggregateError::Cancelled);
        }
        opts.progress
            .selection_started(i + 1, total_selections, selection);

        match source.observe(selection).await {
            Ok(observations) => {
                for obs in observations {
                    result.total.insert(obs.ch);
                    if obs.reviewed {
                        result.reviewed.insert(obs.ch);
                    }
                }
            }
            Err(e) => match opts.policy {
                FailurePolicy::FailFast => {
                    return Err(AggregateError::Source {
                        deck: selection.deck,
                        error: e,
                    });
                }
                FailurePolicy::BestEffort => {
                    result.skipped.push(SkippedSelection {
                        selection: selection.clone(),
                        error: format!("{:#}", e),
                    });
                }
            },
        }

        opts.progress.selection_finished(i + 1, total_selections);
    }

    debug_assert!(result.reviewed.is_subset(&result.total));
    Ok(result)
}
