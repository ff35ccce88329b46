//! Core data types: selections, observations, aggregate results, and the
//! report shape consumed by presentation layers.
//!
//! Character identity throughout the crate is a single `char` in NFC form
//! (see [`crate::extract`]). Character sets use `BTreeSet<char>` so that
//! iteration order, and therefore every rendered report, is deterministic.

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

/// Identifier of a deck within the backing collection.
pub type DeckId = i64;

/// Which note fields a selection draws text from.
///
/// The user-facing form is `"sort"`, `"all"`, or a 1-based field index;
/// [`FieldSpec::parse`] accepts exactly those spellings (plus the legacy
/// `"sortField"` alias) and [`fmt::Display`] round-trips them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldSpec {
    /// Only the sort field (the first field of each note).
    SortField,
    /// Every field of each note.
    AllFields,
    /// A specific field, 1-based.
    FieldIndex(usize),
}

impl FieldSpec {
    /// Parse the user-facing form. Returns `None` for unknown spellings
    /// and for the out-of-contract index `0`.
    pub fn parse(s: &str) -> Option<FieldSpec> {
        match s.trim() {
            "sort" | "sortField" | "sort_field" => Some(FieldSpec::SortField),
            "all" => Some(FieldSpec::AllFields),
            other => match other.parse::<usize>() {
                Ok(n) if n >= 1 => Some(FieldSpec::FieldIndex(n)),
                _ => None,
            },
        }
    }
}

impl fmt::Display for FieldSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldSpec::SortField => write!(f, "sort"),
            FieldSpec::AllFields => write!(f, "all"),
            FieldSpec::FieldIndex(n) => write!(f, "{}", n),
        }
    }
}

impl Serialize for FieldSpec {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A user-chosen scope contributing observations to the aggregate:
/// one deck, one field specifier, and whether subdecks are included.
///
/// Selections are independent inputs to the aggregator. Two selections may
/// target overlapping card sets; overlap is resolved by set union, never by
/// selection-count multiplication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Selection {
    pub deck: DeckId,
    pub fields: FieldSpec,
    pub include_subdecks: bool,
}

impl Selection {
    pub fn new(deck: DeckId, fields: FieldSpec, include_subdecks: bool) -> Self {
        Self {
            deck,
            fields,
            include_subdecks,
        }
    }
}

/// A single raw observation from the deck source: one character seen on one
/// card, with that card's reviewed status. Deduplication and reviewed-in-any
/// merging are the aggregator's job, never the adapter's.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Observation {
    pub ch: char,
    pub reviewed: bool,
}

/// A deck as listed by a [`crate::source::DeckSource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeckInfo {
    pub id: DeckId,
    /// Display name, `::`-separated for nesting.
    pub name: String,
    /// Parent deck, if this is a subdeck.
    pub parent: Option<DeckId>,
}

/// A selection that was dropped under the best-effort failure policy,
/// kept so reports can be clearly labeled as partial.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedSelection {
    pub selection: Selection,
    pub error: String,
}

/// Merged character sets across all contributing selections.
///
/// Invariant: `reviewed ⊆ total`. An empty selection list yields an empty
/// (valid, non-error) result.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AggregateResult {
    /// Every character observed, union across selections.
    pub total: BTreeSet<char>,
    /// Characters observed as reviewed in at least one selection.
    pub reviewed: BTreeSet<char>,
    /// Selections skipped under [`crate::aggregate::FailurePolicy::BestEffort`].
    pub skipped: Vec<SkippedSelection>,
}

impl AggregateResult {
    /// True when at least one selection failed and was skipped, meaning the
    /// result understates the real collection.
    pub fn is_partial(&self) -> bool {
        !self.skipped.is_empty()
    }
}

/// Three disjoint sets whose union is exactly the category's member set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryBreakdown {
    pub category: String,
    /// Category members reviewed at least once.
    pub reviewed: BTreeSet<char>,
    /// Category members present in the decks but never reviewed.
    pub present_unreviewed: BTreeSet<char>,
    /// Category members absent from the selected decks.
    pub absent: BTreeSet<char>,
}

impl CategoryBreakdown {
    /// `reviewed + present_unreviewed`, i.e. members present in the decks.
    pub fn present_count(&self) -> usize {
        self.reviewed.len() + self.present_unreviewed.len()
    }
}

/// One row of the summary table: counts only, for the table/progress view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategorySummary {
    pub name: String,
    /// Members reviewed at least once.
    pub reviewed_count: usize,
    /// Members present in the decks (reviewed or not); excludes absent.
    pub present_count: usize,
    /// Full size of the category's member set.
    pub category_size: usize,
}

/// The structured report consumed by the presentation layer.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    /// Distinct Hanzi observed across all selections.
    pub total: usize,
    /// Distinct Hanzi reviewed at least once.
    pub reviewed: usize,
    /// Per-category summary rows, in catalog registration order.
    pub categories: Vec<CategorySummary>,
    /// Selections dropped under the best-effort policy; non-empty means
    /// the report is partial.
    pub skipped: Vec<SkippedSelection>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_spec_parse_named() {
        assert_eq!(FieldSpec::parse("sort"), Some(FieldSpec::SortField));
        assert_eq!(FieldSpec::parse("sortField"), Some(FieldSpec::SortField));
        assert_eq!(FieldSpec::parse("all"), Some(FieldSpec::AllFields));
    }

    #[test]
    fn field_spec_parse_index() {
        assert_eq!(FieldSpec::parse("1"), Some(FieldSpec::FieldIndex(1)));
        assert_eq!(FieldSpec::parse(" 3 "), Some(FieldSpec::FieldIndex(3)));
        assert_eq!(FieldSpec::parse("0"), None);
        assert_eq!(FieldSpec::parse("front"), None);
        assert_eq!(FieldSpec::parse(""), None);
    }

    #[test]
    fn field_spec_display_round_trips() {
        for spec in [
            FieldSpec::SortField,
            FieldSpec::AllFields,
            FieldSpec::FieldIndex(4),
        ] {
            assert_eq!(FieldSpec::parse(&spec.to_string()), Some(spec));
        }
    }

    #[test]
    fn empty_aggregate_is_valid_and_not_partial() {
        let result = AggregateResult::default();
        assert!(result.total.is_empty());
        assert!(result.reviewed.is_empty());
        assert!(!result.is_partial());
    }
}
