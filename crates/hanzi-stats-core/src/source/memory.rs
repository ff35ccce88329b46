//! In-memory [`DeckSource`] implementation for tests and embedders.
//!
//! Decks and cards are plain vectors built up front; the source is then
//! read-only, like every `DeckSource`. Error injection via
//! [`MemorySource::fail_deck`] lets tests exercise the aggregator's
//! failure policies without a real store.

use std::collections::BTreeSet;

use anyhow::{bail, Result};
use async_trait::async_trait;

use crate::extract;
use crate::models::{DeckId, DeckInfo, Observation, Selection};

use super::DeckSource;

/// A card fixture: its note's fields, review status, and queue status.
#[derive(Debug, Clone)]
pub struct MemoryCard {
    pub fields: Vec<String>,
    /// Whether the card has review history.
    pub reviewed: bool,
    /// Suspended/buried cards are skipped by `observe`.
    pub suspended: bool,
}

impl MemoryCard {
    pub fn new(fields: &[&str], reviewed: bool) -> Self {
        Self {
            fields: fields.iter().map(|s| s.to_string()).collect(),
            reviewed,
            suspended: false,
        }
    }

    pub fn suspended(fields: &[&str]) -> Self {
        Self {
            fields: fields.iter().map(|s| s.to_string()).collect(),
            reviewed: false,
            suspended: true,
        }
    }
}

struct MemoryDeck {
    info: DeckInfo,
    field_names: Vec<String>,
    cards: Vec<MemoryCard>,
}

/// In-memory deck store.
#[derive(Default)]
pub struct MemorySource {
    decks: Vec<MemoryDeck>,
    fail_decks: BTreeSet<DeckId>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a deck. `parent` links subdecks for `include_subdecks` scoping.
    pub fn add_deck(
        &mut self,
        id: DeckId,
        name: &str,
        parent: Option<DeckId>,
        field_names: &[&str],
        cards: Vec<MemoryCard>,
    ) {
        self.decks.push(MemoryDeck {
            info: DeckInfo {
                id,
                name: name.to_string(),
                parent,
            },
            field_names: field_names.iter().map(|s| s.to_string()).collect(),
            cards,
        });
    }

    /// Make `observe` fail for selections targeting `id`, simulating an
    /// unavailable backing store.
    pub fn fail_deck(&mut self, id: DeckId) {
        self.fail_decks.insert(id);
    }

    /// The selected deck plus, when requested, its transitive subdecks.
    fn scope(&self, selection: &Selection) -> Vec<DeckId> {
        let mut ids = vec![selection.deck];
        if selection.include_subdecks {
            // Parent links form a forest; collect the whole subtree.
            let mut frontier = vec![selection.deck];
            while let Some(current) = frontier.pop() {
                for deck in &self.decks {
                    if deck.info.parent == Some(current) {
                        ids.push(deck.info.id);
                        frontier.push(deck.info.id);
                    }
                }
            }
        }
        ids
    }
}

#[async_trait]
impl DeckSource for MemorySource {
    async fn list_decks(&self) -> Result<Vec<DeckInfo>> {
        Ok(self.decks.iter().map(|d| d.info.clone()).collect())
    }

    async fn field_names(&self, deck: DeckId) -> Result<Vec<String>> {
        match self.decks.iter().find(|d| d.info.id == deck) {
            Some(d) => Ok(d.field_names.clone()),
            None => bail!("no such deck: {}", deck),
        }
    }

    async fn observe(&self, selection: &Selection) -> Result<Vec<Observation>> {
        if self.fail_decks.contains(&selection.deck) {
            bail!("deck {} is unavailable", selection.deck);
        }
        let scope = self.scope(selection);
        let mut observations = Vec::new();
        for deck in self.decks.iter().filter(|d| scope.contains(&d.info.id)) {
            for card in &deck.cards {
                if card.suspended {
                    continue;
                }
                for ch in extract::extract_from_fields(&card.fields, selection.fields) {
                    observations.push(Observation {
                        ch,
                        reviewed: card.reviewed,
                    });
                }
            }
        }
        Ok(observations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FieldSpec;

    fn source() -> MemorySource {
        let mut src = MemorySource::new();
        src.add_deck(
            1,
            "Chinese",
            None,
            &["Hanzi", "Meaning"],
            vec![
                MemoryCard::new(&["你好", "hello"], true),
                MemoryCard::suspended(&["猫", "cat"]),
            ],
        );
        src.add_deck(
            2,
            "Chinese::HSK1",
            Some(1),
            &["Hanzi", "Meaning"],
            vec![MemoryCard::new(&["学习", "study"], false)],
        );
        src
    }

    #[tokio::test]
    async fn observe_respects_subdeck_flag() {
        let src = source();
        let with = src
            .observe(&Selection::new(1, FieldSpec::SortField, true))
            .await
            .unwrap();
        let without = src
            .observe(&Selection::new(1, FieldSpec::SortField, false))
            .await
            .unwrap();
        assert!(with.iter().any(|o| o.ch == '学'));
        assert!(!without.iter().any(|o| o.ch == '学'));
    }

    #[tokio::test]
    async fn observe_skips_suspended_cards() {
        let src = source();
        let obs = src
            .observe(&Selection::new(1, FieldSpec::AllFields, false))
            .await
            .unwrap();
        assert!(!obs.iter().any(|o| o.ch == '猫'));
    }

    #[tokio::test]
    async fn observe_reports_per_card_reviewed_status() {
        let src = source();
        let obs = src
            .observe(&Selection::new(1, FieldSpec::SortField, true))
            .await
            .unwrap();
        assert!(obs.contains(&Observation {
            ch: '你',
            reviewed: true
        }));
        assert!(obs.contains(&Observation {
            ch: '学',
            reviewed: false
        }));
    }

    #[tokio::test]
    async fn field_names_for_unknown_deck_fails() {
        assert!(source().field_names(99).await.is_err());
    }
}
