//! Deck data source abstraction.
//!
//! The [`DeckSource`] trait is the boundary between the aggregation core and
//! whatever actually stores cards. The core never assumes a storage
//! technology; it only requires that a source can be queried (possibly
//! slowly) for decks, field names, and per-selection character observations.
//!
//! Implementations must be `Send + Sync` so one source can serve concurrent
//! aggregations.
//!
//! # Operations
//!
//! | Method | Purpose |
//! |--------|---------|
//! | [`list_decks`](DeckSource::list_decks) | Enumerate decks with parent relations |
//! | [`field_names`](DeckSource::field_names) | Field names available in a deck |
//! | [`observe`](DeckSource::observe) | Raw (character, reviewed) pairs for a selection |
//!
//! # Adapter responsibilities
//!
//! `observe` implementations must resolve the selected deck (plus subdecks
//! when requested), skip cards whose active-queue status is negative
//! (suspended/buried), extract the configured field text per matching note,
//! and flag a character reviewed iff some containing card in scope has
//! review history. They return raw pairs only; deduplication and
//! reviewed-in-any merging belong to [`crate::aggregate`].

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{DeckId, DeckInfo, Observation, Selection};

/// Abstract, read-only deck store queried by the aggregator.
#[async_trait]
pub trait DeckSource: Send + Sync {
    /// Enumerate all decks.
    async fn list_decks(&self) -> Result<Vec<DeckInfo>>;

    /// Field names available on notes in `deck`, in field order. Decks
    /// mixing several note types return the union, first occurrence wins.
    async fn field_names(&self, deck: DeckId) -> Result<Vec<String>>;

    /// Produce the raw observations for one selection.
    async fn observe(&self, selection: &Selection) -> Result<Vec<Observation>>;
}
