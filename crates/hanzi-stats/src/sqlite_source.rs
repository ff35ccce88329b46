//! SQLite-backed [`DeckSource`] implementation.
//!
//! Maps each trait operation to queries against the collection schema
//! (`decks`, `cards`, `notes`, `fields`, `revlog`). The scope rules mirror
//! the host application's own statistics queries:
//!
//! - A card is in scope iff its active-queue status is non-negative
//!   (`queue >= 0`); suspended and buried cards are excluded.
//! - A card counts as reviewed iff it has left the new queue (`queue > 0`)
//!   and has at least one `revlog` entry.
//! - Note field text is stored as one string with `\x1f` separators; deck
//!   name nesting uses the same separator and is normalized to `::` for
//!   display.
//!
//! Subdeck resolution works on normalized names: the subdecks of `Chinese`
//! are exactly the decks whose name starts with `Chinese::`.

use std::collections::BTreeSet;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};

use hanzi_stats_core::extract;
use hanzi_stats_core::models::{DeckId, DeckInfo, FieldSpec, Observation, Selection};
use hanzi_stats_core::source::DeckSource;

/// Separator used inside `notes.flds` and modern deck names.
pub const FIELD_SEP: char = '\u{1f}';

/// SQLite implementation of the [`DeckSource`] trait over a collection
/// database. Read-only; see [`crate::db`].
pub struct SqliteDeckSource {
    pool: SqlitePool,
}

impl SqliteDeckSource {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// All decks as (id, normalized name), name-sorted.
    async fn deck_rows(&self) -> Result<Vec<(DeckId, String)>> {
        let rows = sqlx::query("SELECT id, name FROM decks")
            .fetch_all(&self.pool)
            .await
            .context("failed to list decks")?;

        let mut decks: Vec<(DeckId, String)> = rows
            .iter()
            .map(|row| {
                let id: i64 = row.get("id");
                let name: String = row.get("name");
                (id, normalize_deck_name(&name))
            })
            .collect();
        decks.sort_by(|a, b| a.1.cmp(&b.1));
        Ok(decks)
    }

    /// Deck ids covered by a selection: the deck itself plus, when
    /// requested, every deck nested under it.
    async fn scope_ids(&self, selection: &Selection) -> Result<Vec<DeckId>> {
        let decks = self.deck_rows().await?;
        let Some((_, name)) = decks.iter().find(|(id, _)| *id == selection.deck) else {
            bail!("no such deck: {}", selection.deck);
        };

        let mut ids = vec![selection.deck];
        if selection.include_subdecks {
            let prefix = format!("{}::", name);
            ids.extend(
                decks
                    .iter()
                    .filter(|(_, n)| n.starts_with(&prefix))
                    .map(|(id, _)| *id),
            );
        }
        Ok(ids)
    }

    /// Distinct `notes.flds` strings for in-scope cards. With
    /// `reviewed_only`, restrict to cards with review history.
    async fn distinct_note_fields(
        &self,
        deck_ids: &[DeckId],
        reviewed_only: bool,
    ) -> Result<Vec<String>> {
        let placeholders = vec!["?"; deck_ids.len()].join(",");
        let sql = if reviewed_only {
            format!(
                "SELECT DISTINCT notes.flds \
                 FROM cards \
                 INNER JOIN notes ON cards.nid = notes.id \
                 INNER JOIN revlog ON cards.id = revlog.cid \
                 WHERE cards.did IN ({}) AND cards.queue > 0",
                placeholders
            )
        } else {
            format!(
                "SELECT DISTINCT notes.flds \
                 FROM cards \
                 INNER JOIN notes ON cards.nid = notes.id \
                 WHERE cards.did IN ({}) AND cards.queue >= 0",
                placeholders
            )
        };

        let mut query = sqlx::query(&sql);
        for id in deck_ids {
            query = query.bind(*id);
        }
        let rows = query
            .fetch_all(&self.pool)
            .await
            .context("failed to scan cards")?;

        Ok(rows.iter().map(|row| row.get("flds")).collect())
    }
}

/// Modern collections separate nested deck names with `\x1f`; older ones
/// already use `::`. Normalize to the display form.
pub fn normalize_deck_name(raw: &str) -> String {
    raw.replace(FIELD_SEP, "::")
}

/// Split a `notes.flds` blob into its field list.
pub fn split_fields(flds: &str) -> Vec<String> {
    flds.split(FIELD_SEP).map(|s| s.to_string()).collect()
}

#[async_trait]
impl DeckSource for SqliteDeckSource {
    async fn list_decks(&self) -> Result<Vec<DeckInfo>> {
        let decks = self.deck_rows().await?;
        Ok(decks
            .iter()
            .map(|(id, name)| {
                // Parent = the deck whose name is everything before the last
                // `::` segment, when such a deck exists.
                let parent = name.rfind("::").and_then(|pos| {
                    let parent_name = &name[..pos];
                    decks
                        .iter()
                        .find(|(_, n)| n == parent_name)
                        .map(|(pid, _)| *pid)
                });
                DeckInfo {
                    id: *id,
                    name: name.clone(),
                    parent,
                }
            })
            .collect())
    }

    async fn field_names(&self, deck: DeckId) -> Result<Vec<String>> {
        let scope = self
            .scope_ids(&Selection {
                deck,
                fields: FieldSpec::AllFields,
                include_subdecks: true,
            })
            .await?;

        let placeholders = vec!["?"; scope.len()].join(",");
        let sql = format!(
            "SELECT DISTINCT notes.mid \
             FROM cards \
             INNER JOIN notes ON cards.nid = notes.id \
             WHERE cards.did IN ({})",
            placeholders
        );
        let mut query = sqlx::query(&sql);
        for id in &scope {
            query = query.bind(*id);
        }
        let ntids: Vec<i64> = query
            .fetch_all(&self.pool)
            .await
            .context("failed to resolve note types")?
            .iter()
            .map(|row| row.get("mid"))
            .collect();

        if ntids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; ntids.len()].join(",");
        let sql = format!(
            "SELECT name FROM fields WHERE ntid IN ({}) ORDER BY ntid, ord",
            placeholders
        );
        let mut query = sqlx::query(&sql);
        for id in &ntids {
            query = query.bind(*id);
        }
        let rows = query
            .fetch_all(&self.pool)
            .await
            .context("failed to list fields")?;

        // Union across note types, first occurrence wins.
        let mut names: Vec<String> = Vec::new();
        for row in &rows {
            let name: String = row.get("name");
            if !names.contains(&name) {
                names.push(name);
            }
        }
        Ok(names)
    }

    async fn observe(&self, selection: &Selection) -> Result<Vec<Observation>> {
        let scope = self.scope_ids(selection).await?;

        let total_rows = self.distinct_note_fields(&scope, false).await?;
        let reviewed_rows = self.distinct_note_fields(&scope, true).await?;

        let mut reviewed_chars: BTreeSet<char> = BTreeSet::new();
        for flds in &reviewed_rows {
            reviewed_chars.extend(extract::extract_from_fields(
                &split_fields(flds),
                selection.fields,
            ));
        }

        let mut observations = Vec::new();
        for flds in &total_rows {
            for ch in extract::extract_from_fields(&split_fields(flds), selection.fields) {
                observations.push(Observation {
                    ch,
                    reviewed: reviewed_chars.contains(&ch),
                });
            }
        }
        Ok(observations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deck_name_normalization() {
        assert_eq!(normalize_deck_name("Chinese"), "Chinese");
        assert_eq!(normalize_deck_name("Chinese\u{1f}HSK1"), "Chinese::HSK1");
        assert_eq!(normalize_deck_name("A::B"), "A::B");
    }

    #[test]
    fn field_splitting() {
        assert_eq!(
            split_fields("你好\u{1f}nǐ hǎo\u{1f}hello"),
            vec!["你好", "nǐ hǎo", "hello"]
        );
        assert_eq!(split_fields("single"), vec!["single"]);
    }
}
