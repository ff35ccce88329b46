//! # Hanzi Stats
//!
//! **Hanzi deck statistics for flashcard collections.**
//!
//! Hanzi Stats scans the decks of a flashcard collection, extracts the
//! Chinese characters appearing in user-selected decks and fields, tracks
//! which of them have been reviewed at least once, and cross-references the
//! result with reference vocabulary lists (HSK 2012 levels, HSK 2021 bands,
//! frequency bands). It is a strictly read-side tool: it never modifies
//! study data.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐   ┌─────────────┐   ┌─────────────┐
//! │ Collection │──▶│  Aggregator  │──▶│  Breakdown   │
//! │  (SQLite)  │   │ extract+merge│   │ vs. catalog  │
//! └────────────┘   └─────────────┘   └──────┬──────┘
//!                        ▲                  │
//!                  ┌─────┴─────┐            ▼
//!                  │  Catalog  │      ┌──────────┐
//!                  │ HSK/freq  │      │ CLI (hzs)│
//!                  └───────────┘      └──────────┘
//! ```
//!
//! ## Data Flow
//!
//! 1. The **SQLite deck source** ([`sqlite_source`]) resolves each
//!    configured selection (deck, field specifier, subdeck flag) to raw
//!    (character, reviewed) observations, skipping suspended/buried cards.
//! 2. The **aggregator** (`hanzi_stats_core::aggregate`) merges the
//!    observations of all selections into deduplicated Total/Reviewed sets.
//! 3. The **breakdown engine** (`hanzi_stats_core::breakdown`)
//!    cross-references those sets with the **reference catalog**
//!    (`hanzi_stats_core::catalog`) into per-category counts and the
//!    reviewed / present-unreviewed / absent partitions.
//! 4. The **CLI** renders the report as tables or JSON.
//!
//! ## Quick Start
//!
//! ```bash
//! hzs decks                        # list decks in the collection
//! hzs fields "Chinese"             # list a deck's note fields
//! hzs stats                        # report for the configured selections
//! hzs stats --deck "Chinese" --fields all --json
//! hzs detail "HSK (2021) Band 1"   # per-character partition of a category
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing and validation |
//! | [`db`] | Read-only SQLite connection pool to the collection |
//! | [`sqlite_source`] | `DeckSource` implementation over the collection schema |
//! | [`scan`] | Selection resolution and aggregation orchestration |
//! | [`progress`] | Scan progress reporting on stderr (human or JSON) |
//! | [`decks`] | `hzs decks`: deck listing with card counts and last review |
//! | [`fields`] | `hzs fields`: field names of a deck |
//! | [`stats`] | `hzs stats`: summary report (tables or JSON) |
//! | [`detail`] | `hzs detail`: per-character category partition |
//!
//! ## Configuration
//!
//! All commands read a TOML file (default: `config/hanzi.toml`). See
//! [`config`] for the available options and `config/hanzi.example.toml`
//! for a full example.

pub mod config;
pub mod db;
pub mod decks;
pub mod detail;
pub mod fields;
pub mod progress;
pub mod scan;
pub mod sqlite_source;
pub mod stats;

pub use sqlite_source::SqliteDeckSource;
