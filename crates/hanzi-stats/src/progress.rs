//! Scan progress reporting.
//!
//! A collection scan can be slow on large decks, so `hzs stats` and
//! `hzs detail` report per-selection progress while they run. Progress is
//! emitted on **stderr** so stdout remains parseable for scripts; the
//! default is human output when stderr is a TTY and nothing otherwise.

use std::collections::HashMap;
use std::io::Write;

use hanzi_stats_core::aggregate::{NoProgress, ScanProgress};
use hanzi_stats_core::models::{DeckId, Selection};

/// Human-friendly progress: "scan 2/5  Chinese::HSK1 (sort field)".
pub struct StderrProgress {
    deck_names: HashMap<DeckId, String>,
}

impl StderrProgress {
    pub fn new(deck_names: HashMap<DeckId, String>) -> Self {
        Self { deck_names }
    }

    fn deck_label(&self, id: DeckId) -> String {
        self.deck_names
            .get(&id)
            .cloned()
            .unwrap_or_else(|| format!("deck {}", id))
    }
}

impl ScanProgress for StderrProgress {
    fn selection_started(&self, n: usize, total: usize, selection: &Selection) {
        let line = format!(
            "scan {}/{}  {} (fields: {})\n",
            n,
            total,
            self.deck_label(selection.deck),
            selection.fields
        );
        let _ = std::io::stderr().lock().write_all(line.as_bytes());
        let _ = std::io::stderr().lock().flush();
    }
}

/// Machine-readable progress: one JSON object per line on stderr.
pub struct JsonProgress {
    deck_names: HashMap<DeckId, String>,
}

impl JsonProgress {
    pub fn new(deck_names: HashMap<DeckId, String>) -> Self {
        Self { deck_names }
    }
}

impl ScanProgress for JsonProgress {
    fn selection_started(&self, n: usize, total: usize, selection: &Selection) {
        let obj = serde_json::json!({
            "event": "progress",
            "phase": "started",
            "selection": n,
            "total": total,
            "deck": self.deck_names.get(&selection.deck),
            "fields": selection.fields.to_string(),
        });
        if let Ok(line) = serde_json::to_string(&obj) {
            let _ = writeln!(std::io::stderr().lock(), "{}", line);
        }
    }

    fn selection_finished(&self, n: usize, total: usize) {
        let obj = serde_json::json!({
            "event": "progress",
            "phase": "finished",
            "selection": n,
            "total": total,
        });
        let _ = writeln!(std::io::stderr().lock(), "{}", obj);
    }
}

/// Progress mode for the CLI: off, human (stderr), or JSON (stderr).
#[derive(Clone, Copy, Debug, Eq, PartialEq, clap::ValueEnum)]
pub enum ProgressMode {
    Off,
    Human,
    Json,
}

impl ProgressMode {
    /// Default: human progress when stderr is a TTY, otherwise off.
    pub fn default_for_tty() -> Self {
        if atty::is(atty::Stream::Stderr) {
            ProgressMode::Human
        } else {
            ProgressMode::Off
        }
    }

    /// Build a reporter for this mode. `deck_names` labels selections in
    /// the output.
    pub fn reporter(&self, deck_names: HashMap<DeckId, String>) -> Box<dyn ScanProgress> {
        match self {
            ProgressMode::Off => Box::new(NoProgress),
            ProgressMode::Human => Box::new(StderrProgress::new(deck_names)),
            ProgressMode::Json => Box::new(JsonProgress::new(deck_names)),
        }
    }
}
