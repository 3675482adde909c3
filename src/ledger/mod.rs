//! Local bookkeeping for indexed URLs
//!
//! Two small artifacts survive a crawl run: a JSON ledger of URLs whose
//! chunks were indexed (so sitemap and manual runs skip them later), and a
//! JSONL log with one line per upserted record. Neither is load-bearing;
//! failures here are logged and never abort the run.

use crate::index::EmbeddingRecord;
use std::collections::HashSet;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Set of URLs already processed in earlier runs
pub struct Ledger {
    path: PathBuf,
    urls: HashSet<String>,
}

impl Ledger {
    /// Loads the ledger from disk; a missing or unreadable file yields an
    /// empty ledger.
    pub fn load(path: &Path) -> Self {
        let urls = match std::fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str::<Vec<String>>(&content) {
                Ok(list) => list.into_iter().collect(),
                Err(e) => {
                    tracing::warn!(
                        "Ignoring unreadable ledger {}: {}",
                        path.display(),
                        e
                    );
                    HashSet::new()
                }
            },
            Err(_) => HashSet::new(),
        };

        Self {
            path: path.to_path_buf(),
            urls,
        }
    }

    /// Whether a URL was already indexed by an earlier run.
    pub fn contains(&self, url: &str) -> bool {
        self.urls.contains(url)
    }

    /// Marks a URL as processed (persisted on the next `save`).
    pub fn insert(&mut self, url: &str) {
        self.urls.insert(url.to_string());
    }

    /// Number of URLs tracked.
    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    /// Writes the ledger back to disk.
    pub fn save(&self) -> std::io::Result<()> {
        let mut urls: Vec<&String> = self.urls.iter().collect();
        urls.sort();
        let json = serde_json::to_string_pretty(&urls)?;
        std::fs::write(&self.path, json)
    }
}

/// Appends one upserted record to the JSONL log.
pub fn append_record_log(path: &Path, record: &EmbeddingRecord) -> std::io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    let line = serde_json::to_string(record)?;
    writeln!(file, "{}", line)
}
