//! Quality scanner for the live vector index
//!
//! The scanner pages through the index with the store's stable cursor,
//! classifies every entry against a pluggable rule set, and deletes
//! defective entries in batches. Iteration is bounded: hitting the cap
//! reports an incomplete scan rather than an error.

mod rules;

pub use rules::{
    default_rules, DimensionRule, MetadataShapeRule, NearZeroRule, QualityRule, ShortTextRule,
};

use crate::config::CleanupConfig;
use crate::index::VectorIndex;
use crate::Result;

/// How a scan ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOutcome {
    /// Every page of the index was examined
    Completed,

    /// The iteration cap was reached first; re-run to continue
    Incomplete,
}

/// Totals reported when a scan finishes
#[derive(Debug, Clone)]
pub struct ScanReport {
    /// Entries examined
    pub examined: u64,

    /// Entries classified defective
    pub defective: u64,

    /// Entries actually deleted
    pub deleted: u64,

    /// Pages requested from the index
    pub iterations: u32,

    pub outcome: ScanOutcome,
}

impl ScanReport {
    /// Defective entries that were found but not deleted (failed batches).
    pub fn remaining_suspected(&self) -> u64 {
        self.defective.saturating_sub(self.deleted)
    }
}

/// Pages through the index and removes defective vectors.
pub struct Scanner<'a> {
    index: &'a dyn VectorIndex,
    rules: Vec<Box<dyn QualityRule>>,
    scan_batch_size: usize,
    delete_batch_size: usize,
    max_iterations: u32,
}

impl<'a> Scanner<'a> {
    /// Creates a scanner over the given index with the given rule set.
    pub fn new(
        index: &'a dyn VectorIndex,
        rules: Vec<Box<dyn QualityRule>>,
        config: &CleanupConfig,
    ) -> Self {
        Self {
            index,
            rules,
            scan_batch_size: config.scan_batch_size.max(1),
            delete_batch_size: config.delete_batch_size.max(1),
            max_iterations: config.max_iterations.max(1),
        }
    }

    /// Runs the scan to completion or to the iteration cap.
    ///
    /// Pending deletions are always flushed before returning, including on
    /// the incomplete path, so the report's counts reflect what actually
    /// happened to the index.
    pub async fn run(&self) -> Result<ScanReport> {
        let mut cursor: Option<String> = None;
        let mut iterations = 0u32;
        let mut examined = 0u64;
        let mut defective = 0u64;
        let mut deleted = 0u64;
        let mut pending_delete: Vec<String> = Vec::new();

        let outcome = loop {
            if iterations == self.max_iterations {
                tracing::warn!(
                    "Iteration cap {} reached with pages remaining; scan incomplete",
                    self.max_iterations
                );
                break ScanOutcome::Incomplete;
            }
            iterations += 1;

            let page = self
                .index
                .list_page(cursor.as_deref(), self.scan_batch_size)
                .await?;

            if page.ids.is_empty() && page.next.is_none() {
                break ScanOutcome::Completed;
            }

            let entries = self.index.fetch(&page.ids).await?;
            examined += entries.len() as u64;

            for entry in &entries {
                if let Some(rule) = self.rules.iter().find(|r| r.is_defective(entry)) {
                    tracing::debug!("Entry {} failed check '{}'", entry.id, rule.name());
                    defective += 1;
                    pending_delete.push(entry.id.clone());
                }
            }

            while pending_delete.len() >= self.delete_batch_size {
                let batch: Vec<String> =
                    pending_delete.drain(..self.delete_batch_size).collect();
                deleted += self.delete_batch(batch).await;
            }

            tracing::info!(
                "Scan page {}: {} examined so far, {} defective",
                iterations,
                examined,
                defective
            );

            // The cursor advances regardless of deletions; the store token is
            // stable under concurrent mutation.
            match page.next {
                Some(next) => cursor = Some(next),
                None => break ScanOutcome::Completed,
            }
        };

        if !pending_delete.is_empty() {
            deleted += self.delete_batch(pending_delete).await;
        }

        let report = ScanReport {
            examined,
            defective,
            deleted,
            iterations,
            outcome,
        };
        tracing::info!(
            "Scan finished ({:?}): {} examined, {} defective, {} deleted, {} suspected remaining",
            report.outcome,
            report.examined,
            report.defective,
            report.deleted,
            report.remaining_suspected()
        );
        Ok(report)
    }

    /// Deletes one batch with a single retry, returning how many went through.
    async fn delete_batch(&self, ids: Vec<String>) -> u64 {
        match self.index.delete(&ids).await {
            Ok(()) => return ids.len() as u64,
            Err(err) => {
                tracing::warn!("Delete batch failed, retrying once: {}", err);
            }
        }

        match self.index.delete(&ids).await {
            Ok(()) => ids.len() as u64,
            Err(err) => {
                tracing::error!(
                    "Delete batch failed after retry, {} ids left suspected: {}",
                    ids.len(),
                    err
                );
                0
            }
        }
    }
}
