use crate::index::{EmbeddingRecord, VectorIndex};

/// Running totals for the batching layer
#[derive(Debug, Default, Clone, Copy)]
pub struct BatchStats {
    /// Batches successfully upserted
    pub batches_flushed: u64,

    /// Records successfully upserted
    pub records_upserted: u64,

    /// Batches that failed even after the retry
    pub batches_failed: u64,

    /// Records lost to failed batches
    pub records_dropped: u64,
}

/// Accumulates records and upserts them in bounded batches.
///
/// A full batch is flushed as soon as it fills. A failed upsert is retried
/// exactly once; a second failure is logged and counted, and the batcher
/// moves on so one bad batch never aborts the rest of the run.
pub struct RecordBatcher<'a> {
    index: &'a dyn VectorIndex,
    capacity: usize,
    pending: Vec<EmbeddingRecord>,
    stats: BatchStats,
}

impl<'a> RecordBatcher<'a> {
    /// Creates a batcher that flushes every `capacity` records.
    pub fn new(index: &'a dyn VectorIndex, capacity: usize) -> Self {
        Self {
            index,
            capacity: capacity.max(1),
            pending: Vec::with_capacity(capacity.max(1)),
            stats: BatchStats::default(),
        }
    }

    /// Adds a record, flushing if the batch is now full.
    pub async fn push(&mut self, record: EmbeddingRecord) {
        self.pending.push(record);
        if self.pending.len() >= self.capacity {
            self.flush().await;
        }
    }

    /// Upserts whatever is pending, with one retry on failure.
    ///
    /// Called on normal completion and on abort, so a partial batch is never
    /// silently dropped.
    pub async fn flush(&mut self) {
        if self.pending.is_empty() {
            return;
        }

        let batch = std::mem::take(&mut self.pending);

        match self.index.upsert(&batch).await {
            Ok(()) => {
                self.stats.batches_flushed += 1;
                self.stats.records_upserted += batch.len() as u64;
                tracing::debug!("Upserted batch of {} records", batch.len());
                return;
            }
            Err(err) => {
                tracing::warn!("Batch upsert failed, retrying once: {}", err);
            }
        }

        match self.index.upsert(&batch).await {
            Ok(()) => {
                self.stats.batches_flushed += 1;
                self.stats.records_upserted += batch.len() as u64;
            }
            Err(err) => {
                self.stats.batches_failed += 1;
                self.stats.records_dropped += batch.len() as u64;
                tracing::error!(
                    "Batch upsert failed after retry, dropping {} records: {}",
                    batch.len(),
                    err
                );
            }
        }
    }

    /// Records buffered but not yet upserted.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Snapshot of the running totals.
    pub fn stats(&self) -> BatchStats {
        self.stats
    }
}
