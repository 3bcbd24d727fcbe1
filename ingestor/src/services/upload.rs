//! Batched upload with per-batch failure isolation

use shared::UploadResult;

use crate::external::{Row, TabularStore};

/// Partition rows into consecutive batches of at most `batch_size`.
///
/// The last batch may be shorter; order and total length are preserved. A
/// zero batch size is clamped to 1 (configuration rejects it earlier).
pub fn split_batches<T>(rows: &[T], batch_size: usize) -> Vec<&[T]> {
    rows.chunks(batch_size.max(1)).collect()
}

/// Delivers row collections to the remote store in bounded-size chunks.
pub struct BatchedUploader<'a, S: TabularStore> {
    store: &'a S,
    batch_size: usize,
}

impl<'a, S: TabularStore> BatchedUploader<'a, S> {
    pub fn new(store: &'a S, batch_size: usize) -> Self {
        Self { store, batch_size }
    }

    /// Send all rows to `table`, one ordered batch at a time.
    ///
    /// A failed batch is recorded and the remaining batches still go out;
    /// there is no retry. Upserting on `conflict_key` keeps reruns
    /// idempotent.
    pub async fn upload(&self, table: &str, conflict_key: &str, rows: &[Row]) -> UploadResult {
        let batches = split_batches(rows, self.batch_size);
        let total_batches = batches.len();
        let mut succeeded_batches = 0;
        let mut failed_batch_indices = Vec::new();

        for (index, batch) in batches.iter().enumerate() {
            match self.store.upsert(table, batch, Some(conflict_key)).await {
                Ok(()) => {
                    succeeded_batches += 1;
                    tracing::info!(
                        table,
                        "batch {}/{} uploaded ({} rows)",
                        index + 1,
                        total_batches,
                        batch.len()
                    );
                }
                Err(err) => {
                    failed_batch_indices.push(index);
                    tracing::warn!(
                        table,
                        %err,
                        "batch {}/{} failed",
                        index + 1,
                        total_batches
                    );
                }
            }
        }

        UploadResult {
            table: table.to_string(),
            total_batches,
            succeeded_batches,
            failed_batch_indices,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_empty_input() {
        let rows: Vec<u32> = Vec::new();
        assert!(split_batches(&rows, 100).is_empty());
    }

    #[test]
    fn test_split_exact_multiple() {
        let rows: Vec<u32> = (0..200).collect();
        let batches = split_batches(&rows, 100);
        assert_eq!(batches.len(), 2);
        assert!(batches.iter().all(|b| b.len() == 100));
    }

    #[test]
    fn test_split_zero_batch_size_is_clamped() {
        let rows: Vec<u32> = (0..3).collect();
        let batches = split_batches(&rows, 0);
        assert_eq!(batches.len(), 3);
    }
}
