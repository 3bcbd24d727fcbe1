//! Upload reporting models

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Per-table outcome of a batched upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResult {
    pub table: String,
    pub total_batches: usize,
    pub succeeded_batches: usize,
    /// 0-indexed positions of the batches whose send failed, ascending.
    pub failed_batch_indices: Vec<usize>,
}

impl UploadResult {
    /// Every batch of this table was delivered.
    pub fn is_complete(&self) -> bool {
        self.succeeded_batches == self.total_batches
    }
}

/// Summary of one pipeline execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineReport {
    pub run_id: Uuid,
    pub farms_uploaded: usize,
    pub rows_read: usize,
    /// Readings whose pond never showed up in the fetched farm id map.
    pub rows_skipped_unknown_farm: usize,
    pub tables: Vec<UploadResult>,
}

impl PipelineReport {
    /// Overall success: every table delivered every batch.
    pub fn is_complete(&self) -> bool {
        self.tables.iter().all(UploadResult::is_complete)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(table: &str, total: usize, succeeded: usize, failed: Vec<usize>) -> UploadResult {
        UploadResult {
            table: table.to_string(),
            total_batches: total,
            succeeded_batches: succeeded,
            failed_batch_indices: failed,
        }
    }

    #[test]
    fn test_upload_result_complete() {
        assert!(result("sensor_readings", 3, 3, vec![]).is_complete());
        assert!(!result("sensor_readings", 3, 2, vec![1]).is_complete());
    }

    #[test]
    fn test_report_complete_requires_every_table() {
        let report = PipelineReport {
            run_id: Uuid::new_v4(),
            farms_uploaded: 2,
            rows_read: 10,
            rows_skipped_unknown_farm: 0,
            tables: vec![
                result("sensor_readings", 2, 2, vec![]),
                result("weather_data", 2, 1, vec![0]),
            ],
        };
        assert!(!report.is_complete());
    }

    #[test]
    fn test_report_with_no_tables_is_complete() {
        let report = PipelineReport {
            run_id: Uuid::new_v4(),
            farms_uploaded: 0,
            rows_read: 0,
            rows_skipped_unknown_farm: 0,
            tables: vec![],
        };
        assert!(report.is_complete());
    }
}
