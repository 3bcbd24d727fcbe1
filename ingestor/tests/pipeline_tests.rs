//! End-to-end pipeline tests
//!
//! Exercises the full run against an in-memory store double: catalog
//! before fact tables, foreign-key join, unknown-pond skipping, and the
//! final report.

use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use fish_farm_monitoring_ingestor::error::{AppError, AppResult};
use fish_farm_monitoring_ingestor::external::{Row, TabularStore};
use fish_farm_monitoring_ingestor::services::PipelineService;
use rust_decimal::Decimal;
use shared::{CoordinateEntry, Reading};

// ============================================================================
// Store double
// ============================================================================

#[derive(Default)]
struct StoreState {
    /// Catalog rows in receipt order; the generated id is position + 1.
    farms: Vec<Row>,
    /// Successfully delivered batches per fact table.
    batches: HashMap<String, Vec<Vec<Row>>>,
    /// Upsert call count per fact table, failed calls included.
    calls: HashMap<String, usize>,
}

#[derive(Clone, Default)]
struct InMemoryStore {
    state: Arc<Mutex<StoreState>>,
    fail_catalog: bool,
    /// Farm names omitted from the fetched id map.
    withhold_from_id_map: Vec<String>,
    /// Per-table 0-indexed upsert calls that fail.
    fail_batches: HashMap<String, Vec<usize>>,
}

impl InMemoryStore {
    fn batch_sizes(&self, table: &str) -> Vec<usize> {
        let state = self.state.lock().unwrap();
        state
            .batches
            .get(table)
            .map(|batches| batches.iter().map(Vec::len).collect())
            .unwrap_or_default()
    }

    fn stored_rows(&self, table: &str) -> Vec<Row> {
        let state = self.state.lock().unwrap();
        state
            .batches
            .get(table)
            .map(|batches| batches.iter().flatten().cloned().collect())
            .unwrap_or_default()
    }

    fn farm_names(&self) -> Vec<String> {
        let state = self.state.lock().unwrap();
        state
            .farms
            .iter()
            .filter_map(|row| row.get("farm_name").and_then(|v| v.as_str()))
            .map(str::to_string)
            .collect()
    }
}

#[async_trait]
impl TabularStore for InMemoryStore {
    async fn insert(&self, table: &str, rows: &[Row]) -> AppResult<()> {
        self.upsert(table, rows, None).await
    }

    async fn upsert(&self, table: &str, rows: &[Row], _on_conflict: Option<&str>) -> AppResult<()> {
        let mut state = self.state.lock().unwrap();

        if table == "farms" {
            if self.fail_catalog {
                return Err(AppError::Store("catalog unavailable".to_string()));
            }
            state.farms.extend(rows.iter().cloned());
            return Ok(());
        }

        let call = state.calls.entry(table.to_string()).or_default();
        let index = *call;
        *call += 1;

        if self
            .fail_batches
            .get(table)
            .is_some_and(|fails| fails.contains(&index))
        {
            return Err(AppError::Store("injected batch failure".to_string()));
        }

        state
            .batches
            .entry(table.to_string())
            .or_default()
            .push(rows.to_vec());
        Ok(())
    }

    async fn fetch_id_map(&self, _table: &str, key_column: &str) -> AppResult<HashMap<String, i64>> {
        let state = self.state.lock().unwrap();
        let mut map = HashMap::new();
        for (index, row) in state.farms.iter().enumerate() {
            if let Some(name) = row.get(key_column).and_then(|v| v.as_str()) {
                if !self.withhold_from_id_map.iter().any(|n| n == name) {
                    map.insert(name.to_string(), index as i64 + 1);
                }
            }
        }
        Ok(map)
    }
}

// ============================================================================
// Fixtures
// ============================================================================

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

/// A reading for `pond_id`, `seq` minutes into the run, carrying every
/// source column.
fn reading(pond_id: &str, seq: i64) -> Reading {
    let fields = [
        ("OD_mg_L", "7.2"),
        ("Temp_C", "26.4"),
        ("pH", "7.6"),
        ("Conductivity_uScm", "512.3"),
        ("PAR_umol_m2s", "640.0"),
        ("Ammonia_mg_L", "0.41"),
        ("Nitrite_mg_L", "0.05"),
        ("Turbidity_NTU", "18.2"),
        ("Chlorophyll_ug_L", "22.9"),
        ("AirPressure_hPa", "1012.5"),
        ("Wind_m_s", "3.1"),
        ("Rain_mm", "0"),
        ("Flow_m3_h", "105.7"),
        ("Lirio_Coverage_pct", "9.8"),
        ("Aerator_Status", "1"),
    ];

    let mut values = BTreeMap::new();
    for (column, value) in fields {
        values.insert(column.to_string(), dec(value));
    }

    Reading {
        pond_id: pond_id.to_string(),
        timestamp: Utc.with_ymd_and_hms(2024, 3, 5, 0, 0, 0).unwrap() + Duration::minutes(seq),
        values,
    }
}

fn entry(label: &str, coordinates: &str) -> CoordinateEntry {
    CoordinateEntry {
        farm_label: label.to_string(),
        coordinates: coordinates.to_string(),
    }
}

const FACT_TABLES: [&str; 3] = ["sensor_readings", "weather_data", "operational_data"];

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn test_full_run_uploads_catalog_then_fact_tables() {
    let store = InMemoryStore::default();
    let pipeline = PipelineService::new(store.clone(), 4);

    let mut readings = Vec::new();
    for seq in 0..3 {
        readings.push(reading("Pond_B", seq));
        readings.push(reading("Pond_A", seq));
    }
    let entries = vec![
        entry("Granja 1", "19.43, -99.13"),
        entry("Granja 2", "20.67, -103.35"),
    ];

    let report = pipeline.run(readings, entries).await.unwrap();

    assert!(report.is_complete());
    assert_eq!(report.farms_uploaded, 2);
    assert_eq!(report.rows_read, 6);
    assert_eq!(report.rows_skipped_unknown_farm, 0);

    // Catalog is sorted by farm name
    assert_eq!(store.farm_names(), vec!["Pond_A", "Pond_B"]);

    // 6 rows with batch size 4 -> batches of [4, 2] per fact table
    let tables: Vec<&str> = report.tables.iter().map(|t| t.table.as_str()).collect();
    assert_eq!(tables, FACT_TABLES.to_vec());
    for table in FACT_TABLES {
        assert_eq!(store.batch_sizes(table), vec![4, 2]);
        assert_eq!(store.stored_rows(table).len(), 6);
    }

    // Fact rows carry the generated catalog ids: Pond_A -> 1, Pond_B -> 2
    let sensor_rows = store.stored_rows("sensor_readings");
    let farm_ids: Vec<i64> = sensor_rows
        .iter()
        .filter_map(|row| row.get("farm_id").and_then(|v| v.as_i64()))
        .collect();
    assert_eq!(farm_ids.len(), 6);
    assert!(farm_ids.iter().all(|id| *id == 1 || *id == 2));
}

#[tokio::test]
async fn test_pond_without_coordinates_gets_default_pair() {
    let store = InMemoryStore::default();
    let pipeline = PipelineService::new(store.clone(), 10);

    let readings = vec![reading("Pond_A", 0), reading("Pond_C", 0)];
    let entries = vec![entry("Granja 1", "19.43, -99.13")];

    let report = pipeline.run(readings, entries).await.unwrap();
    assert!(report.is_complete());
    assert_eq!(report.farms_uploaded, 2);

    assert_eq!(store.farm_names(), vec!["Pond_A", "Pond_C"]);

    let state = store.state.lock().unwrap();
    let pond_c = state
        .farms
        .iter()
        .find(|row| row.get("farm_name").and_then(|v| v.as_str()) == Some("Pond_C"))
        .unwrap();
    assert_eq!(pond_c.get("latitude").and_then(|v| v.as_f64()), Some(0.0));
    assert_eq!(pond_c.get("longitude").and_then(|v| v.as_f64()), Some(0.0));
}

#[tokio::test]
async fn test_catalog_failure_aborts_run() {
    let store = InMemoryStore {
        fail_catalog: true,
        ..Default::default()
    };
    let pipeline = PipelineService::new(store.clone(), 10);

    let err = pipeline
        .run(vec![reading("Pond_A", 0)], vec![entry("Granja 1", "1.0, 2.0")])
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::CatalogUpload(_)));

    // No fact table was touched
    for table in FACT_TABLES {
        assert!(store.stored_rows(table).is_empty());
    }
}

#[tokio::test]
async fn test_readings_for_unknown_farm_are_skipped_not_fatal() {
    let store = InMemoryStore {
        withhold_from_id_map: vec!["Pond_B".to_string()],
        ..Default::default()
    };
    let pipeline = PipelineService::new(store.clone(), 10);

    let readings = vec![
        reading("Pond_A", 0),
        reading("Pond_B", 0),
        reading("Pond_A", 1),
        reading("Pond_B", 1),
        reading("Pond_B", 2),
    ];
    let entries = vec![
        entry("Granja 1", "19.43, -99.13"),
        entry("Granja 2", "20.67, -103.35"),
    ];

    let report = pipeline.run(readings, entries).await.unwrap();

    assert!(report.is_complete());
    assert_eq!(report.rows_read, 5);
    assert_eq!(report.rows_skipped_unknown_farm, 3);
    for table in FACT_TABLES {
        assert_eq!(store.stored_rows(table).len(), 2);
    }
}

#[tokio::test]
async fn test_250_rows_batch_100_yields_three_batches_per_table() {
    let store = InMemoryStore::default();
    let pipeline = PipelineService::new(store.clone(), 100);

    let readings: Vec<Reading> = (0..250).map(|seq| reading("Pond_A", seq)).collect();
    let entries = vec![entry("Granja 1", "19.43, -99.13")];

    let report = pipeline.run(readings, entries).await.unwrap();

    assert!(report.is_complete());
    for result in &report.tables {
        assert_eq!(result.total_batches, 3);
        assert_eq!(result.succeeded_batches, 3);
    }
    for table in FACT_TABLES {
        assert_eq!(store.batch_sizes(table), vec![100, 100, 50]);
    }
}

#[tokio::test]
async fn test_fact_batch_failure_is_isolated_per_table() {
    let store = InMemoryStore {
        fail_batches: HashMap::from([("weather_data".to_string(), vec![1])]),
        ..Default::default()
    };
    let pipeline = PipelineService::new(store.clone(), 10);

    let readings: Vec<Reading> = (0..30).map(|seq| reading("Pond_A", seq)).collect();
    let entries = vec![entry("Granja 1", "19.43, -99.13")];

    let report = pipeline.run(readings, entries).await.unwrap();

    assert!(!report.is_complete());

    let weather = report
        .tables
        .iter()
        .find(|t| t.table == "weather_data")
        .unwrap();
    assert_eq!(weather.total_batches, 3);
    assert_eq!(weather.succeeded_batches, 2);
    assert_eq!(weather.failed_batch_indices, vec![1]);

    // The other tables were unaffected and the failed table still
    // delivered its remaining batches
    for table in ["sensor_readings", "operational_data"] {
        let result = report.tables.iter().find(|t| t.table == table).unwrap();
        assert!(result.is_complete());
        assert_eq!(store.stored_rows(table).len(), 30);
    }
    assert_eq!(store.stored_rows("weather_data").len(), 20);
}
