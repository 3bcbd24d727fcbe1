//! End-to-end upload pipeline
//!
//! Raw rows -> coordinate enrichment -> farm catalog -> per-table
//! projection -> batched upload -> summary report.

use std::collections::{BTreeMap, HashMap};

use serde_json::json;
use uuid::Uuid;

use shared::{CoordinateEntry, EnrichedReading, FarmRecord, GpsCoordinates, PipelineReport, Reading};

use crate::error::{AppError, AppResult};
use crate::external::{Row, TabularStore};
use crate::services::coordinates::{enrich_readings, PondCoordinateMap};
use crate::services::projection::TableProjection;
use crate::services::upload::BatchedUploader;

/// Name of the farm catalog table.
pub const FARMS_TABLE: &str = "farms";
/// Unique key of the farm catalog.
pub const FARMS_CONFLICT_KEY: &str = "farm_name";

/// The upload pipeline and its injected store collaborator.
pub struct PipelineService<S: TabularStore> {
    store: S,
    batch_size: usize,
}

impl<S: TabularStore> PipelineService<S> {
    pub fn new(store: S, batch_size: usize) -> Self {
        Self { store, batch_size }
    }

    /// Run one full ingestion: catalog first, then every fact table.
    ///
    /// A failed catalog upload aborts the run, since the fact tables need
    /// the generated ids. Fact-table batch failures are recorded in the
    /// report and never stop later batches or tables.
    pub async fn run(
        &self,
        readings: Vec<Reading>,
        coordinate_entries: Vec<CoordinateEntry>,
    ) -> AppResult<PipelineReport> {
        let rows_read = readings.len();

        let coordinate_map = PondCoordinateMap::from_entries(&coordinate_entries);
        tracing::info!(
            ponds = coordinate_map.len(),
            entries = coordinate_entries.len(),
            "coordinate map built"
        );

        let enriched = enrich_readings(readings, &coordinate_map);
        let farms = farm_catalog(&enriched);
        tracing::info!(farms = farms.len(), "farm catalog prepared");

        let farm_id_map = self.upload_catalog(&farms).await?;

        let rows_skipped_unknown_farm = enriched
            .iter()
            .filter(|item| !farm_id_map.contains_key(&item.reading.pond_id))
            .count();
        if rows_skipped_unknown_farm > 0 {
            tracing::warn!(
                rows = rows_skipped_unknown_farm,
                "readings reference ponds missing from the farm id map"
            );
        }

        let uploader = BatchedUploader::new(&self.store, self.batch_size);
        let mut tables = Vec::new();

        for projection in TableProjection::fact_tables() {
            let mut rows = Vec::new();
            for item in &enriched {
                if let Some(&farm_id) = farm_id_map.get(&item.reading.pond_id) {
                    rows.push(projection.project(farm_id, &item.reading)?);
                }
            }
            tracing::info!(table = projection.table, rows = rows.len(), "rows prepared");

            tables.push(
                uploader
                    .upload(projection.table, projection.conflict_key, &rows)
                    .await,
            );
        }

        Ok(PipelineReport {
            run_id: Uuid::new_v4(),
            farms_uploaded: farms.len(),
            rows_read,
            rows_skipped_unknown_farm,
            tables,
        })
    }

    /// Upsert the farm catalog and fetch back the generated id map.
    ///
    /// Both steps are fatal on failure: without the id map no dependent
    /// table can be projected.
    async fn upload_catalog(&self, farms: &[FarmRecord]) -> AppResult<HashMap<String, i64>> {
        let rows: Vec<Row> = farms.iter().map(farm_row).collect();

        self.store
            .upsert(FARMS_TABLE, &rows, Some(FARMS_CONFLICT_KEY))
            .await
            .map_err(|err| AppError::CatalogUpload(err.to_string()))?;
        tracing::info!(farms = farms.len(), "farm catalog uploaded");

        let id_map = self
            .store
            .fetch_id_map(FARMS_TABLE, FARMS_CONFLICT_KEY)
            .await
            .map_err(|err| AppError::CatalogUpload(err.to_string()))?;
        tracing::info!(farms = id_map.len(), "farm id map fetched");

        Ok(id_map)
    }
}

/// One catalog row per pond, sorted by name, with the coordinates of the
/// first reading seen for that pond.
pub fn farm_catalog(enriched: &[EnrichedReading]) -> Vec<FarmRecord> {
    let mut farms: BTreeMap<&str, GpsCoordinates> = BTreeMap::new();
    for item in enriched {
        farms
            .entry(item.reading.pond_id.as_str())
            .or_insert(item.coordinates);
    }

    farms
        .into_iter()
        .map(|(name, coordinates)| FarmRecord {
            farm_name: name.to_string(),
            latitude: coordinates.latitude,
            longitude: coordinates.longitude,
        })
        .collect()
}

fn farm_row(farm: &FarmRecord) -> Row {
    let mut row = Row::new();
    row.insert("farm_name".into(), json!(farm.farm_name));
    row.insert("latitude".into(), json!(farm.latitude));
    row.insert("longitude".into(), json!(farm.longitude));
    row
}
