//! Fish Farm Monitoring Platform - Data Ingestor
//!
//! Reads sensor readings and farm coordinates from CSV sources and uploads
//! the farm catalog plus three fact tables to the remote relational store.

use std::path::Path;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fish_farm_monitoring_ingestor::external::SupabaseClient;
use fish_farm_monitoring_ingestor::services::PipelineService;
use fish_farm_monitoring_ingestor::{source, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "ffm_ingest=debug,fish_farm_monitoring_ingestor=debug,reqwest=warn".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::load()?;

    tracing::info!("Starting Fish Farm Monitoring data ingestor");
    tracing::info!("Environment: {}", config.environment);

    let readings = source::read_readings(Path::new(&config.source.readings_path))?;
    tracing::info!(
        "Loaded {} readings from {}",
        readings.len(),
        config.source.readings_path
    );

    let coordinate_entries =
        source::read_coordinate_entries(Path::new(&config.source.coordinates_path))?;
    tracing::info!(
        "Loaded {} coordinate entries from {}",
        coordinate_entries.len(),
        config.source.coordinates_path
    );

    let store = SupabaseClient::new(config.store.url.clone(), config.store.api_key.clone());
    let pipeline = PipelineService::new(store, config.upload.batch_size);

    let report = pipeline.run(readings, coordinate_entries).await?;

    tracing::info!("Run {} finished", report.run_id);
    tracing::info!("Farms uploaded: {}", report.farms_uploaded);
    if report.rows_skipped_unknown_farm > 0 {
        tracing::warn!(
            "{} readings skipped: pond not present in the farm catalog",
            report.rows_skipped_unknown_farm
        );
    }
    for result in &report.tables {
        tracing::info!(
            "{}: {}/{} batches uploaded",
            result.table,
            result.succeeded_batches,
            result.total_batches
        );
        if !result.failed_batch_indices.is_empty() {
            tracing::warn!(
                "{}: failed batch indices {:?}",
                result.table,
                result.failed_batch_indices
            );
        }
    }

    if !report.is_complete() {
        tracing::error!("Some batches failed to upload; see the summary above");
        std::process::exit(1);
    }

    Ok(())
}
