//! Per-table row projection
//!
//! Each fact table selects and renames a fixed subset of the reading's
//! named fields; the projector stamps the foreign key and timestamp and
//! fails on a missing source field rather than uploading a partial row.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde_json::json;

use shared::Reading;

use crate::error::{AppError, AppResult};
use crate::external::Row;

/// How a projected column is typed in the destination table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// SQL DECIMAL column
    Decimal,
    /// SQL INTEGER column
    Integer,
}

/// One destination column and the reading field it is filled from.
#[derive(Debug, Clone)]
pub struct FieldMapping {
    pub column: &'static str,
    pub source: &'static str,
    pub kind: FieldKind,
}

impl FieldMapping {
    const fn decimal(column: &'static str, source: &'static str) -> Self {
        Self {
            column,
            source,
            kind: FieldKind::Decimal,
        }
    }

    const fn integer(column: &'static str, source: &'static str) -> Self {
        Self {
            column,
            source,
            kind: FieldKind::Integer,
        }
    }
}

/// Projection of readings onto one fact table.
#[derive(Debug, Clone)]
pub struct TableProjection {
    pub table: &'static str,
    /// Natural key the upsert merges on.
    pub conflict_key: &'static str,
    pub fields: Vec<FieldMapping>,
}

impl TableProjection {
    /// Water quality measurements
    pub fn sensor_readings() -> Self {
        Self {
            table: "sensor_readings",
            conflict_key: "farm_id,timestamp",
            fields: vec![
                FieldMapping::decimal("dissolved_oxygen", "OD_mg_L"),
                FieldMapping::decimal("temperature", "Temp_C"),
                FieldMapping::decimal("ph", "pH"),
                FieldMapping::decimal("conductivity", "Conductivity_uScm"),
                FieldMapping::decimal("par", "PAR_umol_m2s"),
                FieldMapping::decimal("ammonia", "Ammonia_mg_L"),
                FieldMapping::decimal("nitrite", "Nitrite_mg_L"),
                FieldMapping::decimal("turbidity", "Turbidity_NTU"),
                FieldMapping::decimal("chlorophyll", "Chlorophyll_ug_L"),
            ],
        }
    }

    /// Environmental conditions
    pub fn weather_data() -> Self {
        Self {
            table: "weather_data",
            conflict_key: "farm_id,timestamp",
            fields: vec![
                FieldMapping::decimal("air_pressure", "AirPressure_hPa"),
                FieldMapping::decimal("wind_speed", "Wind_m_s"),
                FieldMapping::decimal("rainfall", "Rain_mm"),
            ],
        }
    }

    /// Equipment and coverage data
    pub fn operational_data() -> Self {
        Self {
            table: "operational_data",
            conflict_key: "farm_id,timestamp",
            fields: vec![
                FieldMapping::decimal("flow_rate", "Flow_m3_h"),
                FieldMapping::decimal("lirio_coverage", "Lirio_Coverage_pct"),
                FieldMapping::integer("aerator_status", "Aerator_Status"),
            ],
        }
    }

    /// All fact tables in upload order.
    pub fn fact_tables() -> Vec<Self> {
        vec![
            Self::sensor_readings(),
            Self::weather_data(),
            Self::operational_data(),
        ]
    }

    /// Project one reading into the row sent to this table.
    pub fn project(&self, farm_id: i64, reading: &Reading) -> AppResult<Row> {
        let mut row = Row::new();
        row.insert("farm_id".into(), json!(farm_id));
        row.insert(
            "timestamp".into(),
            json!(reading.timestamp.to_rfc3339()),
        );

        for field in &self.fields {
            let value = reading
                .value(field.source)
                .ok_or_else(|| AppError::MissingField {
                    table: self.table.to_string(),
                    field: field.source.to_string(),
                })?;
            row.insert(field.column.into(), self.field_value(field, value)?);
        }

        Ok(row)
    }

    fn field_value(&self, field: &FieldMapping, value: Decimal) -> AppResult<serde_json::Value> {
        match field.kind {
            FieldKind::Decimal => {
                serde_json::to_value(value).map_err(|e| AppError::Internal(e.into()))
            }
            FieldKind::Integer => {
                let int = value.trunc().to_i64().ok_or_else(|| AppError::IntegerCast {
                    table: self.table.to_string(),
                    field: field.source.to_string(),
                    value: value.to_string(),
                })?;
                Ok(json!(int))
            }
        }
    }
}
