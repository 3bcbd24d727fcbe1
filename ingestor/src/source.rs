//! CSV tabular sources
//!
//! Readings arrive as one row per timestamp x pond under a stable header;
//! farm coordinates arrive as a two-column sheet of label plus `"lat, lon"`
//! string. Row order is preserved for both.

use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;

use shared::{CoordinateEntry, Reading};

use crate::error::{AppError, AppResult};

const TIMESTAMP_COLUMN: &str = "timestamp";
const POND_COLUMN: &str = "pond_id";

const LABEL_COLUMN: &str = "farm_name";
const COORDINATES_COLUMN: &str = "coordinates";

/// Read sensor readings from a CSV file.
///
/// `timestamp` and `pond_id` columns are required; every other column is
/// numeric. Empty cells become absent fields, non-numeric cells are an
/// error naming the row and column.
pub fn read_readings(path: &Path) -> AppResult<Vec<Reading>> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();

    let timestamp_idx = column_index(&headers, TIMESTAMP_COLUMN)?;
    let pond_idx = column_index(&headers, POND_COLUMN)?;

    let mut readings = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record?;
        // Row numbers are 1-based and count the header line
        let row = index + 2;

        let raw_timestamp = record.get(timestamp_idx).unwrap_or_default();
        let timestamp = parse_timestamp(raw_timestamp).ok_or_else(|| AppError::Timestamp {
            row,
            value: raw_timestamp.to_string(),
        })?;
        let pond_id = record.get(pond_idx).unwrap_or_default().trim().to_string();

        let mut values = BTreeMap::new();
        for (idx, field) in record.iter().enumerate() {
            if idx == timestamp_idx || idx == pond_idx || field.trim().is_empty() {
                continue;
            }
            let column = headers.get(idx).unwrap_or_default();
            let value = Decimal::from_str(field.trim()).map_err(|_| AppError::FieldParse {
                row,
                column: column.to_string(),
                value: field.to_string(),
            })?;
            values.insert(column.to_string(), value);
        }

        readings.push(Reading {
            pond_id,
            timestamp,
            values,
        });
    }

    Ok(readings)
}

/// Read the farm coordinate sheet (`farm_name` and `coordinates` columns).
pub fn read_coordinate_entries(path: &Path) -> AppResult<Vec<CoordinateEntry>> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();

    let label_idx = column_index(&headers, LABEL_COLUMN)?;
    let coordinates_idx = column_index(&headers, COORDINATES_COLUMN)?;

    let mut entries = Vec::new();
    for record in reader.records() {
        let record = record?;
        entries.push(CoordinateEntry {
            farm_label: record.get(label_idx).unwrap_or_default().trim().to_string(),
            coordinates: record
                .get(coordinates_idx)
                .unwrap_or_default()
                .trim()
                .to_string(),
        });
    }

    Ok(entries)
}

fn column_index(headers: &csv::StringRecord, name: &str) -> AppResult<usize> {
    headers
        .iter()
        .position(|header| header == name)
        .ok_or_else(|| AppError::MissingColumn(name.to_string()))
}

/// Parse a source timestamp.
///
/// Accepts the legacy sheet format `DD/MM/YY HH:MM`, RFC 3339, and the
/// `YYYY-MM-DD HH:MM[:SS]` form. Naive timestamps are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%d/%m/%y %H:%M") {
        return Some(naive.and_utc());
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }

    None
}
