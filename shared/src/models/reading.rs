//! Sensor reading models

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::GpsCoordinates;

/// One timestamped observation for one pond.
///
/// `pond_id` and `timestamp` are always present; which numeric fields
/// appear depends on the source file, and a field may be absent for a row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reading {
    pub pond_id: String,
    pub timestamp: DateTime<Utc>,
    pub values: BTreeMap<String, Decimal>,
}

impl Reading {
    /// Look up a named numeric field.
    pub fn value(&self, field: &str) -> Option<Decimal> {
        self.values.get(field).copied()
    }
}

/// A reading with its pond coordinates attached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichedReading {
    pub reading: Reading,
    pub coordinates: GpsCoordinates,
}
