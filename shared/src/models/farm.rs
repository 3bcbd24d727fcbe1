//! Farm catalog models

use serde::{Deserialize, Serialize};

/// One row of the farm coordinate sheet: a free-text label such as
/// "Granja 3" and its still-unparsed `"lat, lon"` string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoordinateEntry {
    pub farm_label: String,
    pub coordinates: String,
}

/// The one-per-farm catalog row holding static metadata. The remote store
/// assigns the generated id used as a foreign key by the fact tables.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FarmRecord {
    pub farm_name: String,
    pub latitude: f64,
    pub longitude: f64,
}
