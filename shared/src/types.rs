//! Common types used across the platform

use serde::{Deserialize, Serialize};

/// GPS coordinates
///
/// `Default` is the `{0.0, 0.0}` pair handed out for ponds with no known
/// location.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct GpsCoordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl GpsCoordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}
