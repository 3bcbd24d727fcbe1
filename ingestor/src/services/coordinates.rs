//! Coordinate enrichment: farm labels to pond identifiers and coordinates

use std::collections::HashMap;

use shared::{CoordinateEntry, EnrichedReading, GpsCoordinates, Reading};

use crate::error::{AppError, AppResult};

/// Pond identifiers run from `Pond_A` through `Pond_Z`.
const POND_ALPHABET_LEN: u32 = 26;

/// Parse a `"lat, lon"` coordinate string.
///
/// The separator is the literal `", "`; the split must yield exactly two
/// tokens and both must parse as decimal floating-point numbers.
pub fn parse_coordinate_pair(raw: &str) -> AppResult<GpsCoordinates> {
    let tokens: Vec<&str> = raw.split(", ").collect();
    if tokens.len() != 2 {
        return Err(AppError::CoordinateParse(raw.to_string()));
    }

    let latitude: f64 = tokens[0]
        .parse()
        .map_err(|_| AppError::CoordinateParse(raw.to_string()))?;
    let longitude: f64 = tokens[1]
        .parse()
        .map_err(|_| AppError::CoordinateParse(raw.to_string()))?;

    Ok(GpsCoordinates::new(latitude, longitude))
}

/// Map a farm label to its pond identifier.
///
/// The trailing integer of the label is the farm's ordinal position, and
/// ordinal `n` maps to the `n`-th pond letter: "Granja 3" becomes `Pond_C`.
/// Labels without a trailing integer, ordinal 0, and ordinals past `Z`
/// yield `None`; the map builder skips such entries with a warning.
pub fn pond_id_for_label(label: &str) -> Option<String> {
    let trimmed = label.trim_end();
    let start = trimmed
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_digit())
        .map(|(i, _)| i)
        .last()?;

    let ordinal: u32 = trimmed[start..].parse().ok()?;
    if ordinal == 0 || ordinal > POND_ALPHABET_LEN {
        return None;
    }

    let letter = char::from(b'A' + (ordinal - 1) as u8);
    Some(format!("Pond_{}", letter))
}

/// Pond identifier to coordinates, built once per run and immutable after
/// construction.
#[derive(Debug, Clone, Default)]
pub struct PondCoordinateMap {
    inner: HashMap<String, GpsCoordinates>,
}

impl PondCoordinateMap {
    /// Build the map from raw coordinate entries.
    ///
    /// Entries with an unusable label or a malformed coordinate string are
    /// skipped with a warning; enrichment never aborts the run and never
    /// maps bogus coordinates.
    pub fn from_entries(entries: &[CoordinateEntry]) -> Self {
        let mut inner = HashMap::with_capacity(entries.len());
        for entry in entries {
            let Some(pond_id) = pond_id_for_label(&entry.farm_label) else {
                tracing::warn!(
                    label = %entry.farm_label,
                    "no pond identifier for farm label, skipping entry"
                );
                continue;
            };
            match parse_coordinate_pair(&entry.coordinates) {
                Ok(coordinates) => {
                    inner.insert(pond_id, coordinates);
                }
                Err(err) => {
                    tracing::warn!(
                        label = %entry.farm_label,
                        %err,
                        "skipping malformed coordinate entry"
                    );
                }
            }
        }
        Self { inner }
    }

    /// Coordinates for a pond, or the `{0.0, 0.0}` default when unmapped.
    pub fn get(&self, pond_id: &str) -> GpsCoordinates {
        self.inner.get(pond_id).copied().unwrap_or_default()
    }

    pub fn contains(&self, pond_id: &str) -> bool {
        self.inner.contains_key(pond_id)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

/// Attach coordinates to every reading; unmapped ponds get the default
/// pair rather than failing.
pub fn enrich_readings(readings: Vec<Reading>, map: &PondCoordinateMap) -> Vec<EnrichedReading> {
    readings
        .into_iter()
        .map(|reading| {
            let coordinates = map.get(&reading.pond_id);
            EnrichedReading {
                reading,
                coordinates,
            }
        })
        .collect()
}
