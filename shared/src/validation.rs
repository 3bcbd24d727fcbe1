//! Validation utilities for the Fish Farm Monitoring Platform
//!
//! Bounds mirror the remote table definitions (`farm_name VARCHAR(50)`,
//! `aerator_status` restricted to 0/1).

use rust_decimal::Decimal;

/// Validate latitude is within [-90, 90]
pub fn validate_latitude(latitude: f64) -> Result<(), &'static str> {
    if !latitude.is_finite() {
        return Err("Latitude must be a finite number");
    }
    if !(-90.0..=90.0).contains(&latitude) {
        return Err("Latitude must be between -90 and 90");
    }
    Ok(())
}

/// Validate longitude is within [-180, 180]
pub fn validate_longitude(longitude: f64) -> Result<(), &'static str> {
    if !longitude.is_finite() {
        return Err("Longitude must be a finite number");
    }
    if !(-180.0..=180.0).contains(&longitude) {
        return Err("Longitude must be between -180 and 180");
    }
    Ok(())
}

/// Validate a farm catalog name (non-empty, at most 50 characters)
pub fn validate_farm_name(name: &str) -> Result<(), &'static str> {
    if name.is_empty() {
        return Err("Farm name must not be empty");
    }
    if name.len() > 50 {
        return Err("Farm name must be at most 50 characters");
    }
    Ok(())
}

/// Validate an upload batch size
pub fn validate_batch_size(batch_size: usize) -> Result<(), &'static str> {
    if batch_size == 0 {
        return Err("Batch size must be at least 1");
    }
    Ok(())
}

/// Validate an aerator status flag (the store column is CHECKed to 0/1)
pub fn validate_aerator_status(value: Decimal) -> Result<(), &'static str> {
    if value == Decimal::ZERO || value == Decimal::ONE {
        Ok(())
    } else {
        Err("Aerator status must be 0 or 1")
    }
}
