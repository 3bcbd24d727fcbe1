//! Error handling for the data ingestor

use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Coordinate ingestion errors
    #[error("Invalid coordinate string '{0}': expected \"lat, lon\"")]
    CoordinateParse(String),

    // Row projection errors
    #[error("Missing source field '{field}' while projecting table '{table}'")]
    MissingField { table: String, field: String },

    #[error("Value '{value}' in field '{field}' is not a valid integer for table '{table}'")]
    IntegerCast {
        table: String,
        field: String,
        value: String,
    },

    // Source file errors
    #[error("Missing required column '{0}' in source file")]
    MissingColumn(String),

    #[error("Invalid timestamp '{value}' on row {row}")]
    Timestamp { row: usize, value: String },

    #[error("Invalid numeric value '{value}' in column '{column}' on row {row}")]
    FieldParse {
        row: usize,
        column: String,
        value: String,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    // Remote store errors
    #[error("Store request failed: {0}")]
    Store(String),

    #[error("Farm catalog upload failed: {0}")]
    CatalogUpload(String),

    // Internal errors
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Result type alias for the ingestor
pub type AppResult<T> = Result<T, AppError>;
