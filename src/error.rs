// src/error.rs

use std::io;

/// Failures raised while loading, preprocessing, scoring or writing a survey table.
#[derive(Debug, thiserror::Error)]
pub enum SurveyError {
    #[error("schema mismatch: expected {expected} columns, found {found} ({detail})")]
    SchemaMismatch {
        expected: usize,
        found: usize,
        detail: String,
    },

    #[error("missing column `{column}`")]
    MissingColumn { column: String },

    #[error("no usable data for chart `{0}`")]
    EmptyChart(String),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SurveyError {
    pub fn missing_column(column: impl Into<String>) -> Self {
        Self::MissingColumn {
            column: column.into(),
        }
    }
}

pub type Result<T, E = SurveyError> = std::result::Result<T, E>;
