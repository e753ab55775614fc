use std::path::PathBuf;

use thiserror::Error;

/// Failure kinds of the statistics pipeline.
///
/// Only [`PipelineError::EmptyDataset`] stops a run; per-file variants are
/// logged by the loader and the file is skipped.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("no gene files could be processed in {input_dir}")]
    EmptyDataset { input_dir: PathBuf },

    #[error("cannot read {path}: {reason}")]
    UnreadableFile { path: PathBuf, reason: String },

    #[error("{path}: expected 6 count columns, found {columns} (row width {width})")]
    WrongShape {
        path: PathBuf,
        columns: usize,
        width: usize,
    },

    #[error("invalid {name} threshold: {value}")]
    InvalidThreshold { name: &'static str, value: f64 },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Arrow(#[from] arrow::error::ArrowError),

    #[error(transparent)]
    Parquet(#[from] parquet::errors::ParquetError),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
