use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

pub const DEFAULT_CV_THRESHOLD: f64 = 0.3;
pub const DEFAULT_RANGE_THRESHOLD: f64 = 1000.0;

/// Upper bound on the characters kept when previewing a broken file.
pub const PREVIEW_CHAR_CAP: usize = 2000;
/// Number of lines shown in a broken-file preview.
pub const PREVIEW_LINES: usize = 10;

// ---------------------------------------------------------------------------
// Command line
// ---------------------------------------------------------------------------

#[derive(Parser, Debug, Clone)]
#[command(
    name = "replicate-cv",
    version,
    about = "Replicate variability statistics and threshold classification per gene"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Ingest a directory of per-gene CSVs and write all artifacts.
    Run(RunArgs),
    /// Filter a written statistics table by comma-separated gene names.
    Search(SearchArgs),
}

#[derive(clap::Args, Debug, Clone)]
pub struct RunArgs {
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    #[arg(short = 'o', long = "output")]
    pub output: PathBuf,
    #[arg(long = "cv-threshold", default_value_t = DEFAULT_CV_THRESHOLD)]
    pub cv_threshold: f64,
    #[arg(long = "range-threshold", default_value_t = DEFAULT_RANGE_THRESHOLD)]
    pub range_threshold: f64,
    /// Name of the whole-dataset report.
    #[arg(long = "label", default_value = "All Sporulation")]
    pub label: String,
    #[arg(long = "title", default_value = "All Sporulation-Affected Genes")]
    pub title: String,
    /// Word used for genes in point hover text.
    #[arg(long = "gene-label", default_value = "Gene")]
    pub gene_label: String,
    /// Also write the statistics table as Parquet.
    #[arg(long = "parquet")]
    pub parquet: bool,
}

/// Categories are recomputed from the table, so the thresholds must match
/// the ones the table was produced with.
#[derive(clap::Args, Debug, Clone)]
pub struct SearchArgs {
    #[arg(long = "stats")]
    pub stats: PathBuf,
    #[arg(short = 'q', long = "query")]
    pub query: String,
    #[arg(long = "cv-threshold", default_value_t = DEFAULT_CV_THRESHOLD)]
    pub cv_threshold: f64,
    #[arg(long = "range-threshold", default_value_t = DEFAULT_RANGE_THRESHOLD)]
    pub range_threshold: f64,
}

impl SearchArgs {
    pub fn thresholds(&self) -> Result<Thresholds> {
        Thresholds::new(self.cv_threshold, self.range_threshold)
    }
}

// ---------------------------------------------------------------------------
// Pipeline configuration
// ---------------------------------------------------------------------------

/// CV / range cut-offs used by the classifier and drawn on the plot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub cv: f64,
    pub range: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Thresholds {
            cv: DEFAULT_CV_THRESHOLD,
            range: DEFAULT_RANGE_THRESHOLD,
        }
    }
}

impl Thresholds {
    pub fn new(cv: f64, range: f64) -> Result<Self> {
        if !cv.is_finite() || cv < 0.0 {
            return Err(PipelineError::InvalidThreshold { name: "CV", value: cv });
        }
        if !range.is_finite() || range < 0.0 {
            return Err(PipelineError::InvalidThreshold {
                name: "range",
                value: range,
            });
        }
        Ok(Thresholds { cv, range })
    }
}

/// Positional layout of a per-gene count file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsvLayout {
    /// Leading lines ignored before data rows.
    pub skip_rows: usize,
    /// Column index of the first replicate count.
    pub first_count_column: usize,
    /// Distance between consecutive count columns.
    pub stride: usize,
}

impl Default for CsvLayout {
    fn default() -> Self {
        CsvLayout {
            skip_rows: 1,
            first_count_column: 2,
            stride: 3,
        }
    }
}

impl CsvLayout {
    /// Column indices selected from a row of `width` fields.
    pub fn count_columns(&self, width: usize) -> Vec<usize> {
        (self.first_count_column..width)
            .step_by(self.stride.max(1))
            .collect()
    }
}

/// Everything one pipeline run needs, passed explicitly to each stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub thresholds: Thresholds,
    pub layout: CsvLayout,
    pub dataset_label: String,
    pub plot_title: String,
    pub gene_label: String,
    pub write_parquet: bool,
}

impl PipelineConfig {
    pub fn new(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        PipelineConfig {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            thresholds: Thresholds::default(),
            layout: CsvLayout::default(),
            dataset_label: "All Sporulation".to_string(),
            plot_title: "All Sporulation-Affected Genes".to_string(),
            gene_label: "Gene".to_string(),
            write_parquet: false,
        }
    }

    pub fn from_args(args: &RunArgs) -> Result<Self> {
        Ok(PipelineConfig {
            thresholds: Thresholds::new(args.cv_threshold, args.range_threshold)?,
            dataset_label: args.label.clone(),
            plot_title: args.title.clone(),
            gene_label: args.gene_label.clone(),
            write_parquet: args.parquet,
            ..PipelineConfig::new(&args.input, &args.output)
        })
    }

    /// Tables and text reports.
    pub fn data_dir(&self) -> PathBuf {
        self.output_dir.join("data")
    }

    /// Plot payload.
    pub fn assets_dir(&self) -> PathBuf {
        self.output_dir.join("assets")
    }
}
