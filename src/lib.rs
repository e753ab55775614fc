//! Replicate variability statistics for per-gene count tables.
//!
//! ```text
//!  loader ──► stats ──► classify ──► aggregate ──► export
//!                                  └─► plot ─────┘
//! ```

pub mod aggregate;
pub mod classify;
pub mod color;
pub mod config;
pub mod data;
pub mod error;
pub mod export;
pub mod pipeline;
pub mod plot;
pub mod stats;

pub use config::{PipelineConfig, Thresholds};
pub use error::PipelineError;
pub use pipeline::{RunSummary, run};
