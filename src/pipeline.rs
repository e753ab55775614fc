use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{info, warn};

use crate::aggregate::{self, CategorySummary};
use crate::classify::classify_all;
use crate::config::{PipelineConfig, Thresholds};
use crate::data::filter::GeneFilter;
use crate::data::loader::{self, IngestReport, MalformedCell, SkippedFile};
use crate::data::model::{Category, ClassifiedGene, GeneRecord, RawGene};
use crate::error::PipelineError;
use crate::export::{self, GeneList};
use crate::plot::{self, PlotOptions, PlotPayload};
use crate::stats;

// ---------------------------------------------------------------------------
// In-memory analysis
// ---------------------------------------------------------------------------

/// Classified genes and every derived output, before anything is written.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub genes: Vec<ClassifiedGene>,
    pub summaries: Vec<CategorySummary>,
    pub payload: PlotPayload,
}

/// Statistics, classification, aggregation and plot payload over the
/// full dataset. Classification needs every sample of a gene, so it only
/// runs once all records exist.
pub fn analyze(records: Vec<GeneRecord>, cfg: &PipelineConfig) -> Analysis {
    let genes = classify_all(records, &cfg.thresholds);
    let summaries = aggregate::summarize(&genes);
    let payload = plot::build_payload(&genes, &PlotOptions::from(cfg));
    Analysis {
        genes,
        summaries,
        payload,
    }
}

pub fn records_from_raw(raw: &[RawGene]) -> Vec<GeneRecord> {
    raw.iter().map(stats::gene_record).collect()
}

// ---------------------------------------------------------------------------
// Full run
// ---------------------------------------------------------------------------

/// Result of a completed run.
#[derive(Debug)]
pub struct RunSummary {
    pub analysis: Analysis,
    pub malformed: Vec<MalformedCell>,
    pub skipped: Vec<SkippedFile>,
    pub artifacts: Vec<PathBuf>,
}

/// Ingest `cfg.input_dir`, analyze, and write every artifact.
///
/// Fails with [`PipelineError::EmptyDataset`] before creating any output
/// when no gene file could be read.
pub fn run(cfg: &PipelineConfig) -> Result<RunSummary> {
    info!("Step 1: Processing CSV files and calculating statistics...");
    let IngestReport {
        genes: raw,
        malformed,
        skipped,
    } = loader::load_directory(&cfg.input_dir, &cfg.layout)
        .with_context(|| format!("listing {}", cfg.input_dir.display()))?;

    if raw.is_empty() {
        return Err(PipelineError::EmptyDataset {
            input_dir: cfg.input_dir.clone(),
        }
        .into());
    }
    if !skipped.is_empty() {
        warn!("{} file(s) skipped", skipped.len());
    }
    let records = records_from_raw(&raw);

    info!("Step 2: Applying color coding based on thresholds...");
    let analysis = analyze(records, cfg);

    info!("Step 3: Writing statistics, summaries and plot payload...");
    let artifacts = write_artifacts(&analysis, cfg)?;

    info!("Analysis complete! Generated files:");
    for path in &artifacts {
        info!("  - {}", path.display());
    }

    Ok(RunSummary {
        analysis,
        malformed,
        skipped,
        artifacts,
    })
}

/// Write all output files and return their paths in write order.
pub fn write_artifacts(analysis: &Analysis, cfg: &PipelineConfig) -> Result<Vec<PathBuf>> {
    let data_dir = cfg.data_dir();
    let assets_dir = cfg.assets_dir();
    for dir in [&data_dir, &assets_dir] {
        std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }

    let mut artifacts = Vec::new();
    let genes = &analysis.genes;
    let all_stats = genes.iter().flat_map(|g| g.record.stats.iter());

    let path = data_dir.join(export::STATISTICS_CSV);
    export::write_csv(&path, all_stats.clone())?;
    artifacts.push(path);

    if cfg.write_parquet {
        let path = data_dir.join(export::STATISTICS_PARQUET);
        export::write_statistics_parquet(&path, all_stats)?;
        artifacts.push(path);
    }

    let path = data_dir.join(export::INDIVIDUAL_SUMMARIES);
    export::write_text(&path, &aggregate::individual_summaries(genes))?;
    artifacts.push(path);

    let path = data_dir.join(export::SUMMARY_CSV);
    let rows = aggregate::summary_rows(&analysis.summaries);
    for row in &rows {
        info!("{:<18} {:>5}  {}", row.category, row.count, row.genes);
    }
    export::write_csv(&path, rows)?;
    artifacts.push(path);

    for report in aggregate::category_reports(genes, &cfg.dataset_label) {
        let path = data_dir.join(&report.file_name);
        export::write_text(&path, &report.body)?;
        artifacts.push(path);
    }

    let path = data_dir.join(export::GENE_LIST_JSON);
    export::write_json(&path, &GeneList::new(genes.iter().map(|g| g.gene())), true)?;
    artifacts.push(path);

    let path = assets_dir.join(export::PLOT_JSON);
    export::write_json(&path, &analysis.payload, false)?;
    artifacts.push(path);

    Ok(artifacts)
}

// ---------------------------------------------------------------------------
// Search over a written statistics table
// ---------------------------------------------------------------------------

/// Genes of a reloaded statistics table that match a query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchReport {
    /// Matched genes with their category, in table order.
    pub matches: Vec<(String, Category)>,
    /// Matched points across all samples.
    pub points: usize,
}

/// Reload `stats`, reclassify it with `thresholds` and match `query`.
/// An empty query matches nothing.
pub fn search_table(stats: &Path, query: &str, thresholds: Thresholds) -> Result<SearchReport> {
    let records = loader::load_statistics_table(stats)
        .with_context(|| format!("reading {}", stats.display()))?;
    let cfg = PipelineConfig {
        thresholds,
        ..PipelineConfig::new(".", ".")
    };
    let analysis = analyze(records, &cfg);

    let filter = GeneFilter::parse(query, analysis.genes.iter().map(|g| g.gene()));
    let outcome = filter.search(analysis.payload.points());
    let matches = analysis
        .genes
        .iter()
        .filter(|g| filter.matches(g.gene()))
        .map(|g| (g.gene().to_string(), g.category))
        .collect();
    Ok(SearchReport {
        matches,
        points: outcome.points,
    })
}
