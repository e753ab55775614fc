use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use serde::{Deserialize, Serialize};

use crate::data::model::SampleStat;

pub const STATISTICS_CSV: &str = "sporulation_CV_statistics.csv";
pub const STATISTICS_PARQUET: &str = "sporulation_CV_statistics.parquet";
pub const SUMMARY_CSV: &str = "gene_category_summary_table.csv";
pub const INDIVIDUAL_SUMMARIES: &str = "individual_gene_summaries.txt";
pub const GENE_LIST_JSON: &str = "gene_list.json";
pub const PLOT_JSON: &str = "all_sporulation_genes_scatter_plot.json";

/// Known gene ids for the search surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneList {
    pub count: usize,
    pub genes: Vec<String>,
}

impl GeneList {
    pub fn new<'a>(ids: impl IntoIterator<Item = &'a str>) -> Self {
        let mut genes: Vec<String> = ids.into_iter().map(str::to_string).collect();
        genes.sort();
        genes.dedup();
        GeneList {
            count: genes.len(),
            genes,
        }
    }
}

/// Serialize `rows` as a headed CSV table.
pub fn write_csv<T: Serialize>(path: &Path, rows: impl IntoIterator<Item = T>) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    for row in rows {
        writer
            .serialize(row)
            .with_context(|| format!("writing {}", path.display()))?;
    }
    writer.flush().with_context(|| format!("flushing {}", path.display()))?;
    Ok(())
}

pub fn write_text(path: &Path, body: &str) -> Result<()> {
    let mut out = BufWriter::new(
        File::create(path).with_context(|| format!("creating {}", path.display()))?,
    );
    out.write_all(body.as_bytes())
        .and_then(|_| out.flush())
        .with_context(|| format!("writing {}", path.display()))
}

pub fn write_json<T: Serialize>(path: &Path, value: &T, pretty: bool) -> Result<()> {
    let mut out = BufWriter::new(
        File::create(path).with_context(|| format!("creating {}", path.display()))?,
    );
    let written = if pretty {
        serde_json::to_writer_pretty(&mut out, value)
    } else {
        serde_json::to_writer(&mut out, value)
    };
    written.with_context(|| format!("serializing {}", path.display()))?;
    out.flush().with_context(|| format!("flushing {}", path.display()))
}

/// Columnar copy of the statistics table; undefined values are nulls.
pub fn write_statistics_parquet<'a>(
    path: &Path,
    stats: impl IntoIterator<Item = &'a SampleStat>,
) -> Result<()> {
    let stats: Vec<&SampleStat> = stats.into_iter().collect();

    let schema = Arc::new(Schema::new(vec![
        Field::new("Gene", DataType::Utf8, false),
        Field::new("Sample", DataType::Utf8, false),
        Field::new("Mean", DataType::Float64, true),
        Field::new("SD", DataType::Float64, true),
        Field::new("CV", DataType::Float64, true),
        Field::new("Range", DataType::Float64, true),
    ]));

    let columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from(
            stats.iter().map(|s| s.gene.as_str()).collect::<Vec<_>>(),
        )),
        Arc::new(StringArray::from(
            stats.iter().map(|s| s.sample.as_str()).collect::<Vec<_>>(),
        )),
        float_column(&stats, |s| s.mean),
        float_column(&stats, |s| s.sd),
        float_column(&stats, |s| s.cv),
        float_column(&stats, |s| s.range),
    ];

    let batch = RecordBatch::try_new(schema.clone(), columns).context("building record batch")?;
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn float_column(stats: &[&SampleStat], field: impl Fn(&SampleStat) -> Option<f64>) -> ArrayRef {
    Arc::new(Float64Array::from(
        stats.iter().map(|s| field(s)).collect::<Vec<_>>(),
    ))
}
