use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use log::{debug, error, info, warn};
use serde::Deserialize;

use super::model::{GeneRecord, RawGene, RawSample, SampleLabel, SampleStat};
use crate::config::{CsvLayout, PREVIEW_CHAR_CAP, PREVIEW_LINES};
use crate::error::{PipelineError, Result};

// ---------------------------------------------------------------------------
// Ingest report
// ---------------------------------------------------------------------------

/// A count cell that could not be read as a number.
#[derive(Debug, Clone, PartialEq)]
pub struct MalformedCell {
    pub path: PathBuf,
    pub gene: String,
    pub sample: SampleLabel,
    /// 1-based index among the data rows (header rows excluded).
    pub row: usize,
    pub token: String,
}

/// A gene file left out of the batch.
#[derive(Debug, Clone)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// Outcome of ingesting a directory: usable genes plus every recovered issue.
#[derive(Debug, Default)]
pub struct IngestReport {
    pub genes: Vec<RawGene>,
    pub malformed: Vec<MalformedCell>,
    pub skipped: Vec<SkippedFile>,
}

// ---------------------------------------------------------------------------
// Directory ingestion
// ---------------------------------------------------------------------------

/// `*.csv` files directly inside `dir`, sorted by path.
pub fn list_gene_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let is_csv = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
        if is_csv && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Ingest every gene file in `dir`. A broken file is logged and skipped; it
/// never aborts the batch. Gene ids come from file stems, so a second file
/// with an already loaded id (`abc.csv` next to `abc.CSV`) is skipped too.
pub fn load_directory(dir: &Path, layout: &CsvLayout) -> Result<IngestReport> {
    let mut report = IngestReport::default();
    let mut seen: BTreeSet<String> = BTreeSet::new();

    for path in list_gene_files(dir)? {
        info!("Processing: {}", path.display());
        let gene = gene_id(&path);
        if seen.contains(&gene) {
            let err = PipelineError::UnreadableFile {
                path: path.clone(),
                reason: format!("duplicate gene id '{gene}'"),
            };
            error!("ERROR in file: {} - {err}", path.display());
            report.skipped.push(SkippedFile {
                path,
                reason: err.to_string(),
            });
            continue;
        }
        match load_gene_file(&path, layout) {
            Ok((raw, malformed)) => {
                seen.insert(gene);
                report.genes.push(raw);
                report.malformed.extend(malformed);
            }
            Err(err) => {
                error!("ERROR in file: {} - {err}", path.display());
                match preview(&path) {
                    Some(text) => error!("Problematic data in {}:\n{text}", path.display()),
                    None => error!("Could not read {} for error display", path.display()),
                }
                report.skipped.push(SkippedFile {
                    path,
                    reason: err.to_string(),
                });
            }
        }
    }

    Ok(report)
}

// ---------------------------------------------------------------------------
// Single gene file
// ---------------------------------------------------------------------------

/// Read one gene file into its six labelled count columns.
///
/// Layout: `layout.skip_rows` leading lines are ignored, then every row holds
/// replicate counts at `first_count_column + k * stride`. The width of the
/// first data row must select exactly six columns. Non-numeric or absent
/// cells become `None` and are returned as [`MalformedCell`]s.
pub fn load_gene_file(path: &Path, layout: &CsvLayout) -> Result<(RawGene, Vec<MalformedCell>)> {
    let gene = gene_id(path);
    let unreadable = |reason: String| PipelineError::UnreadableFile {
        path: path.to_path_buf(),
        reason,
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|e| unreadable(e.to_string()))?;

    let mut columns: Option<Vec<usize>> = None;
    let mut width = 0;
    let mut samples: Vec<RawSample> = SampleLabel::ALL
        .iter()
        .map(|&label| RawSample {
            gene: gene.clone(),
            label,
            counts: Vec::new(),
        })
        .collect();
    let mut malformed = Vec::new();

    for (idx, result) in reader.records().skip(layout.skip_rows).enumerate() {
        let record = result.map_err(|e| unreadable(e.to_string()))?;
        let row = idx + 1;

        if columns.is_none() {
            width = record.len();
            let cols = layout.count_columns(width);
            if cols.len() != SampleLabel::ALL.len() {
                return Err(PipelineError::WrongShape {
                    path: path.to_path_buf(),
                    columns: cols.len(),
                    width,
                });
            }
            columns = Some(cols);
        }
        let Some(cols) = columns.as_ref() else {
            continue;
        };

        if record.len() > width {
            return Err(unreadable(format!(
                "data row {row} has {} fields, expected {width}",
                record.len()
            )));
        }

        for (sample, &col) in samples.iter_mut().zip(cols.iter()) {
            let token = record.get(col).unwrap_or("");
            let value = parse_count(token);
            if value.is_none() {
                malformed.push(MalformedCell {
                    path: path.to_path_buf(),
                    gene: gene.clone(),
                    sample: sample.label,
                    row,
                    token: token.to_string(),
                });
            }
            sample.counts.push(value);
        }
    }

    if columns.is_none() {
        return Err(unreadable("no data rows".to_string()));
    }

    if !malformed.is_empty() {
        let rows: Vec<String> = malformed
            .iter()
            .map(|m| format!("row {} {}='{}'", m.row, m.sample, m.token))
            .collect();
        warn!(
            "Missing or non-numeric values found in {} (gene {gene}): {}",
            path.display(),
            rows.join(", ")
        );
    }
    debug!("{gene}: {} data rows", samples[0].counts.len());

    Ok((
        RawGene {
            gene,
            source: path.to_path_buf(),
            samples,
        },
        malformed,
    ))
}

/// Gene identifier implied by the file name.
pub fn gene_id(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Numeric coercion of a count token; anything non-finite counts as missing.
fn parse_count(token: &str) -> Option<f64> {
    token
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// First lines of a file, capped at [`PREVIEW_CHAR_CAP`] characters. At most
/// four bytes per allowed character are read, whatever the line lengths.
fn preview(path: &Path) -> Option<String> {
    let file = File::open(path).ok()?;
    let mut bytes = Vec::new();
    file.take((PREVIEW_CHAR_CAP * 4) as u64)
        .read_to_end(&mut bytes)
        .ok()?;
    let head = String::from_utf8_lossy(&bytes);

    let mut text = String::new();
    for line in head.lines().take(PREVIEW_LINES) {
        text.push_str(line);
        text.push('\n');
    }
    Some(text.chars().take(PREVIEW_CHAR_CAP).collect())
}

// ---------------------------------------------------------------------------
// Statistics table reload
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct StatRow {
    #[serde(rename = "Gene")]
    gene: String,
    #[serde(rename = "Sample")]
    sample: String,
    #[serde(rename = "Mean")]
    mean: Option<f64>,
    #[serde(rename = "SD")]
    sd: Option<f64>,
    #[serde(rename = "CV")]
    cv: Option<f64>,
    #[serde(rename = "Range")]
    range: Option<f64>,
}

/// Read a combined statistics table back into per-gene records, keeping
/// the order in which genes first appear. Rows with an unknown sample
/// label are skipped.
pub fn load_statistics_table(path: &Path) -> Result<Vec<GeneRecord>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut records: Vec<GeneRecord> = Vec::new();
    let mut index: BTreeMap<String, usize> = BTreeMap::new();

    for (row_no, result) in reader.deserialize::<StatRow>().enumerate() {
        let row = result?;
        let sample = match row.sample.parse::<SampleLabel>() {
            Ok(label) => label,
            Err(e) => {
                warn!("{}: row {} skipped: {e}", path.display(), row_no + 1);
                continue;
            }
        };
        let slot = *index.entry(row.gene.clone()).or_insert_with(|| {
            records.push(GeneRecord {
                gene: row.gene.clone(),
                stats: Vec::new(),
            });
            records.len() - 1
        });
        records[slot].stats.push(SampleStat {
            gene: row.gene,
            sample,
            mean: row.mean,
            sd: row.sd,
            cv: row.cv,
            range: row.range,
        });
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "pos,name,M1,a,b,M2,c,d,M3,e,f,Y1,g,h,Y2,i,j,Y3\n";

    fn row(counts: [&str; 6]) -> String {
        let cells: Vec<String> = counts
            .iter()
            .map(|c| format!("x,y,{c}"))
            .collect();
        format!("{}\n", cells.join(","))
    }

    fn write(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn reads_six_columns_at_fixed_stride() {
        let dir = tempfile::tempdir().unwrap();
        let body = format!(
            "{HEADER}{}{}",
            row(["1", "2", "3", "4", "5", "6"]),
            row(["10", "20", "30", "40", "50", "60"])
        );
        let path = write(dir.path(), "spoIIA.csv", &body);

        let (gene, malformed) = load_gene_file(&path, &CsvLayout::default()).unwrap();
        assert_eq!(gene.gene, "spoIIA");
        assert!(malformed.is_empty());
        assert_eq!(gene.samples.len(), 6);
        assert_eq!(gene.samples[0].label, SampleLabel::M1);
        assert_eq!(gene.samples[0].counts, vec![Some(1.0), Some(10.0)]);
        assert_eq!(gene.samples[5].counts, vec![Some(6.0), Some(60.0)]);
    }

    #[test]
    fn non_numeric_token_becomes_missing() {
        let dir = tempfile::tempdir().unwrap();
        let body = format!(
            "{HEADER}{}{}",
            row(["1", "2", "3", "4", "5", "6"]),
            row(["10", "oops", "30", "40", "50", ""])
        );
        let path = write(dir.path(), "cotC.csv", &body);

        let (gene, malformed) = load_gene_file(&path, &CsvLayout::default()).unwrap();
        assert_eq!(gene.samples[1].counts, vec![Some(2.0), None]);
        assert_eq!(malformed.len(), 2);
        assert_eq!(malformed[0].sample, SampleLabel::M2);
        assert_eq!(malformed[0].row, 2);
        assert_eq!(malformed[0].token, "oops");
        assert_eq!(malformed[1].sample, SampleLabel::Y3);
    }

    #[test]
    fn wrong_width_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "narrow.csv", "h\n1,2,3,4,5,6\n");
        let err = load_gene_file(&path, &CsvLayout::default()).unwrap_err();
        assert!(matches!(err, PipelineError::WrongShape { columns: 2, .. }));
    }

    #[test]
    fn header_only_file_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "empty.csv", HEADER);
        let err = load_gene_file(&path, &CsvLayout::default()).unwrap_err();
        assert!(matches!(err, PipelineError::UnreadableFile { .. }));
    }

    #[test]
    fn later_wider_row_makes_file_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let body = format!(
            "{HEADER}{}{},extra\n",
            row(["1", "2", "3", "4", "5", "6"]),
            row(["1", "2", "3", "4", "5", "6"]).trim_end()
        );
        let path = write(dir.path(), "wide.csv", &body);
        let err = load_gene_file(&path, &CsvLayout::default()).unwrap_err();
        match err {
            PipelineError::UnreadableFile { reason, .. } => {
                assert_eq!(reason, "data row 2 has 19 fields, expected 18");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn duplicate_gene_id_keeps_first_file() {
        let dir = tempfile::tempdir().unwrap();
        let body = format!("{HEADER}{}", row(["1", "2", "3", "4", "5", "6"]));
        write(dir.path(), "abc.CSV", &body);
        write(dir.path(), "abc.csv", &body);
        if list_gene_files(dir.path()).unwrap().len() < 2 {
            // case-insensitive filesystem, both names are one file
            return;
        }

        let report = load_directory(dir.path(), &CsvLayout::default()).unwrap();
        assert_eq!(report.genes.len(), 1);
        assert_eq!(report.genes[0].gene, "abc");
        assert!(report.genes[0].source.ends_with("abc.CSV"));
        assert_eq!(report.skipped.len(), 1);
        assert!(report.skipped[0].path.ends_with("abc.csv"));
        assert!(report.skipped[0].reason.contains("duplicate gene id 'abc'"));
    }

    #[test]
    fn directory_skips_bad_files_and_ignores_other_extensions() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "b.csv",
            &format!("{HEADER}{}", row(["1", "2", "3", "4", "5", "6"])),
        );
        write(dir.path(), "a.csv", "h\nonly,three,cols\n");
        write(dir.path(), "notes.txt", "not a gene");

        let report = load_directory(dir.path(), &CsvLayout::default()).unwrap();
        assert_eq!(report.genes.len(), 1);
        assert_eq!(report.genes[0].gene, "b");
        assert_eq!(report.skipped.len(), 1);
        assert!(report.skipped[0].path.ends_with("a.csv"));
    }

    #[test]
    fn preview_is_capped() {
        let dir = tempfile::tempdir().unwrap();
        let long_line = "x".repeat(PREVIEW_CHAR_CAP * 3);
        let path = write(dir.path(), "huge.csv", &long_line);
        let text = preview(&path).unwrap();
        assert_eq!(text.chars().count(), PREVIEW_CHAR_CAP);
    }

    #[test]
    fn preview_keeps_first_lines_only() {
        let dir = tempfile::tempdir().unwrap();
        let body: String = (0..50).map(|i| format!("line{i}\n")).collect();
        let path = write(dir.path(), "many.csv", &body);
        let text = preview(&path).unwrap();
        assert_eq!(text.lines().count(), PREVIEW_LINES);
        assert!(text.starts_with("line0\n"));
        assert!(!text.contains(&format!("line{PREVIEW_LINES}")));
    }

    #[test]
    fn preview_of_multibyte_text_stays_within_cap() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "wide.csv", &"é".repeat(PREVIEW_CHAR_CAP * 5));
        let text = preview(&path).unwrap();
        assert_eq!(text.chars().count(), PREVIEW_CHAR_CAP);
        assert!(text.chars().all(|c| c == 'é'));
    }

    #[test]
    fn statistics_table_groups_by_gene_and_skips_unknown_labels() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            dir.path(),
            "stats.csv",
            "Gene,Sample,Mean,SD,CV,Range\n\
             zeta,M1,2,1,0.5,2\n\
             alpha,M1,0,0,,0\n\
             zeta,Q7,1,1,1,1\n\
             zeta,M2,3,,,\n",
        );
        let records = load_statistics_table(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].gene, "zeta");
        assert_eq!(records[0].stats.len(), 2);
        assert_eq!(records[0].stats[1].sd, None);
        assert_eq!(records[1].stats[0].cv, None);
    }
}
