//! Category grouping, summary table rows and flat-text reports.
//!
//! All orderings here use explicit sort keys (category name, gene id,
//! sample label) so identical input renders byte-identical output.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use serde::Serialize;

use crate::data::model::{Category, ClassifiedGene, SampleLabel, SampleStat};
use crate::stats::mean_defined;

/// Order of the per-category report files after the whole-dataset report.
pub const REPORT_ORDER: [Category; 5] = [
    Category::MfdMinus,
    Category::Yb955,
    Category::CommonGenes,
    Category::PartialThreshold,
    Category::BelowThreshold,
];

/// Column means of member genes' statistics for one sample label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampleMeans {
    pub sample: SampleLabel,
    pub mean: Option<f64>,
    pub sd: Option<f64>,
    pub cv: Option<f64>,
    pub range: Option<f64>,
}

/// Aggregate over all genes sharing a category.
#[derive(Debug, Clone, PartialEq)]
pub struct CategorySummary {
    pub category: Category,
    /// Sorted gene ids.
    pub genes: Vec<String>,
    pub sample_means: Vec<SampleMeans>,
}

impl CategorySummary {
    pub fn count(&self) -> usize {
        self.genes.len()
    }
}

/// One row of the category summary table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    #[serde(rename = "Category")]
    pub category: String,
    #[serde(rename = "Count")]
    pub count: usize,
    #[serde(rename = "Genes")]
    pub genes: String,
}

/// A rendered flat-text report and the file name it belongs in.
#[derive(Debug, Clone, PartialEq)]
pub struct TextReport {
    pub file_name: String,
    pub body: String,
}

// ---------------------------------------------------------------------------
// Grouping
// ---------------------------------------------------------------------------

fn by_gene<'a>(
    genes: impl IntoIterator<Item = &'a ClassifiedGene>,
) -> BTreeMap<&'a str, &'a ClassifiedGene> {
    genes.into_iter().map(|g| (g.gene(), g)).collect()
}

/// Per-label means across the given genes' sample statistics.
pub fn sample_means<'a>(genes: impl IntoIterator<Item = &'a ClassifiedGene>) -> Vec<SampleMeans> {
    let mut per_label: BTreeMap<SampleLabel, Vec<&SampleStat>> = BTreeMap::new();
    for gene in genes {
        for stat in &gene.record.stats {
            per_label.entry(stat.sample).or_default().push(stat);
        }
    }
    per_label
        .into_iter()
        .map(|(sample, stats)| SampleMeans {
            sample,
            mean: mean_defined(stats.iter().map(|s| s.mean)),
            sd: mean_defined(stats.iter().map(|s| s.sd)),
            cv: mean_defined(stats.iter().map(|s| s.cv)),
            range: mean_defined(stats.iter().map(|s| s.range)),
        })
        .collect()
}

/// One summary per category that has members, ordered by category name.
pub fn summarize(genes: &[ClassifiedGene]) -> Vec<CategorySummary> {
    let mut groups: BTreeMap<&str, Vec<&ClassifiedGene>> = BTreeMap::new();
    for gene in genes {
        groups.entry(gene.category.name()).or_default().push(gene);
    }
    groups
        .into_values()
        .filter_map(|members| {
            let category = members.first()?.category;
            let mut ids: Vec<String> = members.iter().map(|g| g.gene().to_string()).collect();
            ids.sort();
            Some(CategorySummary {
                category,
                genes: ids,
                sample_means: sample_means(members.iter().copied()),
            })
        })
        .collect()
}

pub fn summary_rows(summaries: &[CategorySummary]) -> Vec<SummaryRow> {
    summaries
        .iter()
        .map(|s| SummaryRow {
            category: s.category.name().to_string(),
            count: s.count(),
            genes: s.genes.join(", "),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Text rendering
// ---------------------------------------------------------------------------

fn fmt_value(v: Option<f64>) -> String {
    match v {
        Some(v) => format!("{v:.6}"),
        None => "NaN".to_string(),
    }
}

/// Fixed-width table of per-sample statistics.
pub fn format_stat_table<I>(rows: I) -> String
where
    I: IntoIterator<Item = (SampleLabel, [Option<f64>; 4])>,
{
    let mut out = format!("{:<8}{:>16}{:>16}{:>12}{:>16}\n", "Sample", "Mean", "SD", "CV", "Range");
    for (sample, [mean, sd, cv, range]) in rows {
        let _ = writeln!(
            out,
            "{:<8}{:>16}{:>16}{:>12}{:>16}",
            sample.as_str(),
            fmt_value(mean),
            fmt_value(sd),
            fmt_value(cv),
            fmt_value(range)
        );
    }
    out
}

fn stat_rows(stats: &[SampleStat]) -> impl Iterator<Item = (SampleLabel, [Option<f64>; 4])> + '_ {
    stats.iter().map(|s| (s.sample, [s.mean, s.sd, s.cv, s.range]))
}

/// File name of the report for a category (or the dataset label).
pub fn report_file_name(name: &str) -> String {
    format!("Summary_Stats_{}_Genes.txt", name.replace(' ', "_"))
}

/// Report body: gene list, per-label means, then every gene's table.
pub fn render_report(title: &str, members: &[&ClassifiedGene]) -> String {
    let sorted = by_gene(members.iter().copied());
    let ids: Vec<&str> = sorted.keys().copied().collect();

    let mut out = String::new();
    let _ = writeln!(out, "Summary Statistics for {title} Genes");
    let _ = writeln!(out, "{}\n", "=".repeat(50));
    let _ = writeln!(out, "Total Genes: {}", ids.len());
    let _ = writeln!(out, "Gene List: {}\n", ids.join(", "));

    if sorted.is_empty() {
        return out;
    }

    out.push_str("Overall Statistics:\n");
    let _ = writeln!(out, "{}", "-".repeat(20));
    let means = sample_means(sorted.values().copied());
    out.push_str(&format_stat_table(
        means.iter().map(|m| (m.sample, [m.mean, m.sd, m.cv, m.range])),
    ));
    out.push('\n');

    out.push_str("Individual Gene Details:\n");
    let _ = writeln!(out, "{}", "-".repeat(25));
    for (id, gene) in &sorted {
        let _ = writeln!(out, "\n{id}:");
        out.push_str(&format_stat_table(stat_rows(&gene.record.stats)));
    }
    out
}

/// Whole-dataset report under `dataset_label`, then one report per
/// non-empty category in [`REPORT_ORDER`].
pub fn category_reports(genes: &[ClassifiedGene], dataset_label: &str) -> Vec<TextReport> {
    let mut reports = Vec::new();
    let all: Vec<&ClassifiedGene> = genes.iter().collect();
    if !all.is_empty() {
        reports.push(TextReport {
            file_name: report_file_name(dataset_label),
            body: render_report(dataset_label, &all),
        });
    }
    for category in REPORT_ORDER {
        let members: Vec<&ClassifiedGene> =
            genes.iter().filter(|g| g.category == category).collect();
        if members.is_empty() {
            continue;
        }
        reports.push(TextReport {
            file_name: report_file_name(category.name()),
            body: render_report(category.name(), &members),
        });
    }
    reports
}

/// Per-gene summary blocks in ingestion order.
pub fn individual_summaries(genes: &[ClassifiedGene]) -> String {
    let mut out = String::new();
    for gene in genes {
        let id = gene.gene();
        let _ = writeln!(out, "File: {id}.csv");
        let _ = writeln!(out, "Summary Statistics for {id}.csv:");
        out.push_str(&format_stat_table(stat_rows(&gene.record.stats)));
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::GeneRecord;

    fn gene(id: &str, category: Category, mean: f64) -> ClassifiedGene {
        let stats: Vec<SampleStat> = SampleLabel::ALL
            .iter()
            .map(|&sample| SampleStat {
                gene: id.to_string(),
                sample,
                mean: Some(mean),
                sd: Some(1.0),
                cv: (mean != 0.0).then(|| 1.0 / mean),
                range: Some(2.0),
            })
            .collect();
        ClassifiedGene {
            colors: vec![category.color(); stats.len()],
            record: GeneRecord {
                gene: id.to_string(),
                stats,
            },
            category,
        }
    }

    fn dataset() -> Vec<ClassifiedGene> {
        vec![
            gene("zeta", Category::MfdMinus, 10.0),
            gene("alpha", Category::MfdMinus, 30.0),
            gene("mid", Category::BelowThreshold, 0.0),
            gene("beta", Category::CommonGenes, 5.0),
        ]
    }

    #[test]
    fn summaries_are_sorted_and_cover_every_gene_once() {
        let genes = dataset();
        let summaries = summarize(&genes);
        let names: Vec<&str> = summaries.iter().map(|s| s.category.name()).collect();
        assert_eq!(names, vec!["Below Threshold", "Common Genes", "Mfd-"]);
        assert_eq!(summaries.iter().map(|s| s.count()).sum::<usize>(), genes.len());

        let mfd = &summaries[2];
        assert_eq!(mfd.genes, vec!["alpha", "zeta"]);
        assert_eq!(mfd.sample_means.len(), 6);
        assert_eq!(mfd.sample_means[0].mean, Some(20.0));
    }

    #[test]
    fn summary_rows_join_genes() {
        let rows = summary_rows(&summarize(&dataset()));
        assert_eq!(rows[2].category, "Mfd-");
        assert_eq!(rows[2].count, 2);
        assert_eq!(rows[2].genes, "alpha, zeta");
    }

    #[test]
    fn undefined_cv_is_excluded_from_category_means() {
        let genes = vec![
            gene("a", Category::BelowThreshold, 0.0),
            gene("b", Category::BelowThreshold, 4.0),
        ];
        let means = sample_means(&genes);
        assert_eq!(means[0].cv, Some(0.25));
        assert_eq!(means[0].mean, Some(2.0));
    }

    #[test]
    fn reports_skip_empty_categories_and_start_with_dataset() {
        let reports = category_reports(&dataset(), "All Sporulation");
        let names: Vec<&str> = reports.iter().map(|r| r.file_name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Summary_Stats_All_Sporulation_Genes.txt",
                "Summary_Stats_Mfd-_Genes.txt",
                "Summary_Stats_Common_Genes_Genes.txt",
                "Summary_Stats_Below_Threshold_Genes.txt",
            ]
        );
    }

    #[test]
    fn report_lists_genes_in_sorted_order() {
        let genes = dataset();
        let members: Vec<&ClassifiedGene> = genes
            .iter()
            .filter(|g| g.category == Category::MfdMinus)
            .collect();
        let body = render_report("Mfd-", &members);
        assert!(body.starts_with("Summary Statistics for Mfd- Genes\n"));
        assert!(body.contains("Total Genes: 2\n"));
        assert!(body.contains("Gene List: alpha, zeta\n"));
        let a = body.find("\nalpha:\n").unwrap();
        let z = body.find("\nzeta:\n").unwrap();
        assert!(a < z);
        assert_eq!(body, render_report("Mfd-", &members.iter().rev().copied().collect::<Vec<_>>()));
    }

    #[test]
    fn tables_are_followed_by_a_single_blank_line() {
        let genes = dataset();
        let all: Vec<&ClassifiedGene> = genes.iter().collect();
        let body = render_report("All", &all);
        assert!(!body.contains("\n\n\n"));
        assert!(body.contains("2.000000\n\nIndividual Gene Details:\n"));

        let text = individual_summaries(&genes);
        assert!(!text.contains("\n\n\n"));
        assert!(text.contains("\n\nFile: alpha.csv\n"));
        assert!(text.ends_with("\n\n"));
    }

    #[test]
    fn undefined_values_render_as_nan() {
        let table = format_stat_table([(SampleLabel::M1, [Some(0.0), Some(0.0), None, Some(0.0)])]);
        assert!(table.lines().nth(1).unwrap().contains("NaN"));
        assert!(individual_summaries(&dataset()).starts_with("File: zeta.csv\n"));
    }
}
