use std::collections::BTreeSet;

use crate::plot::PlotPoint;

// ---------------------------------------------------------------------------
// Gene search: case-insensitive substring match against known genes
// ---------------------------------------------------------------------------

/// Parsed search query plus the set of genes it may match.
///
/// Matching only decides visual emphasis; it never changes the data.
#[derive(Debug, Clone)]
pub struct GeneFilter {
    terms: Vec<String>,
    known: BTreeSet<String>,
}

/// Result of applying a [`GeneFilter`] to a set of points.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchOutcome {
    /// Matched gene ids (lowercased), sorted.
    pub genes: BTreeSet<String>,
    /// Number of matched points across all samples.
    pub points: usize,
}

impl GeneFilter {
    /// Split a comma-separated query. Empty terms are dropped.
    pub fn parse<'a>(query: &str, known_genes: impl IntoIterator<Item = &'a str>) -> Self {
        let terms = query
            .split(',')
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();
        let known = known_genes.into_iter().map(str::to_lowercase).collect();
        GeneFilter { terms, known }
    }

    /// No terms: the caller should reset emphasis instead of filtering.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn matches(&self, gene: &str) -> bool {
        let gene = gene.to_lowercase();
        self.known.contains(&gene) && self.terms.iter().any(|t| gene.contains(t.as_str()))
    }

    pub fn search<'p>(&self, points: impl IntoIterator<Item = &'p PlotPoint>) -> SearchOutcome {
        let mut outcome = SearchOutcome::default();
        if self.is_empty() {
            return outcome;
        }
        for point in points {
            if self.matches(&point.gene) {
                outcome.genes.insert(point.gene.to_lowercase());
                outcome.points += 1;
            }
        }
        outcome
    }
}
