use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::color::PointColor;

// ---------------------------------------------------------------------------
// SampleLabel – the six fixed replicate columns
// ---------------------------------------------------------------------------

/// One of the six replicate labels, in file column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SampleLabel {
    M1,
    M2,
    M3,
    Y1,
    Y2,
    Y3,
}

impl SampleLabel {
    pub const ALL: [SampleLabel; 6] = [
        SampleLabel::M1,
        SampleLabel::M2,
        SampleLabel::M3,
        SampleLabel::Y1,
        SampleLabel::Y2,
        SampleLabel::Y3,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SampleLabel::M1 => "M1",
            SampleLabel::M2 => "M2",
            SampleLabel::M3 => "M3",
            SampleLabel::Y1 => "Y1",
            SampleLabel::Y2 => "Y2",
            SampleLabel::Y3 => "Y3",
        }
    }

    pub fn group(self) -> Group {
        match self {
            SampleLabel::M1 | SampleLabel::M2 | SampleLabel::M3 => Group::Mfd,
            SampleLabel::Y1 | SampleLabel::Y2 | SampleLabel::Y3 => Group::Yb955,
        }
    }
}

impl fmt::Display for SampleLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SampleLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SampleLabel::ALL
            .into_iter()
            .find(|l| l.as_str() == s.trim())
            .ok_or_else(|| format!("unknown sample label '{s}'"))
    }
}

// ---------------------------------------------------------------------------
// Group – a triplicate of one strain
// ---------------------------------------------------------------------------

/// The two triplicate groups: M samples (Mfd- strain) and Y samples (YB955).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Group {
    Mfd,
    Yb955,
}

impl Group {
    pub fn members(self) -> [SampleLabel; 3] {
        match self {
            Group::Mfd => [SampleLabel::M1, SampleLabel::M2, SampleLabel::M3],
            Group::Yb955 => [SampleLabel::Y1, SampleLabel::Y2, SampleLabel::Y3],
        }
    }

    /// Row color when every member meets a threshold.
    pub fn full_color(self) -> PointColor {
        match self {
            Group::Mfd => PointColor::Red,
            Group::Yb955 => PointColor::Blue,
        }
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Group::Mfd => f.write_str("M"),
            Group::Yb955 => f.write_str("Y"),
        }
    }
}

// ---------------------------------------------------------------------------
// Raw ingested data
// ---------------------------------------------------------------------------

/// One replicate count column; `None` marks a missing or non-numeric cell.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSample {
    pub gene: String,
    pub label: SampleLabel,
    pub counts: Vec<Option<f64>>,
}

/// All six count columns read from one gene file.
#[derive(Debug, Clone)]
pub struct RawGene {
    pub gene: String,
    pub source: PathBuf,
    pub samples: Vec<RawSample>,
}

// ---------------------------------------------------------------------------
// Derived statistics
// ---------------------------------------------------------------------------

/// Per (gene, sample) statistics. `None` means undefined: no values, a single
/// value for SD, or a zero mean for CV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleStat {
    #[serde(rename = "Gene")]
    pub gene: String,
    #[serde(rename = "Sample")]
    pub sample: SampleLabel,
    #[serde(rename = "Mean")]
    pub mean: Option<f64>,
    #[serde(rename = "SD")]
    pub sd: Option<f64>,
    #[serde(rename = "CV")]
    pub cv: Option<f64>,
    #[serde(rename = "Range")]
    pub range: Option<f64>,
}

/// All sample statistics of one gene, in ingestion order.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneRecord {
    pub gene: String,
    pub stats: Vec<SampleStat>,
}

impl GeneRecord {
    /// Statistics whose label belongs to `group`.
    pub fn group_stats(&self, group: Group) -> Vec<&SampleStat> {
        self.stats
            .iter()
            .filter(|s| s.sample.group() == group)
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

/// Classification outcome of a gene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Common Genes")]
    CommonGenes,
    #[serde(rename = "Mfd-")]
    MfdMinus,
    #[serde(rename = "YB955")]
    Yb955,
    #[serde(rename = "Partial Threshold")]
    PartialThreshold,
    #[serde(rename = "Below Threshold")]
    BelowThreshold,
}

impl Category {
    /// Priority order; the first category whose color a gene carries wins.
    pub const PRIORITY: [Category; 5] = [
        Category::CommonGenes,
        Category::MfdMinus,
        Category::Yb955,
        Category::PartialThreshold,
        Category::BelowThreshold,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Category::CommonGenes => "Common Genes",
            Category::MfdMinus => "Mfd-",
            Category::Yb955 => "YB955",
            Category::PartialThreshold => "Partial Threshold",
            Category::BelowThreshold => "Below Threshold",
        }
    }

    pub fn color(self) -> PointColor {
        match self {
            Category::CommonGenes => PointColor::Green,
            Category::MfdMinus => PointColor::Red,
            Category::Yb955 => PointColor::Blue,
            Category::PartialThreshold => PointColor::Black,
            Category::BelowThreshold => PointColor::Gray,
        }
    }

    pub fn from_color(color: PointColor) -> Self {
        match color {
            PointColor::Green => Category::CommonGenes,
            PointColor::Red => Category::MfdMinus,
            PointColor::Blue => Category::Yb955,
            PointColor::Black => Category::PartialThreshold,
            PointColor::Gray => Category::BelowThreshold,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A gene after classification; `colors[i]` belongs to `record.stats[i]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedGene {
    pub record: GeneRecord,
    pub colors: Vec<PointColor>,
    pub category: Category,
}

impl ClassifiedGene {
    pub fn gene(&self) -> &str {
        &self.record.gene
    }

    /// Each sample statistic paired with its row color.
    pub fn rows(&self) -> impl Iterator<Item = (&SampleStat, PointColor)> {
        self.record.stats.iter().zip(self.colors.iter().copied())
    }
}
