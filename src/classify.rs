//! Threshold classification of genes.
//!
//! A sample meets the threshold when `range >= range_threshold` or
//! `cv >= cv_threshold`; undefined values never meet it. Each complete
//! triplicate colors its rows red/blue (all members meet) or black (some
//! do). Both triplicates fully meeting turns every row of the gene green.
//! The gene category is the first of green > red > blue > black > gray
//! found among its row colors; changing that order changes results.

use std::collections::BTreeSet;

use log::warn;

use crate::color::PointColor;
use crate::config::Thresholds;
use crate::data::model::{Category, ClassifiedGene, GeneRecord, Group, SampleStat};

/// How a triplicate fares against the thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupVerdict {
    /// The group is not exactly its three labels; no color is assigned.
    Degenerate,
    Miss,
    Partial,
    All,
}

pub fn meets(stat: &SampleStat, thresholds: &Thresholds) -> bool {
    let range_hit = stat.range.is_some_and(|r| r >= thresholds.range);
    let cv_hit = stat.cv.is_some_and(|cv| cv >= thresholds.cv);
    range_hit || cv_hit
}

pub fn group_verdict(record: &GeneRecord, group: Group, thresholds: &Thresholds) -> GroupVerdict {
    let stats = record.group_stats(group);
    let labels: BTreeSet<_> = stats.iter().map(|s| s.sample).collect();
    let expected: BTreeSet<_> = group.members().into_iter().collect();
    if stats.len() != expected.len() || labels != expected {
        return GroupVerdict::Degenerate;
    }

    let hits = stats.iter().filter(|s| meets(s, thresholds)).count();
    match hits {
        0 => GroupVerdict::Miss,
        n if n == stats.len() => GroupVerdict::All,
        _ => GroupVerdict::Partial,
    }
}

/// Row colors and category for one gene.
pub fn classify(record: GeneRecord, thresholds: &Thresholds) -> ClassifiedGene {
    let mut colors = vec![PointColor::Gray; record.stats.len()];
    let mut all_groups_full = true;

    for group in [Group::Mfd, Group::Yb955] {
        let verdict = group_verdict(&record, group, thresholds);
        let color = match verdict {
            GroupVerdict::All => Some(group.full_color()),
            GroupVerdict::Partial => Some(PointColor::Black),
            GroupVerdict::Miss => None,
            GroupVerdict::Degenerate => {
                warn!(
                    "{}: incomplete {group} triplicate, group left unclassified",
                    record.gene
                );
                None
            }
        };
        all_groups_full &= verdict == GroupVerdict::All;

        if let Some(color) = color {
            for (slot, stat) in colors.iter_mut().zip(&record.stats) {
                if stat.sample.group() == group {
                    *slot = color;
                }
            }
        }
    }

    if all_groups_full {
        colors.fill(PointColor::Green);
    }

    let category = category_of(&colors);
    ClassifiedGene {
        record,
        colors,
        category,
    }
}

/// First category, in priority order, whose color appears in `colors`.
pub fn category_of(colors: &[PointColor]) -> Category {
    Category::PRIORITY
        .into_iter()
        .find(|cat| colors.contains(&cat.color()))
        .unwrap_or(Category::BelowThreshold)
}

pub fn classify_all(records: Vec<GeneRecord>, thresholds: &Thresholds) -> Vec<ClassifiedGene> {
    records
        .into_iter()
        .map(|r| classify(r, thresholds))
        .collect()
}
