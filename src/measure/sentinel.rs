use std::collections::BTreeMap;

use serde::Serialize;

use crate::measure::{CleanedMeasurement, CtTable, Measurement};

/// A water well at or below this Ct indicates template contamination.
pub const WATER_CT_THRESHOLD: f64 = 35.0;

/// Targets for which any water replicate amplified at Ct <= 35.
/// Distinct, first-seen order.
pub fn check_water(cleaned: &[CleanedMeasurement], water: &str) -> Vec<String> {
    let mut flagged: Vec<String> = Vec::new();
    for m in cleaned {
        if m.sample == water && m.ct <= WATER_CT_THRESHOLD && !flagged.contains(&m.target) {
            flagged.push(m.target.clone());
        }
    }
    flagged
}

/// Same query over averaged Ct values.
pub fn check_water_means(table: &CtTable, water: &str) -> Vec<String> {
    table
        .rows()
        .into_iter()
        .filter(|row| row.sample == water && row.ct_mean <= WATER_CT_THRESHOLD)
        .map(|row| row.target)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplicateMismatch {
    pub sample: String,
    pub target: String,
    pub found: usize,
}

/// (sample, target) pairs whose well count differs from `expected`,
/// sorted by sample then target. Counts raw rows, undetermined included.
pub fn check_replicates(measurements: &[Measurement], expected: usize) -> Vec<ReplicateMismatch> {
    let mut counts: BTreeMap<(&str, &str), usize> = BTreeMap::new();
    for m in measurements {
        *counts
            .entry((m.sample.as_str(), m.target.as_str()))
            .or_insert(0) += 1;
    }
    counts
        .into_iter()
        .filter(|(_, found)| *found != expected)
        .map(|((sample, target), found)| ReplicateMismatch {
            sample: sample.to_string(),
            target: target.to_string(),
            found,
        })
        .collect()
}
