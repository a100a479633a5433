use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::measure::{CleanedMeasurement, CtTable, Measurement, RawCt};

pub const DEFAULT_UNDETERMINED_CEILING: f64 = 40.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UndeterminedPolicy {
    SubstituteWithCeiling(f64),
    Drop,
}

#[derive(Debug, Clone, Default)]
pub struct CleanReport {
    /// Per-replicate rows that survived every rule, input order.
    pub cleaned: Vec<CleanedMeasurement>,
    pub means: CtTable,
    /// Targets whose every replicate was above the high-Ct ceiling.
    pub removed_targets: Vec<String>,
    pub substituted: usize,
    pub dropped_undetermined: usize,
    pub dropped_non_numeric: usize,
    pub excluded_high_ct: usize,
}

pub fn clean_measurements(
    measurements: &[Measurement],
    policy: UndeterminedPolicy,
    max_ct: Option<f64>,
) -> CleanReport {
    let mut report = CleanReport::default();
    let mut resolved = Vec::with_capacity(measurements.len());

    for m in measurements {
        let ct = match &m.ct {
            RawCt::Undetermined => match policy {
                UndeterminedPolicy::SubstituteWithCeiling(ceiling) => {
                    report.substituted += 1;
                    ceiling
                }
                UndeterminedPolicy::Drop => {
                    report.dropped_undetermined += 1;
                    continue;
                }
            },
            RawCt::Value(raw) => match coerce_ct(raw) {
                Some(v) => v,
                None => {
                    report.dropped_non_numeric += 1;
                    continue;
                }
            },
        };
        resolved.push(CleanedMeasurement {
            sample: m.sample.clone(),
            target: m.target.clone(),
            ct,
        });
    }

    if let Some(limit) = max_ct {
        let before: BTreeSet<String> = resolved.iter().map(|m| m.target.clone()).collect();
        let total = resolved.len();
        resolved.retain(|m| m.ct <= limit);
        report.excluded_high_ct = total - resolved.len();
        let after: BTreeSet<&String> = resolved.iter().map(|m| &m.target).collect();
        report.removed_targets = before
            .into_iter()
            .filter(|t| !after.contains(t))
            .collect();
    }

    report.means = CtTable::from_cleaned(&resolved);
    report.cleaned = resolved;
    report
}

fn coerce_ct(raw: &str) -> Option<f64> {
    let v: f64 = raw.trim().parse().ok()?;
    v.is_finite().then_some(v)
}
