pub mod clean;
pub mod sentinel;

use std::collections::{BTreeMap, BTreeSet};

pub use clean::{CleanReport, UndeterminedPolicy, clean_measurements};
pub use sentinel::{
    ReplicateMismatch, WATER_CT_THRESHOLD, check_replicates, check_water, check_water_means,
};

/// Raw Ct cell as exported by the instrument.
#[derive(Debug, Clone, PartialEq)]
pub enum RawCt {
    Undetermined,
    Value(String),
}

impl RawCt {
    pub fn parse(cell: &str) -> Self {
        let trimmed = cell.trim();
        if trimmed.eq_ignore_ascii_case("undetermined") {
            Self::Undetermined
        } else {
            Self::Value(trimmed.to_string())
        }
    }
}

/// One well/replicate row.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    pub sample: String,
    pub target: String,
    pub ct: RawCt,
}

impl Measurement {
    pub fn new(sample: impl Into<String>, target: impl Into<String>, ct: RawCt) -> Self {
        Self {
            sample: sample.into(),
            target: target.into(),
            ct,
        }
    }

    pub fn value(sample: impl Into<String>, target: impl Into<String>, ct: f64) -> Self {
        Self::new(sample, target, RawCt::Value(ct.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CleanedMeasurement {
    pub sample: String,
    pub target: String,
    pub ct: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CtMean {
    pub sample: String,
    pub target: String,
    pub ct_mean: f64,
}

/// Mean Ct per (sample, target). A pair is present only when it had at
/// least one valid replicate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CtTable {
    /// sample -> target -> mean Ct
    means: BTreeMap<String, BTreeMap<String, f64>>,
    targets: BTreeSet<String>,
}

impl CtTable {
    pub fn from_cleaned(cleaned: &[CleanedMeasurement]) -> Self {
        let mut acc: BTreeMap<&str, BTreeMap<&str, (f64, usize)>> = BTreeMap::new();
        for m in cleaned {
            let slot = acc
                .entry(m.sample.as_str())
                .or_default()
                .entry(m.target.as_str())
                .or_insert((0.0, 0));
            slot.0 += m.ct;
            slot.1 += 1;
        }

        let mut table = Self::default();
        for (sample, per_target) in acc {
            let row = per_target
                .into_iter()
                .map(|(target, (sum, n))| (target.to_string(), sum / n as f64))
                .collect::<BTreeMap<_, _>>();
            table.targets.extend(row.keys().cloned());
            table.means.insert(sample.to_string(), row);
        }
        table
    }

    pub fn get(&self, sample: &str, target: &str) -> Option<f64> {
        self.means.get(sample)?.get(target).copied()
    }

    pub fn len(&self) -> usize {
        self.means.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.means.is_empty()
    }

    /// Distinct target names, sorted.
    pub fn targets(&self) -> Vec<String> {
        self.targets.iter().cloned().collect()
    }

    pub fn has_target(&self, target: &str) -> bool {
        self.targets.contains(target)
    }

    pub fn has_sample(&self, sample: &str) -> bool {
        self.means.contains_key(sample)
    }

    pub fn without_sample(&self, sample: &str) -> Self {
        let means: BTreeMap<String, BTreeMap<String, f64>> = self
            .means
            .iter()
            .filter(|(s, _)| s.as_str() != sample)
            .map(|(s, row)| (s.clone(), row.clone()))
            .collect();
        let targets = means.values().flat_map(|row| row.keys().cloned()).collect();
        Self { means, targets }
    }

    pub fn rows(&self) -> Vec<CtMean> {
        self.means
            .iter()
            .flat_map(|(sample, row)| {
                row.iter().map(move |(target, ct_mean)| CtMean {
                    sample: sample.clone(),
                    target: target.clone(),
                    ct_mean: *ct_mean,
                })
            })
            .collect()
    }
}
