use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::measure::UndeterminedPolicy;
use crate::measure::clean::DEFAULT_UNDETERMINED_CEILING;
use crate::scores::significance::{SignificanceBasis, SignificanceOptions};
use crate::scores::{CONTROL_GROUP, Group};

/// Sample names given either as "A, B, C" or as a YAML list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum SampleList {
    Joined(String),
    List(Vec<String>),
}

impl SampleList {
    fn into_names(self) -> Vec<String> {
        let raw = match self {
            Self::Joined(s) => s.split(',').map(str::to_string).collect::<Vec<_>>(),
            Self::List(v) => v,
        };
        raw.into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
enum UndeterminedMode {
    #[default]
    Drop,
    Ceiling,
}

#[derive(Debug, Deserialize)]
struct TreatedGroupFile {
    name: String,
    samples: SampleList,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    ref_gene: String,
    ntc: SampleList,
    water: String,
    #[serde(default)]
    replicates: Option<u32>,
    #[serde(default)]
    treated_groups: Vec<TreatedGroupFile>,
    #[serde(default)]
    undetermined: UndeterminedMode,
    #[serde(default)]
    undetermined_ceiling: Option<f64>,
    #[serde(default)]
    max_ct: Option<f64>,
    #[serde(default)]
    significance: bool,
    #[serde(default)]
    welch: bool,
    #[serde(default)]
    significance_basis: SignificanceBasis,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreatedGroup {
    pub name: String,
    pub samples: Vec<String>,
}

/// Validated run configuration handed to the core.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisConfig {
    pub reference_gene: String,
    pub control_samples: Vec<String>,
    pub water_sample: String,
    pub treated_groups: Vec<TreatedGroup>,
    pub undetermined_policy: UndeterminedPolicy,
    pub max_ct: Option<f64>,
    /// Expected wells per (sample, target); deviations are warnings.
    pub replicates: Option<u32>,
    pub significance: bool,
    pub welch: bool,
    pub significance_basis: SignificanceBasis,
}

impl AnalysisConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_yaml_str(&content, &path.display().to_string())
    }

    pub fn from_yaml_str(content: &str, source: &str) -> Result<Self> {
        let file: ConfigFile = serde_yaml::from_str(content)
            .with_context(|| format!("{}: malformed config", source))?;

        let undetermined_policy = match file.undetermined {
            UndeterminedMode::Drop => UndeterminedPolicy::Drop,
            UndeterminedMode::Ceiling => UndeterminedPolicy::SubstituteWithCeiling(
                file.undetermined_ceiling
                    .unwrap_or(DEFAULT_UNDETERMINED_CEILING),
            ),
        };

        let config = Self {
            reference_gene: file.ref_gene.trim().to_string(),
            control_samples: file.ntc.into_names(),
            water_sample: file.water.trim().to_string(),
            treated_groups: file
                .treated_groups
                .into_iter()
                .map(|g| TreatedGroup {
                    name: g.name.trim().to_string(),
                    samples: g.samples.into_names(),
                })
                .collect(),
            undetermined_policy,
            max_ct: file.max_ct,
            replicates: file.replicates,
            significance: file.significance,
            welch: file.welch,
            significance_basis: file.significance_basis,
        };
        config
            .validate()
            .with_context(|| format!("{}: invalid config", source))?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.reference_gene.is_empty() {
            bail!("ref_gene must not be empty");
        }
        if self.control_samples.is_empty() {
            bail!("ntc must name at least one control sample");
        }
        if self.water_sample.is_empty() {
            bail!("water must not be empty");
        }
        let mut seen = HashSet::new();
        for (idx, group) in self.treated_groups.iter().enumerate() {
            if group.name.is_empty() {
                bail!("treated_groups[{}].name must not be empty", idx);
            }
            if group.name == CONTROL_GROUP {
                bail!("treated_groups[{}].name '{}' is reserved", idx, CONTROL_GROUP);
            }
            if !seen.insert(group.name.as_str()) {
                bail!("treated_groups[{}].name '{}' is duplicated", idx, group.name);
            }
            if group.samples.is_empty() {
                bail!("treated_groups[{}].samples must not be empty", idx);
            }
        }
        if let UndeterminedPolicy::SubstituteWithCeiling(ceiling) = self.undetermined_policy {
            if !(ceiling.is_finite() && ceiling > 0.0) {
                bail!("undetermined_ceiling must be a positive number");
            }
        }
        if self.replicates == Some(0) {
            bail!("replicates must be at least 1");
        }
        if let Some(max_ct) = self.max_ct {
            if !(max_ct.is_finite() && max_ct > 0.0) {
                bail!("max_ct must be a positive number");
            }
        }
        Ok(())
    }

    /// Treated groups in file order, then the control group.
    pub fn groups(&self) -> Vec<Group> {
        let mut groups: Vec<Group> = self
            .treated_groups
            .iter()
            .map(|g| Group::treated(g.name.clone(), g.samples.clone()))
            .collect();
        groups.push(Group::control(self.control_samples.clone()));
        groups
    }

    pub fn significance_options(&self) -> SignificanceOptions {
        SignificanceOptions {
            basis: self.significance_basis,
            welch: self.welch,
        }
    }
}
