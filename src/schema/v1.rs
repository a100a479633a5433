use serde::Serialize;

use crate::config::AnalysisConfig;
use crate::measure::ReplicateMismatch;
use crate::scores::{GroupSummary, NormalizedRow, SignificanceResult, TargetFailure};

#[derive(Debug, Clone, Default, Serialize)]
pub struct InputMeta {
    pub source: String,
    pub measurements: usize,
    pub samples: usize,
    pub targets: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Cleaning {
    pub kept: usize,
    pub substituted_undetermined: usize,
    pub dropped_undetermined: usize,
    pub dropped_non_numeric: usize,
    pub excluded_high_ct: usize,
    pub removed_targets: Vec<String>,
    pub ct_means: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct QualityControl {
    pub water_sample: String,
    pub water_found: bool,
    pub contaminated_targets: Vec<String>,
    pub expected_replicates: Option<u32>,
    pub replicate_mismatches: Vec<ReplicateMismatch>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QpcrV1 {
    pub tool: String,
    pub version: String,
    pub schema_version: String,
    pub config: Option<AnalysisConfig>,
    pub input_meta: InputMeta,
    pub cleaning: Cleaning,
    pub quality: QualityControl,
    pub rows: Vec<NormalizedRow>,
    pub group_summaries: Vec<GroupSummary>,
    pub significance: Vec<SignificanceResult>,
    pub failures: Vec<TargetFailure>,
    pub warnings: Vec<String>,
}

impl QpcrV1 {
    pub fn empty(tool_version: &str) -> Self {
        Self {
            tool: "kira-qpcr".to_string(),
            version: tool_version.to_string(),
            schema_version: "v1".to_string(),
            config: None,
            input_meta: InputMeta::default(),
            cleaning: Cleaning::default(),
            quality: QualityControl::default(),
            rows: Vec::new(),
            group_summaries: Vec::new(),
            significance: Vec::new(),
            failures: Vec::new(),
            warnings: Vec::new(),
        }
    }
}
