pub mod chart;
pub mod expression;
pub mod significance;

use serde::{Deserialize, Serialize};

pub const CONTROL_GROUP: &str = "Control";

#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub name: String,
    pub samples: Vec<String>,
    pub is_control: bool,
}

impl Group {
    pub fn treated(name: impl Into<String>, samples: Vec<String>) -> Self {
        Self {
            name: name.into(),
            samples,
            is_control: false,
        }
    }

    pub fn control(samples: Vec<String>) -> Self {
        Self {
            name: CONTROL_GROUP.to_string(),
            samples,
            is_control: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionRow {
    pub group: String,
    pub sample: String,
    pub target: String,
    pub ct_reference: f64,
    pub ct_target: f64,
    pub delta_cq: f64,
    pub delta_cq_expression: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSummary {
    pub group: String,
    pub target: String,
    pub n: usize,
    pub mean_delta_cq_expression: f64,
    pub stdev_delta_cq_expression: Option<f64>,
}

/// One line of the results table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRow {
    pub treatment: String,
    pub sample: String,
    pub target: String,
    pub ct_reference: f64,
    pub ct_target: f64,
    pub delta_cq: f64,
    pub delta_cq_expression: f64,
    pub mean_delta_cq_expression: f64,
    pub stdev_delta_cq_expression: Option<f64>,
    pub ddcq_expression: f64,
    pub ddcq_expression_stdev: Option<f64>,
    pub percent_knockdown: f64,
}

impl NormalizedRow {
    pub fn normalize(row: &ExpressionRow, summary: &GroupSummary, control_mean: f64) -> Self {
        let ddcq_expression = summary.mean_delta_cq_expression / control_mean;
        Self {
            treatment: row.group.clone(),
            sample: row.sample.clone(),
            target: row.target.clone(),
            ct_reference: row.ct_reference,
            ct_target: row.ct_target,
            delta_cq: row.delta_cq,
            delta_cq_expression: row.delta_cq_expression,
            mean_delta_cq_expression: summary.mean_delta_cq_expression,
            stdev_delta_cq_expression: summary.stdev_delta_cq_expression,
            ddcq_expression,
            ddcq_expression_stdev: summary.stdev_delta_cq_expression.map(|s| s / control_mean),
            percent_knockdown: (1.0 - ddcq_expression) * 100.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    ControlUndefined,
    InsufficientSamples,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ControlUndefined => write!(f, "control_undefined"),
            Self::InsufficientSamples => write!(f, "insufficient_samples"),
        }
    }
}

/// A target gene that could not be (fully) evaluated. Never aborts the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetFailure {
    pub target: String,
    pub stage: String,
    pub kind: FailureKind,
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreatmentComparison {
    pub treatment: String,
    pub t_stat: Option<f64>,
    pub p_value: Option<f64>,
    pub symbol: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignificanceResult {
    pub target: String,
    pub anova_f: Option<f64>,
    pub anova_p_value: Option<f64>,
    pub comparisons: Vec<TreatmentComparison>,
}

impl SignificanceResult {
    pub fn symbol_for(&self, treatment: &str) -> Option<&str> {
        self.comparisons
            .iter()
            .find(|c| c.treatment == treatment && c.p_value.is_some())
            .map(|c| c.symbol.as_str())
    }
}

#[derive(Debug, Clone, Default)]
pub struct ExpressionResult {
    pub rows: Vec<NormalizedRow>,
    pub summaries: Vec<GroupSummary>,
    pub failures: Vec<TargetFailure>,
}
