use serde::Serialize;

use crate::math::stats::mean;
use crate::scores::{CONTROL_GROUP, Group, NormalizedRow, SignificanceResult};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartBar {
    pub value: f64,
    pub error: Option<f64>,
    pub symbol: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartCluster {
    pub treatment: String,
    /// Aligned with `ChartData::targets`; `None` where the target has no row.
    pub bars: Vec<Option<ChartBar>>,
}

/// Grouped-bar series: one cluster per treatment, one bar per target gene.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub targets: Vec<String>,
    pub clusters: Vec<ChartCluster>,
}

impl ChartData {
    pub fn max_extent(&self) -> f64 {
        self.clusters
            .iter()
            .flat_map(|c| c.bars.iter().flatten())
            .map(|b| b.value + b.error.unwrap_or(0.0))
            .filter(|v| v.is_finite())
            .fold(0.0, f64::max)
    }
}

pub fn build_chart(
    groups: &[Group],
    rows: &[NormalizedRow],
    significance: &[SignificanceResult],
) -> ChartData {
    let mut targets: Vec<String> = Vec::new();
    for row in rows {
        if !targets.contains(&row.target) {
            targets.push(row.target.clone());
        }
    }

    let mut clusters = Vec::new();
    for group in groups {
        let bars: Vec<Option<ChartBar>> = targets
            .iter()
            .map(|target| {
                let row = rows
                    .iter()
                    .find(|r| r.treatment == group.name && &r.target == target)?;
                let symbol = if group.is_control {
                    None
                } else {
                    significance
                        .iter()
                        .find(|s| &s.target == target)
                        .and_then(|s| s.symbol_for(&group.name))
                        .map(str::to_string)
                };
                Some(ChartBar {
                    value: row.ddcq_expression,
                    error: row.ddcq_expression_stdev,
                    symbol,
                })
            })
            .collect();
        if bars.iter().any(Option::is_some) {
            clusters.push(ChartCluster {
                treatment: group.name.clone(),
                bars,
            });
        }
    }

    ChartData { targets, clusters }
}

/// Single-gene chart: one bar per treatment, titled with the ANOVA p-value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetChart {
    pub target: String,
    pub anova_p_value: Option<f64>,
    pub data: ChartData,
}

/// Bars are the per-treatment mean of the ddCq column and the mean of its
/// stdev column, treatments in first-seen order.
pub fn build_target_chart(result: &SignificanceResult, rows: &[NormalizedRow]) -> TargetChart {
    let mut treatments: Vec<&str> = Vec::new();
    for row in rows.iter().filter(|r| r.target == result.target) {
        if !treatments.contains(&row.treatment.as_str()) {
            treatments.push(&row.treatment);
        }
    }

    let clusters = treatments
        .into_iter()
        .map(|treatment| {
            let group_rows: Vec<&NormalizedRow> = rows
                .iter()
                .filter(|r| r.target == result.target && r.treatment == treatment)
                .collect();
            let values: Vec<f64> = group_rows.iter().map(|r| r.ddcq_expression).collect();
            let errors: Vec<f64> = group_rows
                .iter()
                .filter_map(|r| r.ddcq_expression_stdev)
                .collect();
            let bar = mean(&values).map(|value| ChartBar {
                value,
                error: mean(&errors),
                symbol: if treatment == CONTROL_GROUP {
                    None
                } else {
                    result.symbol_for(treatment).map(str::to_string)
                },
            });
            ChartCluster {
                treatment: treatment.to_string(),
                bars: vec![bar],
            }
        })
        .collect();

    TargetChart {
        target: result.target.clone(),
        anova_p_value: result.anova_p_value,
        data: ChartData {
            targets: vec![result.target.clone()],
            clusters,
        },
    }
}
