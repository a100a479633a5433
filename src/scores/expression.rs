//! Delta-Cq / delta-delta-Cq normalization.
//!
//! Each target gene is an independent pure computation over the Ct table
//! and the group layout. Rows come out grouped by target (sorted), then in
//! group order, then in sample order within the group.

#[cfg(feature = "mt")]
use rayon::prelude::*;

use crate::math::stats::{mean, relative_expression, sample_stdev};
use crate::measure::CtTable;
use crate::scores::{
    ExpressionResult, ExpressionRow, FailureKind, Group, GroupSummary, NormalizedRow,
    TargetFailure,
};

pub const STAGE: &str = "expression";

type TargetOutcome = Result<(Vec<NormalizedRow>, Vec<GroupSummary>), TargetFailure>;

pub fn compute_expression(table: &CtTable, reference: &str, groups: &[Group]) -> ExpressionResult {
    let targets: Vec<String> = table
        .targets()
        .into_iter()
        .filter(|t| t != reference)
        .collect();

    #[cfg(feature = "mt")]
    let outcomes: Vec<TargetOutcome> = targets
        .par_iter()
        .map(|t| compute_target(table, reference, groups, t))
        .collect();
    #[cfg(not(feature = "mt"))]
    let outcomes: Vec<TargetOutcome> = targets
        .iter()
        .map(|t| compute_target(table, reference, groups, t))
        .collect();

    let mut result = ExpressionResult::default();
    for outcome in outcomes {
        match outcome {
            Ok((rows, summaries)) => {
                result.rows.extend(rows);
                result.summaries.extend(summaries);
            }
            Err(failure) => result.failures.push(failure),
        }
    }
    result
}

/// Raw delta-Cq rows for one group. Samples lacking either Ct are skipped.
pub fn expression_rows(
    table: &CtTable,
    reference: &str,
    group: &Group,
    target: &str,
) -> Vec<ExpressionRow> {
    let mut rows = Vec::with_capacity(group.samples.len());
    for sample in &group.samples {
        let (Some(ct_reference), Some(ct_target)) =
            (table.get(sample, reference), table.get(sample, target))
        else {
            continue;
        };
        let delta_cq = ct_target - ct_reference;
        rows.push(ExpressionRow {
            group: group.name.clone(),
            sample: sample.clone(),
            target: target.to_string(),
            ct_reference,
            ct_target,
            delta_cq,
            delta_cq_expression: relative_expression(delta_cq),
        });
    }
    rows
}

pub fn summarize(group: &str, target: &str, rows: &[ExpressionRow]) -> Option<GroupSummary> {
    let values: Vec<f64> = rows.iter().map(|r| r.delta_cq_expression).collect();
    let mean_delta_cq_expression = mean(&values)?;
    Some(GroupSummary {
        group: group.to_string(),
        target: target.to_string(),
        n: values.len(),
        mean_delta_cq_expression,
        stdev_delta_cq_expression: sample_stdev(&values),
    })
}

pub fn compute_target(
    table: &CtTable,
    reference: &str,
    groups: &[Group],
    target: &str,
) -> TargetOutcome {
    let mut per_group: Vec<(Vec<ExpressionRow>, GroupSummary)> = Vec::new();
    let mut control_mean = None;

    for group in groups {
        let rows = expression_rows(table, reference, group, target);
        let Some(summary) = summarize(&group.name, target, &rows) else {
            continue;
        };
        if group.is_control {
            control_mean = Some(summary.mean_delta_cq_expression);
        }
        per_group.push((rows, summary));
    }

    let control_mean = match control_mean {
        Some(m) if m.is_finite() && m != 0.0 => m,
        Some(m) => {
            return Err(failure(
                target,
                format!("control mean delta-Cq expression is {} and cannot normalize", m),
            ));
        }
        None => {
            return Err(failure(
                target,
                "control group has no sample with both reference and target Ct".to_string(),
            ));
        }
    };

    let mut rows = Vec::new();
    let mut summaries = Vec::with_capacity(per_group.len());
    for (group_rows, summary) in per_group {
        rows.extend(
            group_rows
                .iter()
                .map(|r| NormalizedRow::normalize(r, &summary, control_mean)),
        );
        summaries.push(summary);
    }
    Ok((rows, summaries))
}

fn failure(target: &str, detail: String) -> TargetFailure {
    TargetFailure {
        target: target.to_string(),
        stage: STAGE.to_string(),
        kind: FailureKind::ControlUndefined,
        detail,
    }
}
