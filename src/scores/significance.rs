use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::math::hypothesis::{one_way_anova, significance_symbol, two_sample_t_test};
use crate::scores::{
    CONTROL_GROUP, FailureKind, NormalizedRow, SignificanceResult, TargetFailure,
    TreatmentComparison,
};

pub const STAGE: &str = "significance";
pub const UNDEFINED_SYMBOL: &str = "n/a";

/// Which per-row value the tests compare.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignificanceBasis {
    /// The ddCq expression column as written in the results table.
    #[default]
    Summary,
    /// Per-sample dCq expression divided by the control mean.
    Sample,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SignificanceOptions {
    pub basis: SignificanceBasis,
    pub welch: bool,
}

/// Values per treatment label, labels in first-seen order.
fn observations(rows: &[NormalizedRow], basis: SignificanceBasis) -> Vec<(String, Vec<f64>)> {
    let control_mean = rows
        .iter()
        .find(|r| r.treatment == CONTROL_GROUP)
        .map(|r| r.mean_delta_cq_expression);

    let mut out: Vec<(String, Vec<f64>)> = Vec::new();
    for row in rows {
        let value = match basis {
            SignificanceBasis::Summary => row.ddcq_expression,
            SignificanceBasis::Sample => match control_mean {
                Some(c) => row.delta_cq_expression / c,
                None => row.ddcq_expression,
            },
        };
        match out.iter_mut().find(|(label, _)| *label == row.treatment) {
            Some((_, values)) => values.push(value),
            None => out.push((row.treatment.clone(), vec![value])),
        }
    }
    out
}

pub fn evaluate_target(
    target: &str,
    rows: &[NormalizedRow],
    options: SignificanceOptions,
) -> (SignificanceResult, Vec<TargetFailure>) {
    let groups = observations(rows, options.basis);
    let mut failures = Vec::new();

    let slices: Vec<&[f64]> = groups.iter().map(|(_, v)| v.as_slice()).collect();
    let (anova_f, anova_p_value) = match one_way_anova(&slices) {
        Ok(outcome) => (Some(outcome.f_stat), Some(outcome.p_value)),
        Err(err) => {
            failures.push(insufficient(target, format!("ANOVA: {}", err)));
            (None, None)
        }
    };

    let control = groups
        .iter()
        .find(|(label, _)| label == CONTROL_GROUP)
        .map(|(_, v)| v.as_slice());

    let mut comparisons = Vec::new();
    for (label, values) in groups.iter().filter(|(l, _)| l != CONTROL_GROUP) {
        let outcome = match control {
            Some(control_values) => two_sample_t_test(control_values, values, options.welch)
                .map_err(|err| err.to_string()),
            None => Err("control group absent".to_string()),
        };
        let comparison = match outcome {
            Ok(t) => TreatmentComparison {
                treatment: label.clone(),
                t_stat: Some(t.t_stat),
                p_value: Some(t.p_value),
                symbol: significance_symbol(t.p_value).to_string(),
            },
            Err(reason) => {
                failures.push(insufficient(target, format!("t-test {}: {}", label, reason)));
                TreatmentComparison {
                    treatment: label.clone(),
                    t_stat: None,
                    p_value: None,
                    symbol: UNDEFINED_SYMBOL.to_string(),
                }
            }
        };
        comparisons.push(comparison);
    }

    let result = SignificanceResult {
        target: target.to_string(),
        anova_f,
        anova_p_value,
        comparisons,
    };
    (result, failures)
}

/// Evaluates every target gene of a results table, targets sorted.
pub fn evaluate_table(
    rows: &[NormalizedRow],
    options: SignificanceOptions,
) -> (Vec<SignificanceResult>, Vec<TargetFailure>) {
    let mut by_target: BTreeMap<&str, Vec<NormalizedRow>> = BTreeMap::new();
    for row in rows {
        by_target
            .entry(row.target.as_str())
            .or_default()
            .push(row.clone());
    }

    let mut results = Vec::with_capacity(by_target.len());
    let mut failures = Vec::new();
    for (target, target_rows) in by_target {
        let (result, mut f) = evaluate_target(target, &target_rows, options);
        results.push(result);
        failures.append(&mut f);
    }
    (results, failures)
}

fn insufficient(target: &str, detail: String) -> TargetFailure {
    TargetFailure {
        target: target.to_string(),
        stage: STAGE.to_string(),
        kind: FailureKind::InsufficientSamples,
        detail,
    }
}
