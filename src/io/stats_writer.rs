use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use crate::ctx::{OutputPaths, target_file_stems};
use crate::io::chart_svg;
use crate::scores::chart::build_target_chart;
use crate::scores::{NormalizedRow, SignificanceResult};

fn fmt_p(p: Option<f64>) -> String {
    match p {
        Some(v) => format!("{:.4}", v),
        None => "undefined".to_string(),
    }
}

pub fn format_stats(result: &SignificanceResult) -> String {
    let mut out = String::new();
    out.push_str(&format!("Statistical Results for {}\n", result.target));
    out.push_str(&format!("ANOVA p-value: {}\n", fmt_p(result.anova_p_value)));
    out.push('\n');
    out.push_str("T-test results (vs Control):\n");
    for c in &result.comparisons {
        out.push_str(&format!(
            "{}: p-value = {} {}\n",
            c.treatment,
            fmt_p(c.p_value),
            c.symbol
        ));
    }
    out
}

pub fn write_stats(path: &Path, result: &SignificanceResult) -> Result<()> {
    std::fs::write(path, format_stats(result))
        .with_context(|| format!("failed to write {}", path.display()))
}

#[derive(Debug, Clone)]
pub struct TargetOutputs {
    pub target: String,
    pub stats_path: PathBuf,
    pub plot_path: PathBuf,
}

/// Text report and chart for every evaluated target gene.
pub fn write_target_outputs(
    paths: &OutputPaths,
    results: &[SignificanceResult],
    rows: &[NormalizedRow],
) -> Result<Vec<TargetOutputs>> {
    let stems = target_file_stems(results.iter().map(|r| r.target.as_str()));
    let mut written = Vec::with_capacity(results.len());
    for (result, stem) in results.iter().zip(stems) {
        let stats_path = paths.stats_path(&stem);
        write_stats(&stats_path, result)?;
        let plot_path = paths.plot_path(&stem);
        chart_svg::write_target_chart(&plot_path, &build_target_chart(result, rows))?;
        info!(
            target_gene = %result.target,
            stats = %stats_path.display(),
            plot = %plot_path.display(),
            "statistical_results_written"
        );
        written.push(TargetOutputs {
            target: result.target.clone(),
            stats_path,
            plot_path,
        });
    }
    Ok(written)
}
