use std::path::Path;

use anyhow::{Context, Result};
use svg::Document;
use svg::node::element::{Line, Rectangle, Text};

use crate::scores::chart::{ChartData, TargetChart};

const PLOT_LEFT: f64 = 90.0;
const PLOT_TOP: f64 = 70.0;
const PLOT_HEIGHT: f64 = 420.0;
const BAR_WIDTH: f64 = 26.0;
const CLUSTER_GAP: f64 = 36.0;
const LEGEND_WIDTH: f64 = 180.0;
const CAP_HALF: f64 = 6.0;

const PALETTE: [&str; 8] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#17becf",
];

fn nice_ceiling(v: f64) -> f64 {
    let v = if v.is_finite() && v > 0.0 { v } else { 1.0 };
    let step = 10f64.powf(v.log10().floor()) / 2.0;
    (v / step).ceil() * step
}

pub fn render_chart(chart: &ChartData) -> String {
    render(
        chart,
        &["Relative Gene Expression Across Treatments".to_string()],
        true,
    )
}

/// Per-gene chart of the statistics stage.
pub fn render_target_chart(chart: &TargetChart) -> String {
    let anova = match chart.anova_p_value {
        Some(p) => format!("{:.4}", p),
        None => "undefined".to_string(),
    };
    render(
        &chart.data,
        &[
            format!("Relative Expression of {}", chart.target),
            format!("ANOVA p-value: {}", anova),
        ],
        false,
    )
}

fn render(chart: &ChartData, title: &[String], legend: bool) -> String {
    let n_targets = chart.targets.len().max(1);
    let cluster_width = BAR_WIDTH * n_targets as f64;
    let plot_width =
        (cluster_width + CLUSTER_GAP) * chart.clusters.len().max(1) as f64 + CLUSTER_GAP;
    let width = PLOT_LEFT + plot_width + LEGEND_WIDTH;
    let height = PLOT_TOP + PLOT_HEIGHT + 110.0;
    let plot_bottom = PLOT_TOP + PLOT_HEIGHT;

    let y_max = nice_ceiling(chart.max_extent().max(1.0) * 1.15);
    let y_for = |v: f64| plot_bottom - (v.clamp(0.0, y_max) / y_max) * PLOT_HEIGHT;

    let mut doc = Document::new()
        .set("viewBox", (0, 0, width, height))
        .set("width", width)
        .set("height", height)
        .add(
            Rectangle::new()
                .set("x", 0)
                .set("y", 0)
                .set("width", width)
                .set("height", height)
                .set("fill", "#ffffff"),
        );
    for (i, line) in title.iter().enumerate() {
        doc = doc.add(
            Text::new(line.clone())
                .set("x", PLOT_LEFT)
                .set("y", 30.0 + 22.0 * i as f64)
                .set("font-family", "sans-serif")
                .set("font-size", if i == 0 { 18 } else { 14 }),
        );
    }

    for i in 0..=5 {
        let v = y_max * i as f64 / 5.0;
        let y = y_for(v);
        doc = doc
            .add(
                Line::new()
                    .set("x1", PLOT_LEFT)
                    .set("y1", y)
                    .set("x2", PLOT_LEFT + plot_width)
                    .set("y2", y)
                    .set("stroke", "#e5e7eb")
                    .set("stroke-width", 1),
            )
            .add(
                Text::new(format!("{:.2}", v))
                    .set("x", PLOT_LEFT - 8.0)
                    .set("y", y + 4.0)
                    .set("text-anchor", "end")
                    .set("font-family", "sans-serif")
                    .set("font-size", 11),
            );
    }

    // Control level.
    doc = doc.add(
        Line::new()
            .set("x1", PLOT_LEFT)
            .set("y1", y_for(1.0))
            .set("x2", PLOT_LEFT + plot_width)
            .set("y2", y_for(1.0))
            .set("stroke", "#6b7280")
            .set("stroke-dasharray", "4 3")
            .set("stroke-width", 1),
    );

    for (ci, cluster) in chart.clusters.iter().enumerate() {
        let x0 = PLOT_LEFT + CLUSTER_GAP + ci as f64 * (cluster_width + CLUSTER_GAP);
        for (ti, bar) in cluster.bars.iter().enumerate() {
            let Some(bar) = bar else { continue };
            if !bar.value.is_finite() {
                continue;
            }
            let x = x0 + ti as f64 * BAR_WIDTH;
            let top = y_for(bar.value);
            doc = doc.add(
                Rectangle::new()
                    .set("x", x + 2.0)
                    .set("y", top)
                    .set("width", BAR_WIDTH - 4.0)
                    .set("height", plot_bottom - top)
                    .set("fill", PALETTE[ti % PALETTE.len()]),
            );

            let cx = x + BAR_WIDTH / 2.0;
            let mut label_y = top;
            if let Some(err) = bar.error.filter(|e| e.is_finite() && *e > 0.0) {
                let hi = y_for(bar.value + err);
                let lo = y_for(bar.value - err);
                label_y = hi;
                for (x1, y1, x2, y2) in [
                    (cx, hi, cx, lo),
                    (cx - CAP_HALF, hi, cx + CAP_HALF, hi),
                    (cx - CAP_HALF, lo, cx + CAP_HALF, lo),
                ] {
                    doc = doc.add(
                        Line::new()
                            .set("x1", x1)
                            .set("y1", y1)
                            .set("x2", x2)
                            .set("y2", y2)
                            .set("stroke", "#111827")
                            .set("stroke-width", 1.2),
                    );
                }
            }
            if let Some(symbol) = &bar.symbol {
                doc = doc.add(
                    Text::new(symbol.clone())
                        .set("x", cx)
                        .set("y", label_y - 4.0)
                        .set("text-anchor", "middle")
                        .set("font-family", "sans-serif")
                        .set("font-size", 12),
                );
            }
        }

        let label_x = x0 + cluster_width / 2.0;
        let label_y = plot_bottom + 18.0;
        doc = doc.add(
            Text::new(cluster.treatment.clone())
                .set("x", label_x)
                .set("y", label_y)
                .set("text-anchor", "end")
                .set(
                    "transform",
                    format!("rotate(-45 {} {})", label_x, label_y),
                )
                .set("font-family", "sans-serif")
                .set("font-size", 12),
        );
    }

    doc = doc
        .add(
            Line::new()
                .set("x1", PLOT_LEFT)
                .set("y1", PLOT_TOP)
                .set("x2", PLOT_LEFT)
                .set("y2", plot_bottom)
                .set("stroke", "#111827"),
        )
        .add(
            Line::new()
                .set("x1", PLOT_LEFT)
                .set("y1", plot_bottom)
                .set("x2", PLOT_LEFT + plot_width)
                .set("y2", plot_bottom)
                .set("stroke", "#111827"),
        )
        .add(
            Text::new("∆∆Cq Expression")
                .set("x", 24.0)
                .set("y", PLOT_TOP + PLOT_HEIGHT / 2.0)
                .set("text-anchor", "middle")
                .set(
                    "transform",
                    format!("rotate(-90 24 {})", PLOT_TOP + PLOT_HEIGHT / 2.0),
                )
                .set("font-family", "sans-serif")
                .set("font-size", 13),
        )
        .add(
            Text::new("Treatment Groups")
                .set("x", PLOT_LEFT + plot_width / 2.0)
                .set("y", height - 12.0)
                .set("text-anchor", "middle")
                .set("font-family", "sans-serif")
                .set("font-size", 13),
        );

    if !legend {
        return doc.to_string();
    }
    let legend_x = PLOT_LEFT + plot_width + 24.0;
    doc = doc.add(
        Text::new("Genes")
            .set("x", legend_x)
            .set("y", PLOT_TOP)
            .set("font-family", "sans-serif")
            .set("font-size", 13),
    );
    for (ti, target) in chart.targets.iter().enumerate() {
        let y = PLOT_TOP + 14.0 + ti as f64 * 20.0;
        doc = doc
            .add(
                Rectangle::new()
                    .set("x", legend_x)
                    .set("y", y)
                    .set("width", 12)
                    .set("height", 12)
                    .set("fill", PALETTE[ti % PALETTE.len()]),
            )
            .add(
                Text::new(target.clone())
                    .set("x", legend_x + 18.0)
                    .set("y", y + 10.0)
                    .set("font-family", "sans-serif")
                    .set("font-size", 12),
            );
    }

    doc.to_string()
}

pub fn write_chart(path: &Path, chart: &ChartData) -> Result<()> {
    std::fs::write(path, render_chart(chart))
        .with_context(|| format!("failed to write {}", path.display()))
}

pub fn write_target_chart(path: &Path, chart: &TargetChart) -> Result<()> {
    std::fs::write(path, render_target_chart(chart))
        .with_context(|| format!("failed to write {}", path.display()))
}
