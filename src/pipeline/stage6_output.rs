use anyhow::Result;
use tracing::info;

use crate::ctx::Ctx;
use crate::io::{chart_svg, json_writer, stats_writer, table_writer};
use crate::pipeline::Stage;
use crate::scores::chart::build_chart;

pub struct Stage6Output;

impl Stage6Output {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage6Output {
    fn name(&self) -> &'static str {
        "stage6_output"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        ctx.report.failures = ctx.failures.clone();
        ctx.report.warnings = ctx.warnings.clone();

        if ctx.write_table {
            table_writer::write_table(&ctx.output.table_path, &ctx.rows)?;
            info!(path = %ctx.output.table_path.display(), "table_written");
        }
        if ctx.write_chart {
            let chart = build_chart(&ctx.config.groups(), &ctx.rows, &ctx.significance);
            chart_svg::write_chart(&ctx.output.chart_path, &chart)?;
            info!(path = %ctx.output.chart_path.display(), "chart_written");
        }
        if ctx.write_table {
            stats_writer::write_target_outputs(&ctx.output, &ctx.significance, &ctx.rows)?;
        }
        if ctx.write_json {
            json_writer::write_json(&ctx.output.json_path, &ctx.report)?;
            info!(path = %ctx.output.json_path.display(), "report_written");
        }

        info!("stage6_output_ready");
        Ok(())
    }
}
