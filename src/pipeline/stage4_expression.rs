use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::ctx::Ctx;
use crate::pipeline::Stage;
use crate::scores::ExpressionResult;
use crate::scores::expression::compute_expression;

pub struct Stage4Expression;

impl Stage4Expression {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage4Expression {
    fn name(&self) -> &'static str {
        "stage4_expression"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        let table = ctx
            .ct_table
            .as_ref()
            .context("Ct table missing before expression stage")?;
        let reference = ctx.config.reference_gene.as_str();

        if !table.has_target(reference) {
            warn!(reference = %reference, "reference gene has no valid Ct");
            ctx.warnings.push(format!(
                "reference gene '{}' has no valid Ct in any sample",
                reference
            ));
        }

        let groups = ctx.config.groups();
        for group in &groups {
            let missing: Vec<&str> = group
                .samples
                .iter()
                .filter(|s| !table.has_sample(s))
                .map(String::as_str)
                .collect();
            if !missing.is_empty() {
                ctx.warnings.push(format!(
                    "group '{}': sample(s) without valid Ct: {}",
                    group.name,
                    missing.join(", ")
                ));
            }
        }

        let result = run_parallel(ctx.threads, || compute_expression(table, reference, &groups))?;

        for failure in &result.failures {
            warn!(
                target_gene = %failure.target,
                kind = %failure.kind,
                detail = %failure.detail,
                "target gene not normalized"
            );
        }
        info!(
            rows = result.rows.len(),
            failed_targets = result.failures.len(),
            "expression_ready"
        );

        ctx.report.rows = result.rows.clone();
        ctx.report.group_summaries = result.summaries.clone();
        ctx.failures.extend(result.failures);
        ctx.rows = result.rows;
        ctx.summaries = result.summaries;
        Ok(())
    }
}

#[cfg(feature = "mt")]
fn run_parallel<F>(threads: usize, f: F) -> Result<ExpressionResult>
where
    F: FnOnce() -> ExpressionResult + Send,
{
    if threads == 0 {
        return Ok(f());
    }
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .map_err(|e| anyhow::anyhow!("failed to build thread pool: {}", e))?;
    Ok(pool.install(f))
}

#[cfg(not(feature = "mt"))]
fn run_parallel<F>(_threads: usize, f: F) -> Result<ExpressionResult>
where
    F: FnOnce() -> ExpressionResult,
{
    Ok(f())
}
