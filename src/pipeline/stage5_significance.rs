use anyhow::Result;
use tracing::{info, warn};

use crate::ctx::Ctx;
use crate::pipeline::Stage;
use crate::scores::significance::evaluate_table;

pub struct Stage5Significance;

impl Stage5Significance {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage5Significance {
    fn name(&self) -> &'static str {
        "stage5_significance"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        if !ctx.config.significance {
            info!("significance_skipped");
            return Ok(());
        }

        let (results, failures) = evaluate_table(&ctx.rows, ctx.config.significance_options());
        for failure in &failures {
            warn!(
                target_gene = %failure.target,
                detail = %failure.detail,
                "statistic undefined"
            );
        }
        info!(
            targets = results.len(),
            undefined = failures.len(),
            "significance_ready"
        );

        ctx.report.significance = results.clone();
        ctx.significance = results;
        ctx.failures.extend(failures);
        Ok(())
    }
}
