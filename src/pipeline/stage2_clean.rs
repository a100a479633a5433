use anyhow::Result;
use tracing::{info, warn};

use crate::ctx::Ctx;
use crate::measure::clean_measurements;
use crate::pipeline::Stage;

pub struct Stage2Clean;

impl Stage2Clean {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage2Clean {
    fn name(&self) -> &'static str {
        "stage2_clean"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        let report = clean_measurements(
            &ctx.measurements,
            ctx.config.undetermined_policy,
            ctx.config.max_ct,
        );

        info!(
            kept = report.cleaned.len(),
            substituted = report.substituted,
            dropped_undetermined = report.dropped_undetermined,
            dropped_non_numeric = report.dropped_non_numeric,
            excluded_high_ct = report.excluded_high_ct,
            ct_means = report.means.len(),
            "ct_cleaned"
        );

        if report.dropped_non_numeric > 0 {
            ctx.warnings.push(format!(
                "{} row(s) with non-numeric Ct dropped",
                report.dropped_non_numeric
            ));
        }
        if !report.removed_targets.is_empty() {
            warn!(targets = ?report.removed_targets, "targets removed by high-Ct rule");
            ctx.warnings.push(format!(
                "genes removed due to high Ct values: {}",
                report.removed_targets.join(", ")
            ));
        }

        let cleaning = &mut ctx.report.cleaning;
        cleaning.kept = report.cleaned.len();
        cleaning.substituted_undetermined = report.substituted;
        cleaning.dropped_undetermined = report.dropped_undetermined;
        cleaning.dropped_non_numeric = report.dropped_non_numeric;
        cleaning.excluded_high_ct = report.excluded_high_ct;
        cleaning.removed_targets = report.removed_targets.clone();
        cleaning.ct_means = report.means.len();

        ctx.ct_table = Some(report.means.without_sample(&ctx.config.water_sample));
        ctx.clean = Some(report);
        Ok(())
    }
}
