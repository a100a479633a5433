use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::ctx::Ctx;
use crate::measure::{check_replicates, check_water};
use crate::pipeline::Stage;

pub struct Stage3Sentinel;

impl Stage3Sentinel {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage3Sentinel {
    fn name(&self) -> &'static str {
        "stage3_sentinel"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        let clean = ctx
            .clean
            .as_ref()
            .context("cleaned measurements missing before quality check")?;
        let water = ctx.config.water_sample.clone();

        let found = clean.cleaned.iter().any(|m| m.sample == water)
            || ctx.measurements.iter().any(|m| m.sample == water);
        let flagged = check_water(&clean.cleaned, &water);

        if !found {
            warn!(water = %water, "water sample not found");
            ctx.warnings
                .push(format!("water sample '{}' not found in input", water));
        }
        if flagged.is_empty() {
            info!(water = %water, "water_template_clean");
        } else {
            warn!(water = %water, targets = ?flagged, "water template is not clean");
            ctx.warnings.push(format!(
                "water template is not clean for targets: {}",
                flagged.join(", ")
            ));
        }

        if let Some(expected) = ctx.config.replicates {
            let mismatches = check_replicates(&ctx.measurements, expected as usize);
            if !mismatches.is_empty() {
                warn!(
                    expected,
                    pairs = mismatches.len(),
                    "replicate count differs from configuration"
                );
                let listed: Vec<String> = mismatches
                    .iter()
                    .map(|m| format!("{}/{} ({})", m.sample, m.target, m.found))
                    .collect();
                ctx.warnings.push(format!(
                    "expected {} replicate(s) per sample and target, found otherwise for: {}",
                    expected,
                    listed.join(", ")
                ));
            }
            ctx.report.quality.expected_replicates = Some(expected);
            ctx.report.quality.replicate_mismatches = mismatches;
        }

        ctx.report.quality.water_sample = water;
        ctx.report.quality.water_found = found;
        ctx.report.quality.contaminated_targets = flagged.clone();
        ctx.contaminated_targets = flagged;
        Ok(())
    }
}
