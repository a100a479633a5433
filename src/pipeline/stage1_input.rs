use std::collections::BTreeSet;

use anyhow::{Result, bail};
use tracing::info;

use crate::ctx::Ctx;
use crate::input;
use crate::pipeline::Stage;

pub struct Stage1Input;

impl Stage1Input {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage1Input {
    fn name(&self) -> &'static str {
        "stage1_input"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        let measurements = input::load_measurements(&ctx.input, ctx.skiplines)?;
        if measurements.is_empty() {
            bail!("{}: no measurement rows found", ctx.input.display());
        }

        let samples: BTreeSet<&str> = measurements.iter().map(|m| m.sample.as_str()).collect();
        let targets: BTreeSet<&str> = measurements.iter().map(|m| m.target.as_str()).collect();
        info!(
            rows = measurements.len(),
            samples = samples.len(),
            targets = targets.len(),
            "input_ready"
        );

        ctx.report.input_meta.measurements = measurements.len();
        ctx.report.input_meta.samples = samples.len();
        ctx.report.input_meta.targets = targets.len();
        ctx.measurements = measurements;
        Ok(())
    }
}
