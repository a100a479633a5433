use anyhow::{Context, Result};

use crate::ctx::Ctx;

pub fn format_summary(ctx: &Ctx) -> Result<String> {
    let version = env!("CARGO_PKG_VERSION");
    let clean = ctx
        .clean
        .as_ref()
        .context("cleaned measurements missing")?;

    let mut out = String::new();
    out.push_str(&format!("kira-qpcr v{}\n", version));
    out.push_str(&format!(
        "Input: {} measurements, {} kept, {} Ct means\n",
        ctx.measurements.len(),
        clean.cleaned.len(),
        clean.means.len()
    ));
    out.push_str(&format!(
        "Reference: {}, groups: {}\n",
        ctx.config.reference_gene,
        ctx.config.groups().len()
    ));
    out.push_str(&format!(
        "Targets: {} normalized, {} rows\n",
        ctx.target_count(),
        ctx.rows.len()
    ));

    if ctx.contaminated_targets.is_empty() {
        out.push_str("Water: clean\n");
    } else {
        out.push_str(&format!(
            "Water: not clean for {}\n",
            ctx.contaminated_targets.join(", ")
        ));
    }

    if ctx.failures.is_empty() {
        out.push_str("Failures: none\n");
    } else {
        out.push_str("Failures:\n");
        for f in &ctx.failures {
            out.push_str(&format!("- {} [{}] {}\n", f.target, f.kind, f.detail));
        }
    }

    for s in &ctx.significance {
        let anova = s
            .anova_p_value
            .map(|p| format!("{:.4}", p))
            .unwrap_or_else(|| "undefined".to_string());
        let comparisons: Vec<String> = s
            .comparisons
            .iter()
            .map(|c| format!("{} {}", c.treatment, c.symbol))
            .collect();
        out.push_str(&format!(
            "Significance {}: ANOVA p={} | {}\n",
            s.target,
            anova,
            comparisons.join(", ")
        ));
    }

    Ok(out)
}
