use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::config::AnalysisConfig;
use crate::measure::{CleanReport, CtTable, Measurement};
use crate::schema::v1::QpcrV1;
use crate::scores::{GroupSummary, NormalizedRow, SignificanceResult, TargetFailure};

#[derive(Debug, Clone)]
pub struct OutputPaths {
    pub out_dir: PathBuf,
    pub table_path: PathBuf,
    pub chart_path: PathBuf,
    pub json_path: PathBuf,
    pub prefix: String,
}

impl OutputPaths {
    pub fn new(out_dir: PathBuf, prefix: &str) -> Self {
        Self {
            table_path: out_dir.join(format!("{}_table.csv", prefix)),
            chart_path: out_dir.join(format!("{}.svg", prefix)),
            json_path: out_dir.join(format!("{}_report.json", prefix)),
            prefix: prefix.to_string(),
            out_dir,
        }
    }

    /// `stem` comes from [`target_file_stems`].
    pub fn stats_path(&self, stem: &str) -> PathBuf {
        self.out_dir
            .join(format!("{}_{}_statistical_results.txt", self.prefix, stem))
    }

    pub fn plot_path(&self, stem: &str) -> PathBuf {
        self.out_dir
            .join(format!("{}_{}_statistical_plot.svg", self.prefix, stem))
    }
}

/// File name components for per-target outputs, aligned with `targets`.
/// Names that sanitize to an already used component get `_2`, `_3`, ...
pub fn target_file_stems<'a, I>(targets: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut used: HashSet<String> = HashSet::new();
    let mut stems = Vec::new();
    for target in targets {
        let base = sanitize_file_component(target);
        let mut stem = base.clone();
        let mut n = 2;
        while used.contains(&stem) {
            stem = format!("{}_{}", base, n);
            n += 1;
        }
        used.insert(stem.clone());
        stems.push(stem);
    }
    stems
}

fn sanitize_file_component(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[derive(Debug)]
pub struct Ctx {
    pub input: PathBuf,
    pub skiplines: usize,
    pub config: AnalysisConfig,
    pub write_table: bool,
    pub write_chart: bool,
    pub write_json: bool,
    pub threads: usize,
    pub measurements: Vec<Measurement>,
    pub clean: Option<CleanReport>,
    /// Ct means with the water sample removed; input of the calculator.
    pub ct_table: Option<CtTable>,
    pub contaminated_targets: Vec<String>,
    pub rows: Vec<NormalizedRow>,
    pub summaries: Vec<GroupSummary>,
    pub significance: Vec<SignificanceResult>,
    pub failures: Vec<TargetFailure>,
    pub warnings: Vec<String>,
    pub output: OutputPaths,
    pub report: QpcrV1,
}

impl Ctx {
    pub fn new(
        input: PathBuf,
        out_dir: PathBuf,
        prefix: &str,
        config: AnalysisConfig,
        tool_version: &str,
    ) -> Self {
        Self {
            input,
            skiplines: 0,
            config,
            write_table: true,
            write_chart: true,
            write_json: true,
            threads: 0,
            measurements: Vec::new(),
            clean: None,
            ct_table: None,
            contaminated_targets: Vec::new(),
            rows: Vec::new(),
            summaries: Vec::new(),
            significance: Vec::new(),
            failures: Vec::new(),
            warnings: Vec::new(),
            output: OutputPaths::new(out_dir, prefix),
            report: QpcrV1::empty(tool_version),
        }
    }

    pub fn input_label(&self) -> String {
        label_from_path(&self.input)
    }

    pub fn target_count(&self) -> usize {
        let mut targets: Vec<&str> = self.rows.iter().map(|r| r.target.as_str()).collect();
        targets.dedup();
        targets.len()
    }
}

pub fn label_from_path(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("input")
        .to_string()
}
