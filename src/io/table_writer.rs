//! Results table in CSV. Column names and order are read back by exact name
//! by the statistics subcommand and by downstream tools.

use std::path::Path;

use anyhow::{Context, Result, bail};

use crate::io::{fmt_opt, open_maybe_gz};
use crate::scores::NormalizedRow;

pub const TABLE_COLUMNS: [&str; 12] = [
    "Treatment",
    "Sample",
    "Target Gene",
    "Cq Reference Gene",
    "Cq Target",
    "∆Cq",
    "∆Cq Expression",
    "Mean ∆Cq Expression",
    "∆Cq Expression stdev",
    "∆∆Cq Expression",
    "∆∆Cq Expression stdev",
    "% KD",
];

pub fn table_record(row: &NormalizedRow) -> [String; 12] {
    [
        row.treatment.clone(),
        row.sample.clone(),
        row.target.clone(),
        row.ct_reference.to_string(),
        row.ct_target.to_string(),
        row.delta_cq.to_string(),
        row.delta_cq_expression.to_string(),
        row.mean_delta_cq_expression.to_string(),
        fmt_opt(row.stdev_delta_cq_expression),
        row.ddcq_expression.to_string(),
        fmt_opt(row.ddcq_expression_stdev),
        row.percent_knockdown.to_string(),
    ]
}

pub fn table_to_string(rows: &[NormalizedRow]) -> Result<String> {
    let mut w = csv::Writer::from_writer(Vec::new());
    w.write_record(TABLE_COLUMNS)?;
    for row in rows {
        w.write_record(table_record(row))?;
    }
    let bytes = w
        .into_inner()
        .map_err(|e| anyhow::anyhow!("failed to flush table: {}", e))?;
    Ok(String::from_utf8(bytes)?)
}

pub fn write_table(path: &Path, rows: &[NormalizedRow]) -> Result<()> {
    let content = table_to_string(rows)?;
    std::fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))
}

pub fn read_table(path: &Path) -> Result<Vec<NormalizedRow>> {
    let reader = open_maybe_gz(path)
        .with_context(|| format!("failed to open table {}", path.display()))?;
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(reader);
    let source = path.display().to_string();

    let headers = csv_reader
        .headers()
        .with_context(|| format!("{}: failed to read header row", source))?
        .clone();
    let mut idx = [0usize; 12];
    for (slot, column) in idx.iter_mut().zip(TABLE_COLUMNS) {
        *slot = headers
            .iter()
            .position(|h| h == column)
            .with_context(|| format!("{}: missing column '{}'", source, column))?;
    }

    let mut rows = Vec::new();
    for (line, record) in csv_reader.records().enumerate() {
        let record = record.with_context(|| format!("{}: malformed row {}", source, line + 2))?;
        let cell = |i: usize| record.get(idx[i]).unwrap_or_default().trim();
        let num = |i: usize| -> Result<f64> {
            let raw = cell(i);
            raw.parse::<f64>().with_context(|| {
                format!(
                    "{}: row {} column '{}' is not a number: '{}'",
                    source,
                    line + 2,
                    TABLE_COLUMNS[i],
                    raw
                )
            })
        };
        let opt = |i: usize| -> Result<Option<f64>> {
            if cell(i).is_empty() {
                Ok(None)
            } else {
                num(i).map(Some)
            }
        };
        if cell(0).is_empty() || cell(2).is_empty() {
            bail!("{}: row {} lacks treatment or target gene", source, line + 2);
        }
        rows.push(NormalizedRow {
            treatment: cell(0).to_string(),
            sample: cell(1).to_string(),
            target: cell(2).to_string(),
            ct_reference: num(3)?,
            ct_target: num(4)?,
            delta_cq: num(5)?,
            delta_cq_expression: num(6)?,
            mean_delta_cq_expression: num(7)?,
            stdev_delta_cq_expression: opt(8)?,
            ddcq_expression: num(9)?,
            ddcq_expression_stdev: opt(10)?,
            percent_knockdown: num(11)?,
        });
    }
    Ok(rows)
}
