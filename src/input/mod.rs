//! Measurement loader for delimited exports of an instrument "Results" sheet.

use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use anyhow::{Context, Result, bail};
use tracing::info;

use crate::io::open_maybe_gz;
use crate::measure::{Measurement, RawCt};

pub const SAMPLE_COLUMN: &str = "Sample Name";
pub const TARGET_COLUMN: &str = "Target Name";
/// Ct column spellings of the supported instrument exports.
pub const CT_COLUMNS: [&str; 3] = ["CT", "Cт", "Cq"];

pub fn delimiter_for(path: &Path) -> u8 {
    let name = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    let name = name.strip_suffix(".gz").unwrap_or(&name);
    if name.ends_with(".tsv") || name.ends_with(".txt") {
        b'\t'
    } else {
        b','
    }
}

pub fn load_measurements(path: &Path, skiplines: usize) -> Result<Vec<Measurement>> {
    let reader = open_maybe_gz(path)
        .with_context(|| format!("failed to open measurements {}", path.display()))?;
    let measurements = parse_measurements(
        reader,
        delimiter_for(path),
        skiplines,
        &path.display().to_string(),
    )?;
    info!(
        input = %path.display(),
        rows = measurements.len(),
        "measurements_loaded"
    );
    Ok(measurements)
}

pub fn parse_measurements<R: Read>(
    reader: R,
    delimiter: u8,
    skiplines: usize,
    source: &str,
) -> Result<Vec<Measurement>> {
    let mut buffered = BufReader::new(reader);
    let mut line = String::new();
    for skipped in 0..skiplines {
        line.clear();
        let n = buffered
            .read_line(&mut line)
            .with_context(|| format!("{}: failed to read line {}", source, skipped + 1))?;
        if n == 0 {
            bail!(
                "{}: input ended after {} lines while skipping {}",
                source,
                skipped,
                skiplines
            );
        }
    }

    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(buffered);

    let headers = csv_reader
        .headers()
        .with_context(|| format!("{}: failed to read header row", source))?
        .clone();
    let find = |name: &str| headers.iter().position(|h| h.trim() == name);

    let sample_idx = find(SAMPLE_COLUMN)
        .with_context(|| format!("{}: missing column '{}'", source, SAMPLE_COLUMN))?;
    let target_idx = find(TARGET_COLUMN)
        .with_context(|| format!("{}: missing column '{}'", source, TARGET_COLUMN))?;
    let ct_idx = CT_COLUMNS
        .iter()
        .find_map(|c| find(c))
        .with_context(|| format!("{}: missing Ct column (one of {:?})", source, CT_COLUMNS))?;

    let mut out = Vec::new();
    for (idx, record) in csv_reader.records().enumerate() {
        let record = record.with_context(|| {
            format!("{}: malformed row {}", source, idx + skiplines + 2)
        })?;
        let sample = record.get(sample_idx).unwrap_or_default().trim();
        let target = record.get(target_idx).unwrap_or_default().trim();
        if sample.is_empty() || target.is_empty() {
            continue;
        }
        let ct = RawCt::parse(record.get(ct_idx).unwrap_or_default());
        out.push(Measurement::new(sample, target, ct));
    }
    Ok(out)
}
