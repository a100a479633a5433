use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use serde_json::Value;
use tempfile::TempDir;

const PLATE: &str = "\
* Instrument Type = sds7900
* Experiment Name = knockdown

Well,Sample Name,Target Name,CT
A1,KD1,GAPDH,20.0
A2,KD1,TP53,23.0
A3,KD1,MYC,25.0
A4,KD2,GAPDH,20.1
A5,KD2,TP53,23.2
A6,KD2,MYC,25.3
A7,KD3,GAPDH,19.9
A8,KD3,TP53,22.8
A9,KD3,MYC,24.9
B1,C1,GAPDH,20.0
B2,C1,TP53,20.0
B3,C1,MYC,24.0
B4,C2,GAPDH,20.2
B5,C2,TP53,20.3
B6,C2,MYC,24.1
B7,C3,GAPDH,19.8
B8,C3,TP53,20.1
B9,C3,MYC,23.9
C1,H2O,GAPDH,Undetermined
C2,H2O,TP53,Undetermined
C3,H2O,MYC,Undetermined
";

const CONFIG: &str = "\
ref_gene: GAPDH
ntc: C1, C2, C3
water: H2O
treated_groups:
  - name: siTP53
    samples: KD1, KD2, KD3
significance: true
";

fn write_inputs(dir: &Path, plate: &str, config: &str) -> (PathBuf, PathBuf) {
    let input = dir.join("plate.csv");
    let cfg = dir.join("run.yaml");
    fs::write(&input, plate).unwrap();
    fs::write(&cfg, config).unwrap();
    (input, cfg)
}

fn run_cmd(input: &Path, config: &Path, out: &Path) -> Command {
    let mut cmd = Command::cargo_bin("kira-qpcr").unwrap();
    cmd.args([
        "run",
        "--input",
        input.to_str().unwrap(),
        "--config",
        config.to_str().unwrap(),
        "--out",
        out.to_str().unwrap(),
        "--skiplines",
        "3",
    ]);
    cmd
}

fn run_pipeline(input: &Path, config: &Path, out: &Path) -> String {
    let output = run_cmd(input, config, out).assert().success().get_output().clone();
    String::from_utf8(output.stdout).unwrap()
}

fn report(out: &Path) -> Value {
    serde_json::from_slice(&fs::read(out.join("qpcr_report.json")).unwrap()).unwrap()
}

#[test]
fn pipeline_writes_all_outputs() {
    let tmp = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let (input, config) = write_inputs(tmp.path(), PLATE, CONFIG);
    let stdout = run_pipeline(&input, &config, out.path());

    for name in [
        "qpcr_table.csv",
        "qpcr.svg",
        "qpcr_report.json",
        "qpcr_MYC_statistical_results.txt",
        "qpcr_TP53_statistical_results.txt",
        "qpcr_MYC_statistical_plot.svg",
        "qpcr_TP53_statistical_plot.svg",
    ] {
        assert!(out.path().join(name).exists(), "missing {}", name);
    }
    assert!(stdout.contains("Table saved to"));
    assert!(stdout.contains("Plot saved to"));
    assert!(stdout.contains("Water: clean"));
}

#[test]
fn pipeline_table_rows_follow_target_then_group_order() {
    let tmp = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let (input, config) = write_inputs(tmp.path(), PLATE, CONFIG);
    run_pipeline(&input, &config, out.path());

    let table = fs::read_to_string(out.path().join("qpcr_table.csv")).unwrap();
    let lines: Vec<&str> = table.lines().collect();
    assert_eq!(lines.len(), 13);
    assert!(lines[0].starts_with("Treatment,Sample,Target Gene,Cq Reference Gene"));
    assert!(lines[1].starts_with("siTP53,KD1,MYC,"));
    assert!(lines[4].starts_with("Control,C1,MYC,"));
    assert!(lines[7].starts_with("siTP53,KD1,TP53,"));
    assert!(lines[12].starts_with("Control,C3,TP53,"));
    assert!(!table.contains("H2O"));
}

#[test]
fn pipeline_report_json_fields() {
    let tmp = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let (input, config) = write_inputs(tmp.path(), PLATE, CONFIG);
    run_pipeline(&input, &config, out.path());

    let v = report(out.path());
    assert_eq!(v["tool"], "kira-qpcr");
    assert_eq!(v["schema_version"], "v1");
    assert!(v["version"].is_string());
    assert_eq!(v["config"]["reference_gene"], "GAPDH");
    assert_eq!(v["input_meta"]["measurements"], 21);
    assert_eq!(v["cleaning"]["dropped_undetermined"], 3);
    assert_eq!(v["quality"]["water_found"], true);
    assert_eq!(v["rows"].as_array().unwrap().len(), 12);
    assert_eq!(v["rows"][0]["target"], "MYC");
    assert_eq!(v["failures"].as_array().unwrap().len(), 0);

    let control = &v["rows"][3];
    assert_eq!(control["treatment"], "Control");
    assert!((control["ddcq_expression"].as_f64().unwrap() - 1.0).abs() < 1e-12);

    let tp53 = v["significance"]
        .as_array()
        .unwrap()
        .iter()
        .find(|s| s["target"] == "TP53")
        .unwrap();
    assert_eq!(tp53["comparisons"][0]["treatment"], "siTP53");
    assert_eq!(tp53["comparisons"][0]["symbol"], "***");
}

#[test]
fn pipeline_knockdown_matches_ddcq() {
    let tmp = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let (input, config) = write_inputs(tmp.path(), PLATE, CONFIG);
    run_pipeline(&input, &config, out.path());

    let v = report(out.path());
    for row in v["rows"].as_array().unwrap() {
        let ddcq = row["ddcq_expression"].as_f64().unwrap();
        let kd = row["percent_knockdown"].as_f64().unwrap();
        assert!((kd - (1.0 - ddcq) * 100.0).abs() < 1e-9);
        let dcq = row["delta_cq"].as_f64().unwrap();
        let expr = row["delta_cq_expression"].as_f64().unwrap();
        assert!((expr - 2f64.powf(-dcq)).abs() < 1e-12);
    }
}

#[test]
fn pipeline_outputs_are_deterministic() {
    let tmp = TempDir::new().unwrap();
    let (input, config) = write_inputs(tmp.path(), PLATE, CONFIG);
    let out1 = TempDir::new().unwrap();
    let out2 = TempDir::new().unwrap();

    run_pipeline(&input, &config, out1.path());
    run_pipeline(&input, &config, out2.path());

    for name in [
        "qpcr_table.csv",
        "qpcr.svg",
        "qpcr_report.json",
        "qpcr_TP53_statistical_results.txt",
        "qpcr_TP53_statistical_plot.svg",
    ] {
        let a = fs::read(out1.path().join(name)).unwrap();
        let b = fs::read(out2.path().join(name)).unwrap();
        assert_eq!(a, b, "mismatch in {}", name);
    }
}

#[test]
fn contaminated_water_is_reported_not_fatal() {
    let tmp = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let plate = PLATE.replace("C2,H2O,TP53,Undetermined", "C2,H2O,TP53,31.5");
    let (input, config) = write_inputs(tmp.path(), &plate, CONFIG);
    let stdout = run_pipeline(&input, &config, out.path());

    assert!(stdout.contains("Water: not clean for TP53"));
    let v = report(out.path());
    assert_eq!(v["quality"]["contaminated_targets"][0], "TP53");
    assert!(
        v["warnings"]
            .as_array()
            .unwrap()
            .iter()
            .any(|w| w.as_str().unwrap().contains("water template is not clean"))
    );
    assert_eq!(v["rows"].as_array().unwrap().len(), 12);
}

#[test]
fn missing_reference_gene_is_recorded_per_target() {
    let tmp = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let config = CONFIG.replace("ref_gene: GAPDH", "ref_gene: ACTB");
    let (input, config) = write_inputs(tmp.path(), PLATE, &config);
    run_pipeline(&input, &config, out.path());

    let v = report(out.path());
    assert!(v["rows"].as_array().unwrap().is_empty());
    assert_eq!(v["failures"].as_array().unwrap().len(), 3);
    assert_eq!(v["failures"][0]["kind"], "control_undefined");
}

#[test]
fn wrong_skiplines_fails_with_missing_column() {
    let tmp = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let (input, config) = write_inputs(tmp.path(), PLATE, CONFIG);
    let mut cmd = Command::cargo_bin("kira-qpcr").unwrap();
    cmd.args([
        "run",
        "--input",
        input.to_str().unwrap(),
        "--config",
        config.to_str().unwrap(),
        "--out",
        out.path().to_str().unwrap(),
    ]);
    let output = cmd.assert().failure().get_output().clone();
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("missing column"), "{}", stderr);
}

#[test]
fn validate_command_ok() {
    let tmp = TempDir::new().unwrap();
    let (input, config) = write_inputs(tmp.path(), PLATE, CONFIG);
    let mut cmd = Command::cargo_bin("kira-qpcr").unwrap();
    cmd.args([
        "validate",
        "--input",
        input.to_str().unwrap(),
        "--config",
        config.to_str().unwrap(),
        "--skiplines",
        "3",
    ]);
    let output = cmd.assert().success().get_output().clone();
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("kira-qpcr validate ok"));
    assert!(stdout.contains("measurements: 21"));
}

#[test]
fn stats_command_rereads_table() {
    let tmp = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let (input, config) = write_inputs(tmp.path(), PLATE, CONFIG);
    run_pipeline(&input, &config, out.path());

    let stats_out = TempDir::new().unwrap();
    let mut cmd = Command::cargo_bin("kira-qpcr").unwrap();
    cmd.args([
        "stats",
        "--table",
        out.path().join("qpcr_table.csv").to_str().unwrap(),
        "--out",
        stats_out.path().to_str().unwrap(),
        "--basis",
        "sample",
    ]);
    let output = cmd.assert().success().get_output().clone();
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("Statistical Results for TP53"));

    let text =
        fs::read_to_string(stats_out.path().join("qpcr_TP53_statistical_results.txt")).unwrap();
    assert!(text.starts_with("Statistical Results for TP53\nANOVA p-value: "));
    assert!(text.contains("siTP53: p-value = "));

    let plot =
        fs::read_to_string(stats_out.path().join("qpcr_TP53_statistical_plot.svg")).unwrap();
    assert!(plot.contains("Relative Expression of TP53"));
    assert!(plot.contains("ANOVA p-value: "));
    assert!(stdout.contains("Plot saved to"));
}

#[test]
fn replicate_count_mismatch_is_a_warning() {
    let tmp = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let plate = format!("{}D1,KD1,TP53,23.1\n", PLATE);
    let config = format!("{}replicates: 1\n", CONFIG);
    let (input, config) = write_inputs(tmp.path(), &plate, &config);
    run_pipeline(&input, &config, out.path());

    let v = report(out.path());
    assert_eq!(v["quality"]["expected_replicates"], 1);
    let mismatches = v["quality"]["replicate_mismatches"].as_array().unwrap();
    assert_eq!(mismatches.len(), 1);
    assert_eq!(mismatches[0]["sample"], "KD1");
    assert_eq!(mismatches[0]["target"], "TP53");
    assert_eq!(mismatches[0]["found"], 2);
    assert!(
        v["warnings"]
            .as_array()
            .unwrap()
            .iter()
            .any(|w| w.as_str().unwrap().contains("KD1/TP53 (2)"))
    );
}
