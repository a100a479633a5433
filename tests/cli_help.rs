use assert_cmd::Command;

#[test]
fn cli_help_smoke() {
    let mut cmd = Command::cargo_bin("kira-qpcr").unwrap();
    cmd.arg("--help");
    cmd.assert().success();
}

#[test]
fn run_without_config_fails() {
    let mut cmd = Command::cargo_bin("kira-qpcr").unwrap();
    cmd.args(["run", "--input", "plate.csv", "--out", "out"]);
    cmd.assert().failure();
}
