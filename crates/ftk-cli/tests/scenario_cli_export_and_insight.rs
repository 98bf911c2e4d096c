use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::path::Path;

/// Outbound surfaces over a committed ledger: the CSV extract plus alert
/// text, and the commentary command's offline and no-key behavior.

const STATION_YAML: &str = "\
name: Main Depot
tanks:
  - id: t55-ado
    name: T55 (ADO Storage)
    fuel: ADO
    capacity_litres: 55000
    current_volume_litres: 42000
meters:
  - id: m-drum-01
    name: Drum Filling Point A
    kind: DRUM
    last_reading: 1000
users:
  - id: u1
    name: James (Operator)
    role: OPERATOR
prices:
  ADO: 1.85
  ULP: 1.92
  ZOOM: 2.1
";

const SHEET_YAML: &str = "\
operator_id: u1
closings:
  m-drum-01: 4200
dips:
  t55-ado: 43800
";

fn commit_one_day(dir: &Path) -> String {
    let station = dir.join("station.yaml");
    fs::write(&station, STATION_YAML).unwrap();
    let sheet = dir.join("sheet.yaml");
    fs::write(&sheet, SHEET_YAML).unwrap();
    let ledger = dir.join("ledger.json").to_str().unwrap().to_string();

    let mut cmd = assert_cmd::Command::cargo_bin("ftk-cli").unwrap();
    cmd.args([
        "shift",
        "run",
        "--config",
        station.to_str().unwrap(),
        "--sheet",
        sheet.to_str().unwrap(),
        "--ledger",
        &ledger,
        "--audit",
        dir.join("audit.jsonl").to_str().unwrap(),
    ]);
    cmd.assert().success();
    ledger
}

fn first_record_id(ledger_path: &str) -> String {
    let arr: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(ledger_path).unwrap()).unwrap();
    arr[0]["id"].as_str().unwrap().to_string()
}

#[test]
fn cli_export_writes_extract_and_prints_alert() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let ledger = commit_one_day(dir.path());
    let ado_id = first_record_id(&ledger);
    let out_dir = dir.path().join("extracts");

    let mut cmd = assert_cmd::Command::cargo_bin("ftk-cli")?;
    cmd.args([
        "export", "record",
        "--ledger", &ledger,
        "--record-id", &ado_id,
        "--out-dir", out_dir.to_str().unwrap(),
        "--notify",
    ]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("csv_path="))
        .stdout(predicate::str::contains("Recon_ADO_"))
        .stdout(predicate::str::contains("Grade: ADO"))
        .stdout(predicate::str::contains("Actual Variance: -5000.00 L"))
        .stdout(predicate::str::contains("Revenue: $5,920"))
        .stdout(predicate::str::contains("Status: PENDING"))
        .stdout(predicate::str::contains("Operator: u1"));

    let written: Vec<_> = fs::read_dir(&out_dir)?.collect::<Result<_, _>>()?;
    assert_eq!(written.len(), 1);
    let content = fs::read_to_string(written[0].path())?;
    assert!(content.starts_with(
        "Fuel Type,Date,Opening Stock,Receipts,Sales (Metered),\
         Actual Dip,Variance,Revenue,Status,Operator"
    ));
    assert!(content.contains(",42000,0,3200,43800,-5000,5920,PENDING,u1"));
    Ok(())
}

#[test]
fn cli_export_unknown_record_fails() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let ledger = commit_one_day(dir.path());

    let mut cmd = assert_cmd::Command::cargo_bin("ftk-cli")?;
    cmd.args([
        "export", "record",
        "--ledger", &ledger,
        "--record-id", "00000000-0000-0000-0000-000000000000",
        "--out-dir", dir.path().join("extracts").to_str().unwrap(),
    ]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("not found in ledger"));
    Ok(())
}

#[test]
fn cli_insight_offline_uses_the_canned_provider() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let ledger = commit_one_day(dir.path());

    let mut cmd = assert_cmd::Command::cargo_bin("ftk-cli")?;
    cmd.env_remove("GENAI_API_KEY");
    cmd.args(["insight", "day", "--ledger", &ledger, "--offline"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("insight_source=static"))
        .stdout(predicate::str::contains(
            "Commentary disabled in offline mode; ledger figures are authoritative.",
        ));
    Ok(())
}

#[test]
fn cli_insight_without_key_or_offline_refuses() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let ledger = commit_one_day(dir.path());

    let mut cmd = assert_cmd::Command::cargo_bin("ftk-cli")?;
    cmd.env_remove("GENAI_API_KEY");
    cmd.args(["insight", "day", "--ledger", &ledger]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("set GENAI_API_KEY or pass --offline"));
    Ok(())
}

#[test]
fn cli_insight_on_an_empty_ledger_refuses() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let missing = dir.path().join("ledger.json");

    let mut cmd = assert_cmd::Command::cargo_bin("ftk-cli")?;
    cmd.args([
        "insight", "day",
        "--ledger", missing.to_str().unwrap(),
        "--offline",
    ]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("has no records to analyze"));
    Ok(())
}
