//! Scenario: a committed day is projected out for review.
//!
//! The controller pulls the day's records and exports each grade as a
//! CSV extract, then fires an alert summary for the grade carrying the
//! largest loss. Extracts land on disk under their canonical names and
//! round-trip byte-for-byte through the filesystem.

use std::fs;
use std::path::PathBuf;

use chrono::{TimeZone, Utc};
use ftk_export::{csv_filename, notify_summary, reconciliation_csv, write_reconciliation_csv};
use ftk_schemas::FuelType;

fn temp_export_dir() -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "ftk-export-{}-{}",
        std::process::id(),
        uuid::Uuid::new_v4()
    ));
    fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn full_day_exports_one_extract_per_grade() {
    let now = Utc.with_ymd_and_hms(2026, 8, 25, 14, 0, 0).unwrap();
    let day = ftk_testkit::sample_day("u1", now);
    let dir = temp_export_dir();

    let mut written = Vec::new();
    for rec in &day {
        let path = write_reconciliation_csv(rec, &dir).unwrap();
        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            csv_filename(rec)
        );
        written.push((rec, path));
    }
    assert_eq!(written.len(), 3);

    // Files round-trip exactly.
    for (rec, path) in &written {
        let on_disk = fs::read_to_string(path).unwrap();
        assert_eq!(on_disk, reconciliation_csv(rec).unwrap());
    }

    // The ADO extract carries the authored figures for the day.
    let ado = day.iter().find(|r| r.fuel_type == FuelType::Ado).unwrap();
    let body = reconciliation_csv(ado).unwrap();
    let data = body.lines().nth(1).unwrap();
    assert!(data.starts_with("ADO,"), "data row: {data}");
    assert!(data.contains(",42000,5000,3200,43750,-50,5920,"), "data row: {data}");

    // Largest loss for the day is ULP; its alert names the figures.
    let ulp = day.iter().find(|r| r.fuel_type == FuelType::Ulp).unwrap();
    let alert = notify_summary(ulp);
    assert!(alert.contains("Grade: ULP"));
    assert!(alert.contains("Actual Variance: -150.00 L"));
    assert!(alert.contains("Revenue: $2,304"));

    fs::remove_dir_all(&dir).unwrap();
}
