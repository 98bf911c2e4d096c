//! ftk-export
//!
//! Outbound projections of committed reconciliation records: CSV extracts
//! for spreadsheet review and a fixed-template alert summary for
//! out-of-band notification channels.
//!
//! Architectural decisions:
//! - Rendering is separated from delivery. Every projection is produced
//!   as an in-memory string first; file IO is a thin layer on top.
//! - Column order and the alert template are part of the external
//!   contract and are covered by golden tests. Downstream consumers
//!   parse these by position.
//! - Litre and dollar figures render with the shortest exact decimal
//!   form (no padding, no trailing zeros) so extracts diff cleanly
//!   across runs.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use ftk_schemas::Reconciliation;

// ---------------------------------------------------------------------------
// CSV extract
// ---------------------------------------------------------------------------

/// Column header row for single-record CSV extracts. Fixed contract.
pub const CSV_HEADERS: [&str; 10] = [
    "Fuel Type",
    "Date",
    "Opening Stock",
    "Receipts",
    "Sales (Metered)",
    "Actual Dip",
    "Variance",
    "Revenue",
    "Status",
    "Operator",
];

/// Renders one reconciliation record as a two-line CSV document
/// (header row plus data row).
///
/// Volumes are litres, revenue is dollars. Numeric fields use the
/// shortest exact rendering: whole litres carry no decimal point.
pub fn reconciliation_csv(rec: &Reconciliation) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(CSV_HEADERS)
        .context("failed to render CSV header row")?;
    writer
        .write_record([
            rec.fuel_type.as_str().to_string(),
            rec.date.to_string(),
            fmt_number(rec.opening_stock),
            fmt_number(rec.receipts),
            fmt_number(rec.calculated_sales),
            fmt_number(rec.actual_dips),
            fmt_number(rec.variance),
            fmt_number(rec.revenue.to_dollars()),
            rec.status.as_str().to_string(),
            rec.operator_id.clone(),
        ])
        .context("failed to render CSV data row")?;
    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("failed to flush CSV writer: {e}"))?;
    String::from_utf8(bytes).context("CSV output was not valid UTF-8")
}

/// Canonical filename for a single-record extract:
/// `Recon_{fuel}_{date}.csv`.
///
/// Path separators are stripped from the date portion so the name is
/// always safe to join onto a directory.
pub fn csv_filename(rec: &Reconciliation) -> String {
    let date = rec.date.to_string().replace('/', "-");
    format!("Recon_{}_{}.csv", rec.fuel_type.as_str(), date)
}

/// Writes the CSV extract for `rec` into `dir` under its canonical
/// filename and returns the full path.
pub fn write_reconciliation_csv(rec: &Reconciliation, dir: &Path) -> Result<PathBuf> {
    let path = dir.join(csv_filename(rec));
    let body = reconciliation_csv(rec)?;
    fs::write(&path, body)
        .with_context(|| format!("failed to write CSV extract to {}", path.display()))?;
    Ok(path)
}

// ---------------------------------------------------------------------------
// Alert summary
// ---------------------------------------------------------------------------

/// Renders the fixed-template alert summary for one record.
///
/// The template is a stable contract with the notification channel:
/// variance is printed to two decimals, revenue in dollars with
/// thousands separators.
pub fn notify_summary(rec: &Reconciliation) -> String {
    format!(
        "\u{1f6a8} *Fuel Reconciliation Alert*\n\
         Grade: {}\n\
         Date: {}\n\
         -----------------------\n\
         Metered Sales: {} L\n\
         Actual Variance: {:.2} L\n\
         Revenue: ${}\n\
         Status: {}\n\
         Operator: {}",
        rec.fuel_type.as_str(),
        rec.date,
        fmt_number(rec.calculated_sales),
        rec.variance,
        fmt_grouped(rec.revenue.to_dollars()),
        rec.status.as_str(),
        rec.operator_id,
    )
}

// ---------------------------------------------------------------------------
// Number rendering
// ---------------------------------------------------------------------------

/// Shortest exact decimal rendering: `42000.0` prints as `42000`,
/// `3200.5` keeps its fraction.
fn fmt_number(value: f64) -> String {
    format!("{value}")
}

/// Shortest rendering with thousands separators in the integer part:
/// `5920.0` prints as `5,920`, `-1234567.5` as `-1,234,567.5`.
fn fmt_grouped(value: f64) -> String {
    let plain = fmt_number(value);
    let (sign, digits) = match plain.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", plain.as_str()),
    };
    let (int_part, frac_part) = match digits.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (digits, None),
    };
    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (pos, ch) in int_part.chars().enumerate() {
        if pos > 0 && (int_part.len() - pos) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    match frac_part {
        Some(f) => format!("{sign}{grouped}.{f}"),
        None => format!("{sign}{grouped}"),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{NaiveDate, TimeZone, Utc};
    use ftk_schemas::{FuelType, Micros, RecordStatus, Reconciliation};
    use uuid::Uuid;

    fn sample_record() -> Reconciliation {
        Reconciliation {
            id: Uuid::nil(),
            date: NaiveDate::from_ymd_opt(2026, 8, 25).unwrap(),
            fuel_type: FuelType::Ado,
            opening_stock: 42_000.0,
            receipts: 0.0,
            transfers: 0.0,
            calculated_sales: 3_200.0,
            actual_dips: 43_800.0,
            variance: -5_000.0,
            revenue: Micros::from_dollars(5_920.0),
            status: RecordStatus::Pending,
            is_locked: false,
            operator_id: "u1".to_string(),
            approver_id: None,
            ts_utc: Utc.with_ymd_and_hms(2026, 8, 25, 14, 0, 0).unwrap(),
            version: 1,
            version_history: Vec::new(),
        }
    }

    #[test]
    fn csv_header_row_is_fixed_contract() {
        let body = reconciliation_csv(&sample_record()).unwrap();
        let header = body.lines().next().unwrap();
        assert_eq!(
            header,
            "Fuel Type,Date,Opening Stock,Receipts,Sales (Metered),\
             Actual Dip,Variance,Revenue,Status,Operator"
        );
    }

    #[test]
    fn csv_data_row_renders_whole_litres_without_fraction() {
        let body = reconciliation_csv(&sample_record()).unwrap();
        let data = body.lines().nth(1).unwrap();
        assert_eq!(
            data,
            "ADO,2026-08-25,42000,0,3200,43800,-5000,5920,PENDING,u1"
        );
    }

    #[test]
    fn csv_data_row_keeps_fractional_litres() {
        let mut rec = sample_record();
        rec.actual_dips = 43_750.5;
        rec.variance = -49.5;
        let body = reconciliation_csv(&rec).unwrap();
        let data = body.lines().nth(1).unwrap();
        assert!(data.contains(",43750.5,-49.5,"), "data row: {data}");
    }

    #[test]
    fn csv_filename_embeds_grade_and_date() {
        assert_eq!(csv_filename(&sample_record()), "Recon_ADO_2026-08-25.csv");
    }

    #[test]
    fn notify_summary_matches_template() {
        let text = notify_summary(&sample_record());
        assert_eq!(
            text,
            "\u{1f6a8} *Fuel Reconciliation Alert*\n\
             Grade: ADO\n\
             Date: 2026-08-25\n\
             -----------------------\n\
             Metered Sales: 3200 L\n\
             Actual Variance: -5000.00 L\n\
             Revenue: $5,920\n\
             Status: PENDING\n\
             Operator: u1"
        );
    }

    #[test]
    fn notify_summary_prints_approved_status() {
        let mut rec = sample_record();
        rec.status = RecordStatus::Approved;
        rec.is_locked = true;
        assert!(notify_summary(&rec).contains("Status: APPROVED"));
    }

    #[test]
    fn grouping_inserts_separators_every_three_digits() {
        assert_eq!(fmt_grouped(0.0), "0");
        assert_eq!(fmt_grouped(999.0), "999");
        assert_eq!(fmt_grouped(1_000.0), "1,000");
        assert_eq!(fmt_grouped(5_920.0), "5,920");
        assert_eq!(fmt_grouped(1_234_567.5), "1,234,567.5");
        assert_eq!(fmt_grouped(-1_234_567.5), "-1,234,567.5");
    }

    #[test]
    fn fmt_number_is_shortest_exact() {
        assert_eq!(fmt_number(42_000.0), "42000");
        assert_eq!(fmt_number(-5_000.0), "-5000");
        assert_eq!(fmt_number(3_200.5), "3200.5");
    }
}
