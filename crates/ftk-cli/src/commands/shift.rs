//! Shift capture command handlers.
//!
//! Covers `ftk shift run`: the whole wizard in one pass, driven by a
//! capture sheet file instead of interactive entry. A blocked stage
//! fails the run and prints every issue, the same complete list an
//! interactive screen would show.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use tracing::info;

use ftk_audit::{actions, AuditWriter};
use ftk_shift::{AdvanceError, ShiftDraft, ShiftSheet};

use super::{load_ledger, path_refs, save_ledger};

/// Details line written to the audit trail on every successful commit.
const COMMIT_DETAILS: &str = "Operational data committed to ledger.";

pub fn run(
    config_paths: &[String],
    sheet_path: &str,
    ledger_path: &str,
    audit_path: &str,
    out_dir: Option<&str>,
    hash_chain: bool,
) -> Result<()> {
    let refs = path_refs(config_paths);
    let loaded = ftk_config::load_station(&refs)?;
    let station = loaded.station;

    let raw =
        fs::read_to_string(sheet_path).with_context(|| format!("read sheet failed: {sheet_path}"))?;
    let sheet: ShiftSheet = serde_yaml::from_str(&raw)
        .with_context(|| format!("sheet is not valid YAML: {sheet_path}"))?;
    if station.user(&sheet.operator_id).is_none() {
        bail!(
            "operator {} is not in the station user list",
            sheet.operator_id
        );
    }

    let draft = ShiftDraft::seeded(&station, &sheet.operator_id).with_sheet(&sheet);

    // Readings -> Dips -> Review, failing loudly at the first blocked gate.
    let draft = advance_or_report(draft)?;
    let draft = advance_or_report(draft)?;

    let now = Utc::now();
    let commit = draft.commit(now)?;

    let mut ledger = load_ledger(ledger_path)?;
    ledger.commit(commit.records.clone());
    save_ledger(ledger_path, &ledger)?;

    let mut writer = AuditWriter::open(audit_path, hash_chain)?;
    writer.append(actions::SHIFT_COMMIT, &sheet.operator_id, COMMIT_DETAILS, now)?;

    info!(
        "shift committed operator={} records={} ledger_records={}",
        sheet.operator_id,
        commit.records.len(),
        ledger.len()
    );

    for rec in &commit.records {
        println!(
            "record id={} fuel={} sales={} variance={} revenue={:.2} status={}",
            rec.id,
            rec.fuel_type,
            rec.calculated_sales,
            rec.variance,
            rec.revenue.to_dollars(),
            rec.status.as_str()
        );
    }
    for event in &commit.rollforward {
        println!("rollforward {event}");
    }

    if let Some(dir) = out_dir {
        fs::create_dir_all(dir).with_context(|| format!("create out-dir failed: {dir}"))?;
        for rec in &commit.records {
            let path = ftk_export::write_reconciliation_csv(rec, Path::new(dir))?;
            println!("csv_path={}", path.display());
        }
    }

    println!(
        "shift_ok=true records={} ledger={} audit={}",
        commit.records.len(),
        ledger_path,
        audit_path
    );
    Ok(())
}

fn advance_or_report(draft: ShiftDraft) -> Result<ShiftDraft> {
    match draft.advance() {
        Ok(next) => Ok(next),
        Err(AdvanceError::Blocked { stage, issues }) => {
            for issue in &issues {
                eprintln!("issue stage={stage} {issue}");
            }
            bail!("shift blocked at stage {stage} with {} issue(s)", issues.len());
        }
        Err(e @ AdvanceError::AlreadyAtReview) => Err(e.into()),
    }
}
