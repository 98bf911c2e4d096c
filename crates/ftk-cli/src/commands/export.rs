//! Export command handlers.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use super::{load_ledger, parse_record_id};

pub fn record(ledger_path: &str, record_id_raw: &str, out_dir: &str, notify: bool) -> Result<()> {
    let record_id = parse_record_id(record_id_raw)?;
    let ledger = load_ledger(ledger_path)?;
    let rec = ledger
        .get(record_id)
        .with_context(|| format!("record {record_id} not found in ledger"))?;

    fs::create_dir_all(out_dir).with_context(|| format!("create out-dir failed: {out_dir}"))?;
    let path = ftk_export::write_reconciliation_csv(rec, Path::new(out_dir))?;
    println!("csv_path={}", path.display());

    if notify {
        println!("{}", ftk_export::notify_summary(rec));
    }
    Ok(())
}
