//! Generated sample data handlers.
//!
//! Compiled only with the `testkit` feature; never ships in production
//! builds.

use anyhow::Result;
use chrono::Utc;
use tracing::info;

use ftk_audit::{actions, AuditWriter};

use super::{load_ledger, save_ledger};

/// Details line written to the audit trail for every seeded day.
const SEED_DETAILS: &str = "Generated full operational day for testing.";

pub fn sample_day(
    operator: &str,
    ledger_path: &str,
    audit_path: &str,
    hash_chain: bool,
) -> Result<()> {
    let now = Utc::now();
    let day = ftk_testkit::sample_day(operator, now);
    let count = day.len();

    let mut ledger = load_ledger(ledger_path)?;
    ledger.commit(day);
    save_ledger(ledger_path, &ledger)?;

    let mut writer = AuditWriter::open(audit_path, hash_chain)?;
    writer.append(actions::SYS_SEED, operator, SEED_DETAILS, now)?;

    info!("sample day seeded operator={operator} records={count}");
    println!("seeded=true records={count} ledger={ledger_path} audit={audit_path}");
    Ok(())
}
