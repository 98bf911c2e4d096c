//! Ledger lifecycle command handlers.
//!
//! Covers `ftk ledger summarize | approve | amend`. Role checks come
//! from station config: the acting user id must resolve to a configured
//! user, whose role gates the transition.

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::info;

use ftk_audit::{actions, AuditWriter};
use ftk_schemas::Micros;

use super::{load_ledger, parse_record_id, path_refs, save_ledger};

pub fn summarize(ledger_path: &str) -> Result<()> {
    let ledger = load_ledger(ledger_path)?;
    let s = ledger.summary();
    println!("records={}", ledger.len());
    println!("total_volume_litres={}", s.total_volume);
    println!("total_revenue_dollars={:.2}", s.total_revenue.to_dollars());
    println!("total_variance_litres={}", s.total_variance);
    Ok(())
}

pub fn approve(
    ledger_path: &str,
    record_id_raw: &str,
    user_id: &str,
    config_paths: &[String],
    audit_path: &str,
    hash_chain: bool,
) -> Result<()> {
    let record_id = parse_record_id(record_id_raw)?;
    let refs = path_refs(config_paths);
    let loaded = ftk_config::load_station(&refs)?;
    let user = loaded
        .station
        .user(user_id)
        .with_context(|| format!("user {user_id} is not in the station user list"))?
        .clone();

    let mut ledger = load_ledger(ledger_path)?;
    let (fuel, details) = {
        let rec = ledger.approve(record_id, &user)?;
        (
            rec.fuel_type,
            format!("Approved {} reconciliation {} for {}.", rec.fuel_type, rec.id, rec.date),
        )
    };
    save_ledger(ledger_path, &ledger)?;

    let mut writer = AuditWriter::open(audit_path, hash_chain)?;
    writer.append(actions::RECON_APPROVE, user_id, &details, Utc::now())?;

    info!("record approved id={record_id} fuel={fuel} approver={user_id}");
    println!("approved=true record_id={record_id} fuel={fuel} approver={user_id}");
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub fn amend(
    ledger_path: &str,
    record_id_raw: &str,
    user_id: &str,
    new_sales: f64,
    reason: &str,
    config_paths: &[String],
    audit_path: &str,
    hash_chain: bool,
) -> Result<()> {
    let record_id = parse_record_id(record_id_raw)?;
    let refs = path_refs(config_paths);
    let loaded = ftk_config::load_station(&refs)?;
    let user = loaded
        .station
        .user(user_id)
        .with_context(|| format!("user {user_id} is not in the station user list"))?
        .clone();

    let mut ledger = load_ledger(ledger_path)?;
    let fuel = ledger
        .get(record_id)
        .with_context(|| format!("record {record_id} not found in ledger"))?
        .fuel_type;
    // An unpriced grade behaves like the calculator: revenue goes to zero.
    let price = loaded
        .station
        .prices
        .get(&fuel)
        .copied()
        .unwrap_or(Micros::ZERO);

    let now = Utc::now();
    let (version, details) = {
        let rec = ledger.amend_sales(record_id, new_sales, price, &user, reason, now)?;
        (
            rec.version,
            format!(
                "Amended {} sales to {} L (v{}): {}",
                rec.fuel_type, rec.calculated_sales, rec.version, reason
            ),
        )
    };
    save_ledger(ledger_path, &ledger)?;

    let mut writer = AuditWriter::open(audit_path, hash_chain)?;
    writer.append(actions::RECON_AMEND, user_id, &details, now)?;

    info!("record amended id={record_id} version={version} by={user_id}");
    println!("amended=true record_id={record_id} version={version} sales={new_sales}");
    Ok(())
}
