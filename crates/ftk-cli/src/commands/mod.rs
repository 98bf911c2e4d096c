//! Command handler modules for ftk-cli.
//!
//! Shared utilities used by multiple command paths live here.
//! Command-specific logic lives in the submodules.

#[cfg(feature = "testkit")]
pub mod demo;
pub mod export;
pub mod insight;
pub mod ledger;
pub mod shift;

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use uuid::Uuid;

use ftk_ledger::ReconLedger;

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// Borrow a clap `Vec<String>` as the `&[&str]` the config loader takes.
pub fn path_refs(paths: &[String]) -> Vec<&str> {
    paths.iter().map(|s| s.as_str()).collect()
}

/// Load a ledger file. A missing file is an empty ledger, so the first
/// shift of a new site needs no setup step.
pub fn load_ledger(path: &str) -> Result<ReconLedger> {
    if !Path::new(path).exists() {
        return Ok(ReconLedger::new());
    }
    let raw = fs::read_to_string(path).with_context(|| format!("read ledger failed: {path}"))?;
    let ledger: ReconLedger = serde_json::from_str(&raw)
        .with_context(|| format!("ledger is not a valid record array: {path}"))?;
    Ok(ledger)
}

/// Write the ledger back as pretty JSON, creating parent directories.
pub fn save_ledger(path: &str, ledger: &ReconLedger) -> Result<()> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create ledger dir failed: {}", parent.display()))?;
        }
    }
    let json = serde_json::to_string_pretty(ledger).context("serialize ledger failed")?;
    fs::write(path, json).with_context(|| format!("write ledger failed: {path}"))?;
    Ok(())
}

pub fn parse_record_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw.trim()).context("invalid record id uuid")
}
