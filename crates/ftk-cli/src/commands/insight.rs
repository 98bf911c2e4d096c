//! Commentary command handlers.

use std::time::Duration;

use anyhow::{bail, Result};
use tracing::info;

use ftk_insight::{fetch_insights, GenAiInsight, InsightProvider, StaticInsight};

use super::load_ledger;

/// Env-var name for the generative-API key. Read here and passed in; never logged.
const ENV_GENAI_API_KEY: &str = "GENAI_API_KEY";

/// Most-recent records included in one commentary request.
const BATCH_LIMIT: usize = 10;

pub async fn day(ledger_path: &str, offline: bool, timeout_secs: u64) -> Result<()> {
    let ledger = load_ledger(ledger_path)?;
    if ledger.is_empty() {
        bail!("ledger {ledger_path} has no records to analyze");
    }
    let batch: Vec<_> = ledger.records().iter().take(BATCH_LIMIT).cloned().collect();

    let provider: Box<dyn InsightProvider> = if offline {
        Box::new(StaticInsight::new(
            "Commentary disabled in offline mode; ledger figures are authoritative.",
        ))
    } else {
        match std::env::var(ENV_GENAI_API_KEY) {
            Ok(key) if !key.trim().is_empty() => Box::new(GenAiInsight::new(key)),
            _ => bail!("set {ENV_GENAI_API_KEY} or pass --offline"),
        }
    };

    info!(
        "requesting commentary source={} records={}",
        provider.source_name(),
        batch.len()
    );
    let text = fetch_insights(&*provider, &batch, Duration::from_secs(timeout_secs)).await;
    println!("insight_source={}", provider.source_name());
    println!("{text}");
    Ok(())
}
