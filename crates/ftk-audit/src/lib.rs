//! ftk-audit
//!
//! Append-only audit trail for reconciliation activity.
//!
//! Architectural decisions:
//! - The in-memory trail holds entries newest-first, the order audit
//!   screens read
//! - The file log is JSON Lines, one entry per line, append-only
//! - Optional hash chain: each entry carries hash_prev + hash_self over
//!   canonical (key-sorted, compact) JSON, so tampering is detectable
//! - Entry ids derive deterministically from chain state and content.
//!   No RNG; replaying the same activity gives the same ids

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Well-known audit actions.
pub mod actions {
    /// A shift passed validation and its records entered the ledger.
    pub const SHIFT_COMMIT: &str = "SHIFT_COMMIT";
    /// Sample operational data was generated.
    pub const SYS_SEED: &str = "SYS_SEED";
    /// A reconciliation record was approved and locked.
    pub const RECON_APPROVE: &str = "RECON_APPROVE";
    /// A pending record's figures were amended.
    pub const RECON_AMEND: &str = "RECON_AMEND";
}

/// One audit event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: Uuid,
    pub action: String,
    pub user_id: String,
    pub details: String,
    pub ts_utc: DateTime<Utc>,
    pub hash_prev: Option<String>,
    pub hash_self: Option<String>,
}

// ---------------------------------------------------------------------------
// In-memory trail
// ---------------------------------------------------------------------------

/// Session-scoped audit view, newest entry first.
///
/// This is the display-side companion to [`AuditWriter`]: the trail orders
/// entries the way audit screens read them, the writer orders the file the
/// way the chain verifies.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AuditTrail {
    entries: Vec<AuditEntry>,
    seq: u64,
}

impl AuditTrail {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an action at the head of the trail and return the new entry.
    pub fn record(
        &mut self,
        action: &str,
        user_id: &str,
        details: impl Into<String>,
        now: DateTime<Utc>,
    ) -> &AuditEntry {
        let details = details.into();
        let prev_id = self.entries.first().map(|e| e.id.to_string());
        let id = derive_entry_id(prev_id.as_deref(), action, user_id, &details, self.seq);
        self.seq += 1;
        self.entries.insert(
            0,
            AuditEntry {
                id,
                action: action.to_string(),
                user_id: user_id.to_string(),
                details,
                ts_utc: now,
                hash_prev: None,
                hash_self: None,
            },
        );
        &self.entries[0]
    }

    /// Entries newest-first.
    pub fn entries(&self) -> &[AuditEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// File writer
// ---------------------------------------------------------------------------

/// Append-only audit log writer.  Writes JSON Lines, one entry per line.
/// With `hash_chain` enabled each entry links to its predecessor.
pub struct AuditWriter {
    path: PathBuf,
    hash_chain: bool,
    last_hash: Option<String>,
    seq: u64,
}

impl AuditWriter {
    /// Open an audit log, creating parent directories as needed.
    ///
    /// If the file already exists its tail is scanned so the chain and the
    /// sequence counter resume where the last run stopped; appending with a
    /// fresh chain onto an existing chained log would break verification.
    pub fn open(path: impl AsRef<Path>, hash_chain: bool) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| format!("create_dir_all {parent:?}"))?;
        }

        let mut last_hash = None;
        let mut seq = 0u64;
        if path.exists() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("read audit log {path:?}"))?;
            for (i, line) in content.lines().enumerate() {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let entry: AuditEntry = serde_json::from_str(trimmed)
                    .with_context(|| format!("parse audit entry at line {}", i + 1))?;
                last_hash = entry.hash_self;
                seq += 1;
            }
        }

        Ok(Self {
            path,
            hash_chain,
            last_hash,
            seq,
        })
    }

    pub fn last_hash(&self) -> Option<&str> {
        self.last_hash.as_deref()
    }

    /// Entries appended so far, including those found on open.
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Append one entry and return it as written.
    pub fn append(
        &mut self,
        action: &str,
        user_id: &str,
        details: &str,
        now: DateTime<Utc>,
    ) -> Result<AuditEntry> {
        let id = derive_entry_id(self.last_hash.as_deref(), action, user_id, details, self.seq);
        self.seq += 1;

        let mut entry = AuditEntry {
            id,
            action: action.to_string(),
            user_id: user_id.to_string(),
            details: details.to_string(),
            ts_utc: now,
            hash_prev: None,
            hash_self: None,
        };

        if self.hash_chain {
            entry.hash_prev = self.last_hash.clone();
            let self_hash = compute_entry_hash(&entry)?;
            entry.hash_self = Some(self_hash.clone());
            self.last_hash = Some(self_hash);
        }

        let line = canonical_json_line(&entry)?;
        append_line(&self.path, &line)?;

        Ok(entry)
    }
}

/// Entry id derived from chain state plus content plus sequence.  Replay of
/// identical activity converges to identical ids.
fn derive_entry_id(
    last_hash: Option<&str>,
    action: &str,
    user_id: &str,
    details: &str,
    seq: u64,
) -> Uuid {
    let mut hasher = Sha256::new();
    if let Some(h) = last_hash {
        hasher.update(h.as_bytes());
    }
    hasher.update([0u8]);
    hasher.update(action.as_bytes());
    hasher.update([0u8]);
    hasher.update(user_id.as_bytes());
    hasher.update([0u8]);
    hasher.update(details.as_bytes());
    hasher.update([0u8]);
    hasher.update(seq.to_be_bytes());
    let digest = hasher.finalize();
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&digest[..16]);
    Uuid::from_bytes(bytes)
}

/// Write a single line to file (with trailing newline).
fn append_line(path: &Path, line: &str) -> Result<()> {
    let mut f = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open audit log {path:?}"))?;
    f.write_all(line.as_bytes())
        .context("write audit line failed")?;
    f.write_all(b"\n").context("write newline failed")?;
    Ok(())
}

/// Canonicalize by sorting keys recursively and emitting compact JSON.
/// One entry == one JSON line.
fn canonical_json_line<T: Serialize>(v: &T) -> Result<String> {
    let raw = serde_json::to_value(v).context("serialize audit entry failed")?;
    let sorted = sort_keys(&raw);
    serde_json::to_string(&sorted).context("json stringify failed")
}

fn sort_keys(v: &Value) -> Value {
    match v {
        Value::Object(map) => {
            let mut keys: Vec<_> = map.keys().cloned().collect();
            keys.sort();
            let mut new = serde_json::Map::new();
            for k in keys {
                new.insert(k.clone(), sort_keys(&map[&k]));
            }
            Value::Object(new)
        }
        Value::Array(arr) => Value::Array(arr.iter().map(sort_keys).collect()),
        _ => v.clone(),
    }
}

/// Chain hash over canonical JSON of the entry WITHOUT hash_self (to avoid
/// self-reference).
pub fn compute_entry_hash(entry: &AuditEntry) -> Result<String> {
    let mut clone = entry.clone();
    clone.hash_self = None;

    let canonical = canonical_json_line(&clone)?;
    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}

/// Result of hash chain verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyResult {
    /// The entire chain is valid.
    Valid { lines: usize },
    /// The chain is broken at the given line.
    Broken { line: usize, reason: String },
}

/// Verify the hash chain integrity of an audit log file.
pub fn verify_hash_chain(path: impl AsRef<Path>) -> Result<VerifyResult> {
    let content = fs::read_to_string(path.as_ref())
        .with_context(|| format!("read audit log {:?}", path.as_ref()))?;
    verify_hash_chain_str(&content)
}

/// Verify the hash chain integrity of JSONL content held in memory.
pub fn verify_hash_chain_str(content: &str) -> Result<VerifyResult> {
    let mut prev_hash: Option<String> = None;
    let mut line_count = 0usize;

    for (i, line) in content.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let entry: AuditEntry = serde_json::from_str(trimmed)
            .with_context(|| format!("parse audit entry at line {}", i + 1))?;

        line_count += 1;

        if entry.hash_prev != prev_hash {
            return Ok(VerifyResult::Broken {
                line: i + 1,
                reason: format!(
                    "hash_prev mismatch: expected {:?}, got {:?}",
                    prev_hash, entry.hash_prev
                ),
            });
        }

        if let Some(ref claimed) = entry.hash_self {
            let recomputed = compute_entry_hash(&entry)?;
            if *claimed != recomputed {
                return Ok(VerifyResult::Broken {
                    line: i + 1,
                    reason: format!("hash_self mismatch: claimed {claimed}, recomputed {recomputed}"),
                });
            }
        }

        prev_hash = entry.hash_self.clone();
    }

    Ok(VerifyResult::Valid { lines: line_count })
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
