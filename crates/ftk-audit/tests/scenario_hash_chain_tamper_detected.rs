//! Audit hash chain integrity.
//!
//! GREEN when:
//! - Writing entries with hash_chain=true, then verifying, succeeds.
//! - Mutating a middle line's details in the file is detected at that line.
//! - Reopening a chained log continues the chain instead of restarting it.

use chrono::Utc;
use ftk_audit::{actions, verify_hash_chain, AuditWriter, VerifyResult};
use uuid::Uuid;

fn temp_audit_path(suffix: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!(
        "ftk_audit_test_{}_{}_{}",
        suffix,
        std::process::id(),
        Uuid::new_v4().as_simple()
    ))
}

#[test]
fn untampered_chain_verifies_valid() {
    let path = temp_audit_path("untampered");

    {
        let mut writer = AuditWriter::open(&path, true).unwrap();
        for i in 0..5 {
            writer
                .append(
                    actions::SHIFT_COMMIT,
                    "u1",
                    &format!("shift {i} committed"),
                    Utc::now(),
                )
                .unwrap();
        }
    }

    let result = verify_hash_chain(&path).unwrap();
    assert_eq!(result, VerifyResult::Valid { lines: 5 });

    let _ = std::fs::remove_file(&path);
}

#[test]
fn tampered_details_detected_at_the_right_line() {
    let path = temp_audit_path("tampered");

    {
        let mut writer = AuditWriter::open(&path, true).unwrap();
        for i in 0..5 {
            writer
                .append(
                    actions::RECON_APPROVE,
                    "u3",
                    &format!("approved record {i}"),
                    Utc::now(),
                )
                .unwrap();
        }
    }

    let content = std::fs::read_to_string(&path).unwrap();
    let tampered: String = content
        .lines()
        .enumerate()
        .map(|(i, line)| {
            if i == 2 {
                line.replace("approved record 2", "approved record 9")
            } else {
                line.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n");
    std::fs::write(&path, tampered).unwrap();

    match verify_hash_chain(&path).unwrap() {
        VerifyResult::Broken { line, .. } => assert_eq!(line, 3),
        other => panic!("tamper not detected: {other:?}"),
    }

    let _ = std::fs::remove_file(&path);
}

#[test]
fn reopening_continues_the_chain() {
    let path = temp_audit_path("reopen");

    {
        let mut writer = AuditWriter::open(&path, true).unwrap();
        writer
            .append(actions::SYS_SEED, "u3", "seeded sample day", Utc::now())
            .unwrap();
    }
    {
        let mut writer = AuditWriter::open(&path, true).unwrap();
        assert_eq!(writer.seq(), 1);
        writer
            .append(
                actions::SHIFT_COMMIT,
                "u1",
                "Operational data committed to ledger.",
                Utc::now(),
            )
            .unwrap();
    }

    assert_eq!(
        verify_hash_chain(&path).unwrap(),
        VerifyResult::Valid { lines: 2 }
    );

    let _ = std::fs::remove_file(&path);
}
