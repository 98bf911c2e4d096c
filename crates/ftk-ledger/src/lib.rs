//! ftk-ledger
//!
//! In-memory reconciliation ledger with explicit lifecycle transitions.
//!
//! Architectural decisions:
//! - Records are held newest-first; a commit prepends its batch in batch
//!   order, matching how reports read
//! - PENDING to APPROVED is the only status transition; approval locks the
//!   record forever
//! - Approval requires a supervisor or admin; amendment requires stock
//!   control or above and only touches pending, unlocked records
//! - Every amendment pushes the prior figures onto the version history and
//!   recomputes variance from the stored stock figures, so the variance
//!   identity survives edits
//! - Illegal transitions return evidence-carrying errors, never panics
//!
//! Persistence is the caller's concern; the ledger serializes transparently
//! as a JSON array of records.

use chrono::{DateTime, Utc};
use ftk_reconcile::{summarize, DailySummary};
use ftk_schemas::{FuelType, Micros, RecordStatus, Reconciliation, Role, User, VersionEntry};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Returned when an approval cannot be applied.
#[derive(Clone, Debug, PartialEq)]
pub enum ApprovalError {
    RecordNotFound { record_id: Uuid },
    NotAuthorized { user_id: String, role: Role },
    AlreadyApproved { record_id: Uuid },
    RecordLocked { record_id: Uuid },
}

impl std::fmt::Display for ApprovalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApprovalError::RecordNotFound { record_id } => {
                write!(f, "record {record_id} not found in ledger")
            }
            ApprovalError::NotAuthorized { user_id, role } => {
                write!(f, "user {user_id} ({role:?}) may not approve records")
            }
            ApprovalError::AlreadyApproved { record_id } => {
                write!(f, "record {record_id} is already approved")
            }
            ApprovalError::RecordLocked { record_id } => {
                write!(f, "record {record_id} is locked")
            }
        }
    }
}

impl std::error::Error for ApprovalError {}

/// Returned when an amendment cannot be applied.
#[derive(Clone, Debug, PartialEq)]
pub enum AmendError {
    RecordNotFound { record_id: Uuid },
    NotAuthorized { user_id: String, role: Role },
    /// Approved or locked records never change again.
    RecordImmutable {
        record_id: Uuid,
        status: RecordStatus,
        is_locked: bool,
    },
    /// Amended figures must be real numbers.
    NotFinite { new_sales: f64 },
}

impl std::fmt::Display for AmendError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AmendError::RecordNotFound { record_id } => {
                write!(f, "record {record_id} not found in ledger")
            }
            AmendError::NotAuthorized { user_id, role } => {
                write!(f, "user {user_id} ({role:?}) may not amend records")
            }
            AmendError::RecordImmutable {
                record_id,
                status,
                is_locked,
            } => write!(
                f,
                "record {record_id} is immutable (status={} locked={is_locked})",
                status.as_str()
            ),
            AmendError::NotFinite { new_sales } => {
                write!(f, "amended sales figure {new_sales} is not finite")
            }
        }
    }
}

impl std::error::Error for AmendError {}

// ---------------------------------------------------------------------------
// ReconLedger
// ---------------------------------------------------------------------------

/// The station's reconciliation history, newest first.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReconLedger {
    records: Vec<Reconciliation>,
}

impl ReconLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adopt an existing record list, assumed newest-first.
    pub fn with_records(records: Vec<Reconciliation>) -> Self {
        Self { records }
    }

    /// Prepend a committed batch.  Batch order is preserved, so the grades
    /// of one shift stay together at the head of the ledger.
    pub fn commit(&mut self, batch: Vec<Reconciliation>) {
        self.records.splice(0..0, batch);
    }

    /// All records, newest first.
    pub fn records(&self) -> &[Reconciliation] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, record_id: Uuid) -> Option<&Reconciliation> {
        self.records.iter().find(|r| r.id == record_id)
    }

    /// Most recent record for a grade, if any.
    pub fn latest_for(&self, fuel: FuelType) -> Option<&Reconciliation> {
        self.records.iter().find(|r| r.fuel_type == fuel)
    }

    /// Rollup totals over the whole ledger.
    pub fn summary(&self) -> DailySummary {
        summarize(&self.records)
    }

    /// Approve a pending record: sets APPROVED, stamps the approver and
    /// locks the record.  Only supervisors and admins may approve.
    pub fn approve(
        &mut self,
        record_id: Uuid,
        approver: &User,
    ) -> Result<&Reconciliation, ApprovalError> {
        if !approver.role.can_approve() {
            return Err(ApprovalError::NotAuthorized {
                user_id: approver.id.clone(),
                role: approver.role,
            });
        }
        let rec = self
            .records
            .iter_mut()
            .find(|r| r.id == record_id)
            .ok_or(ApprovalError::RecordNotFound { record_id })?;
        if rec.status == RecordStatus::Approved {
            return Err(ApprovalError::AlreadyApproved { record_id });
        }
        if rec.is_locked {
            return Err(ApprovalError::RecordLocked { record_id });
        }
        rec.status = RecordStatus::Approved;
        rec.approver_id = Some(approver.id.clone());
        rec.is_locked = true;
        Ok(rec)
    }

    /// Amend the metered sales figure on a pending, unlocked record.
    ///
    /// The prior figures go onto the version history, the version bumps,
    /// and variance and revenue are recomputed from the stored stock
    /// figures and the supplied pump price.  Opening stock and dips are
    /// physical captures and are never amended here.
    pub fn amend_sales(
        &mut self,
        record_id: Uuid,
        new_sales: f64,
        price: Micros,
        changed_by: &User,
        reason: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<&Reconciliation, AmendError> {
        if !new_sales.is_finite() {
            return Err(AmendError::NotFinite { new_sales });
        }
        if !changed_by.role.can_amend() {
            return Err(AmendError::NotAuthorized {
                user_id: changed_by.id.clone(),
                role: changed_by.role,
            });
        }
        let rec = self
            .records
            .iter_mut()
            .find(|r| r.id == record_id)
            .ok_or(AmendError::RecordNotFound { record_id })?;
        if rec.status != RecordStatus::Pending || rec.is_locked {
            return Err(AmendError::RecordImmutable {
                record_id,
                status: rec.status,
                is_locked: rec.is_locked,
            });
        }

        rec.version_history.push(VersionEntry {
            version: rec.version,
            calculated_sales: rec.calculated_sales,
            variance: rec.variance,
            changed_by: changed_by.id.clone(),
            reason: reason.into(),
            ts_utc: now,
        });
        rec.version += 1;
        rec.calculated_sales = new_sales;
        rec.variance = (rec.opening_stock - rec.actual_dips) - new_sales;
        rec.revenue = price.mul_litres(new_sales);
        Ok(rec)
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
