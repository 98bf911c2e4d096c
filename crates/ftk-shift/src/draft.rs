use chrono::{DateTime, Utc};
use ftk_reconcile::{
    reconcile, validate_dips, validate_readings, DipMap, ReadingMap, ValidationIssue,
};
use ftk_schemas::{Meter, PriceTable, Reconciliation, Station, Tank};

use crate::sheet::ShiftSheet;
use crate::stage::EntryStage;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

fn join_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Returned when a draft cannot move to the next entry stage.
#[derive(Clone, Debug, PartialEq)]
pub enum AdvanceError {
    /// The current stage's captures fail validation.  Carries the complete
    /// issue list so every problem can be shown at once.
    Blocked {
        stage: EntryStage,
        issues: Vec<ValidationIssue>,
    },
    /// Review is the last stage; the only exit is commit.
    AlreadyAtReview,
}

impl std::fmt::Display for AdvanceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AdvanceError::Blocked { stage, issues } => write!(
                f,
                "stage {stage} blocked by {} issue(s): {}",
                issues.len(),
                join_issues(issues)
            ),
            AdvanceError::AlreadyAtReview => {
                write!(f, "already at review; commit is the only exit")
            }
        }
    }
}

impl std::error::Error for AdvanceError {}

/// Returned when a draft cannot be committed.
#[derive(Clone, Debug, PartialEq)]
pub enum CommitError {
    /// Commit is only legal from the review stage.
    NotAtReview { stage: EntryStage },
    /// Captures were edited after review and no longer validate.  Commit
    /// re-checks everything; stage gates alone are not trusted.
    Blocked { issues: Vec<ValidationIssue> },
}

impl std::fmt::Display for CommitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommitError::NotAtReview { stage } => {
                write!(f, "commit refused at stage {stage}; advance to review first")
            }
            CommitError::Blocked { issues } => write!(
                f,
                "commit blocked by {} issue(s): {}",
                issues.len(),
                join_issues(issues)
            ),
        }
    }
}

impl std::error::Error for CommitError {}

// ---------------------------------------------------------------------------
// Rollforward events
// ---------------------------------------------------------------------------

/// Master-data updates a commit implies.  The engine never mutates the
/// station itself; it hands these to the caller, who decides when (and
/// whether) to apply them.
#[derive(Clone, Debug, PartialEq)]
pub enum RollforwardEvent {
    /// Tank level after the shift, from the committed dip.
    TankLevel { tank_id: String, volume_litres: f64 },
    /// Meter totaliser after the shift, from the committed closing reading.
    MeterReading { meter_id: String, reading: f64 },
}

impl std::fmt::Display for RollforwardEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RollforwardEvent::TankLevel {
                tank_id,
                volume_litres,
            } => write!(f, "tank {tank_id} level -> {volume_litres} L"),
            RollforwardEvent::MeterReading { meter_id, reading } => {
                write!(f, "meter {meter_id} reading -> {reading}")
            }
        }
    }
}

/// Apply rollforward events to a station snapshot, so the next shift opens
/// from this shift's closing figures.  Unknown ids are skipped; events only
/// ever come from a commit over the same master data.
pub fn apply_rollforward(station: &mut Station, events: &[RollforwardEvent]) {
    for event in events {
        match event {
            RollforwardEvent::TankLevel {
                tank_id,
                volume_litres,
            } => {
                if let Some(tank) = station.tanks.iter_mut().find(|t| &t.id == tank_id) {
                    tank.current_volume_litres = *volume_litres;
                }
            }
            RollforwardEvent::MeterReading { meter_id, reading } => {
                if let Some(meter) = station.meters.iter_mut().find(|m| &m.id == meter_id) {
                    meter.last_reading = *reading;
                }
            }
        }
    }
}

/// Everything a successful commit produces: the per-grade records for the
/// ledger plus the rollforward events for master data.
#[derive(Clone, Debug, PartialEq)]
pub struct ShiftCommit {
    pub records: Vec<Reconciliation>,
    pub rollforward: Vec<RollforwardEvent>,
}

// ---------------------------------------------------------------------------
// ShiftDraft
// ---------------------------------------------------------------------------

/// One shift's working captures, threaded through the entry stages as an
/// immutable value.
///
/// Every edit returns a new draft; there is no shared mutable shift state
/// anywhere.  Stage movement goes through [`ShiftDraft::advance`], which
/// refuses to proceed while the current stage's captures fail validation,
/// and [`ShiftDraft::commit`] consumes the draft, re-validates everything
/// and runs the reconciliation calculator exactly once.
#[derive(Clone, Debug, PartialEq)]
pub struct ShiftDraft {
    tanks: Vec<Tank>,
    meters: Vec<Meter>,
    prices: PriceTable,
    operator_id: String,
    openings: ReadingMap,
    closings: ReadingMap,
    dips: DipMap,
    stage: EntryStage,
}

impl ShiftDraft {
    /// Start a draft from station master data.  Opening readings are
    /// pre-populated from each meter's last committed totaliser; closings
    /// and dips start empty.
    pub fn seeded(station: &Station, operator_id: impl Into<String>) -> Self {
        let openings = station
            .meters
            .iter()
            .map(|m| (m.id.clone(), m.last_reading))
            .collect();
        Self {
            tanks: station.tanks.clone(),
            meters: station.meters.clone(),
            prices: station.prices.clone(),
            operator_id: operator_id.into(),
            openings,
            closings: ReadingMap::new(),
            dips: DipMap::new(),
            stage: EntryStage::Readings,
        }
    }

    pub fn stage(&self) -> EntryStage {
        self.stage
    }

    pub fn operator_id(&self) -> &str {
        &self.operator_id
    }

    pub fn openings(&self) -> &ReadingMap {
        &self.openings
    }

    pub fn closings(&self) -> &ReadingMap {
        &self.closings
    }

    pub fn dips(&self) -> &DipMap {
        &self.dips
    }

    #[must_use]
    pub fn with_opening(mut self, meter_id: impl Into<String>, value: f64) -> Self {
        self.openings.insert(meter_id.into(), value);
        self
    }

    #[must_use]
    pub fn with_closing(mut self, meter_id: impl Into<String>, value: f64) -> Self {
        self.closings.insert(meter_id.into(), value);
        self
    }

    #[must_use]
    pub fn with_dip(mut self, tank_id: impl Into<String>, volume_litres: f64) -> Self {
        self.dips.insert(tank_id.into(), volume_litres);
        self
    }

    /// Overlay a capture sheet: sheet openings override the seeded values,
    /// closings and dips fill in wholesale.
    #[must_use]
    pub fn with_sheet(mut self, sheet: &ShiftSheet) -> Self {
        self.openings
            .extend(sheet.openings.iter().map(|(k, v)| (k.clone(), *v)));
        self.closings
            .extend(sheet.closings.iter().map(|(k, v)| (k.clone(), *v)));
        self.dips
            .extend(sheet.dips.iter().map(|(k, v)| (k.clone(), *v)));
        self
    }

    /// Issues blocking the current stage.  Review re-checks both capture
    /// sets, since edits are still possible there.
    pub fn stage_issues(&self) -> Vec<ValidationIssue> {
        match self.stage {
            EntryStage::Readings => {
                validate_readings(&self.meters, &self.openings, &self.closings)
            }
            EntryStage::Dips => validate_dips(&self.tanks, &self.dips),
            EntryStage::Review => {
                let mut issues =
                    validate_readings(&self.meters, &self.openings, &self.closings);
                issues.extend(validate_dips(&self.tanks, &self.dips));
                issues
            }
        }
    }

    /// Move to the next stage if the current one validates cleanly.
    pub fn advance(self) -> Result<Self, AdvanceError> {
        let next = match self.stage {
            EntryStage::Readings => EntryStage::Dips,
            EntryStage::Dips => EntryStage::Review,
            EntryStage::Review => return Err(AdvanceError::AlreadyAtReview),
        };
        let issues = self.stage_issues();
        if !issues.is_empty() {
            return Err(AdvanceError::Blocked {
                stage: self.stage,
                issues,
            });
        }
        Ok(Self { stage: next, ..self })
    }

    /// Step back one stage.  Never validates; going back to fix captures is
    /// always allowed.  At the first stage this is a no-op.
    #[must_use]
    pub fn back(self) -> Self {
        let prev = match self.stage {
            EntryStage::Readings => EntryStage::Readings,
            EntryStage::Dips => EntryStage::Readings,
            EntryStage::Review => EntryStage::Dips,
        };
        Self { stage: prev, ..self }
    }

    /// Consume the draft: re-validate every capture, run the calculator
    /// once, and emit the rollforward events for master data.
    ///
    /// Only legal from review.  The draft is gone afterwards; shift capture
    /// data is used exactly once.
    pub fn commit(self, now: DateTime<Utc>) -> Result<ShiftCommit, CommitError> {
        if self.stage != EntryStage::Review {
            return Err(CommitError::NotAtReview { stage: self.stage });
        }
        let issues = self.stage_issues();
        if !issues.is_empty() {
            return Err(CommitError::Blocked { issues });
        }

        let records = reconcile(
            &self.tanks,
            &self.meters,
            &self.openings,
            &self.closings,
            &self.dips,
            &self.prices,
            &self.operator_id,
            now,
        );

        let mut rollforward = Vec::new();
        for tank in &self.tanks {
            if let Some(v) = self.dips.get(&tank.id).copied().filter(|v| v.is_finite()) {
                rollforward.push(RollforwardEvent::TankLevel {
                    tank_id: tank.id.clone(),
                    volume_litres: v,
                });
            }
        }
        for meter in &self.meters {
            if let Some(v) = self
                .closings
                .get(&meter.id)
                .copied()
                .filter(|v| v.is_finite())
            {
                rollforward.push(RollforwardEvent::MeterReading {
                    meter_id: meter.id.clone(),
                    reading: v,
                });
            }
        }

        Ok(ShiftCommit {
            records,
            rollforward,
        })
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
