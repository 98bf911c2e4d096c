//! ftk-shift
//!
//! Shift entry wizard over the reconciliation engine.
//!
//! Architectural decisions:
//! - Shift captures live in an immutable draft value threaded through the
//!   stages, never in shared mutable state
//! - Stage advancement is gated by validation; blocked advances carry the
//!   complete issue list
//! - Commit consumes the draft, re-validates, runs the calculator once
//! - Master data is never mutated here; commits emit explicit rollforward
//!   events the caller applies
//!
//! No IO.  No clock; callers pass `now` at commit.

mod draft;
mod sheet;
mod stage;

pub use draft::{
    apply_rollforward, AdvanceError, CommitError, RollforwardEvent, ShiftCommit, ShiftDraft,
};
pub use sheet::ShiftSheet;
pub use stage::EntryStage;
