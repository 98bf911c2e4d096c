//! ftk-reconcile
//!
//! Shift reconciliation engine.
//!
//! Architectural decisions:
//! - Validation gates entry: every capture problem reported at once, never
//!   truncated to the first
//! - Meter-to-grade association by fixed naming convention, not config
//! - One reconciliation record per grade per commit, in report order
//! - Variance is definitional: (opening stock - dips) - metered sales
//! - No clamping anywhere; anomalies surface in the variance figure
//!
//! Deterministic, pure logic.  No IO.  No clock; callers pass `now`.

mod engine;
mod fuelmap;
mod summary;
mod types;
mod validate;

pub use engine::reconcile;
pub use fuelmap::{fuel_for_meter, meters_for_fuel};
pub use summary::{summarize, DailySummary};
pub use types::*;
pub use validate::{validate_dips, validate_readings};
