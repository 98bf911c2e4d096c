use ftk_reconcile::{DipMap, ReadingMap};
use serde::{Deserialize, Serialize};

/// Flat capture document for one shift, as read from a sheet file.
///
/// A sheet usually carries only closings and dips; openings come from the
/// station's last committed readings and are only present when a meter was
/// replaced or manually re-baselined mid-cycle.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ShiftSheet {
    pub operator_id: String,
    #[serde(default)]
    pub openings: ReadingMap,
    #[serde(default)]
    pub closings: ReadingMap,
    #[serde(default)]
    pub dips: DipMap,
}
