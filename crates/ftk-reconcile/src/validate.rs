use ftk_schemas::{Meter, Tank};

use crate::types::{DipMap, ReadingEnd, ReadingMap, ValidationIssue};

fn finite(map: &ReadingMap, id: &str) -> Option<f64> {
    map.get(id).copied().filter(|v| v.is_finite())
}

/// Check that every meter has a usable opening and closing reading.
///
/// Returns every issue found, in meter order, opening before closing per
/// meter.  A regression is only reported when both ends are present and
/// finite; a missing end already produces its own issue.
pub fn validate_readings(
    meters: &[Meter],
    openings: &ReadingMap,
    closings: &ReadingMap,
) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    for meter in meters {
        let opening = finite(openings, &meter.id);
        let closing = finite(closings, &meter.id);

        if opening.is_none() {
            issues.push(ValidationIssue::MissingReading {
                meter_id: meter.id.clone(),
                end: ReadingEnd::Opening,
            });
        }
        match (opening, closing) {
            (_, None) => issues.push(ValidationIssue::MissingReading {
                meter_id: meter.id.clone(),
                end: ReadingEnd::Closing,
            }),
            (Some(open), Some(close)) if close < open => {
                issues.push(ValidationIssue::ReadingRegression {
                    meter_id: meter.id.clone(),
                    opening: open,
                    closing: close,
                });
            }
            _ => {}
        }
    }
    issues
}

/// Check that every tank has a dip entered.
///
/// A dip of exactly zero counts as not entered, as does NaN.  Negative
/// values pass here and flow into the variance arithmetic untouched.
pub fn validate_dips(tanks: &[Tank], dips: &DipMap) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    for tank in tanks {
        let entered = matches!(dips.get(&tank.id), Some(v) if *v != 0.0 && !v.is_nan());
        if !entered {
            issues.push(ValidationIssue::MissingDip {
                tank_id: tank.id.clone(),
            });
        }
    }
    issues
}
