use std::collections::BTreeMap;

/// Per-shift meter readings, keyed by meter id.  Values are raw totaliser
/// counts in litres.
pub type ReadingMap = BTreeMap<String, f64>;

/// Per-shift dip volumes, keyed by tank id.  Values are litres already
/// converted from the dipstick level.
pub type DipMap = BTreeMap<String, f64>;

/// Which end of a shift a meter reading belongs to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum ReadingEnd {
    Opening,
    Closing,
}

impl ReadingEnd {
    pub fn as_str(self) -> &'static str {
        match self {
            ReadingEnd::Opening => "opening",
            ReadingEnd::Closing => "closing",
        }
    }
}

/// Evidence of one user-correctable capture problem.
///
/// Validation always returns the complete set of issues, never just the
/// first, so the whole error list can be shown at once.
#[derive(Clone, Debug, PartialEq, PartialOrd)]
pub enum ValidationIssue {
    /// A meter reading is absent or not a finite number.
    MissingReading { meter_id: String, end: ReadingEnd },

    /// Closing totaliser is below opening.  Meters count up; a decrease
    /// means miscapture, rollover, or meter replacement.  Never
    /// auto-corrected.
    ReadingRegression {
        meter_id: String,
        opening: f64,
        closing: f64,
    },

    /// No dip volume supplied for a tank.  A value of exactly zero counts
    /// as not entered; a zero dip on a live tank is a capture mistake, not
    /// an empty tank claim.
    MissingDip { tank_id: String },
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationIssue::MissingReading { meter_id, end } => {
                write!(
                    f,
                    "{} reading for meter {meter_id} is missing or not a number",
                    end.as_str()
                )
            }
            ValidationIssue::ReadingRegression {
                meter_id,
                opening,
                closing,
            } => write!(
                f,
                "closing reading for meter {meter_id} is below opening \
                 (opening={opening} closing={closing})"
            ),
            ValidationIssue::MissingDip { tank_id } => {
                write!(f, "dip volume for tank {tank_id} is missing")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_offending_meter() {
        let issue = ValidationIssue::MissingReading {
            meter_id: "m-pump-ulp-01".to_string(),
            end: ReadingEnd::Opening,
        };
        let text = format!("{issue}");
        assert!(text.contains("m-pump-ulp-01"));
        assert!(text.contains("opening"));
    }

    #[test]
    fn display_regression_carries_both_readings() {
        let issue = ValidationIssue::ReadingRegression {
            meter_id: "m-1".to_string(),
            opening: 500.0,
            closing: 400.0,
        };
        let text = format!("{issue}");
        assert!(text.contains("opening=500"));
        assert!(text.contains("closing=400"));
    }
}
