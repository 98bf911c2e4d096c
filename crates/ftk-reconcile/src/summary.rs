use std::ops::Add;

use ftk_schemas::{Micros, Reconciliation};
use serde::{Deserialize, Serialize};

/// Rollup totals over a set of reconciliation records.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    /// Total metered sales, litres.
    pub total_volume: f64,
    /// Total revenue at pump prices.
    pub total_revenue: Micros,
    /// Net signed variance, litres.
    pub total_variance: f64,
}

impl DailySummary {
    pub const ZERO: DailySummary = DailySummary {
        total_volume: 0.0,
        total_revenue: Micros::ZERO,
        total_variance: 0.0,
    };
}

impl Add for DailySummary {
    type Output = DailySummary;

    fn add(self, rhs: DailySummary) -> DailySummary {
        DailySummary {
            total_volume: self.total_volume + rhs.total_volume,
            total_revenue: self.total_revenue.saturating_add(rhs.total_revenue),
            total_variance: self.total_variance + rhs.total_variance,
        }
    }
}

/// Fold a record collection into its totals.  Empty input gives all zeros;
/// record order does not change the result.
pub fn summarize<'a, I>(records: I) -> DailySummary
where
    I: IntoIterator<Item = &'a Reconciliation>,
{
    records.into_iter().fold(DailySummary::ZERO, |acc, rec| {
        acc + DailySummary {
            total_volume: rec.calculated_sales,
            total_revenue: rec.revenue,
            total_variance: rec.variance,
        }
    })
}
