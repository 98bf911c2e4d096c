use chrono::{DateTime, Utc};
use ftk_schemas::{
    new_record_id, FuelType, Meter, Micros, PriceTable, RecordStatus, Reconciliation, Tank,
};

use crate::fuelmap::fuel_for_meter;
use crate::types::{DipMap, ReadingMap};

fn reading_or(map: &ReadingMap, id: &str, default: f64) -> f64 {
    match map.get(id) {
        Some(v) if !v.is_nan() => *v,
        _ => default,
    }
}

fn dip_or_zero(dips: &DipMap, id: &str) -> f64 {
    reading_or(dips, id, 0.0)
}

/// Deterministic shift reconciliation:
/// - One record per fuel grade, every grade, in report order.
/// - Book stock is the sum of the grade's tank volumes; physical stock is
///   the sum of their dips; metered sales are summed closing-minus-opening
///   deltas over the grade's meters.
/// - `variance = (opening_stock - actual_dips) - calculated_sales`, signed.
///   Positive is shrinkage, negative is surplus.
/// - Deltas are not clamped at zero.  A regression slipping past validation
///   shows up as negative sales and lands in the variance figure instead of
///   being silently absorbed.
/// - Receipts and transfers are carried as zero; external delivery feeds
///   would populate them.
///
/// Pure computation over its inputs.  No IO, no validation, no master-data
/// mutation.  Callers run validation first and apply rollforward events
/// themselves.  Identical inputs give identical output except the fresh
/// `id` and the caller-supplied `now`.
pub fn reconcile(
    tanks: &[Tank],
    meters: &[Meter],
    openings: &ReadingMap,
    closings: &ReadingMap,
    dips: &DipMap,
    prices: &PriceTable,
    operator_id: &str,
    now: DateTime<Utc>,
) -> Vec<Reconciliation> {
    FuelType::ALL
        .into_iter()
        .map(|fuel| {
            // 1) Book stock from the last committed tank volumes.
            let grade_tanks: Vec<&Tank> =
                tanks.iter().filter(|t| t.fuel_type == fuel).collect();
            let opening_stock: f64 = grade_tanks.iter().map(|t| t.current_volume_litres).sum();

            // 2) Physical stock from the shift's dips.  A missing dip counts
            //    as zero here; validation is the gate that rejects it.
            let actual_dips: f64 = grade_tanks
                .iter()
                .map(|t| dip_or_zero(dips, &t.id))
                .sum();

            // 3) Metered sales over the grade's meters.  Opening defaults to
            //    zero when absent; closing defaults to opening, which makes
            //    an untouched meter a zero-litre sale.
            let calculated_sales: f64 = meters
                .iter()
                .filter(|m| fuel_for_meter(m) == Some(fuel))
                .map(|m| {
                    let opening = reading_or(openings, &m.id, 0.0);
                    let closing = reading_or(closings, &m.id, opening);
                    closing - opening
                })
                .sum();

            // 4) Book minus physical, less what the meters say went out.
            let variance = (opening_stock - actual_dips) - calculated_sales;

            // 5) Revenue at the grade's pump price.  A grade missing from
            //    the price table earns zero rather than failing the commit.
            let price = prices.get(&fuel).copied().unwrap_or(Micros::ZERO);
            let revenue = price.mul_litres(calculated_sales);

            Reconciliation {
                id: new_record_id(),
                date: now.date_naive(),
                fuel_type: fuel,
                opening_stock,
                receipts: 0.0,
                transfers: 0.0,
                calculated_sales,
                actual_dips,
                variance,
                revenue,
                status: RecordStatus::Pending,
                is_locked: false,
                operator_id: operator_id.to_string(),
                approver_id: None,
                ts_utc: now,
                version: 1,
                version_history: Vec::new(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ftk_schemas::{price_table, MeterKind};

    fn ado_tank(volume: f64) -> Tank {
        Tank::new("t55-ado", "Tank 1 (ADO)", FuelType::Ado, 55_000.0, volume)
    }

    fn ulp_meter(id: &str) -> Meter {
        Meter::new(id, format!("Pump {id}"), MeterKind::Pump, 0.0)
    }

    fn map(entries: &[(&str, f64)]) -> ReadingMap {
        entries
            .iter()
            .map(|(id, v)| (id.to_string(), *v))
            .collect()
    }

    fn prices() -> PriceTable {
        price_table([
            (FuelType::Ado, Micros::from_dollars(1.85)),
            (FuelType::Ulp, Micros::from_dollars(1.92)),
            (FuelType::Zoom, Micros::from_dollars(2.10)),
        ])
    }

    #[test]
    fn one_record_per_grade_in_report_order() {
        let recs = reconcile(
            &[],
            &[],
            &ReadingMap::new(),
            &ReadingMap::new(),
            &DipMap::new(),
            &prices(),
            "u1",
            Utc::now(),
        );
        let grades: Vec<FuelType> = recs.iter().map(|r| r.fuel_type).collect();
        assert_eq!(grades, FuelType::ALL.to_vec());
        for rec in &recs {
            assert_eq!(rec.opening_stock, 0.0);
            assert_eq!(rec.calculated_sales, 0.0);
            assert_eq!(rec.variance, 0.0);
            assert_eq!(rec.revenue, Micros::ZERO);
            assert_eq!(rec.status, RecordStatus::Pending);
            assert!(!rec.is_locked);
            assert_eq!(rec.version, 1);
            assert!(rec.version_history.is_empty());
            assert_eq!(rec.receipts, 0.0);
            assert_eq!(rec.transfers, 0.0);
            assert_eq!(rec.operator_id, "u1");
            assert_eq!(rec.approver_id, None);
        }
    }

    #[test]
    fn opening_stock_sums_every_tank_of_the_grade() {
        let tanks = vec![
            ado_tank(42_000.0),
            Tank::new("t20-ado", "Tank 4 (ADO)", FuelType::Ado, 20_000.0, 8_000.0),
        ];
        let dips = map(&[("t55-ado", 41_000.0), ("t20-ado", 7_900.0)]);
        let recs = reconcile(
            &tanks,
            &[],
            &ReadingMap::new(),
            &ReadingMap::new(),
            &dips,
            &prices(),
            "u1",
            Utc::now(),
        );
        assert_eq!(recs[0].opening_stock, 50_000.0);
        assert_eq!(recs[0].actual_dips, 48_900.0);
        assert_eq!(recs[0].variance, 1_100.0);
    }

    #[test]
    fn missing_closing_defaults_to_opening_for_zero_sale() {
        let meters = vec![ulp_meter("m-pump-ulp-01")];
        let recs = reconcile(
            &[],
            &meters,
            &map(&[("m-pump-ulp-01", 890_200.0)]),
            &ReadingMap::new(),
            &DipMap::new(),
            &prices(),
            "u1",
            Utc::now(),
        );
        let ulp = &recs[1];
        assert_eq!(ulp.fuel_type, FuelType::Ulp);
        assert_eq!(ulp.calculated_sales, 0.0);
        assert_eq!(ulp.revenue, Micros::ZERO);
    }

    #[test]
    fn missing_opening_defaults_to_zero() {
        let meters = vec![ulp_meter("m-pump-ulp-01")];
        let recs = reconcile(
            &[],
            &meters,
            &ReadingMap::new(),
            &map(&[("m-pump-ulp-01", 350.0)]),
            &DipMap::new(),
            &prices(),
            "u1",
            Utc::now(),
        );
        assert_eq!(recs[1].calculated_sales, 350.0);
    }

    #[test]
    fn unvalidated_regression_flows_through_as_negative_sales() {
        let meters = vec![ulp_meter("m-pump-ulp-01")];
        let recs = reconcile(
            &[],
            &meters,
            &map(&[("m-pump-ulp-01", 500.0)]),
            &map(&[("m-pump-ulp-01", 400.0)]),
            &DipMap::new(),
            &prices(),
            "u1",
            Utc::now(),
        );
        assert_eq!(recs[1].calculated_sales, -100.0);
        assert_eq!(recs[1].variance, 100.0);
    }

    #[test]
    fn unpriced_grade_earns_zero_revenue() {
        let meters = vec![ulp_meter("m-pump-ulp-01")];
        let recs = reconcile(
            &[],
            &meters,
            &map(&[("m-pump-ulp-01", 0.0)]),
            &map(&[("m-pump-ulp-01", 100.0)]),
            &DipMap::new(),
            &price_table([(FuelType::Ado, Micros::from_dollars(1.85))]),
            "u1",
            Utc::now(),
        );
        assert_eq!(recs[1].calculated_sales, 100.0);
        assert_eq!(recs[1].revenue, Micros::ZERO);
    }

    #[test]
    fn variance_is_definitional_for_every_record() {
        let tanks = vec![ado_tank(42_000.0)];
        let meters = vec![ulp_meter("m-pump-ulp-01")];
        let recs = reconcile(
            &tanks,
            &meters,
            &map(&[("m-pump-ulp-01", 100.0)]),
            &map(&[("m-pump-ulp-01", 260.0)]),
            &map(&[("t55-ado", 41_500.0)]),
            &prices(),
            "u1",
            Utc::now(),
        );
        for rec in &recs {
            assert_eq!(
                rec.variance,
                (rec.opening_stock - rec.actual_dips) - rec.calculated_sales
            );
        }
    }

    #[test]
    fn identical_inputs_differ_only_in_identity_fields() {
        let tanks = vec![ado_tank(42_000.0)];
        let now = Utc::now();
        let a = reconcile(
            &tanks,
            &[],
            &ReadingMap::new(),
            &ReadingMap::new(),
            &map(&[("t55-ado", 41_500.0)]),
            &prices(),
            "u1",
            now,
        );
        let b = reconcile(
            &tanks,
            &[],
            &ReadingMap::new(),
            &ReadingMap::new(),
            &map(&[("t55-ado", 41_500.0)]),
            &prices(),
            "u1",
            now,
        );
        for (ra, rb) in a.iter().zip(&b) {
            assert_ne!(ra.id, rb.id);
            let mut rb = rb.clone();
            rb.id = ra.id;
            assert_eq!(*ra, rb);
        }
    }
}
