//! ftk-testkit
//!
//! Shared fixtures for scenario tests: one fully-staffed station and a
//! pre-reconciled trading day with hand-checked figures.
//!
//! Production crates must never depend on this crate; it exists for
//! `[dev-dependencies]` only.

use chrono::{DateTime, Utc};

use ftk_schemas::{
    new_record_id, price_table, FuelType, Meter, MeterKind, Micros, RecordStatus, Reconciliation,
    Role, Station, Tank, User,
};

/// Three-grade depot with five metering points and one user per role.
///
/// Meter ids follow the site naming convention, so every meter resolves
/// to a grade: the gantry and drum carry ADO, pump ids carry their
/// grade name.
pub fn station() -> Station {
    Station {
        name: "Main Depot".to_string(),
        tanks: vec![
            Tank::new("t55-ado", "T55 (ADO Storage)", FuelType::Ado, 55_000.0, 42_000.0),
            Tank::new("t30-ulp", "T30 (ULP Storage)", FuelType::Ulp, 30_000.0, 18_500.0),
            Tank::new("t30-zoom", "T30 (ZOOM Storage)", FuelType::Zoom, 30_000.0, 12_200.0),
        ],
        meters: vec![
            Meter::new("m-gantry-01", "Main Gantry Meter", MeterKind::Gantry, 1_250_400.0),
            Meter::new("m-drum-01", "Drum Filling Point A", MeterKind::Drum, 45_200.0),
            Meter::new("m-pump-ulp-01", "ULP Pump 01 (AM)", MeterKind::Pump, 890_200.0),
            Meter::new("m-pump-ulp-02", "ULP Pump 01 (PM)", MeterKind::Pump, 892_500.0),
            Meter::new("m-pump-zoom-01", "ZOOM Pump 02 (AM)", MeterKind::Pump, 550_100.0),
        ],
        users: vec![
            User::new("u1", "James (Operator)", Role::Operator),
            User::new("u2", "Sarah (Controller)", Role::StockController),
            User::new("u3", "David (Supervisor)", Role::Supervisor),
            User::new("u4", "Admin Node", Role::Admin),
        ],
        prices: price_table([
            (FuelType::Ado, Micros::from_dollars(1.85)),
            (FuelType::Ulp, Micros::from_dollars(1.92)),
            (FuelType::Zoom, Micros::from_dollars(2.10)),
        ]),
    }
}

/// One reconciled day for all three grades, with hand-checked figures.
///
/// ADO took a 5000 L receipt and shows a 50 L loss against book stock
/// including that receipt; ULP shows a 150 L loss; ZOOM balanced
/// exactly and has already been approved and locked by the supervisor.
/// Record ids are fresh on every call.
pub fn sample_day(operator_id: &str, now: DateTime<Utc>) -> Vec<Reconciliation> {
    let date = now.date_naive();
    let base = |fuel_type: FuelType| Reconciliation {
        id: new_record_id(),
        date,
        fuel_type,
        opening_stock: 0.0,
        receipts: 0.0,
        transfers: 0.0,
        calculated_sales: 0.0,
        actual_dips: 0.0,
        variance: 0.0,
        revenue: Micros::ZERO,
        status: RecordStatus::Pending,
        is_locked: false,
        operator_id: operator_id.to_string(),
        approver_id: None,
        ts_utc: now,
        version: 1,
        version_history: Vec::new(),
    };

    let ado = Reconciliation {
        opening_stock: 42_000.0,
        receipts: 5_000.0,
        calculated_sales: 3_200.0,
        actual_dips: 43_750.0,
        variance: -50.0,
        revenue: Micros::from_dollars(5_920.0),
        ..base(FuelType::Ado)
    };
    let ulp = Reconciliation {
        opening_stock: 18_500.0,
        calculated_sales: 1_200.0,
        actual_dips: 17_150.0,
        variance: -150.0,
        revenue: Micros::from_dollars(2_304.0),
        ..base(FuelType::Ulp)
    };
    let zoom = Reconciliation {
        opening_stock: 12_200.0,
        calculated_sales: 450.0,
        actual_dips: 11_750.0,
        variance: 0.0,
        revenue: Micros::from_dollars(945.0),
        status: RecordStatus::Approved,
        is_locked: true,
        approver_id: Some("u3".to_string()),
        ..base(FuelType::Zoom)
    };

    vec![ado, ulp, zoom]
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::TimeZone;

    #[test]
    fn station_covers_every_grade_and_role() {
        let station = station();
        assert_eq!(station.tanks.len(), 3);
        assert_eq!(station.meters.len(), 5);
        assert_eq!(station.users.len(), 4);
        assert_eq!(station.prices.len(), 3);
        for grade in FuelType::ALL {
            assert!(station.tanks.iter().any(|t| t.fuel_type == grade));
            assert!(station.prices.contains_key(&grade));
        }
        for role in [
            Role::Operator,
            Role::StockController,
            Role::Supervisor,
            Role::Admin,
        ] {
            assert!(station.users.iter().any(|u| u.role == role));
        }
    }

    #[test]
    fn sample_day_covers_every_grade_once() {
        let now = Utc.with_ymd_and_hms(2026, 8, 25, 14, 0, 0).unwrap();
        let day = sample_day("u1", now);
        let grades: Vec<FuelType> = day.iter().map(|r| r.fuel_type).collect();
        assert_eq!(grades, FuelType::ALL.to_vec());
        for rec in &day {
            assert_eq!(rec.operator_id, "u1");
            assert_eq!(rec.date, now.date_naive());
            assert_eq!(rec.version, 1);
            assert!(rec.version_history.is_empty());
        }
    }

    #[test]
    fn sample_day_zoom_arrives_already_approved() {
        let now = Utc.with_ymd_and_hms(2026, 8, 25, 14, 0, 0).unwrap();
        let day = sample_day("u1", now);
        let zoom = &day[2];
        assert_eq!(zoom.fuel_type, FuelType::Zoom);
        assert_eq!(zoom.status, RecordStatus::Approved);
        assert!(zoom.is_locked);
        assert_eq!(zoom.approver_id.as_deref(), Some("u3"));
        assert_eq!(zoom.variance, 0.0);
    }

    #[test]
    fn sample_day_revenue_matches_pump_prices() {
        let now = Utc.with_ymd_and_hms(2026, 8, 25, 14, 0, 0).unwrap();
        let station = station();
        for rec in sample_day("u1", now) {
            let price = station.prices[&rec.fuel_type];
            assert_eq!(rec.revenue, price.mul_litres(rec.calculated_sales));
        }
    }

    #[test]
    fn sample_day_ids_are_fresh_per_call() {
        let now = Utc.with_ymd_and_hms(2026, 8, 25, 14, 0, 0).unwrap();
        let first = sample_day("u1", now);
        let second = sample_day("u1", now);
        assert_ne!(first[0].id, second[0].id);
    }
}
