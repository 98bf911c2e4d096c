use chrono::Utc;
use ftk_reconcile::*;
use ftk_schemas::{price_table, FuelType, Meter, MeterKind, Micros, RecordStatus, Tank};

#[test]
fn scenario_single_grade_shift_produces_exact_figures() {
    let tanks = vec![Tank::new(
        "t55-ado",
        "Tank 1 (ADO)",
        FuelType::Ado,
        55_000.0,
        42_000.0,
    )];
    let meters = vec![Meter::new(
        "m-drum-01",
        "Drum Meter",
        MeterKind::Drum,
        1_000.0,
    )];
    let openings: ReadingMap = [("m-drum-01".to_string(), 1_000.0)].into();
    let closings: ReadingMap = [("m-drum-01".to_string(), 4_200.0)].into();
    let dips: DipMap = [("t55-ado".to_string(), 43_800.0)].into();
    let prices = price_table([(FuelType::Ado, Micros::from_dollars(1.85))]);

    assert!(validate_readings(&meters, &openings, &closings).is_empty());
    assert!(validate_dips(&tanks, &dips).is_empty());

    let recs = reconcile(
        &tanks, &meters, &openings, &closings, &dips, &prices, "u1",
        Utc::now(),
    );

    let ado = &recs[0];
    assert_eq!(ado.fuel_type, FuelType::Ado);
    assert_eq!(ado.opening_stock, 42_000.0);
    assert_eq!(ado.actual_dips, 43_800.0);
    assert_eq!(ado.calculated_sales, 3_200.0);
    assert_eq!(ado.variance, -5_000.0);
    assert_eq!(ado.revenue, Micros::from_dollars(5_920.0));
    assert_eq!(ado.status, RecordStatus::Pending);
    assert!(!ado.is_locked);
    assert_eq!(ado.version, 1);
}
