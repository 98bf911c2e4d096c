use ftk_schemas::{FuelType, Meter, MeterKind};

/// Resolve which fuel grade a meter measures.
///
/// Policy, fixed by naming convention rather than configuration:
/// - ADO if the meter id contains `"ado"` or `"drum"` (case-sensitive), or
///   the meter is a gantry.  Gantry loading is diesel-only at current sites.
/// - Otherwise the first grade whose name appears case-insensitively as a
///   substring of the meter id, scanning grades in report order.
/// - `None` when nothing matches; such a meter contributes to no grade and
///   the grade simply reports zero metered sales from it.
///
/// Substring semantics must not be replaced with an id-to-grade lookup
/// table: production meter ids are free-form and only resolve under
/// these exact rules.
pub fn fuel_for_meter(meter: &Meter) -> Option<FuelType> {
    if meter.id.contains("ado") || meter.id.contains("drum") || meter.kind == MeterKind::Gantry {
        return Some(FuelType::Ado);
    }
    let id = meter.id.to_lowercase();
    FuelType::ALL
        .into_iter()
        .find(|fuel| id.contains(&fuel.as_str().to_lowercase()))
}

/// Meters associated with one grade, preserving input order.
pub fn meters_for_fuel<'a>(meters: &'a [Meter], fuel: FuelType) -> Vec<&'a Meter> {
    meters
        .iter()
        .filter(|m| fuel_for_meter(m) == Some(fuel))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meter(id: &str, kind: MeterKind) -> Meter {
        Meter::new(id, id.to_uppercase(), kind, 0.0)
    }

    #[test]
    fn ado_substring_resolves_to_ado() {
        let m = meter("t55-ado-lane", MeterKind::Pump);
        assert_eq!(fuel_for_meter(&m), Some(FuelType::Ado));
    }

    #[test]
    fn drum_substring_resolves_to_ado() {
        let m = meter("m-drum-01", MeterKind::Pump);
        assert_eq!(fuel_for_meter(&m), Some(FuelType::Ado));
    }

    #[test]
    fn gantry_kind_resolves_to_ado_regardless_of_id() {
        let m = meter("m-gantry-01", MeterKind::Gantry);
        assert_eq!(fuel_for_meter(&m), Some(FuelType::Ado));
    }

    #[test]
    fn grade_name_in_id_is_case_insensitive() {
        assert_eq!(
            fuel_for_meter(&meter("m-pump-ULP-02", MeterKind::Pump)),
            Some(FuelType::Ulp)
        );
        assert_eq!(
            fuel_for_meter(&meter("m-zoom-01", MeterKind::Pump)),
            Some(FuelType::Zoom)
        );
        assert_eq!(
            fuel_for_meter(&meter("m-ADO-07", MeterKind::Pump)),
            Some(FuelType::Ado)
        );
    }

    #[test]
    fn unmatched_meter_resolves_to_no_grade() {
        let m = meter("m-servo-01-am", MeterKind::Pump);
        assert_eq!(fuel_for_meter(&m), None);
    }

    #[test]
    fn partition_is_disjoint_and_order_preserving() {
        let meters = vec![
            meter("m-gantry-01", MeterKind::Gantry),
            meter("m-pump-ulp-01", MeterKind::Pump),
            meter("m-pump-ulp-02", MeterKind::Pump),
            meter("m-zoom-01", MeterKind::Pump),
            meter("m-servo-01-am", MeterKind::Pump),
        ];
        let assigned: usize = FuelType::ALL
            .into_iter()
            .map(|f| meters_for_fuel(&meters, f).len())
            .sum();
        // Every meter lands in at most one partition; the servo meter in
        // none.
        assert_eq!(assigned, meters.len() - 1);
        let ulp = meters_for_fuel(&meters, FuelType::Ulp);
        assert_eq!(
            ulp.iter().map(|m| m.id.as_str()).collect::<Vec<_>>(),
            vec!["m-pump-ulp-01", "m-pump-ulp-02"]
        );
    }
}
