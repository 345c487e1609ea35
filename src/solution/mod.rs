//! Firing solution assembly: geometry + charge selection + table lookup +
//! height correction + angle conversion.

use crate::angles::{apply_height_correction, degrees_to_mils, mils_to_degrees, normalize_mils};
use crate::dataset::{Charge, Dataset, MilSystem, SystemType};
use crate::error::Result;
use crate::geometry::{calculate_bearing, calculate_horizontal_distance, Position3D};
use crate::table::{interpolate_from_table, select_charge, ChargeSelection};
use crate::util::round_to;
use serde::Serialize;

/// Geometry and ids for one solve.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculatorInput {
    pub weapon_id: String,
    pub ammo_id: String,
    pub system_type: SystemType,
    pub weapon_pos: Position3D,
    pub target_pos: Position3D,
    pub distance: f64,
    /// target.z - weapon.z
    pub height_difference: f64,
    /// Degrees, `[0, 360)`.
    pub bearing: f64,
    pub forced_charge: Option<u32>,
}

impl CalculatorInput {
    pub fn with_charge(mut self, level: u32) -> Self {
        self.forced_charge = Some(level);
        self
    }
}

/// Why a target could not be solved. Reported to callers as one shape
/// (`in_range == false`); kept apart here for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeMiss {
    /// No charge envelope contains the distance.
    Envelope,
    /// The selected charge's table has no rows around the distance.
    TableCoverage,
    /// A forced charge level that the ammunition does not have.
    UnknownCharge,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FiringSolution {
    pub in_range: bool,
    pub charge: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
    /// Mils.
    pub elevation: f64,
    pub elevation_degrees: f64,
    /// Degrees.
    pub azimuth: f64,
    pub azimuth_mils: f64,
    /// Seconds.
    pub time_of_flight: f64,
    pub min_range: f64,
    pub max_range: f64,
    pub distance: f64,
    pub height_difference: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip)]
    pub miss: Option<RangeMiss>,
}

impl FiringSolution {
    fn out_of_range(
        input: &CalculatorInput,
        charge: Option<&Charge>,
        min_range: f64,
        max_range: f64,
        miss: RangeMiss,
        message: String,
    ) -> Self {
        tracing::debug!(
            "{} {} at {:.0}m not solved ({:?}): {}",
            input.weapon_id,
            input.ammo_id,
            input.distance,
            miss,
            message
        );
        FiringSolution {
            in_range: false,
            charge: charge.map(|c| c.level),
            variant: charge.and_then(|c| c.variant.clone()),
            elevation: 0.0,
            elevation_degrees: 0.0,
            azimuth: round_to(input.bearing, 2),
            azimuth_mils: 0.0,
            time_of_flight: 0.0,
            min_range,
            max_range,
            distance: input.distance,
            height_difference: input.height_difference,
            error: Some(message),
            miss: Some(miss),
        }
    }
}

/// Derive distance, height difference and bearing for a gun/target pair and
/// check the ids against the dataset.
pub fn prepare_input(
    dataset: &Dataset,
    weapon_pos: Position3D,
    target_pos: Position3D,
    weapon_id: &str,
    ammo_id: &str,
) -> Result<CalculatorInput> {
    let cfg = dataset.get_weapon_config(weapon_id, ammo_id)?;
    Ok(CalculatorInput {
        weapon_id: cfg.weapon.id.clone(),
        ammo_id: cfg.ammunition.id.clone(),
        system_type: cfg.weapon.system_type,
        weapon_pos,
        target_pos,
        distance: calculate_horizontal_distance(&weapon_pos, &target_pos),
        height_difference: target_pos.z - weapon_pos.z,
        bearing: calculate_bearing(&weapon_pos, &target_pos),
        forced_charge: None,
    })
}

/// Best (or forced) solution for one input. Unknown ids are errors; an
/// unreachable target is an `in_range == false` solution.
pub fn calculate(dataset: &Dataset, input: &CalculatorInput) -> Result<FiringSolution> {
    let cfg = dataset.get_weapon_config(&input.weapon_id, &input.ammo_id)?;
    let ammo = &cfg.ammunition;
    let (min, max) = ammo.range_envelope();
    let solution = match select_charge(&ammo.charges, input.distance, input.forced_charge) {
        ChargeSelection::Auto(c) | ChargeSelection::Forced(c) => {
            solve_with_charge(cfg.mil_system(), c, input)
        }
        ChargeSelection::NoneInRange => FiringSolution::out_of_range(
            input,
            None,
            min,
            max,
            RangeMiss::Envelope,
            format!(
                "Target at {:.0}m is out of range ({:.0}-{:.0}m)",
                input.distance, min, max
            ),
        ),
        ChargeSelection::UnknownLevel(level) => FiringSolution::out_of_range(
            input,
            None,
            min,
            max,
            RangeMiss::UnknownCharge,
            format!("Charge {} is not available for {}", level, ammo.id),
        ),
    };
    Ok(solution)
}

/// Every charge whose envelope contains the distance, solved and sorted by
/// charge level. When nothing reaches, a single out-of-range descriptor with
/// the union of all envelopes; its cause is `TableCoverage` if some envelope
/// held the distance but no table covered it.
pub fn calculate_all_trajectories(
    dataset: &Dataset,
    input: &CalculatorInput,
) -> Result<Vec<FiringSolution>> {
    let cfg = dataset.get_weapon_config(&input.weapon_id, &input.ammo_id)?;
    let ammo = &cfg.ammunition;
    let (mut out, uncovered): (Vec<FiringSolution>, Vec<FiringSolution>) = ammo
        .charges
        .iter()
        .filter(|c| c.contains(input.distance))
        .map(|c| solve_with_charge(cfg.mil_system(), c, input))
        .partition(|s| s.in_range);
    out.sort_by_key(|s| s.charge);
    if out.is_empty() {
        let (min, max) = ammo.range_envelope();
        let (miss, message) = if uncovered.is_empty() {
            (
                RangeMiss::Envelope,
                format!(
                    "No charge reaches {:.0}m (range {:.0}-{:.0}m)",
                    input.distance, min, max
                ),
            )
        } else {
            (
                RangeMiss::TableCoverage,
                format!(
                    "No range table data at {:.0}m for {} charge(s) in reach",
                    input.distance,
                    uncovered.len()
                ),
            )
        };
        tracing::debug!("no trajectory for {} at {:.0}m: {:?}", ammo.id, input.distance, miss);
        out.push(FiringSolution::out_of_range(input, None, min, max, miss, message));
    }
    Ok(out)
}

/// Solve with a specific charge; only its table coverage is checked.
pub(crate) fn solve_with_charge(
    mil: &MilSystem,
    charge: &Charge,
    input: &CalculatorInput,
) -> FiringSolution {
    let row = match interpolate_from_table(&charge.range_table, input.distance) {
        Some(r) => r,
        None => {
            return FiringSolution::out_of_range(
                input,
                Some(charge),
                charge.min_range,
                charge.max_range,
                RangeMiss::TableCoverage,
                format!(
                    "No range table data for {} at {:.0}m",
                    charge.label(),
                    input.distance
                ),
            )
        }
    };
    let elevation = apply_height_correction(row.elevation, input.height_difference, row.d_elev);
    let azimuth_mils = normalize_mils(
        degrees_to_mils(input.bearing, mil.mils_per_degree),
        mil.mils_per_circle,
    );
    FiringSolution {
        in_range: true,
        charge: Some(charge.level),
        variant: charge.variant.clone(),
        elevation,
        elevation_degrees: mils_to_degrees(elevation, mil.mils_per_degree),
        azimuth: round_to(input.bearing, 2),
        azimuth_mils,
        time_of_flight: round_to(row.tof, 1),
        min_range: charge.min_range,
        max_range: charge.max_range,
        distance: input.distance,
        height_difference: input.height_difference,
        error: None,
        miss: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::tests::test_dataset;
    use crate::error::CalcError;

    fn input(x: f64, y: f64, z: f64, weapon: &str) -> CalculatorInput {
        prepare_input(
            &test_dataset(),
            Position3D::new(0.0, 0.0, 0.0),
            Position3D::new(x, y, z),
            weapon,
            "HE",
        )
        .unwrap()
    }

    #[test]
    fn prepare_derives_geometry() {
        let i = input(300.0, 400.0, -25.0, "m1");
        assert_eq!(i.weapon_id, "M1");
        assert_eq!(i.system_type, SystemType::Mortar);
        assert!((i.distance - 500.0).abs() < 1e-9);
        assert_eq!(i.height_difference, -25.0);
        assert!((i.bearing - 36.8699).abs() < 1e-3);
    }

    #[test]
    fn prepare_rejects_bad_ids() {
        let d = test_dataset();
        let p = Position3D::default();
        assert!(matches!(
            prepare_input(&d, p, p, "X", "HE"),
            Err(CalcError::UnknownWeapon(_))
        ));
        assert!(matches!(
            prepare_input(&d, p, p, "M1", "WP"),
            Err(CalcError::UnknownAmmunition { .. })
        ));
    }

    #[test]
    fn solves_lowest_charge() {
        let d = test_dataset();
        let s = calculate(&d, &input(0.0, 200.0, 0.0, "M1")).unwrap();
        assert!(s.in_range);
        assert_eq!(s.charge, Some(0));
        assert_eq!(s.elevation, 1400.0);
        assert_eq!(s.elevation_degrees, 78.75);
        assert_eq!(s.azimuth, 0.0);
        assert_eq!(s.azimuth_mils, 0.0);
        assert!((s.time_of_flight - 13.5).abs() < 1e-9);
        assert_eq!((s.min_range, s.max_range), (100.0, 500.0));
        assert!(s.error.is_none());
    }

    #[test]
    fn mlrs_variant_with_height() {
        let d = test_dataset();
        let s = calculate(&d, &input(2000.0, 0.0, 100.0, "R1")).unwrap();
        assert!(s.in_range);
        assert_eq!(s.variant.as_deref(), Some("Short"));
        // 250 - (100/100 * -40)
        assert_eq!(s.elevation, 290.0);
        assert_eq!(s.azimuth, 90.0);
        assert_eq!(s.azimuth_mils, 1500.0);
    }

    #[test]
    fn envelope_miss_reports_union() {
        let d = test_dataset();
        let s = calculate(&d, &input(0.0, 2000.0, 0.0, "M1")).unwrap();
        assert!(!s.in_range);
        assert_eq!(s.miss, Some(RangeMiss::Envelope));
        assert_eq!((s.min_range, s.max_range), (100.0, 1200.0));
        assert!(s.error.unwrap().contains("out of range"));
    }

    #[test]
    fn forced_charge_table_miss() {
        let d = test_dataset();
        let i = input(0.0, 200.0, 0.0, "M1").with_charge(1);
        let s = calculate(&d, &i).unwrap();
        assert!(!s.in_range);
        assert_eq!(s.charge, Some(1));
        assert_eq!(s.miss, Some(RangeMiss::TableCoverage));
        assert_eq!((s.min_range, s.max_range), (400.0, 1200.0));
    }

    #[test]
    fn forced_charge_outside_envelope_uses_table() {
        let d = test_dataset();
        // R-LONG envelope starts at 2500 but its table starts at 2000
        let i = input(0.0, 2000.0, 0.0, "R1").with_charge(1);
        let s = calculate(&d, &i).unwrap();
        assert!(s.in_range);
        assert_eq!(s.variant.as_deref(), Some("Long"));
        assert_eq!(s.elevation, 50.0);
    }

    #[test]
    fn forced_unknown_level() {
        let d = test_dataset();
        let s = calculate(&d, &input(0.0, 200.0, 0.0, "M1").with_charge(9)).unwrap();
        assert!(!s.in_range);
        assert_eq!(s.miss, Some(RangeMiss::UnknownCharge));
    }

    #[test]
    fn all_trajectories_sorted_by_charge() {
        let d = test_dataset();
        let all = calculate_all_trajectories(&d, &input(0.0, 450.0, 0.0, "M1")).unwrap();
        let charges: Vec<_> = all.iter().map(|s| s.charge).collect();
        assert_eq!(charges, vec![Some(0), Some(1)]);
        assert!(all.iter().all(|s| s.in_range));
        assert_eq!(all[1].elevation, 1375.0);
    }

    #[test]
    fn all_trajectories_none_in_range() {
        let d = test_dataset();
        let all = calculate_all_trajectories(&d, &input(0.0, 50.0, 0.0, "M1")).unwrap();
        assert_eq!(all.len(), 1);
        assert!(!all[0].in_range);
        assert_eq!((all[0].min_range, all[0].max_range), (100.0, 1200.0));
    }

    #[test]
    fn all_trajectories_table_gap_keeps_cause() {
        // envelope runs to 1000m but the table stops at 500m
        let d = Dataset::from_json_str(
            r#"[{"id": "G1", "name": "Gap Mortar", "systemType": "mortar",
                "milSystem": {"name": "NATO", "milsPerCircle": 6400},
                "shellTypes": [{"type": "HE", "name": "HE", "charges": [
                  {"level": 0, "minRange": 100, "maxRange": 1000, "rangeTable": [
                    {"range": 100, "elevation": 1500, "tof": 10, "dElev": 4},
                    {"range": 500, "elevation": 1100, "tof": 20, "dElev": 12}]}]}]}]"#,
        )
        .unwrap();
        let i = prepare_input(
            &d,
            Position3D::default(),
            Position3D::new(0.0, 800.0, 0.0),
            "G1",
            "HE",
        )
        .unwrap();
        assert_eq!(calculate(&d, &i).unwrap().miss, Some(RangeMiss::TableCoverage));
        let all = calculate_all_trajectories(&d, &i).unwrap();
        assert_eq!(all.len(), 1);
        assert!(!all[0].in_range);
        assert_eq!(all[0].miss, Some(RangeMiss::TableCoverage));
        assert_eq!((all[0].min_range, all[0].max_range), (100.0, 1000.0));
        assert!(all[0].error.as_deref().unwrap().contains("No range table data"));
    }

    #[test]
    fn all_trajectories_envelope_miss_cause() {
        let d = test_dataset();
        let all = calculate_all_trajectories(&d, &input(0.0, 5000.0, 0.0, "M1")).unwrap();
        assert_eq!(all[0].miss, Some(RangeMiss::Envelope));
    }

    #[test]
    fn deterministic() {
        let d = test_dataset();
        let i = input(123.0, 321.0, 12.0, "M1");
        assert_eq!(calculate(&d, &i).unwrap(), calculate(&d, &i).unwrap());
    }

    #[test]
    fn serializes_camel_case() {
        let d = test_dataset();
        let s = calculate(&d, &input(0.0, 200.0, 0.0, "M1")).unwrap();
        let v = serde_json::to_value(&s).unwrap();
        assert_eq!(v["inRange"], serde_json::json!(true));
        assert!(v.get("elevationDegrees").is_some());
        assert!(v.get("error").is_none());
        assert!(v.get("miss").is_none());
    }
}
