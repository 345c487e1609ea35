//! Fire correction: move the target by a spotter's left/right and add/drop
//! call, measured along the gun-target (GT) line or, when an observer is
//! given, along the observer-target (OT) line; then re-solve from the gun.

mod mission;

pub use mission::FireMission;

use crate::angles::{degrees_to_mils, normalize_mil_delta, normalize_mils};
use crate::dataset::Dataset;
use crate::error::Result;
use crate::geometry::{calculate_bearing, calculate_horizontal_distance, offset_position, Position3D};
use crate::solution::{calculate, prepare_input, FiringSolution};
use serde::{Deserialize, Serialize};

/// Spotting correction in meters. Positive `lr` is right, positive `ad` is add.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FireCorrection {
    pub lr: f64,
    pub ad: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CorrectionReference {
    GunTarget,
    ObserverTarget,
}

/// Target moved by a correction, with the line it was measured on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrectedTarget {
    pub position: Position3D,
    pub reference: CorrectionReference,
    /// Bearing of the reference line, degrees.
    pub reference_bearing: f64,
}

/// Apply `correction` to `target`. With an observer the offsets follow the
/// observer's line of sight; otherwise the gun's. An observer standing on
/// the target has no line of sight, so the gun-target line is used instead.
/// Altitude is unchanged.
pub fn apply_correction(
    gun: &Position3D,
    target: &Position3D,
    observer: Option<&Position3D>,
    correction: FireCorrection,
) -> CorrectedTarget {
    let (reference, origin) = match observer {
        Some(o) if calculate_horizontal_distance(o, target) > 0.0 => {
            (CorrectionReference::ObserverTarget, o)
        }
        Some(_) => {
            tracing::debug!("observer is on the target, correcting along the gun-target line");
            (CorrectionReference::GunTarget, gun)
        }
        None => (CorrectionReference::GunTarget, gun),
    };
    let reference_bearing = calculate_bearing(origin, target);
    CorrectedTarget {
        position: offset_position(target, reference_bearing, correction.ad, correction.lr),
        reference,
        reference_bearing,
    }
}

/// Charge changed between the previous and the corrected solution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChargeTransition {
    pub from: u32,
    pub to: u32,
}

#[derive(Debug, Clone)]
pub struct CorrectionRequest<'a> {
    pub weapon_id: &'a str,
    pub ammo_id: &'a str,
    pub gun: Position3D,
    pub target: Position3D,
    pub observer: Option<Position3D>,
    pub correction: FireCorrection,
    /// Charge of the last round fired; solved from `target` when absent.
    pub previous_charge: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrectionOutcome {
    /// Target before the correction, kept as given for undo.
    pub original_target: Position3D,
    pub new_target: Position3D,
    pub reference: CorrectionReference,
    pub reference_bearing: f64,
    pub solution: FiringSolution,
    pub charge_transition: Option<ChargeTransition>,
    /// New minus old azimuth, mils, in `(-half, +half]` of the weapon's circle.
    pub azimuth_delta_mils: f64,
}

/// Correct and re-solve. The new solve always uses gun -> new target and
/// reruns automatic charge selection.
pub fn correct_fire(dataset: &Dataset, req: &CorrectionRequest<'_>) -> Result<CorrectionOutcome> {
    let mil = dataset.get_mil_system_config(req.weapon_id)?.clone();
    let previous_charge = match req.previous_charge {
        Some(c) => Some(c),
        None => {
            let input = prepare_input(dataset, req.gun, req.target, req.weapon_id, req.ammo_id)?;
            calculate(dataset, &input)?.charge
        }
    };

    let corrected = apply_correction(&req.gun, &req.target, req.observer.as_ref(), req.correction);
    let input = prepare_input(dataset, req.gun, corrected.position, req.weapon_id, req.ammo_id)?;
    let solution = calculate(dataset, &input)?;

    let charge_transition = match (previous_charge, solution.charge) {
        (Some(from), Some(to)) if solution.in_range && from != to => {
            tracing::info!("charge change after correction: {} -> {}", from, to);
            Some(ChargeTransition { from, to })
        }
        _ => None,
    };

    let old_mils = normalize_mils(
        degrees_to_mils(calculate_bearing(&req.gun, &req.target), mil.mils_per_degree),
        mil.mils_per_circle,
    );
    let new_mils = normalize_mils(
        degrees_to_mils(input.bearing, mil.mils_per_degree),
        mil.mils_per_circle,
    );
    let azimuth_delta_mils = normalize_mil_delta(new_mils - old_mils, mil.mils_per_circle);

    Ok(CorrectionOutcome {
        original_target: req.target,
        new_target: corrected.position,
        reference: corrected.reference,
        reference_bearing: corrected.reference_bearing,
        solution,
        charge_transition,
        azimuth_delta_mils,
    })
}
