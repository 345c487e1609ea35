//! Fire-for-effect sheaf patterns: point generation and charge-locked batch solve.

use crate::config::MAX_FFE_ROUNDS;
use crate::dataset::Dataset;
use crate::error::{CalcError, Result};
use crate::geometry::{calculate_bearing, normalize_degrees, offset_position, Position3D};
use crate::solution::{calculate, prepare_input, solve_with_charge, FiringSolution};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum FfePattern {
    /// Lateral sheaf across the gun-target line.
    Perpendicular { rounds: u32, spacing: f64 },
    /// Linear sheaf along the gun-target line, for depth.
    AlongBearing { rounds: u32, spacing: f64 },
    /// Points evenly spaced on a circle around the target.
    Circular { rounds: u32, radius: f64 },
}

impl FfePattern {
    pub fn rounds(&self) -> u32 {
        match *self {
            FfePattern::Perpendicular { rounds, .. }
            | FfePattern::AlongBearing { rounds, .. }
            | FfePattern::Circular { rounds, .. } => rounds,
        }
    }

    pub fn validate(&self, max_rounds: u32) -> Result<()> {
        let max_rounds = max_rounds.min(MAX_FFE_ROUNDS);
        let rounds = self.rounds();
        if rounds == 0 || rounds > max_rounds {
            return Err(CalcError::InvalidPattern(format!(
                "rounds must be 1-{}, got {}",
                max_rounds, rounds
            )));
        }
        let (name, value) = match *self {
            FfePattern::Perpendicular { spacing, .. } | FfePattern::AlongBearing { spacing, .. } => {
                ("spacing", spacing)
            }
            FfePattern::Circular { radius, .. } => ("radius", radius),
        };
        if !(value.is_finite() && value > 0.0) {
            return Err(CalcError::InvalidPattern(format!(
                "{} must be a positive number, got {}",
                name, value
            )));
        }
        Ok(())
    }
}

/// Offsets `(i - (n-1)/2) * spacing`, centred on zero.
fn centred_offsets(rounds: u32, spacing: f64) -> impl Iterator<Item = f64> {
    let mid = (rounds as f64 - 1.0) / 2.0;
    (0..rounds).map(move |i| (i as f64 - mid) * spacing)
}

/// Perpendicular sheaf: `rounds` points across the gun-target bearing.
pub fn generate_perpendicular(target: &Position3D, bearing: f64, rounds: u32, spacing: f64) -> Vec<Position3D> {
    centred_offsets(rounds, spacing)
        .map(|off| offset_position(target, bearing, 0.0, off))
        .collect()
}

/// Linear sheaf along the gun-target bearing.
pub fn generate_along_bearing(target: &Position3D, bearing: f64, rounds: u32, spacing: f64) -> Vec<Position3D> {
    centred_offsets(rounds, spacing)
        .map(|off| offset_position(target, bearing, off, 0.0))
        .collect()
}

/// Circle of `rounds` points around the target, first point on bearing 0.
pub fn generate_circular(target: &Position3D, rounds: u32, radius: f64) -> Vec<Position3D> {
    (0..rounds)
        .map(|i| {
            let angle = 360.0 * i as f64 / rounds as f64;
            offset_position(target, angle, radius, 0.0)
        })
        .collect()
}

pub fn generate_pattern(gun: &Position3D, target: &Position3D, pattern: &FfePattern) -> Vec<Position3D> {
    let bearing = calculate_bearing(gun, target);
    match *pattern {
        FfePattern::Perpendicular { rounds, spacing } => {
            generate_perpendicular(target, bearing, rounds, spacing)
        }
        FfePattern::AlongBearing { rounds, spacing } => {
            generate_along_bearing(target, bearing, rounds, spacing)
        }
        FfePattern::Circular { rounds, radius } => generate_circular(target, rounds, radius),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FfeRound {
    /// Position in generation order.
    pub index: usize,
    pub target: Position3D,
    pub solution: FiringSolution,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FfeSolution {
    pub pattern: FfePattern,
    pub center: FiringSolution,
    /// Charge shared by every round.
    pub charge: u32,
    /// Rounds sorted by azimuth; may hold fewer than requested.
    pub rounds: Vec<FfeRound>,
    pub dropped: usize,
}

/// Sort rounds by azimuth as one sweep around `center_bearing` (degrees):
/// each azimuth is taken relative to the centre, wrapped into `(-180, 180]`,
/// so a sheaf across north runs 358, 359, 0, 1. Stable for equal azimuths.
pub fn sort_by_azimuth(rounds: &mut [FfeRound], center_bearing: f64) {
    let relative = |az: f64| {
        let d = normalize_degrees(az - center_bearing);
        if d > 180.0 {
            d - 360.0
        } else {
            d
        }
    };
    rounds.sort_by(|a, b| relative(a.solution.azimuth).total_cmp(&relative(b.solution.azimuth)));
}

/// Generate and solve a sheaf. The centre target fixes the charge; points
/// outside that charge's envelope or table are left out.
pub fn solve_ffe(
    dataset: &Dataset,
    gun: Position3D,
    target: Position3D,
    weapon_id: &str,
    ammo_id: &str,
    pattern: &FfePattern,
    max_rounds: u32,
) -> Result<FfeSolution> {
    pattern.validate(max_rounds)?;
    let cfg = dataset.get_weapon_config(weapon_id, ammo_id)?;
    let center_input = prepare_input(dataset, gun, target, weapon_id, ammo_id)?;
    let center = calculate(dataset, &center_input)?;
    let charge = match (center.in_range, center.charge.and_then(|l| cfg.ammunition.charge(l))) {
        (true, Some(c)) => c,
        _ => {
            return Err(CalcError::FfeCenterOutOfRange {
                distance: center.distance,
                min_range: center.min_range,
                max_range: center.max_range,
            })
        }
    };

    let points = generate_pattern(&gun, &target, pattern);
    let requested = points.len();
    let mut rounds = Vec::with_capacity(requested);
    for (index, point) in points.into_iter().enumerate() {
        let input = prepare_input(dataset, gun, point, weapon_id, ammo_id)?;
        if !charge.contains(input.distance) {
            tracing::debug!(
                "FFE round {} at {:.0}m outside {} envelope, dropped",
                index,
                input.distance,
                charge.label()
            );
            continue;
        }
        let solution = solve_with_charge(cfg.mil_system(), charge, &input);
        if !solution.in_range {
            tracing::debug!("FFE round {} has no table data, dropped", index);
            continue;
        }
        rounds.push(FfeRound {
            index,
            target: point,
            solution,
        });
    }
    sort_by_azimuth(&mut rounds, center_input.bearing);
    let dropped = requested - rounds.len();
    tracing::info!(
        "FFE solved {}/{} round(s) on {}",
        rounds.len(),
        requested,
        charge.label()
    );
    Ok(FfeSolution {
        pattern: *pattern,
        charge: charge.level,
        center,
        rounds,
        dropped,
    })
}
