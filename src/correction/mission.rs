//! Caller-owned fire mission record: current target, correction history for
//! undo, and the last charge fired.

use super::{correct_fire, CorrectionOutcome, CorrectionRequest, FireCorrection};
use crate::dataset::Dataset;
use crate::error::Result;
use crate::geometry::Position3D;
use crate::solution::{calculate, prepare_input, FiringSolution};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FireMission {
    pub weapon_id: String,
    pub ammo_id: String,
    pub gun: Position3D,
    pub observer: Option<Position3D>,
    target: Position3D,
    /// Targets (and charges) as they were before each applied correction.
    history: Vec<(Position3D, Option<u32>)>,
    last_charge: Option<u32>,
}

impl FireMission {
    pub fn new(weapon_id: &str, ammo_id: &str, gun: Position3D, target: Position3D) -> Self {
        Self {
            weapon_id: weapon_id.to_string(),
            ammo_id: ammo_id.to_string(),
            gun,
            observer: None,
            target,
            history: Vec::new(),
            last_charge: None,
        }
    }

    pub fn with_observer(mut self, observer: Position3D) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn target(&self) -> Position3D {
        self.target
    }

    /// Target before any correction.
    pub fn original_target(&self) -> Position3D {
        self.history.first().map(|(t, _)| *t).unwrap_or(self.target)
    }

    pub fn last_charge(&self) -> Option<u32> {
        self.last_charge
    }

    pub fn corrections_applied(&self) -> usize {
        self.history.len()
    }

    /// Solve the current target and remember its charge.
    pub fn solve(&mut self, dataset: &Dataset) -> Result<FiringSolution> {
        let input = prepare_input(dataset, self.gun, self.target, &self.weapon_id, &self.ammo_id)?;
        let solution = calculate(dataset, &input)?;
        if solution.in_range {
            self.last_charge = solution.charge;
        }
        Ok(solution)
    }

    /// Apply a correction and move the mission to the corrected target.
    pub fn apply(&mut self, dataset: &Dataset, correction: FireCorrection) -> Result<CorrectionOutcome> {
        let outcome = correct_fire(
            dataset,
            &CorrectionRequest {
                weapon_id: &self.weapon_id,
                ammo_id: &self.ammo_id,
                gun: self.gun,
                target: self.target,
                observer: self.observer,
                correction,
                previous_charge: self.last_charge,
            },
        )?;
        self.history.push((self.target, self.last_charge));
        self.target = outcome.new_target;
        if outcome.solution.in_range {
            self.last_charge = outcome.solution.charge;
        }
        Ok(outcome)
    }

    /// Revert the last correction, restoring the stored target exactly.
    /// Returns the restored target, or `None` when nothing was corrected.
    pub fn undo(&mut self) -> Option<Position3D> {
        let (target, charge) = self.history.pop()?;
        self.target = target;
        self.last_charge = charge;
        Some(target)
    }

    /// Drop all corrections and go back to the original target.
    pub fn reset(&mut self) {
        if let Some((target, charge)) = self.history.first().copied() {
            self.target = target;
            self.last_charge = charge;
        }
        self.history.clear();
    }
}
