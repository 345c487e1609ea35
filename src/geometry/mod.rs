//! Map grid conversion, planar distance and bearing.
//!
//! World axes: `x` grows east, `y` grows north, `z` is altitude. Bearings are
//! measured clockwise from +y, so `atan2` takes `(dx, dy)` rather than the
//! usual `(dy, dx)`.

use crate::error::{CalcError, Result};
use serde::{Deserialize, Serialize};

/// A point in world meters.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position3D {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub z: f64,
}

impl Position3D {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// Planar coordinates decoded from a grid reference.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridMeters {
    pub x: f64,
    pub y: f64,
}

/// Any of the accepted position spellings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum PositionInput {
    Position(Position3D),
    Grid {
        grid: String,
        #[serde(default)]
        z: f64,
    },
    GridString(String),
}

impl From<Position3D> for PositionInput {
    fn from(p: Position3D) -> Self {
        PositionInput::Position(p)
    }
}

impl From<&str> for PositionInput {
    fn from(s: &str) -> Self {
        PositionInput::GridString(s.to_string())
    }
}

/// Decode `"NNN/NNN"` (10m cells) or `"NNNN/NNNN"` (1m cells) into meters.
pub fn parse_grid_to_meters(grid: &str) -> Result<GridMeters> {
    let trimmed = grid.trim();
    let (xs, ys) = trimmed
        .split_once('/')
        .ok_or_else(|| CalcError::Format(format!("grid must be NNN/NNN or NNNN/NNNN: {:?}", grid)))?;
    if xs.len() != ys.len() {
        return Err(CalcError::Format(format!(
            "grid digit groups differ in length: {:?}",
            grid
        )));
    }
    let scale = match xs.len() {
        3 => 10.0,
        4 => 1.0,
        n => {
            return Err(CalcError::Format(format!(
                "grid digit groups must have 3 or 4 digits, got {}: {:?}",
                n, grid
            )))
        }
    };
    let x = parse_digits(xs, grid)?;
    let y = parse_digits(ys, grid)?;
    Ok(GridMeters {
        x: x as f64 * scale,
        y: y as f64 * scale,
    })
}

fn parse_digits(group: &str, grid: &str) -> Result<u32> {
    if !group.chars().all(|c| c.is_ascii_digit()) {
        return Err(CalcError::Format(format!(
            "grid contains non-digit characters: {:?}",
            grid
        )));
    }
    group
        .parse::<u32>()
        .map_err(|e| CalcError::Format(format!("{:?}: {}", grid, e)))
}

/// Encode meters as a grid reference. Truncates (never rounds) to the cell;
/// negative coordinates clamp to zero. A cell that needs more digits than
/// the resolution carries (10 km at 3 digits) is a `Format` error.
pub fn meters_to_grid(x: f64, y: f64, high_precision: bool) -> Result<String> {
    let (cell_size, digits, limit) = if high_precision {
        (1.0, 4, 9_999u64)
    } else {
        (10.0, 3, 999u64)
    };
    let cell = |v: f64| -> Result<u64> {
        let c = (v.max(0.0) / cell_size).floor();
        if !c.is_finite() || c > limit as f64 {
            return Err(CalcError::Format(format!(
                "{}m does not fit a {}-digit grid",
                v, digits
            )));
        }
        Ok(c as u64)
    };
    let (cx, cy) = (cell(x)?, cell(y)?);
    Ok(format!("{:0w$}/{:0w$}", cx, cy, w = digits))
}

/// Normalize any accepted position spelling to a `Position3D`.
pub fn parse_position(input: &PositionInput) -> Result<Position3D> {
    let pos = match input {
        PositionInput::Position(p) => *p,
        PositionInput::Grid { grid, z } => {
            let m = parse_grid_to_meters(grid)?;
            Position3D::new(m.x, m.y, *z)
        }
        PositionInput::GridString(grid) => {
            let m = parse_grid_to_meters(grid)?;
            Position3D::new(m.x, m.y, 0.0)
        }
    };
    if !pos.is_finite() {
        return Err(CalcError::Format("position has non-finite coordinates".to_string()));
    }
    Ok(pos)
}

/// Bearing in degrees `[0, 360)` from `from` to `to`.
pub fn calculate_bearing(from: &Position3D, to: &Position3D) -> f64 {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    normalize_degrees(dx.atan2(dy).to_degrees())
}

/// Planar distance, ignoring altitude.
pub fn calculate_horizontal_distance(from: &Position3D, to: &Position3D) -> f64 {
    (to.x - from.x).hypot(to.y - from.y)
}

pub fn normalize_degrees(deg: f64) -> f64 {
    let d = deg.rem_euclid(360.0);
    // rem_euclid can return 360.0 for tiny negative inputs
    if d >= 360.0 {
        0.0
    } else {
        d
    }
}

/// Move `origin` by `forward` meters along `bearing_deg` and `right` meters
/// perpendicular to it (clockwise side). Altitude is kept.
pub fn offset_position(origin: &Position3D, bearing_deg: f64, forward: f64, right: f64) -> Position3D {
    let b = bearing_deg.to_radians();
    let (sin, cos) = b.sin_cos();
    Position3D {
        x: origin.x + forward * sin + right * cos,
        y: origin.y + forward * cos - right * sin,
        z: origin.z,
    }
}
