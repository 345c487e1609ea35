//! Crate-wide error type.

/// Errors surfaced by the calculator. Out-of-range targets are not errors;
/// they come back as a `FiringSolution` with `in_range == false`.
#[derive(Debug, Clone, PartialEq)]
pub enum CalcError {
    /// Malformed grid string or position input.
    Format(String),
    /// A dataset query was made before any successful load.
    NotLoaded,
    UnknownWeapon(String),
    UnknownAmmunition { weapon_id: String, ammo_id: String },
    /// Dataset JSON could not be parsed or failed validation.
    Dataset(String),
    Io(String),
    /// FFE pattern parameters outside accepted bounds.
    InvalidPattern(String),
    /// FFE centre target is unreachable, so no common charge exists.
    FfeCenterOutOfRange {
        distance: f64,
        min_range: f64,
        max_range: f64,
    },
}

impl std::fmt::Display for CalcError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CalcError::Format(msg) => write!(f, "format error: {}", msg),
            CalcError::NotLoaded => write!(f, "ballistic data not loaded"),
            CalcError::UnknownWeapon(id) => write!(f, "unknown weapon: {}", id),
            CalcError::UnknownAmmunition { weapon_id, ammo_id } => {
                write!(f, "unknown ammunition {} for weapon {}", ammo_id, weapon_id)
            }
            CalcError::Dataset(msg) => write!(f, "invalid ballistic data: {}", msg),
            CalcError::Io(msg) => write!(f, "i/o error: {}", msg),
            CalcError::InvalidPattern(msg) => write!(f, "invalid FFE pattern: {}", msg),
            CalcError::FfeCenterOutOfRange {
                distance,
                min_range,
                max_range,
            } => write!(
                f,
                "FFE centre target at {:.0}m is out of range ({:.0}-{:.0}m)",
                distance, min_range, max_range
            ),
        }
    }
}

impl std::error::Error for CalcError {}

impl From<std::io::Error> for CalcError {
    fn from(e: std::io::Error) -> Self {
        CalcError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for CalcError {
    fn from(e: serde_json::Error) -> Self {
        CalcError::Dataset(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CalcError>;
