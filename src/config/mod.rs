//! Configuration loading and bounds.

use crate::error::{CalcError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Maximum size in bytes of a ballistic dataset file.
pub const MAX_DATASET_BYTES: usize = 8 * 1024 * 1024;

/// Maximum number of rounds in one FFE request (bounds pattern generation work).
pub const MAX_FFE_ROUNDS: u32 = 64;

/// Number of equal time-steps sampled per trajectory arc.
pub const TRAJECTORY_SAMPLES: usize = 120;

/// Gravity used by the display-only trajectory sampler, m/s^2.
pub const GRAVITY: f64 = 9.81;

/// Height differences below this (meters) get a damped correction.
pub const STEEP_DOWNHILL_THRESHOLD: f64 = -100.0;

/// Damping factor applied to the height correction on steep downhill shots.
pub const STEEP_DOWNHILL_DAMPING: f64 = 0.6;

/// Default dataset location when neither CLI nor config names one.
pub const DEFAULT_DATASET_PATH: &str = "fixtures/ballistics.json";

/// Calculator settings, read from an optional TOML file.
#[derive(Debug, Clone, Deserialize)]
pub struct CalcConfig {
    /// Path to the ballistic dataset JSON.
    #[serde(default = "default_dataset_path")]
    pub dataset: PathBuf,
    /// Render grids at 1m (4-digit) resolution instead of 10m.
    #[serde(default)]
    pub high_precision_grids: bool,
    /// Upper bound on FFE rounds; clamped to `MAX_FFE_ROUNDS`.
    #[serde(default = "default_max_ffe_rounds")]
    pub max_ffe_rounds: u32,
}

fn default_dataset_path() -> PathBuf {
    PathBuf::from(DEFAULT_DATASET_PATH)
}

fn default_max_ffe_rounds() -> u32 {
    MAX_FFE_ROUNDS
}

impl Default for CalcConfig {
    fn default() -> Self {
        Self {
            dataset: default_dataset_path(),
            high_precision_grids: false,
            max_ffe_rounds: MAX_FFE_ROUNDS,
        }
    }
}

impl CalcConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let mut cfg: CalcConfig =
            toml::from_str(s).map_err(|e| CalcError::Format(format!("config: {}", e)))?;
        cfg.max_ffe_rounds = cfg.max_ffe_rounds.clamp(1, MAX_FFE_ROUNDS);
        Ok(cfg)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let s = std::fs::read_to_string(path)?;
        Self::from_toml_str(&s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_uses_defaults() {
        let cfg = CalcConfig::from_toml_str("").unwrap();
        assert_eq!(cfg.dataset, PathBuf::from(DEFAULT_DATASET_PATH));
        assert!(!cfg.high_precision_grids);
        assert_eq!(cfg.max_ffe_rounds, MAX_FFE_ROUNDS);
    }

    #[test]
    fn max_rounds_clamped() {
        let cfg = CalcConfig::from_toml_str("max_ffe_rounds = 10000\nhigh_precision_grids = true")
            .unwrap();
        assert_eq!(cfg.max_ffe_rounds, MAX_FFE_ROUNDS);
        assert!(cfg.high_precision_grids);
    }

    #[test]
    fn bad_toml_is_format_error() {
        assert!(matches!(
            CalcConfig::from_toml_str("max_ffe_rounds = \"many\""),
            Err(CalcError::Format(_))
        ));
    }
}
