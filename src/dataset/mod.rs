//! Weapon and ammunition data: schema, loading, validation and publication.

mod registry;
mod schema;

pub use registry::WeaponConfig;
use crate::config::MAX_DATASET_BYTES;
use crate::error::{CalcError, Result};
use schema::{normalize_weapon, RawWeaponSystem};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SystemType {
    Mortar,
    Mlrs,
    Howitzer,
}

impl std::fmt::Display for SystemType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SystemType::Mortar => "mortar",
            SystemType::Mlrs => "mlrs",
            SystemType::Howitzer => "howitzer",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for SystemType {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self> {
        match crate::util::normalize_id(s).as_str() {
            "mortar" => Ok(SystemType::Mortar),
            "mlrs" => Ok(SystemType::Mlrs),
            "howitzer" => Ok(SystemType::Howitzer),
            other => Err(CalcError::Format(format!("unknown system type: {}", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MilSystem {
    pub name: String,
    pub mils_per_circle: f64,
    pub mils_per_degree: f64,
}

/// One sample of a range table. `d_elev` is mils of elevation change per
/// 100m of height difference.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeTableEntry {
    pub range: f64,
    pub elevation: f64,
    pub tof: f64,
    pub d_elev: f64,
}

/// A mortar charge or an MLRS/howitzer variant.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Charge {
    pub level: u32,
    /// Variant label (MLRS/howitzer only).
    pub variant: Option<String>,
    /// Source projectile id (MLRS/howitzer only).
    pub projectile_id: Option<String>,
    pub min_range: f64,
    pub max_range: f64,
    pub range_table: Vec<RangeTableEntry>,
}

impl Charge {
    pub fn contains(&self, distance: f64) -> bool {
        distance >= self.min_range && distance <= self.max_range
    }

    /// Human-readable name: variant label or "Charge N".
    pub fn label(&self) -> String {
        match &self.variant {
            Some(v) => v.clone(),
            None => format!("Charge {}", self.level),
        }
    }
}

/// Ammunition with its charges sorted ascending by level.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ammunition {
    pub id: String,
    pub name: String,
    pub charges: Vec<Charge>,
}

impl Ammunition {
    /// Union of all charge envelopes.
    pub fn range_envelope(&self) -> (f64, f64) {
        let min = self
            .charges
            .iter()
            .map(|c| c.min_range)
            .fold(f64::INFINITY, f64::min);
        let max = self
            .charges
            .iter()
            .map(|c| c.max_range)
            .fold(f64::NEG_INFINITY, f64::max);
        (min, max)
    }

    pub fn charge(&self, level: u32) -> Option<&Charge> {
        self.charges.iter().find(|c| c.level == level)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeaponSystem {
    pub id: String,
    pub name: String,
    pub system_type: SystemType,
    pub mil_system: MilSystem,
    pub ammunition: Vec<Ammunition>,
}

/// The loaded, validated set of weapon systems. Immutable after load.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dataset {
    weapons: Vec<WeaponSystem>,
}

impl Dataset {
    pub fn from_json_str(s: &str) -> Result<Self> {
        if s.len() > MAX_DATASET_BYTES {
            return Err(CalcError::Dataset(format!(
                "dataset exceeds {} bytes",
                MAX_DATASET_BYTES
            )));
        }
        let raw: Vec<RawWeaponSystem> = serde_json::from_str(s)?;
        let mut seen = HashSet::new();
        let mut weapons = Vec::with_capacity(raw.len());
        for w in raw {
            if !seen.insert(crate::util::normalize_id(&w.id)) {
                return Err(CalcError::Dataset(format!("duplicate weapon id {}", w.id)));
            }
            weapons.push(normalize_weapon(w)?);
        }
        Ok(Dataset { weapons })
    }

    pub fn weapons(&self) -> &[WeaponSystem] {
        &self.weapons
    }
}

/// Where to read a dataset from.
#[derive(Debug, Clone)]
pub enum DataSource {
    Path(PathBuf),
    Json(String),
}

/// Read and validate a dataset.
pub fn load_ballistic_data(source: &DataSource) -> Result<Dataset> {
    match source {
        DataSource::Path(path) => {
            let meta = std::fs::metadata(path)?;
            if meta.len() > MAX_DATASET_BYTES as u64 {
                return Err(CalcError::Dataset(format!(
                    "file too large: {} bytes (max {})",
                    meta.len(),
                    MAX_DATASET_BYTES
                )));
            }
            let s = std::fs::read_to_string(path)?;
            Dataset::from_json_str(&s)
        }
        DataSource::Json(s) => Dataset::from_json_str(s),
    }
}

/// Async variant; file reads go through tokio.
#[cfg(feature = "async")]
pub async fn load_ballistic_data_async(source: &DataSource) -> Result<Dataset> {
    match source {
        DataSource::Path(path) => {
            let meta = tokio::fs::metadata(path).await?;
            if meta.len() > MAX_DATASET_BYTES as u64 {
                return Err(CalcError::Dataset(format!(
                    "file too large: {} bytes (max {})",
                    meta.len(),
                    MAX_DATASET_BYTES
                )));
            }
            let s = tokio::fs::read_to_string(path).await?;
            Dataset::from_json_str(&s)
        }
        DataSource::Json(s) => Dataset::from_json_str(s),
    }
}

/// Holder for the currently published dataset. Loads replace the whole
/// dataset at once; readers keep their `Arc` for as long as they need it.
#[derive(Debug, Default)]
pub struct DataStore {
    current: RwLock<Option<Arc<Dataset>>>,
}

impl DataStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load and publish. On failure the previously published dataset stays.
    pub fn load_ballistic_data(&self, source: &DataSource) -> Result<Arc<Dataset>> {
        let dataset = load_ballistic_data(source)?;
        Ok(self.publish(dataset))
    }

    #[cfg(feature = "async")]
    pub async fn load_ballistic_data_async(&self, source: &DataSource) -> Result<Arc<Dataset>> {
        let dataset = load_ballistic_data_async(source).await?;
        Ok(self.publish(dataset))
    }

    pub fn publish(&self, dataset: Dataset) -> Arc<Dataset> {
        let dataset = Arc::new(dataset);
        tracing::info!("published ballistic data: {} weapon system(s)", dataset.weapons.len());
        let mut guard = self.current.write().unwrap_or_else(|e| e.into_inner());
        *guard = Some(Arc::clone(&dataset));
        dataset
    }

    pub fn current(&self) -> Result<Arc<Dataset>> {
        let guard = self.current.read().unwrap_or_else(|e| e.into_inner());
        guard.as_ref().map(Arc::clone).ok_or(CalcError::NotLoaded)
    }

    pub fn is_loaded(&self) -> bool {
        self.current().is_ok()
    }
}
