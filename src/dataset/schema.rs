//! On-disk JSON schema and its normalization into the in-memory model.
//! Mortars list `shellTypes` with numbered charges; MLRS and howitzers list
//! `projectileTypes`, one per variant, which are grouped by their `type`.

use super::{Ammunition, Charge, MilSystem, RangeTableEntry, SystemType, WeaponSystem};
use crate::error::{CalcError, Result};
use serde::Deserialize;
use std::collections::HashSet;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct RawWeaponSystem {
    pub id: String,
    pub name: String,
    pub system_type: SystemType,
    pub mil_system: Option<RawMilSystem>,
    #[serde(default)]
    pub shell_types: Vec<RawShellType>,
    #[serde(default)]
    pub projectile_types: Vec<RawProjectileType>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct RawMilSystem {
    pub name: String,
    pub mils_per_circle: f64,
    pub mils_per_degree: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct RawShellType {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub charges: Vec<RawCharge>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct RawCharge {
    pub level: u32,
    pub min_range: f64,
    pub max_range: f64,
    pub range_table: Vec<RangeTableEntry>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct RawProjectileType {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub variant: String,
    pub min_range: f64,
    pub max_range: f64,
    pub range_table: Vec<RangeTableEntry>,
}

/// Validate one raw weapon and convert it to the normalized model.
pub(super) fn normalize_weapon(raw: RawWeaponSystem) -> Result<WeaponSystem> {
    let ctx = raw.id.clone();
    let mil_system = match raw.mil_system {
        Some(m) => normalize_mil_system(&ctx, m)?,
        None => {
            return Err(CalcError::Dataset(format!(
                "weapon {}: milSystem is required",
                ctx
            )))
        }
    };
    let ammunition = match raw.system_type {
        SystemType::Mortar => {
            if raw.shell_types.is_empty() {
                return Err(CalcError::Dataset(format!(
                    "mortar {}: shellTypes must not be empty",
                    ctx
                )));
            }
            raw.shell_types
                .into_iter()
                .map(|s| normalize_shell(&ctx, s))
                .collect::<Result<Vec<_>>>()?
        }
        SystemType::Mlrs | SystemType::Howitzer => {
            if raw.projectile_types.is_empty() {
                return Err(CalcError::Dataset(format!(
                    "{} {}: projectileTypes must not be empty",
                    raw.system_type, ctx
                )));
            }
            group_projectiles(&ctx, raw.projectile_types)?
        }
    };
    let mut seen = HashSet::new();
    for a in &ammunition {
        if !seen.insert(crate::util::normalize_id(&a.id)) {
            return Err(CalcError::Dataset(format!(
                "weapon {}: duplicate ammunition {}",
                ctx, a.id
            )));
        }
    }
    Ok(WeaponSystem {
        id: raw.id,
        name: raw.name,
        system_type: raw.system_type,
        mil_system,
        ammunition,
    })
}

fn normalize_mil_system(ctx: &str, m: RawMilSystem) -> Result<MilSystem> {
    if !(m.mils_per_circle.is_finite() && m.mils_per_circle > 0.0) {
        return Err(CalcError::Dataset(format!(
            "weapon {}: milsPerCircle must be positive",
            ctx
        )));
    }
    let mils_per_degree = match m.mils_per_degree {
        Some(d) if d.is_finite() && d > 0.0 => d,
        Some(_) => {
            return Err(CalcError::Dataset(format!(
                "weapon {}: milsPerDegree must be positive",
                ctx
            )))
        }
        None => m.mils_per_circle / 360.0,
    };
    Ok(MilSystem {
        name: m.name,
        mils_per_circle: m.mils_per_circle,
        mils_per_degree,
    })
}

fn normalize_shell(ctx: &str, shell: RawShellType) -> Result<Ammunition> {
    let ctx = format!("{}/{}", ctx, shell.kind);
    if shell.charges.is_empty() {
        return Err(CalcError::Dataset(format!("{}: no charges", ctx)));
    }
    let mut charges = shell
        .charges
        .into_iter()
        .map(|c| {
            let label = format!("{} charge {}", ctx, c.level);
            check_envelope(&label, c.min_range, c.max_range, &c.range_table)?;
            Ok(Charge {
                level: c.level,
                variant: None,
                projectile_id: None,
                min_range: c.min_range,
                max_range: c.max_range,
                range_table: c.range_table,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    charges.sort_by_key(|c| c.level);
    if charges.windows(2).any(|w| w[0].level == w[1].level) {
        return Err(CalcError::Dataset(format!("{}: duplicate charge level", ctx)));
    }
    Ok(Ammunition {
        id: shell.kind,
        name: shell.name,
        charges,
    })
}

/// Group projectile types sharing a `type` into one ammunition whose charges
/// are the variants in dataset order.
fn group_projectiles(ctx: &str, projectiles: Vec<RawProjectileType>) -> Result<Vec<Ammunition>> {
    let mut out: Vec<Ammunition> = Vec::new();
    for p in projectiles {
        let label = format!("{}/{}", ctx, p.id);
        check_envelope(&label, p.min_range, p.max_range, &p.range_table)?;
        let key = crate::util::normalize_id(&p.kind);
        let idx = match out
            .iter()
            .position(|a| crate::util::normalize_id(&a.id) == key)
        {
            Some(i) => i,
            None => {
                out.push(Ammunition {
                    id: p.kind.clone(),
                    name: p.name.clone(),
                    charges: Vec::new(),
                });
                out.len() - 1
            }
        };
        let group = &mut out[idx];
        let level = group.charges.len() as u32;
        group.charges.push(Charge {
            level,
            variant: Some(p.variant),
            projectile_id: Some(p.id),
            min_range: p.min_range,
            max_range: p.max_range,
            range_table: p.range_table,
        });
    }
    Ok(out)
}

fn check_envelope(label: &str, min_range: f64, max_range: f64, table: &[RangeTableEntry]) -> Result<()> {
    if !(min_range.is_finite() && max_range.is_finite()) || min_range > max_range {
        return Err(CalcError::Dataset(format!(
            "{}: invalid range envelope {}-{}",
            label, min_range, max_range
        )));
    }
    if table.is_empty() {
        return Err(CalcError::Dataset(format!("{}: empty range table", label)));
    }
    if table
        .iter()
        .any(|e| !(e.range.is_finite() && e.elevation.is_finite() && e.tof.is_finite() && e.d_elev.is_finite()))
    {
        return Err(CalcError::Dataset(format!(
            "{}: range table has non-finite values",
            label
        )));
    }
    if table.windows(2).any(|w| w[0].range >= w[1].range) {
        return Err(CalcError::Dataset(format!(
            "{}: range table must be strictly ascending by range",
            label
        )));
    }
    Ok(())
}
