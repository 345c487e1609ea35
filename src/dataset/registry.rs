//! Lookup and enumeration over a loaded dataset.

use super::{Ammunition, Dataset, MilSystem, SystemType, WeaponSystem};
use crate::error::{CalcError, Result};
use crate::util::normalize_id;
use std::borrow::Cow;

/// A weapon paired with one of its ammunition types.
#[derive(Debug, Clone)]
pub struct WeaponConfig<'a> {
    pub weapon: &'a WeaponSystem,
    /// Borrowed for ammunition ids; owned when a single MLRS/howitzer
    /// projectile was requested by its own id.
    pub ammunition: Cow<'a, Ammunition>,
}

impl WeaponConfig<'_> {
    pub fn mil_system(&self) -> &MilSystem {
        &self.weapon.mil_system
    }
}

impl Dataset {
    pub fn get_weapon(&self, weapon_id: &str) -> Result<&WeaponSystem> {
        let key = normalize_id(weapon_id);
        self.weapons
            .iter()
            .find(|w| normalize_id(&w.id) == key)
            .ok_or_else(|| CalcError::UnknownWeapon(weapon_id.to_string()))
    }

    /// Resolve a weapon and ammunition pair. `ammo_id` matches an ammunition
    /// type (all its charges/variants) or, for MLRS and howitzers, a single
    /// projectile id.
    pub fn get_weapon_config(&self, weapon_id: &str, ammo_id: &str) -> Result<WeaponConfig<'_>> {
        let weapon = self.get_weapon(weapon_id)?;
        let key = normalize_id(ammo_id);
        if let Some(a) = weapon.ammunition.iter().find(|a| normalize_id(&a.id) == key) {
            return Ok(WeaponConfig {
                weapon,
                ammunition: Cow::Borrowed(a),
            });
        }
        for a in &weapon.ammunition {
            let hit = a.charges.iter().find(|c| {
                c.projectile_id
                    .as_deref()
                    .map(|p| normalize_id(p) == key)
                    .unwrap_or(false)
            });
            if let Some(c) = hit {
                let mut charge = c.clone();
                charge.level = 0;
                return Ok(WeaponConfig {
                    weapon,
                    ammunition: Cow::Owned(Ammunition {
                        id: c.projectile_id.clone().unwrap_or_else(|| a.id.clone()),
                        name: a.name.clone(),
                        charges: vec![charge],
                    }),
                });
            }
        }
        Err(CalcError::UnknownAmmunition {
            weapon_id: weapon.id.clone(),
            ammo_id: ammo_id.to_string(),
        })
    }

    /// All weapon systems, optionally filtered by type, in dataset order.
    pub fn get_all_weapon_systems(&self, filter: Option<SystemType>) -> Vec<&WeaponSystem> {
        self.weapons
            .iter()
            .filter(|w| filter.map(|t| w.system_type == t).unwrap_or(true))
            .collect()
    }

    pub fn get_mil_system_config(&self, weapon_id: &str) -> Result<&MilSystem> {
        Ok(&self.get_weapon(weapon_id)?.mil_system)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::tests::test_dataset;

    #[test]
    fn lookup_is_case_insensitive() {
        let d = test_dataset();
        let cfg = d.get_weapon_config(" m1 ", "he").unwrap();
        assert_eq!(cfg.weapon.id, "M1");
        assert_eq!(cfg.ammunition.charges.len(), 2);
    }

    #[test]
    fn unknown_ids() {
        let d = test_dataset();
        assert_eq!(
            d.get_weapon_config("NOPE", "HE").unwrap_err(),
            CalcError::UnknownWeapon("NOPE".to_string())
        );
        assert!(matches!(
            d.get_weapon_config("M1", "SMOKE"),
            Err(CalcError::UnknownAmmunition { .. })
        ));
    }

    #[test]
    fn single_projectile_by_id() {
        let d = test_dataset();
        let cfg = d.get_weapon_config("R1", "R-LONG").unwrap();
        assert!(matches!(cfg.ammunition, Cow::Owned(_)));
        assert_eq!(cfg.ammunition.charges.len(), 1);
        assert_eq!(cfg.ammunition.charges[0].variant.as_deref(), Some("Long"));
    }

    #[test]
    fn filter_by_system_type() {
        let d = test_dataset();
        assert_eq!(d.get_all_weapon_systems(None).len(), 2);
        let mlrs = d.get_all_weapon_systems(Some(SystemType::Mlrs));
        assert_eq!(mlrs.len(), 1);
        assert_eq!(mlrs[0].id, "R1");
        assert!(d.get_all_weapon_systems(Some(SystemType::Howitzer)).is_empty());
    }

    #[test]
    fn mil_system_per_weapon() {
        let d = test_dataset();
        assert_eq!(d.get_mil_system_config("M1").unwrap().mils_per_circle, 6400.0);
        assert_eq!(d.get_mil_system_config("R1").unwrap().mils_per_circle, 6000.0);
        assert!(d.get_mil_system_config("Z").is_err());
    }
}
