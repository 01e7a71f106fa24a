//! Current loadout shared between the UI thread and the playback task.
//!
//! Every field is an atomic so readers never block; the playback task takes
//! one `snapshot()` per step.

use crate::error::RecoilError;
use crate::multiplier::{Barrel, Multipliers, Scope};
use crate::movement::MovementParams;
use crate::util::AtomicF32;
use crate::weapons::WeaponStore;
use recoil_config::{FOV_MAX, FOV_MIN, SMOOTHING_MAX, SMOOTHING_MIN};
use std::sync::atomic::{AtomicBool, AtomicU8, AtomicUsize, Ordering};

/// Plain copy of the loadout at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoadoutSnapshot {
    /// Index into the engine's `WeaponStore`.
    pub weapon: usize,
    pub scope: Scope,
    pub barrel: Barrel,
    pub sensitivity: f32,
    pub fov: u8,
    pub smoothing: bool,
    pub smoothing_factor: u8,
}

impl Default for LoadoutSnapshot {
    fn default() -> Self {
        Self {
            weapon: 0,
            scope: Scope::None,
            barrel: Barrel::None,
            sensitivity: 1.0,
            fov: 90,
            smoothing: true,
            smoothing_factor: 1,
        }
    }
}

impl LoadoutSnapshot {
    /// Movement inputs for `weapon_id` under this loadout.
    pub fn movement_params(&self, weapon_id: &str) -> MovementParams {
        MovementParams {
            multipliers: Multipliers::resolve(weapon_id, self.scope, self.barrel),
            sensitivity: f64::from(self.sensitivity),
            fov: f64::from(self.fov),
        }
    }
}

#[derive(Debug)]
pub struct Loadout {
    weapon: AtomicUsize,
    scope: AtomicU8,
    barrel: AtomicU8,
    sensitivity: AtomicF32,
    fov: AtomicU8,
    smoothing: AtomicBool,
    smoothing_factor: AtomicU8,
}

impl Default for Loadout {
    fn default() -> Self {
        Self::from_snapshot(LoadoutSnapshot::default())
    }
}

impl Loadout {
    /// Seed from a snapshot. Values are clamped the same way the setters do;
    /// a non-positive sensitivity is kept as-is and later produces zero movement.
    pub fn from_snapshot(s: LoadoutSnapshot) -> Self {
        Self {
            weapon: AtomicUsize::new(s.weapon),
            scope: AtomicU8::new(s.scope.index()),
            barrel: AtomicU8::new(s.barrel.index()),
            sensitivity: AtomicF32::new(s.sensitivity),
            fov: AtomicU8::new(s.fov.clamp(FOV_MIN, FOV_MAX)),
            smoothing: AtomicBool::new(s.smoothing),
            smoothing_factor: AtomicU8::new(s.smoothing_factor.clamp(SMOOTHING_MIN, SMOOTHING_MAX)),
        }
    }

    pub fn snapshot(&self) -> LoadoutSnapshot {
        LoadoutSnapshot {
            weapon: self.weapon.load(Ordering::Acquire),
            // Setters only ever store valid indices.
            scope: Scope::try_from(self.scope.load(Ordering::Relaxed)).unwrap_or_default(),
            barrel: Barrel::try_from(self.barrel.load(Ordering::Relaxed)).unwrap_or_default(),
            sensitivity: self.sensitivity.load(Ordering::Relaxed),
            fov: self.fov.load(Ordering::Relaxed),
            smoothing: self.smoothing.load(Ordering::Relaxed),
            smoothing_factor: self.smoothing_factor.load(Ordering::Relaxed),
        }
    }

    pub fn weapon_index(&self) -> usize {
        self.weapon.load(Ordering::Acquire)
    }

    pub fn select_weapon(&self, store: &WeaponStore, id: &str) -> Result<(), RecoilError> {
        let idx = store
            .index_of(id)
            .ok_or_else(|| RecoilError::UnknownWeapon(id.to_string()))?;
        self.weapon.store(idx, Ordering::Release);
        Ok(())
    }

    pub fn set_scope(&self, scope: Scope) {
        self.scope.store(scope.index(), Ordering::Relaxed);
    }

    pub fn set_barrel(&self, barrel: Barrel) {
        self.barrel.store(barrel.index(), Ordering::Relaxed);
    }

    pub fn set_sensitivity(&self, sensitivity: f32) -> Result<(), RecoilError> {
        if !(sensitivity.is_finite() && sensitivity > 0.0) {
            return Err(RecoilError::Config(format!(
                "sensitivity must be > 0, got {sensitivity}"
            )));
        }
        self.sensitivity.store(sensitivity, Ordering::Relaxed);
        Ok(())
    }

    /// Store the field of view, clamped to 65..=120. Returns the stored value.
    pub fn set_fov(&self, fov: u8) -> u8 {
        let fov = fov.clamp(FOV_MIN, FOV_MAX);
        self.fov.store(fov, Ordering::Relaxed);
        fov
    }

    pub fn set_smoothing(&self, enabled: bool) {
        self.smoothing.store(enabled, Ordering::Relaxed);
    }

    /// Store the smoothing factor, clamped to 1..=10. Returns the stored value.
    pub fn set_smoothing_factor(&self, factor: u8) -> u8 {
        let factor = factor.clamp(SMOOTHING_MIN, SMOOTHING_MAX);
        self.smoothing_factor.store(factor, Ordering::Relaxed);
        factor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setters_clamp_and_validate() {
        let l = Loadout::default();
        assert_eq!(l.set_fov(30), 65);
        assert_eq!(l.set_fov(200), 120);
        assert_eq!(l.set_smoothing_factor(0), 1);
        assert_eq!(l.set_smoothing_factor(42), 10);
        assert!(l.set_sensitivity(0.0).is_err());
        assert!(l.set_sensitivity(f32::NAN).is_err());
        l.set_sensitivity(0.5).unwrap();
        let s = l.snapshot();
        assert_eq!(s.fov, 120);
        assert_eq!(s.smoothing_factor, 10);
        assert_eq!(s.sensitivity, 0.5);
    }

    #[test]
    fn weapon_selection_goes_through_store() {
        let store = WeaponStore::builtin();
        let l = Loadout::default();
        l.select_weapon(&store, "SKS").unwrap();
        assert_eq!(store.get_index(l.weapon_index()).unwrap().id, "SKS");
        assert_eq!(
            l.select_weapon(&store, "BOW"),
            Err(RecoilError::UnknownWeapon("BOW".into()))
        );
        assert_eq!(store.get_index(l.weapon_index()).unwrap().id, "SKS");
    }

    #[test]
    fn attachments_flow_into_movement_params() {
        let l = Loadout::default();
        l.set_scope(Scope::EightX);
        l.set_barrel(Barrel::Silencer);
        let p = l.snapshot().movement_params("AK47");
        assert_eq!(p.multipliers.scope, 1.46);
        assert_eq!(p.multipliers.barrel, 0.8);
        assert_eq!(p.fov, 90.0);
    }
}
