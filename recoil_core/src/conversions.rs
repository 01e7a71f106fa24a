//! Bridges from `recoil_config` file types to engine types.

use std::time::Duration;

use crate::config::{MonitorCfg, PlaybackCfg};
use crate::error::RecoilError;
use crate::loadout::LoadoutSnapshot;
use crate::multiplier::{Barrel, Scope};
use crate::weapons::WeaponStore;

// ── MonitorCfg ───────────────────────────────────────────────────────────────

impl From<&recoil_config::Monitor> for MonitorCfg {
    fn from(c: &recoil_config::Monitor) -> Self {
        Self {
            check_interval: Duration::from_millis(c.check_interval_ms),
            keepalive_interval: Duration::from_millis(c.keepalive_interval_ms),
        }
    }
}

// ── PlaybackCfg ──────────────────────────────────────────────────────────────

impl From<&recoil_config::Playback> for PlaybackCfg {
    fn from(c: &recoil_config::Playback) -> Self {
        Self {
            smoothing_threshold: c.smoothing_threshold,
        }
    }
}

// ── LoadoutSnapshot ──────────────────────────────────────────────────────────

impl LoadoutSnapshot {
    /// Resolve a configured loadout against `store`. The weapon id must exist.
    pub fn from_config(
        c: &recoil_config::Loadout,
        store: &WeaponStore,
    ) -> Result<Self, RecoilError> {
        let weapon = store
            .index_of(&c.weapon)
            .ok_or_else(|| RecoilError::UnknownWeapon(c.weapon.clone()))?;
        Ok(Self {
            weapon,
            scope: Scope::try_from(c.scope)?,
            barrel: Barrel::try_from(c.barrel)?,
            sensitivity: c.sensitivity,
            fov: c.fov,
            smoothing: c.smoothing,
            smoothing_factor: c.smoothing_factor,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_map_to_engine_defaults() {
        let cfg = recoil_config::Config::default();
        assert_eq!(MonitorCfg::from(&cfg.monitor), MonitorCfg::default());
        assert_eq!(PlaybackCfg::from(&cfg.playback), PlaybackCfg::default());
        let store = WeaponStore::builtin();
        let snap = LoadoutSnapshot::from_config(&cfg.loadout, &store).unwrap();
        assert_eq!(snap, LoadoutSnapshot::default());
    }

    #[test]
    fn loadout_resolves_weapon_and_attachments() {
        let store = WeaponStore::builtin();
        let c = recoil_config::Loadout {
            weapon: "THOMPSON".into(),
            scope: 2,
            barrel: 1,
            ..Default::default()
        };
        let snap = LoadoutSnapshot::from_config(&c, &store).unwrap();
        assert_eq!(store.get_index(snap.weapon).unwrap().id, "THOMPSON");
        assert_eq!(snap.scope, Scope::Holographic);
        assert_eq!(snap.barrel, Barrel::Silencer);
    }

    #[test]
    fn unknown_weapon_is_rejected() {
        let store = WeaponStore::builtin();
        let c = recoil_config::Loadout {
            weapon: "CROSSBOW".into(),
            ..Default::default()
        };
        assert_eq!(
            LoadoutSnapshot::from_config(&c, &store),
            Err(RecoilError::UnknownWeapon("CROSSBOW".into()))
        );
    }
}
