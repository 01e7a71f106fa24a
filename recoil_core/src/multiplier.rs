//! Scope and barrel multipliers.
//!
//! Resolution order is fixed: per-attachment base value, then the weapon
//! adjustment, then the attachment cross-term overrides. The overrides are a
//! documented special-case table, not a formula:
//!
//! | condition                                   | result            |
//! |---------------------------------------------|-------------------|
//! | weapon in `EXTRA_SCOPE_WEAPONS`             | scope += extra    |
//! | weapon == `SILENCER_TUNED_WEAPON` + silencer | barrel = 0.85     |
//! | 8x scope + silencer                         | scope = 1.46      |
//! | silencer + handmade or holographic          | barrel = 0.75     |
//!
//! Later rows win over earlier ones.

use crate::error::RecoilError;

/// Weapons whose scope multiplier gets the per-scope additive term.
pub const EXTRA_SCOPE_WEAPONS: [&str; 2] = ["SMG", "THOMPSON"];
/// Weapon whose silencer multiplier is tuned separately.
pub const SILENCER_TUNED_WEAPON: &str = "SMG";
pub const SILENCER_TUNED_MULT: f64 = 0.85;
pub const EIGHT_X_SILENCER_SCOPE_MULT: f64 = 1.46;
pub const MID_SCOPE_SILENCER_BARREL_MULT: f64 = 0.75;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Scope {
    #[default]
    None,
    Handmade,
    Holographic,
    EightX,
}

impl Scope {
    pub const ALL: [Scope; 4] = [Scope::None, Scope::Handmade, Scope::Holographic, Scope::EightX];

    pub fn name(self) -> &'static str {
        match self {
            Scope::None => "None",
            Scope::Handmade => "Handmade",
            Scope::Holographic => "Holographic",
            Scope::EightX => "8x Scope",
        }
    }

    /// Base multiplier for this scope.
    pub fn base(self) -> f64 {
        match self {
            Scope::None => 1.0,
            Scope::Handmade => 0.8,
            Scope::Holographic => 1.2,
            Scope::EightX => 4.76,
        }
    }

    /// Additive term applied for `EXTRA_SCOPE_WEAPONS`.
    pub fn extra(self) -> f64 {
        match self {
            Scope::None => 0.0,
            Scope::Handmade => 0.1,
            Scope::Holographic => 0.3,
            Scope::EightX => 0.75,
        }
    }

    pub fn index(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for Scope {
    type Error = RecoilError;

    fn try_from(i: u8) -> Result<Self, Self::Error> {
        Scope::ALL
            .get(usize::from(i))
            .copied()
            .ok_or_else(|| RecoilError::Config(format!("scope index {i} out of range [0, 3]")))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Barrel {
    #[default]
    None,
    Silencer,
}

impl Barrel {
    pub const ALL: [Barrel; 2] = [Barrel::None, Barrel::Silencer];

    pub fn name(self) -> &'static str {
        match self {
            Barrel::None => "None",
            Barrel::Silencer => "Silencer",
        }
    }

    pub fn base(self) -> f64 {
        match self {
            Barrel::None => 1.0,
            Barrel::Silencer => 0.8,
        }
    }

    pub fn index(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for Barrel {
    type Error = RecoilError;

    fn try_from(i: u8) -> Result<Self, Self::Error> {
        Barrel::ALL
            .get(usize::from(i))
            .copied()
            .ok_or_else(|| RecoilError::Config(format!("barrel index {i} out of range [0, 1]")))
    }
}

pub fn scope_multiplier(weapon_id: &str, scope: Scope, barrel: Barrel) -> f64 {
    let mut mult = scope.base();
    if EXTRA_SCOPE_WEAPONS.contains(&weapon_id) {
        mult += scope.extra();
    }
    if scope == Scope::EightX && barrel == Barrel::Silencer {
        return EIGHT_X_SILENCER_SCOPE_MULT;
    }
    mult
}

pub fn barrel_multiplier(weapon_id: &str, scope: Scope, barrel: Barrel) -> f64 {
    let mut mult = barrel.base();
    if weapon_id == SILENCER_TUNED_WEAPON && barrel == Barrel::Silencer {
        mult = SILENCER_TUNED_MULT;
    }
    if barrel == Barrel::Silencer && matches!(scope, Scope::Handmade | Scope::Holographic) {
        return MID_SCOPE_SILENCER_BARREL_MULT;
    }
    mult
}

/// Both multipliers for one loadout, resolved together.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Multipliers {
    pub scope: f64,
    pub barrel: f64,
}

impl Multipliers {
    pub fn resolve(weapon_id: &str, scope: Scope, barrel: Barrel) -> Self {
        Self {
            scope: scope_multiplier(weapon_id, scope, barrel),
            barrel: barrel_multiplier(weapon_id, scope, barrel),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const EPS: f64 = 1e-12;

    #[rstest]
    #[case("AK47", Scope::None, Barrel::None, 1.0, 1.0)]
    #[case("AK47", Scope::Holographic, Barrel::None, 1.2, 1.0)]
    #[case("SMG", Scope::Holographic, Barrel::None, 1.5, 1.0)]
    #[case("THOMPSON", Scope::EightX, Barrel::None, 5.51, 1.0)]
    #[case("MP5", Scope::EightX, Barrel::None, 4.76, 1.0)]
    #[case("SMG", Scope::None, Barrel::Silencer, 1.0, 0.85)]
    #[case("AK47", Scope::None, Barrel::Silencer, 1.0, 0.8)]
    // cross-terms beat the weapon adjustments
    #[case("SMG", Scope::EightX, Barrel::Silencer, 1.46, 0.85)]
    #[case("AK47", Scope::EightX, Barrel::Silencer, 1.46, 0.8)]
    #[case("SMG", Scope::Handmade, Barrel::Silencer, 0.9, 0.75)]
    #[case("LR300", Scope::Holographic, Barrel::Silencer, 1.2, 0.75)]
    fn special_case_table(
        #[case] weapon: &str,
        #[case] scope: Scope,
        #[case] barrel: Barrel,
        #[case] want_scope: f64,
        #[case] want_barrel: f64,
    ) {
        let m = Multipliers::resolve(weapon, scope, barrel);
        assert!((m.scope - want_scope).abs() < EPS, "scope {} != {want_scope}", m.scope);
        assert!((m.barrel - want_barrel).abs() < EPS, "barrel {} != {want_barrel}", m.barrel);
    }

    #[test]
    fn indices_round_trip_and_reject_out_of_range() {
        for s in Scope::ALL {
            assert_eq!(Scope::try_from(s.index()).unwrap(), s);
        }
        assert!(Scope::try_from(4).is_err());
        assert_eq!(Barrel::try_from(1).unwrap(), Barrel::Silencer);
        assert!(Barrel::try_from(2).is_err());
    }
}
