//! Pattern offset → device displacement.
//!
//! `displacement = (c * scope * barrel) / (-0.03 * sens * 3.0 * (fov / 100))`
//! where `sens` doubles while crouching. The negative constant flips the
//! pattern's sign convention into on-screen mouse direction.

use crate::multiplier::Multipliers;

const CAMERA_COEFF: f64 = -0.03;
const SENS_SCALE: f64 = 3.0;
const CROUCH_SENS_FACTOR: f64 = 2.0;

/// Inputs for one movement computation, sampled once per playback step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovementParams {
    pub multipliers: Multipliers,
    pub sensitivity: f64,
    pub fov: f64,
}

/// Raw (unrounded) displacement for one axis.
///
/// A non-positive or non-finite sensitivity or fov is a contract violation
/// of the loadout; it yields 0.0 instead of dividing by zero.
pub fn calculate_movement(coordinate: f64, crouching: bool, params: &MovementParams) -> f64 {
    let MovementParams {
        multipliers,
        sensitivity,
        fov,
    } = *params;
    if !(sensitivity.is_finite() && sensitivity > 0.0 && fov.is_finite() && fov > 0.0) {
        return 0.0;
    }
    let sens = if crouching {
        sensitivity * CROUCH_SENS_FACTOR
    } else {
        sensitivity
    };
    let out = (coordinate * multipliers.scope * multipliers.barrel)
        / (CAMERA_COEFF * sens * SENS_SCALE * (fov / 100.0));
    if out.is_finite() { out } else { 0.0 }
}

/// Convert a raw displacement to device units: truncation toward zero,
/// saturating at the `i32` range.
#[inline]
pub fn to_device_units(raw: f64) -> i32 {
    // `as` saturates and maps NaN to 0.
    raw as i32
}

/// Device-space `(dx, dy)` for one pattern offset.
pub fn step_displacement(dx: f64, dy: f64, crouching: bool, params: &MovementParams) -> (i32, i32) {
    (
        to_device_units(calculate_movement(dx, crouching, params)),
        to_device_units(calculate_movement(dy, crouching, params)),
    )
}
