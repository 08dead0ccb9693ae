//! Shared locomotion integrator used by characters and enemies alike.
//!
//! A single tick of motion turns a direction, a speed and the tick duration
//! into a displacement plus a new facing. The facing turns toward the travel
//! direction at `turn_rate` per second, scaled by the tick duration so the
//! result does not depend on how often ticks arrive.

use std::time::Duration;

use glam::{Mat3, Quat, Vec3};

/// Squared length below which a direction counts as "no input".
pub const DIRECTION_EPSILON_SQ: f32 = 1e-10;

/// Result of integrating one tick of motion.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MotionStep {
    /// Position delta produced by the tick.
    pub displacement: Vec3,
    /// Facing after turning toward the travel direction.
    pub orientation: Quat,
}

/// Reports whether a direction should be treated as zero.
#[must_use]
pub fn is_zero_direction(direction: Vec3) -> bool {
    direction.length_squared() < DIRECTION_EPSILON_SQ
}

/// Integrates one tick of motion.
///
/// The direction is used as given; callers decide whether it has to be unit
/// length. A zero direction yields no displacement and leaves the facing
/// untouched.
#[must_use]
pub fn integrate(
    orientation: Quat,
    direction: Vec3,
    speed: f32,
    turn_rate: f32,
    dt: Duration,
) -> MotionStep {
    if is_zero_direction(direction) {
        return MotionStep {
            displacement: Vec3::ZERO,
            orientation,
        };
    }

    let seconds = dt.as_secs_f32();
    let target = look_rotation(direction);
    let blend = (turn_rate * seconds).clamp(0.0, 1.0);

    MotionStep {
        displacement: direction * speed * seconds,
        orientation: orientation.slerp(target, blend).normalize(),
    }
}

/// Rotation whose forward axis (+Z) points along `direction` with +Y kept up.
///
/// Vertical directions fall back to the shortest arc from +Z.
#[must_use]
pub fn look_rotation(direction: Vec3) -> Quat {
    let forward = direction.normalize_or_zero();
    if forward == Vec3::ZERO {
        return Quat::IDENTITY;
    }

    let right = Vec3::Y.cross(forward);
    if right.length_squared() < DIRECTION_EPSILON_SQ {
        return Quat::from_rotation_arc(Vec3::Z, forward);
    }

    let right = right.normalize();
    let up = forward.cross(right);
    Quat::from_mat3(&Mat3::from_cols(right, up, forward)).normalize()
}
