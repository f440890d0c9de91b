//! Kinematics - straight-line motion and lifetime accounting.

use crate::components::Projectile;
use crate::types::DespawnReason;

/// Advance an armed projectile by one tick.
///
/// Moves it `speed * dt` along its direction, then ages it. Reaching the
/// profile lifetime marks it `Despawning` within the same tick; the caller
/// must skip any contacts for it afterwards.
///
/// Negative `dt` is treated as zero so age never decreases.
///
/// # Returns
/// True if the projectile expired during this tick
pub fn advance(projectile: &mut Projectile, dt: f32) -> bool {
    if !projectile.is_armed() {
        return false;
    }
    let Some((speed, lifetime)) = projectile.profile().map(|p| (p.speed, p.lifetime)) else {
        return false;
    };

    let dt = dt.max(0.0);
    projectile.position += projectile.direction * speed * dt;
    projectile.age += dt;

    if projectile.age >= lifetime {
        projectile.despawn(DespawnReason::Expired);
        return true;
    }
    false
}
