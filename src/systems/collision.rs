//! Collision resolution - contact classification, reflection and the
//! projectile state transitions they drive.

use std::collections::HashMap;

use bevy::log::trace;
use bevy::prelude::*;

use crate::components::{EntityTag, Health, Projectile};
use crate::resources::RicochetConfig;
use crate::types::{CollisionOutcome, Contact, ContactClass, DespawnReason, OutcomeKind};

/// Damage-receiving capability of the world.
///
/// Implemented for `Query<&mut Health>` so the plugin can dispatch damage
/// straight into components, and for a plain `HashMap<Entity, Health>` for
/// use outside an ECS world.
pub trait DamageReceiver {
    /// Applies `amount` to `target`.
    ///
    /// Returns `false` when the target has no way to receive damage; the
    /// contact is then ignored rather than treated as an error.
    fn take_damage(&mut self, target: Entity, amount: f32) -> bool;
}

impl DamageReceiver for Query<'_, '_, &mut Health> {
    fn take_damage(&mut self, target: Entity, amount: f32) -> bool {
        match self.get_mut(target) {
            Ok(mut health) => {
                health.take_damage(amount);
                true
            }
            Err(_) => false,
        }
    }
}

impl DamageReceiver for HashMap<Entity, Health> {
    fn take_damage(&mut self, target: Entity, amount: f32) -> bool {
        match self.get_mut(&target) {
            Some(health) => {
                health.take_damage(amount);
                true
            }
            None => false,
        }
    }
}

/// Maps the other entity's tag to a contact class.
///
/// Obstacles bounce or terminate, Targets penetrate or terminate, anything
/// else terminates.
pub fn classify(tag: EntityTag) -> ContactClass {
    ContactClass::from(tag)
}

/// Reflect a direction off a surface: `R = I - 2(N·I)N`.
///
/// Both inputs are normalized first and the result is renormalized to
/// remove floating-point drift.
///
/// # Arguments
/// * `incident` - Direction of travel before the contact
/// * `normal` - Contact-surface normal
///
/// # Returns
/// The unit reflected direction, or `None` if either input is degenerate
///
/// # Example
/// ```
/// use bevy::prelude::*;
/// use bevy_ricochet::systems::collision::reflect;
///
/// let reflected = reflect(Vec2::new(1.0, -1.0), Vec2::Y).unwrap();
/// assert!((reflected - Vec2::new(1.0, 1.0).normalize()).length() < 1e-6);
/// ```
pub fn reflect(incident: Vec2, normal: Vec2) -> Option<Vec2> {
    let incident = incident.try_normalize()?;
    let normal = normal.try_normalize()?;
    (incident - 2.0 * normal.dot(incident) * normal).try_normalize()
}

/// Resolve one contact against the projectile's current state.
///
/// Counters are read as they stand right now, so earlier contacts in the
/// same tick count against the budgets. A projectile that is no longer
/// armed ignores any further contacts.
///
/// # Arguments
/// * `projectile` - The projectile that made contact
/// * `contact` - Contact reported by the collision detector
/// * `damage` - Where Target damage is dispatched
/// * `config` - Global ricochet/penetration switches
pub fn resolve_contact(
    projectile: &mut Projectile,
    contact: &Contact,
    damage: &mut impl DamageReceiver,
    config: &RicochetConfig,
) -> CollisionOutcome {
    if !projectile.is_armed() {
        return CollisionOutcome::new(OutcomeKind::Ignore, contact);
    }
    let Some((amount, max_bounces, max_penetrations)) = projectile
        .profile()
        .map(|p| (p.damage, p.max_bounces, p.max_penetrations))
    else {
        return CollisionOutcome::new(OutcomeKind::Ignore, contact);
    };

    match classify(contact.tag) {
        ContactClass::Obstacle => {
            if !config.enable_ricochet || projectile.bounce_count >= max_bounces {
                projectile.despawn(DespawnReason::BounceBudgetExhausted);
                return CollisionOutcome::new(OutcomeKind::Terminate, contact);
            }
            match reflect(projectile.direction, contact.normal) {
                Some(reflected) => {
                    projectile.direction = reflected;
                    projectile.bounce_count += 1;
                    CollisionOutcome::new(OutcomeKind::Bounce, contact)
                }
                None => {
                    trace!(other = ?contact.other, "degenerate contact normal, stopping projectile");
                    projectile.despawn(DespawnReason::TerminalContact);
                    CollisionOutcome::new(OutcomeKind::Terminate, contact)
                }
            }
        }
        ContactClass::Target => {
            if projectile.hit_targets.contains(&contact.other) {
                trace!(target = ?contact.other, "target already hit this flight");
                return CollisionOutcome::new(OutcomeKind::Ignore, contact);
            }
            if !damage.take_damage(contact.other, amount) {
                return CollisionOutcome::new(OutcomeKind::Ignore, contact);
            }
            projectile.hit_targets.insert(contact.other);

            let kind = if config.enable_penetration && projectile.penetration_count < max_penetrations {
                projectile.penetration_count += 1;
                OutcomeKind::Penetrate
            } else {
                projectile.despawn(DespawnReason::PenetrationBudgetExhausted);
                OutcomeKind::Terminate
            };
            CollisionOutcome::new(kind, contact).with_damage(contact.other, amount)
        }
        ContactClass::Terminal => {
            projectile.despawn(DespawnReason::TerminalContact);
            CollisionOutcome::new(OutcomeKind::Terminate, contact)
        }
    }
}
