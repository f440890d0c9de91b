//! Messages exchanged between the simulation and its collaborators.
//!
//! Note: In Bevy 0.18, buffered events use the `Message` trait instead of `Event`.
//!
//! Inbound: [`FireEvent`] from weapons, [`ContactEvent`] and
//! [`GateOverlapEvent`] from the collision layer. Everything else is
//! written by the simulation for effects, UI and the physics adapter.

use std::sync::Arc;

use bevy::ecs::message::Message;
use bevy::prelude::*;

use crate::components::{BallisticProfile, EntityTag};
use crate::error::ProjectileError;
use crate::pool::ProjectileHandle;
use crate::types::{CollisionMode, Contact, DespawnReason, GatePhase};

/// Request to fire one projectile.
///
/// # Fields
/// * `profile` - Ammo profile, shared with every other shot of the same ammo
/// * `origin` - World-space spawn position (usually the muzzle)
/// * `direction` - Flight direction, normalized on arm
/// * `shooter` - Entity that fired, echoed back in the reply message
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use bevy::prelude::*;
/// use bevy_ricochet::components::BallisticProfile;
/// use bevy_ricochet::events::FireEvent;
///
/// let profile = Arc::new(BallisticProfile::new("standard", 10.0, 20.0, 2.0));
/// let fire = FireEvent::new(profile, Vec2::ZERO, Vec2::X).with_shooter(Entity::PLACEHOLDER);
/// assert!(fire.shooter.is_some());
/// ```
#[derive(Message, Debug, Clone)]
pub struct FireEvent {
    pub profile: Arc<BallisticProfile>,
    pub origin: Vec2,
    pub direction: Vec2,
    pub shooter: Option<Entity>,
}

impl FireEvent {
    pub fn new(profile: Arc<BallisticProfile>, origin: Vec2, direction: Vec2) -> Self {
        Self {
            profile,
            origin,
            direction,
            shooter: None,
        }
    }

    /// Sets the shooter entity for ownership tracking.
    pub fn with_shooter(mut self, shooter: Entity) -> Self {
        self.shooter = Some(shooter);
        self
    }
}

/// A [`FireEvent`] was served: the projectile is armed and in flight.
#[derive(Message, Debug, Clone, Copy)]
pub struct ProjectileSpawned {
    pub projectile: ProjectileHandle,
    pub shooter: Option<Entity>,
}

/// A [`FireEvent`] could not be served (pool exhausted or degenerate direction).
#[derive(Message, Debug, Clone, Copy)]
pub struct FireRejected {
    pub shooter: Option<Entity>,
    pub error: ProjectileError,
}

/// Primary-collider contact reported by the collision layer.
///
/// Contacts are resolved in the order they are written.
#[derive(Message, Debug, Clone, Copy)]
pub struct ContactEvent {
    /// Projectile that made contact
    pub projectile: ProjectileHandle,
    /// Entity it touched
    pub other: Entity,
    /// Tag of the entity it touched
    pub tag: EntityTag,
    /// World-space contact point
    pub point: Vec2,
    /// Contact-surface normal
    pub normal: Vec2,
}

impl ContactEvent {
    pub fn contact(&self) -> Contact {
        Contact {
            other: self.other,
            tag: self.tag,
            point: self.point,
            normal: self.normal,
        }
    }
}

/// Gate volume started or stopped overlapping another entity.
#[derive(Message, Debug, Clone, Copy)]
pub struct GateOverlapEvent {
    pub projectile: ProjectileHandle,
    pub other: Entity,
    pub tag: EntityTag,
    pub phase: GatePhase,
}

/// A projectile's primary collider switched between blocking and pass-through.
///
/// The physics adapter should mirror this onto the collider (e.g. toggle
/// its sensor flag).
#[derive(Message, Debug, Clone, Copy)]
pub struct CollisionModeChanged {
    pub projectile: ProjectileHandle,
    pub mode: CollisionMode,
}

/// Damage was dispatched to a target.
///
/// # Fields
/// * `projectile` - Projectile that hit
/// * `target` - Entity that took the damage
/// * `impact_point` - World-space contact point
/// * `normal` - Contact normal
/// * `damage` - Damage dispatched
/// * `penetrated` - Whether the projectile kept flying
#[derive(Message, Debug, Clone, Copy)]
pub struct HitEvent {
    pub projectile: ProjectileHandle,
    pub target: Entity,
    pub impact_point: Vec2,
    pub normal: Vec2,
    pub damage: f32,
    pub penetrated: bool,
}

/// A projectile bounced off an obstacle.
#[derive(Message, Debug, Clone, Copy)]
pub struct RicochetEvent {
    pub projectile: ProjectileHandle,
    pub surface: Entity,
    pub impact_point: Vec2,
    pub normal: Vec2,
    pub new_direction: Vec2,
    pub bounce_count: u32,
}

/// A projectile passed through a target after damaging it.
#[derive(Message, Debug, Clone, Copy)]
pub struct PenetrationEvent {
    pub projectile: ProjectileHandle,
    pub target: Entity,
    pub impact_point: Vec2,
    pub penetration_count: u32,
}

/// A projectile left flight and was returned to the pool.
///
/// The handle is already stale when this is read.
#[derive(Message, Debug, Clone, Copy)]
pub struct DespawnEvent {
    pub projectile: ProjectileHandle,
    pub position: Vec2,
    pub reason: DespawnReason,
}
