//! Core data for the projectile simulation: profiles, the pooled projectile
//! state and the components the world layer attaches to collidable entities.

use std::collections::HashSet;
use std::sync::Arc;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{ProfileError, ProjectileError};
use crate::systems::gate::ProximityGate;
use crate::types::{CollisionMode, DespawnReason, ProjectileState};

/// Immutable parameters for a class of projectile.
///
/// Built by the weapon/inventory layer at configuration time and shared by
/// every projectile fired with it (`Arc<BallisticProfile>`). Never mutated
/// after creation.
///
/// # Fields
/// * `name` - Ammo name, for logs and UI
/// * `damage` - Damage dispatched per target hit (>= 0)
/// * `speed` - Flight speed in world units per second (> 0)
/// * `lifetime` - Seconds of flight before the projectile expires (> 0)
/// * `max_bounces` - Obstacle ricochets allowed per flight
/// * `max_penetrations` - Targets the projectile may pass through per flight
///
/// # Example
/// ```
/// use bevy_ricochet::components::BallisticProfile;
///
/// let profile = BallisticProfile::new("Slug", 10.0, 20.0, 2.0)
///     .with_max_bounces(1)
///     .with_max_penetrations(1);
/// assert!(profile.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BallisticProfile {
    pub name: String,
    pub damage: f32,
    pub speed: f32,
    pub lifetime: f32,
    #[serde(default)]
    pub max_bounces: u32,
    #[serde(default)]
    pub max_penetrations: u32,
}

impl BallisticProfile {
    /// Creates a profile with no bounces and no penetrations.
    pub fn new(name: impl Into<String>, damage: f32, speed: f32, lifetime: f32) -> Self {
        Self {
            name: name.into(),
            damage,
            speed,
            lifetime,
            max_bounces: 0,
            max_penetrations: 0,
        }
    }

    /// Builder pattern: set the ricochet budget
    pub fn with_max_bounces(mut self, max_bounces: u32) -> Self {
        self.max_bounces = max_bounces;
        self
    }

    /// Builder pattern: set the penetration budget
    pub fn with_max_penetrations(mut self, max_penetrations: u32) -> Self {
        self.max_penetrations = max_penetrations;
        self
    }

    /// Checks every numeric field against its valid range.
    ///
    /// Profiles loaded by a data layer should pass through this before
    /// being handed to a weapon.
    pub fn validate(&self) -> Result<(), ProfileError> {
        if !(self.damage.is_finite() && self.damage >= 0.0) {
            return Err(ProfileError::InvalidField {
                field: "damage",
                value: self.damage,
            });
        }
        if !(self.speed.is_finite() && self.speed > 0.0) {
            return Err(ProfileError::InvalidField {
                field: "speed",
                value: self.speed,
            });
        }
        if !(self.lifetime.is_finite() && self.lifetime > 0.0) {
            return Err(ProfileError::InvalidField {
                field: "lifetime",
                value: self.lifetime,
            });
        }
        Ok(())
    }
}

/// Tag taxonomy supplied by the world/scene layer.
///
/// This is the only input to contact classification.
#[derive(Component, Reflect, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[reflect(Component)]
pub enum EntityTag {
    /// Walls and other solid geometry: ricochet or stop
    Obstacle,
    /// Damageable entities: penetrate or stop
    Target,
    #[default]
    /// Anything else stops the projectile
    Other,
}

/// Damage-receiving capability of a Target-tagged entity.
///
/// Contacts against a Target without this component are ignored.
///
/// # Example
/// ```
/// use bevy_ricochet::components::Health;
///
/// let mut health = Health::new(30.0);
/// assert_eq!(health.take_damage(50.0), 30.0);
/// assert!(health.is_dead());
/// ```
#[derive(Component, Reflect, Debug, Clone, Copy, PartialEq)]
#[reflect(Component)]
pub struct Health {
    /// Current hit points
    pub current: f32,
    /// Maximum hit points
    pub max: f32,
}

impl Default for Health {
    fn default() -> Self {
        Self::new(100.0)
    }
}

impl Health {
    pub fn new(max: f32) -> Self {
        Self { current: max, max }
    }

    /// Applies damage, clamping at zero. Returns the damage actually taken.
    pub fn take_damage(&mut self, amount: f32) -> f32 {
        let applied = amount.max(0.0).min(self.current);
        self.current -= applied;
        applied
    }

    pub fn is_dead(&self) -> bool {
        self.current <= 0.0
    }

    /// Remaining health in `[0, 1]`, for health bars.
    pub fn fraction(&self) -> f32 {
        if self.max <= 0.0 {
            0.0
        } else {
            (self.current / self.max).clamp(0.0, 1.0)
        }
    }
}

/// A pooled projectile.
///
/// Lives in a [`ProjectilePool`](crate::pool::ProjectilePool) slot rather
/// than on an entity, so it is reused shot after shot without allocation.
/// While `Pooled` it holds no profile, all counters are zero, the hit set
/// is empty and the collision mode is `Blocking`.
#[derive(Debug, Default)]
pub struct Projectile {
    pub(crate) position: Vec2,
    pub(crate) direction: Vec2,
    pub(crate) profile: Option<Arc<BallisticProfile>>,
    pub(crate) age: f32,
    pub(crate) bounce_count: u32,
    pub(crate) penetration_count: u32,
    pub(crate) hit_targets: HashSet<Entity>,
    pub(crate) gate: ProximityGate,
    pub(crate) state: ProjectileState,
    pub(crate) despawn_reason: Option<DespawnReason>,
}

impl Projectile {
    /// Current world-space position.
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Current unit flight direction.
    pub fn direction(&self) -> Vec2 {
        self.direction
    }

    /// Profile bound at arm time, `None` while pooled.
    pub fn profile(&self) -> Option<&Arc<BallisticProfile>> {
        self.profile.as_ref()
    }

    /// Seconds since arm.
    pub fn age(&self) -> f32 {
        self.age
    }

    pub fn bounce_count(&self) -> u32 {
        self.bounce_count
    }

    pub fn penetration_count(&self) -> u32 {
        self.penetration_count
    }

    /// Targets already damaged during this flight.
    pub fn hit_targets(&self) -> &HashSet<Entity> {
        &self.hit_targets
    }

    pub fn collision_mode(&self) -> CollisionMode {
        self.gate.mode()
    }

    pub fn state(&self) -> ProjectileState {
        self.state
    }

    pub fn is_armed(&self) -> bool {
        self.state == ProjectileState::Armed
    }

    /// Set once the projectile leaves flight; cleared on release.
    pub fn despawn_reason(&self) -> Option<DespawnReason> {
        self.despawn_reason
    }

    /// Fraction of the lifetime still ahead: 1.0 right after arm, 0.0 at expiry.
    pub fn remaining_lifetime_fraction(&self) -> f32 {
        match &self.profile {
            Some(profile) => (1.0 - self.age / profile.lifetime).clamp(0.0, 1.0),
            None => 0.0,
        }
    }

    /// Binds a profile and puts the projectile in flight.
    ///
    /// The caller guarantees the projectile is `Pooled`. On error nothing
    /// is modified.
    pub(crate) fn arm(
        &mut self,
        profile: Arc<BallisticProfile>,
        origin: Vec2,
        direction: Vec2,
        epsilon: f32,
    ) -> Result<(), ProjectileError> {
        let magnitude = direction.length();
        // Negated so NaN is rejected too.
        if !(magnitude >= epsilon) {
            return Err(ProjectileError::DegenerateDirection { magnitude });
        }

        self.reset();
        self.position = origin;
        self.direction = direction / magnitude;
        self.profile = Some(profile);
        self.state = ProjectileState::Armed;
        Ok(())
    }

    /// Leaves flight. Later calls in the same tick keep the first reason.
    pub(crate) fn despawn(&mut self, reason: DespawnReason) {
        if self.state == ProjectileState::Armed {
            self.state = ProjectileState::Despawning;
            self.despawn_reason = Some(reason);
        }
    }

    /// Restores every pooled invariant. Keeps the hit set's allocation.
    pub(crate) fn reset(&mut self) {
        self.position = Vec2::ZERO;
        self.direction = Vec2::ZERO;
        self.profile = None;
        self.age = 0.0;
        self.bounce_count = 0;
        self.penetration_count = 0;
        self.hit_targets.clear();
        self.gate.reset();
        self.state = ProjectileState::Pooled;
        self.despawn_reason = None;
    }
}
