//! Common types and enums for the projectile simulation.

use bevy::prelude::*;

use crate::components::EntityTag;

/// Lifecycle state of a pooled projectile.
///
/// A projectile cycles `Pooled → Armed → Despawning → Pooled` for as long
/// as the simulation runs; it is never destroyed.
///
/// # Example
/// ```
/// use bevy_ricochet::types::ProjectileState;
///
/// let state = ProjectileState::default();
/// assert_eq!(state, ProjectileState::Pooled);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
pub enum ProjectileState {
    #[default]
    /// Sitting in the pool (or reserved by `acquire`, not yet armed)
    Pooled,
    /// In flight
    Armed,
    /// Marked for release at the end of the current tick
    Despawning,
}

/// Whether the projectile's primary collider blocks or passes through targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
pub enum CollisionMode {
    #[default]
    /// Primary collider is solid
    Blocking,
    /// Primary collider passes through Target-tagged entities
    Permeable,
}

/// Result of classifying a contact by the other entity's tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactClass {
    /// Solid geometry: bounce or terminate
    Obstacle,
    /// Damageable entity: penetrate or terminate
    Target,
    /// Anything else: always terminate
    Terminal,
}

impl From<EntityTag> for ContactClass {
    fn from(tag: EntityTag) -> Self {
        match tag {
            EntityTag::Obstacle => ContactClass::Obstacle,
            EntityTag::Target => ContactClass::Target,
            EntityTag::Other => ContactClass::Terminal,
        }
    }
}

/// What a single contact did to the projectile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeKind {
    /// Direction reflected, projectile still armed
    Bounce,
    /// Target damaged, projectile still armed
    Penetrate,
    /// Projectile is now despawning
    Terminate,
    /// Contact had no effect (duplicate target, no damage capability, already despawning)
    Ignore,
}

/// Transient per-contact result, consumed immediately by the caller.
///
/// # Fields
/// * `kind` - What happened to the projectile
/// * `contact_point` - World-space contact position
/// * `contact_normal` - Surface normal reported by the detector
/// * `target` - The damaged entity, when damage was dispatched
/// * `damage` - Damage dispatched by this contact (0.0 when none)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionOutcome {
    pub kind: OutcomeKind,
    pub contact_point: Vec2,
    pub contact_normal: Vec2,
    pub target: Option<Entity>,
    pub damage: f32,
}

impl CollisionOutcome {
    pub(crate) fn new(kind: OutcomeKind, contact: &Contact) -> Self {
        Self {
            kind,
            contact_point: contact.point,
            contact_normal: contact.normal,
            target: None,
            damage: 0.0,
        }
    }

    pub(crate) fn with_damage(mut self, target: Entity, damage: f32) -> Self {
        self.target = Some(target);
        self.damage = damage;
        self
    }
}

/// Why a projectile left flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum DespawnReason {
    /// Age reached the profile lifetime
    Expired,
    /// Obstacle contact with no bounces left
    BounceBudgetExhausted,
    /// Target contact with no penetrations left
    PenetrationBudgetExhausted,
    /// Contact with an entity that is neither Obstacle nor Target
    TerminalContact,
}

/// One contact reported by the external collision detector for one projectile.
///
/// # Fields
/// * `other` - Handle of the colliding entity
/// * `tag` - Tag of the colliding entity
/// * `point` - World-space contact point
/// * `normal` - Contact-surface normal (need not be unit length)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub other: Entity,
    pub tag: EntityTag,
    pub point: Vec2,
    pub normal: Vec2,
}

/// Gate overlap edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum GatePhase {
    Enter,
    Exit,
}
