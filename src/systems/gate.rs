//! Proximity gate - decides whether a projectile's primary collider blocks
//! or passes through targets.
//!
//! The gate is a slightly larger overlap volume around the projectile. While
//! it overlaps at least one Target the primary collider is permeable, which
//! lets a penetrating shot travel through a cluster of targets while walls
//! still stop it. The gate never deals damage and never touches the bounce
//! or penetration counters.

use std::collections::HashSet;

use bevy::ecs::message::{MessageReader, MessageWriter};
use bevy::log::{debug, trace};
use bevy::prelude::*;

use crate::components::EntityTag;
use crate::events::{CollisionModeChanged, GateOverlapEvent};
use crate::pool::{ProjectileHandle, ProjectilePool};
use crate::types::{CollisionMode, GatePhase};

/// Target entities currently overlapping the gate.
///
/// The mode stays `Permeable` until the last overlapping Target exits. A
/// repeated `Enter` for an entity already inside, or an `Exit` for one that
/// never entered, leaves the set unchanged.
///
/// # Example
/// ```
/// use bevy::prelude::*;
/// use bevy_ricochet::components::EntityTag;
/// use bevy_ricochet::systems::gate::ProximityGate;
/// use bevy_ricochet::types::CollisionMode;
///
/// let mut world = World::new();
/// let (a, b) = (world.spawn_empty().id(), world.spawn_empty().id());
///
/// let mut gate = ProximityGate::default();
/// gate.on_enter(a, EntityTag::Target);
/// gate.on_enter(b, EntityTag::Target);
/// gate.on_exit(a, EntityTag::Target);
/// assert_eq!(gate.mode(), CollisionMode::Permeable);
/// gate.on_exit(b, EntityTag::Target);
/// assert_eq!(gate.mode(), CollisionMode::Blocking);
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProximityGate {
    overlapping: HashSet<Entity>,
}

impl ProximityGate {
    /// Number of Target entities currently inside the gate.
    pub fn overlaps(&self) -> usize {
        self.overlapping.len()
    }

    pub fn is_overlapping(&self, other: Entity) -> bool {
        self.overlapping.contains(&other)
    }

    pub fn mode(&self) -> CollisionMode {
        if self.overlapping.is_empty() {
            CollisionMode::Blocking
        } else {
            CollisionMode::Permeable
        }
    }

    /// Registers an overlap start. Returns the new mode if it changed.
    pub fn on_enter(&mut self, other: Entity, tag: EntityTag) -> Option<CollisionMode> {
        if tag != EntityTag::Target {
            return None;
        }
        let before = self.mode();
        self.overlapping.insert(other);
        self.changed_from(before)
    }

    /// Registers an overlap end. Returns the new mode if it changed.
    pub fn on_exit(&mut self, other: Entity, tag: EntityTag) -> Option<CollisionMode> {
        if tag != EntityTag::Target {
            return None;
        }
        let before = self.mode();
        self.overlapping.remove(&other);
        self.changed_from(before)
    }

    pub fn apply(&mut self, other: Entity, tag: EntityTag, phase: GatePhase) -> Option<CollisionMode> {
        match phase {
            GatePhase::Enter => self.on_enter(other, tag),
            GatePhase::Exit => self.on_exit(other, tag),
        }
    }

    /// Empties the set, keeping its allocation.
    pub(crate) fn reset(&mut self) {
        self.overlapping.clear();
    }

    fn changed_from(&self, before: CollisionMode) -> Option<CollisionMode> {
        let after = self.mode();
        (after != before).then_some(after)
    }
}

/// Feeds one gate overlap edge to the projectile it belongs to.
///
/// Stale handles and projectiles no longer in flight are skipped.
///
/// # Returns
/// The projectile's new collision mode if the edge flipped it
pub fn apply_gate_overlap(
    pool: &mut ProjectilePool,
    projectile: ProjectileHandle,
    other: Entity,
    tag: EntityTag,
    phase: GatePhase,
) -> Option<CollisionMode> {
    let Some(entry) = pool.get_mut(projectile) else {
        trace!(?projectile, "gate overlap for stale projectile dropped");
        return None;
    };
    if !entry.is_armed() {
        return None;
    }
    entry.gate.apply(other, tag, phase)
}

/// Apply this tick's gate overlaps before any contact is resolved.
///
/// # Arguments
/// * `pool` - The projectile pool
/// * `overlaps` - Gate overlap edges reported by the collision layer
/// * `mode_changes` - Written whenever a projectile's collision mode flips
pub fn apply_gate_overlaps(
    mut pool: ResMut<ProjectilePool>,
    mut overlaps: MessageReader<GateOverlapEvent>,
    mut mode_changes: MessageWriter<CollisionModeChanged>,
) {
    for event in overlaps.read() {
        let changed = apply_gate_overlap(&mut pool, event.projectile, event.other, event.tag, event.phase);
        if let Some(mode) = changed {
            debug!(projectile = ?event.projectile, ?mode, "collision mode changed");
            mode_changes.write(CollisionModeChanged {
                projectile: event.projectile,
                mode,
            });
        }
    }
}
