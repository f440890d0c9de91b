//! Simulation step - the per-tick driver, plus the systems that feed it.

use std::collections::HashMap;

use bevy::ecs::message::{MessageReader, MessageWriter};
use bevy::log::{debug, trace, warn};
use bevy::prelude::*;

use crate::components::Health;
use crate::events::{
    ContactEvent, DespawnEvent, FireEvent, FireRejected, HitEvent, PenetrationEvent,
    ProjectileSpawned, RicochetEvent,
};
use crate::pool::{ProjectileHandle, ProjectilePool};
use crate::resources::RicochetConfig;
use crate::systems::collision::{resolve_contact, DamageReceiver};
use crate::systems::kinematics::advance;
use crate::types::{CollisionOutcome, Contact, DespawnReason, OutcomeKind};

/// A contact that changed something, with the projectile state right after it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedContact {
    pub projectile: ProjectileHandle,
    pub other: Entity,
    pub outcome: CollisionOutcome,
    pub direction: Vec2,
    pub bounce_count: u32,
    pub penetration_count: u32,
}

/// A projectile released back to the pool at the end of the tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Despawned {
    pub projectile: ProjectileHandle,
    pub position: Vec2,
    pub reason: DespawnReason,
}

/// Everything that happened during one tick.
#[derive(Debug, Default, Clone)]
pub struct TickReport {
    /// Non-ignored contact outcomes, in resolution order
    pub resolved: Vec<ResolvedContact>,
    /// Projectiles released at the end of the tick
    pub despawned: Vec<Despawned>,
}

/// Per-tick driver.
///
/// Collects the tick's contacts per projectile, then on [`tick`](Self::tick)
/// advances every live projectile, resolves its contacts in the order they
/// were pushed, and finally releases everything that despawned. Release is
/// deferred to the very end so no projectile ever observes a reclaimed
/// slot and iteration order never matters.
#[derive(Resource, Debug, Default)]
pub struct SimulationStep {
    contacts: HashMap<ProjectileHandle, Vec<Contact>>,
    live: Vec<ProjectileHandle>,
}

impl SimulationStep {
    /// Queues a contact for the next tick.
    pub fn push_contact(&mut self, projectile: ProjectileHandle, contact: Contact) {
        self.contacts.entry(projectile).or_default().push(contact);
    }

    /// Number of contacts queued for the next tick.
    pub fn pending_contacts(&self) -> usize {
        self.contacts.values().map(Vec::len).sum()
    }

    /// Runs one fixed step of length `dt` and consumes the queued contacts.
    pub fn tick(
        &mut self,
        pool: &mut ProjectilePool,
        dt: f32,
        damage: &mut impl DamageReceiver,
        config: &RicochetConfig,
    ) -> TickReport {
        let mut report = TickReport::default();
        self.live.clear();
        self.live.extend(pool.live_handles());

        for &handle in &self.live {
            let Some(projectile) = pool.get_mut(handle) else {
                continue;
            };
            // Lifetime expiry wins over any same-tick contact.
            if advance(projectile, dt) {
                continue;
            }
            let Some(contacts) = self.contacts.get(&handle) else {
                continue;
            };
            for contact in contacts {
                let outcome = resolve_contact(projectile, contact, damage, config);
                if outcome.kind == OutcomeKind::Ignore {
                    continue;
                }
                report.resolved.push(ResolvedContact {
                    projectile: handle,
                    other: contact.other,
                    outcome,
                    direction: projectile.direction(),
                    bounce_count: projectile.bounce_count(),
                    penetration_count: projectile.penetration_count(),
                });
            }
        }

        for &handle in &self.live {
            if let Some(projectile) = pool.get(handle) {
                if let Some(reason) = projectile.despawn_reason() {
                    report.despawned.push(Despawned {
                        projectile: handle,
                        position: projectile.position(),
                        reason,
                    });
                }
            }
        }
        pool.release_despawning();
        self.contacts.clear();

        report
    }
}

/// Serve fire requests from the pool.
///
/// # Arguments
/// * `pool` - The projectile pool
/// * `fire_events` - Fire requests from weapons
/// * `spawned` - Written for each armed projectile
/// * `rejected` - Written for each request that could not be served
pub fn spawn_projectiles(
    mut pool: ResMut<ProjectilePool>,
    mut fire_events: MessageReader<FireEvent>,
    mut spawned: MessageWriter<ProjectileSpawned>,
    mut rejected: MessageWriter<FireRejected>,
) {
    for fire in fire_events.read() {
        match pool.spawn(fire.profile.clone(), fire.origin, fire.direction) {
            Ok(projectile) => {
                spawned.write(ProjectileSpawned {
                    projectile,
                    shooter: fire.shooter,
                });
            }
            Err(error) => {
                warn!(ammo = %fire.profile.name, %error, "fire request rejected");
                rejected.write(FireRejected {
                    shooter: fire.shooter,
                    error,
                });
            }
        }
    }
}

/// Advance all projectiles by one fixed step.
///
/// Runs after [`apply_gate_overlaps`](crate::systems::gate::apply_gate_overlaps)
/// so gate overlaps always precede contact resolution. Damage goes to the
/// target's [`Health`]; targets without one ignore the contact.
///
/// # Arguments
/// * `time` - Fixed timestep, provides `dt`
/// * `config` - Global switches
/// * `step` - Driver state
/// * `pool` - The projectile pool
/// * `contacts` - This tick's contacts from the collision layer
/// * `healths` - Damage-receiving capability of targets
/// * `hits`, `ricochets`, `penetrations`, `despawns` - Outcome messages
#[allow(clippy::too_many_arguments)]
pub fn step_projectiles(
    time: Res<Time<Fixed>>,
    config: Res<RicochetConfig>,
    mut step: ResMut<SimulationStep>,
    mut pool: ResMut<ProjectilePool>,
    mut contacts: MessageReader<ContactEvent>,
    mut healths: Query<&mut Health>,
    mut hits: MessageWriter<HitEvent>,
    mut ricochets: MessageWriter<RicochetEvent>,
    mut penetrations: MessageWriter<PenetrationEvent>,
    mut despawns: MessageWriter<DespawnEvent>,
) {
    for event in contacts.read() {
        if pool.get(event.projectile).is_none() {
            trace!(projectile = ?event.projectile, "contact for stale projectile dropped");
            continue;
        }
        step.push_contact(event.projectile, event.contact());
    }

    let report = step.tick(&mut pool, time.delta_secs(), &mut healths, &config);

    for resolved in &report.resolved {
        let outcome = &resolved.outcome;
        match outcome.kind {
            OutcomeKind::Bounce => {
                debug!(
                    projectile = ?resolved.projectile,
                    bounces = resolved.bounce_count,
                    "projectile ricocheted"
                );
                ricochets.write(RicochetEvent {
                    projectile: resolved.projectile,
                    surface: resolved.other,
                    impact_point: outcome.contact_point,
                    normal: outcome.contact_normal,
                    new_direction: resolved.direction,
                    bounce_count: resolved.bounce_count,
                });
            }
            OutcomeKind::Penetrate => {
                debug!(
                    projectile = ?resolved.projectile,
                    target = ?resolved.other,
                    penetrations = resolved.penetration_count,
                    "projectile penetrated target"
                );
                penetrations.write(PenetrationEvent {
                    projectile: resolved.projectile,
                    target: resolved.other,
                    impact_point: outcome.contact_point,
                    penetration_count: resolved.penetration_count,
                });
            }
            OutcomeKind::Terminate | OutcomeKind::Ignore => {}
        }

        if let Some(target) = outcome.target {
            hits.write(HitEvent {
                projectile: resolved.projectile,
                target,
                impact_point: outcome.contact_point,
                normal: outcome.contact_normal,
                damage: outcome.damage,
                penetrated: outcome.kind == OutcomeKind::Penetrate,
            });
        }
    }

    for despawned in &report.despawned {
        debug!(projectile = ?despawned.projectile, reason = ?despawned.reason, "projectile despawned");
        despawns.write(DespawnEvent {
            projectile: despawned.projectile,
            position: despawned.position,
            reason: despawned.reason,
        });
    }
}
