//! # Bevy Ricochet
//!
//! Pooled 2D projectile simulation for Bevy 0.18.
//!
//! ## Features
//! - Fixed-capacity projectile pool with generational handles
//! - Straight-line flight with per-profile lifetime
//! - Ricochet off obstacles with a per-profile bounce budget
//! - Penetration through targets with at-most-once damage per target
//! - Proximity gate that lets projectiles pass through targets they are
//!   about to pierce
//!
//! Collision detection is not part of this crate. Whatever physics layer the
//! game uses reports contacts as [`ContactEvent`](events::ContactEvent)s and
//! gate overlaps as [`GateOverlapEvent`](events::GateOverlapEvent)s.
//!
//! ## Quick Start
//! ```rust,no_run
//! use bevy::prelude::*;
//! use bevy_ricochet::prelude::*;
//!
//! fn main() {
//!     App::new()
//!         .add_plugins(MinimalPlugins)
//!         .insert_resource(RicochetConfig {
//!             pool_capacity: 512,
//!             ..Default::default()
//!         })
//!         .add_plugins(RicochetPlugin)
//!         .run();
//! }
//! ```

pub mod components;
pub mod error;
pub mod events;
pub mod pool;
pub mod resources;
pub mod systems;
pub mod types;

pub mod prelude {
    pub use crate::components::*;
    pub use crate::error::*;
    pub use crate::events::*;
    pub use crate::pool::{ProjectileHandle, ProjectilePool};
    pub use crate::resources::*;
    pub use crate::systems::collision::{reflect, DamageReceiver};
    pub use crate::systems::logic::SimulationStep;
    pub use crate::types::*;
    pub use crate::RicochetPlugin;
}

use bevy::log::info;
use bevy::prelude::*;

/// Projectile simulation plugin.
///
/// Builds the pool from the [`RicochetConfig`](resources::RicochetConfig)
/// present at build time (or the default one) and schedules in `FixedUpdate`:
/// - `spawn_projectiles` - serves `FireEvent`s from the pool
/// - `apply_gate_overlaps` - drives the proximity gate
/// - `step_projectiles` - moves, ages and resolves contacts
pub struct RicochetPlugin;

impl Plugin for RicochetPlugin {
    fn build(&self, app: &mut App) {
        let config = app
            .world()
            .get_resource::<resources::RicochetConfig>()
            .cloned()
            .unwrap_or_default();

        if !app.world().contains_resource::<resources::AmmoPresets>() {
            app.insert_resource(resources::AmmoPresets::with_defaults());
        }

        info!(
            capacity = config.pool_capacity,
            ricochet = config.enable_ricochet,
            penetration = config.enable_penetration,
            "projectile pool ready"
        );

        app.register_type::<resources::RicochetConfig>()
            .register_type::<components::EntityTag>()
            .register_type::<components::Health>()
            .register_type::<pool::ProjectileHandle>()
            .register_type::<types::ProjectileState>()
            .register_type::<types::CollisionMode>()
            .register_type::<types::DespawnReason>()
            .insert_resource(pool::ProjectilePool::with_direction_epsilon(
                config.pool_capacity,
                config.direction_epsilon,
            ))
            .insert_resource(config)
            .init_resource::<systems::logic::SimulationStep>()
            .add_message::<events::FireEvent>()
            .add_message::<events::ProjectileSpawned>()
            .add_message::<events::FireRejected>()
            .add_message::<events::ContactEvent>()
            .add_message::<events::GateOverlapEvent>()
            .add_message::<events::CollisionModeChanged>()
            .add_message::<events::HitEvent>()
            .add_message::<events::RicochetEvent>()
            .add_message::<events::PenetrationEvent>()
            .add_message::<events::DespawnEvent>()
            .add_systems(
                FixedUpdate,
                (
                    systems::logic::spawn_projectiles,
                    systems::gate::apply_gate_overlaps,
                    systems::logic::step_projectiles,
                )
                    .chain(),
            );
    }
}
