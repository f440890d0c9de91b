//! Drives `RicochetPlugin` through a Bevy `App`, playing the collision layer
//! by writing contact and gate messages by hand.

use std::time::Duration;

use bevy::ecs::message::{Message, Messages};
use bevy::prelude::*;
use bevy_ricochet::prelude::*;

fn test_app(config: RicochetConfig) -> App {
    let mut app = App::new();
    app.insert_resource(config);
    app.insert_resource(Time::<()>::default());
    app.insert_resource(Time::<Fixed>::default());
    app.add_plugins(RicochetPlugin);
    app
}

fn send<M: Message>(app: &mut App, message: M) {
    app.world_mut().resource_mut::<Messages<M>>().write(message);
}

fn drain<M: Message>(app: &mut App) -> Vec<M> {
    app.world_mut().resource_mut::<Messages<M>>().drain().collect()
}

fn step(app: &mut App, dt: f32) {
    app.world_mut()
        .resource_mut::<Time<Fixed>>()
        .advance_by(Duration::from_secs_f32(dt));
    app.world_mut().run_schedule(FixedUpdate);
}

fn preset(app: &App, name: &str) -> std::sync::Arc<BallisticProfile> {
    app.world().resource::<AmmoPresets>().get(name).unwrap()
}

fn fire(app: &mut App, ammo: &str, direction: Vec2) -> ProjectileHandle {
    let profile = preset(app, ammo);
    send(app, FireEvent::new(profile, Vec2::ZERO, direction));
    step(app, 0.0);
    let spawned = drain::<ProjectileSpawned>(app);
    assert_eq!(spawned.len(), 1, "fire request was not served");
    spawned[0].projectile
}

fn contact(projectile: ProjectileHandle, other: Entity, tag: EntityTag, normal: Vec2) -> ContactEvent {
    ContactEvent {
        projectile,
        other,
        tag,
        point: Vec2::new(5.0, 0.0),
        normal,
    }
}

#[test]
fn test_plugin_builds_pool_from_config() {
    let app = test_app(RicochetConfig {
        pool_capacity: 8,
        ..Default::default()
    });

    let pool = app.world().resource::<ProjectilePool>();
    assert_eq!(pool.capacity(), 8);
    assert_eq!(pool.free_count(), 8);
    assert_eq!(app.world().resource::<AmmoPresets>().presets.len(), 4);
}

#[test]
fn test_fire_and_reject() {
    let mut app = test_app(RicochetConfig {
        pool_capacity: 2,
        ..Default::default()
    });
    let shooter = app.world_mut().spawn_empty().id();
    let profile = preset(&app, "standard");

    send(&mut app, FireEvent::new(profile.clone(), Vec2::ZERO, Vec2::ZERO).with_shooter(shooter));
    for _ in 0..3 {
        send(&mut app, FireEvent::new(profile.clone(), Vec2::ZERO, Vec2::Y).with_shooter(shooter));
    }
    step(&mut app, 0.0);

    let spawned = drain::<ProjectileSpawned>(&mut app);
    let rejected = drain::<FireRejected>(&mut app);
    assert_eq!(spawned.len(), 2);
    assert!(spawned.iter().all(|s| s.shooter == Some(shooter)));
    assert_eq!(rejected.len(), 2);
    assert!(matches!(
        rejected[0].error,
        ProjectileError::DegenerateDirection { .. }
    ));
    assert_eq!(rejected[1].error, ProjectileError::PoolExhausted { capacity: 2 });
    assert_eq!(app.world().resource::<ProjectilePool>().live_count(), 2);
}

#[test]
fn test_ricochet_then_budget_exhausted() {
    let mut app = test_app(RicochetConfig::default());
    let wall = app.world_mut().spawn(EntityTag::Obstacle).id();
    let projectile = fire(&mut app, "ricochet", Vec2::X);

    send(&mut app, contact(projectile, wall, EntityTag::Obstacle, Vec2::NEG_X));
    step(&mut app, 1.0 / 64.0);

    let ricochets = drain::<RicochetEvent>(&mut app);
    assert_eq!(ricochets.len(), 1);
    assert_eq!(ricochets[0].surface, wall);
    assert_eq!(ricochets[0].bounce_count, 1);
    assert!((ricochets[0].new_direction - Vec2::NEG_X).length() < 1e-6);

    for normal in [Vec2::X, Vec2::NEG_X, Vec2::X] {
        send(&mut app, contact(projectile, wall, EntityTag::Obstacle, normal));
        step(&mut app, 1.0 / 64.0);
    }

    assert_eq!(drain::<RicochetEvent>(&mut app).len(), 2);
    let despawns = drain::<DespawnEvent>(&mut app);
    assert_eq!(despawns.len(), 1);
    assert_eq!(despawns[0].projectile, projectile);
    assert_eq!(despawns[0].reason, DespawnReason::BounceBudgetExhausted);
    assert!(app.world().resource::<ProjectilePool>().get(projectile).is_none());
}

#[test]
fn test_piercing_through_gated_targets() {
    let mut app = test_app(RicochetConfig::default());
    let first = app.world_mut().spawn((EntityTag::Target, Health::new(100.0))).id();
    let second = app.world_mut().spawn((EntityTag::Target, Health::new(100.0))).id();
    let projectile = fire(&mut app, "piercing", Vec2::X);

    send(
        &mut app,
        GateOverlapEvent {
            projectile,
            other: first,
            tag: EntityTag::Target,
            phase: GatePhase::Enter,
        },
    );
    send(&mut app, contact(projectile, first, EntityTag::Target, Vec2::NEG_X));
    send(&mut app, contact(projectile, first, EntityTag::Target, Vec2::NEG_X));
    send(&mut app, contact(projectile, second, EntityTag::Target, Vec2::NEG_X));
    step(&mut app, 1.0 / 64.0);

    let modes = drain::<CollisionModeChanged>(&mut app);
    assert_eq!(modes.len(), 1);
    assert_eq!(modes[0].mode, CollisionMode::Permeable);

    let hits = drain::<HitEvent>(&mut app);
    assert_eq!(hits.len(), 2);
    assert!(hits.iter().all(|hit| hit.penetrated && hit.damage == 12.0));
    assert_eq!(drain::<PenetrationEvent>(&mut app).len(), 2);

    assert_eq!(app.world().get::<Health>(first).unwrap().current, 88.0);
    assert_eq!(app.world().get::<Health>(second).unwrap().current, 88.0);

    let pool = app.world().resource::<ProjectilePool>();
    let state = pool.get(projectile).unwrap();
    assert_eq!(state.penetration_count(), 2);
    assert_eq!(state.collision_mode(), CollisionMode::Permeable);
}

#[test]
fn test_target_without_health_is_ignored() {
    let mut app = test_app(RicochetConfig::default());
    let dummy = app.world_mut().spawn(EntityTag::Target).id();
    let projectile = fire(&mut app, "standard", Vec2::X);

    send(&mut app, contact(projectile, dummy, EntityTag::Target, Vec2::NEG_X));
    step(&mut app, 1.0 / 64.0);

    assert!(drain::<HitEvent>(&mut app).is_empty());
    assert!(drain::<DespawnEvent>(&mut app).is_empty());
    assert!(app.world().resource::<ProjectilePool>().get(projectile).unwrap().is_armed());
}

#[test]
fn test_expiry_and_stale_contacts() {
    let mut app = test_app(RicochetConfig::default());
    let target = app.world_mut().spawn((EntityTag::Target, Health::new(50.0))).id();
    let projectile = fire(&mut app, "standard", Vec2::Y);

    for _ in 0..4 {
        step(&mut app, 0.5);
    }

    let despawns = drain::<DespawnEvent>(&mut app);
    assert_eq!(despawns.len(), 1);
    assert_eq!(despawns[0].reason, DespawnReason::Expired);
    assert!((despawns[0].position - Vec2::new(0.0, 40.0)).length() < 1e-4);

    send(&mut app, contact(projectile, target, EntityTag::Target, Vec2::NEG_Y));
    step(&mut app, 0.5);

    assert!(drain::<HitEvent>(&mut app).is_empty());
    assert_eq!(app.world().get::<Health>(target).unwrap().current, 50.0);
    assert_eq!(app.world().resource::<ProjectilePool>().free_count(), 256);
}

#[test]
fn test_step_uses_fixed_timestep() {
    let mut app = test_app(RicochetConfig::default());
    let projectile = fire(&mut app, "standard", Vec2::X);

    // Only the fixed clock drives flight; the virtual clock is ignored.
    app.world_mut()
        .resource_mut::<Time>()
        .advance_by(Duration::from_secs(10));
    step(&mut app, 0.5);

    let pool = app.world().resource::<ProjectilePool>();
    let state = pool.get(projectile).unwrap();
    assert!(state.is_armed());
    assert!((state.position() - Vec2::new(10.0, 0.0)).length() < 1e-4);
    assert!((state.age() - 0.5).abs() < 1e-6);
}

#[test]
fn test_invalid_profile_is_rejected() {
    let mut app = test_app(RicochetConfig {
        pool_capacity: 1,
        ..Default::default()
    });
    let dud = std::sync::Arc::new(BallisticProfile::new("dud", 10.0, -5.0, f32::NAN));

    send(&mut app, FireEvent::new(dud, Vec2::ZERO, Vec2::X));
    step(&mut app, 0.0);

    assert!(drain::<ProjectileSpawned>(&mut app).is_empty());
    let rejected = drain::<FireRejected>(&mut app);
    assert_eq!(rejected.len(), 1);
    assert!(matches!(
        rejected[0].error,
        ProjectileError::InvalidProfile(ProfileError::InvalidField { field: "speed", .. })
    ));

    let pool = app.world().resource::<ProjectilePool>();
    assert_eq!(pool.live_count(), 0);
    assert_eq!(pool.free_count(), 1);
}
