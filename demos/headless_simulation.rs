use std::collections::HashSet;
use std::time::Duration;

use bevy::app::ScheduleRunnerPlugin;
use bevy::ecs::message::{MessageReader, MessageWriter};
use bevy::prelude::*;
use bevy_ricochet::prelude::*;
use bevy_ricochet::systems::logic::spawn_projectiles;

const WALL_X: f32 = 30.0;
const BACK_WALL_X: f32 = -5.0;
const HIT_RADIUS: f32 = 0.5;
const GATE_RADIUS: f32 = 2.0;

fn main() {
    println!("Starting Headless Ricochet Simulation...");
    println!("Firing one volley at a row of dummies in front of a wall...");

    App::new()
        .add_plugins(MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_secs_f64(1.0 / 60.0))))
        .insert_resource(Time::<Fixed>::from_hz(60.0))
        .add_plugins(RicochetPlugin)
        .add_systems(Startup, (setup_dummies, fire_volley))
        .add_systems(FixedUpdate, detect_contacts.before(spawn_projectiles))
        .add_systems(Update, (report_events, finish_when_done))
        .run();
}

/// Stand-in for a physics body: a target disc on the firing lane.
#[derive(Component)]
struct Dummy {
    position: Vec2,
}

fn setup_dummies(mut commands: Commands) {
    println!("\n[SETUP] Spawning wall and dummies...");

    commands.spawn((EntityTag::Obstacle, Name::new("Wall")));
    for (i, x) in [10.0, 14.0, 18.0].into_iter().enumerate() {
        commands.spawn((
            EntityTag::Target,
            Health::new(30.0),
            Dummy {
                position: Vec2::new(x, 0.0),
            },
            Name::new(format!("Dummy {}", i + 1)),
        ));
    }
}

fn fire_volley(presets: Res<AmmoPresets>, mut fire: MessageWriter<FireEvent>) {
    let lanes = [
        ("standard", 0.0),
        ("piercing", 0.0),
        ("ricochet", 5.0),
        ("ricochet_piercing", 0.0),
    ];
    for (ammo, lane) in lanes {
        if let Some(profile) = presets.get(ammo) {
            println!("[FIRE] {} on lane y={}", ammo, lane);
            fire.write(FireEvent::new(profile, Vec2::new(0.0, lane), Vec2::X));
        }
    }
}

/// Plays the collision layer: walls are infinite vertical lines, dummies are
/// discs with a wider gate radius around them.
fn detect_contacts(
    pool: Res<ProjectilePool>,
    walls: Query<(Entity, &EntityTag), Without<Dummy>>,
    dummies: Query<(Entity, &Dummy)>,
    mut contacts: MessageWriter<ContactEvent>,
    mut gates: MessageWriter<GateOverlapEvent>,
    mut overlapping: Local<HashSet<(ProjectileHandle, Entity)>>,
) {
    let Some((wall, _)) = walls.iter().find(|(_, tag)| **tag == EntityTag::Obstacle) else {
        return;
    };

    for (handle, projectile) in pool.iter_live() {
        let position = projectile.position();
        let direction = projectile.direction();

        let wall_normal = if position.x >= WALL_X && direction.x > 0.0 {
            Some(Vec2::NEG_X)
        } else if position.x <= BACK_WALL_X && direction.x < 0.0 {
            Some(Vec2::X)
        } else {
            None
        };
        if let Some(normal) = wall_normal {
            contacts.write(ContactEvent {
                projectile: handle,
                other: wall,
                tag: EntityTag::Obstacle,
                point: position,
                normal,
            });
        }

        for (entity, dummy) in &dummies {
            let distance = position.distance(dummy.position);
            let inside = distance < GATE_RADIUS;
            let key = (handle, entity);

            if inside && overlapping.insert(key) {
                gates.write(GateOverlapEvent {
                    projectile: handle,
                    other: entity,
                    tag: EntityTag::Target,
                    phase: GatePhase::Enter,
                });
            } else if !inside && overlapping.remove(&key) {
                gates.write(GateOverlapEvent {
                    projectile: handle,
                    other: entity,
                    tag: EntityTag::Target,
                    phase: GatePhase::Exit,
                });
            }

            if distance < HIT_RADIUS {
                contacts.write(ContactEvent {
                    projectile: handle,
                    other: entity,
                    tag: EntityTag::Target,
                    point: position,
                    normal: (position - dummy.position).normalize_or(Vec2::NEG_X),
                });
            }
        }
    }

    overlapping.retain(|(handle, _)| pool.get(*handle).is_some());
}

fn report_events(
    mut hits: MessageReader<HitEvent>,
    mut ricochets: MessageReader<RicochetEvent>,
    mut despawns: MessageReader<DespawnEvent>,
    names: Query<&Name>,
) {
    let name_of = |entity: Entity| {
        names
            .get(entity)
            .map(|n| n.as_str().to_owned())
            .unwrap_or_else(|_| format!("{entity}"))
    };

    for hit in hits.read() {
        println!(
            "[HIT] {:?} -> {} for {:.1} ({})",
            hit.projectile,
            name_of(hit.target),
            hit.damage,
            if hit.penetrated { "penetrated" } else { "stopped" }
        );
    }
    for ricochet in ricochets.read() {
        println!(
            "[RICOCHET] {:?} off {} at ({:.1}, {:.1}), bounce #{}",
            ricochet.projectile,
            name_of(ricochet.surface),
            ricochet.impact_point.x,
            ricochet.impact_point.y,
            ricochet.bounce_count
        );
    }
    for despawn in despawns.read() {
        println!(
            "[DESPAWN] {:?} at ({:.1}, {:.1}): {:?}",
            despawn.projectile, despawn.position.x, despawn.position.y, despawn.reason
        );
    }
}

fn finish_when_done(
    time: Res<Time>,
    pool: Res<ProjectilePool>,
    dummies: Query<(&Name, &Health), With<Dummy>>,
    mut exit: MessageWriter<AppExit>,
) {
    if time.elapsed_secs() < 0.5 || (pool.live_count() > 0 && time.elapsed_secs() < 5.0) {
        return;
    }

    println!("\n[FINISHED] Simulation complete.");
    for (name, health) in &dummies {
        println!("  {}: {:.1}/{:.1} hp", name, health.current, health.max);
    }
    exit.write(AppExit::Success);
}
