//! Benchmark for simulation tick throughput.

use std::collections::HashMap;
use std::sync::Arc;

use bevy::prelude::*;
use bevy_ricochet::prelude::*;
use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};

fn populated_pool(count: usize) -> (ProjectilePool, Vec<ProjectileHandle>) {
    let profile = Arc::new(
        BallisticProfile::new("bench", 10.0, 20.0, 1.0e9)
            .with_max_bounces(3)
            .with_max_penetrations(3),
    );
    let mut pool = ProjectilePool::new(count);
    let handles = (0..count)
        .map(|i| {
            let angle = i as f32 * 0.01;
            pool.spawn(profile.clone(), Vec2::ZERO, Vec2::from_angle(angle))
                .unwrap()
        })
        .collect();
    (pool, handles)
}

fn benchmark_free_flight(c: &mut Criterion) {
    let config = RicochetConfig::default();
    let mut group = c.benchmark_group("Tick Free Flight");

    for count in [100, 1000, 10000] {
        let (mut pool, _) = populated_pool(count);
        let mut step = SimulationStep::default();
        let mut healths: HashMap<Entity, Health> = HashMap::new();

        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            b.iter(|| step.tick(&mut pool, 1.0 / 60.0, &mut healths, &config));
        });
    }

    group.finish();
}

fn benchmark_contacts(c: &mut Criterion) {
    let config = RicochetConfig::default();
    let mut world = World::new();
    let wall = world.spawn(EntityTag::Obstacle).id();
    let target = world.spawn(EntityTag::Target).id();

    let mut group = c.benchmark_group("Tick With Contacts");

    for count in [100, 1000, 10000] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            b.iter_batched(
                || {
                    let (pool, handles) = populated_pool(count);
                    let mut step = SimulationStep::default();
                    for (i, handle) in handles.into_iter().enumerate() {
                        let (other, tag) = if i % 2 == 0 {
                            (wall, EntityTag::Obstacle)
                        } else {
                            (target, EntityTag::Target)
                        };
                        step.push_contact(
                            handle,
                            Contact {
                                other,
                                tag,
                                point: Vec2::ZERO,
                                normal: Vec2::NEG_X,
                            },
                        );
                    }
                    let mut healths = HashMap::new();
                    healths.insert(target, Health::new(f32::MAX));
                    (pool, step, healths)
                },
                |(mut pool, mut step, mut healths)| {
                    step.tick(&mut pool, 1.0 / 60.0, &mut healths, &config)
                },
                BatchSize::LargeInput,
            );
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_free_flight, benchmark_contacts);
criterion_main!(benches);
