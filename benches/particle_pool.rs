//! Benchmarks for CPU-side particle emission and simulation.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::{Vec2, Vec3};

use cursor_trail::camera::PerspectiveCamera;
use cursor_trail::config::ParticleConfig;
use cursor_trail::pointer::PointerTracker;
use cursor_trail::system::ParticleSystem;

fn saturated(capacity: usize) -> ParticleSystem {
    let mut config = ParticleConfig::default();
    config.set_emission_rate(50);
    config.set_particle_lifetime(1000.0);
    let mut system = ParticleSystem::with_seed(capacity, config, 1);
    while system.active_count() < capacity {
        system.emit(Vec3::ZERO, 0.5);
    }
    system
}

fn bench_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick");

    for capacity in [1_000usize, 5_000, 10_000] {
        group.bench_with_input(BenchmarkId::new("full_pool", capacity), &capacity, |b, &capacity| {
            let mut system = saturated(capacity);
            b.iter(|| black_box(system.tick(0.016)))
        });
    }

    group.finish();
}

fn bench_emit(c: &mut Criterion) {
    let mut group = c.benchmark_group("emit");

    group.bench_function("rate_50_with_recycling", |b| {
        let mut config = ParticleConfig::default();
        config.set_emission_rate(50);
        config.set_particle_lifetime(0.05);
        let mut system = ParticleSystem::with_seed(5_000, config, 2);
        b.iter(|| {
            let report = system.emit(black_box(Vec3::new(0.1, 0.2, 0.0)), 0.8);
            system.tick(0.016);
            black_box(report)
        })
    });

    group.bench_function("into_full_pool", |b| {
        let mut system = saturated(5_000);
        b.iter(|| black_box(system.emit(Vec3::ZERO, 1.0)))
    });

    group.bench_function("from_screen", |b| {
        let mut config = ParticleConfig::default();
        config.set_particle_lifetime(0.05);
        let mut system = ParticleSystem::with_seed(5_000, config, 3);
        let camera = PerspectiveCamera::new(16.0 / 9.0);
        let viewport = Vec2::new(1920.0, 1080.0);
        b.iter(|| {
            let report = system.emit_from_screen(&camera, Vec2::new(640.0, 200.0), viewport, 0.5);
            system.tick(0.016);
            black_box(report)
        })
    });

    group.finish();
}

fn bench_pointer(c: &mut Criterion) {
    c.bench_function("pointer_tick", |b| {
        let mut pointer = PointerTracker::new();
        let mut x = 0.0f32;
        b.iter(|| {
            x = (x + 7.0) % 1920.0;
            pointer.on_input(x, 540.0);
            pointer.tick();
            black_box(pointer.normalized_velocity())
        })
    });
}

criterion_group!(benches, bench_tick, bench_emit, bench_pointer);
criterion_main!(benches);
