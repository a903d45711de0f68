//! Integration tests for the pointer, particle and trail pipeline.
//!
//! Everything here runs on the CPU: the trail and compositor are driven
//! through small in-memory backends.

use std::collections::HashMap;

use cursor_trail::prelude::*;
use cursor_trail::{PointerSample, SurfaceSize, TrailUniforms};

// ============================================================================
// Helpers
// ============================================================================

fn config(rate: i64, lifetime: f32) -> ParticleConfig {
    let mut config = ParticleConfig::default();
    config.set_emission_rate(rate);
    config.set_particle_lifetime(lifetime);
    config
}

/// Surfaces hold a single brightness; compose fades by half and adds ink.
#[derive(Default)]
struct MemoryBackend {
    next: u32,
    values: HashMap<u32, f32>,
    sizes: HashMap<u32, SurfaceSize>,
    released: usize,
    mice: Vec<[f32; 2]>,
}

impl TrailBackend for MemoryBackend {
    type Surface = u32;

    fn create_surface(&mut self, size: SurfaceSize) -> Result<u32, SurfaceError> {
        self.next += 1;
        self.values.insert(self.next, 0.0);
        self.sizes.insert(self.next, size);
        Ok(self.next)
    }

    fn compose(&mut self, previous: &u32, target: &u32, uniforms: &TrailUniforms) {
        let faded = self.values[previous] * 0.5;
        self.values.insert(*target, faded + 1.0);
        self.mice.push(uniforms.mouse);
    }

    fn release(&mut self, surface: u32) {
        self.values.remove(&surface);
        self.released += 1;
    }
}

#[derive(Default)]
struct CallLog(Vec<&'static str>);

impl Compositor<u32> for CallLog {
    fn clear(&mut self) {
        self.0.push("clear");
    }

    fn draw_trail(&mut self, _trail: &u32) {
        self.0.push("trail");
    }

    fn draw_particles(&mut self, _particles: &ParticleSystem) {
        self.0.push("particles");
    }
}

// ============================================================================
// Particle system
// ============================================================================

#[test]
fn test_capacity_two_rate_three_drops_one() {
    let mut system = ParticleSystem::with_seed(2, config(3, 1.0), 11);
    let report = system.emit(Vec3::ZERO, 0.0);
    assert_eq!(report.emitted, 2);
    assert_eq!(report.dropped, 1);
    assert_eq!(system.active_count(), 2);
}

#[test]
fn test_lifetime_one_second_dies_on_second_half_second_tick() {
    let mut system = ParticleSystem::with_seed(4, config(1, 1.0), 5);
    system.emit(Vec3::ZERO, 0.0);

    system.tick(0.5);
    assert_eq!(system.active_count(), 1);
    system.tick(0.5);
    assert_eq!(system.active_count(), 0);
}

#[test]
fn test_active_count_never_exceeds_capacity() {
    let mut system = ParticleSystem::with_seed(64, config(50, 0.3), 8);
    for frame in 0..200 {
        let speed = (frame % 10) as f32 / 10.0;
        let report = system.emit(Vec3::new(0.0, frame as f32 * 0.01, 0.0), speed);
        assert!(system.active_count() <= system.capacity());
        assert_eq!(report.emitted + report.dropped, 50);
        system.tick(0.016);
        assert!(system.active_count() <= system.capacity());
    }
}

#[test]
fn test_lifetime_is_non_decreasing_until_release() {
    let mut system = ParticleSystem::with_seed(8, config(8, 0.1), 2);
    system.emit(Vec3::ZERO, 0.0);

    let mut last: Vec<f32> = system.pool().particles().iter().map(|p| p.lifetime).collect();
    for _ in 0..10 {
        system.tick(0.016);
        for (i, p) in system.pool().particles().iter().enumerate() {
            if p.active {
                assert!(p.lifetime >= last[i]);
                assert!(p.lifetime < 1.0);
            }
            last[i] = p.lifetime;
        }
    }
}

#[test]
fn test_drag_matches_geometric_decay() {
    let mut system = ParticleSystem::with_seed(1, config(1, 10.0), 4).with_noise(EmissionNoise::none());
    system.emit(Vec3::ZERO, 0.0);
    let v0 = system.pool().get(0).map(|p| p.velocity.length()).unwrap_or_default();

    for n in 1..=20 {
        system.tick(0.01);
        let v = system.pool().get(0).map(|p| p.velocity.length()).unwrap_or_default();
        let expected = v0 * 0.97f32.powi(n);
        assert!((v - expected).abs() < 1e-6, "tick {n}: {v} vs {expected}");
    }
}

#[test]
fn test_released_slots_are_hidden_from_draw() {
    let mut system = ParticleSystem::with_seed(3, config(3, 0.5), 6);
    system.emit(Vec3::ONE, 0.0);
    system.tick(0.25);
    assert!(system.vertices().iter().all(|v| !v.is_hidden()));
    system.tick(0.25);
    assert!(system.vertices().iter().all(|v| v.is_hidden()));
}

#[test]
fn test_emission_rate_clamps_through_config_json() {
    let config = ParticleConfig::from_json(r#"{"emissionRate": 500, "drag": 0.9}"#).unwrap();
    assert_eq!(config.emission_rate(), 50);
    assert_eq!(config.drag(), 0.9);
}

// ============================================================================
// Pointer
// ============================================================================

#[test]
fn test_pointer_speed_is_zero_before_input_and_bounded_after() {
    let mut pointer = PointerTracker::new();
    assert_eq!(pointer.normalized_velocity(), 0.0);

    for i in 0..100 {
        pointer.on_input((i * 37 % 800) as f32, (i * 53 % 600) as f32);
        pointer.tick();
        let n = pointer.normalized_velocity();
        assert!((0.0..=1.0).contains(&n));
    }
}

#[test]
fn test_stationary_pointer_speed_falls_well_below_ceiling() {
    let mut pointer = PointerTracker::new();
    pointer.on_input(500.0, 500.0);
    for _ in 0..10 {
        pointer.tick();
    }
    let ceiling = pointer.max_velocity();
    for _ in 0..60 {
        pointer.tick();
    }
    assert!(pointer.velocity() < ceiling * 0.1);
    assert!(pointer.max_velocity() > ceiling * 0.9);
}

// ============================================================================
// Trail and frame orchestration
// ============================================================================

#[test]
fn test_trail_resize_clears_and_resizes_both_surfaces() {
    let mut backend = MemoryBackend::default();
    let mut trail = TrailAccumulator::new(&mut backend, 320, 240).unwrap();
    for _ in 0..4 {
        trail.update(&mut backend, Vec2::new(10.0, 10.0), 0.0);
    }
    assert!(backend.values[trail.output().unwrap()] > 1.0);

    trail.resize(&mut backend, 640, 480).unwrap();

    let size = SurfaceSize::new(640, 480).unwrap();
    assert_eq!(backend.released, 2);
    assert_eq!(backend.values.len(), 2);
    for (id, value) in &backend.values {
        assert_eq!(*value, 0.0);
        assert_eq!(backend.sizes[id], size);
    }
}

#[test]
fn test_full_frames_run_in_order() {
    let mut backend = MemoryBackend::default();
    let particles = ParticleSystem::with_seed(500, config(10, 1.0), 21);
    let mut effect = CursorTrail::new(&mut backend, 400, 300, particles)
        .unwrap()
        .with_clock(FrameClock::fixed(1.0 / 60.0));

    let mut log = CallLog::default();
    let mut last = PointerSample::default();
    for i in 0..30 {
        effect.on_pointer_move(10.0 * i as f32, 150.0);
        let report = effect.frame(&mut backend, &mut log);
        assert_eq!(report.emit.emitted, 10);
        assert!(report.pointer.position.x >= last.position.x);
        last = report.pointer;
    }

    assert_eq!(log.0.len(), 90);
    for chunk in log.0.chunks(3) {
        assert_eq!(chunk, ["clear", "trail", "particles"]);
    }
    assert_eq!(effect.particles().active_count(), 300);
    assert_eq!(effect.trail().frame(), 30);
}

#[test]
fn test_trail_receives_bottom_left_pointer() {
    let mut backend = MemoryBackend::default();
    let particles = ParticleSystem::with_seed(10, config(1, 1.0), 1);
    let mut effect = CursorTrail::new(&mut backend, 200, 100, particles)
        .unwrap()
        .with_pointer(PointerTracker::new().with_smoothness(1.0))
        .with_clock(FrameClock::fixed(0.016));

    effect.on_pointer_move(20.0, 30.0);
    effect.advance(&mut backend);
    assert_eq!(backend.mice, vec![[20.0, 70.0]]);
}

#[test]
fn test_options_build_a_sized_pool() {
    let mut backend = MemoryBackend::default();
    let options = CursorTrailOptions::from_preset(PerformancePreset::Low);
    let effect = CursorTrail::from_options(&mut backend, 100, 100, &options, 2.0).unwrap();
    assert_eq!(effect.particles().capacity(), 1000);
    assert_eq!(effect.particles().config().emission_rate(), 5);
    assert_eq!(effect.particles().uniforms().pixel_ratio, 1.0);
}
