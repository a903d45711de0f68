//! Pointer-driven particle emission and simulation.
//!
//! [`ParticleSystem`] owns a [`ParticlePool`], the live [`ParticleConfig`]
//! and a random source. Each frame the host calls [`ParticleSystem::emit`]
//! (or [`ParticleSystem::emit_from_screen`]) with the pointer's position and
//! normalized speed, then [`ParticleSystem::tick`] with the frame delta.
//!
//! # Emission
//!
//! Every emitted particle starts near the emission point with a random
//! planar direction. Its speed is a random base speed, scaled up by the
//! pointer speed when speed-based modulation is enabled:
//!
//! ```text
//! speed = base_speed * (1 + speed_factor * velocity_spread)
//! ```
//!
//! When the pool is saturated, the remaining emissions of that call are
//! dropped. Nothing is queued.
//!
//! # Integration
//!
//! Velocities are in world units per frame, not per second: each tick adds
//! the velocity to the position once, then applies drag and a touch of
//! turbulence. Only the lifetime advances with the real frame delta.

use glam::{Vec2, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::camera::{point_along_ray, screen_to_ndc, ViewCamera};
use crate::config::ParticleConfig;
use crate::particle::{Particle, ParticleVertex};
use crate::pool::ParticlePool;

/// Distance in front of the camera at which particles are emitted.
pub const EMISSION_DISTANCE: f32 = 3.0;

/// Random perturbation amplitudes applied at emission and each tick.
///
/// Each amplitude is the full width of a uniform distribution centred on
/// zero; `position_jitter = 0.02` means ±0.01 per axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmissionNoise {
    /// Spawn position offset per axis.
    pub position_jitter: f32,
    /// Extra vertical velocity at spawn.
    pub vertical_bias: f32,
    /// Depth velocity at spawn.
    pub depth_jitter: f32,
    /// Velocity noise added to x and y every tick.
    pub turbulence: f32,
    /// Lower bound of the base speed.
    pub min_speed: f32,
    /// Upper bound (exclusive) of the base speed.
    pub max_speed: f32,
}

impl Default for EmissionNoise {
    fn default() -> Self {
        Self {
            position_jitter: 0.02,
            vertical_bias: 0.01,
            depth_jitter: 0.01,
            turbulence: 0.0001,
            min_speed: 0.005,
            max_speed: 0.02,
        }
    }
}

impl EmissionNoise {
    /// No jitter, bias or turbulence. Base speed stays random.
    pub fn none() -> Self {
        Self {
            position_jitter: 0.0,
            vertical_bias: 0.0,
            depth_jitter: 0.0,
            turbulence: 0.0,
            ..Self::default()
        }
    }
}

/// Outcome of one emit call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EmitReport {
    /// Particles that got a slot.
    pub emitted: u32,
    /// Emissions dropped because the pool was full.
    pub dropped: u32,
}

/// Outcome of one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickReport {
    /// Particles advanced and still alive.
    pub updated: usize,
    /// Particles that reached the end of their life this tick.
    pub expired: usize,
}

/// Uniform block for the particle draw stage.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ParticleUniforms {
    pub time: f32,
    pub pixel_ratio: f32,
    pub speed_brightness: f32,
    pub brightness_multiplier: f32,
    pub min_brightness: f32,
    pub particle_size: f32,
    pub _pad: [f32; 2],
}

/// Pooled particle simulation driven by pointer position and speed.
pub struct ParticleSystem {
    pool: ParticlePool,
    config: ParticleConfig,
    noise: EmissionNoise,
    rng: StdRng,
    speed_brightness: f32,
    time: f32,
    pixel_ratio: f32,
}

impl ParticleSystem {
    /// Create a system with `max_particles` slots, seeded from the OS.
    pub fn new(max_particles: usize, config: ParticleConfig) -> Self {
        Self::with_rng(max_particles, config, StdRng::from_entropy())
    }

    /// Create a system with a fixed seed for reproducible runs.
    pub fn with_seed(max_particles: usize, config: ParticleConfig, seed: u64) -> Self {
        Self::with_rng(max_particles, config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(max_particles: usize, config: ParticleConfig, mut rng: StdRng) -> Self {
        let pool = ParticlePool::new(max_particles, &mut rng);
        log::debug!(
            "particle system: {} slots, {} per frame, {:.2}s lifetime",
            max_particles,
            config.emission_rate(),
            config.particle_lifetime()
        );
        Self {
            pool,
            config,
            noise: EmissionNoise::default(),
            rng,
            speed_brightness: 1.0,
            time: 0.0,
            pixel_ratio: 1.0,
        }
    }

    /// Replace the random perturbation amplitudes.
    pub fn with_noise(mut self, noise: EmissionNoise) -> Self {
        self.noise = noise;
        self
    }

    /// The live configuration.
    pub fn config(&self) -> &ParticleConfig {
        &self.config
    }

    /// Mutable access for control surfaces. Setters clamp.
    pub fn config_mut(&mut self) -> &mut ParticleConfig {
        &mut self.config
    }

    /// Set the emission rate, clamped to `[1, 50]`.
    pub fn set_emission_rate(&mut self, rate: i64) {
        self.config.set_emission_rate(rate);
    }

    /// The underlying pool.
    pub fn pool(&self) -> &ParticlePool {
        &self.pool
    }

    /// Pool capacity.
    pub fn capacity(&self) -> usize {
        self.pool.capacity()
    }

    /// Number of live particles.
    pub fn active_count(&self) -> usize {
        self.pool.active_count()
    }

    /// Brightness scalar set by the most recent emit call.
    pub fn speed_brightness(&self) -> f32 {
        self.speed_brightness
    }

    /// Elapsed time forwarded to the draw stage.
    pub fn update_time(&mut self, elapsed: f32) {
        self.time = elapsed;
    }

    /// Device pixel ratio forwarded to the draw stage.
    pub fn set_pixel_ratio(&mut self, ratio: f32) {
        self.pixel_ratio = ratio.max(0.0);
    }

    /// Uniform values for the draw stage.
    pub fn uniforms(&self) -> ParticleUniforms {
        ParticleUniforms {
            time: self.time,
            pixel_ratio: self.pixel_ratio,
            speed_brightness: self.speed_brightness,
            brightness_multiplier: self.config.brightness_multiplier(),
            min_brightness: self.config.min_brightness(),
            particle_size: self.config.particle_size(),
            _pad: [0.0; 2],
        }
    }

    /// Packed per-slot draw records.
    pub fn vertices(&self) -> &[ParticleVertex] {
        self.pool.vertices()
    }

    /// Emit `emission_rate` particles at a world position.
    ///
    /// `speed_factor` is the pointer's normalized speed in `[0, 1]`.
    pub fn emit(&mut self, world_position: Vec3, speed_factor: f32) -> EmitReport {
        self.speed_brightness = if self.config.speed_based_brightness() {
            self.config
                .min_brightness()
                .max(speed_factor * self.config.brightness_multiplier())
        } else {
            1.0
        };

        let mut report = EmitReport::default();
        for _ in 0..self.config.emission_rate() {
            if self.emit_one(world_position, speed_factor) {
                report.emitted += 1;
            } else {
                report.dropped += 1;
            }
        }

        if report.dropped > 0 {
            log::trace!("pool saturated, dropped {} emissions", report.dropped);
        }
        report
    }

    /// Emit at the world point under a screen-space pointer.
    ///
    /// `screen` is in pixels with a top-left origin; `viewport` is the
    /// drawable size in the same units. Particles are placed
    /// [`EMISSION_DISTANCE`] units along the camera ray through the pointer.
    pub fn emit_from_screen<C: ViewCamera + ?Sized>(
        &mut self,
        camera: &C,
        screen: Vec2,
        viewport: Vec2,
        speed_factor: f32,
    ) -> EmitReport {
        let ndc = screen_to_ndc(screen, viewport);
        let world = point_along_ray(camera, ndc, EMISSION_DISTANCE);
        self.emit(world, speed_factor)
    }

    fn emit_one(&mut self, origin: Vec3, speed_factor: f32) -> bool {
        let Some(index) = self.pool.acquire() else {
            return false;
        };

        let noise = self.noise;
        let rng = &mut self.rng;

        let jitter = Vec3::new(
            centered(rng, noise.position_jitter),
            centered(rng, noise.position_jitter),
            centered(rng, noise.position_jitter),
        );

        let angle = rng.gen_range(0.0..std::f32::consts::TAU);
        let base_speed = if noise.max_speed > noise.min_speed {
            rng.gen_range(noise.min_speed..noise.max_speed)
        } else {
            noise.min_speed
        };
        let multiplier = if self.config.speed_based_brightness() {
            1.0 + speed_factor * self.config.velocity_spread()
        } else {
            1.0
        };
        let speed = base_speed * multiplier;
        let vertical_bias = centered(rng, noise.vertical_bias);
        let depth = centered(rng, noise.depth_jitter);

        let particle = self.pool.slot_mut(index);
        particle.position = origin + jitter;
        particle.velocity = Vec3::new(
            angle.cos() * speed,
            angle.sin() * speed + vertical_bias,
            depth,
        );
        true
    }

    /// Advance every live particle by one frame.
    ///
    /// Particles whose normalized lifetime reaches 1.0 are released in this
    /// tick and their slots become available to the next emit call.
    pub fn tick(&mut self, delta_seconds: f32) -> TickReport {
        // A negative delta would make lifetimes run backwards
        let step = delta_seconds.max(0.0) / self.config.particle_lifetime();
        let drag = self.config.drag();
        let turbulence = self.noise.turbulence;
        let rng = &mut self.rng;

        let mut updated = 0;
        let expired = self.pool.update(|p: &mut Particle| {
            p.lifetime += step;
            if p.lifetime >= 1.0 {
                return false;
            }
            p.position += p.velocity;
            p.velocity *= drag;
            p.velocity.x += centered(rng, turbulence);
            p.velocity.y += centered(rng, turbulence);
            updated += 1;
            true
        });

        TickReport { updated, expired }
    }

    /// Release every live particle.
    pub fn reset(&mut self) {
        self.pool.clear();
    }
}

/// Uniform sample in `[-width/2, width/2)`; zero width draws nothing.
fn centered<R: Rng + ?Sized>(rng: &mut R, width: f32) -> f32 {
    if width == 0.0 {
        0.0
    } else {
        (rng.gen::<f32>() - 0.5) * width
    }
}
