//! # cursor-trail
//!
//! A cursor-following particle trail with a feedback-buffer afterimage,
//! rendered in real time with wgpu.
//!
//! The crate has two halves. The core (pointer tracking, the particle pool
//! and simulation, the ping-pong trail accumulator and the per-frame
//! orchestrator) is plain Rust behind small traits, so it runs and tests
//! without a GPU. The [`gpu`] and [`app`] modules implement those traits
//! with wgpu and winit and ship a runnable demo.
//!
//! ## Quick Start
//!
//! ```ignore
//! use cursor_trail::prelude::*;
//!
//! fn main() -> Result<(), AppError> {
//!     let options = CursorTrailOptions::from_preset(PerformancePreset::Medium);
//!     App::new(options).run()
//! }
//! ```
//!
//! ## Driving the core yourself
//!
//! ```ignore
//! let particles = ParticleSystem::new(5000, ParticleConfig::default());
//! let mut effect = CursorTrail::new(&mut backend, 1280, 720, particles)?;
//!
//! // Event loop:
//! effect.on_pointer_move(x, y);
//!
//! // Every frame:
//! let report = effect.advance(&mut backend);
//! effect.composite(&mut compositor);
//! ```
//!
//! ## Core Concepts
//!
//! ### Pointer
//!
//! [`PointerTracker`] eases toward the latest pointer position and reports a
//! normalized speed in `[0, 1]` relative to a slowly decaying maximum.
//!
//! ### Particles
//!
//! [`ParticleSystem`] owns a fixed-capacity [`ParticlePool`]. Each frame it
//! emits `emission_rate` particles at the pointer (dropping any that do not
//! fit) and advances every live particle. Faster pointer movement means
//! faster, brighter particles.
//!
//! ### Trail
//!
//! [`TrailAccumulator`] swaps two off-screen surfaces every frame, blending
//! the previous frame with fresh ink under the pointer.
//!
//! ## Configuration
//!
//! | Setting | Default | Range |
//! |---------|---------|-------|
//! | `emissionRate` | 15 | 1 to 50 |
//! | `particleLifetime` | 2.5 s | at least 1 ms |
//! | `particleSize` | 1.0 | non-negative |
//! | `velocitySpread` | 1.0 | non-negative |
//! | `drag` | 0.97 | 0 to 1 |
//! | `speedBasedBrightness` | true | |
//! | `brightnessMultiplier` | 2.0 | non-negative |
//! | `minBrightness` | 0.2 | non-negative |
//!
//! Options load from JSON with [`CursorTrailOptions::load`].

pub mod app;
pub mod camera;
pub mod config;
pub mod error;
pub mod frame;
pub mod gpu;
pub mod particle;
pub mod pointer;
pub mod pool;
pub mod system;
pub mod time;
pub mod trail;

pub use bytemuck;
pub use camera::{PerspectiveCamera, ViewCamera};
pub use config::{CursorTrailOptions, ParticleConfig, PerformancePreset};
pub use error::{AppError, ConfigError, GpuError, SurfaceError};
pub use frame::{Compositor, CursorTrail, FrameReport};
pub use glam::{Vec2, Vec3};
pub use particle::{Particle, ParticleVertex};
pub use pointer::{PointerSample, PointerTracker};
pub use pool::ParticlePool;
pub use system::{EmissionNoise, EmitReport, ParticleSystem, ParticleUniforms, TickReport};
pub use time::{FrameClock, FrameTime};
pub use trail::{SurfaceSize, TrailAccumulator, TrailBackend, TrailUniforms};

/// Convenient re-exports for common usage.
///
/// # Usage
///
/// ```ignore
/// use cursor_trail::prelude::*;
/// ```
pub mod prelude {
    pub use crate::app::App;
    pub use crate::camera::{PerspectiveCamera, ViewCamera};
    pub use crate::config::{CursorTrailOptions, ParticleConfig, PerformancePreset};
    pub use crate::error::{AppError, SurfaceError};
    pub use crate::frame::{Compositor, CursorTrail, FrameReport};
    pub use crate::pointer::PointerTracker;
    pub use crate::system::{EmissionNoise, ParticleSystem};
    pub use crate::time::FrameClock;
    pub use crate::trail::{TrailAccumulator, TrailBackend};
    pub use crate::{Vec2, Vec3};
}
