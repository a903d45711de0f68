//! Per-frame orchestration.
//!
//! [`CursorTrail`] owns every piece of frame state: the pointer tracker, the
//! particle system, the trail accumulator, the camera and the clock. One
//! call to [`CursorTrail::advance`] runs a frame's simulation in a fixed
//! order:
//!
//! 1. tick the pointer tracker,
//! 2. read its smoothed position and normalized speed,
//! 3. emit at the pointer, then tick the particles,
//! 4. compose the trail with the pointer (flipped to a bottom-left origin)
//!    and elapsed time.
//!
//! [`CursorTrail::composite`] then draws the result through a
//! [`Compositor`]: clear, trail output, particles on top.

use glam::Vec2;
use winit::event::WindowEvent;

use crate::camera::PerspectiveCamera;
use crate::config::CursorTrailOptions;
use crate::error::SurfaceError;
use crate::pointer::{PointerSample, PointerTracker};
use crate::system::{EmitReport, ParticleSystem, TickReport};
use crate::time::{FrameClock, FrameTime};
use crate::trail::{TrailAccumulator, TrailBackend};

/// Draw operations for the final image, in call order.
pub trait Compositor<S> {
    /// Clear the output.
    fn clear(&mut self);

    /// Draw the trail's most recent frame as a full-screen layer.
    fn draw_trail(&mut self, trail: &S);

    /// Draw live particles over whatever is already there.
    fn draw_particles(&mut self, particles: &ParticleSystem);
}

/// What happened during one frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameReport {
    pub time: FrameTime,
    pub pointer: PointerSample,
    pub emit: EmitReport,
    pub tick: TickReport,
    /// Live particles after the tick.
    pub active: usize,
}

/// The whole effect: pointer, particles and trail, advanced together.
pub struct CursorTrail<S> {
    pointer: PointerTracker,
    particles: ParticleSystem,
    trail: TrailAccumulator<S>,
    camera: PerspectiveCamera,
    clock: FrameClock,
    viewport: Vec2,
}

impl<S> CursorTrail<S> {
    /// Assemble the effect for a `width` x `height` viewport in pixels.
    pub fn new<B>(
        backend: &mut B,
        width: u32,
        height: u32,
        particles: ParticleSystem,
    ) -> Result<Self, SurfaceError>
    where
        B: TrailBackend<Surface = S> + ?Sized,
    {
        let trail = TrailAccumulator::new(backend, width, height)?;
        let mut camera = PerspectiveCamera::default();
        camera.set_aspect(width, height);

        Ok(Self {
            pointer: PointerTracker::new(),
            particles,
            trail,
            camera,
            clock: FrameClock::new(),
            viewport: Vec2::new(width as f32, height as f32),
        })
    }

    /// Build from options. `native_pixel_ratio` is the display's scale factor.
    pub fn from_options<B>(
        backend: &mut B,
        width: u32,
        height: u32,
        options: &CursorTrailOptions,
        native_pixel_ratio: f32,
    ) -> Result<Self, SurfaceError>
    where
        B: TrailBackend<Surface = S> + ?Sized,
    {
        let mut particles = ParticleSystem::new(options.max_particles(), options.particles.clone());
        particles.set_pixel_ratio(options.pixel_ratio(native_pixel_ratio));
        Self::new(backend, width, height, particles)
    }

    /// Replace the clock, e.g. with [`FrameClock::fixed`].
    pub fn with_clock(mut self, clock: FrameClock) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the pointer tracker.
    pub fn with_pointer(mut self, pointer: PointerTracker) -> Self {
        self.pointer = pointer;
        self
    }

    /// Record a raw pointer position in pixels, top-left origin.
    pub fn on_pointer_move(&mut self, x: f32, y: f32) {
        self.pointer.on_input(x, y);
    }

    /// Feed a window event to the pointer tracker.
    pub fn handle_event(&mut self, event: &WindowEvent) -> bool {
        self.pointer.handle_event(event)
    }

    /// Run one frame of simulation. See the module docs for the order.
    pub fn advance<B>(&mut self, backend: &mut B) -> FrameReport
    where
        B: TrailBackend<Surface = S> + ?Sized,
    {
        let time = self.clock.tick();

        self.pointer.tick();
        let pointer = self.pointer.sample();

        let emit = self.particles.emit_from_screen(
            &self.camera,
            pointer.position,
            self.viewport,
            pointer.normalized_velocity,
        );
        let tick = self.particles.tick(time.delta);
        self.particles.update_time(time.elapsed);

        let flipped = Vec2::new(pointer.position.x, self.viewport.y - pointer.position.y);
        self.trail.update(backend, flipped, time.elapsed);

        let report = FrameReport {
            time,
            pointer,
            emit,
            tick,
            active: self.particles.active_count(),
        };
        log::trace!(
            "frame {}: speed {:.2}, emitted {}, dropped {}, expired {}, live {}",
            time.frame,
            pointer.normalized_velocity,
            emit.emitted,
            emit.dropped,
            tick.expired,
            report.active
        );
        report
    }

    /// Draw the current state: clear, trail, then particles.
    pub fn composite<C>(&self, compositor: &mut C)
    where
        C: Compositor<S> + ?Sized,
    {
        compositor.clear();
        if let Some(output) = self.trail.output() {
            compositor.draw_trail(output);
        }
        compositor.draw_particles(&self.particles);
    }

    /// [`advance`](Self::advance) then [`composite`](Self::composite).
    pub fn frame<B, C>(&mut self, backend: &mut B, compositor: &mut C) -> FrameReport
    where
        B: TrailBackend<Surface = S> + ?Sized,
        C: Compositor<S> + ?Sized,
    {
        let report = self.advance(backend);
        self.composite(compositor);
        report
    }

    /// Follow a viewport resize. The trail restarts empty.
    pub fn resize<B>(&mut self, backend: &mut B, width: u32, height: u32) -> Result<(), SurfaceError>
    where
        B: TrailBackend<Surface = S> + ?Sized,
    {
        self.trail.resize(backend, width, height)?;
        self.camera.set_aspect(width, height);
        self.viewport = Vec2::new(width as f32, height as f32);
        Ok(())
    }

    /// Release the trail surfaces. Later frames still simulate particles.
    pub fn dispose<B>(&mut self, backend: &mut B)
    where
        B: TrailBackend<Surface = S> + ?Sized,
    {
        self.trail.dispose(backend);
    }

    pub fn pointer(&self) -> &PointerTracker {
        &self.pointer
    }

    pub fn particles(&self) -> &ParticleSystem {
        &self.particles
    }

    /// Mutable access for live tuning.
    pub fn particles_mut(&mut self) -> &mut ParticleSystem {
        &mut self.particles
    }

    pub fn trail(&self) -> &TrailAccumulator<S> {
        &self.trail
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    pub fn clock_mut(&mut self) -> &mut FrameClock {
        &mut self.clock
    }

    /// Viewport size in pixels.
    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }
}
