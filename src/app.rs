//! Windowed demo driving [`CursorTrail`] with winit and wgpu.
//!
//! Keys: `Space` pauses the clock, `R` clears all particles, `Up`/`Down`
//! change the emission rate, `Escape` quits.

use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{Key, NamedKey},
    window::{Window, WindowId},
};

use crate::config::CursorTrailOptions;
use crate::error::AppError;
use crate::frame::CursorTrail;
use crate::gpu::{DisplayPass, GpuContext, ParticlePass, RenderTarget, ScreenCompositor, TrailPass};

/// Everything that exists once the window and device are up.
struct RenderState {
    gpu: GpuContext,
    trail_pass: TrailPass,
    display: DisplayPass,
    particle_pass: ParticlePass,
    effect: CursorTrail<RenderTarget>,
}

impl RenderState {
    async fn new(window: Arc<Window>, options: &CursorTrailOptions) -> Result<Self, AppError> {
        let scale_factor = window.scale_factor() as f32;
        let gpu = GpuContext::new(window).await?;
        let (width, height) = gpu.size();

        let mut trail_pass = TrailPass::new(gpu.device.clone(), gpu.queue.clone());
        let display = DisplayPass::new(gpu.device.clone(), gpu.format());
        let particle_pass = ParticlePass::new(
            &gpu.device,
            gpu.queue.clone(),
            gpu.format(),
            options.max_particles(),
        );
        let effect = CursorTrail::from_options(&mut trail_pass, width, height, options, scale_factor)?;

        log::info!(
            "cursor trail ready: {}x{}, {} particles, {:?} preset",
            width,
            height,
            options.max_particles(),
            options.preset
        );

        Ok(Self {
            gpu,
            trail_pass,
            display,
            particle_pass,
            effect,
        })
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<(), AppError> {
        if width == 0 || height == 0 {
            // Minimized; keep the old surfaces until a real size arrives
            return Ok(());
        }
        self.gpu.resize(width, height);
        self.effect.resize(&mut self.trail_pass, width, height)?;
        Ok(())
    }

    fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        self.effect.advance(&mut self.trail_pass);

        let output = self.gpu.acquire()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });
        {
            let mut compositor = ScreenCompositor::new(
                &mut encoder,
                &view,
                &self.display,
                &self.particle_pass,
                self.effect.camera(),
            );
            self.effect.composite(&mut compositor);
        }

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }

    fn dispose(&mut self) {
        self.effect.dispose(&mut self.trail_pass);
    }
}

/// winit application hosting the effect.
pub struct App {
    options: CursorTrailOptions,
    window: Option<Arc<Window>>,
    state: Option<RenderState>,
    error: Option<AppError>,
}

impl App {
    pub fn new(options: CursorTrailOptions) -> Self {
        Self {
            options,
            window: None,
            state: None,
            error: None,
        }
    }

    /// Create the event loop and run until the window closes.
    pub fn run(mut self) -> Result<(), AppError> {
        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);
        event_loop.run_app(&mut self)?;

        match self.error.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: AppError) {
        self.error = Some(err);
        self.shutdown(event_loop);
    }

    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(state) = &mut self.state {
            state.dispose();
        }
        event_loop.exit();
    }

    fn handle_key(&mut self, event_loop: &ActiveEventLoop, event: &KeyEvent) {
        if event.state != ElementState::Pressed {
            return;
        }
        match &event.logical_key {
            Key::Named(NamedKey::Escape) => self.shutdown(event_loop),
            Key::Named(NamedKey::Space) => {
                if let Some(state) = &mut self.state {
                    state.effect.clock_mut().toggle_pause();
                }
            }
            Key::Named(NamedKey::ArrowUp) | Key::Named(NamedKey::ArrowDown) => {
                if let Some(state) = &mut self.state {
                    let step = if event.logical_key == Key::Named(NamedKey::ArrowUp) { 1 } else { -1 };
                    let particles = state.effect.particles_mut();
                    let rate = particles.config().emission_rate() as i64 + step;
                    particles.set_emission_rate(rate);
                    log::info!("emission rate: {}", particles.config().emission_rate());
                }
            }
            Key::Character(c) if c.eq_ignore_ascii_case("r") => {
                if let Some(state) = &mut self.state {
                    state.effect.particles_mut().reset();
                }
            }
            _ => {}
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attrs = Window::default_attributes()
            .with_title("Cursor Trail")
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));

        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => Arc::new(window),
            Err(err) => return self.fail(event_loop, err.into()),
        };
        self.window = Some(window.clone());

        match pollster::block_on(RenderState::new(window, &self.options)) {
            Ok(state) => self.state = Some(state),
            Err(err) => self.fail(event_loop, err),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        if let Some(state) = &mut self.state {
            state.effect.handle_event(&event);
        }

        match event {
            WindowEvent::CloseRequested => self.shutdown(event_loop),
            WindowEvent::Resized(size) => {
                if let Some(state) = &mut self.state {
                    if let Err(err) = state.resize(size.width, size.height) {
                        self.fail(event_loop, err);
                    }
                }
            }
            WindowEvent::KeyboardInput { event, .. } => self.handle_key(event_loop, &event),
            WindowEvent::RedrawRequested => {
                if let Some(state) = &mut self.state {
                    match state.render() {
                        Ok(()) => {}
                        Err(wgpu::SurfaceError::OutOfMemory) => {
                            log::error!("surface out of memory");
                            self.shutdown(event_loop);
                        }
                        Err(e) => {
                            log::warn!("surface unavailable ({:?}), reconfiguring", e);
                            state.gpu.reconfigure();
                        }
                    }
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}
