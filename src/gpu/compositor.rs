//! Records the final image into a command encoder.

use super::particle_pass::ParticlePass;
use super::target::RenderTarget;
use super::trail_pass::DisplayPass;
use crate::camera::PerspectiveCamera;
use crate::frame::Compositor;
use crate::system::ParticleSystem;

/// Background colour behind the trail.
pub const BACKGROUND: wgpu::Color = wgpu::Color {
    r: 0.02,
    g: 0.02,
    b: 0.05,
    a: 1.0,
};

/// [`Compositor`] over one swapchain view.
///
/// Each call records its own render pass; the caller submits the encoder
/// and presents afterwards.
pub struct ScreenCompositor<'a> {
    encoder: &'a mut wgpu::CommandEncoder,
    view: &'a wgpu::TextureView,
    display: &'a DisplayPass,
    particles: &'a ParticlePass,
    camera: &'a PerspectiveCamera,
}

impl<'a> ScreenCompositor<'a> {
    pub fn new(
        encoder: &'a mut wgpu::CommandEncoder,
        view: &'a wgpu::TextureView,
        display: &'a DisplayPass,
        particles: &'a ParticlePass,
        camera: &'a PerspectiveCamera,
    ) -> Self {
        Self {
            encoder,
            view,
            display,
            particles,
            camera,
        }
    }
}

impl Compositor<RenderTarget> for ScreenCompositor<'_> {
    fn clear(&mut self) {
        let _pass = self.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Clear Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: self.view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(BACKGROUND),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
    }

    fn draw_trail(&mut self, trail: &RenderTarget) {
        self.display.draw(self.encoder, self.view, trail);
    }

    fn draw_particles(&mut self, particles: &ParticleSystem) {
        self.particles.prepare(particles, self.camera);
        self.particles.draw(self.encoder, self.view);
    }
}
