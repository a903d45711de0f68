//! Off-screen colour targets for the trail.

use crate::error::SurfaceError;
use crate::trail::SurfaceSize;

/// Texture format of trail surfaces.
pub const TRAIL_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// A colour texture that can be rendered to and sampled from.
pub struct RenderTarget {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    size: SurfaceSize,
}

impl RenderTarget {
    /// Allocate a target, reporting device errors instead of panicking.
    ///
    /// The allocation runs inside out-of-memory and validation error
    /// scopes; either kind of failure becomes [`SurfaceError::Allocation`].
    pub fn new(device: &wgpu::Device, size: SurfaceSize, label: &str) -> Result<Self, SurfaceError> {
        let limit = device.limits().max_texture_dimension_2d;
        if size.width() > limit || size.height() > limit {
            return Err(SurfaceError::TooLarge {
                width: size.width(),
                height: size.height(),
                limit,
            });
        }

        device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: size.width(),
                height: size.height(),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: TRAIL_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });

        let validation = pollster::block_on(device.pop_error_scope());
        let out_of_memory = pollster::block_on(device.pop_error_scope());
        if let Some(err) = validation.or(out_of_memory) {
            texture.destroy();
            return Err(SurfaceError::Allocation(err.to_string()));
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Ok(Self { texture, view, size })
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    pub fn texture(&self) -> &wgpu::Texture {
        &self.texture
    }

    pub fn size(&self) -> SurfaceSize {
        self.size
    }

    /// Free the GPU memory now rather than when the last handle drops.
    pub fn destroy(self) {
        self.texture.destroy();
    }
}

/// Linear, clamped sampler for reading trail targets.
pub(crate) fn linear_sampler(device: &wgpu::Device, label: &str) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some(label),
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::FilterMode::Nearest,
        ..Default::default()
    })
}
