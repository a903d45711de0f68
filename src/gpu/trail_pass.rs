//! Trail compose pass and the pass that puts a trail frame on screen.

use std::sync::Arc;

use super::target::{linear_sampler, RenderTarget, TRAIL_FORMAT};
use super::FULLSCREEN_VERTEX;
use crate::error::SurfaceError;
use crate::trail::{SurfaceSize, TrailBackend, TrailUniforms};

/// Fades the previous frame and stamps soft ink under the pointer.
const TRAIL_FRAGMENT: &str = r#"
struct TrailUniforms {
    mouse: vec2<f32>,
    resolution: vec2<f32>,
    time: f32,
    _pad0: f32,
    _pad1: f32,
    _pad2: f32,
};

@group(0) @binding(0)
var previous_frame: texture_2d<f32>;
@group(0) @binding(1)
var frame_sampler: sampler;
@group(0) @binding(2)
var<uniform> trail: TrailUniforms;

const FADE: f32 = 0.96;
const INK_RADIUS: f32 = 24.0;

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let previous = textureSample(previous_frame, frame_sampler, in.uv);

    // Pointer is in pixels with a bottom-left origin
    let pixel = vec2<f32>(in.uv.x, 1.0 - in.uv.y) * trail.resolution;
    let ink = 1.0 - smoothstep(0.0, INK_RADIUS, distance(pixel, trail.mouse));
    let tint = 0.5 + 0.5 * cos(vec3<f32>(trail.time) + vec3<f32>(0.0, 2.0, 4.0));

    let rgb = previous.rgb * FADE + tint * ink * 0.25;
    let alpha = max(previous.a * FADE, ink * 0.6);
    return clamp(vec4<f32>(rgb, alpha), vec4<f32>(0.0), vec4<f32>(1.0));
}
"#;

const DISPLAY_FRAGMENT: &str = r#"
@group(0) @binding(0)
var trail_frame: texture_2d<f32>;
@group(0) @binding(1)
var frame_sampler: sampler;

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    return textureSample(trail_frame, frame_sampler, in.uv);
}
"#;

fn trail_shader_source() -> String {
    format!("{FULLSCREEN_VERTEX}\n{TRAIL_FRAGMENT}")
}

fn display_shader_source() -> String {
    format!("{FULLSCREEN_VERTEX}\n{DISPLAY_FRAGMENT}")
}

fn texture_entries(with_uniforms: bool) -> Vec<wgpu::BindGroupLayoutEntry> {
    let mut entries = vec![
        wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        },
        wgpu::BindGroupLayoutEntry {
            binding: 1,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
            count: None,
        },
    ];
    if with_uniforms {
        entries.push(wgpu::BindGroupLayoutEntry {
            binding: 2,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        });
    }
    entries
}

fn fullscreen_pipeline(
    device: &wgpu::Device,
    label: &str,
    source: String,
    layout: &wgpu::BindGroupLayout,
    format: wgpu::TextureFormat,
    blend: Option<wgpu::BlendState>,
) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    });

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(label),
        bind_group_layouts: &[layout],
        push_constant_ranges: &[],
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            ..Default::default()
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

/// GPU side of the trail accumulator.
pub struct TrailPass {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    uniform_buffer: wgpu::Buffer,
}

impl TrailPass {
    pub fn new(device: Arc<wgpu::Device>, queue: Arc<wgpu::Queue>) -> Self {
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Trail Bind Group Layout"),
            entries: &texture_entries(true),
        });
        let pipeline = fullscreen_pipeline(
            &device,
            "Trail Pipeline",
            trail_shader_source(),
            &bind_group_layout,
            TRAIL_FORMAT,
            None,
        );
        let sampler = linear_sampler(&device, "Trail Sampler");
        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Trail Uniform Buffer"),
            size: std::mem::size_of::<TrailUniforms>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self {
            device,
            queue,
            pipeline,
            bind_group_layout,
            sampler,
            uniform_buffer,
        }
    }

    fn clear(&self, target: &RenderTarget) {
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Trail Clear Encoder"),
            });
        {
            let _pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Trail Clear Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target.view(),
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
        }
        self.queue.submit(std::iter::once(encoder.finish()));
    }
}

impl TrailBackend for TrailPass {
    type Surface = RenderTarget;

    fn create_surface(&mut self, size: SurfaceSize) -> Result<RenderTarget, SurfaceError> {
        let target = RenderTarget::new(&self.device, size, "Trail Target")?;
        self.clear(&target);
        Ok(target)
    }

    fn compose(&mut self, previous: &RenderTarget, target: &RenderTarget, uniforms: &TrailUniforms) {
        self.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(uniforms));

        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Trail Bind Group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(previous.view()),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: self.uniform_buffer.as_entire_binding(),
                },
            ],
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Trail Encoder"),
            });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Trail Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target.view(),
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &bind_group, &[]);
            pass.draw(0..3, 0..1);
        }
        self.queue.submit(std::iter::once(encoder.finish()));
    }

    fn release(&mut self, surface: RenderTarget) {
        surface.destroy();
    }
}

/// Draws a trail frame over the screen with alpha blending.
pub struct DisplayPass {
    device: Arc<wgpu::Device>,
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
}

impl DisplayPass {
    pub fn new(device: Arc<wgpu::Device>, format: wgpu::TextureFormat) -> Self {
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Display Bind Group Layout"),
            entries: &texture_entries(false),
        });
        let pipeline = fullscreen_pipeline(
            &device,
            "Display Pipeline",
            display_shader_source(),
            &bind_group_layout,
            format,
            Some(wgpu::BlendState::ALPHA_BLENDING),
        );
        let sampler = linear_sampler(&device, "Display Sampler");

        Self {
            device,
            pipeline,
            bind_group_layout,
            sampler,
        }
    }

    /// Record a pass drawing `trail` into `view`, keeping existing content.
    pub fn draw(&self, encoder: &mut wgpu::CommandEncoder, view: &wgpu::TextureView, trail: &RenderTarget) {
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Display Bind Group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(trail.view()),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Display Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &bind_group, &[]);
        pass.draw(0..3, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::tests::validate_wgsl;

    #[test]
    fn test_trail_shader_is_valid() {
        let result = validate_wgsl(&trail_shader_source());
        assert!(result.is_ok(), "{:?}", result);
    }

    #[test]
    fn test_display_shader_is_valid() {
        let result = validate_wgsl(&display_shader_source());
        assert!(result.is_ok(), "{:?}", result);
    }

    #[test]
    fn test_trail_layout_has_uniform_binding() {
        assert_eq!(texture_entries(true).len(), 3);
        assert_eq!(texture_entries(false).len(), 2);
    }
}
