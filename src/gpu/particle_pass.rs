//! Instanced particle sprites.
//!
//! The pool's packed [`ParticleVertex`] array is uploaded as an
//! instance-stepped vertex buffer, one instance per slot. Each instance
//! expands to a camera-facing quad; slots with a lifetime of 1.0 or more are
//! collapsed outside the clip volume. Sprites blend additively.

use std::sync::Arc;

use crate::camera::PerspectiveCamera;
use crate::particle::ParticleVertex;
use crate::system::{ParticleSystem, ParticleUniforms};

/// Uniform block for the particle shader.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ParticleGlobals {
    pub view_proj: [[f32; 4]; 4],
    pub particle: ParticleUniforms,
}

pub(crate) const PARTICLE_SHADER: &str = r#"
struct Globals {
    view_proj: mat4x4<f32>,
    time: f32,
    pixel_ratio: f32,
    speed_brightness: f32,
    brightness_multiplier: f32,
    min_brightness: f32,
    particle_size: f32,
    _pad0: f32,
    _pad1: f32,
};

@group(0) @binding(0)
var<uniform> globals: Globals;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) lifetime: f32,
    @location(2) randomness: vec3<f32>,
    @location(3) scale: f32,
    @location(4) delay: f32,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
    @location(1) color: vec3<f32>,
    @location(2) alpha: f32,
};

const BASE_SIZE: f32 = 0.04;

@vertex
fn vs_main(@builtin(vertex_index) vertex_index: u32, in: VertexInput) -> VertexOutput {
    var corners = array<vec2<f32>, 6>(
        vec2<f32>(-0.5, -0.5),
        vec2<f32>(0.5, -0.5),
        vec2<f32>(0.5, 0.5),
        vec2<f32>(-0.5, -0.5),
        vec2<f32>(0.5, 0.5),
        vec2<f32>(-0.5, 0.5),
    );
    let corner = corners[vertex_index];

    var out: VertexOutput;
    out.uv = corner + vec2<f32>(0.5);

    if in.lifetime >= 1.0 {
        out.clip_position = vec4<f32>(0.0, 0.0, 2.0, 1.0);
        out.color = vec3<f32>(0.0);
        out.alpha = 0.0;
        return out;
    }

    let life = 1.0 - in.lifetime;
    let pulse = 1.0 + 0.2 * sin(globals.time * 3.0 + in.delay);
    let size = BASE_SIZE * globals.particle_size * in.scale * (0.5 + 0.5 * life) * pulse;

    // The camera looks down -Z, so an XY offset faces it
    let world = in.position + vec3<f32>(corner * size, 0.0);
    out.clip_position = globals.view_proj * vec4<f32>(world, 1.0);

    let warm = vec3<f32>(1.0, 0.55, 0.25);
    let cool = vec3<f32>(0.35, 0.6, 1.0);
    out.color = mix(warm, cool, in.randomness.x) * globals.speed_brightness;
    out.alpha = life * life;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let dist = length(in.uv - vec2<f32>(0.5));
    if dist > 0.5 {
        discard;
    }
    // Sharper edges on dense displays
    let softness = 0.5 / max(globals.pixel_ratio, 1.0);
    let falloff = 1.0 - smoothstep(0.5 - softness, 0.5, dist);
    let alpha = in.alpha * falloff;
    return vec4<f32>(in.color * alpha, alpha);
}
"#;

/// Additive blend: colour and alpha are summed onto the target.
const ADDITIVE: wgpu::BlendState = wgpu::BlendState {
    color: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::One,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
    alpha: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::One,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
};

/// Pipeline and buffers for drawing the particle pool.
pub struct ParticlePass {
    pipeline: wgpu::RenderPipeline,
    instance_buffer: wgpu::Buffer,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    capacity: u32,
    queue: Arc<wgpu::Queue>,
}

impl ParticlePass {
    /// Create buffers for a pool of `capacity` slots.
    pub fn new(
        device: &wgpu::Device,
        queue: Arc<wgpu::Queue>,
        format: wgpu::TextureFormat,
        capacity: usize,
    ) -> Self {
        let stride = std::mem::size_of::<ParticleVertex>();
        let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Particle Instance Buffer"),
            size: (capacity.max(1) * stride) as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Particle Uniform Buffer"),
            size: std::mem::size_of::<ParticleGlobals>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Particle Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Particle Bind Group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Particle Shader"),
            source: wgpu::ShaderSource::Wgsl(PARTICLE_SHADER.into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Particle Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Particle Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[ParticleVertex::layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(ADDITIVE),
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
        });

        Self {
            pipeline,
            instance_buffer,
            uniform_buffer,
            bind_group,
            capacity: capacity as u32,
            queue,
        }
    }

    /// Upload the pool's vertex records and the frame's uniforms.
    pub fn prepare(&self, particles: &ParticleSystem, camera: &PerspectiveCamera) {
        let bytes = particles.pool().vertex_bytes();
        if !bytes.is_empty() {
            self.queue.write_buffer(&self.instance_buffer, 0, bytes);
        }

        let globals = ParticleGlobals {
            view_proj: camera.view_proj().to_cols_array_2d(),
            particle: particles.uniforms(),
        };
        self.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&globals));
    }

    /// Record a pass drawing every slot into `view`, keeping existing content.
    pub fn draw(&self, encoder: &mut wgpu::CommandEncoder, view: &wgpu::TextureView) {
        if self.capacity == 0 {
            return;
        }

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Particle Pass"),
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
        pass.set_bind_group(0, &self.bind_group, &[]);
        pass.set_vertex_buffer(0, self.instance_buffer.slice(..));
        pass.draw(0..6, 0..self.capacity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::tests::validate_wgsl;

    #[test]
    fn test_particle_shader_is_valid() {
        let result = validate_wgsl(PARTICLE_SHADER);
        assert!(result.is_ok(), "{:?}", result);
    }

    #[test]
    fn test_globals_match_shader_layout() {
        // mat4x4 plus eight scalars
        assert_eq!(std::mem::size_of::<ParticleGlobals>(), 96);
    }

    #[test]
    fn test_shader_locations_match_vertex_attributes() {
        for attribute in ParticleVertex::ATTRIBUTES.iter() {
            let location = format!("@location({})", attribute.shader_location);
            assert!(PARTICLE_SHADER.contains(&location), "missing {location}");
        }
    }
}
