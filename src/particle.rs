//! Particle records.
//!
//! [`Particle`] is the simulation-side state of one pool slot.
//! [`ParticleVertex`] is the packed, GPU-ready record the draw stage reads
//! for the same slot; it lives in a parallel array indexed by slot so that
//! a particle keeps the same instance index for its whole life.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

/// Simulation state of one pool slot.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Particle {
    /// World-space position.
    pub position: Vec3,
    /// Velocity in world units per frame.
    pub velocity: Vec3,
    /// Normalized age: 0 at birth, dead at 1.
    pub lifetime: f32,
    /// Whether the slot is in use.
    pub active: bool,
}

/// Per-slot instance data for the particle draw call.
///
/// Laid out for a `wgpu` instance-stepped vertex buffer; see
/// [`ParticleVertex::ATTRIBUTES`] for the shader locations.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct ParticleVertex {
    /// World-space position.
    pub position: [f32; 3],
    /// Normalized age. Slots that are not alive hold 1.0 and are hidden.
    pub lifetime: f32,
    /// Per-slot random seed in `[0, 1)^3`, fixed at pool creation.
    pub randomness: [f32; 3],
    /// Per-slot size variation in `[0.2, 0.5)`.
    pub scale: f32,
    /// Per-slot phase offset in `[0, 2π)`.
    pub delay: f32,
    pub _pad: [f32; 3],
}

impl ParticleVertex {
    /// Lifetime value that marks a slot as not drawn.
    pub const HIDDEN_LIFETIME: f32 = 1.0;

    /// Vertex attributes: position, lifetime, randomness, scale, delay.
    pub const ATTRIBUTES: [wgpu::VertexAttribute; 5] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32,
        2 => Float32x3,
        3 => Float32,
        4 => Float32
    ];

    /// Instance-stepped buffer layout for this record.
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<ParticleVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBUTES,
        }
    }

    /// A hidden record with the given per-slot constants.
    pub fn hidden(randomness: [f32; 3], scale: f32, delay: f32) -> Self {
        Self {
            position: [0.0; 3],
            lifetime: Self::HIDDEN_LIFETIME,
            randomness,
            scale,
            delay,
            _pad: [0.0; 3],
        }
    }

    /// Whether the draw stage will skip this record.
    pub fn is_hidden(&self) -> bool {
        self.lifetime >= Self::HIDDEN_LIFETIME
    }
}
