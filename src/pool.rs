//! Fixed-capacity particle pool.
//!
//! All slots are allocated once at construction and never resized. Free
//! slots sit on a stack so acquiring and releasing are O(1); live slots are
//! tracked in a dense index list with a reverse map so a slot can be removed
//! by swapping with the last live entry instead of shifting the list.
//!
//! Alongside the simulation records the pool keeps a packed
//! [`ParticleVertex`] array indexed by slot. The draw stage uploads that
//! array as-is, so a particle's instance index never changes while it lives.

use rand::Rng;

use crate::particle::{Particle, ParticleVertex};

const NOT_ACTIVE: usize = usize::MAX;

/// Fixed-size pool of particle slots.
#[derive(Debug, Clone)]
pub struct ParticlePool {
    slots: Vec<Particle>,
    vertices: Vec<ParticleVertex>,
    free: Vec<usize>,
    active: Vec<usize>,
    /// Position of each slot in `active`, or `NOT_ACTIVE`.
    active_position: Vec<usize>,
}

impl ParticlePool {
    /// Allocate `capacity` slots. Per-slot draw constants (scale,
    /// randomness, delay) are drawn from `rng` once here.
    pub fn new<R: Rng + ?Sized>(capacity: usize, rng: &mut R) -> Self {
        let vertices = (0..capacity)
            .map(|_| {
                ParticleVertex::hidden(
                    [rng.gen::<f32>(), rng.gen::<f32>(), rng.gen::<f32>()],
                    rng.gen_range(0.2..0.5),
                    rng.gen_range(0.0..std::f32::consts::TAU),
                )
            })
            .collect();

        Self {
            slots: vec![Particle::default(); capacity],
            vertices,
            // Reversed so the lowest index is handed out first
            free: (0..capacity).rev().collect(),
            active: Vec::with_capacity(capacity),
            active_position: vec![NOT_ACTIVE; capacity],
        }
    }

    /// Total number of slots.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of live particles.
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Whether every slot is in use.
    pub fn is_full(&self) -> bool {
        self.free.is_empty()
    }

    /// Slot indices of live particles, in no particular order.
    pub fn active_indices(&self) -> &[usize] {
        &self.active
    }

    /// The particle in `index`, live or not.
    pub fn get(&self, index: usize) -> Option<&Particle> {
        self.slots.get(index)
    }

    /// All slots, indexed by slot.
    pub fn particles(&self) -> &[Particle] {
        &self.slots
    }

    /// Iterate over live particles with their slot index.
    pub fn iter_active(&self) -> impl Iterator<Item = (usize, &Particle)> + '_ {
        self.active.iter().map(move |&i| (i, &self.slots[i]))
    }

    /// Packed draw records, indexed by slot.
    pub fn vertices(&self) -> &[ParticleVertex] {
        &self.vertices
    }

    /// Packed draw records as bytes for a vertex buffer upload.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Claim a free slot and mark it live with a fresh lifetime.
    ///
    /// Returns `None` when the pool is saturated. The caller sets position
    /// and velocity through the returned index.
    pub(crate) fn acquire(&mut self) -> Option<usize> {
        let index = self.free.pop()?;
        self.active_position[index] = self.active.len();
        self.active.push(index);

        let particle = &mut self.slots[index];
        particle.active = true;
        particle.lifetime = 0.0;
        Some(index)
    }

    /// Mutable access to a slot, for initialising a just-acquired particle.
    pub(crate) fn slot_mut(&mut self, index: usize) -> &mut Particle {
        &mut self.slots[index]
    }

    /// Return a live slot to the free stack. Returns `false` if the slot was
    /// not live.
    pub fn release(&mut self, index: usize) -> bool {
        match self.active_position.get(index) {
            Some(&position) if position != NOT_ACTIVE => {
                self.release_at(position);
                true
            }
            _ => false,
        }
    }

    /// Release every live slot.
    pub fn clear(&mut self) {
        while let Some(&index) = self.active.last() {
            self.release(index);
        }
    }

    /// Visit every live particle. The closure returns `false` to release
    /// the slot; otherwise the slot's draw record is refreshed from the
    /// particle's position and lifetime.
    pub(crate) fn update<F>(&mut self, mut f: F) -> usize
    where
        F: FnMut(&mut Particle) -> bool,
    {
        let mut released = 0;
        let mut position = 0;
        while position < self.active.len() {
            let index = self.active[position];
            let particle = &mut self.slots[index];
            if f(particle) {
                let vertex = &mut self.vertices[index];
                vertex.position = particle.position.to_array();
                vertex.lifetime = particle.lifetime;
                position += 1;
            } else {
                // The last live slot moves into `position`; visit it next
                self.release_at(position);
                released += 1;
            }
        }
        released
    }

    fn release_at(&mut self, position: usize) {
        let index = self.active.swap_remove(position);
        if let Some(&moved) = self.active.get(position) {
            self.active_position[moved] = position;
        }
        self.active_position[index] = NOT_ACTIVE;
        self.free.push(index);

        self.slots[index].active = false;
        self.vertices[index].lifetime = ParticleVertex::HIDDEN_LIFETIME;
    }
}
