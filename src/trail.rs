//! Ping-pong trail accumulator.
//!
//! Two equally sized off-screen surfaces take turns: each frame the backend
//! composes the previous frame (the read surface) plus fresh pointer ink
//! into the write surface, then the two swap roles. After
//! [`TrailAccumulator::update`] returns, [`TrailAccumulator::output`] is the
//! frame just written and the other surface is next frame's target.
//!
//! The accumulator never touches pixels itself. Allocation and the
//! fade-and-stamp pass belong to a [`TrailBackend`]; the crate's wgpu
//! implementation lives in [`crate::gpu::TrailPass`].
//!
//! ```ignore
//! let mut trail = TrailAccumulator::new(&mut backend, 1280, 720)?;
//!
//! // Once per frame, pointer in pixels with a bottom-left origin:
//! trail.update(&mut backend, Vec2::new(640.0, 360.0), elapsed);
//! let frame = trail.output();
//! ```

use glam::Vec2;

use crate::error::SurfaceError;

/// Validated surface dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceSize {
    width: u32,
    height: u32,
}

impl SurfaceSize {
    /// Both sides must be non-zero.
    pub fn new(width: u32, height: u32) -> Result<Self, SurfaceError> {
        if width == 0 || height == 0 {
            return Err(SurfaceError::ZeroSize { width, height });
        }
        Ok(Self { width, height })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Size as a float vector, for shader uniforms.
    pub fn as_vec2(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }
}

/// Uniform block for the compose pass.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TrailUniforms {
    /// Pointer in pixels, bottom-left origin.
    pub mouse: [f32; 2],
    /// Surface size in pixels.
    pub resolution: [f32; 2],
    /// Elapsed seconds.
    pub time: f32,
    pub _pad: [f32; 3],
}

/// Renderer operations the accumulator needs.
pub trait TrailBackend {
    /// Handle to one off-screen colour surface.
    type Surface;

    /// Allocate a surface of `size`, cleared to transparent black.
    fn create_surface(&mut self, size: SurfaceSize) -> Result<Self::Surface, SurfaceError>;

    /// Render `previous` faded, plus pointer ink, into `target`.
    fn compose(&mut self, previous: &Self::Surface, target: &Self::Surface, uniforms: &TrailUniforms);

    /// Free a surface. The default drops it.
    fn release(&mut self, surface: Self::Surface) {
        drop(surface);
    }
}

struct Buffers<S> {
    write: S,
    read: S,
}

/// Feedback buffer that blends each frame into the next.
pub struct TrailAccumulator<S> {
    buffers: Option<Buffers<S>>,
    size: SurfaceSize,
    uniforms: TrailUniforms,
    frame: u64,
}

impl<S> TrailAccumulator<S> {
    /// Allocate both surfaces at `width` x `height`.
    pub fn new<B>(backend: &mut B, width: u32, height: u32) -> Result<Self, SurfaceError>
    where
        B: TrailBackend<Surface = S> + ?Sized,
    {
        let size = SurfaceSize::new(width, height)?;
        let buffers = allocate_pair(backend, size)?;
        log::debug!("trail accumulator: {}x{}", width, height);

        Ok(Self {
            buffers: Some(buffers),
            size,
            uniforms: TrailUniforms {
                resolution: size.as_vec2().to_array(),
                ..TrailUniforms::default()
            },
            frame: 0,
        })
    }

    /// Compose one frame and swap roles.
    ///
    /// `pointer` is in pixels with a bottom-left origin. Returns `false`
    /// without doing anything once the accumulator has been disposed.
    pub fn update<B>(&mut self, backend: &mut B, pointer: Vec2, time: f32) -> bool
    where
        B: TrailBackend<Surface = S> + ?Sized,
    {
        let Some(buffers) = self.buffers.as_mut() else {
            return false;
        };

        self.uniforms.mouse = pointer.to_array();
        self.uniforms.time = time;
        backend.compose(&buffers.read, &buffers.write, &self.uniforms);
        std::mem::swap(&mut buffers.write, &mut buffers.read);
        self.frame += 1;
        true
    }

    /// The most recently completed frame, or `None` after disposal.
    pub fn output(&self) -> Option<&S> {
        self.buffers.as_ref().map(|b| &b.read)
    }

    /// Reallocate both surfaces at a new size. Accumulated content is lost.
    ///
    /// Resizing to the current size is a no-op. On failure the old surfaces
    /// stay in place. After disposal only the recorded size changes.
    pub fn resize<B>(&mut self, backend: &mut B, width: u32, height: u32) -> Result<(), SurfaceError>
    where
        B: TrailBackend<Surface = S> + ?Sized,
    {
        let size = SurfaceSize::new(width, height)?;
        if size == self.size {
            return Ok(());
        }

        if self.buffers.is_some() {
            let fresh = allocate_pair(backend, size)?;
            if let Some(old) = self.buffers.replace(fresh) {
                backend.release(old.write);
                backend.release(old.read);
            }
            log::debug!("trail accumulator resized to {}x{}", width, height);
        }

        self.size = size;
        self.uniforms.resolution = size.as_vec2().to_array();
        Ok(())
    }

    /// Release both surfaces. Safe to call more than once.
    pub fn dispose<B>(&mut self, backend: &mut B)
    where
        B: TrailBackend<Surface = S> + ?Sized,
    {
        if let Some(buffers) = self.buffers.take() {
            backend.release(buffers.write);
            backend.release(buffers.read);
            log::debug!("trail accumulator disposed after {} frames", self.frame);
        }
    }

    /// Whether [`dispose`](Self::dispose) has run.
    pub fn is_disposed(&self) -> bool {
        self.buffers.is_none()
    }

    /// Current surface size.
    pub fn size(&self) -> SurfaceSize {
        self.size
    }

    /// Uniforms used by the most recent compose.
    pub fn uniforms(&self) -> &TrailUniforms {
        &self.uniforms
    }

    /// Frames composed so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }
}

fn allocate_pair<B>(backend: &mut B, size: SurfaceSize) -> Result<Buffers<B::Surface>, SurfaceError>
where
    B: TrailBackend + ?Sized,
{
    let write = backend.create_surface(size)?;
    match backend.create_surface(size) {
        Ok(read) => Ok(Buffers { write, read }),
        Err(e) => {
            backend.release(write);
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Each surface holds one brightness value. Compose fades the previous
    /// value by half and adds one unit of ink.
    #[derive(Default)]
    struct MockBackend {
        next_id: u32,
        values: HashMap<u32, f32>,
        sizes: HashMap<u32, SurfaceSize>,
        released: Vec<u32>,
        composes: Vec<(u32, u32, TrailUniforms)>,
        fail_on: Option<u32>,
    }

    #[derive(Debug, PartialEq)]
    struct Surface(u32);

    impl TrailBackend for MockBackend {
        type Surface = Surface;

        fn create_surface(&mut self, size: SurfaceSize) -> Result<Surface, SurfaceError> {
            let id = self.next_id;
            self.next_id += 1;
            if self.fail_on == Some(id) {
                return Err(SurfaceError::Allocation("out of memory".into()));
            }
            self.values.insert(id, 0.0);
            self.sizes.insert(id, size);
            Ok(Surface(id))
        }

        fn compose(&mut self, previous: &Surface, target: &Surface, uniforms: &TrailUniforms) {
            let faded = self.values[&previous.0] * 0.5;
            self.values.insert(target.0, faded + 1.0);
            self.composes.push((previous.0, target.0, *uniforms));
        }

        fn release(&mut self, surface: Surface) {
            self.values.remove(&surface.0);
            self.released.push(surface.0);
        }
    }

    impl MockBackend {
        fn value(&self, surface: &Surface) -> f32 {
            self.values[&surface.0]
        }
    }

    #[test]
    fn test_zero_size_is_rejected() {
        let mut backend = MockBackend::default();
        let err = TrailAccumulator::new(&mut backend, 0, 10).err();
        assert_eq!(err, Some(SurfaceError::ZeroSize { width: 0, height: 10 }));
        assert_eq!(backend.next_id, 0);
    }

    #[test]
    fn test_update_writes_then_swaps() {
        let mut backend = MockBackend::default();
        let mut trail = TrailAccumulator::new(&mut backend, 64, 32).unwrap();

        assert!(trail.update(&mut backend, Vec2::new(5.0, 6.0), 0.1));
        // Surface 0 was the write target and is now the output
        assert_eq!(trail.output(), Some(&Surface(0)));
        assert_eq!(backend.composes[0].0, 1);
        assert_eq!(backend.composes[0].1, 0);

        trail.update(&mut backend, Vec2::new(7.0, 8.0), 0.2);
        assert_eq!(trail.output(), Some(&Surface(1)));
        assert_eq!(backend.composes[1].0, 0);
        assert_eq!(trail.frame(), 2);
    }

    #[test]
    fn test_each_frame_reads_the_previous_output() {
        let mut backend = MockBackend::default();
        let mut trail = TrailAccumulator::new(&mut backend, 8, 8).unwrap();

        let mut expected = 0.0;
        for _ in 0..6 {
            trail.update(&mut backend, Vec2::ZERO, 0.0);
            expected = expected * 0.5 + 1.0;
            assert_eq!(backend.value(trail.output().unwrap()), expected);
        }
    }

    #[test]
    fn test_uniforms_carry_pointer_time_and_resolution() {
        let mut backend = MockBackend::default();
        let mut trail = TrailAccumulator::new(&mut backend, 640, 480).unwrap();
        trail.update(&mut backend, Vec2::new(10.0, 470.0), 1.25);

        let uniforms = backend.composes[0].2;
        assert_eq!(uniforms.mouse, [10.0, 470.0]);
        assert_eq!(uniforms.resolution, [640.0, 480.0]);
        assert_eq!(uniforms.time, 1.25);
        assert_eq!(std::mem::size_of::<TrailUniforms>(), 32);
    }

    #[test]
    fn test_resize_reallocates_cleared_surfaces() {
        let mut backend = MockBackend::default();
        let mut trail = TrailAccumulator::new(&mut backend, 100, 100).unwrap();
        for _ in 0..3 {
            trail.update(&mut backend, Vec2::ZERO, 0.0);
        }

        trail.resize(&mut backend, 200, 50).unwrap();

        assert_eq!(trail.size(), SurfaceSize::new(200, 50).unwrap());
        assert_eq!(trail.uniforms().resolution, [200.0, 50.0]);
        assert_eq!(backend.released, vec![0, 1]);
        let output = trail.output().unwrap();
        assert_eq!(backend.value(output), 0.0);
        assert_eq!(backend.sizes[&output.0], SurfaceSize::new(200, 50).unwrap());
    }

    #[test]
    fn test_resize_to_same_size_keeps_content() {
        let mut backend = MockBackend::default();
        let mut trail = TrailAccumulator::new(&mut backend, 100, 100).unwrap();
        trail.update(&mut backend, Vec2::ZERO, 0.0);
        trail.resize(&mut backend, 100, 100).unwrap();
        assert!(backend.released.is_empty());
        assert_eq!(backend.value(trail.output().unwrap()), 1.0);
    }

    #[test]
    fn test_failed_resize_keeps_old_surfaces() {
        let mut backend = MockBackend::default();
        let mut trail = TrailAccumulator::new(&mut backend, 10, 10).unwrap();
        backend.fail_on = Some(3);

        let err = trail.resize(&mut backend, 20, 20);
        assert!(matches!(err, Err(SurfaceError::Allocation(_))));
        // The half-allocated surface 2 is released; 0 and 1 survive
        assert_eq!(backend.released, vec![2]);
        assert_eq!(trail.size(), SurfaceSize::new(10, 10).unwrap());
        assert!(trail.update(&mut backend, Vec2::ZERO, 0.0));
    }

    #[test]
    fn test_resize_rejects_zero() {
        let mut backend = MockBackend::default();
        let mut trail = TrailAccumulator::new(&mut backend, 10, 10).unwrap();
        assert!(trail.resize(&mut backend, 10, 0).is_err());
        assert_eq!(trail.size().height(), 10);
    }

    #[test]
    fn test_dispose_is_idempotent() {
        let mut backend = MockBackend::default();
        let mut trail = TrailAccumulator::new(&mut backend, 10, 10).unwrap();
        trail.dispose(&mut backend);
        trail.dispose(&mut backend);

        assert_eq!(backend.released, vec![0, 1]);
        assert!(trail.is_disposed());
        assert!(trail.output().is_none());
        assert!(!trail.update(&mut backend, Vec2::ZERO, 0.0));
        assert!(backend.composes.is_empty());
    }
}
