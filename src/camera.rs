//! Camera used to place emissions under the pointer.

use glam::{Mat4, Vec2, Vec3};

/// Anything that can turn a normalized device coordinate back into world space.
pub trait ViewCamera {
    /// World-space point for a normalized device coordinate.
    fn unproject(&self, ndc: Vec3) -> Vec3;

    /// World-space eye position.
    fn position(&self) -> Vec3;
}

/// Fixed perspective camera looking at a target.
#[derive(Debug, Clone, PartialEq)]
pub struct PerspectiveCamera {
    /// Eye position.
    pub eye: Vec3,
    /// Point the camera looks at.
    pub target: Vec3,
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    /// Viewport width over height.
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl PerspectiveCamera {
    /// Create a camera at `(0, 0, 3)` looking at the origin.
    pub fn new(aspect: f32) -> Self {
        Self {
            eye: Vec3::new(0.0, 0.0, 3.0),
            target: Vec3::ZERO,
            fov_degrees: 75.0,
            aspect,
            near: 0.1,
            far: 1000.0,
        }
    }

    /// Update the aspect ratio after a resize. Zero heights are ignored.
    pub fn set_aspect(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    /// Calculate the view matrix for rendering.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, Vec3::Y)
    }

    /// Calculate the projection matrix for rendering.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_degrees.to_radians(), self.aspect, self.near, self.far)
    }

    /// Combined projection and view.
    pub fn view_proj(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl ViewCamera for PerspectiveCamera {
    fn unproject(&self, ndc: Vec3) -> Vec3 {
        self.view_proj().inverse().project_point3(ndc)
    }

    fn position(&self) -> Vec3 {
        self.eye
    }
}

/// Convert a top-left origin pixel position to normalized device coordinates.
///
/// A degenerate viewport maps everything to the centre.
pub fn screen_to_ndc(screen: Vec2, viewport: Vec2) -> Vec2 {
    if viewport.x <= 0.0 || viewport.y <= 0.0 {
        return Vec2::ZERO;
    }
    Vec2::new(
        screen.x / viewport.x * 2.0 - 1.0,
        -(screen.y / viewport.y) * 2.0 + 1.0,
    )
}

/// World point `distance` units from the eye along the ray through `ndc`.
pub fn point_along_ray<C: ViewCamera + ?Sized>(camera: &C, ndc: Vec2, distance: f32) -> Vec3 {
    let eye = camera.position();
    let through = camera.unproject(ndc.extend(0.5));
    let direction = (through - eye).normalize_or_zero();
    eye + direction * distance
}
