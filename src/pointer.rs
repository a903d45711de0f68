//! Pointer tracking with smoothed position and normalized speed.
//!
//! The tracker records raw pointer positions as they arrive and, once per
//! frame, eases a smoothed position toward the latest one. The distance the
//! smoothed position travels each frame feeds an exponential moving average
//! of speed, which is normalized against a slowly decaying historical
//! maximum so that [`PointerTracker::normalized_velocity`] adapts to how
//! vigorously the pointer has been moving recently.
//!
//! # Usage
//!
//! ```ignore
//! let mut pointer = PointerTracker::new();
//!
//! // From the event loop:
//! pointer.on_input(412.0, 300.0);
//!
//! // Once per frame:
//! pointer.tick();
//! let speed = pointer.normalized_velocity(); // 0.0 ..= 1.0
//! ```

use glam::Vec2;
use winit::event::WindowEvent;

/// Fraction of the remaining distance covered each tick.
pub const DEFAULT_SMOOTHNESS: f32 = 0.15;
/// Weight of the newest displacement in the speed average.
pub const DEFAULT_VELOCITY_SMOOTHING: f32 = 0.1;
/// Per-tick decay of the speed ceiling.
pub const MAX_VELOCITY_DECAY: f32 = 0.999;

/// One frame's view of the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointerSample {
    /// Smoothed position in screen pixels (top-left origin).
    pub position: Vec2,
    /// Smoothed speed in pixels per frame.
    pub velocity: f32,
    /// Speed relative to the recent maximum, in `[0, 1]`.
    pub normalized_velocity: f32,
}

/// Smoothed pointer state.
#[derive(Debug, Clone)]
pub struct PointerTracker {
    current: Vec2,
    target: Vec2,
    velocity: f32,
    max_velocity: f32,
    smoothness: f32,
    velocity_smoothing: f32,
}

impl Default for PointerTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl PointerTracker {
    /// Create a tracker at the origin with default smoothing.
    pub fn new() -> Self {
        Self {
            current: Vec2::ZERO,
            target: Vec2::ZERO,
            velocity: 0.0,
            max_velocity: 0.0,
            smoothness: DEFAULT_SMOOTHNESS,
            velocity_smoothing: DEFAULT_VELOCITY_SMOOTHING,
        }
    }

    /// Set the position smoothing factor, clamped to `[0, 1]`.
    pub fn with_smoothness(mut self, smoothness: f32) -> Self {
        self.smoothness = smoothness.clamp(0.0, 1.0);
        self
    }

    /// Set the speed averaging weight, clamped to `[0, 1]`.
    pub fn with_velocity_smoothing(mut self, weight: f32) -> Self {
        self.velocity_smoothing = weight.clamp(0.0, 1.0);
        self
    }

    /// Record a raw pointer position in screen pixels.
    pub fn on_input(&mut self, x: f32, y: f32) {
        self.target = Vec2::new(x, y);
    }

    /// Feed a winit window event. Only cursor movement is consumed.
    ///
    /// Returns `true` if the event updated the target position.
    pub fn handle_event(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                self.on_input(position.x as f32, position.y as f32);
                true
            }
            _ => false,
        }
    }

    /// Advance one frame: ease toward the target and update speed estimates.
    pub fn tick(&mut self) {
        let previous = self.current;
        self.current += (self.target - self.current) * self.smoothness;

        let displacement = self.current.distance(previous);
        self.velocity =
            self.velocity * (1.0 - self.velocity_smoothing) + displacement * self.velocity_smoothing;

        // Slow decay keeps one old spike from pinning the ceiling forever
        self.max_velocity = (self.max_velocity * MAX_VELOCITY_DECAY).max(self.velocity);
    }

    /// Smoothed position in screen pixels.
    pub fn position(&self) -> Vec2 {
        self.current
    }

    /// Latest raw position in screen pixels.
    pub fn target_position(&self) -> Vec2 {
        self.target
    }

    /// Smoothed speed in pixels per frame.
    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    /// Current speed ceiling.
    pub fn max_velocity(&self) -> f32 {
        self.max_velocity
    }

    /// Speed relative to the ceiling, in `[0, 1]`. Zero before any motion.
    pub fn normalized_velocity(&self) -> f32 {
        if self.max_velocity > 0.0 {
            (self.velocity / self.max_velocity).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Snapshot of the current frame's values.
    pub fn sample(&self) -> PointerSample {
        PointerSample {
            position: self.current,
            velocity: self.velocity,
            normalized_velocity: self.normalized_velocity(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_input_means_zero_speed() {
        let mut pointer = PointerTracker::new();
        assert_eq!(pointer.normalized_velocity(), 0.0);
        for _ in 0..10 {
            pointer.tick();
        }
        assert_eq!(pointer.normalized_velocity(), 0.0);
        assert_eq!(pointer.max_velocity(), 0.0);
    }

    #[test]
    fn test_input_sets_target_immediately() {
        let mut pointer = PointerTracker::new();
        pointer.on_input(100.0, 50.0);
        assert_eq!(pointer.target_position(), Vec2::new(100.0, 50.0));
        assert_eq!(pointer.position(), Vec2::ZERO);
    }

    #[test]
    fn test_tick_eases_by_smoothness() {
        let mut pointer = PointerTracker::new();
        pointer.on_input(100.0, 0.0);
        pointer.tick();
        assert!((pointer.position().x - 15.0).abs() < 1e-4);
        // First displacement of 15 blended with weight 0.1
        assert!((pointer.velocity() - 1.5).abs() < 1e-4);
        assert!((pointer.max_velocity() - 1.5).abs() < 1e-4);
        assert!((pointer.normalized_velocity() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_normalized_velocity_stays_in_unit_range() {
        let mut pointer = PointerTracker::new();
        let moves = [(500.0, 20.0), (10.0, 900.0), (10.0, 900.0), (300.0, 300.0)];
        for (i, &(x, y)) in moves.iter().cycle().take(200).enumerate() {
            if i % 7 == 0 {
                pointer.on_input(x, y);
            }
            pointer.tick();
            let n = pointer.normalized_velocity();
            assert!((0.0..=1.0).contains(&n), "out of range: {n}");
        }
    }

    #[test]
    fn test_stationary_pointer_decays_faster_than_ceiling() {
        let mut pointer = PointerTracker::new();
        pointer.on_input(800.0, 600.0);
        for _ in 0..20 {
            pointer.tick();
        }
        let velocity_before = pointer.velocity();
        let ceiling_before = pointer.max_velocity();
        assert!(velocity_before > 0.0);

        // Pointer is stationary; the smoothed position converges and stops
        for _ in 0..100 {
            pointer.tick();
        }

        assert!(pointer.velocity() < velocity_before * 0.01);
        assert!(pointer.normalized_velocity() < 0.05);
        // Ceiling decays by at most 0.999 per tick
        assert!(pointer.max_velocity() >= ceiling_before * 0.999f32.powi(100) - 1e-4);
    }

    #[test]
    fn test_smoothness_is_clamped() {
        let mut pointer = PointerTracker::new().with_smoothness(4.0);
        pointer.on_input(10.0, 10.0);
        pointer.tick();
        assert_eq!(pointer.position(), Vec2::new(10.0, 10.0));
    }

    #[test]
    fn test_sample_matches_accessors() {
        let mut pointer = PointerTracker::new();
        pointer.on_input(40.0, 30.0);
        pointer.tick();
        let sample = pointer.sample();
        assert_eq!(sample.position, pointer.position());
        assert_eq!(sample.velocity, pointer.velocity());
        assert_eq!(sample.normalized_velocity, pointer.normalized_velocity());
    }
}
