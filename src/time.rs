//! Per-frame clock.
//!
//! [`FrameClock`] hands out one [`FrameTime`] per call to
//! [`FrameClock::tick`]. In real-time mode the delta is measured with
//! `std::time::Instant`; in fixed-step mode every tick advances by the same
//! amount, which makes headless runs and tests deterministic.
//!
//! # Example
//!
//! ```ignore
//! use cursor_trail::time::FrameClock;
//!
//! let mut clock = FrameClock::new();
//!
//! // In your frame loop:
//! let t = clock.tick();
//! println!("Elapsed: {:.2}s, delta: {:.4}s", t.elapsed, t.delta);
//! ```

use std::time::Instant;

/// Timing values for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameTime {
    /// Seconds since the clock started, excluding paused time.
    pub elapsed: f32,
    /// Seconds since the previous tick.
    pub delta: f32,
    /// Frames ticked so far, this one included.
    pub frame: u64,
}

#[derive(Debug, Clone, Copy)]
enum Source {
    Real { last: Option<Instant> },
    Fixed { step: f32 },
}

/// Source of elapsed and delta time for the frame loop.
#[derive(Debug, Clone)]
pub struct FrameClock {
    source: Source,
    elapsed: f32,
    frame: u64,
    paused: bool,
}

impl FrameClock {
    /// A clock measuring wall time. The first tick has a zero delta.
    pub fn new() -> Self {
        Self {
            source: Source::Real { last: None },
            elapsed: 0.0,
            frame: 0,
            paused: false,
        }
    }

    /// A clock that advances by `step` seconds per tick.
    pub fn fixed(step: f32) -> Self {
        Self {
            source: Source::Fixed { step: step.max(0.0) },
            ..Self::new()
        }
    }

    /// Advance one frame.
    ///
    /// While paused the delta is zero and elapsed time holds still.
    pub fn tick(&mut self) -> FrameTime {
        let delta = match &mut self.source {
            Source::Real { last } => {
                let now = Instant::now();
                let delta = last.map_or(0.0, |prev| now.duration_since(prev).as_secs_f32());
                *last = Some(now);
                delta
            }
            Source::Fixed { step } => *step,
        };
        let delta = if self.paused { 0.0 } else { delta };

        self.elapsed += delta;
        self.frame += 1;
        FrameTime {
            elapsed: self.elapsed,
            delta,
            frame: self.frame,
        }
    }

    /// Seconds elapsed so far.
    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Frames ticked so far.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Whether time is currently paused.
    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Stop time from advancing. Ticks still count frames.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Resume after [`pause`](Self::pause).
    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Toggle pause state.
    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
