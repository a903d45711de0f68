//! Runtime configuration for the particle simulation.
//!
//! [`ParticleConfig`] holds the knobs the simulation reads every tick. Its
//! fields are private: every change goes through a setter that clamps the
//! value into its valid range, so an external control surface can never
//! hand the simulation a rate of zero or a non-positive lifetime.
//!
//! Configs round-trip through JSON with camelCase keys:
//!
//! ```ignore
//! let config = ParticleConfig::from_json(r#"{ "emissionRate": 30, "drag": 0.95 }"#)?;
//! assert_eq!(config.emission_rate(), 30);
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default pool capacity.
pub const DEFAULT_PARTICLE_COUNT: usize = 5000;
/// Default particles emitted per frame.
pub const DEFAULT_EMISSION_RATE: u32 = 15;
/// Lowest accepted emission rate.
pub const MIN_EMISSION_RATE: u32 = 1;
/// Highest accepted emission rate.
pub const MAX_EMISSION_RATE: u32 = 50;
/// Shortest accepted particle lifetime in seconds.
pub const MIN_PARTICLE_LIFETIME: f32 = 1.0e-3;

/// Simulation parameters read live by [`ParticleSystem`](crate::ParticleSystem).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawParticleConfig", rename_all = "camelCase")]
pub struct ParticleConfig {
    emission_rate: u32,
    particle_lifetime: f32,
    particle_size: f32,
    velocity_spread: f32,
    drag: f32,
    speed_based_brightness: bool,
    brightness_multiplier: f32,
    min_brightness: f32,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            emission_rate: DEFAULT_EMISSION_RATE,
            particle_lifetime: 2.5,
            particle_size: 1.0,
            velocity_spread: 1.0,
            drag: 0.97,
            speed_based_brightness: true,
            brightness_multiplier: 2.0,
            min_brightness: 0.2,
        }
    }
}

impl ParticleConfig {
    /// Create a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from JSON. Missing keys keep their defaults and
    /// out-of-range values are clamped.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    // ========== Getters ==========

    /// Particles emitted per frame.
    pub fn emission_rate(&self) -> u32 {
        self.emission_rate
    }

    /// Particle lifetime in seconds.
    pub fn particle_lifetime(&self) -> f32 {
        self.particle_lifetime
    }

    /// Point sprite size multiplier for the draw stage.
    pub fn particle_size(&self) -> f32 {
        self.particle_size
    }

    /// How strongly pointer speed scales emission velocity.
    pub fn velocity_spread(&self) -> f32 {
        self.velocity_spread
    }

    /// Per-frame multiplicative velocity decay.
    pub fn drag(&self) -> f32 {
        self.drag
    }

    /// Whether pointer speed modulates brightness and emission speed.
    pub fn speed_based_brightness(&self) -> bool {
        self.speed_based_brightness
    }

    /// Scale applied to the normalized speed to get brightness.
    pub fn brightness_multiplier(&self) -> f32 {
        self.brightness_multiplier
    }

    /// Brightness floor when speed-based brightness is on.
    pub fn min_brightness(&self) -> f32 {
        self.min_brightness
    }

    // ========== Setters ==========

    /// Set the emission rate, clamped to `[MIN_EMISSION_RATE, MAX_EMISSION_RATE]`.
    ///
    /// Takes a signed value so that zero or negative input from a control
    /// surface clamps to the minimum instead of wrapping.
    pub fn set_emission_rate(&mut self, rate: i64) {
        self.emission_rate = rate.clamp(MIN_EMISSION_RATE as i64, MAX_EMISSION_RATE as i64) as u32;
    }

    /// Set the lifetime in seconds, never below [`MIN_PARTICLE_LIFETIME`].
    ///
    /// NaN falls back to the minimum as well.
    pub fn set_particle_lifetime(&mut self, seconds: f32) {
        self.particle_lifetime = if seconds.is_nan() {
            MIN_PARTICLE_LIFETIME
        } else {
            seconds.max(MIN_PARTICLE_LIFETIME)
        };
    }

    /// Set the sprite size multiplier (non-negative).
    pub fn set_particle_size(&mut self, size: f32) {
        self.particle_size = non_negative(size);
    }

    /// Set the velocity spread (non-negative).
    pub fn set_velocity_spread(&mut self, spread: f32) {
        self.velocity_spread = non_negative(spread);
    }

    /// Set the drag factor, clamped to `[0, 1]`.
    pub fn set_drag(&mut self, drag: f32) {
        self.drag = if drag.is_nan() { 1.0 } else { drag.clamp(0.0, 1.0) };
    }

    /// Enable or disable speed-based brightness and emission speed.
    pub fn set_speed_based_brightness(&mut self, enabled: bool) {
        self.speed_based_brightness = enabled;
    }

    /// Set the brightness multiplier (non-negative).
    pub fn set_brightness_multiplier(&mut self, multiplier: f32) {
        self.brightness_multiplier = non_negative(multiplier);
    }

    /// Set the brightness floor (non-negative).
    pub fn set_min_brightness(&mut self, brightness: f32) {
        self.min_brightness = non_negative(brightness);
    }
}

fn non_negative(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.max(0.0)
    }
}

/// Unchecked wire form; converted through the clamping setters.
#[derive(Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawParticleConfig {
    emission_rate: i64,
    particle_lifetime: f32,
    particle_size: f32,
    velocity_spread: f32,
    drag: f32,
    speed_based_brightness: bool,
    brightness_multiplier: f32,
    min_brightness: f32,
}

impl Default for RawParticleConfig {
    fn default() -> Self {
        let d = ParticleConfig::default();
        Self {
            emission_rate: d.emission_rate as i64,
            particle_lifetime: d.particle_lifetime,
            particle_size: d.particle_size,
            velocity_spread: d.velocity_spread,
            drag: d.drag,
            speed_based_brightness: d.speed_based_brightness,
            brightness_multiplier: d.brightness_multiplier,
            min_brightness: d.min_brightness,
        }
    }
}

impl From<RawParticleConfig> for ParticleConfig {
    fn from(raw: RawParticleConfig) -> Self {
        let mut config = ParticleConfig::default();
        config.set_emission_rate(raw.emission_rate);
        config.set_particle_lifetime(raw.particle_lifetime);
        config.set_particle_size(raw.particle_size);
        config.set_velocity_spread(raw.velocity_spread);
        config.set_drag(raw.drag);
        config.set_speed_based_brightness(raw.speed_based_brightness);
        config.set_brightness_multiplier(raw.brightness_multiplier);
        config.set_min_brightness(raw.min_brightness);
        config
    }
}

/// Quality tiers trading particle count for frame time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PerformancePreset {
    /// 1000 particles, 5 per frame, pixel ratio 1.
    Low,
    /// 3000 particles, 10 per frame, pixel ratio up to 1.5.
    Medium,
    /// 5000 particles, 15 per frame, pixel ratio up to 2 (default).
    #[default]
    High,
    /// 10000 particles, 25 per frame, native pixel ratio.
    Ultra,
}

impl PerformancePreset {
    /// Pool capacity for this tier.
    pub fn max_particles(self) -> usize {
        match self {
            PerformancePreset::Low => 1000,
            PerformancePreset::Medium => 3000,
            PerformancePreset::High => 5000,
            PerformancePreset::Ultra => 10_000,
        }
    }

    /// Emission rate for this tier.
    pub fn emission_rate(self) -> u32 {
        match self {
            PerformancePreset::Low => 5,
            PerformancePreset::Medium => 10,
            PerformancePreset::High => 15,
            PerformancePreset::Ultra => 25,
        }
    }

    /// Pixel ratio to render at, given the display's native scale factor.
    pub fn pixel_ratio(self, native: f32) -> f32 {
        match self {
            PerformancePreset::Low => 1.0,
            PerformancePreset::Medium => native.min(1.5),
            PerformancePreset::High => native.min(2.0),
            PerformancePreset::Ultra => native,
        }
    }
}

/// Top-level options for a cursor trail instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CursorTrailOptions {
    /// Pool capacity. Overrides the preset's capacity when set.
    pub max_particles: Option<usize>,
    /// Quality tier.
    pub preset: PerformancePreset,
    /// Pixel ratio override. Defaults to the preset's cap.
    pub pixel_ratio: Option<f32>,
    /// Initial particle parameters.
    pub particles: ParticleConfig,
}

impl Default for CursorTrailOptions {
    fn default() -> Self {
        Self {
            max_particles: None,
            preset: PerformancePreset::default(),
            pixel_ratio: None,
            particles: ParticleConfig::default(),
        }
    }
}

impl CursorTrailOptions {
    /// Options for a preset, with the preset's emission rate applied.
    pub fn from_preset(preset: PerformancePreset) -> Self {
        let mut particles = ParticleConfig::default();
        particles.set_emission_rate(preset.emission_rate() as i64);
        Self {
            preset,
            particles,
            ..Self::default()
        }
    }

    /// Read options from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Parse options from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Effective pool capacity.
    pub fn max_particles(&self) -> usize {
        self.max_particles.unwrap_or_else(|| self.preset.max_particles())
    }

    /// Effective pixel ratio for a display with the given native scale.
    pub fn pixel_ratio(&self, native: f32) -> f32 {
        self.pixel_ratio.unwrap_or_else(|| self.preset.pixel_ratio(native))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_values() {
        let config = ParticleConfig::default();
        assert_eq!(config.emission_rate(), 15);
        assert_eq!(config.particle_lifetime(), 2.5);
        assert_eq!(config.drag(), 0.97);
        assert!(config.speed_based_brightness());
        assert_eq!(config.brightness_multiplier(), 2.0);
        assert_eq!(config.min_brightness(), 0.2);
    }

    #[test]
    fn test_emission_rate_clamps() {
        let mut config = ParticleConfig::default();
        config.set_emission_rate(0);
        assert_eq!(config.emission_rate(), 1);
        config.set_emission_rate(-7);
        assert_eq!(config.emission_rate(), 1);
        config.set_emission_rate(500);
        assert_eq!(config.emission_rate(), 50);
        config.set_emission_rate(20);
        assert_eq!(config.emission_rate(), 20);
    }

    #[test]
    fn test_lifetime_never_reaches_zero() {
        let mut config = ParticleConfig::default();
        config.set_particle_lifetime(0.0);
        assert_eq!(config.particle_lifetime(), MIN_PARTICLE_LIFETIME);
        config.set_particle_lifetime(-3.0);
        assert_eq!(config.particle_lifetime(), MIN_PARTICLE_LIFETIME);
        config.set_particle_lifetime(f32::NAN);
        assert_eq!(config.particle_lifetime(), MIN_PARTICLE_LIFETIME);
    }

    #[test]
    fn test_drag_clamps_to_unit_range() {
        let mut config = ParticleConfig::default();
        config.set_drag(1.5);
        assert_eq!(config.drag(), 1.0);
        config.set_drag(-0.2);
        assert_eq!(config.drag(), 0.0);
    }

    #[test]
    fn test_json_partial_keeps_defaults_and_clamps() {
        let config = ParticleConfig::from_json(r#"{ "emissionRate": 0, "drag": 0.9 }"#).unwrap();
        assert_eq!(config.emission_rate(), 1);
        assert_eq!(config.drag(), 0.9);
        assert_eq!(config.particle_lifetime(), 2.5);
    }

    #[test]
    fn test_json_uses_camel_case_keys() {
        let json = ParticleConfig::default().to_json().unwrap();
        assert!(json.contains("\"emissionRate\""));
        assert!(json.contains("\"speedBasedBrightness\""));
    }

    #[test]
    fn test_presets() {
        assert_eq!(PerformancePreset::Low.max_particles(), 1000);
        assert_eq!(PerformancePreset::Ultra.emission_rate(), 25);
        assert_eq!(PerformancePreset::Medium.pixel_ratio(3.0), 1.5);
        assert_eq!(PerformancePreset::High.pixel_ratio(1.0), 1.0);
        assert_eq!(PerformancePreset::Ultra.pixel_ratio(3.0), 3.0);
    }

    #[test]
    fn test_options_from_json() {
        let options = CursorTrailOptions::from_json(
            r#"{ "preset": "low", "particles": { "particleLifetime": 1.0 } }"#,
        )
        .unwrap();
        assert_eq!(options.max_particles(), 1000);
        assert_eq!(options.particles.particle_lifetime(), 1.0);
        assert_eq!(options.pixel_ratio(2.0), 1.0);

        let options = CursorTrailOptions::from_json(r#"{ "maxParticles": 42 }"#).unwrap();
        assert_eq!(options.max_particles(), 42);
    }

    #[test]
    fn test_options_from_preset_applies_rate() {
        let options = CursorTrailOptions::from_preset(PerformancePreset::Medium);
        assert_eq!(options.particles.emission_rate(), 10);
        assert_eq!(options.max_particles(), 3000);
    }
}
