//! Engine configuration
//!
//! All tunables are supplied once at construction. Files are YAML:
//!
//! ```yaml
//! sample_rate: 48000
//! zoom_rate: 0.02
//! deceleration_time_ms: null   # disable coasting
//! ```
//!
//! Missing fields take their defaults.

mod io;
mod paths;

pub use io::{load_config, read_config, save_config};
pub use paths::{config_dir, default_config_path};

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::peaks::DEFAULT_SAMPLES_PER_POINT;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Samples per second, for converting pixels to seconds
    /// Default: 44100
    pub sample_rate: u32,

    /// Cap on sub-samples inspected per peak column
    /// Default: 50
    pub samples_per_point: usize,

    /// Wheel sensitivity: `zoom' = zoom * exp(-deltaY / 80 * zoom_rate)`
    /// Default: 0.01
    pub zoom_rate: f64,

    /// Inertia settle duration in milliseconds; `null` disables coasting
    /// Default: 750
    pub deceleration_time_ms: Option<f64>,

    /// Vertical magnitude multiplier for display envelopes
    /// Default: 1.0
    pub scale: f32,

    /// Zoom applied at construction, window anchored at index 0
    /// Default: 1.0 (whole buffer)
    pub initial_zoom: f64,

    /// Pixels per display column
    /// Default: 2
    pub pixel_step: u32,

    /// Minimum |px/ms| at release to start coasting
    /// Default: 0.1
    pub min_flick_velocity: f64,

    /// A release later than this after the last move never flicks
    /// Default: 40
    pub flick_window_ms: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44_100,
            samples_per_point: DEFAULT_SAMPLES_PER_POINT,
            zoom_rate: 0.01,
            deceleration_time_ms: Some(750.0),
            scale: 1.0,
            initial_zoom: 1.0,
            pixel_step: 2,
            min_flick_velocity: 0.1,
            flick_window_ms: 40.0,
        }
    }
}

impl EngineConfig {
    /// Check every field, reporting the first unusable one
    pub fn validate(&self) -> ConfigResult<()> {
        match self.problems().into_iter().next() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Copy with every invalid field replaced by its default
    pub fn sanitized(&self) -> Self {
        let defaults = Self::default();
        let mut config = self.clone();

        for problem in self.problems() {
            log::warn!("EngineConfig: {}, using default", problem);
            if let ConfigError::Invalid { field, .. } = problem {
                match field {
                    "sample_rate" => config.sample_rate = defaults.sample_rate,
                    "samples_per_point" => config.samples_per_point = defaults.samples_per_point,
                    "zoom_rate" => config.zoom_rate = defaults.zoom_rate,
                    "deceleration_time_ms" => config.deceleration_time_ms = defaults.deceleration_time_ms,
                    "scale" => config.scale = defaults.scale,
                    "initial_zoom" => config.initial_zoom = defaults.initial_zoom,
                    "pixel_step" => config.pixel_step = defaults.pixel_step,
                    "min_flick_velocity" => config.min_flick_velocity = defaults.min_flick_velocity,
                    "flick_window_ms" => config.flick_window_ms = defaults.flick_window_ms,
                    _ => {}
                }
            }
        }
        config
    }

    fn problems(&self) -> Vec<ConfigError> {
        let mut problems = Vec::new();

        if self.sample_rate == 0 {
            problems.push(ConfigError::invalid("sample_rate", "must be greater than 0"));
        }
        if self.samples_per_point == 0 {
            problems.push(ConfigError::invalid("samples_per_point", "must be at least 1"));
        }
        if !(self.zoom_rate.is_finite() && self.zoom_rate > 0.0) {
            problems.push(ConfigError::invalid(
                "zoom_rate",
                format!("{} is not a positive number", self.zoom_rate),
            ));
        }
        if let Some(t) = self.deceleration_time_ms {
            if !(t.is_finite() && t > 0.0) {
                problems.push(ConfigError::invalid(
                    "deceleration_time_ms",
                    format!("{} is not a positive duration (use null to disable)", t),
                ));
            }
        }
        if !(self.scale.is_finite() && self.scale > 0.0) {
            problems.push(ConfigError::invalid(
                "scale",
                format!("{} is not a positive number", self.scale),
            ));
        }
        if !(self.initial_zoom.is_finite() && self.initial_zoom >= 1.0) {
            problems.push(ConfigError::invalid(
                "initial_zoom",
                format!("{} is below 1.0", self.initial_zoom),
            ));
        }
        if self.pixel_step == 0 {
            problems.push(ConfigError::invalid("pixel_step", "must be at least 1"));
        }
        if !(self.min_flick_velocity.is_finite() && self.min_flick_velocity >= 0.0) {
            problems.push(ConfigError::invalid(
                "min_flick_velocity",
                format!("{} is negative", self.min_flick_velocity),
            ));
        }
        if !(self.flick_window_ms.is_finite() && self.flick_window_ms >= 0.0) {
            problems.push(ConfigError::invalid(
                "flick_window_ms",
                format!("{} is negative", self.flick_window_ms),
            ));
        }

        problems
    }
}
