use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::shared::constants::HUE_MAX;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Tunables for one tracking run. Read once at startup and never mutated.
///
/// Hue is in the 8-bit HSV convention (0-179); saturation and value are 0-255.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub hue_target: u8,
    pub hue_tolerance: u8,
    pub sat_min: u8,
    pub val_min: u8,
    /// Minimum contour area (pixels) for the largest blob to count as a detection.
    pub min_area: f64,
    pub line_thickness: u32,
    pub trail_opacity: f64,
    pub fade_enabled: bool,
    pub fade_factor: f64,
    /// Consecutive misses tolerated before the trail is broken.
    pub max_gap_frames: usize,
    /// Process only every Nth frame read (1 = every frame).
    pub frame_skip_stride: usize,
    pub debug_enabled: bool,
    pub debug_cadence: usize,
    pub log_cadence: usize,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            hue_target: 88,
            hue_tolerance: 10,
            sat_min: 120,
            val_min: 80,
            min_area: 60.0,
            line_thickness: 2,
            trail_opacity: 1.0,
            fade_enabled: false,
            fade_factor: 0.985,
            max_gap_frames: 10,
            frame_skip_stride: 1,
            debug_enabled: true,
            debug_cadence: 1000,
            log_cadence: 200,
        }
    }
}

impl TrackerConfig {
    /// Loads a JSON config; keys that are absent keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: Self = serde_json::from_str(&json).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.hue_target > HUE_MAX {
            return Err(ConfigError::Invalid(format!(
                "hue_target must be 0-{HUE_MAX}, got {}",
                self.hue_target
            )));
        }
        if !(self.min_area.is_finite() && self.min_area >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "min_area must be a non-negative number, got {}",
                self.min_area
            )));
        }
        if self.line_thickness == 0 {
            return Err(ConfigError::Invalid("line_thickness must be >= 1".into()));
        }
        if !(self.trail_opacity.is_finite() && self.trail_opacity >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "trail_opacity must be a non-negative number, got {}",
                self.trail_opacity
            )));
        }
        if !(self.fade_factor > 0.0 && self.fade_factor < 1.0) {
            return Err(ConfigError::Invalid(format!(
                "fade_factor must be in (0, 1), got {}",
                self.fade_factor
            )));
        }
        if self.frame_skip_stride == 0 {
            return Err(ConfigError::Invalid("frame_skip_stride must be >= 1".into()));
        }
        if self.debug_cadence == 0 {
            return Err(ConfigError::Invalid("debug_cadence must be >= 1".into()));
        }
        if self.log_cadence == 0 {
            return Err(ConfigError::Invalid("log_cadence must be >= 1".into()));
        }
        Ok(())
    }

    /// Inclusive hue bounds, clamped to the valid hue range.
    pub fn hue_bounds(&self) -> (u8, u8) {
        let lo = self.hue_target.saturating_sub(self.hue_tolerance);
        let hi = self.hue_target.saturating_add(self.hue_tolerance).min(HUE_MAX);
        (lo, hi)
    }
}
