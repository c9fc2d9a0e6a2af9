//! Engine configuration.

use crate::elements::SerializableColor;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Tunables for the drawing engine.
///
/// Every field has a default, so a config file only needs to name what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Lower bound for the view scale.
    pub min_scale: f64,
    /// Upper bound for the view scale.
    pub max_scale: f64,
    /// Scale multiplier for one zoom-in step.
    pub zoom_in_factor: f64,
    /// Scale multiplier for one zoom-out step.
    pub zoom_out_factor: f64,
    /// Eraser radius in canvas units.
    pub eraser_radius: f64,
    /// Maximum number of undo snapshots kept.
    pub history_limit: usize,
    /// Incremental pinch ratio change below which zoom updates are ignored.
    pub pinch_zoom_threshold: f64,
    /// Pinch pan is only applied while the incremental ratio is within this band of 1.
    pub pinch_pan_tolerance: f64,
    /// Maximum delay between two clicks/taps of a double-click.
    pub double_click_ms: u64,
    /// Maximum distance between two clicks/taps of a double-click.
    pub double_click_distance: f64,
    /// Initial drawing color.
    pub default_color: SerializableColor,
    /// Initial stroke width.
    pub default_width: f64,
    /// Initial font size for text elements.
    pub default_font_size: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_scale: 0.1,
            max_scale: 5.0,
            zoom_in_factor: 1.1,
            zoom_out_factor: 0.9,
            eraser_radius: 10.0,
            history_limit: 50,
            pinch_zoom_threshold: 0.01,
            pinch_pan_tolerance: 0.05,
            double_click_ms: 500,
            double_click_distance: 5.0,
            default_color: SerializableColor::black(),
            default_width: 2.0,
            default_font_size: 20.0,
        }
    }
}

impl EngineConfig {
    /// Parse and validate a JSON config.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the invariants the engine relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.min_scale > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "min_scale must be positive, got {}",
                self.min_scale
            )));
        }
        if self.min_scale > self.max_scale {
            return Err(ConfigError::Invalid(format!(
                "min_scale ({}) exceeds max_scale ({})",
                self.min_scale, self.max_scale
            )));
        }
        if self.zoom_in_factor <= 1.0 || self.zoom_out_factor <= 0.0 || self.zoom_out_factor >= 1.0 {
            return Err(ConfigError::Invalid(
                "zoom factors must satisfy zoom_in > 1 and 0 < zoom_out < 1".to_string(),
            ));
        }
        if self.history_limit == 0 {
            return Err(ConfigError::Invalid("history_limit must be at least 1".to_string()));
        }
        if self.eraser_radius < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "eraser_radius must not be negative, got {}",
                self.eraser_radius
            )));
        }
        Ok(())
    }
}
