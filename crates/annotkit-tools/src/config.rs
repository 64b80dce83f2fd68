use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid value for \"{key}\": {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrushConfig {
    pub default_radius_px: f64,
    pub min_radius_px: f64,
    pub max_radius_px: f64,
    /// Stroke sampling band in screen pixels.
    pub min_distance_px: f64,
    pub max_distance_px: f64,
}

impl Default for BrushConfig {
    fn default() -> Self {
        Self {
            default_radius_px: 20.0,
            min_radius_px: 1.0,
            max_radius_px: 100.0,
            min_distance_px: 3.0,
            max_distance_px: 10.0,
        }
    }
}

impl BrushConfig {
    /// Clamp a radius into `[min_radius_px, max_radius_px]`.
    #[must_use]
    pub fn clamp_radius(&self, radius_px: f64) -> f64 {
        radius_px.max(self.min_radius_px).min(self.max_radius_px)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectConfig {
    /// Area selection picks only items fully inside the rubber band.
    pub fully_contained: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeometryConfig {
    pub arc_step_deg: f64,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            arc_step_deg: annotkit_geometry::DEFAULT_ARC_STEP_DEG,
        }
    }
}

/// Editor tuning shared by all tools.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Screen-space tolerance for point hits, corner handles and vertices.
    pub hit_tolerance_px: f64,
    pub brush: BrushConfig,
    pub select: SelectConfig,
    pub geometry: GeometryConfig,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            hit_tolerance_px: 5.0,
            brush: BrushConfig::default(),
            select: SelectConfig::default(),
            geometry: GeometryConfig::default(),
        }
    }
}

fn positive(key: &'static str, v: f64) -> Result<(), ConfigError> {
    if v.is_finite() && v > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            key,
            reason: format!("must be a positive number, got {v}"),
        })
    }
}

fn ordered(key: &'static str, min: f64, max: f64) -> Result<(), ConfigError> {
    if min <= max {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            key,
            reason: format!("minimum {min} exceeds maximum {max}"),
        })
    }
}

impl EditorConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load by extension: `.json` is JSON, anything else YAML.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        if path.extension().is_some_and(|e| e.eq_ignore_ascii_case("json")) {
            Self::from_json_str(&text)
        } else {
            Self::from_yaml_str(&text)
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("hit_tolerance_px", self.hit_tolerance_px)?;
        let b = &self.brush;
        positive("brush.min_radius_px", b.min_radius_px)?;
        positive("brush.max_radius_px", b.max_radius_px)?;
        ordered("brush.min_radius_px", b.min_radius_px, b.max_radius_px)?;
        if !(b.min_radius_px..=b.max_radius_px).contains(&b.default_radius_px) {
            return Err(ConfigError::Invalid {
                key: "brush.default_radius_px",
                reason: format!(
                    "must lie within [{}, {}], got {}",
                    b.min_radius_px, b.max_radius_px, b.default_radius_px
                ),
            });
        }
        positive("brush.min_distance_px", b.min_distance_px)?;
        positive("brush.max_distance_px", b.max_distance_px)?;
        ordered("brush.min_distance_px", b.min_distance_px, b.max_distance_px)?;
        positive("geometry.arc_step_deg", self.geometry.arc_step_deg)?;
        Ok(())
    }
}
