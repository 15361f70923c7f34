//! Placement configuration
//!
//! Every field has a default, so an empty TOML document (or an empty JS
//! object in the browser) yields a working first-hit / absolute-raycast /
//! pinch-to-scale setup.
//!
//! ```toml
//! min_scale = 0.1
//! max_scale = 5.0
//! placement_mode = { consecutive-hits = 3 }
//! move_mode = "two-controller-midpoint"
//! scale_mode = "discrete-step"
//! scale_step = 0.25
//! ```

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::pose::Ray;

/// When a surface hit becomes the committed placement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlacementMode {
    /// The first tick with a hit places the model
    #[default]
    FirstHit,
    /// A hit must be seen on this many consecutive ticks
    ConsecutiveHits(u32),
    /// Hits only move a preview pose; an explicit lock places the model
    Continuous,
}

/// How a placed model is moved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MoveMode {
    /// Model jumps to the scene point under the single active pointer
    #[default]
    AbsoluteRaycast,
    /// Model sits halfway between two selecting XR controllers
    TwoControllerMidpoint,
}

/// How a placed model is scaled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScaleMode {
    /// Two-pointer pinch, scale follows the distance ratio
    #[default]
    ContinuousGesture,
    /// Fixed increments from UI buttons only
    DiscreteStep,
}

/// Configuration for [`crate::PlacementController`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    /// Lower scale clamp bound
    pub min_scale: f32,
    /// Upper scale clamp bound
    pub max_scale: f32,
    /// Model scale before any gesture
    pub initial_scale: f32,
    /// Where the hidden model sits before placement
    pub initial_position: Vec3,
    pub placement_mode: PlacementMode,
    pub move_mode: MoveMode,
    pub scale_mode: ScaleMode,
    /// Increment for discrete scale buttons
    pub scale_step: f32,
    /// Copy the surface orientation onto the model at placement
    pub apply_orientation: bool,
    /// Ray the surface locator probes along, in viewer space
    pub probe_ray: Ray,
    /// Pinch spreads below this (screen pixels) are too small to anchor on
    pub min_pinch_distance: f32,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            min_scale: 0.1,
            max_scale: 5.0,
            initial_scale: 0.5,
            initial_position: Vec3::new(0.0, -1.0, -2.0),
            placement_mode: PlacementMode::default(),
            move_mode: MoveMode::default(),
            scale_mode: ScaleMode::default(),
            scale_step: 0.1,
            apply_orientation: false,
            probe_ray: Ray::default(),
            min_pinch_distance: 1.0,
        }
    }
}

impl PlacementConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: PlacementConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check ranges and cross-field consistency
    pub fn validate(&self) -> Result<()> {
        let positive = |name: &str, value: f32| {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(Error::InvalidConfig(format!(
                    "{name} must be a positive finite number, got {value}"
                )))
            }
        };

        positive("min_scale", self.min_scale)?;
        positive("max_scale", self.max_scale)?;
        positive("initial_scale", self.initial_scale)?;
        positive("scale_step", self.scale_step)?;

        if self.min_scale > self.max_scale {
            return Err(Error::InvalidConfig(format!(
                "min_scale ({}) exceeds max_scale ({})",
                self.min_scale, self.max_scale
            )));
        }
        if !(self.min_scale..=self.max_scale).contains(&self.initial_scale) {
            return Err(Error::InvalidConfig(format!(
                "initial_scale ({}) outside [{}, {}]",
                self.initial_scale, self.min_scale, self.max_scale
            )));
        }
        if self.placement_mode == PlacementMode::ConsecutiveHits(0) {
            return Err(Error::InvalidConfig(
                "consecutive-hits count must be at least 1".to_string(),
            ));
        }
        if self.probe_ray.direction.length_squared() < 1e-12 || !self.probe_ray.direction.is_finite() {
            return Err(Error::InvalidConfig(
                "probe_ray direction must be a non-zero vector".to_string(),
            ));
        }
        if !self.min_pinch_distance.is_finite() || self.min_pinch_distance < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "min_pinch_distance must be non-negative, got {}",
                self.min_pinch_distance
            )));
        }
        Ok(())
    }

    /// Clamp a scale factor into the configured range
    pub fn clamp_scale(&self, scale: f32) -> f32 {
        scale.clamp(self.min_scale, self.max_scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = PlacementConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.placement_mode, PlacementMode::FirstHit);
        assert_eq!(config.initial_scale, 0.5);
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = PlacementConfig::from_toml_str("").unwrap();
        assert_eq!(config, PlacementConfig::default());
    }

    #[test]
    fn test_parse_modes() {
        let config = PlacementConfig::from_toml_str(
            r#"
            min_scale = 0.2
            max_scale = 2.0
            placement_mode = { consecutive-hits = 3 }
            move_mode = "two-controller-midpoint"
            scale_mode = "discrete-step"
            scale_step = 0.25
            "#,
        )
        .unwrap();

        assert_eq!(config.placement_mode, PlacementMode::ConsecutiveHits(3));
        assert_eq!(config.move_mode, MoveMode::TwoControllerMidpoint);
        assert_eq!(config.scale_mode, ScaleMode::DiscreteStep);
        assert_eq!(config.scale_step, 0.25);
    }

    #[test]
    fn test_continuous_mode_parses_from_string() {
        let config = PlacementConfig::from_toml_str("placement_mode = \"continuous\"").unwrap();
        assert_eq!(config.placement_mode, PlacementMode::Continuous);
    }

    #[test]
    fn test_rejects_inverted_bounds() {
        let err = PlacementConfig::from_toml_str("min_scale = 3.0\nmax_scale = 1.0").unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn test_rejects_initial_scale_out_of_range() {
        let config = PlacementConfig {
            initial_scale: 10.0,
            ..PlacementConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_consecutive_hits() {
        let config = PlacementConfig {
            placement_mode: PlacementMode::ConsecutiveHits(0),
            ..PlacementConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_malformed_toml() {
        let err = PlacementConfig::from_toml_str("min_scale = \"big\"").unwrap_err();
        assert!(matches!(err, Error::ConfigParse(_)));
    }

    #[test]
    fn test_clamp_scale() {
        let config = PlacementConfig::default();
        assert_eq!(config.clamp_scale(0.001), 0.1);
        assert_eq!(config.clamp_scale(100.0), 5.0);
        assert_eq!(config.clamp_scale(1.5), 1.5);
    }
}
