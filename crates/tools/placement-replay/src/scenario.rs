//! Scenario files
//!
//! A scenario scripts one AR session as an ordered list of steps:
//!
//! ```toml
//! probe_surfaces = false
//!
//! [camera]
//! eye = [0.0, 1.6, 0.0]
//! target = [0.0, 0.0, -2.0]
//!
//! [[surface]]
//! point = [0.0, 0.0, 0.0]
//! normal = [0.0, 1.0, 0.0]
//!
//! [[step]]
//! kind = "tick"
//! repeat = 30
//!
//! [[step]]
//! kind = "tick"
//! hit = [1.0, 0.0, -2.0]
//!
//! [[step]]
//! kind = "pointer-down"
//! id = 1
//! x = 400.0
//! y = 500.0
//! ```

use std::fmt;

use anyhow::{Context, Result};
use glam::{Mat4, Vec2, Vec3};
use placement::{Plane, Ray};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub camera: CameraSpec,
    /// Planes the ray-caster (and optionally the locator) intersects
    #[serde(default, rename = "surface")]
    pub surfaces: Vec<Plane>,
    /// Ticks without a scripted `hit` probe the surfaces along the camera's probe ray
    #[serde(default)]
    pub probe_surfaces: bool,
    #[serde(default, rename = "step")]
    pub steps: Vec<Step>,
}

impl Scenario {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let scenario: Scenario = toml::from_str(content).context("Failed to parse scenario")?;
        Ok(scenario)
    }

    /// Surfaces with normalized normals
    pub fn planes(&self) -> Vec<Plane> {
        self.surfaces
            .iter()
            .map(|plane| Plane::new(plane.point, plane.normal))
            .collect()
    }
}

/// Viewer camera used for screen raycasts and surface probing
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct CameraSpec {
    pub eye: Vec3,
    pub target: Vec3,
    pub fov_degrees: f32,
    pub viewport: Vec2,
}

impl Default for CameraSpec {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 1.6, 0.0),
            target: Vec3::new(0.0, 0.0, -2.0),
            fov_degrees: 60.0,
            viewport: Vec2::new(800.0, 600.0),
        }
    }
}

impl CameraSpec {
    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, Vec3::Y)
    }

    /// Transform a viewer-space ray into world space
    pub fn world_ray(&self, ray: &Ray) -> Ray {
        let camera_to_world = self.view().inverse();
        Ray::new(
            camera_to_world.transform_point3(ray.origin),
            camera_to_world.transform_vector3(ray.direction),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ControllerPose {
    pub id: usize,
    pub position: Vec3,
}

fn one() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Step {
    Tick {
        /// Scripted probe result; a miss when absent
        hit: Option<Vec3>,
        /// Controller positions for this frame
        #[serde(default)]
        controllers: Vec<ControllerPose>,
        #[serde(default = "one")]
        repeat: u32,
    },
    PointerDown {
        id: u64,
        x: f32,
        y: f32,
    },
    PointerMove {
        id: u64,
        x: f32,
        y: f32,
    },
    PointerUp {
        id: u64,
        x: f32,
        y: f32,
    },
    SelectStart {
        controller: usize,
    },
    SelectEnd {
        controller: usize,
    },
    ScaleUp,
    ScaleDown,
    Lock,
    Reset,
    EndSession,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Tick { repeat, .. } if *repeat > 1 => write!(f, "tick x{repeat}"),
            Step::Tick { .. } => write!(f, "tick"),
            Step::PointerDown { id, .. } => write!(f, "down #{id}"),
            Step::PointerMove { id, .. } => write!(f, "move #{id}"),
            Step::PointerUp { id, .. } => write!(f, "up #{id}"),
            Step::SelectStart { controller } => write!(f, "select+ c{controller}"),
            Step::SelectEnd { controller } => write!(f, "select- c{controller}"),
            Step::ScaleUp => write!(f, "scale-up"),
            Step::ScaleDown => write!(f, "scale-down"),
            Step::Lock => write!(f, "lock"),
            Step::Reset => write!(f, "reset"),
            Step::EndSession => write!(f, "end-session"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use placement::{MoveMode, PlacementConfig, ScaleMode};

    #[test]
    fn test_parse_full_scenario() {
        let scenario = Scenario::from_toml_str(
            r#"
            probe_surfaces = true

            [camera]
            fov_degrees = 70.0

            [[surface]]
            point = [0.0, 0.0, 0.0]
            normal = [0.0, 2.0, 0.0]

            [[step]]
            kind = "tick"
            repeat = 30

            [[step]]
            kind = "tick"
            hit = [1.0, 0.0, -2.0]
            controllers = [{ id = 0, position = [0.1, 1.0, -0.5] }]

            [[step]]
            kind = "pointer-move"
            id = 3
            x = 10.0
            y = 20.0

            [[step]]
            kind = "select-start"
            controller = 0

            [[step]]
            kind = "scale-down"
            "#,
        )
        .unwrap();

        assert!(scenario.probe_surfaces);
        assert_eq!(scenario.camera.fov_degrees, 70.0);
        assert_eq!(scenario.camera.viewport, Vec2::new(800.0, 600.0));
        assert_eq!(scenario.planes()[0].normal, Vec3::Y);
        assert_eq!(scenario.steps.len(), 5);
        assert_eq!(
            scenario.steps[0],
            Step::Tick {
                hit: None,
                controllers: Vec::new(),
                repeat: 30
            }
        );
        match &scenario.steps[1] {
            Step::Tick { hit, controllers, repeat } => {
                assert_eq!(*hit, Some(Vec3::new(1.0, 0.0, -2.0)));
                assert_eq!(controllers.len(), 1);
                assert_eq!(*repeat, 1);
            }
            other => panic!("Expected tick, got {other:?}"),
        }
        assert_eq!(scenario.steps[3], Step::SelectStart { controller: 0 });
        assert_eq!(scenario.steps[4], Step::ScaleDown);
    }

    #[test]
    fn test_unknown_step_kind_is_rejected() {
        let result = Scenario::from_toml_str(
            r#"
            [[step]]
            kind = "teleport"
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_step_labels() {
        assert_eq!(Step::PointerDown { id: 2, x: 0.0, y: 0.0 }.to_string(), "down #2");
        assert_eq!(
            Step::Tick {
                hit: None,
                controllers: Vec::new(),
                repeat: 5
            }
            .to_string(),
            "tick x5"
        );
    }

    #[test]
    fn test_world_ray_follows_camera() {
        let camera = CameraSpec {
            eye: Vec3::new(1.0, 1.6, 0.0),
            target: Vec3::new(1.0, 1.6, -2.0),
            ..CameraSpec::default()
        };
        let ray = camera.world_ray(&Ray::default());
        assert!((ray.origin - camera.eye).length() < 1e-4);
        assert!((ray.direction - Vec3::NEG_Z).length() < 1e-4);
    }

    #[test]
    fn test_bundled_scenarios_parse() {
        let tabletop = Scenario::from_toml_str(include_str!("../scenarios/tabletop.toml")).unwrap();
        assert_eq!(tabletop.steps.len(), 10);

        let grab = Scenario::from_toml_str(include_str!("../scenarios/two-controllers.toml")).unwrap();
        assert_eq!(grab.steps[0].to_string(), "tick");

        let config =
            PlacementConfig::from_toml_str(include_str!("../scenarios/midpoint-config.toml"))
                .unwrap();
        assert_eq!(config.move_mode, MoveMode::TwoControllerMidpoint);
        assert_eq!(config.scale_mode, ScaleMode::DiscreteStep);
    }
}
