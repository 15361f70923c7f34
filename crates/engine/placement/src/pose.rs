//! World-space poses, rays and the placed model's transform

use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Position plus orientation in world space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vec3,
    #[serde(default = "identity")]
    pub orientation: Quat,
}

fn identity() -> Quat {
    Quat::IDENTITY
}

impl Pose {
    pub fn new(position: Vec3, orientation: Quat) -> Self {
        Self {
            position,
            orientation,
        }
    }

    /// Pose with identity orientation
    pub fn from_position(position: Vec3) -> Self {
        Self::new(position, Quat::IDENTITY)
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::from_position(Vec3::ZERO)
    }
}

/// Half-line in world space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit direction
    pub direction: Vec3,
}

impl Ray {
    /// Build a ray; the direction is normalized
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

impl Default for Ray {
    /// Viewer-forward ray (`-Z` from the viewer origin)
    fn default() -> Self {
        Self {
            origin: Vec3::ZERO,
            direction: Vec3::NEG_Z,
        }
    }
}

/// Transform of the placed model as seen by the renderer
///
/// Written only by [`crate::PlacementController`]; the renderer reads it once
/// per frame and must skip drawing while `visible` is false.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelTransform {
    pub position: Vec3,
    pub orientation: Quat,
    /// Uniform scale factor
    pub scale: f32,
    pub visible: bool,
}

impl ModelTransform {
    /// Hidden transform at the given position and scale
    pub fn hidden(position: Vec3, scale: f32) -> Self {
        Self {
            position,
            orientation: Quat::IDENTITY,
            scale,
            visible: false,
        }
    }

    /// Scale as three equal components for non-uniform transforms
    pub fn scale_vec(&self) -> Vec3 {
        Vec3::splat(self.scale)
    }

    /// Model-to-world matrix
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale_vec(), self.orientation, self.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ray_direction_is_normalized() {
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -4.0));
        assert_eq!(ray.direction, Vec3::NEG_Z);
        assert_eq!(ray.at(2.0), Vec3::new(0.0, 0.0, -2.0));
    }

    #[test]
    fn test_model_matrix() {
        let transform = ModelTransform {
            position: Vec3::new(1.0, 0.0, -2.0),
            orientation: Quat::IDENTITY,
            scale: 2.0,
            visible: true,
        };
        let corner = transform.matrix().transform_point3(Vec3::ONE);
        assert_eq!(corner, Vec3::new(3.0, 2.0, 0.0));
        assert_eq!(transform.scale_vec(), Vec3::splat(2.0));
    }
}
