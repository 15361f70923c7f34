//! Plane-based reference implementations of the locator and ray-caster
//!
//! Real sessions get hit-tests from the AR runtime and raycasts from the
//! renderer. These stand-ins intersect against a list of infinite planes and
//! are what the replay tool and the tests drive the controller with.

use glam::{Mat4, Quat, Vec2, Vec3, Vec4};
use serde::{Deserialize, Serialize};

use crate::locator::{RayCaster, SurfaceLocator};
use crate::pose::{Pose, Ray};

/// Infinite plane through `point` with unit `normal`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    pub point: Vec3,
    pub normal: Vec3,
}

impl Plane {
    pub fn new(point: Vec3, normal: Vec3) -> Self {
        Self {
            point,
            normal: normal.normalize_or_zero(),
        }
    }

    /// Horizontal floor/table plane at height `y`
    pub fn horizontal(y: f32) -> Self {
        Self::new(Vec3::new(0.0, y, 0.0), Vec3::Y)
    }

    /// Distance along the ray and the hit point
    pub fn intersect(&self, ray: &Ray) -> Option<(f32, Vec3)> {
        ray_plane_intersection(ray, self.point, self.normal)
    }

    /// Orientation whose +Y axis is the plane normal
    pub fn orientation(&self) -> Quat {
        Quat::from_rotation_arc(Vec3::Y, self.normal)
    }
}

/// Ray/plane intersection
///
/// Returns `None` when the ray is parallel to the plane or the plane lies
/// behind the ray origin.
pub fn ray_plane_intersection(ray: &Ray, plane_point: Vec3, plane_normal: Vec3) -> Option<(f32, Vec3)> {
    let denom = plane_normal.dot(ray.direction);

    if denom.abs() < 1e-6 {
        return None;
    }

    let t = (plane_point - ray.origin).dot(plane_normal) / denom;
    if t < 0.0 {
        return None;
    }

    Some((t, ray.at(t)))
}

fn nearest_hit(planes: &[Plane], ray: &Ray) -> Option<(Plane, Vec3)> {
    planes
        .iter()
        .filter_map(|plane| plane.intersect(ray).map(|(t, point)| (t, *plane, point)))
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, plane, point)| (plane, point))
}

/// Surface locator that hit-tests against fixed planes
#[derive(Debug, Clone, Default)]
pub struct PlaneLocator {
    planes: Vec<Plane>,
}

impl PlaneLocator {
    pub fn new(planes: Vec<Plane>) -> Self {
        Self { planes }
    }

    pub fn planes(&self) -> &[Plane] {
        &self.planes
    }
}

impl SurfaceLocator for PlaneLocator {
    fn probe(&mut self, ray: &Ray) -> Option<Pose> {
        let (plane, point) = nearest_hit(&self.planes, ray)?;
        Some(Pose::new(point, plane.orientation()))
    }
}

/// Screen-space ray-caster for a pinhole camera over fixed planes
#[derive(Debug, Clone)]
pub struct ScreenRayCaster {
    inverse_view_projection: Mat4,
    viewport: Vec2,
    planes: Vec<Plane>,
}

impl ScreenRayCaster {
    /// `projection` must map depth to `[0, 1]` (`Mat4::perspective_rh`)
    pub fn new(view: Mat4, projection: Mat4, viewport: Vec2, planes: Vec<Plane>) -> Self {
        Self {
            inverse_view_projection: (projection * view).inverse(),
            viewport,
            planes,
        }
    }

    /// Camera at `eye` looking at `target`, Y up
    pub fn looking_at(
        eye: Vec3,
        target: Vec3,
        fov_y_radians: f32,
        viewport: Vec2,
        planes: Vec<Plane>,
    ) -> Self {
        let aspect = viewport.x / viewport.y.max(1.0);
        let view = Mat4::look_at_rh(eye, target, Vec3::Y);
        let projection = Mat4::perspective_rh(fov_y_radians, aspect, 0.01, 1000.0);
        Self::new(view, projection, viewport, planes)
    }

    /// Convert screen pixels to a world ray through the camera
    pub fn screen_to_ray(&self, screen: Vec2) -> Ray {
        let ndc_x = (2.0 * screen.x / self.viewport.x) - 1.0;
        let ndc_y = 1.0 - (2.0 * screen.y / self.viewport.y);

        let near = self.inverse_view_projection * Vec4::new(ndc_x, ndc_y, 0.0, 1.0);
        let far = self.inverse_view_projection * Vec4::new(ndc_x, ndc_y, 1.0, 1.0);
        let near = near.truncate() / near.w;
        let far = far.truncate() / far.w;

        Ray::new(near, far - near)
    }
}

impl RayCaster for ScreenRayCaster {
    fn cast_ray(&mut self, screen: Vec2) -> Option<Vec3> {
        let ray = self.screen_to_ray(screen);
        nearest_hit(&self.planes, &ray).map(|(_, point)| point)
    }
}
