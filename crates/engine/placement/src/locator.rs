//! Services the controller consumes from the AR runtime and the renderer

use devices::ControllerSet;
use glam::{Vec2, Vec3};

use crate::pose::{Pose, Ray};

/// Environment hit-test along a reference ray
///
/// Called at most once per frame while the model is unplaced. Must not
/// block; `None` simply means no surface was detected this frame.
pub trait SurfaceLocator {
    fn probe(&mut self, ray: &Ray) -> Option<Pose>;
}

impl<F> SurfaceLocator for F
where
    F: FnMut(&Ray) -> Option<Pose>,
{
    fn probe(&mut self, ray: &Ray) -> Option<Pose> {
        self(ray)
    }
}

/// Screen-to-world raycast provided by the renderer
///
/// `screen` is in the same pixel space as the pointer events. Returns the
/// first scene intersection, or `None` over empty space.
pub trait RayCaster {
    fn cast_ray(&mut self, screen: Vec2) -> Option<Vec3>;
}

impl<F> RayCaster for F
where
    F: FnMut(Vec2) -> Option<Vec3>,
{
    fn cast_ray(&mut self, screen: Vec2) -> Option<Vec3> {
        self(screen)
    }
}

/// Per-call context handed to the controller
///
/// Owned by the caller and rebuilt every frame; the controller keeps no
/// reference to any of it between calls.
pub struct SceneContext<'a> {
    pub locator: &'a mut dyn SurfaceLocator,
    pub ray_caster: &'a mut dyn RayCaster,
    /// Spatial controllers, already updated for this frame
    pub controllers: &'a ControllerSet,
}

impl<'a> SceneContext<'a> {
    pub fn new(
        locator: &'a mut dyn SurfaceLocator,
        ray_caster: &'a mut dyn RayCaster,
        controllers: &'a ControllerSet,
    ) -> Self {
        Self {
            locator,
            ray_caster,
            controllers,
        }
    }
}
