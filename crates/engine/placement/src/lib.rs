//! AR placement and manipulation engine
//!
//! Probes the environment for a surface, places a model on the first
//! accepted hit, then turns pointer and controller input into move and scale
//! updates on the model's transform.
//!
//! ```
//! use placement::devices::ControllerSet;
//! use placement::glam::{Vec2, Vec3};
//! use placement::{PlacementConfig, PlacementController, Pose, Ray, SceneContext};
//!
//! let mut controller = PlacementController::new(PlacementConfig::default()).unwrap();
//! let mut locator = |_: &Ray| Some(Pose::from_position(Vec3::new(1.0, 0.0, -2.0)));
//! let mut caster = |_: Vec2| -> Option<Vec3> { None };
//! let controllers = ControllerSet::new();
//!
//! let mut ctx = SceneContext::new(&mut locator, &mut caster, &controllers);
//! controller.tick(&mut ctx);
//! assert!(controller.transform().visible);
//! ```

pub mod capability;
pub mod config;
pub mod controller;
pub mod error;
pub mod gesture;
pub mod locator;
pub mod pose;
pub mod raycast;

// Only compile WASM bindings when "wasm" feature is enabled
#[cfg(feature = "wasm")]
mod wasm;

pub use capability::{Capabilities, Capability};
pub use config::{MoveMode, PlacementConfig, PlacementMode, ScaleMode};
pub use controller::{InputEvent, PlacementController, PlacementState, StepDirection, Update};
pub use error::{Error, Result};
pub use gesture::{GestureKind, GestureSource, ManipulationState};
pub use locator::{RayCaster, SceneContext, SurfaceLocator};
pub use pose::{ModelTransform, Pose, Ray};
pub use raycast::{Plane, PlaneLocator, ScreenRayCaster};

// Re-export for convenience
pub use devices;
pub use glam;

#[cfg(feature = "wasm")]
pub use wasm::WasmPlacementController;
