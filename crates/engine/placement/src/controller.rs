//! Placement & manipulation state machine
//!
//! [`PlacementController`] owns the placement flag, the active gesture and
//! the model transform. It is driven from the render loop through exactly
//! two entry points:
//!
//! - [`PlacementController::tick`] once per frame: probes for a surface while
//!   searching, follows grabbing controllers once placed.
//! - [`PlacementController::handle_event`] for every input event, in arrival
//!   order.
//!
//! Both take a [`SceneContext`] carrying the external services; nothing is
//! retained between calls.

use std::fmt;

use devices::{GestureEvent, GesturePhase};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::capability::Capabilities;
use crate::config::{MoveMode, PlacementConfig, PlacementMode, ScaleMode};
use crate::error::Result;
use crate::gesture::{
    GestureAnchor, GestureKind, GestureSource, ManipulationState, MoveAnchor, ScaleAnchor,
};
use crate::locator::SceneContext;
use crate::pose::{ModelTransform, Pose, Ray};

/// Controller distances below this cannot anchor a scale gesture
const MIN_CONTROLLER_SPREAD: f32 = 1e-4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlacementState {
    #[default]
    Searching,
    Placed,
}

impl fmt::Display for PlacementState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlacementState::Searching => f.write_str("searching"),
            PlacementState::Placed => f.write_str("placed"),
        }
    }
}

/// Direction of a discrete scale button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StepDirection {
    Up,
    Down,
}

/// Everything the controller reacts to besides the frame tick
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Pointer gesture from [`devices::PointerTracker`]
    Gesture(GestureEvent),
    /// Controller select start/end
    ///
    /// The caller applies it to the [`devices::ControllerSet`] in the
    /// context before dispatching.
    Select(devices::SelectEvent),
    /// Discrete scale button
    ScaleStep(StepDirection),
    /// Commit the current preview (continuous placement only)
    Lock,
    /// Return to searching for a new surface
    Reset,
}

/// What a call changed, for callers that mirror state elsewhere
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Update {
    None,
    Placed(Pose),
    Previewed(Pose),
    Moved(Vec3),
    Scaled(f32),
    GestureChanged(GestureKind),
    Reset,
}

/// The placement & manipulation state machine
#[derive(Debug, Clone)]
pub struct PlacementController {
    config: PlacementConfig,
    state: PlacementState,
    manipulation: ManipulationState,
    transform: ModelTransform,
    consecutive_hits: u32,
    preview: Option<Pose>,
    active: bool,
}

impl PlacementController {
    /// Create a controller in `Searching` with the model hidden
    pub fn new(mut config: PlacementConfig) -> Result<Self> {
        config.validate()?;
        config.probe_ray = Ray::new(config.probe_ray.origin, config.probe_ray.direction);

        let transform = ModelTransform::hidden(config.initial_position, config.initial_scale);
        debug!(
            placement_mode = ?config.placement_mode,
            move_mode = ?config.move_mode,
            scale_mode = ?config.scale_mode,
            "placement controller created"
        );

        Ok(Self {
            config,
            state: PlacementState::Searching,
            manipulation: ManipulationState::idle(),
            transform,
            consecutive_hits: 0,
            preview: None,
            active: true,
        })
    }

    /// Create a controller for a session, refusing if a capability is absent
    pub fn for_session(config: PlacementConfig, capabilities: &Capabilities) -> Result<Self> {
        capabilities.require()?;
        Self::new(config)
    }

    /// Advance one frame
    pub fn tick(&mut self, ctx: &mut SceneContext<'_>) -> Update {
        if !self.active {
            return Update::None;
        }

        match self.state {
            PlacementState::Searching => {
                let hit = ctx.locator.probe(&self.config.probe_ray);
                self.on_probe(hit)
            }
            PlacementState::Placed => self.follow_controllers(ctx),
        }
    }

    /// Dispatch one input event
    pub fn handle_event(&mut self, event: InputEvent, ctx: &mut SceneContext<'_>) -> Update {
        if !self.active {
            debug!(?event, "event after session end ignored");
            return Update::None;
        }

        match event {
            InputEvent::Reset => self.reset(),
            InputEvent::Lock => self.lock(),
            _ if self.state == PlacementState::Searching => Update::None,
            InputEvent::Gesture(gesture) => {
                if self.manipulation.is_driven_by(GestureSource::Controllers) {
                    debug!("pointer gesture ignored while controllers hold the model");
                    return Update::None;
                }
                self.on_gesture(&gesture, ctx)
            }
            InputEvent::Select(_) => self.on_select(ctx),
            InputEvent::ScaleStep(direction) => self.step_scale(direction),
        }
    }

    /// Stop reacting to ticks and events; the transform keeps its last value
    pub fn end_session(&mut self) {
        if self.active {
            info!(state = %self.state, "placement session ended");
        }
        self.active = false;
        self.manipulation = ManipulationState::idle();
    }

    pub fn state(&self) -> PlacementState {
        self.state
    }

    pub fn is_placed(&self) -> bool {
        self.state == PlacementState::Placed
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn transform(&self) -> &ModelTransform {
        &self.transform
    }

    pub fn manipulation(&self) -> &ManipulationState {
        &self.manipulation
    }

    pub fn gesture_kind(&self) -> GestureKind {
        self.manipulation.kind()
    }

    /// Latest surface seen in continuous placement mode
    pub fn preview(&self) -> Option<Pose> {
        self.preview
    }

    pub fn consecutive_hits(&self) -> u32 {
        self.consecutive_hits
    }

    pub fn config(&self) -> &PlacementConfig {
        &self.config
    }

    fn on_probe(&mut self, hit: Option<Pose>) -> Update {
        match (self.config.placement_mode, hit) {
            (PlacementMode::FirstHit, Some(pose)) => self.commit(pose),
            (PlacementMode::ConsecutiveHits(required), Some(pose)) => {
                self.consecutive_hits += 1;
                if self.consecutive_hits >= required {
                    self.commit(pose)
                } else {
                    debug!(hits = self.consecutive_hits, required, "surface hit");
                    Update::None
                }
            }
            (PlacementMode::Continuous, Some(pose)) => {
                self.preview = Some(pose);
                Update::Previewed(pose)
            }
            (_, None) => {
                self.consecutive_hits = 0;
                self.preview = None;
                Update::None
            }
        }
    }

    fn commit(&mut self, pose: Pose) -> Update {
        self.transform.position = pose.position;
        if self.config.apply_orientation {
            self.transform.orientation = pose.orientation;
        }
        self.transform.visible = true;
        self.state = PlacementState::Placed;
        self.manipulation = ManipulationState::idle();
        self.consecutive_hits = 0;
        self.preview = None;

        info!(position = ?pose.position, "model placed");
        Update::Placed(pose)
    }

    fn lock(&mut self) -> Update {
        if self.state != PlacementState::Searching {
            return Update::None;
        }
        match self.preview {
            Some(pose) if self.config.placement_mode == PlacementMode::Continuous => self.commit(pose),
            _ => {
                debug!("lock without a preview ignored");
                Update::None
            }
        }
    }

    fn reset(&mut self) -> Update {
        self.state = PlacementState::Searching;
        self.transform.visible = false;
        self.manipulation = ManipulationState::idle();
        self.consecutive_hits = 0;
        self.preview = None;

        info!("placement reset, searching for a surface");
        Update::Reset
    }

    fn step_scale(&mut self, direction: StepDirection) -> Update {
        let delta = match direction {
            StepDirection::Up => self.config.scale_step,
            StepDirection::Down => -self.config.scale_step,
        };
        let scale = self.config.clamp_scale(self.transform.scale + delta);
        self.transform.scale = scale;

        // An active scale gesture continues from the stepped scale.
        if let GestureAnchor::Scale(anchor) = *self.manipulation.anchor() {
            *self.manipulation.anchor_mut() = GestureAnchor::Scale(anchor.rebased(scale));
        }

        debug!(scale, ?direction, "scale step");
        Update::Scaled(scale)
    }

    fn set_manipulation(&mut self, manipulation: ManipulationState) -> Update {
        let before = self.manipulation.kind();
        self.manipulation = manipulation;
        let after = self.manipulation.kind();
        if before != after {
            debug!(%before, %after, "gesture changed");
        }
        Update::GestureChanged(after)
    }

    // Pointer gestures

    fn on_gesture(&mut self, gesture: &GestureEvent, ctx: &mut SceneContext<'_>) -> Update {
        match gesture.phase {
            GesturePhase::Start => self.anchor_pointers(gesture),
            GesturePhase::Move => {
                if gesture.pointer_count() == 0 {
                    warn!("gesture move with no active pointers, releasing gesture");
                    return self.set_manipulation(ManipulationState::idle());
                }
                if self.manipulation.kind() != kind_for_pointers(gesture.pointer_count()) {
                    // Missed a start or end; anchor on what is down now.
                    debug!(pointers = gesture.pointer_count(), "re-anchoring gesture");
                    self.anchor_pointers(gesture);
                }
                self.apply_pointer_move(gesture, ctx)
            }
            GesturePhase::End => self.anchor_pointers(gesture),
        }
    }

    /// Capture a fresh anchor from the pointers currently down
    fn anchor_pointers(&mut self, gesture: &GestureEvent) -> Update {
        let manipulation = match (gesture.primary(), gesture.spread()) {
            (_, Some(spread)) => ManipulationState::scaling(
                GestureSource::Pointer,
                ScaleAnchor::new(spread, self.transform.scale),
            ),
            (Some(last), None) => {
                ManipulationState::moving(GestureSource::Pointer, MoveAnchor::Pointer { last })
            }
            (None, None) => ManipulationState::idle(),
        };
        self.set_manipulation(manipulation)
    }

    fn apply_pointer_move(&mut self, gesture: &GestureEvent, ctx: &mut SceneContext<'_>) -> Update {
        match *self.manipulation.anchor() {
            GestureAnchor::Move(_) => {
                let Some(screen) = gesture.primary() else {
                    return Update::None;
                };
                *self.manipulation.anchor_mut() =
                    GestureAnchor::Move(MoveAnchor::Pointer { last: screen });

                if self.config.move_mode != MoveMode::AbsoluteRaycast {
                    return Update::None;
                }
                match ctx.ray_caster.cast_ray(screen) {
                    Some(point) => {
                        self.transform.position = point;
                        Update::Moved(point)
                    }
                    None => Update::None,
                }
            }
            GestureAnchor::Scale(anchor) => {
                let Some(current) = gesture.spread() else {
                    return Update::None;
                };
                if self.config.scale_mode != ScaleMode::ContinuousGesture {
                    return Update::None;
                }
                if anchor.initial_distance < self.config.min_pinch_distance {
                    debug!(
                        initial_distance = anchor.initial_distance,
                        "pinch too narrow to anchor, re-anchoring"
                    );
                    *self.manipulation.anchor_mut() =
                        GestureAnchor::Scale(ScaleAnchor::new(current, self.transform.scale));
                    return Update::None;
                }
                self.apply_ratio(anchor, current)
            }
            GestureAnchor::None => Update::None,
        }
    }

    fn apply_ratio(&mut self, anchor: ScaleAnchor, current_distance: f32) -> Update {
        let mut scale = self.config.clamp_scale(anchor.ratio_scale(current_distance));
        if !scale.is_finite() {
            scale = self.config.clamp_scale(anchor.initial_scale);
        }
        *self.manipulation.anchor_mut() = GestureAnchor::Scale(ScaleAnchor {
            current_distance,
            ..anchor
        });
        self.transform.scale = scale;
        Update::Scaled(scale)
    }

    // Controller gestures

    fn on_select(&mut self, ctx: &mut SceneContext<'_>) -> Update {
        let pair = ctx.controllers.selecting_pair();
        let held = self.manipulation.is_driven_by(GestureSource::Controllers);

        match (pair, held) {
            (Some((a, b)), false) => {
                let manipulation = match self.config.move_mode {
                    MoveMode::TwoControllerMidpoint => {
                        let midpoint = a.lerp(b, 0.5);
                        self.transform.position = midpoint;
                        ManipulationState::moving(
                            GestureSource::Controllers,
                            MoveAnchor::ControllerPair {
                                last_midpoint: midpoint,
                            },
                        )
                    }
                    MoveMode::AbsoluteRaycast => ManipulationState::scaling(
                        GestureSource::Controllers,
                        ScaleAnchor::new(a.distance(b), self.transform.scale),
                    ),
                };
                info!(gesture = %manipulation.kind(), "controllers grabbed the model");
                self.set_manipulation(manipulation)
            }
            (Some((a, b)), true) => {
                // The selecting pair may have changed; scale on from here.
                if matches!(self.manipulation.anchor(), GestureAnchor::Scale(_)) {
                    debug!("controller pair changed, re-anchoring scale");
                    *self.manipulation.anchor_mut() =
                        GestureAnchor::Scale(ScaleAnchor::new(a.distance(b), self.transform.scale));
                }
                Update::None
            }
            (None, true) => {
                debug!("controller grab released");
                self.set_manipulation(ManipulationState::idle())
            }
            (None, false) => Update::None,
        }
    }

    fn follow_controllers(&mut self, ctx: &mut SceneContext<'_>) -> Update {
        if !self.manipulation.is_driven_by(GestureSource::Controllers) {
            return Update::None;
        }
        let Some((a, b)) = ctx.controllers.selecting_pair() else {
            // A controller disconnected without a select end.
            return self.set_manipulation(ManipulationState::idle());
        };

        match *self.manipulation.anchor() {
            GestureAnchor::Move(_) => {
                let midpoint = a.lerp(b, 0.5);
                self.transform.position = midpoint;
                *self.manipulation.anchor_mut() = GestureAnchor::Move(MoveAnchor::ControllerPair {
                    last_midpoint: midpoint,
                });
                Update::Moved(midpoint)
            }
            GestureAnchor::Scale(anchor) => {
                if self.config.scale_mode != ScaleMode::ContinuousGesture {
                    return Update::None;
                }
                let current = a.distance(b);
                if anchor.initial_distance < MIN_CONTROLLER_SPREAD {
                    *self.manipulation.anchor_mut() =
                        GestureAnchor::Scale(ScaleAnchor::new(current, self.transform.scale));
                    return Update::None;
                }
                self.apply_ratio(anchor, current)
            }
            GestureAnchor::None => Update::None,
        }
    }
}

fn kind_for_pointers(count: usize) -> GestureKind {
    match count {
        0 => GestureKind::None,
        1 => GestureKind::Move,
        _ => GestureKind::Scale,
    }
}
