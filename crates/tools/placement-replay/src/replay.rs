//! Drives a placement controller through a scenario

use devices::{ControllerBackend, PointerSample, PointerTracker, SelectEvent};
use glam::Vec3;
use placement::{
    GestureKind, InputEvent, PlacementConfig, PlacementController, PlacementState, PlaneLocator,
    Pose, Ray, SceneContext, ScreenRayCaster, StepDirection, SurfaceLocator, Update,
};

use crate::backend::ReplayBackend;
use crate::scenario::{CameraSpec, Scenario, Step};

/// Controller state after one step
#[derive(Debug, Clone, PartialEq)]
pub struct StepReport {
    pub index: usize,
    pub label: String,
    pub update: Update,
    pub state: PlacementState,
    pub gesture: GestureKind,
    pub position: Vec3,
    pub scale: f32,
    pub visible: bool,
}

pub struct Replay {
    controller: PlacementController,
    pointers: PointerTracker,
    backend: ReplayBackend,
    locator: PlaneLocator,
    caster: ScreenRayCaster,
    camera: CameraSpec,
    probe_surfaces: bool,
}

impl Replay {
    pub fn new(scenario: &Scenario, config: PlacementConfig) -> placement::Result<Self> {
        let camera = scenario.camera;
        let planes = scenario.planes();

        Ok(Self {
            controller: PlacementController::new(config)?,
            pointers: PointerTracker::new(),
            backend: ReplayBackend::new(),
            locator: PlaneLocator::new(planes.clone()),
            caster: ScreenRayCaster::looking_at(
                camera.eye,
                camera.target,
                camera.fov_degrees.to_radians(),
                camera.viewport,
                planes,
            ),
            camera,
            probe_surfaces: scenario.probe_surfaces,
        })
    }

    pub fn controller(&self) -> &PlacementController {
        &self.controller
    }

    /// Run every step and report the state after each
    pub fn run(&mut self, steps: &[Step]) -> Vec<StepReport> {
        steps
            .iter()
            .enumerate()
            .map(|(index, step)| {
                let update = self.apply(step);
                self.report(index, step, update)
            })
            .collect()
    }

    pub fn apply(&mut self, step: &Step) -> Update {
        match step {
            Step::Tick {
                hit,
                controllers,
                repeat,
            } => {
                self.backend.stage_positions(controllers);
                self.poll_backend();
                let mut update = Update::None;
                for _ in 0..*repeat {
                    update = self.tick(*hit);
                }
                update
            }
            Step::PointerDown { id, x, y } => self.pointer(PointerSample::down(*id, *x, *y)),
            Step::PointerMove { id, x, y } => self.pointer(PointerSample::moved(*id, *x, *y)),
            Step::PointerUp { id, x, y } => self.pointer(PointerSample::up(*id, *x, *y)),
            Step::SelectStart { controller } => self.select(SelectEvent::start(*controller)),
            Step::SelectEnd { controller } => self.select(SelectEvent::end(*controller)),
            Step::ScaleUp => self.event(InputEvent::ScaleStep(StepDirection::Up)),
            Step::ScaleDown => self.event(InputEvent::ScaleStep(StepDirection::Down)),
            Step::Lock => self.event(InputEvent::Lock),
            Step::Reset => self.event(InputEvent::Reset),
            Step::EndSession => {
                self.controller.end_session();
                Update::None
            }
        }
    }

    fn tick(&mut self, hit: Option<Vec3>) -> Update {
        let Replay {
            controller,
            backend,
            locator,
            caster,
            camera,
            probe_surfaces,
            ..
        } = self;

        let mut probe = |ray: &Ray| -> Option<Pose> {
            match hit {
                Some(position) => Some(Pose::from_position(position)),
                None if *probe_surfaces => locator.probe(&camera.world_ray(ray)),
                None => None,
            }
        };
        let mut ctx = SceneContext::new(&mut probe, caster, backend.controllers());
        controller.tick(&mut ctx)
    }

    fn event(&mut self, event: InputEvent) -> Update {
        let mut no_surface = |_: &Ray| -> Option<Pose> { None };
        let mut ctx = SceneContext::new(
            &mut no_surface,
            &mut self.caster,
            self.backend.controllers(),
        );
        self.controller.handle_event(event, &mut ctx)
    }

    fn pointer(&mut self, sample: PointerSample) -> Update {
        match self.pointers.update(sample) {
            Some(gesture) => self.event(InputEvent::Gesture(gesture)),
            None => Update::None,
        }
    }

    fn select(&mut self, event: SelectEvent) -> Update {
        self.backend.stage_select(event);
        self.poll_backend()
    }

    /// Apply staged controller input and dispatch resulting select events
    fn poll_backend(&mut self) -> Update {
        self.backend.poll();
        let mut update = Update::None;
        for event in self.backend.drain_select_events() {
            update = self.event(InputEvent::Select(event));
        }
        update
    }

    fn report(&self, index: usize, step: &Step, update: Update) -> StepReport {
        let transform = self.controller.transform();
        StepReport {
            index,
            label: step.to_string(),
            update,
            state: self.controller.state(),
            gesture: self.controller.gesture_kind(),
            position: transform.position,
            scale: transform.scale,
            visible: transform.visible,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario(content: &str) -> Scenario {
        Scenario::from_toml_str(content).unwrap()
    }

    #[test]
    fn test_replay_places_after_misses() {
        let scenario = scenario(
            r#"
            [[step]]
            kind = "tick"
            repeat = 30

            [[step]]
            kind = "tick"
            hit = [1.0, 0.0, -2.0]

            [[step]]
            kind = "tick"
            hit = [3.0, 0.0, -3.0]
            "#,
        );
        let mut replay = Replay::new(&scenario, PlacementConfig::default()).unwrap();
        let reports = replay.run(&scenario.steps);

        assert!(!reports[0].visible);
        assert_eq!(reports[1].state, PlacementState::Placed);
        assert_eq!(reports[1].position, Vec3::new(1.0, 0.0, -2.0));
        assert_eq!(reports[2].position, Vec3::new(1.0, 0.0, -2.0));
    }

    #[test]
    fn test_replay_probes_surfaces() {
        let scenario = scenario(
            r#"
            probe_surfaces = true

            [camera]
            eye = [0.0, 1.0, 0.0]
            target = [0.0, 0.0, -1.0]

            [[surface]]
            point = [0.0, 0.0, 0.0]
            normal = [0.0, 1.0, 0.0]

            [[step]]
            kind = "tick"
            "#,
        );
        let mut replay = Replay::new(&scenario, PlacementConfig::default()).unwrap();
        let reports = replay.run(&scenario.steps);

        assert!(reports[0].visible);
        assert!((reports[0].position - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-3);
    }

    #[test]
    fn test_replay_pinch_and_drag() {
        let scenario = scenario(
            r#"
            [camera]
            eye = [0.0, 1.6, 0.0]
            target = [0.0, 0.0, -2.0]

            [[surface]]
            point = [0.0, 0.0, 0.0]
            normal = [0.0, 1.0, 0.0]

            [[step]]
            kind = "tick"
            hit = [0.0, 0.0, -2.0]

            [[step]]
            kind = "pointer-down"
            id = 1
            x = 300.0
            y = 300.0

            [[step]]
            kind = "pointer-down"
            id = 2
            x = 400.0
            y = 300.0

            [[step]]
            kind = "pointer-move"
            id = 2
            x = 450.0
            y = 300.0

            [[step]]
            kind = "pointer-up"
            id = 1
            x = 300.0
            y = 300.0

            [[step]]
            kind = "pointer-move"
            id = 2
            x = 400.0
            y = 300.0
            "#,
        );
        let config = PlacementConfig {
            initial_scale: 1.0,
            ..PlacementConfig::default()
        };
        let mut replay = Replay::new(&scenario, config).unwrap();
        let reports = replay.run(&scenario.steps);

        assert_eq!(reports[2].gesture, GestureKind::Scale);
        assert_eq!(reports[3].scale, 1.5);
        assert_eq!(reports[4].gesture, GestureKind::Move);

        // Screen center looks at the target on the floor.
        assert!((reports[5].position - Vec3::new(0.0, 0.0, -2.0)).length() < 1e-2);
        assert_eq!(reports[5].scale, 1.5);
    }

    #[test]
    fn test_replay_controller_grab() {
        let scenario = scenario(
            r#"
            [[step]]
            kind = "tick"
            hit = [0.0, 0.0, -1.0]
            controllers = [
                { id = 0, position = [-0.2, 1.0, -0.5] },
                { id = 1, position = [0.2, 1.0, -0.5] },
            ]

            [[step]]
            kind = "select-start"
            controller = 0

            [[step]]
            kind = "select-start"
            controller = 1

            [[step]]
            kind = "tick"
            controllers = [{ id = 1, position = [0.6, 1.0, -0.5] }]

            [[step]]
            kind = "select-end"
            controller = 1
            "#,
        );
        let config = PlacementConfig {
            move_mode: placement::MoveMode::TwoControllerMidpoint,
            ..PlacementConfig::default()
        };
        let mut replay = Replay::new(&scenario, config).unwrap();
        let reports = replay.run(&scenario.steps);

        assert_eq!(reports[2].gesture, GestureKind::Move);
        assert!((reports[2].position - Vec3::new(0.0, 1.0, -0.5)).length() < 1e-6);
        assert!((reports[3].position - Vec3::new(0.2, 1.0, -0.5)).length() < 1e-6);
        assert_eq!(reports[4].gesture, GestureKind::None);
    }

    #[test]
    fn test_end_session_stops_replay() {
        let scenario = scenario(
            r#"
            [[step]]
            kind = "end-session"

            [[step]]
            kind = "tick"
            hit = [0.0, 0.0, -1.0]
            "#,
        );
        let mut replay = Replay::new(&scenario, PlacementConfig::default()).unwrap();
        let reports = replay.run(&scenario.steps);
        assert!(!reports[1].visible);
        assert!(!replay.controller().is_active());
    }
}
