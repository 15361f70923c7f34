//! Scripted controller backend

use devices::{ControllerBackend, ControllerSet, SelectEvent};

use crate::scenario::ControllerPose;

/// Controller backend fed from scenario steps
///
/// Steps stage positions and select events; [`ControllerBackend::poll`]
/// applies them in order, the way a frame boundary would.
#[derive(Debug, Default)]
pub struct ReplayBackend {
    controllers: ControllerSet,
    staged_positions: Vec<ControllerPose>,
    staged_selects: Vec<SelectEvent>,
    ready: Vec<SelectEvent>,
}

impl ReplayBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage_positions(&mut self, poses: &[ControllerPose]) {
        self.staged_positions.extend_from_slice(poses);
    }

    pub fn stage_select(&mut self, event: SelectEvent) {
        self.staged_selects.push(event);
    }
}

impl ControllerBackend for ReplayBackend {
    fn poll(&mut self) {
        for pose in self.staged_positions.drain(..) {
            self.controllers.set_position(pose.id, pose.position);
        }
        for event in self.staged_selects.drain(..) {
            if self.controllers.apply_select(event) {
                self.ready.push(event);
            } else {
                tracing::debug!(controller = event.controller, "select had no effect");
            }
        }
    }

    fn controllers(&self) -> &ControllerSet {
        &self.controllers
    }

    fn drain_select_events(&mut self) -> Vec<SelectEvent> {
        std::mem::take(&mut self.ready)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_poll_applies_staged_input() {
        let mut backend = ReplayBackend::new();
        backend.stage_positions(&[ControllerPose {
            id: 4,
            position: Vec3::ONE,
        }]);
        backend.stage_select(SelectEvent::start(4));
        assert!(!backend.has_controllers(), "Nothing applied before poll");

        backend.poll();
        assert_eq!(backend.controller_count(), 1);
        assert_eq!(backend.drain_select_events(), vec![SelectEvent::start(4)]);
        assert!(backend.drain_select_events().is_empty());
        assert_eq!(backend.controllers().selecting_count(), 1);
    }

    #[test]
    fn test_select_for_unknown_controller_is_dropped() {
        let mut backend = ReplayBackend::new();
        backend.stage_select(SelectEvent::start(9));
        backend.poll();
        assert!(backend.drain_select_events().is_empty());
    }
}
