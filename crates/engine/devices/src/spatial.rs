//! Spatial (6-DoF) controller state
//!
//! Tracks the world position and select (trigger) state of hand-held XR
//! controllers. Positions are refreshed once per frame; select changes
//! arrive as discrete events between frames.

use glam::Vec3;

/// Controller information for enumeration
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerInfo {
    /// Unique identifier for this controller
    pub id: usize,
    /// Human-readable name reported by the platform
    pub name: String,
    /// Whether the controller is currently connected
    pub connected: bool,
}

/// Select phase of a controller trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectPhase {
    Start,
    End,
}

/// Discrete select event (`selectstart` / `selectend`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectEvent {
    pub controller: usize,
    pub phase: SelectPhase,
}

impl SelectEvent {
    pub fn start(controller: usize) -> Self {
        Self {
            controller,
            phase: SelectPhase::Start,
        }
    }

    pub fn end(controller: usize) -> Self {
        Self {
            controller,
            phase: SelectPhase::End,
        }
    }
}

/// State of one tracked controller
#[derive(Debug, Clone, PartialEq)]
pub struct SpatialController {
    pub id: usize,
    pub name: String,
    /// World position of the grip, updated every frame
    pub position: Vec3,
    /// Whether the select trigger is held
    pub selecting: bool,
    pub connected: bool,
}

impl SpatialController {
    pub fn new(id: usize, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            position: Vec3::ZERO,
            selecting: false,
            connected: true,
        }
    }

    pub fn info(&self) -> ControllerInfo {
        ControllerInfo {
            id: self.id,
            name: self.name.clone(),
            connected: self.connected,
        }
    }
}

/// All controllers seen during a session
#[derive(Debug, Clone, Default)]
pub struct ControllerSet {
    controllers: Vec<SpatialController>,
}

impl ControllerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a controller, or reconnect one seen before
    pub fn connect(&mut self, id: usize, name: impl Into<String>) {
        let name = name.into();
        match self.get_mut(id) {
            Some(existing) => {
                existing.connected = true;
                existing.name = name;
            }
            None => self.controllers.push(SpatialController::new(id, name)),
        }
    }

    /// Mark a controller as gone; it stops selecting immediately
    pub fn disconnect(&mut self, id: usize) {
        if let Some(existing) = self.get_mut(id) {
            existing.connected = false;
            existing.selecting = false;
        }
    }

    /// Update a controller's world position, registering it if unknown
    pub fn set_position(&mut self, id: usize, position: Vec3) {
        if self.get(id).is_none() {
            self.connect(id, format!("controller-{id}"));
        }
        if let Some(existing) = self.get_mut(id) {
            existing.position = position;
        }
    }

    /// Apply a select event
    ///
    /// Returns `true` when the select state actually changed. Events for
    /// unknown or disconnected controllers are dropped.
    pub fn apply_select(&mut self, event: SelectEvent) -> bool {
        let Some(existing) = self.get_mut(event.controller) else {
            tracing::debug!(controller = event.controller, "select for unknown controller");
            return false;
        };
        if !existing.connected {
            return false;
        }
        let selecting = event.phase == SelectPhase::Start;
        let changed = existing.selecting != selecting;
        existing.selecting = selecting;
        changed
    }

    pub fn get(&self, id: usize) -> Option<&SpatialController> {
        self.controllers.iter().find(|c| c.id == id)
    }

    fn get_mut(&mut self, id: usize) -> Option<&mut SpatialController> {
        self.controllers.iter_mut().find(|c| c.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SpatialController> {
        self.controllers.iter()
    }

    /// Connected controllers whose trigger is held
    pub fn selecting(&self) -> impl Iterator<Item = &SpatialController> {
        self.controllers.iter().filter(|c| c.connected && c.selecting)
    }

    pub fn selecting_count(&self) -> usize {
        self.selecting().count()
    }

    /// Positions of the first two selecting controllers
    pub fn selecting_pair(&self) -> Option<(Vec3, Vec3)> {
        let mut selecting = self.selecting();
        let a = selecting.next()?;
        let b = selecting.next()?;
        Some((a.position, b.position))
    }

    pub fn enumerate(&self) -> Vec<ControllerInfo> {
        self.controllers
            .iter()
            .filter(|c| c.connected)
            .map(SpatialController::info)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_requires_known_controller() {
        let mut set = ControllerSet::new();
        assert!(!set.apply_select(SelectEvent::start(0)));

        set.connect(0, "left");
        assert!(set.apply_select(SelectEvent::start(0)));
        assert!(!set.apply_select(SelectEvent::start(0)));
        assert_eq!(set.selecting_count(), 1);
    }

    #[test]
    fn test_selecting_pair() {
        let mut set = ControllerSet::new();
        set.set_position(0, Vec3::new(-1.0, 0.0, 0.0));
        set.set_position(1, Vec3::new(1.0, 0.0, 0.0));
        assert!(set.selecting_pair().is_none());

        set.apply_select(SelectEvent::start(0));
        assert!(set.selecting_pair().is_none());

        set.apply_select(SelectEvent::start(1));
        let (a, b) = set.selecting_pair().unwrap();
        assert_eq!(a, Vec3::new(-1.0, 0.0, 0.0));
        assert_eq!(b, Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_disconnect_releases_select() {
        let mut set = ControllerSet::new();
        set.connect(3, "right");
        set.apply_select(SelectEvent::start(3));
        set.disconnect(3);

        assert_eq!(set.selecting_count(), 0);
        assert!(set.enumerate().is_empty());
        assert!(!set.apply_select(SelectEvent::start(3)));
    }

    #[test]
    fn test_set_position_registers_controller() {
        let mut set = ControllerSet::new();
        set.set_position(2, Vec3::ONE);

        let info = set.enumerate();
        assert_eq!(info.len(), 1);
        assert_eq!(info[0].name, "controller-2");
        assert_eq!(set.get(2).map(|c| c.position), Some(Vec3::ONE));
    }
}
