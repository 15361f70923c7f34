//! Controller backend trait for platform-specific implementations
//!
//! A backend owns the connection to the platform's XR input sources
//! (WebXR input sources in the browser, a scripted source in tools) and
//! exposes them as a [`ControllerSet`] plus a queue of select events.

use crate::spatial::{ControllerInfo, ControllerSet, SelectEvent};

/// Trait for spatial controller backends
///
/// Call [`ControllerBackend::poll`] once per frame before reading
/// positions, then drain the select events that arrived since the last
/// frame.
///
/// # Example
///
/// ```ignore
/// backend.poll();
/// for event in backend.drain_select_events() {
///     controller.handle_event(InputEvent::Select(event), &mut ctx);
/// }
/// ctx.controllers = backend.controllers();
/// ```
pub trait ControllerBackend {
    /// Refresh controller positions and collect pending select events
    fn poll(&mut self);

    /// Current controller state
    fn controllers(&self) -> &ControllerSet;

    /// Select events received since the previous call, in arrival order
    fn drain_select_events(&mut self) -> Vec<SelectEvent>;

    /// Connected controllers
    fn enumerate(&self) -> Vec<ControllerInfo> {
        self.controllers().enumerate()
    }

    fn has_controllers(&self) -> bool {
        !self.enumerate().is_empty()
    }

    fn controller_count(&self) -> usize {
        self.enumerate().len()
    }
}

/// Backend for touch-only sessions with no spatial controllers
#[derive(Debug, Default)]
pub struct NullBackend {
    controllers: ControllerSet,
}

impl NullBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ControllerBackend for NullBackend {
    fn poll(&mut self) {}

    fn controllers(&self) -> &ControllerSet {
        &self.controllers
    }

    fn drain_select_events(&mut self) -> Vec<SelectEvent> {
        Vec::new()
    }
}
