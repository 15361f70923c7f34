//! AR launch sequence
//!
//! Startup runs through a fixed set of checks before the user may enter AR:
//!
//! 1. WebXR presence
//! 2. Model download and AR session support, resolved in either order
//! 3. The user presses "Start AR" and the session is requested
//!
//! Each failure is terminal for the page and reported exactly once as status
//! text. Once running, the launcher hands out the [`Capabilities`] the
//! placement controller needs.

use placement::{Capabilities, PlacementConfig, PlacementController};
use thiserror::Error;
use tracing::{info, warn};

/// User-visible launch failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LaunchError {
    #[error("WebXR is not supported")]
    XrUnavailable,

    #[error("Failed to load model")]
    ModelLoad(String),

    #[error("AR is not supported")]
    ArUnsupported,

    #[error("Failed to start AR")]
    SessionStart(String),
}

impl LaunchError {
    /// Underlying reason, for the console rather than the page
    pub fn detail(&self) -> Option<&str> {
        match self {
            LaunchError::ModelLoad(reason) | LaunchError::SessionStart(reason) => Some(reason),
            LaunchError::XrUnavailable | LaunchError::ArUnsupported => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchState {
    /// Probing for WebXR
    Checking,
    /// Model download and AR support check in flight
    LoadingModel,
    /// Waiting for the user to start the session
    Ready,
    Running,
    Failed(LaunchError),
}

/// What the session granted when it started
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionGrant {
    pub hit_test: bool,
}

#[derive(Debug, Clone)]
pub struct Launcher {
    state: LaunchState,
    capabilities: Capabilities,
    model_loaded: bool,
    ar_checked: bool,
}

impl Default for Launcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Launcher {
    pub fn new() -> Self {
        Self {
            state: LaunchState::Checking,
            capabilities: Capabilities::default(),
            model_loaded: false,
            ar_checked: false,
        }
    }

    pub fn state(&self) -> &LaunchState {
        &self.state
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    /// Result of the `navigator.xr` check
    pub fn xr_detected(&mut self, present: bool) {
        if self.state != LaunchState::Checking {
            return;
        }
        self.capabilities.xr = present;
        if present {
            self.state = LaunchState::LoadingModel;
        } else {
            self.fail(LaunchError::XrUnavailable);
        }
    }

    /// Outcome of the model download
    pub fn model_loaded(&mut self, result: Result<(), String>) {
        if self.state != LaunchState::LoadingModel {
            return;
        }
        match result {
            Ok(()) => {
                self.model_loaded = true;
                self.maybe_ready();
            }
            Err(reason) => self.fail(LaunchError::ModelLoad(reason)),
        }
    }

    /// Result of `isSessionSupported("immersive-ar")`
    pub fn ar_support(&mut self, supported: bool) {
        if self.state != LaunchState::LoadingModel {
            return;
        }
        self.capabilities.immersive_ar = supported;
        if supported {
            self.ar_checked = true;
            self.maybe_ready();
        } else {
            self.fail(LaunchError::ArUnsupported);
        }
    }

    /// Outcome of the session request made after the user pressed start
    pub fn session_started(&mut self, result: Result<SessionGrant, String>) {
        if self.state != LaunchState::Ready {
            return;
        }
        match result {
            Ok(grant) => {
                self.capabilities.hit_test = grant.hit_test;
                self.state = LaunchState::Running;
                info!(hit_test = grant.hit_test, "AR session running");
            }
            Err(reason) => self.fail(LaunchError::SessionStart(reason)),
        }
    }

    /// The session ended; the user may start a new one
    pub fn session_ended(&mut self) {
        if self.state == LaunchState::Running {
            self.capabilities.hit_test = false;
            self.state = LaunchState::Ready;
            info!("AR session ended");
        }
    }

    /// Build a placement controller for the running session
    pub fn controller(&self, config: PlacementConfig) -> placement::Result<PlacementController> {
        PlacementController::for_session(config, &self.capabilities)
    }

    pub fn status_text(&self) -> String {
        match &self.state {
            LaunchState::Checking => "Checking WebXR support".to_string(),
            LaunchState::LoadingModel => "Loading model".to_string(),
            LaunchState::Ready => "Start AR".to_string(),
            LaunchState::Running => String::new(),
            LaunchState::Failed(error) => error.to_string(),
        }
    }

    pub fn start_button_visible(&self) -> bool {
        self.state == LaunchState::Ready
    }

    pub fn loading_visible(&self) -> bool {
        matches!(self.state, LaunchState::Checking | LaunchState::LoadingModel)
    }

    pub fn failure(&self) -> Option<&LaunchError> {
        match &self.state {
            LaunchState::Failed(error) => Some(error),
            _ => None,
        }
    }

    fn maybe_ready(&mut self) {
        if self.model_loaded && self.ar_checked {
            self.state = LaunchState::Ready;
        }
    }

    fn fail(&mut self, error: LaunchError) {
        match error.detail() {
            Some(detail) => warn!("{}: {}", error, detail),
            None => warn!("{}", error),
        }
        self.state = LaunchState::Failed(error);
    }
}
