//! Input device abstractions for AR placement
//!
//! Platform-agnostic input tracking that compiles both natively and to
//! WebAssembly.
//!
//! # Modules
//!
//! - [`pointer`]: Touch/mouse pointer tracking and gesture events
//! - [`spatial`]: 6-DoF XR controller positions and select state
//! - [`backend`]: Controller backend trait for platform-specific sources

pub mod backend;
pub mod pointer;
pub mod spatial;

pub use backend::{ControllerBackend, NullBackend};
pub use pointer::{GestureEvent, GesturePhase, PointerPhase, PointerSample, PointerTracker};
pub use spatial::{
    ControllerInfo, ControllerSet, SelectEvent, SelectPhase, SpatialController,
};
