//! Browser AR model viewer
//!
//! The page-side state that wraps the placement engine: the startup checks
//! leading to an AR session and the QR scanner on the entry page. In the
//! browser, the `web` module exposes both to JavaScript together with the
//! placement controller bindings.

pub mod launch;
pub mod scanner;

#[cfg(target_arch = "wasm32")]
mod web;

pub use launch::{LaunchError, LaunchState, Launcher, SessionGrant};
pub use scanner::{EntryScanner, ScannerState, AR_PAGE, REDIRECT_DELAY_MS};

#[cfg(target_arch = "wasm32")]
pub use web::{WasmEntryScanner, WasmLauncher};
