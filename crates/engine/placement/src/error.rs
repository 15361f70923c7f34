//! Error types for the placement engine

use thiserror::Error;

use crate::capability::Capability;

/// Result type for placement operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while setting up placement
///
/// Steady-state conditions (no surface this frame, a raycast that misses,
/// an interrupted touch sequence) are not errors and never show up here.
#[derive(Error, Debug)]
pub enum Error {
    /// The device or browser lacks a capability the session needs
    #[error("Capability unavailable: {0}")]
    CapabilityAbsent(Capability),

    /// Configuration values are out of range or inconsistent
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// TOML configuration could not be parsed
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),
}
