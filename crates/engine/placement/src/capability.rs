//! Device capabilities required before a placement session can exist

use std::fmt;

use crate::error::{Error, Result};

/// A platform capability the AR session depends on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// The WebXR device API itself
    WebXr,
    /// Support for `immersive-ar` sessions
    ImmersiveAr,
    /// Environment hit-testing (the surface locator)
    HitTest,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Capability::WebXr => "WebXR",
            Capability::ImmersiveAr => "immersive AR session",
            Capability::HitTest => "surface hit-test",
        };
        f.write_str(name)
    }
}

/// Capabilities reported by the platform at startup
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    pub xr: bool,
    pub immersive_ar: bool,
    pub hit_test: bool,
}

impl Capabilities {
    /// Everything available
    pub fn all() -> Self {
        Self {
            xr: true,
            immersive_ar: true,
            hit_test: true,
        }
    }

    /// First missing capability, in the order the platform is probed
    pub fn missing(&self) -> Option<Capability> {
        if !self.xr {
            Some(Capability::WebXr)
        } else if !self.immersive_ar {
            Some(Capability::ImmersiveAr)
        } else if !self.hit_test {
            Some(Capability::HitTest)
        } else {
            None
        }
    }

    pub fn require(&self) -> Result<()> {
        match self.missing() {
            Some(capability) => Err(Error::CapabilityAbsent(capability)),
            None => Ok(()),
        }
    }
}
