//! Manipulation state: which gesture is active and what it is anchored to

use std::fmt;

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Gesture currently being interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GestureKind {
    #[default]
    None,
    Move,
    Scale,
}

impl fmt::Display for GestureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GestureKind::None => "none",
            GestureKind::Move => "move",
            GestureKind::Scale => "scale",
        };
        f.write_str(name)
    }
}

/// Input family that owns the active gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureSource {
    Pointer,
    Controllers,
}

/// Anchor data for a move gesture
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MoveAnchor {
    /// Last screen position of the single pointer
    Pointer { last: Vec2 },
    /// Last midpoint of the two selecting controllers
    ControllerPair { last_midpoint: Vec3 },
}

/// Anchor data for a scale gesture, captured once at gesture start
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleAnchor {
    pub initial_distance: f32,
    pub initial_scale: f32,
    /// Distance seen by the latest move, for re-anchoring between moves
    pub current_distance: f32,
}

impl ScaleAnchor {
    pub fn new(distance: f32, scale: f32) -> Self {
        Self {
            initial_distance: distance,
            initial_scale: scale,
            current_distance: distance,
        }
    }

    /// Anchor at the latest distance with a scale changed outside the gesture
    pub fn rebased(&self, scale: f32) -> Self {
        Self::new(self.current_distance, scale)
    }

    /// Scale for the current distance, before clamping
    ///
    /// Always computed from the initial values so repeated events cannot
    /// drift. Equal distances return `initial_scale` exactly.
    pub fn ratio_scale(&self, current_distance: f32) -> f32 {
        if current_distance == self.initial_distance {
            return self.initial_scale;
        }
        self.initial_scale * (current_distance / self.initial_distance)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum GestureAnchor {
    #[default]
    None,
    Move(MoveAnchor),
    Scale(ScaleAnchor),
}

impl GestureAnchor {
    pub fn kind(&self) -> GestureKind {
        match self {
            GestureAnchor::None => GestureKind::None,
            GestureAnchor::Move(_) => GestureKind::Move,
            GestureAnchor::Scale(_) => GestureKind::Scale,
        }
    }
}

/// The single in-progress gesture
///
/// The kind is derived from the anchor, so a move anchor can never be read
/// while scaling or the other way round.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ManipulationState {
    anchor: GestureAnchor,
    source: Option<GestureSource>,
}

impl ManipulationState {
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn moving(source: GestureSource, anchor: MoveAnchor) -> Self {
        Self {
            anchor: GestureAnchor::Move(anchor),
            source: Some(source),
        }
    }

    pub fn scaling(source: GestureSource, anchor: ScaleAnchor) -> Self {
        Self {
            anchor: GestureAnchor::Scale(anchor),
            source: Some(source),
        }
    }

    pub fn kind(&self) -> GestureKind {
        self.anchor.kind()
    }

    pub fn anchor(&self) -> &GestureAnchor {
        &self.anchor
    }

    pub fn anchor_mut(&mut self) -> &mut GestureAnchor {
        &mut self.anchor
    }

    /// `None` while idle
    pub fn source(&self) -> Option<GestureSource> {
        self.source
    }

    pub fn is_idle(&self) -> bool {
        self.kind() == GestureKind::None
    }

    pub fn is_driven_by(&self, source: GestureSource) -> bool {
        self.source == Some(source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratio_scale_is_exact_at_unit_ratio() {
        let anchor = ScaleAnchor::new(137.3, 0.7);
        assert_eq!(anchor.ratio_scale(137.3), 0.7);
    }

    #[test]
    fn test_ratio_scale_follows_distance() {
        let anchor = ScaleAnchor::new(100.0, 1.0);
        assert_eq!(anchor.ratio_scale(150.0), 1.5);
        assert_eq!(anchor.ratio_scale(50.0), 0.5);
    }

    #[test]
    fn test_rebased_anchor_starts_from_latest_distance() {
        let mut anchor = ScaleAnchor::new(100.0, 1.0);
        anchor.current_distance = 150.0;

        let rebased = anchor.rebased(2.0);
        assert_eq!(rebased.initial_distance, 150.0);
        assert_eq!(rebased.ratio_scale(150.0), 2.0);
        assert_eq!(rebased.ratio_scale(300.0), 4.0);
    }

    #[test]
    fn test_kind_tracks_anchor() {
        let idle = ManipulationState::idle();
        assert!(idle.is_idle());
        assert_eq!(idle.source(), None);

        let moving = ManipulationState::moving(
            GestureSource::Pointer,
            MoveAnchor::Pointer { last: Vec2::ZERO },
        );
        assert_eq!(moving.kind(), GestureKind::Move);
        assert!(moving.is_driven_by(GestureSource::Pointer));

        let scaling = ManipulationState::scaling(
            GestureSource::Controllers,
            ScaleAnchor::new(0.4, 1.0),
        );
        assert_eq!(scaling.kind(), GestureKind::Scale);
        assert!(!scaling.is_driven_by(GestureSource::Pointer));
    }
}
