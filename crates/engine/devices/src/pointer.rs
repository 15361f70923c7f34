//! Pointer input support
//!
//! Touch and mouse pointers are tracked by id. Every raw sample that changes
//! the active set is turned into a [`GestureEvent`] carrying the positions of
//! all pointers still down, so consumers never have to reconstruct the
//! multi-touch state themselves.

use glam::Vec2;

/// Raw pointer event phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerPhase {
    /// A finger touched the screen or a mouse button was pressed
    Down,
    /// A pressed pointer moved
    Move,
    /// The pointer was lifted
    Up,
    /// The platform cancelled the pointer (e.g. a system gesture took over)
    Cancel,
}

/// A single raw pointer sample in screen coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
    /// Platform pointer id, stable for the lifetime of one touch
    pub id: u64,
    /// Position in screen pixels
    pub position: Vec2,
    /// Phase of this sample
    pub phase: PointerPhase,
}

impl PointerSample {
    pub fn new(id: u64, position: Vec2, phase: PointerPhase) -> Self {
        Self {
            id,
            position,
            phase,
        }
    }

    pub fn down(id: u64, x: f32, y: f32) -> Self {
        Self::new(id, Vec2::new(x, y), PointerPhase::Down)
    }

    pub fn moved(id: u64, x: f32, y: f32) -> Self {
        Self::new(id, Vec2::new(x, y), PointerPhase::Move)
    }

    pub fn up(id: u64, x: f32, y: f32) -> Self {
        Self::new(id, Vec2::new(x, y), PointerPhase::Up)
    }
}

/// Phase of a multi-pointer gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GesturePhase {
    /// A pointer went down; `positions` includes it
    Start,
    /// An active pointer moved
    Move,
    /// A pointer was released; `positions` holds the ones still down
    End,
}

/// Gesture event derived from the active pointer set
#[derive(Debug, Clone, PartialEq)]
pub struct GestureEvent {
    pub phase: GesturePhase,
    /// Positions of the active pointers, in the order they went down
    pub positions: Vec<Vec2>,
}

impl GestureEvent {
    pub fn start(positions: Vec<Vec2>) -> Self {
        Self {
            phase: GesturePhase::Start,
            positions,
        }
    }

    pub fn moved(positions: Vec<Vec2>) -> Self {
        Self {
            phase: GesturePhase::Move,
            positions,
        }
    }

    pub fn end(remaining: Vec<Vec2>) -> Self {
        Self {
            phase: GesturePhase::End,
            positions: remaining,
        }
    }

    /// Number of pointers down after this event
    pub fn pointer_count(&self) -> usize {
        self.positions.len()
    }

    /// The pointer that went down first
    pub fn primary(&self) -> Option<Vec2> {
        self.positions.first().copied()
    }

    /// Distance between the first two pointers
    ///
    /// Returns `None` unless at least two pointers are active.
    pub fn spread(&self) -> Option<f32> {
        match self.positions.as_slice() {
            [a, b, ..] => Some(a.distance(*b)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct ActivePointer {
    id: u64,
    position: Vec2,
}

/// Multi-pointer tracker
///
/// Feed it raw samples with [`PointerTracker::update`]; it answers with the
/// gesture event the sample produced, or `None` for samples that do not
/// concern a tracked pointer (stray moves, duplicate ups).
#[derive(Debug, Clone, Default)]
pub struct PointerTracker {
    pointers: Vec<ActivePointer>,
    max_pointers: usize,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a raw sample and return the resulting gesture event
    pub fn update(&mut self, sample: PointerSample) -> Option<GestureEvent> {
        match sample.phase {
            PointerPhase::Down => {
                // A down for an id we still hold means we missed its up.
                if let Some(existing) = self.pointers.iter_mut().find(|p| p.id == sample.id) {
                    existing.position = sample.position;
                } else {
                    self.pointers.push(ActivePointer {
                        id: sample.id,
                        position: sample.position,
                    });
                    self.max_pointers = self.max_pointers.max(self.pointers.len());
                }
                Some(GestureEvent::start(self.positions()))
            }
            PointerPhase::Move => {
                let existing = self.pointers.iter_mut().find(|p| p.id == sample.id)?;
                existing.position = sample.position;
                Some(GestureEvent::moved(self.positions()))
            }
            PointerPhase::Up | PointerPhase::Cancel => {
                let before = self.pointers.len();
                self.pointers.retain(|p| p.id != sample.id);
                if self.pointers.len() == before {
                    tracing::debug!(id = sample.id, "release for untracked pointer ignored");
                    return None;
                }
                Some(GestureEvent::end(self.positions()))
            }
        }
    }

    /// Positions of all active pointers in press order
    pub fn positions(&self) -> Vec<Vec2> {
        self.pointers.iter().map(|p| p.position).collect()
    }

    pub fn position_of(&self, id: u64) -> Option<Vec2> {
        self.pointers.iter().find(|p| p.id == id).map(|p| p.position)
    }

    pub fn pointer_count(&self) -> usize {
        self.pointers.len()
    }

    pub fn is_active(&self) -> bool {
        !self.pointers.is_empty()
    }

    /// Drop every pointer, e.g. when the page loses focus
    ///
    /// Returns an end event if anything was active so the consumer can
    /// release its gesture.
    pub fn clear(&mut self) -> Option<GestureEvent> {
        if self.pointers.is_empty() {
            return None;
        }
        self.pointers.clear();
        Some(GestureEvent::end(Vec::new()))
    }

    /// Maximum number of simultaneous pointers seen so far
    pub fn max_pointers_recorded(&self) -> usize {
        self.max_pointers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_pointer_lifecycle() {
        let mut tracker = PointerTracker::new();
        assert!(!tracker.is_active());

        let start = tracker.update(PointerSample::down(1, 10.0, 20.0)).unwrap();
        assert_eq!(start.phase, GesturePhase::Start);
        assert_eq!(start.positions, vec![Vec2::new(10.0, 20.0)]);

        let moved = tracker.update(PointerSample::moved(1, 15.0, 25.0)).unwrap();
        assert_eq!(moved.phase, GesturePhase::Move);
        assert_eq!(moved.primary(), Some(Vec2::new(15.0, 25.0)));

        let end = tracker.update(PointerSample::up(1, 15.0, 25.0)).unwrap();
        assert_eq!(end.phase, GesturePhase::End);
        assert_eq!(end.pointer_count(), 0);
        assert!(!tracker.is_active());
    }

    #[test]
    fn test_second_pointer_reports_both_positions() {
        let mut tracker = PointerTracker::new();
        tracker.update(PointerSample::down(1, 0.0, 0.0));
        let start = tracker.update(PointerSample::down(2, 100.0, 0.0)).unwrap();

        assert_eq!(start.pointer_count(), 2);
        assert_eq!(start.spread(), Some(100.0));
        assert_eq!(tracker.max_pointers_recorded(), 2);
    }

    #[test]
    fn test_release_keeps_remaining_pointer() {
        let mut tracker = PointerTracker::new();
        tracker.update(PointerSample::down(1, 0.0, 0.0));
        tracker.update(PointerSample::down(2, 50.0, 50.0));

        let end = tracker.update(PointerSample::up(1, 0.0, 0.0)).unwrap();
        assert_eq!(end.phase, GesturePhase::End);
        assert_eq!(end.positions, vec![Vec2::new(50.0, 50.0)]);
    }

    #[test]
    fn test_untracked_samples_are_ignored() {
        let mut tracker = PointerTracker::new();
        assert!(tracker.update(PointerSample::moved(7, 1.0, 1.0)).is_none());
        assert!(tracker.update(PointerSample::up(7, 1.0, 1.0)).is_none());
    }

    #[test]
    fn test_duplicate_down_does_not_add_pointer() {
        let mut tracker = PointerTracker::new();
        tracker.update(PointerSample::down(1, 0.0, 0.0));
        let again = tracker.update(PointerSample::down(1, 5.0, 5.0)).unwrap();

        assert_eq!(again.pointer_count(), 1);
        assert_eq!(tracker.position_of(1), Some(Vec2::new(5.0, 5.0)));
    }

    #[test]
    fn test_clear_emits_end_only_when_active() {
        let mut tracker = PointerTracker::new();
        assert!(tracker.clear().is_none());

        tracker.update(PointerSample::down(1, 0.0, 0.0));
        let end = tracker.clear().unwrap();
        assert_eq!(end.phase, GesturePhase::End);
        assert!(end.positions.is_empty());
    }

    #[test]
    fn test_spread_requires_two_pointers() {
        assert_eq!(GestureEvent::moved(vec![Vec2::ZERO]).spread(), None);
        assert_eq!(
            GestureEvent::moved(vec![Vec2::ZERO, Vec2::new(3.0, 4.0)]).spread(),
            Some(5.0)
        );
    }
}
