//! # Touch Input Module
//!
//! Touch events as delivered to the overlay.
//!
//! Every event carries the masked action, the index of the pointer the
//! action refers to, and the coordinates of every pointer that is currently
//! down. This mirrors the multi-pointer event model of mobile platforms and
//! of the Linux multitouch protocol.
//!
//! | Action | Meaning |
//! |--------|---------|
//! | `Down` | First pointer went down |
//! | `PointerDown` | Additional pointer went down (`index` = new pointer) |
//! | `Move` | One or more pointers moved |
//! | `PointerUp` | A non-last pointer went up (`index` = lifted pointer) |
//! | `Up` | Last pointer went up |
//! | `Cancel` | The gesture was aborted |
//!
//! This module handles:
//! - Event and pointer types (serde-deserializable for scripted replay)
//! - Pointer ownership bookkeeping ([`ownership`])
//! - Linux touchscreen decoding ([`evdev_source`])

pub mod evdev_source;
pub mod ownership;

use serde::{Deserialize, Serialize};

/// Stable identifier of one finger for the lifetime of its contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PointerId(pub u32);

/// Masked touch action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TouchAction {
    Down,
    PointerDown,
    Move,
    PointerUp,
    Up,
    Cancel,
}

impl TouchAction {
    /// `Down` or `PointerDown`.
    #[must_use]
    pub const fn is_down(self) -> bool {
        matches!(self, TouchAction::Down | TouchAction::PointerDown)
    }

    /// `Up`, `PointerUp` or `Cancel`.
    #[must_use]
    pub const fn is_release(self) -> bool {
        matches!(self, TouchAction::Up | TouchAction::PointerUp | TouchAction::Cancel)
    }

    /// Actions whose pointer is given by the event's action index.
    #[must_use]
    pub const fn uses_action_index(self) -> bool {
        matches!(self, TouchAction::PointerDown | TouchAction::PointerUp)
    }
}

/// One live pointer inside an event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TouchPointer {
    pub id: PointerId,
    pub x: f32,
    pub y: f32,
}

impl TouchPointer {
    #[must_use]
    pub const fn new(id: u32, x: f32, y: f32) -> Self {
        Self { id: PointerId(id), x, y }
    }

    /// Pixel position used for hit tests (truncating).
    #[must_use]
    pub fn pixel(&self) -> (i32, i32) {
        (self.x as i32, self.y as i32)
    }
}

/// A single touch event.
///
/// # Examples
///
/// ```
/// use pad_overlay::touch::{TouchAction, TouchEvent, TouchPointer};
///
/// let event = TouchEvent::down(TouchPointer::new(3, 10.0, 20.0));
/// assert_eq!(event.action, TouchAction::Down);
/// assert_eq!(event.action_pointer().unwrap().id.0, 3);
///
/// let json = r#"{"action":"pointer_up","index":1,"pointers":[
///     {"id":0,"x":1.0,"y":1.0},{"id":4,"x":2.0,"y":2.0}]}"#;
/// let event: TouchEvent = serde_json::from_str(json).unwrap();
/// assert_eq!(event.action_pointer().unwrap().id.0, 4);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TouchEvent {
    pub action: TouchAction,
    /// Index into `pointers` of the pointer the action refers to.
    #[serde(default)]
    pub index: usize,
    pub pointers: Vec<TouchPointer>,
}

impl TouchEvent {
    #[must_use]
    pub fn new(action: TouchAction, index: usize, pointers: Vec<TouchPointer>) -> Self {
        Self { action, index, pointers }
    }

    /// Single-pointer `Down`.
    #[must_use]
    pub fn down(pointer: TouchPointer) -> Self {
        Self::new(TouchAction::Down, 0, vec![pointer])
    }

    /// Single-pointer `Move`.
    #[must_use]
    pub fn moved(pointer: TouchPointer) -> Self {
        Self::new(TouchAction::Move, 0, vec![pointer])
    }

    /// Single-pointer `Up`.
    #[must_use]
    pub fn up(pointer: TouchPointer) -> Self {
        Self::new(TouchAction::Up, 0, vec![pointer])
    }

    /// Index of the pointer this action refers to.
    ///
    /// Pointer-down/up actions use the event's action index; every other
    /// action refers to the first pointer.
    #[must_use]
    pub fn pointer_index(&self) -> usize {
        if self.action.uses_action_index() {
            self.index
        } else {
            0
        }
    }

    /// Pointer the action refers to, or `None` for a malformed event.
    #[must_use]
    pub fn action_pointer(&self) -> Option<&TouchPointer> {
        self.pointers.get(self.pointer_index())
    }

    /// Pointer at `index`, or `None` when out of range.
    #[must_use]
    pub fn pointer(&self, index: usize) -> Option<&TouchPointer> {
        self.pointers.get(index)
    }

    /// Looks a pointer up by identifier.
    #[must_use]
    pub fn find(&self, id: PointerId) -> Option<&TouchPointer> {
        self.pointers.iter().find(|p| p.id == id)
    }

    /// Returns true when this event releases `id`.
    ///
    /// Up/pointer-up release the action pointer; a cancel releases every
    /// listed pointer, or everything when no pointer is listed.
    #[must_use]
    pub fn releases(&self, id: PointerId) -> bool {
        match self.action {
            TouchAction::Up | TouchAction::PointerUp => {
                self.action_pointer().is_some_and(|p| p.id == id)
            }
            TouchAction::Cancel => self.pointers.is_empty() || self.find(id).is_some(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_classification() {
        assert!(TouchAction::Down.is_down());
        assert!(TouchAction::PointerDown.is_down());
        assert!(!TouchAction::Move.is_down());

        assert!(TouchAction::Up.is_release());
        assert!(TouchAction::PointerUp.is_release());
        assert!(TouchAction::Cancel.is_release());
        assert!(!TouchAction::Move.is_release());
    }

    #[test]
    fn test_pointer_index_for_primary_actions() {
        let event = TouchEvent::new(
            TouchAction::Move,
            1,
            vec![TouchPointer::new(0, 1.0, 1.0), TouchPointer::new(1, 2.0, 2.0)],
        );
        assert_eq!(event.pointer_index(), 0);
        assert_eq!(event.action_pointer().unwrap().id, PointerId(0));
    }

    #[test]
    fn test_pointer_index_for_secondary_actions() {
        let event = TouchEvent::new(
            TouchAction::PointerDown,
            1,
            vec![TouchPointer::new(0, 1.0, 1.0), TouchPointer::new(7, 2.0, 2.0)],
        );
        assert_eq!(event.action_pointer().unwrap().id, PointerId(7));
    }

    #[test]
    fn test_out_of_range_index() {
        let event = TouchEvent::new(TouchAction::PointerUp, 5, vec![TouchPointer::new(0, 1.0, 1.0)]);
        assert!(event.action_pointer().is_none());
        assert!(!event.releases(PointerId(0)));
    }

    #[test]
    fn test_releases() {
        let up = TouchEvent::up(TouchPointer::new(2, 0.0, 0.0));
        assert!(up.releases(PointerId(2)));
        assert!(!up.releases(PointerId(3)));

        let cancel_all = TouchEvent::new(TouchAction::Cancel, 0, vec![]);
        assert!(cancel_all.releases(PointerId(9)));

        let cancel_one = TouchEvent::new(TouchAction::Cancel, 0, vec![TouchPointer::new(1, 0.0, 0.0)]);
        assert!(cancel_one.releases(PointerId(1)));
        assert!(!cancel_one.releases(PointerId(2)));

        let moved = TouchEvent::moved(TouchPointer::new(2, 0.0, 0.0));
        assert!(!moved.releases(PointerId(2)));
    }

    #[test]
    fn test_pixel_truncates() {
        assert_eq!(TouchPointer::new(0, 10.9, -0.5).pixel(), (10, 0));
    }

    #[test]
    fn test_deserialize_without_index() {
        let json = r#"{"action":"move","pointers":[{"id":1,"x":5.5,"y":6.0}]}"#;
        let event: TouchEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.action, TouchAction::Move);
        assert_eq!(event.index, 0);
        assert_eq!(event.find(PointerId(1)).unwrap().x, 5.5);
    }
}
