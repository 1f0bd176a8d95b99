//! Rectangular push button bound to flags in both digital fields.

use crate::geometry::Rect;
use crate::state::DigitalField;
use crate::touch::ownership::{ControlHandle, SlotKey};
use crate::touch::{TouchAction, TouchEvent};

use super::layout::{ControlLayout, ScaleAnchor};
use super::{LayoutControl, TouchContext};

/// Single-pointer push button.
///
/// The identity is derived from the bound flags (`button_<d1>_<d2>`), so two
/// buttons with the same bindings would collide in the store.
///
/// # Examples
///
/// ```
/// use pad_overlay::controls::{Button, LayoutControl, TouchContext};
/// use pad_overlay::geometry::Rect;
/// use pad_overlay::state::{ControllerState, Digital2, DigitalField};
/// use pad_overlay::touch::ownership::{ControlHandle, TouchOwnership};
/// use pad_overlay::touch::{TouchEvent, TouchPointer};
///
/// let mut cross = Button::new(Rect::from_size(0, 0, 100, 100), 0, Digital2::CROSS.bits());
/// let mut owners = TouchOwnership::new();
/// let mut state = ControllerState::default();
///
/// let down = TouchEvent::down(TouchPointer::new(1, 50.0, 50.0));
/// let mut ctx = TouchContext { owners: &mut owners, state: &mut state };
/// assert!(cross.on_touch(ControlHandle(0), &down, 0, &mut ctx));
/// assert!(state.is_pressed(DigitalField::Second, Digital2::CROSS.bits()));
/// assert_eq!(cross.id(), "button_0_64");
/// ```
#[derive(Debug, Clone)]
pub struct Button {
    layout: ControlLayout,
    digital1: u32,
    digital2: u32,
    pressed: bool,
}

impl Button {
    #[must_use]
    pub fn new(rect: Rect, digital1: u32, digital2: u32) -> Self {
        let id = format!("button_{}_{}", digital1, digital2);
        Self {
            layout: ControlLayout::new(id, rect, ScaleAnchor::TopLeft),
            digital1,
            digital2,
            pressed: false,
        }
    }

    #[must_use]
    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    /// Bound flags as `(digital1, digital2)`.
    #[must_use]
    pub fn bits(&self) -> (u32, u32) {
        (self.digital1, self.digital2)
    }

    /// Draw alpha: opaque while pressed, the configured opacity otherwise.
    #[must_use]
    pub fn alpha(&self) -> u8 {
        if self.pressed {
            u8::MAX
        } else {
            self.layout.alpha()
        }
    }

    /// Feeds one touch event; returns true when the button changed.
    ///
    /// `pointer_index` selects the pointer a down or up action refers to.
    /// The bound flags are written to `ctx.state` on every call.
    pub fn on_touch(
        &mut self,
        handle: ControlHandle,
        event: &TouchEvent,
        pointer_index: usize,
        ctx: &mut TouchContext<'_>,
    ) -> bool {
        let slot = SlotKey::new(handle, 0);
        let mut hit = false;

        match event.action {
            TouchAction::Down | TouchAction::PointerDown => {
                if let Some(pointer) = event.pointer(pointer_index) {
                    if !ctx.owners.is_owned(slot) && ctx.owners.claim(slot, pointer.id) {
                        self.pressed = true;
                        hit = true;
                    }
                }
            }
            TouchAction::Move => {
                // A free finger sliding onto the button presses it
                if !ctx.owners.is_owned(slot) && self.layout.enabled() {
                    let entering = event.pointers.iter().find(|p| {
                        let (x, y) = p.pixel();
                        !ctx.owners.is_busy(p.id) && self.layout.contains(x, y)
                    });
                    if let Some(pointer) = entering {
                        if ctx.owners.claim(slot, pointer.id) {
                            self.pressed = true;
                            hit = true;
                        }
                    }
                }
            }
            TouchAction::Up | TouchAction::PointerUp | TouchAction::Cancel => {
                if let Some(owner) = ctx.owners.owner(slot) {
                    if event.releases(owner) {
                        ctx.owners.release(slot);
                        self.pressed = false;
                        hit = true;
                    }
                }
            }
        }

        if self.pressed {
            ctx.state.set_bits(DigitalField::First, self.digital1);
            ctx.state.set_bits(DigitalField::Second, self.digital2);
        } else {
            ctx.state.clear_bits(DigitalField::First, self.digital1);
            ctx.state.clear_bits(DigitalField::Second, self.digital2);
        }

        hit
    }
}

impl LayoutControl for Button {
    fn layout(&self) -> &ControlLayout {
        &self.layout
    }

    fn layout_mut(&mut self) -> &mut ControlLayout {
        &mut self.layout
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{ControllerState, Digital1, Digital2};
    use crate::touch::ownership::TouchOwnership;
    use crate::touch::TouchPointer;

    const HANDLE: ControlHandle = ControlHandle(3);

    struct Harness {
        button: Button,
        owners: TouchOwnership,
        state: ControllerState,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                button: Button::new(Rect::from_size(100, 100, 50, 50), 0, Digital2::CROSS.bits()),
                owners: TouchOwnership::new(),
                state: ControllerState::default(),
            }
        }

        fn touch(&mut self, event: &TouchEvent) -> bool {
            let index = event.pointer_index();
            let mut ctx = TouchContext {
                owners: &mut self.owners,
                state: &mut self.state,
            };
            self.button.on_touch(HANDLE, event, index, &mut ctx)
        }

        fn cross(&self) -> bool {
            self.state.is_pressed(DigitalField::Second, Digital2::CROSS.bits())
        }
    }

    #[test]
    fn test_press_and_release() {
        let mut h = Harness::new();
        assert!(h.touch(&TouchEvent::down(TouchPointer::new(1, 120.0, 120.0))));
        assert!(h.cross());
        assert!(h.button.is_pressed());
        assert_eq!(h.button.alpha(), 255);

        assert!(h.touch(&TouchEvent::up(TouchPointer::new(1, 120.0, 120.0))));
        assert!(!h.cross());
        assert!(h.owners.is_empty());
    }

    #[test]
    fn test_release_outside_region_still_releases() {
        let mut h = Harness::new();
        h.touch(&TouchEvent::down(TouchPointer::new(1, 120.0, 120.0)));
        assert!(h.touch(&TouchEvent::up(TouchPointer::new(1, 900.0, 900.0))));
        assert!(!h.cross());
    }

    #[test]
    fn test_second_pointer_cannot_steal() {
        let mut h = Harness::new();
        h.touch(&TouchEvent::down(TouchPointer::new(1, 120.0, 120.0)));

        let second = TouchEvent::new(
            TouchAction::PointerDown,
            1,
            vec![TouchPointer::new(1, 120.0, 120.0), TouchPointer::new(2, 130.0, 130.0)],
        );
        assert!(!h.touch(&second));

        // Lifting the non-owner leaves the button pressed
        let lift = TouchEvent::new(
            TouchAction::PointerUp,
            1,
            vec![TouchPointer::new(1, 120.0, 120.0), TouchPointer::new(2, 130.0, 130.0)],
        );
        assert!(!h.touch(&lift));
        assert!(h.cross());
    }

    #[test]
    fn test_slide_in_presses() {
        let mut h = Harness::new();
        assert!(!h.touch(&TouchEvent::moved(TouchPointer::new(4, 10.0, 10.0))));
        assert!(!h.cross());

        assert!(h.touch(&TouchEvent::moved(TouchPointer::new(4, 110.0, 110.0))));
        assert!(h.cross());
        assert_eq!(h.owners.owner(SlotKey::new(HANDLE, 0)), Some(crate::touch::PointerId(4)));
    }

    #[test]
    fn test_slide_in_ignores_busy_pointer() {
        let mut h = Harness::new();
        h.owners.claim(SlotKey::new(ControlHandle(9), 0), crate::touch::PointerId(4));
        assert!(!h.touch(&TouchEvent::moved(TouchPointer::new(4, 110.0, 110.0))));
        assert!(!h.cross());
    }

    #[test]
    fn test_cancel_releases() {
        let mut h = Harness::new();
        h.touch(&TouchEvent::down(TouchPointer::new(1, 120.0, 120.0)));
        assert!(h.touch(&TouchEvent::new(TouchAction::Cancel, 0, vec![])));
        assert!(!h.cross());
        assert!(h.owners.is_empty());
    }

    #[test]
    fn test_both_fields_written() {
        let mut h = Harness::new();
        h.button = Button::new(Rect::from_size(0, 0, 10, 10), Digital1::START.bits(), Digital2::L1.bits());
        h.touch(&TouchEvent::down(TouchPointer::new(1, 5.0, 5.0)));
        assert_eq!(h.state.digital1, Digital1::START.bits());
        assert_eq!(h.state.digital2, Digital2::L1.bits());
    }

    #[test]
    fn test_scale_keeps_top_left() {
        let mut h = Harness::new();
        let mut store = crate::store::MemoryStore::new();
        h.button.set_scale(10, &mut store);
        assert_eq!(h.button.bounds(), Rect::from_size(100, 100, 102, 102));
    }
}
