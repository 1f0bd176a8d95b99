//! # Directional Pad
//!
//! A rectangular region split at touch time into four edge zones. Touches
//! near two adjacent edges activate both (diagonals); opposite edges are
//! exclusive because left is tested before right and top before bottom.
//!
//! A pad follows one finger, or two independent fingers when built with
//! `multitouch` (the face-button cluster). Each finger's zones are tracked
//! in its own slot and all slots are OR-ed into the bound digital field.

use bitflags::bitflags;

use crate::geometry::Rect;
use crate::state::DigitalField;
use crate::touch::ownership::{ControlHandle, SlotKey};
use crate::touch::{TouchAction, TouchEvent};

use super::layout::{ControlLayout, ScaleAnchor};
use super::{LayoutControl, TouchContext};

/// Default edge-threshold divisor: an edge is active within `width / 3.5`.
pub const DEFAULT_EDGE_DIVISOR: f32 = 3.5;

bitflags! {
    /// Active edge zones of one pad slot.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct DpadDirection: u8 {
        const TOP    = 0b0001;
        const LEFT   = 0b0010;
        const RIGHT  = 0b0100;
        const BOTTOM = 0b1000;
    }
}

/// Digital flags a pad writes for each edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PadBits {
    pub top: u32,
    pub left: u32,
    pub right: u32,
    pub bottom: u32,
}

impl PadBits {
    #[must_use]
    pub const fn new(top: u32, left: u32, right: u32, bottom: u32) -> Self {
        Self { top, left, right, bottom }
    }

    /// Union of all four flags.
    #[must_use]
    pub const fn all(&self) -> u32 {
        self.top | self.left | self.right | self.bottom
    }

    /// Flags for a set of active directions.
    #[must_use]
    pub fn for_directions(&self, directions: DpadDirection) -> u32 {
        let mut bits = 0;
        if directions.contains(DpadDirection::TOP) {
            bits |= self.top;
        }
        if directions.contains(DpadDirection::LEFT) {
            bits |= self.left;
        }
        if directions.contains(DpadDirection::RIGHT) {
            bits |= self.right;
        }
        if directions.contains(DpadDirection::BOTTOM) {
            bits |= self.bottom;
        }
        bits
    }
}

/// Four-way pad with one or two touch slots.
#[derive(Debug, Clone)]
pub struct DirectionalPad {
    layout: ControlLayout,
    field: DigitalField,
    bits: PadBits,
    multitouch: bool,
    edge_divisor: f32,
    /// Sub-button size at construction, as `(width, height)`.
    design_button: (i32, i32),
    slots: [DpadDirection; 2],
}

impl DirectionalPad {
    /// Creates a pad over `area`.
    ///
    /// `button_size` is the drawn size of each edge sub-button; it scales
    /// with the pad.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        area: Rect,
        button_size: (i32, i32),
        field: DigitalField,
        bits: PadBits,
        multitouch: bool,
    ) -> Self {
        Self {
            layout: ControlLayout::new(id, area, ScaleAnchor::Center),
            field,
            bits,
            multitouch,
            edge_divisor: DEFAULT_EDGE_DIVISOR,
            design_button: button_size,
            slots: [DpadDirection::empty(); 2],
        }
    }

    /// Overrides the edge-threshold divisor.
    ///
    /// Non-positive or non-finite values keep the default.
    #[must_use]
    pub fn with_edge_divisor(mut self, divisor: f32) -> Self {
        if divisor.is_finite() && divisor > 0.0 {
            self.edge_divisor = divisor;
        }
        self
    }

    #[must_use]
    pub fn edge_divisor(&self) -> f32 {
        self.edge_divisor
    }

    #[must_use]
    pub fn is_multitouch(&self) -> bool {
        self.multitouch
    }

    fn slot_count(&self) -> u8 {
        if self.multitouch {
            2
        } else {
            1
        }
    }

    /// Returns true when any slot has `direction` active.
    #[must_use]
    pub fn is_active(&self, direction: DpadDirection) -> bool {
        self.slots.iter().any(|s| s.contains(direction))
    }

    /// Active directions of every slot combined.
    #[must_use]
    pub fn active_directions(&self) -> DpadDirection {
        self.slots[0] | self.slots[1]
    }

    /// Edge zones hit by a touch at `(x, y)`.
    ///
    /// An empty region never reports a zone.
    ///
    /// # Examples
    ///
    /// ```
    /// use pad_overlay::controls::dpad::{DirectionalPad, DpadDirection, PadBits};
    /// use pad_overlay::geometry::Rect;
    /// use pad_overlay::state::DigitalField;
    ///
    /// let pad = DirectionalPad::new(
    ///     "dpad",
    ///     Rect::from_size(0, 0, 350, 350),
    ///     (100, 100),
    ///     DigitalField::First,
    ///     PadBits::new(1, 2, 4, 8),
    ///     false,
    /// );
    /// assert_eq!(pad.directions_at(10.0, 10.0), DpadDirection::TOP | DpadDirection::LEFT);
    /// assert_eq!(pad.directions_at(175.0, 340.0), DpadDirection::BOTTOM);
    /// assert!(pad.directions_at(175.0, 175.0).is_empty());
    /// ```
    #[must_use]
    pub fn directions_at(&self, x: f32, y: f32) -> DpadDirection {
        let area = self.layout.rect();
        if area.is_empty() {
            return DpadDirection::empty();
        }

        let threshold = area.width() as f32 / self.edge_divisor;
        let left = x - (area.left as f32) < threshold;
        let right = !left && (area.right as f32) - x < threshold;
        let top = y - (area.top as f32) < threshold;
        let bottom = !top && (area.bottom as f32) - y < threshold;

        let mut directions = DpadDirection::empty();
        directions.set(DpadDirection::TOP, top);
        directions.set(DpadDirection::LEFT, left);
        directions.set(DpadDirection::RIGHT, right);
        directions.set(DpadDirection::BOTTOM, bottom);
        directions
    }

    /// Current drawn size of each edge sub-button.
    #[must_use]
    pub fn button_size(&self) -> (i32, i32) {
        let area = self.layout.rect();
        let design = self.layout.default_rect();
        if design.width() <= 0 || design.height() <= 0 {
            return self.design_button;
        }
        (
            (self.design_button.0 as f32 * area.width() as f32 / design.width() as f32) as i32,
            (self.design_button.1 as f32 * area.height() as f32 / design.height() as f32) as i32,
        )
    }

    /// Drawn bounds of the four edge sub-buttons.
    #[must_use]
    pub fn sub_button_bounds(&self) -> [(DpadDirection, Rect); 4] {
        let area = self.layout.rect();
        let (cx, cy) = area.center();
        let (w, h) = self.button_size();
        let (x0, x1) = (cx.saturating_sub(w / 2), cx.saturating_add(w / 2));
        let (y0, y1) = (cy.saturating_sub(w / 2), cy.saturating_add(w / 2));
        [
            (DpadDirection::TOP, Rect::new(x0, area.top, x1, area.top.saturating_add(h))),
            (DpadDirection::LEFT, Rect::new(area.left, y0, area.left.saturating_add(h), y1)),
            (DpadDirection::RIGHT, Rect::new(area.right.saturating_sub(h), y0, area.right, y1)),
            (DpadDirection::BOTTOM, Rect::new(x0, area.bottom.saturating_sub(h), x1, area.bottom)),
        ]
    }

    /// Feeds one touch event; returns true when the pad handled it or the
    /// action pointer lies inside the pad.
    ///
    /// A down claims at most one free slot. A move re-evaluates every slot
    /// whose owner appears in the event. A release clears the slots owned by
    /// the released pointers.
    pub fn on_touch(
        &mut self,
        handle: ControlHandle,
        event: &TouchEvent,
        pointer_index: usize,
        ctx: &mut TouchContext<'_>,
    ) -> bool {
        let mut hit = false;

        match event.action {
            TouchAction::Down | TouchAction::PointerDown => {
                if let Some(pointer) = event.pointer(pointer_index) {
                    for slot in 0..self.slot_count() {
                        let key = SlotKey::new(handle, slot);
                        let claimed = match ctx.owners.owner(key) {
                            Some(owner) => owner == pointer.id,
                            None => ctx.owners.claim(key, pointer.id),
                        };
                        if claimed {
                            self.slots[usize::from(slot)] = self.directions_at(pointer.x, pointer.y);
                            hit = true;
                            break;
                        }
                    }
                }
            }
            TouchAction::Move => {
                for slot in 0..self.slot_count() {
                    let key = SlotKey::new(handle, slot);
                    let Some(owner) = ctx.owners.owner(key) else { continue };
                    if let Some(pointer) = event.find(owner) {
                        self.slots[usize::from(slot)] = self.directions_at(pointer.x, pointer.y);
                        hit = true;
                    }
                }
            }
            TouchAction::Up | TouchAction::PointerUp | TouchAction::Cancel => {
                for slot in 0..self.slot_count() {
                    let key = SlotKey::new(handle, slot);
                    let Some(owner) = ctx.owners.owner(key) else { continue };
                    if event.releases(owner) {
                        ctx.owners.release(key);
                        self.slots[usize::from(slot)] = DpadDirection::empty();
                        hit = true;
                    }
                }
            }
        }

        ctx.state.clear_bits(self.field, self.bits.all());
        ctx.state
            .set_bits(self.field, self.bits.for_directions(self.active_directions()));

        hit || event.action_pointer().is_some_and(|p| {
            let (x, y) = p.pixel();
            self.layout.contains(x, y)
        })
    }
}

impl LayoutControl for DirectionalPad {
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
    use crate::store::MemoryStore;
    use crate::touch::ownership::TouchOwnership;
    use crate::touch::TouchPointer;

    const HANDLE: ControlHandle = ControlHandle(0);

    fn movement_pad() -> DirectionalPad {
        DirectionalPad::new(
            "dpad",
            Rect::from_size(0, 0, 350, 350),
            (175, 157),
            DigitalField::First,
            PadBits::new(
                Digital1::UP.bits(),
                Digital1::LEFT.bits(),
                Digital1::RIGHT.bits(),
                Digital1::DOWN.bits(),
            ),
            false,
        )
    }

    fn face_pad() -> DirectionalPad {
        DirectionalPad::new(
            "triangleSquareCircleCross",
            Rect::from_size(0, 0, 350, 350),
            (100, 100),
            DigitalField::Second,
            PadBits::new(
                Digital2::TRIANGLE.bits(),
                Digital2::SQUARE.bits(),
                Digital2::CIRCLE.bits(),
                Digital2::CROSS.bits(),
            ),
            true,
        )
    }

    struct Harness {
        pad: DirectionalPad,
        owners: TouchOwnership,
        state: ControllerState,
    }

    impl Harness {
        fn new(pad: DirectionalPad) -> Self {
            Self {
                pad,
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
            self.pad.on_touch(HANDLE, event, index, &mut ctx)
        }
    }

    // ==================== Zone Tests ====================

    #[test]
    fn test_single_edges() {
        let pad = movement_pad();
        assert_eq!(pad.directions_at(175.0, 10.0), DpadDirection::TOP);
        assert_eq!(pad.directions_at(10.0, 175.0), DpadDirection::LEFT);
        assert_eq!(pad.directions_at(340.0, 175.0), DpadDirection::RIGHT);
        assert_eq!(pad.directions_at(175.0, 340.0), DpadDirection::BOTTOM);
    }

    #[test]
    fn test_diagonals() {
        let pad = movement_pad();
        assert_eq!(pad.directions_at(340.0, 340.0), DpadDirection::RIGHT | DpadDirection::BOTTOM);
        assert_eq!(pad.directions_at(5.0, 340.0), DpadDirection::LEFT | DpadDirection::BOTTOM);
    }

    #[test]
    fn test_opposites_never_together() {
        // A pad narrower than two thresholds puts every point near both edges
        let pad = DirectionalPad::new(
            "narrow",
            Rect::from_size(0, 0, 10, 10),
            (5, 5),
            DigitalField::First,
            PadBits::new(1, 2, 4, 8),
            false,
        )
        .with_edge_divisor(1.5);

        for x in 0..10 {
            for y in 0..10 {
                let d = pad.directions_at(x as f32, y as f32);
                assert!(!(d.contains(DpadDirection::LEFT) && d.contains(DpadDirection::RIGHT)));
                assert!(!(d.contains(DpadDirection::TOP) && d.contains(DpadDirection::BOTTOM)));
            }
        }
    }

    #[test]
    fn test_edge_divisor_is_tunable() {
        let pad = movement_pad().with_edge_divisor(2.7);
        // 110 px from the left edge: inside 350/2.7 but outside 350/3.5
        assert_eq!(pad.directions_at(110.0, 175.0), DpadDirection::LEFT);
        assert!(movement_pad().directions_at(110.0, 175.0).is_empty());

        assert_eq!(movement_pad().with_edge_divisor(0.0).edge_divisor(), DEFAULT_EDGE_DIVISOR);
    }

    #[test]
    fn test_empty_region_is_idle() {
        let pad = DirectionalPad::new(
            "empty",
            Rect::new(0, 0, 0, 0),
            (1, 1),
            DigitalField::First,
            PadBits::new(1, 2, 4, 8),
            false,
        );
        assert!(pad.directions_at(0.0, 0.0).is_empty());
    }

    // ==================== Touch Tests ====================

    #[test]
    fn test_press_move_release() {
        let mut h = Harness::new(movement_pad());
        assert!(h.touch(&TouchEvent::down(TouchPointer::new(1, 175.0, 10.0))));
        assert_eq!(h.state.digital1, Digital1::UP.bits());
        assert!(h.pad.is_active(DpadDirection::TOP));

        assert!(h.touch(&TouchEvent::moved(TouchPointer::new(1, 10.0, 10.0))));
        assert_eq!(h.state.digital1, (Digital1::UP | Digital1::LEFT).bits());

        assert!(h.touch(&TouchEvent::moved(TouchPointer::new(1, 175.0, 340.0))));
        assert_eq!(h.state.digital1, Digital1::DOWN.bits());

        assert!(h.touch(&TouchEvent::up(TouchPointer::new(1, 175.0, 340.0))));
        assert_eq!(h.state.digital1, 0);
        assert!(h.owners.is_empty());
    }

    #[test]
    fn test_other_bits_are_untouched() {
        let mut h = Harness::new(movement_pad());
        h.state.digital1 = Digital1::START.bits();
        h.touch(&TouchEvent::down(TouchPointer::new(1, 175.0, 10.0)));
        h.touch(&TouchEvent::up(TouchPointer::new(1, 175.0, 10.0)));
        assert_eq!(h.state.digital1, Digital1::START.bits());
    }

    #[test]
    fn test_single_touch_pad_ignores_second_finger() {
        let mut h = Harness::new(movement_pad());
        h.touch(&TouchEvent::down(TouchPointer::new(1, 175.0, 10.0)));

        let second = TouchEvent::new(
            TouchAction::PointerDown,
            1,
            vec![TouchPointer::new(1, 175.0, 10.0), TouchPointer::new(2, 175.0, 340.0)],
        );
        // Inside the pad, so still reported as a hit
        assert!(h.touch(&second));
        assert_eq!(h.state.digital1, Digital1::UP.bits());
        assert!(!h.owners.is_busy(crate::touch::PointerId(2)));
    }

    #[test]
    fn test_multitouch_independent_slots() {
        let mut h = Harness::new(face_pad());
        h.touch(&TouchEvent::down(TouchPointer::new(1, 175.0, 10.0)));
        let both = vec![TouchPointer::new(1, 175.0, 10.0), TouchPointer::new(2, 175.0, 340.0)];
        assert!(h.touch(&TouchEvent::new(TouchAction::PointerDown, 1, both.clone())));
        assert_eq!(h.state.digital2, (Digital2::TRIANGLE | Digital2::CROSS).bits());

        // Releasing the first finger keeps the second one's contribution
        assert!(h.touch(&TouchEvent::new(TouchAction::PointerUp, 0, both)));
        assert_eq!(h.state.digital2, Digital2::CROSS.bits());

        assert!(h.touch(&TouchEvent::up(TouchPointer::new(2, 175.0, 340.0))));
        assert_eq!(h.state.digital2, 0);
    }

    #[test]
    fn test_multitouch_move_updates_every_slot() {
        let mut h = Harness::new(face_pad());
        h.touch(&TouchEvent::down(TouchPointer::new(1, 175.0, 10.0)));
        h.touch(&TouchEvent::new(
            TouchAction::PointerDown,
            1,
            vec![TouchPointer::new(1, 175.0, 10.0), TouchPointer::new(2, 175.0, 340.0)],
        ));

        let moved = TouchEvent::new(
            TouchAction::Move,
            0,
            vec![TouchPointer::new(1, 10.0, 175.0), TouchPointer::new(2, 340.0, 175.0)],
        );
        assert!(h.touch(&moved));
        assert_eq!(h.state.digital2, (Digital2::SQUARE | Digital2::CIRCLE).bits());
    }

    #[test]
    fn test_move_from_unowned_pointer_is_ignored() {
        let mut h = Harness::new(movement_pad());
        assert!(!h.touch(&TouchEvent::moved(TouchPointer::new(5, 900.0, 900.0))));
        assert_eq!(h.state.digital1, 0);
    }

    #[test]
    fn test_cancel_clears_all_slots() {
        let mut h = Harness::new(face_pad());
        h.touch(&TouchEvent::down(TouchPointer::new(1, 175.0, 10.0)));
        h.touch(&TouchEvent::new(
            TouchAction::PointerDown,
            1,
            vec![TouchPointer::new(1, 175.0, 10.0), TouchPointer::new(2, 175.0, 340.0)],
        ));
        assert!(h.touch(&TouchEvent::new(TouchAction::Cancel, 0, vec![])));
        assert_eq!(h.state.digital2, 0);
        assert!(h.owners.is_empty());
    }

    // ==================== Layout Tests ====================

    #[test]
    fn test_scale_recenters_and_scales_buttons() {
        let mut pad = movement_pad();
        let mut store = MemoryStore::new();
        pad.set_scale(50, &mut store);

        let area = pad.bounds();
        assert_eq!(area.width(), 512);
        assert_eq!(area.center(), (175, 175));
        // 175 * 512 / 350
        assert_eq!(pad.button_size(), (256, 229));
    }

    #[test]
    fn test_reset_restores_button_size() {
        let mut pad = movement_pad();
        let mut store = MemoryStore::new();
        pad.set_scale(80, &mut store);
        pad.reset(&mut store);
        assert_eq!(pad.button_size(), (175, 157));
        assert_eq!(pad.bounds(), Rect::from_size(0, 0, 350, 350));
    }

    #[test]
    fn test_sub_button_bounds() {
        let pad = movement_pad();
        let bounds = pad.sub_button_bounds();
        assert_eq!(bounds[0], (DpadDirection::TOP, Rect::new(88, 0, 262, 157)));
        assert_eq!(bounds[3], (DpadDirection::BOTTOM, Rect::new(88, 193, 262, 350)));
    }
}
