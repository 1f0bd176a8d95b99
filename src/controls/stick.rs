//! # Analog Stick
//!
//! A circular drag region that drives one pair of axes.
//!
//! The touch offset from the background centre is clamped to the radius,
//! keeping its angle, then mapped linearly onto the axis range:
//!
//! ```text
//! axis = round(offset / radius * 127 + 128)      -> 1..=255, 128 neutral
//! ```
//!
//! Fixed sticks sit at their layout rectangle and may carry a click flag
//! (L3/R3) that is held for as long as the stick is owned. A press moves the
//! background centre to the press point, so touch-down is neutral and later
//! moves are measured from where the finger landed; release puts the
//! background back. Floating sticks are spawned by the overlay with
//! [`AnalogStick::on_add`], which centres the background on the touch point
//! in the same way; they report [`StickResponse::Released`] when their
//! pointer lifts so the overlay can retire them.

use crate::geometry::Rect;
use crate::state::{DigitalField, StickSide, AXIS_CENTER, AXIS_HALF_RANGE, AXIS_MAX, AXIS_MIN};
use crate::touch::ownership::{ControlHandle, SlotKey, TouchOwnership};
use crate::touch::{TouchAction, TouchEvent};

use super::layout::{ControlLayout, ScaleAnchor};
use super::{LayoutControl, TouchContext};

/// Result of feeding a touch event to a stick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StickResponse {
    /// The owning pointer lifted; axes are back to neutral.
    Released,
    /// The event did not concern this stick.
    Idle,
    /// The stick is being driven.
    Active,
}

/// Maps a clamped offset ratio (-1.0..=1.0) onto the axis range.
///
/// ```
/// use pad_overlay::controls::stick::axis_value;
///
/// assert_eq!(axis_value(0.0), 128);
/// assert_eq!(axis_value(1.0), 255);
/// assert_eq!(axis_value(-1.0), 1);
/// ```
#[must_use]
pub fn axis_value(ratio: f32) -> i32 {
    let value = (ratio * AXIS_HALF_RANGE as f32 + AXIS_CENTER as f32).round() as i32;
    value.clamp(AXIS_MIN, AXIS_MAX)
}

/// Clamps `(dx, dy)` to a circle of `radius`, preserving the angle.
#[must_use]
pub fn clamp_to_radius(dx: f32, dy: f32, radius: f32) -> (f32, f32) {
    if dx.hypot(dy) <= radius {
        return (dx, dy);
    }
    let angle = dy.atan2(dx);
    (radius * angle.cos(), radius * angle.sin())
}

/// Fixed or floating analog stick.
#[derive(Debug, Clone)]
pub struct AnalogStick {
    layout: ControlLayout,
    side: StickSide,
    press: Option<(DigitalField, u32)>,
    /// Background centre while the stick is held.
    press_center: Option<(i32, i32)>,
    /// Clamped knob offset from the background centre.
    offset: (f32, f32),
}

impl AnalogStick {
    /// Creates a stick whose background occupies `rect`.
    #[must_use]
    pub fn new(id: impl Into<String>, rect: Rect, side: StickSide) -> Self {
        Self {
            layout: ControlLayout::new(id, rect, ScaleAnchor::Center),
            side,
            press: None,
            press_center: None,
            offset: (0.0, 0.0),
        }
    }

    /// Adds a click flag held while the stick is owned.
    #[must_use]
    pub fn with_press(mut self, field: DigitalField, bits: u32) -> Self {
        self.press = Some((field, bits));
        self
    }

    #[must_use]
    pub fn side(&self) -> StickSide {
        self.side
    }

    /// Click flag, if any.
    #[must_use]
    pub fn press(&self) -> Option<(DigitalField, u32)> {
        self.press
    }

    /// Current background bounds.
    #[must_use]
    pub fn background_bounds(&self) -> Rect {
        let rect = self.layout.rect();
        match self.press_center {
            Some((cx, cy)) => Rect::centered(cx, cy, rect.width(), rect.height()),
            None => rect,
        }
    }

    /// Knob bounds: the background shifted by the clamped offset.
    #[must_use]
    pub fn knob_bounds(&self) -> Rect {
        self.background_bounds()
            .offset(self.offset.0.round() as i32, self.offset.1.round() as i32)
    }

    /// Radius of the drag circle: half the smaller background side.
    #[must_use]
    pub fn radius(&self) -> f32 {
        let rect = self.layout.rect();
        rect.width().min(rect.height()) as f32 / 2.0
    }

    /// Returns true while a pointer owns the stick.
    #[must_use]
    pub fn is_active(&self, handle: ControlHandle, owners: &TouchOwnership) -> bool {
        owners.is_owned(SlotKey::new(handle, 0))
    }

    /// Spawns a floating stick under the pointer at `pointer_index`.
    ///
    /// Returns false when the pointer is missing or already owns another
    /// control, or when the stick has no usable radius.
    pub fn on_add(
        &mut self,
        handle: ControlHandle,
        event: &TouchEvent,
        pointer_index: usize,
        ctx: &mut TouchContext<'_>,
    ) -> bool {
        let Some(pointer) = event.pointer(pointer_index) else {
            return false;
        };
        if self.radius() <= 0.0 || !ctx.owners.claim(SlotKey::new(handle, 0), pointer.id) {
            return false;
        }

        self.press_center = Some(pointer.pixel());
        self.offset = (0.0, 0.0);
        self.press_on(ctx);
        ctx.state.center_stick(self.side);
        true
    }

    /// Feeds one touch event.
    ///
    /// Axes are only written while the stick is owned and on release, so an
    /// idle stick never overrides another control driving the same side.
    pub fn on_touch(
        &mut self,
        handle: ControlHandle,
        event: &TouchEvent,
        pointer_index: usize,
        ctx: &mut TouchContext<'_>,
    ) -> StickResponse {
        let slot = SlotKey::new(handle, 0);

        match event.action {
            TouchAction::Down | TouchAction::PointerDown => {
                let Some(pointer) = event.pointer(pointer_index) else {
                    return StickResponse::Idle;
                };
                if self.radius() <= 0.0 || ctx.owners.is_owned(slot) {
                    return StickResponse::Idle;
                }
                if !ctx.owners.claim(slot, pointer.id) {
                    return StickResponse::Idle;
                }
                self.press_center = Some(pointer.pixel());
                self.press_on(ctx);
                self.drive(pointer.x, pointer.y, ctx);
                StickResponse::Active
            }
            TouchAction::Move => {
                let Some(owner) = ctx.owners.owner(slot) else {
                    return StickResponse::Idle;
                };
                match event.find(owner) {
                    Some(pointer) => {
                        self.drive(pointer.x, pointer.y, ctx);
                        StickResponse::Active
                    }
                    None => StickResponse::Idle,
                }
            }
            TouchAction::Up | TouchAction::PointerUp | TouchAction::Cancel => {
                let Some(owner) = ctx.owners.owner(slot) else {
                    return StickResponse::Idle;
                };
                if !event.releases(owner) {
                    return StickResponse::Idle;
                }
                ctx.owners.release(slot);
                self.release(ctx);
                StickResponse::Released
            }
        }
    }

    fn press_on(&self, ctx: &mut TouchContext<'_>) {
        if let Some((field, bits)) = self.press {
            ctx.state.set_bits(field, bits);
        }
    }

    fn drive(&mut self, x: f32, y: f32, ctx: &mut TouchContext<'_>) {
        let radius = self.radius();
        let (cx, cy) = self.background_bounds().center();
        let (dx, dy) = clamp_to_radius(x - cx as f32, y - cy as f32, radius);
        self.offset = (dx, dy);
        ctx.state
            .set_stick(self.side, axis_value(dx / radius), axis_value(dy / radius));
    }

    fn release(&mut self, ctx: &mut TouchContext<'_>) {
        self.offset = (0.0, 0.0);
        self.press_center = None;
        ctx.state.center_stick(self.side);
        if let Some((field, bits)) = self.press {
            ctx.state.clear_bits(field, bits);
        }
    }
}

impl LayoutControl for AnalogStick {
    fn layout(&self) -> &ControlLayout {
        &self.layout
    }

    fn layout_mut(&mut self) -> &mut ControlLayout {
        &mut self.layout
    }
}
