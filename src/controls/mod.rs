//! # Controls Module
//!
//! The on-screen controls and their shared layout capability.
//!
//! | Control | Touches | Output |
//! |---------|---------|--------|
//! | [`Button`] | one | flags in both digital fields |
//! | [`DirectionalPad`] | one or two | four edge flags in one field |
//! | [`AnalogStick`] | one | one axis pair, optional click flag |
//!
//! Every control owns a [`ControlLayout`] and exposes it through the
//! [`LayoutControl`] trait, so the overlay and editor can move, scale and
//! reset any control without knowing its concrete type. The overlay keeps
//! controls in the [`Control`] tagged enum and only matches on it where the
//! touch behaviour differs.

pub mod button;
pub mod dpad;
pub mod layout;
pub mod stick;

pub use button::Button;
pub use dpad::{DirectionalPad, DpadDirection, PadBits};
pub use layout::{ControlLayout, SelectionInfo};
pub use stick::{AnalogStick, StickResponse};

use crate::geometry::Rect;
use crate::state::ControllerState;
use crate::store::SettingsStore;
use crate::touch::ownership::TouchOwnership;

/// Mutable dispatch state handed to a control for one touch event.
#[derive(Debug)]
pub struct TouchContext<'a> {
    /// Pointer to control-slot ownership.
    pub owners: &'a mut TouchOwnership,
    /// Aggregated controller state.
    pub state: &'a mut ControllerState,
}

/// Layout capabilities shared by every control.
///
/// Implementors only provide access to their [`ControlLayout`]; every other
/// method has a default that delegates to it.
pub trait LayoutControl {
    fn layout(&self) -> &ControlLayout;

    fn layout_mut(&mut self) -> &mut ControlLayout;

    /// Stable identity used to namespace persisted settings.
    fn id(&self) -> &str {
        self.layout().id()
    }

    fn bounds(&self) -> Rect {
        self.layout().rect()
    }

    fn contains(&self, x: i32, y: i32) -> bool {
        self.layout().contains(x, y)
    }

    fn is_enabled(&self) -> bool {
        self.layout().enabled()
    }

    fn start_dragging(&mut self, x: i32, y: i32) {
        self.layout_mut().start_dragging(x, y);
    }

    /// Follows an active drag; returns false when not dragging.
    fn update_position(&mut self, x: i32, y: i32, store: &mut dyn SettingsStore) -> bool {
        self.layout_mut().update_position(x, y, store)
    }

    fn stop_dragging(&mut self) {
        self.layout_mut().stop_dragging();
    }

    fn is_dragging(&self) -> bool {
        self.layout().is_dragging()
    }

    fn move_to(&mut self, left: i32, top: i32, store: &mut dyn SettingsStore) {
        self.layout_mut().move_to(left, top, store);
    }

    fn set_scale(&mut self, percent: i32, store: &mut dyn SettingsStore) {
        self.layout_mut().set_scale(percent, store);
    }

    fn set_opacity(&mut self, percent: i32, store: &mut dyn SettingsStore) {
        self.layout_mut().set_opacity(percent, store);
    }

    fn set_enabled(&mut self, enabled: bool, store: &mut dyn SettingsStore) {
        self.layout_mut().set_enabled(enabled, store);
    }

    fn reset(&mut self, store: &mut dyn SettingsStore) {
        self.layout_mut().reset(store);
    }

    fn measure_default_scale(&self) -> i32 {
        self.layout().measure_default_scale()
    }

    fn info(&self) -> SelectionInfo {
        self.layout().info()
    }
}

/// Kind of a [`Control`], in edit hit-test priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ControlKind {
    Button,
    Pad,
    Stick,
}

/// Any editable overlay control.
#[derive(Debug, Clone)]
pub enum Control {
    Button(Button),
    Pad(DirectionalPad),
    Stick(AnalogStick),
}

impl Control {
    #[must_use]
    pub fn kind(&self) -> ControlKind {
        match self {
            Control::Button(_) => ControlKind::Button,
            Control::Pad(_) => ControlKind::Pad,
            Control::Stick(_) => ControlKind::Stick,
        }
    }

    /// Layout capabilities of the wrapped control.
    #[must_use]
    pub fn as_layout(&self) -> &dyn LayoutControl {
        match self {
            Control::Button(button) => button,
            Control::Pad(pad) => pad,
            Control::Stick(stick) => stick,
        }
    }

    /// Mutable layout capabilities of the wrapped control.
    pub fn as_layout_mut(&mut self) -> &mut dyn LayoutControl {
        match self {
            Control::Button(button) => button,
            Control::Pad(pad) => pad,
            Control::Stick(stick) => stick,
        }
    }
}

impl From<Button> for Control {
    fn from(button: Button) -> Self {
        Control::Button(button)
    }
}

impl From<DirectionalPad> for Control {
    fn from(pad: DirectionalPad) -> Self {
        Control::Pad(pad)
    }
}

impl From<AnalogStick> for Control {
    fn from(stick: AnalogStick) -> Self {
        Control::Stick(stick)
    }
}
