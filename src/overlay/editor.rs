//! # Edit Mode
//!
//! Edit-mode dispatch, the selection surface of [`Overlay`] and the
//! [`LayoutEditor`] panel model.
//!
//! While edit mode is active touches never reach the controller state:
//!
//! - a touch-down selects the first control under the finger (buttons, then
//!   pads, then fixed sticks, disabled controls included) and starts
//!   dragging it
//! - a move follows every dragging control
//! - an up or cancel drops every drag
//!
//! The selection is edited through `set_selected_*`, `move_selected`,
//! `toggle_selected_enabled` and `reset_selected`. Each change writes
//! through to the settings store. Selecting or resetting a control notifies
//! the selection listener with a fresh [`SelectionInfo`].

use tracing::{debug, info};

pub use crate::controls::SelectionInfo;

use crate::controls::LayoutControl;
use crate::state::ControllerState;
use crate::store::SettingsStore;
use crate::touch::ownership::ControlHandle;
use crate::touch::{TouchAction, TouchEvent, TouchPointer};

use super::{DispatchOutcome, Overlay};

impl Overlay {
    /// Switches between play and edit mode.
    ///
    /// Entering edit mode releases every held control and forwards the
    /// neutral state once. Leaving it drops any drag in progress.
    pub fn set_edit_mode(&mut self, editing: bool) {
        if editing == self.edit_mode {
            return;
        }

        if editing {
            self.run_pipeline(&TouchEvent::new(TouchAction::Cancel, 0, Vec::new()));
            self.owners.clear();
            self.state = ControllerState::default();
            self.sink.forward(&self.state);
        } else {
            self.stop_all_drags();
        }

        self.edit_mode = editing;
        info!("Edit mode {}", if editing { "enabled" } else { "disabled" });
    }

    #[must_use]
    pub fn is_edit_mode(&self) -> bool {
        self.edit_mode
    }

    /// Registers the callback run whenever the selection changes or is reset.
    pub fn set_selection_listener<F>(&mut self, listener: F)
    where
        F: FnMut(&SelectionInfo) + 'static,
    {
        self.listener = Some(Box::new(listener));
    }

    /// Identity of the selected control.
    #[must_use]
    pub fn selected_id(&self) -> Option<&str> {
        self.selected_control().map(|c| c.id())
    }

    /// Current values of the selected control.
    #[must_use]
    pub fn selection_info(&self) -> Option<SelectionInfo> {
        self.selected_control().map(|c| c.info())
    }

    /// Selects a control by identity; returns false when unknown.
    pub fn select(&mut self, id: &str) -> bool {
        let Some(index) = self.set.controls.iter().position(|c| c.as_layout().id() == id) else {
            return false;
        };
        self.select_handle(ControlHandle(index));
        true
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Sets the selected control's scale percentage.
    pub fn set_selected_scale(&mut self, percent: i32) -> bool {
        self.with_selected(|control, store| control.set_scale(percent, store))
            .is_some()
    }

    /// Sets the selected control's opacity percentage.
    pub fn set_selected_opacity(&mut self, percent: i32) -> bool {
        self.with_selected(|control, store| control.set_opacity(percent, store))
            .is_some()
    }

    /// Shifts the selected control by `(dx, dy)`.
    pub fn move_selected(&mut self, dx: i32, dy: i32) -> bool {
        self.with_selected(|control, store| {
            let bounds = control.bounds();
            control.move_to(bounds.left.saturating_add(dx), bounds.top.saturating_add(dy), store);
        })
        .is_some()
    }

    pub fn toggle_selected_enabled(&mut self, enabled: bool) -> bool {
        self.with_selected(|control, store| control.set_enabled(enabled, store))
            .is_some()
    }

    /// Restores the selected control's defaults and notifies the listener.
    pub fn reset_selected(&mut self) -> bool {
        let Some(info) = self.with_selected(|control, store| {
            control.reset(store);
            control.info()
        }) else {
            return false;
        };
        debug!("Reset {}", info.id);
        self.notify(&info);
        true
    }

    pub(super) fn handle_edit_touch(&mut self, event: &TouchEvent) -> DispatchOutcome {
        let point = event.action_pointer().map(TouchPointer::pixel);
        let mut hit = false;

        match (event.action, point) {
            (TouchAction::Down, Some((x, y))) => {
                if let Some(handle) = self.edit_hit_test(x, y) {
                    self.set.controls[handle.0].as_layout_mut().start_dragging(x, y);
                    self.select_handle(handle);
                    hit = true;
                }
            }
            (TouchAction::Move, Some((x, y))) => {
                let store = self.store.as_mut();
                for control in &mut self.set.controls {
                    let control = control.as_layout_mut();
                    if control.is_dragging() {
                        hit |= control.update_position(x, y, store);
                    }
                }
            }
            (TouchAction::Up | TouchAction::Cancel, _) => self.stop_all_drags(),
            _ => {}
        }

        DispatchOutcome {
            hit,
            redraw: hit,
            spawned: None,
        }
    }

    /// First control under `(x, y)` by kind priority, then layout order.
    fn edit_hit_test(&self, x: i32, y: i32) -> Option<ControlHandle> {
        self.set
            .controls
            .iter()
            .enumerate()
            .filter(|(_, control)| control.as_layout().contains(x, y))
            .min_by_key(|(index, control)| (control.kind(), *index))
            .map(|(index, _)| ControlHandle(index))
    }

    fn stop_all_drags(&mut self) {
        for control in &mut self.set.controls {
            control.as_layout_mut().stop_dragging();
        }
    }

    fn selected_control(&self) -> Option<&dyn LayoutControl> {
        let handle = self.selected?;
        self.set.controls.get(handle.0).map(|c| c.as_layout())
    }

    fn select_handle(&mut self, handle: ControlHandle) {
        self.selected = Some(handle);
        if let Some(info) = self.selection_info() {
            debug!("Selected {}", info.id);
            self.notify(&info);
        }
    }

    fn with_selected<R>(&mut self, edit: impl FnOnce(&mut dyn LayoutControl, &mut dyn SettingsStore) -> R) -> Option<R> {
        let handle = self.selected?;
        let control = self.set.controls.get_mut(handle.0)?;
        Some(edit(control.as_layout_mut(), self.store.as_mut()))
    }

    fn notify(&mut self, info: &SelectionInfo) {
        if let Some(listener) = self.listener.as_mut() {
            listener(info);
        }
    }
}

/// Model of the floating editor panel.
///
/// Mirrors the last selection and turns panel gestures into calls on the
/// overlay's edit surface. Rendering is left to the host.
///
/// # Examples
///
/// ```
/// use pad_overlay::config::Config;
/// use pad_overlay::overlay::{LayoutEditor, Overlay};
/// use pad_overlay::state::LoggingSink;
/// use pad_overlay::store::MemoryStore;
///
/// let mut overlay = Overlay::with_default_layout(
///     &Config::default(),
///     Box::new(MemoryStore::new()),
///     Box::new(LoggingSink::new()),
/// )?;
/// overlay.set_edit_mode(true);
/// overlay.select("dpad");
///
/// let mut editor = LayoutEditor::new();
/// editor.sync(&overlay);
/// assert_eq!(editor.name(), Some("dpad"));
///
/// editor.set_opacity(&mut overlay, 80);
/// assert_eq!(overlay.selection_info().unwrap().opacity, 80);
/// # Ok::<(), pad_overlay::error::OverlayError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayoutEditor {
    selection: Option<SelectionInfo>,
    panel_offset: (i32, i32),
    visible: bool,
    reset_pending: bool,
}

impl LayoutEditor {
    /// Hidden panel with nothing selected.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Refreshes the mirrored selection from the overlay.
    pub fn sync(&mut self, overlay: &Overlay) {
        self.selection = overlay.selection_info();
    }

    /// Mirrors a selection notification.
    pub fn on_selection(&mut self, info: &SelectionInfo) {
        self.selection = Some(info.clone());
    }

    #[must_use]
    pub fn selection(&self) -> Option<&SelectionInfo> {
        self.selection.as_ref()
    }

    /// Selected control identity shown in the panel title.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.selection.as_ref().map(|s| s.id.as_str())
    }

    pub fn show(&mut self) {
        self.visible = true;
    }

    pub fn hide(&mut self) {
        self.visible = false;
        self.reset_pending = false;
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Moves the panel itself.
    pub fn drag_panel(&mut self, dx: i32, dy: i32) {
        self.panel_offset.0 += dx;
        self.panel_offset.1 += dy;
    }

    #[must_use]
    pub fn panel_offset(&self) -> (i32, i32) {
        self.panel_offset
    }

    /// Scale slider.
    pub fn set_scale(&mut self, overlay: &mut Overlay, percent: i32) {
        if overlay.set_selected_scale(percent) {
            self.sync(overlay);
        }
    }

    /// Opacity slider.
    pub fn set_opacity(&mut self, overlay: &mut Overlay, percent: i32) {
        if overlay.set_selected_opacity(percent) {
            self.sync(overlay);
        }
    }

    pub fn nudge_up(&mut self, overlay: &mut Overlay) {
        overlay.move_selected(0, -1);
    }

    pub fn nudge_down(&mut self, overlay: &mut Overlay) {
        overlay.move_selected(0, 1);
    }

    pub fn nudge_left(&mut self, overlay: &mut Overlay) {
        overlay.move_selected(-1, 0);
    }

    pub fn nudge_right(&mut self, overlay: &mut Overlay) {
        overlay.move_selected(1, 0);
    }

    /// Enable checkbox.
    pub fn set_enabled(&mut self, overlay: &mut Overlay, enabled: bool) {
        if overlay.toggle_selected_enabled(enabled) {
            self.sync(overlay);
        }
    }

    /// Opens the reset confirmation; ignored without a selection.
    pub fn request_reset(&mut self) {
        self.reset_pending = self.selection.is_some();
    }

    #[must_use]
    pub fn is_reset_pending(&self) -> bool {
        self.reset_pending
    }

    /// Confirms a pending reset; returns true when the control was reset.
    pub fn confirm_reset(&mut self, overlay: &mut Overlay) -> bool {
        if !std::mem::take(&mut self.reset_pending) {
            return false;
        }
        let reset = overlay.reset_selected();
        self.sync(overlay);
        reset
    }

    pub fn dismiss_reset(&mut self) {
        self.reset_pending = false;
    }
}
