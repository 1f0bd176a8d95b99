//! # Control Layout
//!
//! Persisted geometry shared by every control: bounding rectangle, scale,
//! opacity, enabled flag and the in-progress drag.
//!
//! ## Persisted keys
//!
//! | Key | Type | Default |
//! |-----|------|---------|
//! | `<id>_x` | int | construction-time left edge |
//! | `<id>_y` | int | construction-time top edge |
//! | `<id>_scale` | int 0-100 | 50 (measured default reported to editors) |
//! | `<id>_opacity` | int 0-100 | 50 |
//! | `<id>_enabled` | bool | true |
//!
//! Every mutation writes through to the store immediately, one batch per
//! mutation. Store failures are logged and swallowed so that editing never
//! blocks input. Persisted coordinates beyond [`MAX_COORDINATE`] are
//! treated as absent.

use tracing::warn;

use crate::geometry::Rect;
use crate::store::{SettingValue, SettingsStore};

/// Scale applied when nothing has been persisted.
pub const DEFAULT_SCALE: i32 = 50;

/// Opacity applied when nothing has been persisted.
pub const DEFAULT_OPACITY: i32 = 50;

/// Canonical size, in screen units, of a control at 100% scale.
pub const REFERENCE_SIZE: i32 = 1024;

/// Largest persisted coordinate magnitude accepted on load.
pub const MAX_COORDINATE: i64 = 65_536;

/// Point a control keeps fixed while it is resized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleAnchor {
    /// Keep the top-left corner.
    TopLeft,
    /// Keep the centre point.
    Center,
}

/// What the layout editor shows for a selected control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionInfo {
    /// Control identity.
    pub id: String,
    /// Persisted scale, or the measured default when none was saved.
    pub scale: i32,
    /// Opacity percentage.
    pub opacity: i32,
    pub enabled: bool,
}

/// Mutable, persisted geometry of one control.
#[derive(Debug, Clone)]
pub struct ControlLayout {
    id: String,
    rect: Rect,
    default_rect: Rect,
    anchor: ScaleAnchor,
    scale: i32,
    scale_saved: bool,
    opacity: i32,
    enabled: bool,
    /// Grab offset from the top-left corner while dragging.
    drag: Option<(i32, i32)>,
}

impl ControlLayout {
    /// Creates a layout at its construction-time defaults.
    ///
    /// # Examples
    ///
    /// ```
    /// use pad_overlay::controls::layout::{ControlLayout, ScaleAnchor};
    /// use pad_overlay::geometry::Rect;
    ///
    /// let layout = ControlLayout::new("dpad", Rect::from_size(0, 0, 300, 300), ScaleAnchor::Center);
    /// assert_eq!(layout.key("x"), "dpad_x");
    /// assert_eq!(layout.scale(), 50);
    /// assert!(layout.enabled());
    /// ```
    #[must_use]
    pub fn new(id: impl Into<String>, rect: Rect, anchor: ScaleAnchor) -> Self {
        Self {
            id: id.into(),
            rect,
            default_rect: rect,
            anchor,
            scale: DEFAULT_SCALE,
            scale_saved: false,
            opacity: DEFAULT_OPACITY,
            enabled: true,
            drag: None,
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Store key for one layout field.
    #[must_use]
    pub fn key(&self, field: &str) -> String {
        format!("{}_{}", self.id, field)
    }

    /// Current bounding rectangle.
    #[must_use]
    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// Construction-time rectangle restored by [`reset`](Self::reset).
    #[must_use]
    pub fn default_rect(&self) -> Rect {
        self.default_rect
    }

    #[must_use]
    pub fn scale(&self) -> i32 {
        self.scale
    }

    #[must_use]
    pub fn opacity(&self) -> i32 {
        self.opacity
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Idle draw alpha (0-255) derived from the opacity percentage.
    #[must_use]
    pub fn alpha(&self) -> u8 {
        (255.0 * self.opacity as f32 / 100.0).round() as u8
    }

    #[must_use]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        self.rect.contains(x, y)
    }

    /// Applies persisted overrides on top of the construction-time defaults.
    ///
    /// Scale is applied before position so that a saved layout reproduces
    /// the exact rectangle. Unreadable or wrongly typed values are ignored.
    pub fn load(&mut self, store: &dyn SettingsStore) {
        if let Some(scale) = self.read(store, "scale").and_then(|v| v.as_int()) {
            let scale = scale.clamp(0, 100) as i32;
            self.apply_scale(scale);
            self.scale = scale;
            self.scale_saved = true;
        }

        let x = self.read_coordinate(store, "x");
        let y = self.read_coordinate(store, "y");
        if x.is_some() || y.is_some() {
            self.rect = self
                .rect
                .moved_to(x.unwrap_or(self.rect.left), y.unwrap_or(self.rect.top));
        }

        if let Some(opacity) = self.read(store, "opacity").and_then(|v| v.as_int()) {
            self.opacity = opacity.clamp(0, 100) as i32;
        }

        if let Some(enabled) = self.read(store, "enabled").and_then(|v| v.as_bool()) {
            self.enabled = enabled;
        }
    }

    fn read(&self, store: &dyn SettingsStore, field: &str) -> Option<SettingValue> {
        let key = self.key(field);
        match store.get(&key) {
            Ok(value) => value,
            Err(e) => {
                warn!("Failed to read {}: {}", key, e);
                None
            }
        }
    }

    fn read_coordinate(&self, store: &dyn SettingsStore, field: &str) -> Option<i32> {
        self.read(store, field)
            .and_then(|v| v.as_int())
            .filter(|v| (-MAX_COORDINATE..=MAX_COORDINATE).contains(v))
            .and_then(|v| i32::try_from(v).ok())
    }

    fn persist(&self, store: &mut dyn SettingsStore, field: &str, value: Option<SettingValue>) {
        let key = self.key(field);
        if let Err(e) = store.set(&key, value) {
            warn!("Failed to persist {}: {}", key, e);
        }
    }

    fn persist_all(&self, store: &mut dyn SettingsStore, fields: &[(&str, Option<SettingValue>)]) {
        let entries = fields
            .iter()
            .map(|(field, value)| (self.key(field), value.clone()))
            .collect();
        if let Err(e) = store.set_many(entries) {
            warn!("Failed to persist layout of {}: {}", self.id, e);
        }
    }

    fn persist_position(&self, store: &mut dyn SettingsStore) {
        self.persist_all(
            store,
            &[("x", Some(SettingValue::from(self.rect.left))), ("y", Some(SettingValue::from(self.rect.top)))],
        );
    }

    fn apply_scale(&mut self, percent: i32) {
        let size = ((REFERENCE_SIZE as f32 * percent as f32 / 100.0).round() as i32).max(1);
        self.rect = match self.anchor {
            ScaleAnchor::TopLeft => self.rect.resized_from_origin(size, size),
            ScaleAnchor::Center => self.rect.resized_about_center(size, size),
        };
    }

    /// Begins a drag grabbed at `(x, y)`.
    pub fn start_dragging(&mut self, x: i32, y: i32) {
        self.drag = Some((x.saturating_sub(self.rect.left), y.saturating_sub(self.rect.top)));
    }

    /// Follows a drag to `(x, y)`; returns false when not dragging.
    pub fn update_position(&mut self, x: i32, y: i32, store: &mut dyn SettingsStore) -> bool {
        let Some((dx, dy)) = self.drag else {
            return false;
        };
        self.rect = self.rect.moved_to(x.saturating_sub(dx), y.saturating_sub(dy));
        self.persist_position(store);
        true
    }

    pub fn stop_dragging(&mut self) {
        self.drag = None;
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Moves the top-left corner to `(left, top)` without a drag.
    pub fn move_to(&mut self, left: i32, top: i32, store: &mut dyn SettingsStore) {
        self.rect = self.rect.moved_to(left, top);
        self.persist_position(store);
    }

    /// Resizes to `REFERENCE_SIZE * percent / 100` around the anchor.
    pub fn set_scale(&mut self, percent: i32, store: &mut dyn SettingsStore) {
        let percent = percent.clamp(0, 100);
        self.apply_scale(percent);
        self.scale = percent;
        self.scale_saved = true;
        self.persist_all(
            store,
            &[
                ("scale", Some(SettingValue::from(percent))),
                ("x", Some(SettingValue::from(self.rect.left))),
                ("y", Some(SettingValue::from(self.rect.top))),
            ],
        );
    }

    pub fn set_opacity(&mut self, percent: i32, store: &mut dyn SettingsStore) {
        self.opacity = percent.clamp(0, 100);
        self.persist(store, "opacity", Some(self.opacity.into()));
    }

    pub fn set_enabled(&mut self, enabled: bool, store: &mut dyn SettingsStore) {
        self.enabled = enabled;
        self.persist(store, "enabled", Some(enabled.into()));
    }

    /// Deletes every persisted key and restores construction-time values.
    pub fn reset(&mut self, store: &mut dyn SettingsStore) {
        self.persist_all(
            store,
            &[("x", None), ("y", None), ("scale", None), ("opacity", None), ("enabled", None)],
        );
        self.rect = self.default_rect;
        self.scale = DEFAULT_SCALE;
        self.scale_saved = false;
        self.opacity = DEFAULT_OPACITY;
        self.enabled = true;
    }

    /// Scale percentage equivalent to the construction-time size.
    ///
    /// ```
    /// use pad_overlay::controls::layout::{ControlLayout, ScaleAnchor};
    /// use pad_overlay::geometry::Rect;
    ///
    /// let layout = ControlLayout::new("b", Rect::from_size(0, 0, 512, 256), ScaleAnchor::TopLeft);
    /// assert_eq!(layout.measure_default_scale(), 25);
    ///
    /// let empty = ControlLayout::new("e", Rect::new(0, 0, 0, 0), ScaleAnchor::TopLeft);
    /// assert_eq!(empty.measure_default_scale(), 100);
    /// ```
    #[must_use]
    pub fn measure_default_scale(&self) -> i32 {
        let (w, h) = (self.default_rect.width(), self.default_rect.height());
        if w <= 0 || h <= 0 {
            return 100;
        }
        (w.min(h) as f32 / REFERENCE_SIZE as f32 * 100.0).round() as i32
    }

    #[must_use]
    pub fn info(&self) -> SelectionInfo {
        SelectionInfo {
            id: self.id.clone(),
            scale: if self.scale_saved { self.scale } else { self.measure_default_scale() },
            opacity: self.opacity,
            enabled: self.enabled,
        }
    }
}
