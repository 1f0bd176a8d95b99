//! # Controller State Module
//!
//! The aggregated snapshot that the overlay forwards to the emulation engine,
//! and the sinks that receive it.
//!
//! ## Layout
//!
//! | Field | Type | Description |
//! |-------|------|-------------|
//! | `digital1` | `u32` | First button bitmask ([`Digital1`]) |
//! | `digital2` | `u32` | Second button bitmask ([`Digital2`]) |
//! | `left_x` / `left_y` | `i32` | Left stick, 1-255, 128 = center |
//! | `right_x` / `right_y` | `i32` | Right stick, 1-255, 128 = center |
//!
//! The bit values are opaque to the overlay: controls OR their bound flags in
//! while active and clear them otherwise.
//!
//! ## Usage
//!
//! ```
//! use pad_overlay::state::{ControllerState, Digital2, DigitalField};
//!
//! let mut state = ControllerState::default();
//! state.set_bits(DigitalField::Second, Digital2::CROSS.bits());
//! assert!(state.is_pressed(DigitalField::Second, Digital2::CROSS.bits()));
//! assert_eq!(state.left_x, 128);
//! ```

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::io::Write;
use tracing::{debug, warn};

/// Lowest axis value a stick reports (full left / full up).
pub const AXIS_MIN: i32 = 1;
/// Highest axis value a stick reports (full right / full down).
pub const AXIS_MAX: i32 = 255;
/// Neutral axis value.
pub const AXIS_CENTER: i32 = 128;
/// Distance from center to either end of the axis range.
pub const AXIS_HALF_RANGE: i32 = 127;

bitflags! {
    /// Flags carried in the first digital field.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Digital1: u32 {
        const SELECT = 0x0000_0001;
        const L3     = 0x0000_0002;
        const R3     = 0x0000_0004;
        const START  = 0x0000_0008;
        const UP     = 0x0000_0010;
        const RIGHT  = 0x0000_0020;
        const DOWN   = 0x0000_0040;
        const LEFT   = 0x0000_0080;
        const PS     = 0x0000_0100;
    }
}

bitflags! {
    /// Flags carried in the second digital field.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Digital2: u32 {
        const L2       = 0x0000_0001;
        const R2       = 0x0000_0002;
        const L1       = 0x0000_0004;
        const R1       = 0x0000_0008;
        const TRIANGLE = 0x0000_0010;
        const CIRCLE   = 0x0000_0020;
        const CROSS    = 0x0000_0040;
        const SQUARE   = 0x0000_0080;
    }
}

/// Selects one of the two digital bitmask fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DigitalField {
    First,
    Second,
}

/// Selects which pair of axes a stick drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StickSide {
    Left,
    Right,
}

impl StickSide {
    /// Index used for per-side arrays (left = 0, right = 1).
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            StickSide::Left => 0,
            StickSide::Right => 1,
        }
    }
}

/// Aggregated controller snapshot forwarded to the emulation engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerState {
    /// First digital bitmask.
    pub digital1: u32,
    /// Second digital bitmask.
    pub digital2: u32,
    /// Left stick X axis. 1 = full left, 255 = full right.
    pub left_x: i32,
    /// Left stick Y axis. 1 = full up, 255 = full down.
    pub left_y: i32,
    /// Right stick X axis.
    pub right_x: i32,
    /// Right stick Y axis.
    pub right_y: i32,
}

impl Default for ControllerState {
    /// No buttons pressed, both sticks centered.
    fn default() -> Self {
        Self {
            digital1: 0,
            digital2: 0,
            left_x: AXIS_CENTER,
            left_y: AXIS_CENTER,
            right_x: AXIS_CENTER,
            right_y: AXIS_CENTER,
        }
    }
}

impl ControllerState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mutable access to one digital field.
    pub fn field_mut(&mut self, field: DigitalField) -> &mut u32 {
        match field {
            DigitalField::First => &mut self.digital1,
            DigitalField::Second => &mut self.digital2,
        }
    }

    /// Current value of one digital field.
    #[must_use]
    pub fn field(&self, field: DigitalField) -> u32 {
        match field {
            DigitalField::First => self.digital1,
            DigitalField::Second => self.digital2,
        }
    }

    /// ORs `bits` into a field.
    pub fn set_bits(&mut self, field: DigitalField, bits: u32) {
        *self.field_mut(field) |= bits;
    }

    /// Clears `bits` from a field.
    pub fn clear_bits(&mut self, field: DigitalField, bits: u32) {
        *self.field_mut(field) &= !bits;
    }

    /// Returns true when every bit of `bits` is set in the field.
    ///
    /// An empty mask is never reported as pressed.
    #[must_use]
    pub fn is_pressed(&self, field: DigitalField, bits: u32) -> bool {
        bits != 0 && self.field(field) & bits == bits
    }

    /// Writes both axes of one stick.
    pub fn set_stick(&mut self, side: StickSide, x: i32, y: i32) {
        match side {
            StickSide::Left => {
                self.left_x = x;
                self.left_y = y;
            }
            StickSide::Right => {
                self.right_x = x;
                self.right_y = y;
            }
        }
    }

    /// Returns both axes of one stick.
    #[must_use]
    pub fn stick(&self, side: StickSide) -> (i32, i32) {
        match side {
            StickSide::Left => (self.left_x, self.left_y),
            StickSide::Right => (self.right_x, self.right_y),
        }
    }

    /// Puts one stick back to neutral.
    pub fn center_stick(&mut self, side: StickSide) {
        self.set_stick(side, AXIS_CENTER, AXIS_CENTER);
    }

    /// Checks if any stick is away from center by more than `threshold`.
    ///
    /// ```
    /// use pad_overlay::state::ControllerState;
    ///
    /// let mut state = ControllerState::new();
    /// assert!(!state.any_stick_moved(10));
    ///
    /// state.right_y = 20;
    /// assert!(state.any_stick_moved(10));
    /// ```
    #[must_use]
    pub fn any_stick_moved(&self, threshold: i32) -> bool {
        (self.left_x - AXIS_CENTER).abs() > threshold
            || (self.left_y - AXIS_CENTER).abs() > threshold
            || (self.right_x - AXIS_CENTER).abs() > threshold
            || (self.right_y - AXIS_CENTER).abs() > threshold
    }

    /// Checks if any digital flag is set.
    #[must_use]
    pub fn any_button_pressed(&self) -> bool {
        self.digital1 != 0 || self.digital2 != 0
    }
}

/// Consumer of the aggregated controller state.
///
/// Called synchronously after every processed touch event, so
/// implementations must be cheap and must not fail loudly.
#[cfg_attr(test, mockall::automock)]
pub trait StateSink {
    /// Receives the current controller state.
    fn forward(&mut self, state: &ControllerState);
}

/// Sink that only logs the forwarded state.
#[derive(Debug, Default)]
pub struct LoggingSink {
    forwarded: u64,
}

impl LoggingSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of states received so far.
    #[must_use]
    pub fn forwarded(&self) -> u64 {
        self.forwarded
    }
}

impl StateSink for LoggingSink {
    fn forward(&mut self, state: &ControllerState) {
        self.forwarded += 1;
        debug!(
            "pad state: d1=0x{:04x} d2=0x{:04x} left=({}, {}) right=({}, {})",
            state.digital1, state.digital2, state.left_x, state.left_y, state.right_x, state.right_y
        );
    }
}

/// Sink that writes one JSON object per forwarded state.
///
/// ```
/// use pad_overlay::state::{ControllerState, JsonLinesSink, StateSink};
///
/// let mut sink = JsonLinesSink::new(Vec::new());
/// sink.forward(&ControllerState::default());
/// let out = String::from_utf8(sink.into_inner()).unwrap();
/// assert!(out.starts_with("{\"digital1\":0"));
/// assert!(out.ends_with('\n'));
/// ```
#[derive(Debug)]
pub struct JsonLinesSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Returns the wrapped writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> StateSink for JsonLinesSink<W> {
    fn forward(&mut self, state: &ControllerState) {
        let result = serde_json::to_writer(&mut self.writer, state)
            .map_err(std::io::Error::from)
            .and_then(|()| self.writer.write_all(b"\n"))
            .and_then(|()| self.writer.flush());

        if let Err(e) = result {
            warn!("Failed to write pad state: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== ControllerState Tests ====================

    #[test]
    fn test_controller_state_default() {
        let state = ControllerState::default();
        assert_eq!(state.digital1, 0);
        assert_eq!(state.digital2, 0);
        assert_eq!(state.left_x, AXIS_CENTER);
        assert_eq!(state.left_y, AXIS_CENTER);
        assert_eq!(state.right_x, AXIS_CENTER);
        assert_eq!(state.right_y, AXIS_CENTER);
        assert!(!state.any_button_pressed());
        assert!(!state.any_stick_moved(0));
    }

    #[test]
    fn test_axis_range_is_symmetric() {
        assert_eq!(AXIS_CENTER - AXIS_HALF_RANGE, AXIS_MIN);
        assert_eq!(AXIS_CENTER + AXIS_HALF_RANGE, AXIS_MAX);
    }

    #[test]
    fn test_set_and_clear_bits() {
        let mut state = ControllerState::new();
        state.set_bits(DigitalField::First, Digital1::START.bits());
        state.set_bits(DigitalField::First, Digital1::UP.bits());
        assert_eq!(state.digital1, 0x18);

        state.clear_bits(DigitalField::First, Digital1::START.bits());
        assert_eq!(state.digital1, Digital1::UP.bits());
        assert_eq!(state.digital2, 0);
    }

    #[test]
    fn test_is_pressed_requires_all_bits() {
        let mut state = ControllerState::new();
        state.set_bits(DigitalField::Second, Digital2::L1.bits());
        assert!(state.is_pressed(DigitalField::Second, Digital2::L1.bits()));
        assert!(!state.is_pressed(DigitalField::Second, (Digital2::L1 | Digital2::R1).bits()));
        assert!(!state.is_pressed(DigitalField::Second, 0));
    }

    #[test]
    fn test_stick_accessors() {
        let mut state = ControllerState::new();
        state.set_stick(StickSide::Right, 255, 1);
        assert_eq!(state.stick(StickSide::Right), (255, 1));
        assert_eq!(state.stick(StickSide::Left), (AXIS_CENTER, AXIS_CENTER));
        assert!(state.any_stick_moved(100));

        state.center_stick(StickSide::Right);
        assert!(!state.any_stick_moved(0));
    }

    #[test]
    fn test_stick_side_index() {
        assert_eq!(StickSide::Left.index(), 0);
        assert_eq!(StickSide::Right.index(), 1);
    }

    #[test]
    fn test_flag_values() {
        assert_eq!(Digital1::SELECT.bits(), 0x01);
        assert_eq!(Digital1::LEFT.bits(), 0x80);
        assert_eq!(Digital1::PS.bits(), 0x100);
        assert_eq!(Digital2::CROSS.bits(), 0x40);
        assert_eq!(Digital2::SQUARE.bits(), 0x80);
    }

    // ==================== Sink Tests ====================

    #[test]
    fn test_logging_sink_counts() {
        let mut sink = LoggingSink::new();
        sink.forward(&ControllerState::default());
        sink.forward(&ControllerState::default());
        assert_eq!(sink.forwarded(), 2);
    }

    #[test]
    fn test_json_lines_sink_writes_one_line_per_state() {
        let mut sink = JsonLinesSink::new(Vec::new());
        let mut state = ControllerState::default();
        sink.forward(&state);
        state.digital2 = Digital2::CROSS.bits();
        sink.forward(&state);

        let out = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);

        let parsed: ControllerState = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(parsed.digital2, 0x40);
        assert_eq!(parsed.left_x, AXIS_CENTER);
    }
}
