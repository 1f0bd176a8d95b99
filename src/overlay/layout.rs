//! # Default Layout
//!
//! PS3-style control placement derived from the screen size.
//!
//! All sizes are multiples of a base unit `bs = min(width, height) / 10`:
//!
//! ```text
//!  L2  [select] (PS) [start]           R2
//!  L1                                  R1
//!
//!  +-----+                        +-----+
//!  |dpad |    (L3)      (R3)      | face|
//!  +-----+                        +-----+
//! ```
//!
//! Floating sticks may spawn anywhere inside a `bs` margin from the screen
//! edges that no control claims; the left half spawns the left stick.

use crate::config::OverlayConfig;
use crate::controls::{AnalogStick, Button, Control, DirectionalPad, PadBits};
use crate::geometry::Rect;
use crate::state::{Digital1, Digital2, DigitalField, StickSide};

/// Identity of the movement pad.
pub const DPAD_ID: &str = "dpad";
/// Identity of the face-button pad.
pub const FACE_PAD_ID: &str = "triangleSquareCircleCross";
/// Identity of the L3 click stick.
pub const L3_STICK_ID: &str = "l3Stick";
/// Identity of the R3 click stick.
pub const R3_STICK_ID: &str = "r3Stick";

/// Screen area where floating sticks may spawn.
///
/// ```
/// use pad_overlay::overlay::layout::FloatingRegion;
/// use pad_overlay::state::StickSide;
///
/// let region = FloatingRegion::new(1920, 1080, 108);
/// assert!(region.contains(500, 500));
/// assert!(!region.contains(100, 500));
/// assert_eq!(region.side_of(960), StickSide::Left);
/// assert_eq!(region.side_of(961), StickSide::Right);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FloatingRegion {
    width: i32,
    height: i32,
    margin: i32,
}

impl FloatingRegion {
    #[must_use]
    pub const fn new(width: i32, height: i32, margin: i32) -> Self {
        Self { width, height, margin }
    }

    /// Horizontal extent is `(margin, width - margin]`, vertical extent is
    /// `(margin, height - margin)`.
    #[must_use]
    pub const fn contains(&self, x: i32, y: i32) -> bool {
        let x_in = x > self.margin && x <= self.width - self.margin;
        let y_in = y > self.margin && y < self.height - self.margin;
        x_in && y_in
    }

    /// Stick side spawned by a touch at `x`.
    #[must_use]
    pub const fn side_of(&self, x: i32) -> StickSide {
        if x <= self.width / 2 {
            StickSide::Left
        } else {
            StickSide::Right
        }
    }
}

/// Controls and floating sticks of the default layout.
#[derive(Debug, Clone)]
pub struct DefaultLayout {
    /// Editable controls: pads, buttons, click sticks.
    pub controls: Vec<Control>,
    /// Floating stick templates, indexed by [`StickSide::index`].
    pub floating: [AnalogStick; 2],
    pub region: FloatingRegion,
}

impl DefaultLayout {
    /// Builds the layout for a `width` x `height` screen.
    #[must_use]
    pub fn new(width: i32, height: i32, overlay: &OverlayConfig) -> Self {
        let bs = width.min(height) / 10;

        let btn_area = bs * 3;
        let btn_area_x = width - btn_area - bs;
        let btn_area_y = height - btn_area - bs / 2;
        let btn_distance = bs / 8;
        let dpad_size = bs * 3 - btn_distance / 2;

        let dpad = DirectionalPad::new(
            DPAD_ID,
            Rect::from_size(bs, btn_area_y, dpad_size, dpad_size),
            (dpad_size / 2, dpad_size / 2 - dpad_size / 20),
            DigitalField::First,
            PadBits::new(
                Digital1::UP.bits(),
                Digital1::LEFT.bits(),
                Digital1::RIGHT.bits(),
                Digital1::DOWN.bits(),
            ),
            false,
        )
        .with_edge_divisor(overlay.dpad_edge_divisor);

        let face = DirectionalPad::new(
            FACE_PAD_ID,
            Rect::from_size(btn_area_x - bs / 2, btn_area_y, btn_area, btn_area),
            (bs, bs),
            DigitalField::Second,
            PadBits::new(
                Digital2::TRIANGLE.bits(),
                Digital2::SQUARE.bits(),
                Digital2::CIRCLE.bits(),
                Digital2::CROSS.bits(),
            ),
            true,
        )
        .with_edge_divisor(overlay.face_edge_divisor);

        let small = (bs as f32 * 1.5) as i32;
        let start_x = width / 2 + bs * 2;
        let top_row_y = bs / 2;
        let select_x = width / 2 - small - bs * 2;
        let shoulder_low_y = bs + bs + bs / 2;
        let right_x = width - bs * 2;

        let d1 = |flag: Digital1, x, y, size| Button::new(Rect::from_size(x, y, size, size), flag.bits(), 0);
        let d2 = |flag: Digital2, x, y, size| Button::new(Rect::from_size(x, y, size, size), 0, flag.bits());

        let buttons = [
            d1(Digital1::START, start_x, top_row_y, small),
            d1(Digital1::SELECT, select_x, top_row_y, small),
            d1(Digital1::PS, width / 2 - bs / 2, top_row_y + (small - bs) / 2, bs),
            d2(Digital2::L1, bs, shoulder_low_y, small),
            d2(Digital2::L2, bs, bs, small),
            d2(Digital2::R1, right_x, shoulder_low_y, small),
            d2(Digital2::R2, right_x, bs, small),
        ];

        let click = (bs as f32 * 1.5) as i32;
        let click_offset = (bs as f32 * 2.3) as i32;
        let click_top = (height as f32 - bs as f32 * 2.3) as i32;
        let click_bottom = height - click_offset + click;

        let l3 = AnalogStick::new(
            L3_STICK_ID,
            Rect::new(width / 2 - bs * 2 - click, click_top, width / 2 - bs * 2, click_bottom),
            StickSide::Left,
        )
        .with_press(DigitalField::First, Digital1::L3.bits());

        let r3 = AnalogStick::new(
            R3_STICK_ID,
            Rect::new(width / 2 + bs * 2, click_top, width / 2 + bs * 2 + click, click_bottom),
            StickSide::Right,
        )
        .with_press(DigitalField::First, Digital1::R3.bits());

        let mut controls: Vec<Control> = vec![dpad.into(), face.into()];
        controls.extend(buttons.into_iter().map(Control::from));
        controls.push(l3.into());
        controls.push(r3.into());

        let floating_size = bs * 2;
        let floating = [
            AnalogStick::new("floatingLeft", Rect::from_size(0, 0, floating_size, floating_size), StickSide::Left),
            AnalogStick::new("floatingRight", Rect::from_size(0, 0, floating_size, floating_size), StickSide::Right),
        ];

        Self {
            controls,
            floating,
            region: FloatingRegion::new(width, height, bs),
        }
    }
}
