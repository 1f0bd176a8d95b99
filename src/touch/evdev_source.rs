//! # Linux Touchscreen Source
//!
//! Reads a multitouch touchscreen through evdev and turns the kernel's
//! multitouch protocol B stream into [`TouchEvent`]s.
//!
//! ## Protocol B
//!
//! | Event | Meaning |
//! |-------|---------|
//! | `ABS_MT_SLOT` | Selects the contact slot the next events refer to |
//! | `ABS_MT_TRACKING_ID` | `>= 0` starts a contact, `-1` ends it |
//! | `ABS_MT_POSITION_X/Y` | Raw contact position |
//! | `SYN_REPORT` | End of frame |
//!
//! At every `SYN_REPORT` the decoder emits, in order: one up/pointer-up per
//! lifted contact, one down/pointer-down per new contact, then a single
//! move carrying all live contacts if any of them moved.
//!
//! ## Usage
//!
//! ```no_run
//! use pad_overlay::touch::evdev_source::{MultitouchDecoder, Touchscreen};
//!
//! let decoder = MultitouchDecoder::new(1.0, 1.0);
//! let mut screen = Touchscreen::open(None, decoder)?;
//! loop {
//!     for touch in screen.fetch_touches()? {
//!         println!("{:?}", touch);
//!     }
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use evdev::{AbsoluteAxisType, Device, InputEvent, InputEventKind, Synchronization};
use std::path::Path;
use tracing::{debug, info};

use super::{PointerId, TouchAction, TouchEvent, TouchPointer};
use crate::error::{OverlayError, Result};

/// Maximum number of contact slots tracked.
pub const MAX_SLOTS: usize = 16;

#[derive(Debug, Clone, Copy, Default)]
struct ContactSlot {
    /// Contact as of the current frame.
    tracking: Option<PointerId>,
    /// Contact as of the last emitted frame.
    reported: Option<PointerId>,
    x: i32,
    y: i32,
    moved: bool,
}

/// Stateful protocol B decoder.
#[derive(Debug, Clone)]
pub struct MultitouchDecoder {
    slots: [ContactSlot; MAX_SLOTS],
    current: usize,
    scale_x: f32,
    scale_y: f32,
}

impl MultitouchDecoder {
    /// Creates a decoder that multiplies raw positions by the given scales.
    #[must_use]
    pub fn new(scale_x: f32, scale_y: f32) -> Self {
        Self {
            slots: [ContactSlot::default(); MAX_SLOTS],
            current: 0,
            scale_x,
            scale_y,
        }
    }

    /// Creates a decoder mapping a raw `max_x` x `max_y` range onto the screen.
    ///
    /// A zero raw range means raw coordinates are already pixels.
    #[must_use]
    pub fn for_screen(screen_w: u32, screen_h: u32, max_x: u32, max_y: u32) -> Self {
        let scale = |screen: u32, raw: u32| {
            if raw == 0 {
                1.0
            } else {
                screen as f32 / raw as f32
            }
        };
        Self::new(scale(screen_w, max_x), scale(screen_h, max_y))
    }

    /// Feeds one raw event; returns the touch events completed by it.
    pub fn process(&mut self, event: &InputEvent) -> Vec<TouchEvent> {
        match event.kind() {
            InputEventKind::AbsAxis(axis) => {
                self.process_axis(axis, event.value());
                Vec::new()
            }
            InputEventKind::Synchronization(Synchronization::SYN_REPORT) => self.finish_frame(),
            _ => Vec::new(),
        }
    }

    fn process_axis(&mut self, axis: AbsoluteAxisType, value: i32) {
        if axis == AbsoluteAxisType::ABS_MT_SLOT {
            self.current = usize::try_from(value).unwrap_or(usize::MAX);
            return;
        }

        let Some(slot) = self.slots.get_mut(self.current) else {
            // Slot beyond what we track
            return;
        };

        match axis {
            AbsoluteAxisType::ABS_MT_TRACKING_ID => {
                slot.tracking = u32::try_from(value).ok().map(PointerId);
            }
            AbsoluteAxisType::ABS_MT_POSITION_X => {
                slot.x = value;
                slot.moved = true;
            }
            AbsoluteAxisType::ABS_MT_POSITION_Y => {
                slot.y = value;
                slot.moved = true;
            }
            _ => {}
        }
    }

    fn pointer_for(&self, slot: &ContactSlot, id: PointerId) -> TouchPointer {
        TouchPointer {
            id,
            x: slot.x as f32 * self.scale_x,
            y: slot.y as f32 * self.scale_y,
        }
    }

    fn finish_frame(&mut self) -> Vec<TouchEvent> {
        let mut out = Vec::new();

        // Live pointers as the consumer last saw them, ordered by slot
        let mut live: Vec<(usize, TouchPointer)> = self
            .slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.reported.map(|id| (i, self.pointer_for(s, id))))
            .collect();

        for (i, slot) in self.slots.iter().enumerate() {
            let Some(old) = slot.reported else { continue };
            if slot.tracking == Some(old) {
                continue;
            }
            if let Some(index) = live.iter().position(|(s, _)| *s == i) {
                let action = if live.len() == 1 { TouchAction::Up } else { TouchAction::PointerUp };
                out.push(TouchEvent::new(action, index, live.iter().map(|(_, p)| *p).collect()));
                live.remove(index);
            }
        }

        for (i, slot) in self.slots.iter().enumerate() {
            let Some(new) = slot.tracking else { continue };
            if slot.reported == Some(new) {
                continue;
            }
            let index = live.iter().position(|(s, _)| *s > i).unwrap_or(live.len());
            live.insert(index, (i, self.pointer_for(slot, new)));
            let action = if live.len() == 1 { TouchAction::Down } else { TouchAction::PointerDown };
            out.push(TouchEvent::new(action, index, live.iter().map(|(_, p)| *p).collect()));
        }

        let moved = self
            .slots
            .iter()
            .any(|s| s.moved && s.tracking.is_some() && s.tracking == s.reported);
        if moved {
            out.push(TouchEvent::new(TouchAction::Move, 0, live.iter().map(|(_, p)| *p).collect()));
        }

        for slot in &mut self.slots {
            slot.reported = slot.tracking;
            slot.moved = false;
        }

        out
    }

    /// Number of contacts currently down.
    #[must_use]
    pub fn active_contacts(&self) -> usize {
        self.slots.iter().filter(|s| s.reported.is_some()).count()
    }
}

/// Multitouch touchscreen opened through evdev.
pub struct Touchscreen {
    device: Device,
    device_path: String,
    decoder: MultitouchDecoder,
}

impl std::fmt::Debug for Touchscreen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Touchscreen")
            .field("device_path", &self.device_path)
            .finish_non_exhaustive()
    }
}

impl Touchscreen {
    /// Opens `path`, or the first `/dev/input/event*` device that supports
    /// multitouch slots when `path` is `None`.
    ///
    /// # Errors
    ///
    /// - `Touchscreen`: the given device cannot be opened or is not multitouch
    /// - `TouchscreenNotFound`: auto-detection found nothing
    pub fn open(path: Option<&str>, decoder: MultitouchDecoder) -> Result<Self> {
        if let Some(path) = path {
            let device = Device::open(path)
                .map_err(|e| OverlayError::Touchscreen(format!("Failed to open {}: {}", path, e)))?;
            if !is_multitouch(&device) {
                return Err(OverlayError::Touchscreen(format!("{} is not a multitouch device", path)));
            }
            info!("Opened touchscreen at {}", path);
            return Ok(Self {
                device,
                device_path: path.to_string(),
                decoder,
            });
        }

        let input_dir = Path::new("/dev/input");
        if !input_dir.exists() {
            return Err(OverlayError::Touchscreen("/dev/input directory not found".to_string()));
        }

        let mut entries: Vec<_> = std::fs::read_dir(input_dir)
            .map_err(|e| OverlayError::Touchscreen(format!("Failed to read /dev/input: {}", e)))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| OverlayError::Touchscreen(format!("Failed to read directory entry: {}", e)))?;

        // Deterministic pick when several touchscreens are attached
        entries.sort_by_key(|entry| entry.path());

        for entry in entries {
            let path = entry.path();
            let is_event = path
                .file_name()
                .is_some_and(|name| name.to_string_lossy().starts_with("event"));
            if !is_event {
                continue;
            }

            match Device::open(&path) {
                Ok(device) if is_multitouch(&device) => {
                    let device_path = path.to_string_lossy().to_string();
                    info!("Found touchscreen {:?} at {}", device.name(), device_path);
                    return Ok(Self {
                        device,
                        device_path,
                        decoder,
                    });
                }
                Ok(_) => debug!("{} is not multitouch", path.display()),
                Err(e) => debug!("Could not open {}: {}", path.display(), e),
            }
        }

        Err(OverlayError::TouchscreenNotFound)
    }

    /// Path of the opened device.
    #[must_use]
    pub fn device_path(&self) -> &str {
        &self.device_path
    }

    /// Human-readable device name.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.device.name()
    }

    /// Blocks for the next batch of raw events and decodes them.
    pub fn fetch_touches(&mut self) -> Result<Vec<TouchEvent>> {
        let events = self
            .device
            .fetch_events()
            .map_err(|e| OverlayError::Touchscreen(format!("Failed to fetch events: {}", e)))?;

        let mut touches = Vec::new();
        for event in events {
            touches.extend(self.decoder.process(&event));
        }
        Ok(touches)
    }
}

fn is_multitouch(device: &Device) -> bool {
    device
        .supported_absolute_axes()
        .is_some_and(|axes| axes.contains(AbsoluteAxisType::ABS_MT_SLOT))
}
