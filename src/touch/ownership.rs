//! # Touch Ownership
//!
//! Bidirectional index between pointers and the control slots they drive.
//!
//! Each control gets a [`ControlHandle`] from the overlay; controls that can
//! follow several fingers at once (multi-touch pads) expose one slot per
//! finger. The arena enforces both halves of the ownership rule:
//!
//! - a pointer owns at most one control slot
//! - a control slot is owned by at most one pointer
//!
//! ```
//! use pad_overlay::touch::PointerId;
//! use pad_overlay::touch::ownership::{ControlHandle, SlotKey, TouchOwnership};
//!
//! let mut owners = TouchOwnership::new();
//! let slot = SlotKey::new(ControlHandle(0), 0);
//!
//! assert!(owners.claim(slot, PointerId(1)));
//! assert!(!owners.claim(slot, PointerId(2)));           // slot taken
//! assert!(!owners.claim(SlotKey::new(ControlHandle(1), 0), PointerId(1))); // pointer busy
//!
//! assert_eq!(owners.release(slot), Some(PointerId(1)));
//! assert!(owners.is_empty());
//! ```

use std::collections::HashMap;
use tracing::debug;

use super::PointerId;

/// Position of a control inside the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ControlHandle(pub usize);

/// One ownable slot of one control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotKey {
    pub control: ControlHandle,
    pub slot: u8,
}

impl SlotKey {
    #[must_use]
    pub const fn new(control: ControlHandle, slot: u8) -> Self {
        Self { control, slot }
    }
}

/// Pointer to control-slot ownership arena.
#[derive(Debug, Default, Clone)]
pub struct TouchOwnership {
    by_pointer: HashMap<PointerId, SlotKey>,
    by_slot: HashMap<SlotKey, PointerId>,
}

impl TouchOwnership {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `pointer` to `slot`.
    ///
    /// Returns true when the binding exists afterwards: either it was
    /// created, or `pointer` already owned `slot`. Returns false when the
    /// slot belongs to another pointer or the pointer owns another slot.
    pub fn claim(&mut self, slot: SlotKey, pointer: PointerId) -> bool {
        if let Some(owner) = self.by_slot.get(&slot) {
            return *owner == pointer;
        }
        if self.by_pointer.contains_key(&pointer) {
            return false;
        }

        self.by_slot.insert(slot, pointer);
        self.by_pointer.insert(pointer, slot);
        debug!("pointer {} claimed control {} slot {}", pointer.0, slot.control.0, slot.slot);
        true
    }

    /// Pointer currently owning `slot`.
    #[must_use]
    pub fn owner(&self, slot: SlotKey) -> Option<PointerId> {
        self.by_slot.get(&slot).copied()
    }

    /// Slot currently owned by `pointer`.
    #[must_use]
    pub fn slot_of(&self, pointer: PointerId) -> Option<SlotKey> {
        self.by_pointer.get(&pointer).copied()
    }

    /// Returns true when `slot` has an owner.
    #[must_use]
    pub fn is_owned(&self, slot: SlotKey) -> bool {
        self.by_slot.contains_key(&slot)
    }

    /// Returns true when `pointer` owns any slot.
    #[must_use]
    pub fn is_busy(&self, pointer: PointerId) -> bool {
        self.by_pointer.contains_key(&pointer)
    }

    /// Frees `slot`, returning its former owner.
    pub fn release(&mut self, slot: SlotKey) -> Option<PointerId> {
        let pointer = self.by_slot.remove(&slot)?;
        self.by_pointer.remove(&pointer);
        debug!("pointer {} released control {} slot {}", pointer.0, slot.control.0, slot.slot);
        Some(pointer)
    }

    /// Frees whatever `pointer` owns.
    pub fn release_pointer(&mut self, pointer: PointerId) -> Option<SlotKey> {
        let slot = self.by_pointer.remove(&pointer)?;
        self.by_slot.remove(&slot);
        Some(slot)
    }

    /// Number of live bindings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_slot.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_slot.is_empty()
    }

    /// Drops every binding.
    pub fn clear(&mut self) {
        self.by_pointer.clear();
        self.by_slot.clear();
    }
}
