//! # Geometry Module
//!
//! Integer screen rectangles used for control hit regions.
//!
//! Rectangles follow the usual screen convention: `left`/`top` are
//! inclusive, `right`/`bottom` are exclusive, and the y axis grows downward.
//! Edge arithmetic saturates at the `i32` bounds.
//!
//! ```
//! use pad_overlay::geometry::Rect;
//!
//! let rect = Rect::from_size(10, 20, 100, 50);
//! assert!(rect.contains(10, 20));
//! assert!(!rect.contains(110, 20));
//! assert_eq!(rect.center(), (60, 45));
//! ```

use serde::{Deserialize, Serialize};

/// Axis-aligned integer rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge (inclusive).
    pub left: i32,
    /// Top edge (inclusive).
    pub top: i32,
    /// Right edge (exclusive).
    pub right: i32,
    /// Bottom edge (exclusive).
    pub bottom: i32,
}

impl Rect {
    /// Creates a rectangle from its four edges.
    #[must_use]
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self { left, top, right, bottom }
    }

    /// Creates a rectangle from its top-left corner and size.
    #[must_use]
    pub const fn from_size(left: i32, top: i32, width: i32, height: i32) -> Self {
        Self::new(left, top, left.saturating_add(width), top.saturating_add(height))
    }

    /// Creates a `width` x `height` rectangle centred on `(cx, cy)`.
    #[must_use]
    pub const fn centered(cx: i32, cy: i32, width: i32, height: i32) -> Self {
        Self::from_size(cx.saturating_sub(width / 2), cy.saturating_sub(height / 2), width, height)
    }

    #[must_use]
    pub const fn width(&self) -> i32 {
        self.right.saturating_sub(self.left)
    }

    #[must_use]
    pub const fn height(&self) -> i32 {
        self.bottom.saturating_sub(self.top)
    }

    /// Returns true when the rectangle has no area.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.width() <= 0 || self.height() <= 0
    }

    /// Integer centre point (truncating).
    #[must_use]
    pub const fn center(&self) -> (i32, i32) {
        (
            ((self.left as i64 + self.right as i64) >> 1) as i32,
            ((self.top as i64 + self.bottom as i64) >> 1) as i32,
        )
    }

    /// Hit test with inclusive top-left and exclusive bottom-right edges.
    #[must_use]
    pub const fn contains(&self, x: i32, y: i32) -> bool {
        !self.is_empty() && x >= self.left && x < self.right && y >= self.top && y < self.bottom
    }

    /// Returns a copy translated by `(dx, dy)`.
    #[must_use]
    pub const fn offset(&self, dx: i32, dy: i32) -> Self {
        Self::new(
            self.left.saturating_add(dx),
            self.top.saturating_add(dy),
            self.right.saturating_add(dx),
            self.bottom.saturating_add(dy),
        )
    }

    /// Returns a copy of the same size with its top-left corner at `(left, top)`.
    #[must_use]
    pub const fn moved_to(&self, left: i32, top: i32) -> Self {
        Self::from_size(left, top, self.width(), self.height())
    }

    /// Returns a copy with the same centre and the given size.
    #[must_use]
    pub const fn resized_about_center(&self, width: i32, height: i32) -> Self {
        let (cx, cy) = self.center();
        Self::centered(cx, cy, width, height)
    }

    /// Returns a copy with the same top-left corner and the given size.
    #[must_use]
    pub const fn resized_from_origin(&self, width: i32, height: i32) -> Self {
        Self::from_size(self.left, self.top, width, height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_size() {
        let rect = Rect::from_size(5, 6, 10, 20);
        assert_eq!(rect, Rect::new(5, 6, 15, 26));
        assert_eq!(rect.width(), 10);
        assert_eq!(rect.height(), 20);
    }

    #[test]
    fn test_contains_edges() {
        let rect = Rect::new(0, 0, 10, 10);
        assert!(rect.contains(0, 0));
        assert!(rect.contains(9, 9));
        assert!(!rect.contains(10, 5));
        assert!(!rect.contains(5, 10));
        assert!(!rect.contains(-1, 5));
    }

    #[test]
    fn test_empty_rect_contains_nothing() {
        let rect = Rect::new(10, 10, 10, 20);
        assert!(rect.is_empty());
        assert!(!rect.contains(10, 15));
    }

    #[test]
    fn test_center_truncates() {
        assert_eq!(Rect::new(0, 0, 5, 5).center(), (2, 2));
        assert_eq!(Rect::new(100, 200, 300, 400).center(), (200, 300));
    }

    #[test]
    fn test_offset_and_move() {
        let rect = Rect::from_size(10, 10, 20, 30);
        assert_eq!(rect.offset(-5, 5), Rect::from_size(5, 15, 20, 30));
        assert_eq!(rect.moved_to(0, 0), Rect::from_size(0, 0, 20, 30));
    }

    #[test]
    fn test_resize_keeps_center() {
        let rect = Rect::new(0, 0, 100, 100);
        let resized = rect.resized_about_center(50, 50);
        assert_eq!(resized, Rect::new(25, 25, 75, 75));
        assert_eq!(resized.center(), rect.center());
    }

    #[test]
    fn test_centered_keeps_odd_size() {
        let rect = Rect::centered(10, 10, 5, 3);
        assert_eq!(rect.width(), 5);
        assert_eq!(rect.height(), 3);
        assert_eq!(rect.left, 8);
    }

    #[test]
    fn test_far_coordinates_saturate() {
        let rect = Rect::from_size(0, 0, 100, 100).moved_to(i32::MAX - 10, i32::MIN);
        assert_eq!(rect, Rect::new(i32::MAX - 10, i32::MIN, i32::MAX, i32::MIN + 100));
        assert_eq!(rect.width(), 10);
        assert_eq!(rect.center(), (i32::MAX - 5, i32::MIN + 50));
        assert_eq!(rect.offset(100, -100).left, i32::MAX);

        let wide = Rect::new(i32::MIN, 0, i32::MAX, 10);
        assert_eq!(wide.width(), i32::MAX);
        assert_eq!(wide.center(), (-1, 5));
    }

    #[test]
    fn test_resize_keeps_origin() {
        let rect = Rect::from_size(7, 8, 100, 100);
        assert_eq!(rect.resized_from_origin(10, 20), Rect::from_size(7, 8, 10, 20));
    }
}
