#![forbid(unsafe_code)]

//! Geometric primitives in browser client coordinates.

/// A rectangle reported by a slot element's bounding box.
///
/// Uses client coordinates (CSS pixels, origin at the viewport's top-left).
/// Values are `f64` because `getBoundingClientRect()` is fractional on
/// zoomed or high-DPI pages.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ClientRect {
    /// Left edge (inclusive).
    pub left: f64,
    /// Top edge (inclusive).
    pub top: f64,
    /// Width in CSS pixels.
    pub width: f64,
    /// Height in CSS pixels.
    pub height: f64,
}

impl ClientRect {
    /// Create a new rectangle.
    #[inline]
    #[must_use]
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Right edge (exclusive).
    #[inline]
    #[must_use]
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    /// Bottom edge (exclusive).
    #[inline]
    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Vertical center line.
    #[inline]
    #[must_use]
    pub fn center_y(&self) -> f64 {
        self.top + self.height / 2.0
    }

    /// Check if the rectangle has zero (or negative, or NaN) area.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    /// Check if a point is inside the rectangle.
    ///
    /// Left/top edges are inclusive and right/bottom edges exclusive, so two
    /// vertically stacked slots never both claim the shared boundary.
    #[inline]
    #[must_use]
    pub fn contains(&self, x: f64, y: f64) -> bool {
        !self.is_empty() && x >= self.left && x < self.right() && y >= self.top && y < self.bottom()
    }

    /// Translate by a scroll delta.
    #[inline]
    #[must_use]
    pub fn offset(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.left + dx, self.top + dy, self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::ClientRect;

    #[test]
    fn edges() {
        let r = ClientRect::new(10.0, 20.0, 100.0, 40.0);
        assert_eq!(r.right(), 110.0);
        assert_eq!(r.bottom(), 60.0);
        assert_eq!(r.center_y(), 40.0);
    }

    #[test]
    fn contains_is_half_open() {
        let r = ClientRect::new(0.0, 0.0, 10.0, 10.0);
        assert!(r.contains(0.0, 0.0));
        assert!(r.contains(9.99, 9.99));
        assert!(!r.contains(10.0, 5.0));
        assert!(!r.contains(5.0, 10.0));
        assert!(!r.contains(-0.1, 5.0));
    }

    #[test]
    fn stacked_rects_share_no_point() {
        let upper = ClientRect::new(0.0, 0.0, 50.0, 48.0);
        let lower = ClientRect::new(0.0, 48.0, 50.0, 48.0);
        assert!(!upper.contains(25.0, 48.0));
        assert!(lower.contains(25.0, 48.0));
    }

    #[test]
    fn empty_rect_contains_nothing() {
        let r = ClientRect::new(5.0, 5.0, 0.0, 10.0);
        assert!(r.is_empty());
        assert!(!r.contains(5.0, 6.0));
        assert!(ClientRect::new(0.0, 0.0, f64::NAN, 1.0).is_empty());
    }

    #[test]
    fn offset_moves_origin_only() {
        let r = ClientRect::new(1.0, 2.0, 3.0, 4.0).offset(10.0, -2.0);
        assert_eq!(r, ClientRect::new(11.0, 0.0, 3.0, 4.0));
    }
}
