//! Match geometry in frame pixel coordinates.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Rectangle reported by the template matcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct MatchRect {
    /// Left edge x-coordinate
    pub x: i32,
    /// Top edge y-coordinate
    pub y: i32,
    /// Rectangle width
    pub width: i32,
    /// Rectangle height
    pub height: i32,
}

impl MatchRect {
    /// Create a new rectangle.
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// Center point, using integer halving of the size.
    #[inline]
    pub fn center(&self) -> (i32, i32) {
        (self.x + self.width / 2, self.y + self.height / 2)
    }

    /// Offset of the rectangle center from a reference point.
    pub fn offset_from(&self, center_x: i32, center_y: i32) -> PixelOffset {
        let (cx, cy) = self.center();
        PixelOffset::new(cx - center_x, cy - center_y)
    }
}

/// Signed distance of a target from the frame center.
///
/// Positive `dx` means the target sits right of center, positive `dy`
/// means below.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct PixelOffset {
    pub dx: i32,
    pub dy: i32,
}

impl PixelOffset {
    pub fn new(dx: i32, dy: i32) -> Self {
        Self { dx, dy }
    }

    /// True when both components lie within `dead_zone`.
    pub fn within(&self, dead_zone: i32) -> bool {
        self.dx.abs() <= dead_zone && self.dy.abs() <= dead_zone
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_uses_integer_halving() {
        let rect = MatchRect::new(10, 20, 31, 41);
        assert_eq!(rect.center(), (25, 40));
    }

    #[test]
    fn test_offset_from_reference() {
        let rect = MatchRect::new(100, 50, 20, 20);
        let offset = rect.offset_from(175, 110);
        assert_eq!(offset, PixelOffset::new(-65, -50));
    }

    #[test]
    fn test_within_dead_zone() {
        assert!(PixelOffset::new(5, -5).within(5));
        assert!(!PixelOffset::new(6, 0).within(5));
        assert!(!PixelOffset::new(0, -6).within(5));
    }
}
