//! Canvas rectangle geometry.
//!
//! Node bounds live in screen coordinates and are owned by the UI layer;
//! the engine only ever asks "does this rectangle fully enclose that one?".
//! That single predicate decides firewall membership.

use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle in screen coordinates.
///
/// `x` and `y` are the top-left corner.  Coordinates may be negative: the user
/// can drag a component partly past the window origin and the containment
/// rules still apply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    /// X coordinate of the top-left corner (may be negative).
    pub x: i32,
    /// Y coordinate of the top-left corner (may be negative).
    pub y: i32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Rect {
    /// Returns the rightmost X coordinate (exclusive).
    pub fn right(&self) -> i32 {
        self.x + self.width as i32
    }

    /// Returns the bottommost Y coordinate (exclusive).
    pub fn bottom(&self) -> i32 {
        self.y + self.height as i32
    }

    /// Returns `true` if `inner` lies entirely within this rectangle.
    ///
    /// Containment is non-strict: `inner`'s top-left must be at or inside this
    /// rectangle's top-left and `inner`'s bottom-right at or inside its
    /// bottom-right, so touching edges still count as contained.  Every
    /// rectangle contains itself.
    pub fn contains(&self, inner: &Rect) -> bool {
        inner.x >= self.x
            && inner.y >= self.y
            && inner.right() <= self.right()
            && inner.bottom() <= self.bottom()
    }
}
