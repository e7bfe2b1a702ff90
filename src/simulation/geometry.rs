//! Axis-aligned rectangle primitive shared by agents and obstacles.

/// Axis-aligned rectangle with its origin at the top-left corner.
///
/// The vertical axis points down, matching screen coordinates: `top` is the
/// smallest y value and `bottom` the largest.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// X coordinate of the left edge
    pub x: f32,
    /// Y coordinate of the top edge
    pub y: f32,
    /// Width in world units
    pub w: f32,
    /// Height in world units
    pub h: f32,
}

impl Rect {
    /// Creates a rectangle from its top-left corner and extent.
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// X coordinate of the left edge.
    pub fn left(&self) -> f32 {
        self.x
    }

    /// X coordinate of the right edge.
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    /// Y coordinate of the top edge.
    pub fn top(&self) -> f32 {
        self.y
    }

    /// Y coordinate of the bottom edge.
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    /// Tests whether two rectangles overlap.
    ///
    /// Edges that merely touch do not count as an overlap, so an agent
    /// standing exactly on top of a block does not collide with it.
    ///
    /// # Arguments
    ///
    /// * `other` - Rectangle to test against
    ///
    /// # Returns
    ///
    /// `true` if the interiors of the two rectangles intersect.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }
}
