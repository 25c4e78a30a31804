/// Axis-aligned bounding box in frame coordinates.
///
/// Stored as top-left / bottom-right corners (TLBR), the format the
/// tracker backends report boxes in.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    /// Top-left x coordinate
    pub x1: f32,
    /// Top-left y coordinate
    pub y1: f32,
    /// Bottom-right x coordinate
    pub x2: f32,
    /// Bottom-right y coordinate
    pub y2: f32,
}

impl Rect {
    /// Create a Rect from top-left / bottom-right corners.
    #[inline]
    pub fn from_tlbr(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Create a Rect from top-left coordinates and dimensions.
    #[inline]
    pub fn from_tlwh(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x1: x,
            y1: y,
            x2: x + width,
            y2: y + height,
        }
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.x2 - self.x1
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.y2 - self.y1
    }

    /// Midpoint of the corners, truncated to whole pixels.
    #[inline]
    pub fn centroid(&self) -> (i32, i32) {
        let mx = (self.x2 - self.x1) / 2.0 + self.x1;
        let my = (self.y2 - self.y1) / 2.0 + self.y1;
        (mx as i32, my as i32)
    }

    /// Rescale both corners, e.g. from processing resolution back to
    /// native capture resolution.
    #[inline]
    pub fn scaled(&self, sx: f32, sy: f32) -> Rect {
        Rect {
            x1: self.x1 * sx,
            y1: self.y1 * sy,
            x2: self.x2 * sx,
            y2: self.y2 * sy,
        }
    }
}
