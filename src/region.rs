use opencv::core::Rect;

/// An axis-aligned face candidate in frame coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Region {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Region {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Clips `rect` to a `frame_width` x `frame_height` frame.
    ///
    /// Returns `None` when no pixels of `rect` lie inside the frame.
    pub fn clamped(rect: Rect, frame_width: i32, frame_height: i32) -> Option<Self> {
        let x1 = rect.x.clamp(0, frame_width);
        let y1 = rect.y.clamp(0, frame_height);
        let x2 = rect.x.saturating_add(rect.width).clamp(0, frame_width);
        let y2 = rect.y.saturating_add(rect.height).clamp(0, frame_height);

        (x2 > x1 && y2 > y1).then(|| Self::new(x1, y1, x2 - x1, y2 - y1))
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

impl From<Rect> for Region {
    fn from(rect: Rect) -> Self {
        Self::new(rect.x, rect.y, rect.width, rect.height)
    }
}
