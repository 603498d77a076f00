/// Rectangle in floating point image coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// X coordinate of the top-left corner.
    pub x: f32,
    /// Y coordinate of the top-left corner.
    pub y: f32,
    /// Width of the rectangle.
    pub width: f32,
    /// Height of the rectangle.
    pub height: f32,
}

/// Rectangle position used for chaining constructors.
pub struct RectPosition {
    pub x: f32,
    pub y: f32,
}

impl RectPosition {
    /// Makes a rectangle with the given end point.
    pub fn ending_at(&self, x: f32, y: f32) -> Rect {
        Rect {
            x: self.x,
            y: self.y,
            width: x - self.x,
            height: y - self.y,
        }
    }
}

impl Rect {
    /// Starts a rectangle with the given position.
    pub fn at(x: f32, y: f32) -> RectPosition {
        RectPosition { x, y }
    }

    /// Right end of the rectangle.
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Bottom end of the rectangle.
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Whether the rectangle covers no area. Non-finite rectangles count as empty.
    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0 && self.x.is_finite() && self.y.is_finite())
            || !self.right().is_finite()
            || !self.bottom().is_finite()
    }

    /// Clamps the rectangle to `[0, width] x [0, height]`.
    /// If the rectangle is larger than the given size, it will be shrunk.
    ///
    /// # Arguments
    ///
    /// * `width` - Width to clamp to.
    /// * `height` - Height to clamp to.
    pub fn clamp(&self, width: f32, height: f32) -> Rect {
        let left = self.x.max(0.0);
        let right = self.right().min(width);
        let top = self.y.max(0.0);
        let bottom = self.bottom().min(height);

        Rect {
            x: left,
            y: top,
            width: right - left,
            height: bottom - top,
        }
    }

    /// Snaps the rectangle outwards to whole pixels inside a `width` x `height` image.
    ///
    /// Returns `None` when nothing of the rectangle lies inside the image.
    pub fn to_pixel_region(&self, width: u32, height: u32) -> Option<PixelRegion> {
        if self.is_empty() {
            return None;
        }

        let clamped = self.clamp(width as f32, height as f32);
        if clamped.is_empty() {
            return None;
        }

        let left = clamped.x.floor() as u32;
        let top = clamped.y.floor() as u32;
        let right = (clamped.right().ceil() as u32).min(width);
        let bottom = (clamped.bottom().ceil() as u32).min(height);

        if right <= left || bottom <= top {
            return None;
        }

        Some(PixelRegion {
            x: left,
            y: top,
            width: right - left,
            height: bottom - top,
        })
    }
}

/// Whole-pixel rectangle that lies fully inside an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRegion {
    /// Whether the pixel at `(x, y)` falls inside the region.
    pub fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }
}
