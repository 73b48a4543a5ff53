//! Guide rectangle geometry
//!
//! All coordinates are viewport pixels with the origin at the top-left corner.

/// Fraction of the limiting viewport dimension covered by the guide rectangle
pub const MARGIN_FACTOR: f32 = 0.92;

/// Centered guide rectangle with a fixed aspect ratio (width / height)
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Frame {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    pub ratio: f32,
}

impl Frame {
    /// Right edge (inclusive)
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    /// Bottom edge (inclusive)
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    /// Whether the frame has a usable area
    pub fn is_empty(&self) -> bool {
        self.w <= 0.0 || self.h <= 0.0
    }

    /// Check if a point lies inside the frame, edges included
    pub fn contains(&self, x: f32, y: f32) -> bool {
        !self.is_empty() && x >= self.x && x <= self.right() && y >= self.y && y <= self.bottom()
    }

    /// Clamp an x coordinate into `[x, x + w]`
    pub fn clamp_x(&self, x: f32) -> f32 {
        x.clamp(self.x, self.right())
    }

    /// Clamp a y coordinate into `[y, y + h]`
    pub fn clamp_y(&self, y: f32) -> f32 {
        y.clamp(self.y, self.bottom())
    }
}

/// Compute the centered guide rectangle for `ratio` inside a viewport
///
/// The rectangle is height-constrained when the viewport is wider than the
/// ratio and width-constrained otherwise. Position and size are rounded to
/// whole pixels. `ratio` must be positive and finite.
pub fn compute_frame(ratio: f32, viewport_w: f32, viewport_h: f32) -> Frame {
    if viewport_w <= 0.0 || viewport_h <= 0.0 {
        return Frame {
            ratio,
            ..Frame::default()
        };
    }

    let (box_w, box_h) = if viewport_w / viewport_h > ratio {
        let h = viewport_h * MARGIN_FACTOR;
        (h * ratio, h)
    } else {
        let w = viewport_w * MARGIN_FACTOR;
        (w, w / ratio)
    };

    Frame {
        x: ((viewport_w - box_w) / 2.0).round(),
        y: ((viewport_h - box_h) / 2.0).round(),
        w: box_w.round(),
        h: box_h.round(),
        ratio,
    }
}
