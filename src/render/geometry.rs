//! Shared geometry calculations for the overlay
//!
//! This module contains the math shared between screen rendering
//! (iced canvas) and image rendering (tiny-skia).

use crate::domain::{Frame, Line};

/// Axis-aligned rectangle in surface pixels
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Band {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Band {
    #[cfg(test)]
    pub fn area(&self) -> f32 {
        self.w.max(0.0) * self.h.max(0.0)
    }

    pub fn is_empty(&self) -> bool {
        self.w <= 0.0 || self.h <= 0.0
    }
}

/// The four mask bands surrounding the frame: top, bottom, left, right
///
/// Top and bottom span the full surface width; left and right fill the
/// rows between them. Bands never overlap and together cover exactly the
/// surface area outside the frame. Sizes are floored at zero.
pub fn mask_bands(frame: &Frame, surface_w: f32, surface_h: f32) -> [Band; 4] {
    let bottom = frame.bottom();
    let right = frame.right();
    [
        Band {
            x: 0.0,
            y: 0.0,
            w: surface_w,
            h: frame.y.max(0.0),
        },
        Band {
            x: 0.0,
            y: bottom,
            w: surface_w,
            h: (surface_h - bottom).max(0.0),
        },
        Band {
            x: 0.0,
            y: frame.y,
            w: frame.x.max(0.0),
            h: frame.h,
        },
        Band {
            x: right,
            y: frame.y,
            w: (surface_w - right).max(0.0),
            h: frame.h,
        },
    ]
}

/// Border rectangle inset by half the stroke width so the stroke sits
/// entirely inside the frame edge
pub fn border_rect(frame: &Frame, stroke_width: f32) -> Band {
    let half = stroke_width / 2.0;
    Band {
        x: frame.x + half,
        y: frame.y + half,
        w: (frame.w - stroke_width).max(0.0),
        h: (frame.h - stroke_width).max(0.0),
    }
}

/// Segment endpoints for a guide line across the current frame
pub fn line_segment(frame: &Frame, line: &Line) -> ((f32, f32), (f32, f32)) {
    match *line {
        Line::Vertical { x } => ((x, frame.y), (x, frame.bottom())),
        Line::Horizontal { y } => ((frame.x, y), (frame.right(), y)),
    }
}
