//! Live preview surface backed by an iced canvas frame

use cosmic::iced_core::{Color, Point, Size};
use cosmic::iced_widget::canvas::{Frame, Path, Stroke};

use super::surface::Surface;
use crate::config::OverlayColor;

/// Adapter drawing overlay primitives into a canvas [`Frame`]
pub struct CanvasSurface<'a> {
    frame: &'a mut Frame<cosmic::Renderer>,
}

impl<'a> CanvasSurface<'a> {
    pub fn new(frame: &'a mut Frame<cosmic::Renderer>) -> Self {
        Self { frame }
    }
}

fn stroke(color: OverlayColor, width: f32) -> Stroke<'static> {
    Stroke {
        style: Color::from(color).into(),
        width,
        ..Stroke::default()
    }
}

impl Surface for CanvasSurface<'_> {
    fn size(&self) -> (f32, f32) {
        (self.frame.width(), self.frame.height())
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: OverlayColor) {
        self.frame
            .fill_rectangle(Point::new(x, y), Size::new(w, h), Color::from(color));
    }

    fn stroke_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: OverlayColor, width: f32) {
        let path = Path::rectangle(Point::new(x, y), Size::new(w, h));
        self.frame.stroke(&path, stroke(color, width));
    }

    fn fill_circle(
        &mut self,
        cx: f32,
        cy: f32,
        radius: f32,
        fill: OverlayColor,
        outline: Option<(OverlayColor, f32)>,
    ) {
        let path = Path::circle(Point::new(cx, cy), radius);
        self.frame.fill(&path, Color::from(fill));
        if let Some((color, width)) = outline {
            self.frame.stroke(&path, stroke(color, width));
        }
    }

    fn line(&mut self, from: (f32, f32), to: (f32, f32), color: OverlayColor, width: f32) {
        let path = Path::line(Point::new(from.0, from.1), Point::new(to.0, to.1));
        self.frame.stroke(&path, stroke(color, width));
    }
}
