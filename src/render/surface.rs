//! Drawing surface abstraction
//!
//! The overlay renderer only needs a handful of primitives. [`Surface`] is
//! implemented by the live iced canvas and by the offscreen tiny-skia
//! pixmap; [`ImageSurface`] adds the raster-only operations used for export.

use image::RgbaImage;
use tiny_skia::{
    FillRule, FilterQuality, LineCap, Paint, PathBuilder, Pixmap, PixmapPaint, Stroke, Transform,
};

use crate::config::OverlayColor;

/// 2D drawing primitives in surface pixel coordinates
pub trait Surface {
    /// Surface size in pixels (width, height)
    fn size(&self) -> (f32, f32);

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: OverlayColor);

    fn stroke_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: OverlayColor, width: f32);

    /// Filled circle with an optional outline `(color, width)`
    fn fill_circle(
        &mut self,
        cx: f32,
        cy: f32,
        radius: f32,
        fill: OverlayColor,
        outline: Option<(OverlayColor, f32)>,
    );

    fn line(&mut self, from: (f32, f32), to: (f32, f32), color: OverlayColor, width: f32);
}

/// Raster surface that can take an external image and be read back
pub trait ImageSurface: Surface {
    /// Draw `image` stretched to cover the whole surface
    fn draw_image(&mut self, image: &RgbaImage);

    /// Copy the surface out as straight-alpha RGBA
    fn to_image(&self) -> RgbaImage;
}

/// Offscreen tiny-skia surface used for export
pub struct PixmapSurface {
    pixmap: Pixmap,
}

impl PixmapSurface {
    /// Create a transparent surface; `None` for a zero-sized surface
    pub fn new(width: u32, height: u32) -> Option<Self> {
        Pixmap::new(width, height).map(|pixmap| Self { pixmap })
    }

    /// Fill the whole surface with one color
    pub fn clear(&mut self, color: OverlayColor) {
        let [r, g, b, a] = color.to_rgba_u8();
        self.pixmap.fill(tiny_skia::Color::from_rgba8(r, g, b, a));
    }

    /// Raw premultiplied RGBA bytes
    #[cfg(test)]
    pub fn data(&self) -> &[u8] {
        self.pixmap.data()
    }
}

fn paint(color: OverlayColor) -> Paint<'static> {
    let [r, g, b, a] = color.to_rgba_u8();
    let mut paint = Paint::default();
    paint.set_color_rgba8(r, g, b, a);
    paint.anti_alias = true;
    paint
}

impl Surface for PixmapSurface {
    fn size(&self) -> (f32, f32) {
        (self.pixmap.width() as f32, self.pixmap.height() as f32)
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: OverlayColor) {
        let Some(rect) = tiny_skia::Rect::from_xywh(x, y, w, h) else {
            return;
        };
        // Mask bands land on whole pixels, keep their edges crisp
        let mut paint = paint(color);
        paint.anti_alias = false;
        self.pixmap.fill_rect(rect, &paint, Transform::identity(), None);
    }

    fn stroke_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: OverlayColor, width: f32) {
        let Some(rect) = tiny_skia::Rect::from_xywh(x, y, w, h) else {
            return;
        };
        let path = PathBuilder::from_rect(rect);
        let stroke = Stroke {
            width,
            ..Default::default()
        };
        self.pixmap
            .stroke_path(&path, &paint(color), &stroke, Transform::identity(), None);
    }

    fn fill_circle(
        &mut self,
        cx: f32,
        cy: f32,
        radius: f32,
        fill: OverlayColor,
        outline: Option<(OverlayColor, f32)>,
    ) {
        let Some(path) = PathBuilder::from_circle(cx, cy, radius) else {
            return;
        };
        self.pixmap.fill_path(
            &path,
            &paint(fill),
            FillRule::Winding,
            Transform::identity(),
            None,
        );
        if let Some((color, width)) = outline {
            let stroke = Stroke {
                width,
                ..Default::default()
            };
            self.pixmap
                .stroke_path(&path, &paint(color), &stroke, Transform::identity(), None);
        }
    }

    fn line(&mut self, from: (f32, f32), to: (f32, f32), color: OverlayColor, width: f32) {
        let mut pb = PathBuilder::new();
        pb.move_to(from.0, from.1);
        pb.line_to(to.0, to.1);
        let Some(path) = pb.finish() else {
            return;
        };
        let stroke = Stroke {
            width,
            line_cap: LineCap::Butt,
            ..Default::default()
        };
        self.pixmap
            .stroke_path(&path, &paint(color), &stroke, Transform::identity(), None);
    }
}

impl ImageSurface for PixmapSurface {
    fn draw_image(&mut self, image: &RgbaImage) {
        let (w, h) = (image.width(), image.height());
        let Some(size) = tiny_skia::IntSize::from_wh(w, h) else {
            return;
        };
        // Camera frames are opaque, so straight and premultiplied alpha agree
        let Some(source) = Pixmap::from_vec(image.as_raw().clone(), size) else {
            log::warn!("Could not wrap {}x{} frame as pixmap", w, h);
            return;
        };

        let sx = self.pixmap.width() as f32 / w as f32;
        let sy = self.pixmap.height() as f32 / h as f32;
        let paint = PixmapPaint {
            quality: FilterQuality::Bilinear,
            ..Default::default()
        };
        self.pixmap.draw_pixmap(
            0,
            0,
            source.as_ref(),
            &paint,
            Transform::from_scale(sx, sy),
            None,
        );
    }

    fn to_image(&self) -> RgbaImage {
        let mut img = RgbaImage::new(self.pixmap.width(), self.pixmap.height());
        for (dst, src) in img.pixels_mut().zip(self.pixmap.pixels()) {
            let c = src.demultiply();
            *dst = image::Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
        }
        img
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_sized_surface_is_rejected() {
        assert!(PixmapSurface::new(0, 10).is_none());
    }

    #[test]
    fn test_fill_rect_skips_empty_rects() {
        let mut surface = PixmapSurface::new(4, 4).unwrap();
        surface.fill_rect(0.0, 0.0, 0.0, 4.0, OverlayColor::rgba(1.0, 0.0, 0.0, 1.0));
        assert!(surface.data().iter().all(|b| *b == 0));
    }

    #[test]
    fn test_draw_image_stretches_to_fill() {
        let mut surface = PixmapSurface::new(8, 8).unwrap();
        let source = RgbaImage::from_pixel(2, 2, image::Rgba([10, 200, 30, 255]));
        surface.draw_image(&source);

        let out = surface.to_image();
        for (x, y) in [(0, 0), (7, 0), (0, 7), (7, 7), (4, 4)] {
            let px = out.get_pixel(x, y).0;
            for (got, want) in px.iter().zip([10u8, 200, 30, 255]) {
                assert!(got.abs_diff(want) <= 1, "pixel ({x},{y}) = {px:?}");
            }
        }
    }
}
