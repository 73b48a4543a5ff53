//! Overlay rendering: mask, guide border, dots and guide lines
//!
//! The same routine draws the live preview every tick and the flattened
//! export image once. It only reads the model.

use image::RgbaImage;

use super::geometry::{border_rect, line_segment, mask_bands};
use super::surface::{ImageSurface, Surface};
use crate::config::OverlayStyle;
use crate::domain::{AnnotationStore, Dot, Frame, Line};

/// Everything the renderer needs for one pass
#[derive(Clone, Copy, Debug)]
pub struct Scene<'a> {
    pub frame: Frame,
    pub dots: &'a [Dot],
    pub lines: &'a [Line],
    /// Line drawn with the highlight style, if any
    pub selected: Option<usize>,
    /// Width of lines that are not highlighted
    pub line_width: f32,
    pub style: &'a OverlayStyle,
}

impl<'a> Scene<'a> {
    /// Live preview: the selected line is highlighted
    pub fn preview(frame: Frame, store: &'a AnnotationStore, style: &'a OverlayStyle) -> Self {
        Self {
            frame,
            dots: store.dots(),
            lines: store.lines(),
            selected: store.selected_index(),
            line_width: style.line_width,
            style,
        }
    }

    /// Export: no selection highlight, uniform export line width
    pub fn export(frame: Frame, store: &'a AnnotationStore, style: &'a OverlayStyle) -> Self {
        Self {
            frame,
            dots: store.dots(),
            lines: store.lines(),
            selected: None,
            line_width: style.export_line_width,
            style,
        }
    }
}

/// Draw the overlay onto a surface that already shows the video beneath
pub fn render<S: Surface + ?Sized>(surface: &mut S, scene: &Scene<'_>) {
    let style = scene.style;
    let frame = &scene.frame;
    let (surface_w, surface_h) = surface.size();

    for band in mask_bands(frame, surface_w, surface_h) {
        if !band.is_empty() {
            surface.fill_rect(band.x, band.y, band.w, band.h, style.mask);
        }
    }

    let border = border_rect(frame, style.border_width);
    if !border.is_empty() {
        surface.stroke_rect(
            border.x,
            border.y,
            border.w,
            border.h,
            style.border,
            style.border_width,
        );
    }

    for dot in scene.dots {
        surface.fill_circle(
            dot.x,
            dot.y,
            style.dot_radius,
            style.dot_fill,
            Some((style.dot_outline, style.dot_outline_width)),
        );
    }

    for (idx, line) in scene.lines.iter().enumerate() {
        let (color, width) = if scene.selected == Some(idx) {
            (style.selected_line, style.selected_line_width)
        } else {
            (style.line, scene.line_width)
        };
        let (from, to) = line_segment(frame, line);
        surface.line(from, to, color, width);
    }
}

/// Draw `source` stretched over the surface, then the overlay on top
pub fn render_with_source<S: ImageSurface + ?Sized>(
    surface: &mut S,
    scene: &Scene<'_>,
    source: Option<&RgbaImage>,
) {
    if let Some(image) = source {
        surface.draw_image(image);
    }
    render(surface, scene);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::compute_frame;
    use crate::render::surface::PixmapSurface;

    fn sample_store() -> AnnotationStore {
        let mut store = AnnotationStore::default();
        store.add_dot(500.0, 400.0);
        store.add_vertical_line(300.0);
        store.add_horizontal_line(200.0);
        store
    }

    #[test]
    fn test_render_is_idempotent() {
        let style = OverlayStyle::default();
        let store = sample_store();
        let frame = compute_frame(1.0, 1000.0, 800.0);
        let scene = Scene::preview(frame, &store, &style);

        let mut first = PixmapSurface::new(1000, 800).unwrap();
        render(&mut first, &scene);
        let mut second = PixmapSurface::new(1000, 800).unwrap();
        render(&mut second, &scene);

        assert_eq!(first.data(), second.data());
        // The model is untouched by rendering
        assert_eq!(store.dots().len(), 1);
        assert_eq!(store.selected_index(), Some(1));
    }

    #[test]
    fn test_mask_outside_clear_inside() {
        let style = OverlayStyle::default();
        let store = AnnotationStore::default();
        let frame = compute_frame(1.0, 1000.0, 800.0);

        let mut surface = PixmapSurface::new(1000, 800).unwrap();
        render(&mut surface, &Scene::preview(frame, &store, &style));
        let img = surface.to_image();

        let mask_alpha = style.mask.to_rgba_u8()[3];
        for (x, y) in [(0, 0), (999, 799), (50, 400), (950, 400), (500, 10), (500, 790)] {
            assert_eq!(img.get_pixel(x, y).0[3], mask_alpha, "({x},{y}) not masked");
        }
        // Interior of the frame is untouched
        assert_eq!(img.get_pixel(500, 400).0, [0, 0, 0, 0]);
        // Border sits on the inner edge of the frame
        let border = img.get_pixel(133, 400).0;
        assert!(border[0] > 200 && border[3] > 200, "border pixel {border:?}");
    }

    #[test]
    fn test_selected_line_is_highlighted_only_in_preview() {
        let style = OverlayStyle::default();
        let mut store = AnnotationStore::default();
        store.add_vertical_line(300.0);
        let frame = compute_frame(1.0, 1000.0, 800.0);

        let mut preview = PixmapSurface::new(1000, 800).unwrap();
        render(&mut preview, &Scene::preview(frame, &store, &style));
        let px = preview.to_image().get_pixel(300, 400).0;
        assert_eq!(px, [0, 255, 255, 255]);

        let mut export = PixmapSurface::new(1000, 800).unwrap();
        render(&mut export, &Scene::export(frame, &store, &style));
        let px = export.to_image().get_pixel(300, 400).0;
        assert_eq!(px, [0, 255, 0, 255]);
    }

    #[test]
    fn test_source_image_is_drawn_first() {
        let style = OverlayStyle::default();
        let store = AnnotationStore::default();
        let frame = compute_frame(1.0, 100.0, 80.0);
        let source = RgbaImage::from_pixel(10, 8, image::Rgba([200, 100, 50, 255]));

        let mut surface = PixmapSurface::new(100, 80).unwrap();
        render_with_source(
            &mut surface,
            &Scene::export(frame, &store, &style),
            Some(&source),
        );
        let img = surface.to_image();

        let center = img.get_pixel(50, 40).0;
        for (got, want) in center.iter().zip([200u8, 100, 50, 255]) {
            assert!(got.abs_diff(want) <= 1, "center {center:?}");
        }
        // Masked corner is darker than the source but still opaque
        let corner = img.get_pixel(0, 0).0;
        assert_eq!(corner[3], 255);
        assert!(corner[0] < 200);
    }
}
