//! Flattened still export
//!
//! The export is rendered offscreen at viewport size: camera frame first,
//! then the overlay without selection highlight. It is written as PNG to the
//! configured folder.

use std::io;
use std::path::{Path, PathBuf};

use anyhow::Context;
use image::RgbaImage;

use crate::config::{OverlayColor, OverlayStyle, SaveLocation};
use crate::render::{ImageSurface, PixmapSurface, Scene, render_with_source};
use crate::session::state::Session;

/// Background used where no camera frame is available
const EXPORT_BACKGROUND: OverlayColor = OverlayColor::rgba(0.0, 0.0, 0.0, 1.0);

/// A flattened export that was written to disk
#[derive(Debug, Clone)]
pub struct SavedExport {
    pub path: PathBuf,
    pub image: RgbaImage,
}

/// Render the current session over `source` into a new image
///
/// `source` must be a snapshot; the export never observes later frames.
pub fn flatten(
    session: &Session,
    source: Option<&RgbaImage>,
    style: &OverlayStyle,
) -> anyhow::Result<RgbaImage> {
    let (w, h) = session.viewport();
    let (width, height) = (w.round() as u32, h.round() as u32);
    let mut surface = PixmapSurface::new(width, height)
        .with_context(|| format!("cannot export a {width}x{height} view"))?;

    surface.clear(EXPORT_BACKGROUND);
    let scene = Scene::export(session.frame(), &session.store, style);
    render_with_source(&mut surface, &scene, source);

    log::debug!(
        "Flattened export {}x{} with {} dots, {} lines",
        width,
        height,
        scene.dots.len(),
        scene.lines.len()
    );
    Ok(surface.to_image())
}

pub fn save_rgba(img: &RgbaImage, path: &Path) -> anyhow::Result<()> {
    let mut file = std::fs::File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    Ok(write_png(&mut file, img)?)
}

pub fn export_file_name() -> String {
    chrono::Local::now()
        .format("LayoutLens_%Y-%m-%d_%H-%M-%S.png")
        .to_string()
}

pub fn get_img_dir(location: SaveLocation) -> Option<PathBuf> {
    match location {
        SaveLocation::Pictures => {
            dirs::picture_dir().or_else(|| dirs::home_dir().map(|h| h.join("Pictures")))
        }
        SaveLocation::Documents => {
            dirs::document_dir().or_else(|| dirs::home_dir().map(|h| h.join("Documents")))
        }
    }
}

/// Write `image` into `dir` under a timestamped name
pub fn save_in(dir: &Path, image: RgbaImage) -> anyhow::Result<SavedExport> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create {}", dir.display()))?;
    let path = dir.join(export_file_name());
    save_rgba(&image, &path)?;
    log::info!("Saved export to {}", path.display());
    Ok(SavedExport { path, image })
}

/// Save on the blocking pool, reporting failures as display text
pub async fn save(image: RgbaImage, location: SaveLocation) -> Result<SavedExport, String> {
    let result = tokio::task::spawn_blocking(move || {
        let dir = get_img_dir(location).context("no folder to save the export in")?;
        save_in(&dir, image)
    })
    .await;

    match result {
        Ok(Ok(saved)) => Ok(saved),
        Ok(Err(err)) => {
            log::error!("Export failed: {:#}", err);
            Err(format!("{err:#}"))
        }
        Err(err) => {
            log::error!("Export task failed: {}", err);
            Err(err.to_string())
        }
    }
}

fn write_png<W: io::Write>(w: W, image: &RgbaImage) -> Result<(), png::EncodingError> {
    let mut encoder = png::Encoder::new(w, image.width(), image.height());
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(image.as_raw())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AspectRatio, Mode};
    use crate::session::handlers::dispatch;
    use crate::session::messages::Event;

    fn session() -> Session {
        let mut session = Session::new(vec![AspectRatio::SQUARE], AspectRatio::SQUARE);
        dispatch(
            &mut session,
            Event::ResizeOccurred {
                width: 200.0,
                height: 100.0,
            },
        );
        session
    }

    #[test]
    fn test_flatten_without_frame_is_black_and_masked() {
        let style = OverlayStyle::default();
        let img = flatten(&session(), None, &style).unwrap();

        assert_eq!(img.dimensions(), (200, 100));
        // Frame interior shows the black background
        assert_eq!(img.get_pixel(100, 50).0, [0, 0, 0, 255]);
        // Masked band over black stays black and opaque
        assert_eq!(img.get_pixel(2, 50).0, [0, 0, 0, 255]);
    }

    #[test]
    fn test_flatten_uses_snapshot_and_export_line_style() {
        let style = OverlayStyle::default();
        let mut s = session();
        dispatch(&mut s, Event::ModeSelected(Mode::Vertical));
        dispatch(&mut s, Event::PointerDown { x: 80.0, y: 50.0 });

        let mut frame = RgbaImage::from_pixel(20, 10, image::Rgba([10, 20, 200, 255]));
        let img = flatten(&s, Some(&frame), &style).unwrap();
        // Mutating the source afterwards does not touch the export
        frame.fill(255);

        let inside = img.get_pixel(120, 50).0;
        assert!(inside[2] >= 199 && inside[0] <= 11, "inside {inside:?}");
        // Selected line is drawn in the plain line color
        assert_eq!(img.get_pixel(80, 50).0, [0, 255, 0, 255]);
    }

    #[test]
    fn test_flatten_rejects_empty_viewport() {
        let style = OverlayStyle::default();
        let s = Session::new(vec![AspectRatio::SQUARE], AspectRatio::SQUARE);
        assert!(flatten(&s, None, &style).is_err());
    }

    #[test]
    fn test_save_in_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nested");
        let img = RgbaImage::from_pixel(4, 3, image::Rgba([1, 2, 3, 255]));

        let saved = save_in(&target, img).unwrap();

        let name = saved.path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("LayoutLens_") && name.ends_with(".png"));
        let decoded = image::open(&saved.path).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (4, 3));
        assert_eq!(decoded.get_pixel(0, 0).0, [1, 2, 3, 255]);
    }
}
