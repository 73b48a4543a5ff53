//! Widgets composing the overlay window

pub mod export_preview;
pub mod overlay_canvas;
pub mod toolbar;
