//! Overlay rendering module
//!
//! This module contains:
//! - Geometry shared between screen and image rendering
//! - The drawing surface traits and the tiny-skia surface (for export)
//! - The iced canvas surface (for the live preview)
//! - The overlay routine drawing onto either

pub mod canvas;
pub mod geometry;
pub mod overlay;
pub mod surface;

pub use overlay::{Scene, render, render_with_source};
pub use surface::{ImageSurface, PixmapSurface};
