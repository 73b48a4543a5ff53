//! Image capture and export module
//!
//! This module consolidates:
//! - Camera frame snapshots (image.rs)
//! - Flattened PNG export (export.rs)

pub mod export;
pub mod image;
