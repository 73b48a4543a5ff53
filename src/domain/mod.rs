//! Pure domain types with minimal dependencies
//!
//! This module contains core types used throughout the application.
//! Types here should have no framework dependencies (cosmic, iced, gstreamer)
//! so the overlay logic stays testable on its own.

pub mod annotation;
pub mod geometry;
pub mod mode;

pub use annotation::*;
pub use geometry::*;
pub use mode::*;
