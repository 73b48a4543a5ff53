//! Core application module
//!
//! This module contains:
//! - Application entry point and Cosmic Application implementation

pub mod app;
