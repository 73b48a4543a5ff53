//! Overlay session management module
//!
//! This module contains:
//! - Session state (viewport, frame, mode, annotations)
//! - Event and message types
//! - The input controller dispatching events to state changes
//! - Keyboard shortcuts

pub mod handlers;
pub mod messages;
pub mod shortcuts;
pub mod state;
