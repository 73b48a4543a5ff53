//! Message types for the overlay session
//!
//! This module contains:
//! - Event enum consumed by the input controller
//! - Msg enum with nested sub-enums for the application update loop

use cosmic::iced::keyboard::{Key, Modifiers};

use crate::camera::AcquireOutcome;
use crate::capture::export::SavedExport;
use crate::domain::{AspectRatio, Mode};

// ============================================================================
// Session Events
// ============================================================================

/// Input events understood by [`crate::session::handlers::dispatch`]
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Pointer pressed at viewport coordinates
    PointerDown { x: f32, y: f32 },
    /// Annotation tool chosen
    ModeSelected(Mode),
    /// Guide rectangle ratio chosen
    RatioSelected(AspectRatio),
    /// Viewport size changed
    ResizeOccurred { width: f32, height: f32 },
    /// Flatten and save the current view
    CaptureRequested,
    /// Move to the next camera
    SwitchCameraRequested,
}

// ============================================================================
// Camera/Capture Types
// ============================================================================

/// Camera lifecycle messages
#[derive(Debug, Clone)]
pub enum CameraMsg {
    /// An acquisition request resolved
    Acquired(AcquireOutcome),
    /// Refresh the preview from the latest frame
    Tick,
}

/// Export workflow messages
#[derive(Debug, Clone)]
pub enum CaptureMsg {
    /// Export finished, or failed with a displayable reason
    Saved(Result<SavedExport, String>),
    /// Close the export preview
    DismissPreview,
}

/// Window management messages
///
/// The header bar is hidden, so the toolbar takes over moving and closing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowMsg {
    /// Start moving the window (press on a layer background)
    Drag,
    /// Close the window
    Close,
}

// ============================================================================
// Main Message Enum
// ============================================================================

/// Messages for the application update loop
#[derive(Debug, Clone)]
pub enum Msg {
    /// Input controller events
    Session(Event),
    /// Camera messages
    Camera(CameraMsg),
    /// Export messages
    Capture(CaptureMsg),
    /// Window management
    Window(WindowMsg),
    /// Raw key press, translated by the shortcut table
    Key(Key, Modifiers),
}

// ============================================================================
// Convenience Constructors
// ============================================================================

impl Msg {
    pub fn pointer_down(x: f32, y: f32) -> Self {
        Self::Session(Event::PointerDown { x, y })
    }
    pub fn select_mode(mode: Mode) -> Self {
        Self::Session(Event::ModeSelected(mode))
    }
    pub fn select_ratio(ratio: AspectRatio) -> Self {
        Self::Session(Event::RatioSelected(ratio))
    }
    pub fn resized(width: f32, height: f32) -> Self {
        Self::Session(Event::ResizeOccurred { width, height })
    }
    pub fn capture() -> Self {
        Self::Session(Event::CaptureRequested)
    }
    pub fn switch_camera() -> Self {
        Self::Session(Event::SwitchCameraRequested)
    }

    pub fn camera_acquired(outcome: AcquireOutcome) -> Self {
        Self::Camera(CameraMsg::Acquired(outcome))
    }
    pub fn tick() -> Self {
        Self::Camera(CameraMsg::Tick)
    }

    pub fn export_saved(result: Result<SavedExport, String>) -> Self {
        Self::Capture(CaptureMsg::Saved(result))
    }
    pub fn dismiss_preview() -> Self {
        Self::Capture(CaptureMsg::DismissPreview)
    }

    pub fn drag_window() -> Self {
        Self::Window(WindowMsg::Drag)
    }
    pub fn close_window() -> Self {
        Self::Window(WindowMsg::Close)
    }
}
