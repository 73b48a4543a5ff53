//! Input controller
//!
//! [`dispatch`] is the only place session state changes. Each event yields
//! exactly one [`Effect`] for the caller to carry out.

use super::messages::Event;
use super::state::Session;
use crate::domain::Mode;

/// Side effect requested by an event
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Effect {
    /// Nothing changed
    None,
    /// State changed, repaint the overlay
    Redraw,
    /// Flatten the current view
    Export,
    /// Move to the next camera
    SwitchCamera,
}

pub fn dispatch(session: &mut Session, event: Event) -> Effect {
    match event {
        Event::PointerDown { x, y } => pointer_down(session, x, y),
        Event::ModeSelected(mode) => {
            session.mode = mode;
            Effect::Redraw
        }
        Event::RatioSelected(ratio) => {
            session.set_ratio(ratio);
            Effect::Redraw
        }
        Event::ResizeOccurred { width, height } => {
            session.set_viewport(width, height);
            Effect::Redraw
        }
        Event::CaptureRequested => Effect::Export,
        Event::SwitchCameraRequested => Effect::SwitchCamera,
    }
}

fn pointer_down(session: &mut Session, x: f32, y: f32) -> Effect {
    let frame = session.frame();
    if !frame.contains(x, y) {
        return Effect::None;
    }

    match session.mode {
        Mode::Dot => session.store.add_dot(x, y),
        Mode::Vertical => {
            session.store.add_vertical_line(frame.clamp_x(x));
        }
        Mode::Horizontal => {
            session.store.add_horizontal_line(frame.clamp_y(y));
        }
    }
    log::debug!(
        "{:?} placed at ({}, {}), {} dots, {} lines",
        session.mode,
        x,
        y,
        session.store.dots().len(),
        session.store.lines().len()
    );
    Effect::Redraw
}
