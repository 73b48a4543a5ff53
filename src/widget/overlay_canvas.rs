//! OverlayCanvas - Canvas layer drawing the guide overlay over the live video
//!
//! This widget handles:
//! - Drawing the mask, border, dots and guide lines every frame
//! - Reporting left-button presses in canvas coordinates

use cosmic::iced_widget::canvas;

use crate::config::OverlayStyle;
use crate::domain::{AnnotationStore, Frame};
use crate::render::{Scene, canvas::CanvasSurface, render};

/// Canvas program for the live overlay
pub struct OverlayCanvas<'a, Message: Clone + 'static> {
    pub frame: Frame,
    pub store: &'a AnnotationStore,
    pub style: &'a OverlayStyle,
    /// Called with the press position relative to the canvas
    pub on_press: Option<Box<dyn Fn(f32, f32) -> Message + 'a>>,
}

impl<'a, Message: Clone + 'static> canvas::Program<Message, cosmic::Theme, cosmic::Renderer>
    for OverlayCanvas<'a, Message>
{
    type State = ();

    fn update(
        &self,
        _state: &mut Self::State,
        event: canvas::Event,
        bounds: cosmic::iced_core::Rectangle,
        cursor: cosmic::iced_core::mouse::Cursor,
    ) -> (canvas::event::Status, Option<Message>) {
        use cosmic::iced_core::mouse::{Button, Event as MouseEvent};

        if let canvas::Event::Mouse(MouseEvent::ButtonPressed(Button::Left)) = event {
            let Some(pos) = cursor.position_in(bounds) else {
                return (canvas::event::Status::Ignored, None);
            };
            if let Some(cb) = &self.on_press {
                return (canvas::event::Status::Captured, Some(cb(pos.x, pos.y)));
            }
        }
        (canvas::event::Status::Ignored, None)
    }

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &cosmic::Renderer,
        _theme: &cosmic::Theme,
        bounds: cosmic::iced_core::Rectangle,
        _cursor: cosmic::iced_core::mouse::Cursor,
    ) -> Vec<canvas::Geometry> {
        let mut frame = canvas::Frame::new(renderer, bounds.size());
        {
            let mut surface = CanvasSurface::new(&mut frame);
            render(
                &mut surface,
                &Scene::preview(self.frame, self.store, self.style),
            );
        }
        vec![frame.into_geometry()]
    }

    fn mouse_interaction(
        &self,
        _state: &Self::State,
        bounds: cosmic::iced_core::Rectangle,
        cursor: cosmic::iced_core::mouse::Cursor,
    ) -> cosmic::iced_core::mouse::Interaction {
        match cursor.position_in(bounds) {
            Some(pos) if self.frame.contains(pos.x, pos.y) => {
                cosmic::iced_core::mouse::Interaction::Crosshair
            }
            _ => cosmic::iced_core::mouse::Interaction::default(),
        }
    }
}
