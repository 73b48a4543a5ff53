//! Export preview layer shown after a capture

use cosmic::Element;
use cosmic::iced::{ContentFit, Length};
use cosmic::iced_core::{Alignment, Border};
use cosmic::iced_widget::{column, row};
use cosmic::widget::{button, container, image, mouse_area, text};

use crate::fl;

/// Build the preview of a saved export
pub fn build_export_preview<'a, Msg: Clone + 'static>(
    handle: image::Handle,
    path: String,
    on_close: Msg,
    on_background: Msg,
    space_s: u16,
) -> Element<'a, Msg> {
    let header = row![
        text::title4(fl!("export-saved")),
        cosmic::widget::horizontal_space(),
        button::standard(fl!("close")).on_press(on_close),
    ]
    .align_y(Alignment::Center)
    .spacing(space_s);

    let picture = image::Image::new(handle)
        .content_fit(ContentFit::Contain)
        .width(Length::Fill)
        .height(Length::Fill);

    let content = column![header, picture, text::caption(path)]
        .spacing(space_s)
        .padding(space_s);

    let layer = container(content)
        .width(Length::Fill)
        .height(Length::Fill)
        .class(cosmic::theme::Container::Custom(Box::new(|theme| {
            let cosmic_theme = theme.cosmic();
            cosmic::iced::widget::container::Style {
                background: Some(cosmic::iced::Color::from_rgba(0.0, 0.0, 0.0, 0.9).into()),
                text_color: Some(cosmic_theme.background.on.into()),
                border: Border::default(),
                ..Default::default()
            }
        })));

    // The preview is modal: no press may reach the layers below
    mouse_area(layer).on_press(on_background).into()
}
