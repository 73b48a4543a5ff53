//! Toolbar widget for mode, ratio and camera actions

use cosmic::Element;
use cosmic::iced::Length;
use cosmic::iced_core::{Alignment, Border};
use cosmic::iced_widget::{column, row};
use cosmic::widget::{button, container, mouse_area, text, tooltip};

use crate::domain::{AspectRatio, Mode};
use crate::fl;

pub fn mode_label(mode: Mode) -> String {
    match mode {
        Mode::Dot => fl!("mode-dot"),
        Mode::Vertical => fl!("mode-vertical"),
        Mode::Horizontal => fl!("mode-horizontal"),
    }
}

fn mode_shortcut(mode: Mode) -> &'static str {
    match mode {
        Mode::Dot => "D",
        Mode::Vertical => "V",
        Mode::Horizontal => "H",
    }
}

/// Toggle-style button: suggested when active, standard otherwise
fn toggle_button<'a, Msg: Clone + 'static>(
    label: String,
    active: bool,
    on_press: Msg,
) -> Element<'a, Msg> {
    if active {
        button::suggested(label).on_press(on_press).into()
    } else {
        button::standard(label).on_press(on_press).into()
    }
}

/// Build the toolbar element
#[allow(clippy::too_many_arguments)]
pub fn build_toolbar<'a, Msg: Clone + 'static>(
    mode: Mode,
    ratios: &[AspectRatio],
    ratio: AspectRatio,
    ratio_label: String,
    status: Option<&str>,
    on_mode: impl Fn(Mode) -> Msg + 'a,
    on_ratio: impl Fn(AspectRatio) -> Msg + 'a,
    on_capture: Msg,
    on_switch_camera: Msg,
    on_drag: Msg,
    on_quit: Msg,
    space_s: u16,
    space_xs: u16,
) -> Element<'a, Msg> {
    // Exactly one mode button is marked active
    let modes = Mode::ALL.into_iter().fold(row![].spacing(space_xs), |row, m| {
        row.push(tooltip(
            toggle_button(mode_label(m), m == mode, on_mode(m)),
            text::body(mode_shortcut(m)),
            tooltip::Position::Bottom,
        ))
    });

    let ratio_buttons = ratios
        .iter()
        .enumerate()
        .fold(row![].spacing(space_xs), |row, (i, r)| {
            let btn = toggle_button(r.to_string(), *r == ratio, on_ratio(*r));
            if i < 9 {
                row.push(tooltip(
                    btn,
                    text::body((i + 1).to_string()),
                    tooltip::Position::Bottom,
                ))
            } else {
                row.push(btn)
            }
        });

    let ratio_label = text::body(fl!("ratio-label", ratio = ratio_label));

    let capture = tooltip(
        button::suggested(fl!("capture")).on_press(on_capture),
        text::body("Space"),
        tooltip::Position::Bottom,
    );
    let switch = tooltip(
        button::standard(fl!("switch-camera")).on_press(on_switch_camera),
        text::body("C"),
        tooltip::Position::Bottom,
    );

    let quit = button::standard(fl!("quit")).on_press(on_quit);

    let controls = row![
        modes,
        cosmic::widget::divider::vertical::default(),
        ratio_buttons,
        ratio_label,
        cosmic::widget::horizontal_space(),
        switch,
        capture,
        quit,
    ]
    .spacing(space_s)
    .align_y(Alignment::Center)
    .width(Length::Fill);

    let mut content = column![controls].spacing(space_xs);
    if let Some(status) = status {
        content = content.push(text::caption(status.to_string()));
    }

    let bar = container(content.padding(space_s))
        .width(Length::Fill)
        .class(cosmic::theme::Container::Custom(Box::new(|theme| {
            let cosmic_theme = theme.cosmic();
            let mut background: cosmic::iced::Color = cosmic_theme.background.base.into();
            background.a = 0.85;
            cosmic::iced::widget::container::Style {
                background: Some(background.into()),
                text_color: Some(cosmic_theme.background.on.into()),
                border: Border::default(),
                ..Default::default()
            }
        })));

    // Presses on the bar background move the window instead of reaching
    // the overlay canvas below
    mouse_area(bar).on_press(on_drag).into()
}
