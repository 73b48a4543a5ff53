use crate::domain::Mode;
use crate::session::messages::Msg;
use crate::session::state::Session;
use cosmic::iced::keyboard::{Key, Modifiers, key::Named};

pub fn handle_key_event(
    session: &Session,
    preview_open: bool,
    key: Key,
    modifiers: Modifiers,
) -> Option<Msg> {
    // Leave application-level chords alone
    if modifiers.control() || modifiers.alt() || modifiers.logo() {
        return None;
    }

    // While the export preview is shown only Escape does anything
    if preview_open {
        return match key {
            Key::Named(Named::Escape) => Some(Msg::dismiss_preview()),
            _ => None,
        };
    }

    match key {
        Key::Named(Named::Space) | Key::Named(Named::Enter) => Some(Msg::capture()),
        // Mode shortcuts
        Key::Character(c) if c.eq_ignore_ascii_case("d") => Some(Msg::select_mode(Mode::Dot)),
        Key::Character(c) if c.eq_ignore_ascii_case("v") => {
            Some(Msg::select_mode(Mode::Vertical))
        }
        Key::Character(c) if c.eq_ignore_ascii_case("h") => {
            Some(Msg::select_mode(Mode::Horizontal))
        }
        Key::Character(c) if c.eq_ignore_ascii_case("c") => Some(Msg::switch_camera()),
        // 1-9 pick the n-th ratio preset
        Key::Character(c) => {
            let digit = c.as_str().parse::<usize>().ok().filter(|d| (1..=9).contains(d))?;
            session.ratio_at(digit - 1).map(Msg::select_ratio)
        }
        _ => None,
    }
}
