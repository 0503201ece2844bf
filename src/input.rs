//! Keyboard and pointer dispatch.
//!
//! `route` is a pure table keyed by the active mode and the key. Anything the
//! table does not name is dropped.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::search_bar::EraseKey;
use crate::state::ModeKind;
use crate::view::Hit;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Left,
    Right,
    Up,
    Down,
    Enter,
    Escape,
    Backspace,
    Delete,
    Home,
    End,
    PageUp,
    PageDown,
    Other,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyInput {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl From<KeyEvent> for KeyInput {
    fn from(event: KeyEvent) -> Self {
        let key = match event.code {
            KeyCode::Char(ch) => Key::Char(ch),
            KeyCode::Left => Key::Left,
            KeyCode::Right => Key::Right,
            KeyCode::Up => Key::Up,
            KeyCode::Down => Key::Down,
            KeyCode::Enter => Key::Enter,
            KeyCode::Esc => Key::Escape,
            KeyCode::Backspace => Key::Backspace,
            KeyCode::Delete => Key::Delete,
            KeyCode::Home => Key::Home,
            KeyCode::End => Key::End,
            KeyCode::PageUp => Key::PageUp,
            KeyCode::PageDown => Key::PageDown,
            _ => Key::Other,
        };
        Self {
            key,
            modifiers: Modifiers {
                ctrl: event.modifiers.contains(KeyModifiers::CONTROL),
                alt: event.modifiers.contains(KeyModifiers::ALT),
            },
        }
    }
}

/// What a key or pointer event asks for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Type(char),
    Erase(EraseKey),
    SelectAll,
    CaretHome,
    CaretEnd,
    PageLeft,
    PageRight,
    FirstPage,
    LastPage,
    JumpToPage(usize),
    SelectLeft,
    SelectRight,
    Select(usize),
    ClearSelection,
    OpenSlot(usize),
    Activate,
    Cancel,
    NextEngine,
    PreviousEngine,
    WebSearch,
    Reload,
    Quit,
}

/// A single visible character, as opposed to a named key.
pub fn is_sign_character(ch: char) -> bool {
    !ch.is_control()
}

pub fn route(mode: ModeKind, input: KeyInput, buffer_empty: bool) -> Option<Action> {
    let Modifiers { ctrl, alt } = input.modifiers;

    if input.key == Key::Enter && (ctrl || alt) {
        return Some(Action::WebSearch);
    }
    if ctrl {
        return match input.key {
            Key::Char('c' | 'q') => Some(Action::Quit),
            Key::Char('r') => Some(Action::Reload),
            Key::Char('a') if mode != ModeKind::Grid => Some(Action::SelectAll),
            _ => None,
        };
    }
    if alt {
        return None;
    }

    match (mode, input.key) {
        (ModeKind::Grid, Key::Left | Key::PageUp) => Some(Action::PageLeft),
        (ModeKind::Grid, Key::Right | Key::PageDown) => Some(Action::PageRight),
        (ModeKind::Grid, Key::Home) => Some(Action::FirstPage),
        (ModeKind::Grid, Key::End) => Some(Action::LastPage),
        (ModeKind::Grid, Key::Enter) => Some(Action::Activate),
        (ModeKind::Grid, Key::Escape) => Some(Action::Quit),
        (ModeKind::Grid, Key::Char(ch)) if buffer_empty && ch.is_ascii_digit() => {
            ch.to_digit(10).map(|page| Action::JumpToPage(page as usize))
        }

        (ModeKind::Search, Key::Left) => Some(Action::SelectLeft),
        (ModeKind::Search, Key::Right) => Some(Action::SelectRight),

        (ModeKind::EngineChooser, Key::Down) => Some(Action::NextEngine),
        (ModeKind::EngineChooser, Key::Up) => Some(Action::PreviousEngine),

        (ModeKind::Search | ModeKind::EngineChooser, Key::Backspace) => {
            Some(Action::Erase(EraseKey::Backspace))
        }
        (ModeKind::Search | ModeKind::EngineChooser, Key::Delete) => {
            Some(Action::Erase(EraseKey::Delete))
        }
        (ModeKind::Search | ModeKind::EngineChooser, Key::Home) => Some(Action::CaretHome),
        (ModeKind::Search | ModeKind::EngineChooser, Key::End) => Some(Action::CaretEnd),
        (ModeKind::Search | ModeKind::EngineChooser, Key::Enter) => Some(Action::Activate),
        (ModeKind::Search | ModeKind::EngineChooser, Key::Escape) => Some(Action::Cancel),

        (_, Key::Char(ch)) if is_sign_character(ch) => Some(Action::Type(ch)),
        _ => None,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pointer {
    /// Pointer moved; `None` when it is over no hit target.
    Hover(Option<Hit>),
    Click(Hit),
    ScrollUp,
    ScrollDown,
}

pub fn route_pointer(mode: ModeKind, pointer: Pointer) -> Option<Action> {
    match (mode, pointer) {
        (ModeKind::Grid | ModeKind::Search, Pointer::Hover(Some(Hit::Tile(slot)))) => {
            Some(Action::Select(slot))
        }
        // Search keeps its selection when the pointer leaves a tile.
        (ModeKind::Grid, Pointer::Hover(_)) => Some(Action::ClearSelection),
        (ModeKind::Grid | ModeKind::Search, Pointer::Click(Hit::Tile(slot))) => {
            Some(Action::OpenSlot(slot))
        }
        (ModeKind::Grid, Pointer::Click(Hit::PreviousPage) | Pointer::ScrollUp) => {
            Some(Action::PageLeft)
        }
        (ModeKind::Grid, Pointer::Click(Hit::NextPage) | Pointer::ScrollDown) => {
            Some(Action::PageRight)
        }
        (ModeKind::EngineChooser, Pointer::ScrollDown) => Some(Action::NextEngine),
        (ModeKind::EngineChooser, Pointer::ScrollUp) => Some(Action::PreviousEngine),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    impl KeyInput {
        fn plain(key: Key) -> Self {
            Self {
                key,
                modifiers: Modifiers::default(),
            }
        }

        fn ctrl(key: Key) -> Self {
            Self {
                key,
                modifiers: Modifiers {
                    ctrl: true,
                    alt: false,
                },
            }
        }
    }

    fn plain(mode: ModeKind, key: Key) -> Option<Action> {
        route(mode, KeyInput::plain(key), true)
    }

    #[test]
    fn arrows_depend_on_mode() {
        assert_eq!(plain(ModeKind::Grid, Key::Left), Some(Action::PageLeft));
        assert_eq!(plain(ModeKind::Grid, Key::Right), Some(Action::PageRight));
        assert_eq!(plain(ModeKind::Search, Key::Left), Some(Action::SelectLeft));
        assert_eq!(plain(ModeKind::Search, Key::Right), Some(Action::SelectRight));
        assert_eq!(plain(ModeKind::EngineChooser, Key::Down), Some(Action::NextEngine));
        assert_eq!(plain(ModeKind::EngineChooser, Key::Up), Some(Action::PreviousEngine));
        assert_eq!(plain(ModeKind::EngineChooser, Key::Left), None);
        assert_eq!(plain(ModeKind::Grid, Key::Up), None);
    }

    #[test]
    fn digits_jump_pages_only_in_grid_with_empty_buffer() {
        assert_eq!(plain(ModeKind::Grid, Key::Char('3')), Some(Action::JumpToPage(3)));
        assert_eq!(
            route(ModeKind::Grid, KeyInput::plain(Key::Char('3')), false),
            Some(Action::Type('3'))
        );
        assert_eq!(plain(ModeKind::Search, Key::Char('3')), Some(Action::Type('3')));
        assert_eq!(
            plain(ModeKind::EngineChooser, Key::Char('3')),
            Some(Action::Type('3'))
        );
    }

    #[test]
    fn printable_characters_type_in_every_mode() {
        for mode in [ModeKind::Grid, ModeKind::Search, ModeKind::EngineChooser] {
            assert_eq!(plain(mode, Key::Char('g')), Some(Action::Type('g')));
            assert_eq!(plain(mode, Key::Char(' ')), Some(Action::Type(' ')));
        }
        assert_eq!(plain(ModeKind::Grid, Key::Char('\u{7}')), None);
    }

    #[test]
    fn modified_enter_wins_over_mode_enter() {
        for mode in [ModeKind::Grid, ModeKind::Search, ModeKind::EngineChooser] {
            assert_eq!(route(mode, KeyInput::ctrl(Key::Enter), false), Some(Action::WebSearch));
            let alt = KeyInput {
                key: Key::Enter,
                modifiers: Modifiers {
                    ctrl: false,
                    alt: true,
                },
            };
            assert_eq!(route(mode, alt, false), Some(Action::WebSearch));
            assert_eq!(plain(mode, Key::Enter), Some(Action::Activate));
        }
    }

    #[test]
    fn control_shortcuts() {
        assert_eq!(route(ModeKind::Search, KeyInput::ctrl(Key::Char('c')), false), Some(Action::Quit));
        assert_eq!(route(ModeKind::Grid, KeyInput::ctrl(Key::Char('r')), true), Some(Action::Reload));
        assert_eq!(
            route(ModeKind::Search, KeyInput::ctrl(Key::Char('a')), false),
            Some(Action::SelectAll)
        );
        assert_eq!(route(ModeKind::Grid, KeyInput::ctrl(Key::Char('x')), true), None);
    }

    #[test]
    fn escape_backs_out_or_quits() {
        assert_eq!(plain(ModeKind::Grid, Key::Escape), Some(Action::Quit));
        assert_eq!(plain(ModeKind::Search, Key::Escape), Some(Action::Cancel));
        assert_eq!(plain(ModeKind::EngineChooser, Key::Escape), Some(Action::Cancel));
    }

    #[test]
    fn unknown_keys_are_ignored() {
        for mode in [ModeKind::Grid, ModeKind::Search, ModeKind::EngineChooser] {
            assert_eq!(plain(mode, Key::Other), None);
        }
        assert_eq!(plain(ModeKind::Grid, Key::Backspace), None);
    }

    #[test]
    fn crossterm_events_convert() {
        let event = KeyEvent::new(KeyCode::Enter, KeyModifiers::CONTROL);
        let input = KeyInput::from(event);
        assert_eq!(input.key, Key::Enter);
        assert!(input.modifiers.ctrl);

        let event = KeyEvent::new(KeyCode::Char('G'), KeyModifiers::SHIFT);
        assert_eq!(KeyInput::from(event), KeyInput::plain(Key::Char('G')));
    }

    #[test]
    fn pointer_hover_and_leave() {
        assert_eq!(
            route_pointer(ModeKind::Grid, Pointer::Hover(Some(Hit::Tile(2)))),
            Some(Action::Select(2))
        );
        assert_eq!(
            route_pointer(ModeKind::Grid, Pointer::Hover(None)),
            Some(Action::ClearSelection)
        );
        assert_eq!(route_pointer(ModeKind::Search, Pointer::Hover(None)), None);
        assert_eq!(
            route_pointer(ModeKind::Grid, Pointer::Click(Hit::NextPage)),
            Some(Action::PageRight)
        );
        assert_eq!(
            route_pointer(ModeKind::Search, Pointer::Click(Hit::Tile(0))),
            Some(Action::OpenSlot(0))
        );
        assert_eq!(route_pointer(ModeKind::EngineChooser, Pointer::Click(Hit::Tile(0))), None);
    }
}
