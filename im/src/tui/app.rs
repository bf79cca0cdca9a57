//! TUI application - input handling
//!
//! The App owns the TuiState. View-local input (scrolling, zooming,
//! quitting) is applied here directly; anything that touches the selection
//! comes back as an [`Action`] for the runner to hand to the engine.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use tracing::debug;

use super::state::TuiState;

/// Selection requests produced by input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ActivateCard(i64),
    ActivateMarker(i64),
    Deselect,
}

/// TUI application
#[derive(Debug, Default)]
pub struct App {
    state: TuiState,
}

impl App {
    pub fn new() -> Self {
        Self { state: TuiState::new() }
    }

    pub fn state(&self) -> &TuiState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut TuiState {
        &mut self.state
    }

    /// Index of the current selection as a raw identifier
    fn selected_index(&self) -> Option<i64> {
        self.state.selected().map(|c| c.id.index() as i64)
    }

    /// Handle a key event
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Action> {
        match (key.code, key.modifiers) {
            (KeyCode::Char('c'), KeyModifiers::CONTROL) | (KeyCode::Char('q'), _) => {
                debug!("App::handle_key: quit requested");
                self.state.should_quit = true;
                None
            }

            // Unchecked on purpose: the engine rejects steps past either end
            (KeyCode::Char('j'), _) | (KeyCode::Down, _) => {
                Some(Action::ActivateCard(self.selected_index().map_or(0, |i| i + 1)))
            }
            (KeyCode::Char('k'), _) | (KeyCode::Up, _) => {
                Some(Action::ActivateCard(self.selected_index().map_or(0, |i| i - 1)))
            }
            (KeyCode::Char('g'), _) | (KeyCode::Home, _) => Some(Action::ActivateCard(0)),
            (KeyCode::Char('G'), _) | (KeyCode::End, _) => {
                Some(Action::ActivateCard(self.state.cards.len() as i64 - 1))
            }
            (KeyCode::Esc, _) => Some(Action::Deselect),

            (KeyCode::PageDown, _) | (KeyCode::Char('d'), KeyModifiers::CONTROL) => {
                self.state.scroll_by(self.state.visible_cards() as isize);
                None
            }
            (KeyCode::PageUp, _) | (KeyCode::Char('u'), KeyModifiers::CONTROL) => {
                self.state.scroll_by(-(self.state.visible_cards() as isize));
                None
            }
            (KeyCode::Char('+'), _) | (KeyCode::Char('='), _) => {
                self.state.viewport.zoom_by(1);
                None
            }
            (KeyCode::Char('-'), _) => {
                self.state.viewport.zoom_by(-1);
                None
            }
            _ => None,
        }
    }

    /// Handle a click or wheel turn
    pub fn handle_mouse(&mut self, mouse: MouseEvent) -> Option<Action> {
        let (column, row) = (mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some(id) = self.state.card_at(column, row) {
                    debug!(%id, "App::handle_mouse: card clicked");
                    return Some(Action::ActivateCard(id.index() as i64));
                }
                if let Some(id) = self.state.marker_at(column, row) {
                    debug!(%id, "App::handle_mouse: marker clicked");
                    return Some(Action::ActivateMarker(id.index() as i64));
                }
                None
            }
            MouseEventKind::ScrollDown | MouseEventKind::ScrollUp => {
                let down = mouse.kind == MouseEventKind::ScrollDown;
                if self.state.list_area.is_some_and(|a| a.contains((column, row).into())) {
                    self.state.scroll_by(if down { 1 } else { -1 });
                } else if self.state.map_area.is_some_and(|a| a.contains((column, row).into())) {
                    self.state.viewport.zoom_by(if down { -1 } else { 1 });
                }
                None
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Coordinate, RecordId};
    use crate::host::Host;
    use crate::render::{CardViewModel, MarkerColor, MarkerViewModel};
    use crossterm::event::KeyEventState;
    use ratatui::layout::Rect;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: crossterm::event::KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn click(column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    fn app_with_cards(n: usize, selected: Option<usize>) -> App {
        let mut app = App::new();
        let cards: Vec<_> = (0..n)
            .map(|i| CardViewModel {
                id: RecordId::new(i),
                title: format!("Site {i}"),
                fields: Vec::new(),
                highlighted: selected == Some(i),
            })
            .collect();
        app.state_mut().render_cards(&cards);
        app
    }

    #[test]
    fn test_quit_keys() {
        let mut app = App::new();
        assert_eq!(app.handle_key(key(KeyCode::Char('q'))), None);
        assert!(app.state().should_quit);

        let mut app = App::new();
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        app.handle_key(ctrl_c);
        assert!(app.state().should_quit);
    }

    #[test]
    fn test_step_keys() {
        let mut app = app_with_cards(5, None);
        assert_eq!(app.handle_key(key(KeyCode::Char('j'))), Some(Action::ActivateCard(0)));

        let mut app = app_with_cards(5, Some(2));
        assert_eq!(app.handle_key(key(KeyCode::Down)), Some(Action::ActivateCard(3)));
        assert_eq!(app.handle_key(key(KeyCode::Up)), Some(Action::ActivateCard(1)));
        assert_eq!(app.handle_key(key(KeyCode::End)), Some(Action::ActivateCard(4)));

        let mut app = app_with_cards(5, Some(0));
        assert_eq!(app.handle_key(key(KeyCode::Char('k'))), Some(Action::ActivateCard(-1)));
    }

    #[test]
    fn test_escape_deselects() {
        let mut app = app_with_cards(3, Some(1));
        assert_eq!(app.handle_key(key(KeyCode::Esc)), Some(Action::Deselect));
    }

    #[test]
    fn test_zoom_keys() {
        let mut app = App::new();
        app.handle_key(key(KeyCode::Char('+')));
        assert_eq!(app.state().viewport.zoom, 2);
        app.handle_key(key(KeyCode::Char('-')));
        assert_eq!(app.state().viewport.zoom, 1);
    }

    #[test]
    fn test_click_card() {
        let mut app = app_with_cards(5, None);
        app.state_mut().set_list_area(Rect::new(1, 1, 28, 20));
        assert_eq!(app.handle_mouse(click(3, 7)), Some(Action::ActivateCard(1)));
    }

    #[test]
    fn test_click_marker() {
        let mut app = App::new();
        app.state_mut().set_map_area(Rect::new(30, 0, 80, 40));
        app.state_mut().render_markers(&[MarkerViewModel {
            id: RecordId::new(3),
            coordinate: Coordinate::new(0.0, 0.0),
            radius: 20.0,
            color: MarkerColor::Blue,
            highlighted: false,
            label: "Site 3".to_string(),
        }]);
        assert_eq!(app.handle_mouse(click(70, 20)), Some(Action::ActivateMarker(3)));
        assert_eq!(app.handle_mouse(click(31, 1)), None);
    }
}
