use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::Frame;

use crate::app::model::Screen;
use crate::app::update::GridMove;
use crate::app::{App, Message, Model};
use crate::ui::layout::{self, Control};
use crate::viewer::{Direction, controls};

use super::event_loop::ResizeDebouncer;

impl App {
    pub(super) fn handle_event(
        &self,
        event: &Event,
        model: &Model,
        now_ms: u64,
        resize_debouncer: &mut ResizeDebouncer,
    ) -> Option<Message> {
        match event {
            Event::Key(key) => self.handle_key(*key, model),
            Event::Mouse(mouse) => self.handle_mouse(*mouse, model),
            Event::Resize(w, h) => {
                tracing::trace!(target: "folio::render", width = w, height = h, "resize queued");
                resize_debouncer.queue(*w, *h, now_ms);
                None
            }
            _ => None,
        }
    }

    pub(super) fn handle_key(&self, key: KeyEvent, model: &Model) -> Option<Message> {
        if model.help_visible {
            return Some(Message::HideHelp);
        }

        // Global keys
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return Some(Message::Quit);
            }
            KeyCode::Char('q') => return Some(Message::Quit),
            KeyCode::Char('?') | KeyCode::F(1) => return Some(Message::ToggleHelp),
            KeyCode::Char('w') => return Some(Message::ToggleWatch),
            KeyCode::Char('r' | 'R') => return Some(Message::ForceReload),
            _ => {}
        }

        match model.screen {
            Screen::Library => match key.code {
                KeyCode::Char('h') | KeyCode::Left => Some(Message::MoveSelection(GridMove::Left)),
                KeyCode::Char('l') | KeyCode::Right => {
                    Some(Message::MoveSelection(GridMove::Right))
                }
                KeyCode::Char('k') | KeyCode::Up => Some(Message::MoveSelection(GridMove::Up)),
                KeyCode::Char('j') | KeyCode::Down => Some(Message::MoveSelection(GridMove::Down)),
                KeyCode::Enter | KeyCode::Char(' ') => Some(Message::OpenSelected),
                _ => None,
            },
            Screen::Viewer => match key.code {
                KeyCode::Right | KeyCode::Char('l') | KeyCode::PageDown | KeyCode::Char(' ') => {
                    Some(Message::Navigate(Direction::Next))
                }
                KeyCode::Left | KeyCode::Char('h') | KeyCode::PageUp => {
                    Some(Message::Navigate(Direction::Prev))
                }
                KeyCode::Char('d') => Some(Message::ToggleMode),
                KeyCode::Char('m') => Some(Message::ToggleMagnifier),
                KeyCode::Esc | KeyCode::Backspace => Some(Message::BackToLibrary),
                _ => None,
            },
        }
    }

    pub(super) fn handle_mouse(&self, mouse: MouseEvent, model: &Model) -> Option<Message> {
        if model.help_visible {
            return matches!(mouse.kind, MouseEventKind::Up(MouseButton::Left))
                .then_some(Message::HideHelp);
        }
        match model.screen {
            Screen::Library => library_mouse(mouse, model),
            Screen::Viewer => viewer_mouse(mouse, model),
        }
    }

    pub(super) fn view(&self, model: &mut Model, frame: &mut Frame) {
        crate::ui::render(model, frame);
    }
}

fn library_mouse(mouse: MouseEvent, model: &Model) -> Option<Message> {
    match mouse.kind {
        MouseEventKind::Up(MouseButton::Left) => {
            let (_, grid, _) = layout::library_regions(model.area());
            layout::card_grid(grid, model.library.book_count(), model.selected_card)
                .into_iter()
                .find(|(_, rect)| layout::contains(*rect, mouse.column, mouse.row))
                .map(|(index, _)| Message::ClickCard(index))
        }
        MouseEventKind::ScrollDown => Some(Message::MoveSelection(GridMove::Down)),
        MouseEventKind::ScrollUp => Some(Message::MoveSelection(GridMove::Up)),
        _ => None,
    }
}

fn viewer_mouse(mouse: MouseEvent, model: &Model) -> Option<Message> {
    match mouse.kind {
        MouseEventKind::Up(MouseButton::Left) => {
            let regions = layout::viewer_regions(model.area());
            let state = controls(&model.viewer.state);
            match layout::control_at(regions.controls, &state, mouse.column, mouse.row)? {
                Control::Prev if state.prev_enabled => Some(Message::Navigate(Direction::Prev)),
                Control::Next if state.next_enabled => Some(Message::Navigate(Direction::Next)),
                Control::ToggleMode => Some(Message::ToggleMode),
                Control::ToggleMagnifier => Some(Message::ToggleMagnifier),
                Control::Prev | Control::Next => None,
            }
        }
        MouseEventKind::Moved | MouseEventKind::Drag(_) => {
            // Pointer events only matter while the lens is on.
            model
                .viewer
                .state
                .is_magnify_enabled()
                .then_some(Message::PointerMoved(mouse.column, mouse.row))
        }
        MouseEventKind::ScrollDown => Some(Message::Navigate(Direction::Next)),
        MouseEventKind::ScrollUp => Some(Message::Navigate(Direction::Prev)),
        _ => None,
    }
}
