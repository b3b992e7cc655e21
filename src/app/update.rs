use crate::app::Model;
use crate::app::model::{LibraryView, Screen, ViewerView};
use crate::library::{Library, LoadError, LoadedBook};
use crate::ui::layout;
use crate::viewer::Direction;

/// Direction of a move in the library grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridMove {
    Left,
    Right,
    Up,
    Down,
}

/// All possible events and actions in the application.
///
/// These represent user input, system events, and load completions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    // Library
    /// Library file finished loading
    LibraryLoaded(Result<Library, LoadError>),
    /// Move the card highlight
    MoveSelection(GridMove),
    /// Open the highlighted card
    OpenSelected,
    /// Highlight and open a card by index
    ClickCard(usize),
    /// Open a book by id
    OpenBook(String),

    // Viewer
    /// A book's manifest finished loading
    BookLoaded {
        book_id: String,
        result: Result<LoadedBook, LoadError>,
    },
    /// Step to the next or previous spread
    Navigate(Direction),
    /// Switch between single and double page mode
    ToggleMode,
    /// Turn the magnifier on or off
    ToggleMagnifier,
    /// Pointer moved to a terminal cell
    PointerMoved(u16, u16),
    /// Return to the library listing
    BackToLibrary,

    // Live reload
    /// Toggle manifest watching
    ToggleWatch,
    /// Watched manifest changed on disk
    ManifestChanged,
    /// Reload the current screen's data
    ForceReload,

    // Help
    ToggleHelp,
    HideHelp,

    // Window
    /// Terminal resized
    Resize(u16, u16),
    /// Redraw screen
    Redraw,
    Quit,
}

/// Pure function that updates the model based on a message.
///
/// Loading happens in the side-effect dispatcher, which reports back with
/// [`Message::LibraryLoaded`] or [`Message::BookLoaded`].
pub fn update(mut model: Model, msg: Message) -> Model {
    match msg {
        Message::LibraryLoaded(Ok(library)) => {
            let count = library.books.len();
            model.library = LibraryView::Ready(library);
            model.selected_card = model.selected_card.min(count.saturating_sub(1));
            model.cover_images.clear();
        }
        Message::LibraryLoaded(Err(_)) => {
            model.library = LibraryView::Unavailable;
            model.selected_card = 0;
            model.cover_images.clear();
        }
        Message::MoveSelection(step) => {
            let count = model.library.book_count();
            if count > 0 {
                let columns = layout::card_columns(model.terminal_size.0);
                let current = model.selected_card.min(count - 1);
                model.selected_card = match step {
                    GridMove::Left => current.saturating_sub(1),
                    GridMove::Right => (current + 1).min(count - 1),
                    GridMove::Up => current.checked_sub(columns).unwrap_or(current),
                    GridMove::Down if current + columns < count => current + columns,
                    GridMove::Down => current,
                };
            }
        }
        Message::ClickCard(index) => {
            if index < model.library.book_count() {
                model.selected_card = index;
                model = open_selected(model);
            }
        }
        Message::OpenSelected => {
            model = open_selected(model);
        }
        Message::OpenBook(book_id) => {
            model = open_book(model, book_id);
        }
        Message::BookLoaded { book_id, result } => {
            if model.viewer.book_id == book_id {
                model.clear_page_images();
                let state = std::mem::take(&mut model.viewer.state);
                model.viewer.loading = false;
                match result {
                    Ok(loaded) => {
                        model.viewer.title.clone_from(&loaded.manifest.title);
                        model.viewer.state = state.reload(loaded.manifest.pages.clone());
                        model.viewer.manifest = Some(loaded.manifest);
                        model.viewer.manifest_path = Some(loaded.manifest_path);
                        model.viewer.error = None;
                    }
                    Err(err) => {
                        model.viewer.title = err.viewer_title().to_string();
                        model.viewer.state = state.reload(Vec::new());
                        model.viewer.manifest = None;
                        model.viewer.error = Some(err);
                    }
                }
            }
        }
        Message::Navigate(direction) => {
            if model.screen == Screen::Viewer {
                let state = std::mem::take(&mut model.viewer.state);
                model.viewer.state = state.navigate(direction);
                model.lens = None;
            }
        }
        Message::ToggleMode => {
            if model.screen == Screen::Viewer {
                let state = std::mem::take(&mut model.viewer.state);
                model.viewer.state = state.toggle_mode(&model.covers);
                model.lens = None;
            }
        }
        Message::ToggleMagnifier => {
            if model.screen == Screen::Viewer {
                let state = std::mem::take(&mut model.viewer.state);
                model.viewer.state = state.toggle_magnifier();
                model.lens = None;
            }
        }
        Message::PointerMoved(col, row) => {
            model.lens = if model.screen == Screen::Viewer {
                model.lens_for_pointer(col, row)
            } else {
                None
            };
        }
        Message::BackToLibrary => {
            model.screen = Screen::Library;
            model.viewer = ViewerView::default();
            model.clear_page_images();
        }
        Message::ToggleWatch => {
            model.watch_enabled = !model.watch_enabled;
        }
        Message::ToggleHelp => {
            model.help_visible = !model.help_visible;
        }
        Message::HideHelp => {
            model.help_visible = false;
        }
        Message::Resize(width, height) => {
            model.terminal_size = (width, height);
            let constrained = model.policy.is_constrained(width);
            let state = std::mem::take(&mut model.viewer.state);
            model.viewer.state = state.set_constrained(constrained);
            model.lens = None;
        }
        // ManifestChanged/ForceReload: handled in effects
        // Redraw: no state change needed
        Message::ManifestChanged | Message::ForceReload | Message::Redraw => {}
        Message::Quit => {
            model.should_quit = true;
        }
    }

    model
}

fn open_selected(model: Model) -> Model {
    let Some(book) = model
        .library
        .library()
        .and_then(|library| library.books.get(model.selected_card))
    else {
        return model;
    };
    let book_id = book.id.clone();
    open_book(model, book_id)
}

fn open_book(mut model: Model, book_id: String) -> Model {
    let state = model.initial_viewer_state();
    model.screen = Screen::Viewer;
    model.help_visible = false;
    model.clear_page_images();
    model.viewer = ViewerView::opening(book_id, state);
    model
}
