use crate::app::model::Screen;
use crate::app::{App, Message, Model, ToastLevel};
use crate::library;
use crate::watcher::{DEFAULT_DEBOUNCE, ManifestWatcher};

impl App {
    /// Run I/O for `msg` after [`update`](crate::app::update) applied it.
    ///
    /// Loads finish synchronously; their outcome comes back as a follow-up
    /// message for the event loop to apply.
    pub(super) fn handle_message_side_effects(
        &self,
        model: &mut Model,
        watcher: &mut Option<ManifestWatcher>,
        msg: &Message,
    ) -> Option<Message> {
        match msg {
            Message::OpenSelected | Message::ClickCard(_) | Message::OpenBook(_)
                if model.screen == Screen::Viewer && model.viewer.loading =>
            {
                *watcher = None;
                Some(load_book_message(model))
            }
            Message::BookLoaded { .. } => {
                if let Some(err) = model.viewer.error.clone() {
                    tracing::warn!(book = %model.viewer.book_id, "book failed to load: {err}");
                    model.show_toast(ToastLevel::Error, err.to_string());
                }
                if model.watch_enabled {
                    rewatch(model, watcher);
                }
                None
            }
            Message::ManifestChanged | Message::ForceReload if model.screen == Screen::Viewer => {
                if matches!(msg, Message::ForceReload) {
                    model.show_toast(ToastLevel::Info, "Reloaded");
                }
                model.loader.clear_cache();
                model.viewer.loading = true;
                Some(load_book_message(model))
            }
            Message::ForceReload => {
                model.show_toast(ToastLevel::Info, "Reloaded");
                model.loader.clear_cache();
                Some(load_library_message(model))
            }
            Message::ToggleWatch => {
                if model.watch_enabled {
                    if model.viewer.manifest_path.is_some() {
                        rewatch(model, watcher);
                        if watcher.is_some() {
                            model.show_toast(ToastLevel::Info, "Watching manifest changes");
                        }
                    } else {
                        model.show_toast(ToastLevel::Info, "Watch starts when a book opens");
                    }
                } else {
                    *watcher = None;
                    model.show_toast(ToastLevel::Info, "Watch disabled");
                }
                None
            }
            Message::BackToLibrary => {
                *watcher = None;
                None
            }
            _ => None,
        }
    }
}

pub(super) fn load_library_message(model: &Model) -> Message {
    let result = library::load_library(&model.library_path);
    if let Err(err) = &result {
        tracing::warn!(path = %model.library_path.display(), "library unavailable: {err}");
    }
    Message::LibraryLoaded(result)
}

pub(super) fn load_book_message(model: &Model) -> Message {
    let book_id = model.viewer.book_id.clone();
    let result = library::load_book(&model.library_path, &book_id);
    Message::BookLoaded { book_id, result }
}

fn rewatch(model: &mut Model, watcher: &mut Option<ManifestWatcher>) {
    let Some(path) = model.viewer.manifest_path.clone() else {
        *watcher = None;
        return;
    };
    let canonical = path.canonicalize().unwrap_or_else(|_| path.clone());
    if watcher
        .as_ref()
        .is_some_and(|w| w.manifest_path() == canonical.as_path())
    {
        return;
    }
    match ManifestWatcher::new(&path, DEFAULT_DEBOUNCE) {
        Ok(w) => *watcher = Some(w),
        Err(err) => {
            model.watch_enabled = false;
            *watcher = None;
            model.show_toast(ToastLevel::Warning, format!("Watch unavailable: {err}"));
            tracing::warn!(path = %path.display(), "manifest watch failed: {err}");
        }
    }
}
