//! Application state and main event loop.
//!
//! This module implements The Elm Architecture (TEA):
//! - [`Model`]: The complete application state
//! - [`Message`]: All possible events and actions
//! - [`update`]: Pure function for state transitions
//! - [`App::run`]: Main event loop with rendering

mod effects;
mod event_loop;
mod input;
mod model;
mod update;

pub use model::{
    ActiveLens, LibraryView, Model, PageBox, PreparedImage, Screen, ToastLevel, ViewerView,
    cover_area,
};
pub use update::{GridMove, Message, update};

use std::path::PathBuf;

use crate::viewer::{CoverSet, ResponsivePolicy};

/// Main application struct that owns the terminal and runs the event loop.
pub struct App {
    library_path: PathBuf,
    initial_book: Option<String>,
    covers: CoverSet,
    policy: ResponsivePolicy,
    double_page: bool,
    magnify: bool,
    watch_enabled: bool,
    images_enabled: bool,
    force_half_cell: bool,
    config_global_path: Option<PathBuf>,
    config_local_path: Option<PathBuf>,
}

impl App {
    /// Create a new application for the given library file.
    pub fn new(library_path: PathBuf) -> Self {
        Self {
            library_path,
            initial_book: None,
            covers: CoverSet::default(),
            policy: ResponsivePolicy::default(),
            double_page: false,
            magnify: false,
            watch_enabled: false,
            images_enabled: true,
            force_half_cell: false,
            config_global_path: None,
            config_local_path: None,
        }
    }

    /// Open this book straight away instead of starting on the library.
    #[must_use]
    pub fn with_initial_book(mut self, book_id: Option<String>) -> Self {
        self.initial_book = book_id;
        self
    }

    /// Replace the cover markers.
    #[must_use]
    pub fn with_covers(mut self, covers: CoverSet) -> Self {
        self.covers = covers;
        self
    }

    #[must_use]
    pub const fn with_policy(mut self, policy: ResponsivePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Start books in double-page mode when the terminal is wide enough.
    #[must_use]
    pub const fn with_double_page(mut self, enabled: bool) -> Self {
        self.double_page = enabled;
        self
    }

    #[must_use]
    pub const fn with_magnifier(mut self, enabled: bool) -> Self {
        self.magnify = enabled;
        self
    }

    /// Enable or disable manifest watching.
    #[must_use]
    pub const fn with_watch(mut self, enabled: bool) -> Self {
        self.watch_enabled = enabled;
        self
    }

    /// Enable or disable page and cover images.
    #[must_use]
    pub const fn with_images_enabled(mut self, enabled: bool) -> Self {
        self.images_enabled = enabled;
        self
    }

    /// Skip graphics protocol detection and draw with half blocks.
    #[must_use]
    pub const fn with_force_half_cell(mut self, enabled: bool) -> Self {
        self.force_half_cell = enabled;
        self
    }

    /// Set config paths to show in help.
    #[must_use]
    pub fn with_config_paths(
        mut self,
        global_path: Option<PathBuf>,
        local_path: Option<PathBuf>,
    ) -> Self {
        self.config_global_path = global_path;
        self.config_local_path = local_path;
        self
    }

    /// Model for a terminal of `size`, before anything is loaded.
    pub fn initial_model(&self, size: (u16, u16)) -> Model {
        let mut model = Model::new(self.library_path.clone(), size);
        model.covers = self.covers.clone();
        model.policy = self.policy;
        model.start_double = self.double_page;
        model.start_magnify = self.magnify;
        model.watch_enabled = self.watch_enabled;
        model.images_enabled = self.images_enabled;
        model
            .config_global_path
            .clone_from(&self.config_global_path);
        model.config_local_path.clone_from(&self.config_local_path);
        update(model, Message::Resize(size.0, size.1))
    }
}
