// Only allow lints that are either transitive-dependency noise or
// genuinely opinionated style choices that don't indicate real issues.
#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. viewer::ViewerState)
    clippy::module_name_repetitions
)]

//! # Folio
//!
//! A terminal viewer for image books.
//!
//! Folio reads a library file listing books, each backed by a manifest of
//! page images, and shows them with:
//! - A card grid of books with cover thumbnails
//! - Single-page and double-page spreads, with covers shown alone
//! - Forced single-page mode on narrow terminals
//! - A magnifier lens that follows the mouse
//! - Image support (Kitty, Sixel, iTerm2, half-block fallback)
//! - Manifest watching for live reload
//!
//! ## Architecture
//!
//! Folio uses The Elm Architecture (TEA) pattern:
//! - **Model**: Application state
//! - **Message**: Events and actions
//! - **Update**: Pure state transitions
//! - **View**: Render to terminal
//!
//! ## Modules
//!
//! - [`app`]: Main application loop and state
//! - [`viewer`]: Page navigation, spread layout and lens geometry
//! - [`library`]: Library and manifest loading
//! - [`ui`]: Terminal UI components
//! - [`image`]: Image loading and rendering
//! - [`watcher`]: Manifest watching
//! - [`config`]: Saved flag defaults
//! - [`logging`]: Tracing setup and timing scopes

pub mod app;
pub mod config;
pub mod image;
pub mod library;
pub mod logging;
pub mod ui;
pub mod viewer;
pub mod watcher;
