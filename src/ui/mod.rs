//! Terminal UI components.
//!
//! This module contains all UI-related code including:
//! - [`layout`]: Screen geometry shared with mouse hit-testing
//! - library card grid and viewer screens
//! - page, cover and lens image painting
//! - status bar, toasts and the help overlay

pub mod layout;

mod images;
mod overlays;
mod render;
mod status;

pub use render::render;

#[cfg(test)]
mod tests;
