//! Pagination and layout state machine for the page viewer.
//!
//! Nothing in here touches the terminal. The app layer owns a
//! [`ViewerState`], feeds it navigation intents and asks the resolver what to
//! paint:
//! - [`state`]: page index arithmetic and the single/double mode toggle
//! - [`layout`]: which pages are visible, labels, controls and preloading
//! - [`cover`]: filename markers for pages that always render alone
//! - [`magnifier`]: pointer to lens background mapping
//! - [`responsive`]: forcing single-page mode on narrow terminals

pub mod cover;
pub mod layout;
pub mod magnifier;
pub mod responsive;
pub mod state;

pub use cover::CoverSet;
pub use layout::{Controls, PageSlot, Spread, controls, indicator, preload_indices, resolve};
pub use magnifier::{LensFrame, LensInput, MAGNIFICATION, map_lens};
pub use responsive::ResponsivePolicy;
pub use state::{Direction, ViewerState};
