//! Viewer state and its pure transitions.
//!
//! [`ViewerState`] is a plain value. Every transition takes it by value and
//! returns the next one, so the app layer can apply intents and tests can
//! drive the state machine without a terminal.

use super::CoverSet;

/// Navigation intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Prev,
}

/// Pages of the open book plus the mode flags that drive layout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewerState {
    pages: Vec<String>,
    current_index: usize,
    is_double_page: bool,
    is_magnify_enabled: bool,
    constrained: bool,
}

impl ViewerState {
    /// Create a state positioned on the first page, single-page mode.
    pub const fn new(pages: Vec<String>) -> Self {
        Self {
            pages,
            current_index: 0,
            is_double_page: false,
            is_magnify_enabled: false,
            constrained: false,
        }
    }

    /// Request double-page mode. Ignored while constrained.
    pub const fn with_double_page(mut self, enabled: bool) -> Self {
        self.is_double_page = enabled && !self.constrained;
        self
    }

    pub const fn with_magnifier(mut self, enabled: bool) -> Self {
        self.is_magnify_enabled = enabled;
        self
    }

    pub const fn with_constrained(mut self, constrained: bool) -> Self {
        self.constrained = constrained;
        if constrained {
            self.is_double_page = false;
        }
        self
    }

    /// Move to `index`, clamped to the page range.
    pub fn with_index(mut self, index: usize) -> Self {
        self.current_index = self.clamp_index(index);
        self
    }

    pub fn pages(&self) -> &[String] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub const fn current_index(&self) -> usize {
        self.current_index
    }

    pub const fn is_double_page(&self) -> bool {
        self.is_double_page
    }

    pub const fn is_magnify_enabled(&self) -> bool {
        self.is_magnify_enabled
    }

    pub const fn is_constrained(&self) -> bool {
        self.constrained
    }

    /// Index of the last page, or 0 for an empty book.
    pub fn last_index(&self) -> usize {
        self.pages.len().saturating_sub(1)
    }

    fn clamp_index(&self, index: usize) -> usize {
        index.min(self.last_index())
    }

    /// Replace the pages after a manifest load.
    ///
    /// The index goes back to the first page. Mode flags carry over.
    pub fn reload(mut self, pages: Vec<String>) -> Self {
        self.pages = pages;
        self.current_index = 0;
        self
    }

    /// Index that `direction` leads to from the current position.
    ///
    /// Single-page mode steps by one. Double-page mode steps by two with
    /// fixed boundary cases: leaving the first page lands on index 1 so
    /// spreads pair up after a lone front cover, and stepping back from the
    /// last page skips past a trailing odd page to `len - 3`.
    pub fn advance(&self, direction: Direction) -> usize {
        let len = self.pages.len();
        if len == 0 {
            return 0;
        }
        let i = self.current_index;
        let last = len - 1;

        if !self.is_double_page {
            return match direction {
                Direction::Next => (i + 1).min(last),
                Direction::Prev => i.saturating_sub(1),
            };
        }

        match direction {
            Direction::Next => {
                if i == 0 {
                    1.min(last)
                } else if i + 2 >= len {
                    last
                } else {
                    (i + 2).min(last)
                }
            }
            Direction::Prev => {
                if i <= 1 {
                    0
                } else if i == last {
                    len.saturating_sub(3)
                } else {
                    i - 2
                }
            }
        }
    }

    /// Apply [`advance`](Self::advance).
    pub fn navigate(mut self, direction: Direction) -> Self {
        self.current_index = self.advance(direction);
        self
    }

    /// Flip between single and double page mode.
    ///
    /// While constrained the result is always single-page mode. Entering
    /// double-page mode realigns the index so spreads start on the right
    /// page; leaving it keeps the index.
    pub fn toggle_mode(mut self, covers: &CoverSet) -> Self {
        if self.constrained {
            self.is_double_page = false;
            return self;
        }
        if self.is_double_page {
            self.is_double_page = false;
            return self;
        }

        self.is_double_page = true;
        self.current_index = self.realigned_for_double(covers);
        self
    }

    fn realigned_for_double(&self, covers: &CoverSet) -> usize {
        let len = self.pages.len();
        let i = self.current_index;
        if len == 0 {
            return 0;
        }
        let last = len - 1;
        let trailing_cover = covers.is_cover_at(&self.pages, last);

        if trailing_cover && i + 2 >= len {
            len.saturating_sub(3)
        } else if i == last {
            len.saturating_sub(2)
        } else if i % 2 == 1 {
            i - 1
        } else {
            i
        }
    }

    /// Enter or leave the narrow-viewport constraint.
    ///
    /// Entering it while in double-page mode forces single-page mode.
    pub const fn set_constrained(self, constrained: bool) -> Self {
        self.with_constrained(constrained)
    }

    /// Flip the magnifier on or off.
    pub const fn toggle_magnifier(mut self) -> Self {
        self.is_magnify_enabled = !self.is_magnify_enabled;
        self
    }
}
