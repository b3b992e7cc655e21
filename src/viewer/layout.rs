//! Layout resolution: what a render shows for a given [`ViewerState`].

use super::{CoverSet, ViewerState};

/// One visible page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSlot {
    /// Index into the page list.
    pub index: usize,
    /// Page reference from the manifest.
    pub page: String,
    /// Display label, 1-based.
    pub label: String,
}

/// The pages shown together in one render, left to right.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Spread {
    pub slots: Vec<PageSlot>,
}

impl Spread {
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn indices(&self) -> Vec<usize> {
        self.slots.iter().map(|slot| slot.index).collect()
    }
}

/// Enablement and labels for the viewer controls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Controls {
    pub prev_enabled: bool,
    pub next_enabled: bool,
    /// Label of the mode toggle, naming the mode it switches to.
    pub mode_label: &'static str,
    pub magnifier_label: &'static str,
}

fn slot(pages: &[String], index: usize) -> Option<PageSlot> {
    pages.get(index).map(|page| PageSlot {
        index,
        page: page.clone(),
        label: format!("Page {}", index + 1),
    })
}

/// Resolve the pages to display.
///
/// One page in single-page mode or when the current page is a cover.
/// Otherwise the current page and the following one, unless that one is
/// missing or is itself a cover.
pub fn resolve(state: &ViewerState, covers: &CoverSet) -> Spread {
    let pages = state.pages();
    let index = state.current_index();
    let Some(first) = slot(pages, index) else {
        return Spread::default();
    };

    let mut slots = vec![first];
    if state.is_double_page() && !covers.is_cover_at(pages, index) {
        let next = index + 1;
        if !covers.is_cover_at(pages, next)
            && let Some(second) = slot(pages, next)
        {
            slots.push(second);
        }
    }
    Spread { slots }
}

/// Page indicator text, empty when the book has no pages.
///
/// Double-page mode always reports a two-page range (clamped to the page
/// count), even when a cover is shown alone.
pub fn indicator(state: &ViewerState) -> String {
    let total = state.page_count();
    if total == 0 {
        return String::new();
    }
    let left = state.current_index() + 1;
    if state.is_double_page() {
        let right = (state.current_index() + 2).min(total);
        format!("Pages {left}\u{2013}{right} of {total}")
    } else {
        format!("Page {left} of {total}")
    }
}

/// Control state for the current position.
///
/// `next` is disabled only on the last page in both modes.
pub fn controls(state: &ViewerState) -> Controls {
    let index = state.current_index();
    Controls {
        prev_enabled: index > 0,
        next_enabled: index + 1 < state.page_count(),
        mode_label: if state.is_double_page() {
            "Single Page"
        } else {
            "Double Page"
        },
        magnifier_label: if state.is_magnify_enabled() {
            "Magnifier: on"
        } else {
            "Magnifier: off"
        },
    }
}

/// Indices worth warming in the image cache after a render.
pub fn preload_indices(state: &ViewerState) -> Vec<usize> {
    let len = state.page_count();
    if len == 0 {
        return Vec::new();
    }
    let index = state.current_index();
    let offsets: &[isize] = if state.is_double_page() {
        &[-2, -1, 2, 3]
    } else {
        &[-1, 1]
    };
    offsets
        .iter()
        .filter_map(|offset| index.checked_add_signed(*offset))
        .filter(|candidate| *candidate < len)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pages(n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("pages/{i:03}.jpg")).collect()
    }

    #[test]
    fn test_single_mode_shows_one_page() {
        let state = ViewerState::new(pages(4)).with_index(2);
        let spread = resolve(&state, &CoverSet::empty());
        assert_eq!(spread.indices(), vec![2]);
        assert_eq!(spread.slots[0].label, "Page 3");
        assert_eq!(spread.slots[0].page, "pages/003.jpg");
    }

    #[test]
    fn test_double_mode_shows_pair() {
        let state = ViewerState::new(pages(4))
            .with_double_page(true)
            .with_index(1);
        let spread = resolve(&state, &CoverSet::empty());
        assert_eq!(spread.indices(), vec![1, 2]);
        assert_eq!(spread.slots[1].label, "Page 3");
    }

    #[test]
    fn test_double_mode_on_last_page_shows_one() {
        let state = ViewerState::new(pages(4))
            .with_double_page(true)
            .with_index(3);
        assert_eq!(resolve(&state, &CoverSet::empty()).len(), 1);
    }

    #[test]
    fn test_cover_at_current_index_renders_alone() {
        let mut book = pages(4);
        book[0] = "pages/cover.jpg".to_string();
        let state = ViewerState::new(book).with_double_page(true);
        let spread = resolve(&state, &CoverSet::default());
        assert_eq!(spread.indices(), vec![0]);
    }

    #[test]
    fn test_trailing_cover_is_not_paired() {
        let book: Vec<String> = (1..=5).map(|i| format!("{i}.jpg")).collect();
        let covers = CoverSet::new(["5.jpg"]);
        let state = ViewerState::new(book)
            .with_double_page(true)
            .with_index(3);
        let spread = resolve(&state, &covers);
        assert_eq!(spread.indices(), vec![3]);
        assert_eq!(spread.slots[0].label, "Page 4");
    }

    #[test]
    fn test_empty_book_resolves_to_empty_spread() {
        let state = ViewerState::new(Vec::new()).with_double_page(true);
        assert!(resolve(&state, &CoverSet::default()).is_empty());
    }

    #[test]
    fn test_indicator_single_and_double() {
        let state = ViewerState::new(pages(5)).with_index(2);
        assert_eq!(indicator(&state), "Page 3 of 5");

        let state = state.with_double_page(true);
        assert_eq!(indicator(&state), "Pages 3\u{2013}4 of 5");

        let state = state.with_index(4);
        assert_eq!(indicator(&state), "Pages 5\u{2013}5 of 5");
    }

    #[test]
    fn test_indicator_empty_without_pages() {
        assert_eq!(indicator(&ViewerState::new(Vec::new())), "");
    }

    #[test]
    fn test_controls_disable_at_bounds() {
        let state = ViewerState::new(pages(3));
        let c = controls(&state);
        assert!(!c.prev_enabled);
        assert!(c.next_enabled);

        let c = controls(&state.with_index(2));
        assert!(c.prev_enabled);
        assert!(!c.next_enabled);
    }

    #[test]
    fn test_double_mode_next_stays_enabled_on_second_to_last() {
        let state = ViewerState::new(pages(6))
            .with_double_page(true)
            .with_index(4);
        assert!(controls(&state).next_enabled);
    }

    #[test]
    fn test_controls_on_empty_book_disable_both() {
        let c = controls(&ViewerState::new(Vec::new()));
        assert!(!c.prev_enabled);
        assert!(!c.next_enabled);
    }

    #[test]
    fn test_mode_label_names_target_mode() {
        let state = ViewerState::new(pages(3));
        assert_eq!(controls(&state).mode_label, "Double Page");
        assert_eq!(
            controls(&state.with_double_page(true)).mode_label,
            "Single Page"
        );
    }

    #[test]
    fn test_preload_single_mode_neighbours() {
        let state = ViewerState::new(pages(5)).with_index(2);
        assert_eq!(preload_indices(&state), vec![1, 3]);
        assert_eq!(preload_indices(&state.with_index(0)), vec![1]);
    }

    #[test]
    fn test_preload_double_mode_skips_out_of_range() {
        let state = ViewerState::new(pages(6))
            .with_double_page(true)
            .with_index(1);
        assert_eq!(preload_indices(&state), vec![0, 3, 4]);

        let state = state.with_index(4);
        assert_eq!(preload_indices(&state), vec![2, 3]);
    }
}
