//! Screen geometry shared by rendering and mouse hit-testing.
//!
//! Everything here is a pure function of the terminal area, so the input
//! layer can map a click to the same rectangles the renderer painted.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use unicode_width::UnicodeWidthStr;

use crate::viewer::Controls;

/// Card size in the library grid, borders included.
pub const CARD_WIDTH: u16 = 26;
pub const CARD_HEIGHT: u16 = 16;

/// Lens size in cells.
pub const LENS_COLS: u16 = 28;
pub const LENS_ROWS: u16 = 12;

pub const PREV_LABEL: &str = "\u{25c0} Prev";
pub const NEXT_LABEL: &str = "Next \u{25b6}";

/// Rows of the viewer screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewerRegions {
    pub title: Rect,
    pub pages: Rect,
    pub controls: Rect,
    pub status: Rect,
}

pub fn viewer_regions(area: Rect) -> ViewerRegions {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);
    ViewerRegions {
        title: rows[0],
        pages: rows[1],
        controls: rows[2],
        status: rows[3],
    }
}

/// Rows of the library screen: header, card grid, status.
pub fn library_regions(area: Rect) -> (Rect, Rect, Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);
    (rows[0], rows[1], rows[2])
}

/// Split the page area into one column per visible page.
pub fn page_areas(area: Rect, count: usize) -> Vec<Rect> {
    match count {
        0 => Vec::new(),
        1 => vec![area],
        _ => Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Ratio(1, 2), Constraint::Ratio(1, 2)])
            .split(area)
            .to_vec(),
    }
}

/// Center a `cols` x `rows` box inside `area`.
pub fn centered(area: Rect, cols: u16, rows: u16) -> Rect {
    let w = cols.min(area.width);
    let h = rows.min(area.height);
    Rect::new(
        area.x + (area.width - w) / 2,
        area.y + (area.height - h) / 2,
        w,
        h,
    )
}

pub fn card_columns(width: u16) -> usize {
    usize::from((width / CARD_WIDTH).max(1))
}

/// Cards that fit in `area`, as `(book index, rect)`.
///
/// Rows scroll so the `selected` card stays visible.
pub fn card_grid(area: Rect, count: usize, selected: usize) -> Vec<(usize, Rect)> {
    if count == 0 || area.width == 0 || area.height == 0 {
        return Vec::new();
    }
    let columns = card_columns(area.width);
    let visible_rows = usize::from((area.height / CARD_HEIGHT).max(1));
    let selected_row = selected.min(count - 1) / columns;
    let first_row = (selected_row + 1).saturating_sub(visible_rows);
    let card_w = CARD_WIDTH.min(area.width);
    let card_h = CARD_HEIGHT.min(area.height);

    (first_row * columns..count)
        .take(visible_rows * columns)
        .map(|index| {
            let rel = index - first_row * columns;
            #[allow(clippy::cast_possible_truncation)]
            // Bounded by the area dimensions above.
            let (col, row) = ((rel % columns) as u16, (rel / columns) as u16);
            (
                index,
                Rect::new(area.x + col * card_w, area.y + row * card_h, card_w, card_h),
            )
        })
        .collect()
}

/// A clickable control on the viewer's controls bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Prev,
    Next,
    ToggleMode,
    ToggleMagnifier,
}

/// Button rectangles for the controls bar, left to right.
pub fn control_layout(area: Rect, controls: &Controls) -> Vec<(Control, Rect)> {
    let buttons = [
        (Control::Prev, PREV_LABEL),
        (Control::Next, NEXT_LABEL),
        (Control::ToggleMode, controls.mode_label),
        (Control::ToggleMagnifier, controls.magnifier_label),
    ];
    let mut x = area.x.saturating_add(1);
    let right = area.x.saturating_add(area.width);
    let mut out = Vec::with_capacity(buttons.len());
    for (control, label) in buttons {
        #[allow(clippy::cast_possible_truncation)]
        let width = (label.width() + 2) as u16;
        if x.saturating_add(width) > right {
            break;
        }
        out.push((control, Rect::new(x, area.y, width, 1)));
        x = x.saturating_add(width + 1);
    }
    out
}

/// Control under a terminal cell, if any.
pub fn control_at(area: Rect, controls: &Controls, col: u16, row: u16) -> Option<Control> {
    control_layout(area, controls)
        .into_iter()
        .find(|(_, rect)| contains(*rect, col, row))
        .map(|(control, _)| control)
}

/// Where the lens is painted for a pointer at `(col, row)`.
///
/// The lens sits up and to the right of the pointer and is kept inside
/// `bounds`.
pub fn lens_rect(bounds: Rect, col: u16, row: u16) -> Rect {
    let w = LENS_COLS.min(bounds.width);
    let h = LENS_ROWS.min(bounds.height);
    let max_x = bounds.x + bounds.width - w;
    let max_y = bounds.y + bounds.height - h;
    let x = col.saturating_add(2).clamp(bounds.x, max_x);
    let y = row.saturating_sub(h + 1).clamp(bounds.y, max_y);
    Rect::new(x, y, w, h)
}

pub const fn contains(rect: Rect, col: u16, row: u16) -> bool {
    col >= rect.x
        && col < rect.x.saturating_add(rect.width)
        && row >= rect.y
        && row < rect.y.saturating_add(rect.height)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controls(double: bool) -> Controls {
        Controls {
            prev_enabled: true,
            next_enabled: true,
            mode_label: if double { "Single Page" } else { "Double Page" },
            magnifier_label: "Magnifier: off",
        }
    }

    #[test]
    fn test_viewer_regions_reserve_chrome_rows() {
        let regions = viewer_regions(Rect::new(0, 0, 80, 24));
        assert_eq!(regions.title, Rect::new(0, 0, 80, 1));
        assert_eq!(regions.pages, Rect::new(0, 1, 80, 21));
        assert_eq!(regions.controls.y, 22);
        assert_eq!(regions.status.y, 23);
    }

    #[test]
    fn test_page_areas_split_spread_in_half() {
        let areas = page_areas(Rect::new(0, 1, 80, 20), 2);
        assert_eq!(areas.len(), 2);
        assert_eq!(areas[0].width + areas[1].width, 80);
        assert_eq!(areas[1].x, areas[0].width);
        assert_eq!(page_areas(Rect::new(0, 0, 10, 10), 0), Vec::new());
    }

    #[test]
    fn test_card_grid_wraps_rows() {
        let area = Rect::new(0, 1, CARD_WIDTH * 3, CARD_HEIGHT * 2);
        let cards = card_grid(area, 5, 0);
        assert_eq!(cards.len(), 5);
        assert_eq!(cards[3].1.x, 0);
        assert_eq!(cards[3].1.y, 1 + CARD_HEIGHT);
    }

    #[test]
    fn test_card_grid_scrolls_to_selection() {
        let area = Rect::new(0, 0, CARD_WIDTH * 2, CARD_HEIGHT);
        let cards = card_grid(area, 6, 5);
        let indices: Vec<usize> = cards.iter().map(|(i, _)| *i).collect();
        assert_eq!(indices, vec![4, 5]);
    }

    #[test]
    fn test_card_columns_never_zero() {
        assert_eq!(card_columns(3), 1);
        assert_eq!(card_columns(CARD_WIDTH * 4 + 3), 4);
    }

    #[test]
    fn test_control_at_maps_clicks_to_buttons() {
        let area = Rect::new(0, 22, 80, 1);
        let layout = control_layout(area, &controls(false));
        assert_eq!(layout.len(), 4);
        let (_, next) = layout[1];
        assert_eq!(control_at(area, &controls(false), next.x, 22), Some(Control::Next));
        assert_eq!(control_at(area, &controls(false), 0, 22), None);
        assert_eq!(control_at(area, &controls(false), next.x, 21), None);
    }

    #[test]
    fn test_control_layout_drops_buttons_that_do_not_fit() {
        let layout = control_layout(Rect::new(0, 0, 20, 1), &controls(true));
        assert_eq!(layout.len(), 2);
    }

    #[test]
    fn test_lens_rect_stays_in_bounds() {
        let bounds = Rect::new(0, 1, 80, 21);
        let near_corner = lens_rect(bounds, 79, 21);
        assert!(near_corner.right() <= bounds.right());
        assert!(near_corner.y >= bounds.y);
        let top_left = lens_rect(bounds, 0, 1);
        assert_eq!((top_left.x, top_left.y), (2, 1));
    }
}
