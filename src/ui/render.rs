use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use unicode_width::UnicodeWidthStr;

use crate::app::{LibraryView, Model, Screen, cover_area};
use crate::library::LIBRARY_UNAVAILABLE;
use crate::viewer::controls;

use super::layout::{self, Control};
use super::{images, overlays, status};

/// Render the complete UI.
pub fn render(model: &mut Model, frame: &mut Frame) {
    let area = frame.area();

    match model.screen {
        Screen::Library => render_library(model, frame, area),
        Screen::Viewer => render_viewer(model, frame, area),
    }

    if model.help_visible {
        overlays::render_help_overlay(model, frame, area);
    }
}

fn title_bar(text: &str) -> Paragraph<'_> {
    Paragraph::new(format!(" {text}")).style(
        Style::default()
            .fg(Color::White)
            .bg(Color::Blue)
            .add_modifier(Modifier::BOLD),
    )
}

fn render_library(model: &mut Model, frame: &mut Frame, area: Rect) {
    let (header, grid, footer) = layout::library_regions(area);
    frame.render_widget(title_bar("Library"), header);

    match &model.library {
        LibraryView::Loading => {
            frame.render_widget(Paragraph::new(" Loading books\u{2026}"), grid);
        }
        LibraryView::Unavailable => {
            let message = Paragraph::new(LIBRARY_UNAVAILABLE)
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::Yellow));
            let middle = Rect::new(grid.x, grid.y + grid.height / 2, grid.width, 1);
            frame.render_widget(message, middle.intersection(grid));
        }
        LibraryView::Ready(library) => {
            let cards = layout::card_grid(grid, library.books.len(), model.selected_card);
            for (index, rect) in &cards {
                let book = &library.books[*index];
                let selected = *index == model.selected_card;
                let border = if selected {
                    Style::default().fg(Color::Yellow)
                } else {
                    Style::default().fg(Color::DarkGray)
                };
                frame.render_widget(
                    Block::default().borders(Borders::ALL).border_style(border),
                    *rect,
                );
                let cover = cover_area(*rect);
                let title_row = Rect::new(cover.x, cover.bottom(), cover.width, 1);
                let title_style = if selected {
                    Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED)
                } else {
                    Style::default().add_modifier(Modifier::BOLD)
                };
                frame.render_widget(
                    Paragraph::new(truncate(&book.title, usize::from(cover.width)))
                        .alignment(Alignment::Center)
                        .style(title_style),
                    title_row.intersection(*rect),
                );
            }
            let ids: Vec<(String, Rect)> = cards
                .iter()
                .map(|(index, rect)| (library.books[*index].id.clone(), cover_area(*rect)))
                .collect();
            images::render_covers(model, frame, &ids);
        }
    }

    status::render_library_status(model, frame, footer);
    status::render_toast_bar(model, frame, footer);
}

fn render_viewer(model: &mut Model, frame: &mut Frame, area: Rect) {
    let regions = layout::viewer_regions(area);
    let title = if model.viewer.loading && model.viewer.title.is_empty() {
        "Loading\u{2026}"
    } else {
        model.viewer.title.as_str()
    };
    frame.render_widget(title_bar(title), regions.title);

    let spread = model.spread();
    let slots = layout::page_areas(regions.pages, spread.len());
    for (slot, slot_area) in spread.slots.iter().zip(&slots) {
        if !model.page_images.contains_key(&slot.index) {
            let placeholder = Paragraph::new(format!("[{}: {}]", slot.label, slot.page))
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true })
                .style(Style::default().fg(Color::DarkGray));
            let row = Rect::new(
                slot_area.x,
                slot_area.y + slot_area.height / 2,
                slot_area.width,
                1,
            );
            frame.render_widget(placeholder, row.intersection(*slot_area));
        }
    }
    images::render_pages(model, frame, &slots);
    images::render_lens(model, frame, regions.pages);

    render_controls(model, frame, regions.controls);
    status::render_viewer_status(model, frame, regions.status);
    status::render_toast_bar(model, frame, regions.status);
}

fn render_controls(model: &Model, frame: &mut Frame, area: Rect) {
    let state = controls(&model.viewer.state);
    let enabled = Style::default().fg(Color::Black).bg(Color::Gray);
    let disabled = Style::default().fg(Color::DarkGray).bg(Color::Black);
    let active = Style::default().fg(Color::Black).bg(Color::Cyan);

    for (control, rect) in layout::control_layout(area, &state) {
        let (label, style) = match control {
            Control::Prev => (
                layout::PREV_LABEL,
                if state.prev_enabled { enabled } else { disabled },
            ),
            Control::Next => (
                layout::NEXT_LABEL,
                if state.next_enabled { enabled } else { disabled },
            ),
            Control::ToggleMode => (state.mode_label, enabled),
            Control::ToggleMagnifier => (
                state.magnifier_label,
                if model.viewer.state.is_magnify_enabled() {
                    active
                } else {
                    enabled
                },
            ),
        };
        frame.render_widget(Paragraph::new(format!(" {label} ")).style(style), rect);
    }
}

/// Cut `text` to `max` columns, marking the cut with an ellipsis.
pub(super) fn truncate(text: &str, max: usize) -> String {
    if text.width() <= max {
        return text.to_string();
    }
    let mut out = String::new();
    for ch in text.chars() {
        if out.width() + 2 > max {
            break;
        }
        out.push(ch);
    }
    out.push('\u{2026}');
    out
}
