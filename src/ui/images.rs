use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear};
use ratatui_image::protocol::StatefulProtocolType;
use ratatui_image::{Resize, StatefulImage};

use crate::app::{Model, PreparedImage};
use crate::image::rgb_to_xterm_256;

use super::layout;

/// Paint prepared page images centered in their slots.
pub fn render_pages(model: &mut Model, frame: &mut Frame, slots: &[Rect]) {
    let spread = model.spread();
    for (slot, area) in spread.slots.iter().zip(slots) {
        let Some(prepared) = model.page_images.get_mut(&slot.index) else {
            continue;
        };
        let rect = layout::centered(*area, prepared.cols, prepared.rows);
        paint(prepared, frame, rect);
    }
}

/// Paint cover images into library cards.
pub fn render_covers(model: &mut Model, frame: &mut Frame, cards: &[(String, Rect)]) {
    for (book_id, area) in cards {
        let Some(prepared) = model.cover_images.get_mut(book_id) else {
            continue;
        };
        let rect = layout::centered(*area, prepared.cols, prepared.rows);
        paint(prepared, frame, rect);
    }
}

/// Paint the magnifier lens next to the pointer.
pub fn render_lens(model: &mut Model, frame: &mut Frame, bounds: Rect) {
    let Some(lens) = model.lens else {
        return;
    };
    if !lens.frame.is_visible() {
        return;
    }
    let area = layout::lens_rect(bounds, lens.pointer.0, lens.pointer.1);
    frame.render_widget(Clear, area);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if let Some((_, prepared)) = model.lens_image.as_mut() {
        let rect = layout::centered(inner, prepared.cols, prepared.rows);
        paint(prepared, frame, rect);
    }
}

fn paint(prepared: &mut PreparedImage, frame: &mut Frame, rect: Rect) {
    let rect = rect.intersection(frame.area());
    if rect.is_empty() {
        return;
    }
    let halfblocks = matches!(
        prepared.protocol.protocol_type(),
        StatefulProtocolType::Halfblocks(_)
    );
    let resize = if halfblocks {
        // Nearest-neighbor aliases badly in half-cell mode.
        Resize::Scale(Some(image::imageops::FilterType::CatmullRom))
    } else {
        Resize::Fit(None)
    };
    frame.render_stateful_widget(
        StatefulImage::default().resize(resize),
        rect,
        &mut prepared.protocol,
    );

    // Indexed colors behave better than truecolor updates on terminals
    // without 24-bit support.
    if halfblocks && !crate::image::supports_truecolor_terminal() {
        let buf = frame.buffer_mut();
        for pos in rect.positions() {
            let cell = &mut buf[pos];
            if let Color::Rgb(r, g, b) = cell.fg {
                cell.fg = Color::Indexed(rgb_to_xterm_256(r, g, b));
            }
            if let Color::Rgb(r, g, b) = cell.bg {
                cell.bg = Color::Indexed(rgb_to_xterm_256(r, g, b));
            }
        }
    }
    tracing::trace!(
        target: "folio::render",
        x = rect.x,
        y = rect.y,
        cols = rect.width,
        rows = rect.height,
        "image painted"
    );
}
