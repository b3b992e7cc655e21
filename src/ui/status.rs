use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::app::{LibraryView, Model, ToastLevel};
use crate::viewer::indicator;

fn status_style() -> Style {
    Style::default().bg(Color::DarkGray).fg(Color::White)
}

pub fn render_library_status(model: &Model, frame: &mut Frame, area: Rect) {
    let count = match &model.library {
        LibraryView::Ready(library) => format!("{} books", library.books.len()),
        LibraryView::Loading => "loading".to_string(),
        LibraryView::Unavailable => "unavailable".to_string(),
    };
    let file = model.library_path.display();
    let status = format!(" {file}  [{count}]  Enter:open  ?:help");
    frame.render_widget(Paragraph::new(status).style(status_style()), area);
}

pub fn render_viewer_status(model: &Model, frame: &mut Frame, area: Rect) {
    let page_info = indicator(&model.viewer.state);
    let watch_indicator = if model.watch_enabled {
        " [watching]"
    } else {
        ""
    };
    let narrow_indicator = if model.viewer.state.is_constrained() {
        " [narrow]"
    } else {
        ""
    };
    let status = format!(" {page_info}{watch_indicator}{narrow_indicator}  Esc:library  ?:help");
    frame.render_widget(Paragraph::new(status).style(status_style()), area);
}

pub fn render_toast_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let Some((message, level)) = model.active_toast() else {
        return;
    };
    let (prefix, style) = match level {
        ToastLevel::Info => ("[info]", status_style()),
        ToastLevel::Warning => (
            "[warn]",
            Style::default().bg(Color::Yellow).fg(Color::Black),
        ),
        ToastLevel::Error => ("[error]", Style::default().bg(Color::Red).fg(Color::White)),
    };
    let toast = Paragraph::new(format!("{prefix} {message}")).style(style);
    frame.render_widget(toast, area);
}
