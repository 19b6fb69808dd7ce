pub mod date_picker;
pub mod dropdown;
pub mod editor_view;
pub mod status_row;

#[cfg(test)]
pub mod test_helpers;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Position, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};

use crate::complete::{TextInput, Viewport};
use crate::tui::app::App;

/// Main render function: lays out the note and floats the popups over it
pub fn render(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    let bg_style = Style::default().bg(app.theme.background);
    frame.render_widget(Block::default().style(bg_style), area);

    // Layout: title (1 row) | note | status row (1 row)
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(area);

    render_title(frame, app, chunks[0]);
    app.editor.layout(viewport(chunks[1]), viewport(area));
    editor_view::render_editor(frame, app, chunks[1]);
    status_row::render_status_row(frame, app, chunks[2]);

    if let Some(caret) = app.editor.caret_coords() {
        dropdown::render_dropdown(frame, app, caret);
        date_picker::render_date_picker(frame, app, caret);
        frame.set_cursor_position(Position::new(caret.x, caret.y));
    }
}

fn render_title(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let mut spans = vec![Span::styled(
        format!(" {}", app.file),
        Style::default()
            .fg(app.theme.text_bright)
            .bg(bg)
            .add_modifier(Modifier::BOLD),
    )];
    if app.editor.is_dirty() {
        spans.push(Span::styled(" \u{25CF}", Style::default().fg(app.theme.highlight).bg(bg)));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)).style(Style::default().bg(bg)), area);
}

pub(crate) fn viewport(r: Rect) -> Viewport {
    Viewport::new(r.x, r.y, r.width, r.height)
}
