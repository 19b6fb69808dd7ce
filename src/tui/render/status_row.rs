use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::complete::Strategy;
use crate::tui::app::App;
use crate::util::unicode::display_width;

/// Render the status row (bottom of screen): a message or key hints on the
/// left, the caret position on the right.
pub fn render_status_row(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let width = area.width as usize;

    let (left, color) = match &app.status {
        Some(msg) => (msg.clone(), app.theme.text_bright),
        None => (hint(app.session.active_strategy()).to_string(), app.theme.dim),
    };
    let (line, col) = app.editor.caret_line_col();
    let position = format!("Ln {}, Col {} ", line + 1, col + 1);

    let mut spans = vec![Span::styled(format!(" {}", left), Style::default().fg(color).bg(bg))];
    let used = display_width(&left) + 1;
    if used + position.len() < width {
        spans.push(Span::styled(
            " ".repeat(width - used - position.len()),
            Style::default().bg(bg),
        ));
        spans.push(Span::styled(position, Style::default().fg(app.theme.dim).bg(bg)));
    }

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(bg));
    frame.render_widget(paragraph, area);
}

fn hint(strategy: Option<Strategy>) -> &'static str {
    match strategy {
        Some(Strategy::Date) => "\u{2190}\u{2191}\u{2192}\u{2193} pick  Enter insert  Esc close",
        Some(s) if s.is_link() => "\u{2191}\u{2193} select  Tab accept  # heading  ^ block",
        Some(_) => "\u{2191}\u{2193} select  Tab accept  Esc close",
        None => "Ctrl-S save  Ctrl-Q quit",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::render::test_helpers::{render_to_string, test_app};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_idle_hint_and_position() {
        let app = test_app("ab\ncd");
        let out = render_to_string(40, 1, |frame, area| render_status_row(frame, &app, area));
        assert_eq!(out, " Ctrl-S save  Ctrl-Q quit   Ln 2, Col 3");
    }

    #[test]
    fn test_hint_tracks_strategy() {
        let app = test_app("see [[Jou");
        let out = render_to_string(60, 1, |frame, area| render_status_row(frame, &app, area));
        assert!(out.starts_with(" \u{2191}\u{2193} select  Tab accept  # heading"), "{}", out);
    }

    #[test]
    fn test_status_message_wins() {
        let mut app = test_app("");
        app.status = Some("saved Today.md".into());
        let out = render_to_string(40, 1, |frame, area| render_status_row(frame, &app, area));
        assert!(out.starts_with(" saved Today.md"));
    }
}
