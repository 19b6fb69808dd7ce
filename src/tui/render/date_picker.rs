use chrono::Datelike;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::complete::date_picker::{PICKER_SIZE, month_grid, weekday_order};
use crate::complete::position::place;
use crate::complete::{CaretCoords, TextInput};
use crate::tui::app::App;

/// Render the month calendar floating at the caret. Highlights the cursor
/// day, and marks today and the chosen date.
pub fn render_date_picker(frame: &mut Frame, app: &App, caret: CaretCoords) {
    let Some(picker) = app.session.date_picker() else {
        return;
    };
    let week_start = app.session.config().first_day_of_week;
    let bg = app.theme.background;
    let placement = place(caret, PICKER_SIZE, app.editor.viewport());
    let area = Rect::new(placement.x, placement.y, placement.width, placement.height);

    let title_style = Style::default()
        .fg(app.theme.text_bright)
        .bg(bg)
        .add_modifier(Modifier::BOLD);
    let dim = Style::default().fg(app.theme.dim).bg(bg);

    let mut lines = vec![
        Line::from(Span::styled(picker.cursor.format("%B %Y").to_string(), title_style)).centered(),
    ];

    let header: Vec<String> = weekday_order(week_start)
        .iter()
        .map(|d| d.to_string().chars().take(2).collect())
        .collect();
    lines.push(Line::from(Span::styled(header.join(" "), dim)));

    for week in month_grid(picker.cursor, week_start) {
        let mut spans = Vec::new();
        for (i, day) in week.iter().enumerate() {
            if i > 0 {
                spans.push(Span::styled(" ", Style::default().bg(bg)));
            }
            let Some(date) = day else {
                spans.push(Span::styled("  ", Style::default().bg(bg)));
                continue;
            };
            let mut style = Style::default().fg(app.theme.text).bg(bg);
            if picker.selected == Some(*date) {
                style = style.fg(app.theme.cyan);
            }
            if *date == picker.today {
                style = style.fg(app.theme.highlight).add_modifier(Modifier::UNDERLINED);
            }
            if *date == picker.cursor {
                style = style
                    .fg(app.theme.text_bright)
                    .bg(app.theme.selection_bg)
                    .add_modifier(Modifier::BOLD);
            }
            spans.push(Span::styled(format!("{:>2}", date.day()), style));
        }
        lines.push(Line::from(spans));
    }

    frame.render_widget(Clear, area);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.popup_border).bg(bg))
        .style(Style::default().bg(bg));
    let paragraph = Paragraph::new(lines).block(block).style(Style::default().bg(bg));
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    use crate::tui::input::handle_key;
    use crate::tui::render::render;
    use crate::tui::render::test_helpers::{render_to_string, test_app};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_calendar_below_caret() {
        let mut app = test_app("Call @");
        let out = render_to_string(40, 14, |frame, _| render(frame, &mut app));
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[1], "Call @");
        assert_eq!(lines[2], "      ┌─────────────────────┐");
        assert!(lines[3].contains("October 2026"), "{}", lines[3]);
        assert_eq!(lines[4], "      │Su Mo Tu We Th Fr Sa │");
        assert_eq!(lines[5], "      │             1  2  3 │");
        assert_eq!(lines[8], "      │18 19 20 21 22 23 24 │");
    }

    #[test]
    fn test_calendar_follows_cursor_month() {
        let mut app = test_app("Call @");
        for _ in 0..3 {
            handle_key(&mut app, KeyEvent::new(KeyCode::Down, KeyModifiers::NONE));
        }
        let out = render_to_string(40, 14, |frame, _| render(frame, &mut app));
        assert!(out.contains("November 2026"), "{}", out);
    }
}
