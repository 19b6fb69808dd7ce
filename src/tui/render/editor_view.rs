use std::sync::LazyLock;

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use regex::Regex;

use crate::complete::TextInput;
use crate::tui::app::App;
use crate::tui::theme::Theme;
use crate::util::unicode::TAB_WIDTH;

/// Wikilinks and embeds (group 1), inline tags (group 2)
static MARKUP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(!?\[\[[^\[\]]*\]\])|(?:^|\s)(#[\p{L}\p{N}_/\-]+)")
        .expect("valid markup regex")
});

/// Render the visible lines of the note, unwrapped.
pub fn render_editor(frame: &mut Frame, app: &App, area: Rect) {
    let lines: Vec<Line> = app
        .editor
        .text()
        .split('\n')
        .skip(app.editor.scroll())
        .take(area.height as usize)
        .map(|line| styled_line(line, &app.theme))
        .collect();

    let paragraph = Paragraph::new(lines).style(Style::default().bg(app.theme.background));
    frame.render_widget(paragraph, area);
}

fn styled_line(line: &str, theme: &Theme) -> Line<'static> {
    let bg = theme.background;
    let plain = Style::default().fg(theme.text).bg(bg);

    if line.starts_with('#') && line.trim_start_matches('#').starts_with(' ') {
        let style = Style::default()
            .fg(theme.text_bright)
            .bg(bg)
            .add_modifier(Modifier::BOLD);
        return Line::from(Span::styled(expand_tabs(line), style));
    }

    let mut spans = Vec::new();
    let mut last = 0;
    for caps in MARKUP_RE.captures_iter(line) {
        let (m, style) = match (caps.get(1), caps.get(2)) {
            (Some(m), _) => (m, Style::default().fg(theme.purple).bg(bg)),
            (None, Some(m)) => (m, Style::default().fg(theme.cyan).bg(bg)),
            (None, None) => continue,
        };
        if m.start() > last {
            spans.push(Span::styled(expand_tabs(&line[last..m.start()]), plain));
        }
        spans.push(Span::styled(expand_tabs(m.as_str()), style));
        last = m.end();
    }
    if last < line.len() {
        spans.push(Span::styled(expand_tabs(&line[last..]), plain));
    }
    Line::from(spans)
}

/// Tabs draw as spaces so columns match the caret math.
fn expand_tabs(s: &str) -> String {
    s.replace('\t', &" ".repeat(TAB_WIDTH))
}
