use chrono::NaiveDate;
use ratatui::Terminal;
use ratatui::backend::TestBackend;
use ratatui::layout::Rect;

use crate::complete::FixedClock;
use crate::model::{CompletionConfig, Note, NoteSet};
use crate::tui::app::App;
use crate::tui::theme::Theme;

/// Render into an in-memory buffer and return plain text (no styles).
pub fn render_to_string<F>(w: u16, h: u16, f: F) -> String
where
    F: FnOnce(&mut ratatui::Frame, Rect),
{
    let backend = TestBackend::new(w, h);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal
        .draw(|frame| {
            let area = frame.area();
            f(frame, area);
        })
        .unwrap();

    let buf = terminal.backend().buffer().clone();
    let w = buf.area.width as usize;
    let lines: Vec<String> = buf
        .content
        .chunks(w)
        .map(|row| {
            let s: String = row.iter().map(|cell| cell.symbol()).collect();
            s.trim_end().to_string()
        })
        .collect();

    // Trim trailing blank lines
    let end = lines
        .iter()
        .rposition(|l| !l.is_empty())
        .map_or(0, |i| i + 1);
    lines[..end].join("\n")
}

/// Saturday, October 18th 2026.
pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
}

/// An in-memory app editing `Today.md`, with a small vault and a fixed
/// clock.
pub fn test_app(text: &str) -> App {
    let notes = NoteSet::new(vec![
        Note {
            path: "Projects.md".into(),
            tags: vec!["project".into(), "planning".into()],
            ..Default::default()
        },
        Note {
            path: "Journal.md".into(),
            ..Default::default()
        },
    ]);
    let mut app = App::detached(
        notes,
        "Today.md",
        "",
        CompletionConfig::default(),
        Theme::default(),
    );
    app.session = app.new_session().with_clock(FixedClock(today()));
    type_text(&mut app, text);
    app
}

/// Type `text` key by key through the normal input path.
pub fn type_text(app: &mut App, text: &str) {
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    for c in text.chars() {
        let code = if c == '\n' { KeyCode::Enter } else { KeyCode::Char(c) };
        crate::tui::input::handle_key(app, KeyEvent::new(code, KeyModifiers::NONE));
    }
}
