use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::complete::position::place;
use crate::complete::{CaretCoords, Entity, Size, TextInput};
use crate::tui::app::App;
use crate::util::unicode::{display_width, truncate_to_width};

/// Maximum number of visible entries in the dropdown
const MAX_VISIBLE: usize = 8;
/// Widest label column before truncation
const MAX_LABEL_WIDTH: usize = 48;

/// Render the candidate dropdown floating at the caret
pub fn render_dropdown(frame: &mut Frame, app: &App, caret: CaretCoords) {
    let state = app.session.dropdown();
    if !state.visible || state.items.is_empty() {
        return;
    }
    let Some(trigger) = state.trigger.as_ref() else {
        return;
    };

    let bg = app.theme.background;
    let count = state.items.len().min(MAX_VISIBLE);
    let label_w = state
        .items
        .iter()
        .map(|c| display_width(&c.label))
        .max()
        .unwrap_or(10)
        .min(MAX_LABEL_WIDTH);

    // prefix (3) + label + pad (1) + borders (2)
    let size = Size {
        width: (label_w + 6).max(16) as u16,
        height: count as u16 + 2,
    };
    let placement = place(caret, size, app.editor.viewport());
    let inner_w = (placement.width as usize).saturating_sub(5);

    // Scroll window around selected item
    let scroll_start = if state.active >= MAX_VISIBLE {
        state.active - MAX_VISIBLE + 1
    } else {
        0
    };

    let mut lines: Vec<Line> = Vec::new();
    for (i, item) in state.items.iter().skip(scroll_start).take(MAX_VISIBLE).enumerate() {
        let is_selected = scroll_start + i == state.active;
        let missing = matches!(&item.entity, Entity::File { target } if !target.exists);

        let style = if is_selected {
            Style::default()
                .fg(app.theme.text_bright)
                .bg(app.theme.selection_bg)
                .add_modifier(Modifier::BOLD)
        } else if missing {
            Style::default().fg(app.theme.dim).bg(bg)
        } else {
            Style::default().fg(app.theme.text).bg(bg)
        };

        let prefix = if is_selected { " \u{25B8} " } else { "   " };
        let label = truncate_to_width(&item.label, inner_w);
        let pad = inner_w.saturating_sub(display_width(&label));
        lines.push(Line::from(vec![
            Span::styled(prefix, style),
            Span::styled(format!("{}{}", label, " ".repeat(pad)), style),
        ]));
    }

    let area = Rect::new(placement.x, placement.y, placement.width, placement.height);
    frame.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(
            format!(" {} ", trigger.strategy.name()),
            Style::default().fg(app.theme.dim).bg(bg),
        ))
        .border_style(Style::default().fg(app.theme.popup_border).bg(bg))
        .style(Style::default().bg(bg));

    let paragraph = Paragraph::new(lines).block(block).style(Style::default().bg(bg));
    frame.render_widget(paragraph, area);
}
