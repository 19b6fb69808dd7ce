use std::ops::Range;

use crate::complete::{CaretCoords, TextInput, Viewport};
use crate::util::unicode::{
    display_col_to_byte_offset, display_width, next_grapheme_boundary, prev_grapheme_boundary,
    word_boundary_left, word_boundary_right,
};

/// The note being edited: one string, a byte caret, and the screen area
/// it was last drawn into.
#[derive(Debug, Clone, Default)]
pub struct EditorBuffer {
    text: String,
    caret: usize,
    /// First visible line
    scroll: usize,
    /// Text area from the last layout
    area: Viewport,
    /// Whole terminal from the last layout; popups stay inside it
    screen: Viewport,
    /// Display column kept across vertical moves
    sticky_col: Option<usize>,
    dirty: bool,
}

impl EditorBuffer {
    pub fn new(text: &str) -> Self {
        EditorBuffer {
            text: text.to_string(),
            ..Default::default()
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_saved(&mut self) {
        self.dirty = false;
    }

    pub fn scroll(&self) -> usize {
        self.scroll
    }

    /// Zero-based line and display column of the caret.
    pub fn caret_line_col(&self) -> (usize, usize) {
        let head = &self.text[..self.caret];
        let line = head.matches('\n').count();
        let start = line_start(&self.text, self.caret);
        (line, display_width(&self.text[start..self.caret]))
    }

    /// Record where the text was drawn and scroll the caret into view.
    pub fn layout(&mut self, area: Viewport, screen: Viewport) {
        self.area = area;
        self.screen = screen;
        let (line, _) = self.caret_line_col();
        let height = usize::from(area.height.max(1));
        if line < self.scroll {
            self.scroll = line;
        } else if line >= self.scroll + height {
            self.scroll = line + 1 - height;
        }
    }

    pub fn insert_str(&mut self, s: &str) {
        self.text.insert_str(self.caret, s);
        self.caret += s.len();
        self.edited();
    }

    pub fn backspace(&mut self) {
        if let Some(prev) = prev_grapheme_boundary(&self.text, self.caret) {
            self.text.replace_range(prev..self.caret, "");
            self.caret = prev;
            self.edited();
        }
    }

    pub fn delete_forward(&mut self) {
        if let Some(next) = next_grapheme_boundary(&self.text, self.caret) {
            self.text.replace_range(self.caret..next, "");
            self.edited();
        }
    }

    pub fn delete_word_back(&mut self) {
        let start = word_boundary_left(&self.text, self.caret);
        if start < self.caret {
            self.text.replace_range(start..self.caret, "");
            self.caret = start;
            self.edited();
        }
    }

    pub fn move_left(&mut self) {
        if let Some(prev) = prev_grapheme_boundary(&self.text, self.caret) {
            self.caret = prev;
        }
        self.sticky_col = None;
    }

    pub fn move_right(&mut self) {
        if let Some(next) = next_grapheme_boundary(&self.text, self.caret) {
            self.caret = next;
        }
        self.sticky_col = None;
    }

    pub fn move_word_left(&mut self) {
        self.caret = word_boundary_left(&self.text, self.caret);
        self.sticky_col = None;
    }

    pub fn move_word_right(&mut self) {
        self.caret = word_boundary_right(&self.text, self.caret);
        self.sticky_col = None;
    }

    pub fn move_home(&mut self) {
        self.caret = line_start(&self.text, self.caret);
        self.sticky_col = None;
    }

    pub fn move_end(&mut self) {
        self.caret = line_end(&self.text, self.caret);
        self.sticky_col = None;
    }

    pub fn move_up(&mut self) {
        let start = line_start(&self.text, self.caret);
        if start == 0 {
            return;
        }
        let col = self.goal_col();
        let prev_start = line_start(&self.text, start - 1);
        self.caret =
            prev_start + display_col_to_byte_offset(&self.text[prev_start..start - 1], col);
    }

    pub fn move_down(&mut self) {
        let end = line_end(&self.text, self.caret);
        if end == self.text.len() {
            return;
        }
        let col = self.goal_col();
        let next_start = end + 1;
        let next_end = line_end(&self.text, next_start);
        self.caret =
            next_start + display_col_to_byte_offset(&self.text[next_start..next_end], col);
    }

    fn goal_col(&mut self) -> usize {
        let col = self.sticky_col.unwrap_or_else(|| self.caret_line_col().1);
        self.sticky_col = Some(col);
        col
    }

    fn edited(&mut self) {
        self.dirty = true;
        self.sticky_col = None;
    }
}

fn line_start(text: &str, offset: usize) -> usize {
    text[..offset].rfind('\n').map_or(0, |i| i + 1)
}

fn line_end(text: &str, offset: usize) -> usize {
    text[offset..].find('\n').map_or(text.len(), |i| offset + i)
}

fn floor_boundary(text: &str, offset: usize) -> usize {
    let mut offset = offset.min(text.len());
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

impl TextInput for EditorBuffer {
    fn text(&self) -> &str {
        &self.text
    }

    fn caret(&self) -> usize {
        self.caret
    }

    fn set_caret(&mut self, offset: usize) {
        self.caret = floor_boundary(&self.text, offset);
        self.sticky_col = None;
    }

    fn replace_range(&mut self, range: Range<usize>, replacement: &str) {
        let end = floor_boundary(&self.text, range.end);
        let start = floor_boundary(&self.text, range.start.min(end));
        self.text.replace_range(start..end, replacement);
        self.caret = floor_boundary(&self.text, self.caret);
        self.edited();
    }

    /// Screen cell of the caret, or None when its line is scrolled away.
    fn caret_coords(&self) -> Option<CaretCoords> {
        let (line, col) = self.caret_line_col();
        let height = usize::from(self.area.height);
        if line < self.scroll || line >= self.scroll + height {
            return None;
        }
        let max_x = self.area.right().saturating_sub(1);
        let x = (usize::from(self.area.x) + col).min(usize::from(max_x)) as u16;
        let y = self.area.y + (line - self.scroll) as u16;
        Some(CaretCoords::new(x, y))
    }

    fn viewport(&self) -> Viewport {
        self.screen
    }
}
