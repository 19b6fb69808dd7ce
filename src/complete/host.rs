//! Seams to the host editor: the text surface, the metadata index and the clock.

use std::ops::Range;

use chrono::NaiveDate;

use super::position::{CaretCoords, Viewport};
use crate::model::{BlockRef, HeadingRef, LinkTarget};

/// The editable text surface a session is attached to.
///
/// Offsets are byte offsets into [`text`](TextInput::text) and always sit on
/// char boundaries.
pub trait TextInput {
    fn text(&self) -> &str;
    fn caret(&self) -> usize;
    fn set_caret(&mut self, offset: usize);
    /// Replace `range` with `replacement`. Does not move the caret.
    fn replace_range(&mut self, range: Range<usize>, replacement: &str);
    /// Screen position of the caret, if the surface is on screen.
    fn caret_coords(&self) -> Option<CaretCoords>;
    fn viewport(&self) -> Viewport;

    /// True while an input method is composing text.
    fn is_composing(&self) -> bool {
        false
    }

    fn text_before_caret(&self) -> &str {
        let text = self.text();
        text.get(..self.caret()).unwrap_or(text)
    }

    fn text_after_caret(&self) -> &str {
        let text = self.text();
        text.get(self.caret()..).unwrap_or("")
    }
}

/// Read-only metadata the host keeps about the notes.
pub trait MetadataSource {
    fn tags(&self) -> Vec<String>;
    fn link_targets(&self) -> Vec<LinkTarget>;
    fn headings(&self, path: &str) -> Vec<HeadingRef>;
    fn blocks(&self, path: &str) -> Vec<BlockRef>;
}

pub trait Clock {
    fn today(&self) -> NaiveDate;
}

/// Local wall-clock date.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        chrono::Local::now().date_naive()
    }
}

/// A clock pinned to one date.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// An off-screen single-buffer input, used by the CLI and in tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlainInput {
    text: String,
    caret: usize,
    pub composing: bool,
}

impl PlainInput {
    /// Input holding `text` with the caret at the end.
    pub fn new(text: &str) -> Self {
        PlainInput {
            text: text.to_string(),
            caret: text.len(),
            composing: false,
        }
    }

    /// Input holding `before` + `after` with the caret between them.
    pub fn with_caret(before: &str, after: &str) -> Self {
        PlainInput {
            text: format!("{}{}", before, after),
            caret: before.len(),
            composing: false,
        }
    }

    /// Insert `s` at the caret and move the caret past it.
    pub fn type_str(&mut self, s: &str) {
        self.text.insert_str(self.caret, s);
        self.caret += s.len();
    }
}

impl TextInput for PlainInput {
    fn text(&self) -> &str {
        &self.text
    }

    fn caret(&self) -> usize {
        self.caret
    }

    fn set_caret(&mut self, offset: usize) {
        let mut offset = offset.min(self.text.len());
        while !self.text.is_char_boundary(offset) {
            offset -= 1;
        }
        self.caret = offset;
    }

    fn replace_range(&mut self, range: Range<usize>, replacement: &str) {
        let end = range.end.min(self.text.len());
        let start = range.start.min(end);
        self.text.replace_range(start..end, replacement);
        if self.caret > self.text.len() {
            self.caret = self.text.len();
        }
    }

    fn caret_coords(&self) -> Option<CaretCoords> {
        None
    }

    fn viewport(&self) -> Viewport {
        Viewport::default()
    }

    fn is_composing(&self) -> bool {
        self.composing
    }
}
