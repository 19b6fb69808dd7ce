use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Cells a tab occupies in the editor.
pub const TAB_WIDTH: usize = 4;

/// Display width in terminal cells, with tabs at [`TAB_WIDTH`].
pub fn display_width(s: &str) -> usize {
    s.graphemes(true).map(grapheme_width).sum()
}

fn grapheme_width(g: &str) -> usize {
    if g == "\t" {
        TAB_WIDTH
    } else {
        UnicodeWidthStr::width(g)
    }
}

/// Cut `s` to at most `max_cells`, ending in `…` when anything was cut.
pub fn truncate_to_width(s: &str, max_cells: usize) -> String {
    if display_width(s) <= max_cells {
        return s.to_string();
    }
    if max_cells == 0 {
        return String::new();
    }
    let budget = max_cells - 1;
    let mut width = 0;
    let mut out = String::new();
    for g in s.graphemes(true) {
        let w = grapheme_width(g);
        if width + w > budget {
            break;
        }
        width += w;
        out.push_str(g);
    }
    out.push('\u{2026}');
    out
}

/// Byte offset of the grapheme after the one at `offset`, or None at end.
pub fn next_grapheme_boundary(s: &str, offset: usize) -> Option<usize> {
    let rest = s.get(offset..).filter(|r| !r.is_empty())?;
    let len = rest.graphemes(true).next().map_or(rest.len(), str::len);
    Some(offset + len)
}

/// Byte offset of the grapheme before `offset`, or None at start.
pub fn prev_grapheme_boundary(s: &str, offset: usize) -> Option<usize> {
    let head = s.get(..offset).filter(|h| !h.is_empty())?;
    head.grapheme_indices(true).last().map(|(i, _)| i)
}

/// Byte offset in `s` closest to display column `col`. A column inside a
/// wide grapheme snaps to its start; columns past the end give `s.len()`.
pub fn display_col_to_byte_offset(s: &str, col: usize) -> usize {
    let mut seen = 0;
    for (i, g) in s.grapheme_indices(true) {
        let w = grapheme_width(g);
        if seen + w > col {
            return i;
        }
        seen += w;
    }
    s.len()
}

/// Start of the word left of `offset`, skipping whitespace first.
pub fn word_boundary_left(s: &str, offset: usize) -> usize {
    let head = &s[..offset.min(s.len())];
    let trimmed = head.trim_end();
    match trimmed.rfind(char::is_whitespace) {
        Some(i) => i + trimmed[i..].chars().next().map_or(1, char::len_utf8),
        None => 0,
    }
}

/// Start of the next word right of `offset`, or the end of `s`.
pub fn word_boundary_right(s: &str, offset: usize) -> usize {
    let offset = offset.min(s.len());
    let rest = &s[offset..];
    let word_end = rest.find(char::is_whitespace).unwrap_or(rest.len());
    let after = &rest[word_end..];
    let gap = after.len() - after.trim_start().len();
    offset + word_end + gap
}
