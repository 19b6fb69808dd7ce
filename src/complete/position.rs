//! Popup placement relative to the caret, in terminal cells.

/// Screen position of the caret cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaretCoords {
    pub x: u16,
    pub y: u16,
    /// Rows occupied by the caret line; popups open below this.
    pub line_height: u16,
}

impl CaretCoords {
    pub fn new(x: u16, y: u16) -> Self {
        CaretCoords {
            x,
            y,
            line_height: 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    pub width: u16,
    pub height: u16,
}

/// The visible region a popup must stay inside.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Viewport {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Viewport {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> u16 {
        self.x.saturating_add(self.width)
    }

    pub fn bottom(&self) -> u16 {
        self.y.saturating_add(self.height)
    }
}

/// Where a popup ended up, and which way it was flipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
    pub above: bool,
    pub flipped_left: bool,
}

/// Place a popup of `size` next to the caret.
///
/// The popup opens below and to the right of the caret. It flips above the
/// caret line when it would overflow the bottom, and flips to end at the
/// caret column when it would overflow the right edge. If neither side has
/// room it is clamped to the viewport. A popup larger than the viewport is
/// shrunk to fit.
pub fn place(caret: CaretCoords, size: Size, viewport: Viewport) -> Placement {
    let width = size.width.min(viewport.width);
    let height = size.height.min(viewport.height);

    let below = caret.y.saturating_add(caret.line_height.max(1));
    let (y, above) = if below.saturating_add(height) <= viewport.bottom() {
        (below, false)
    } else if caret.y >= viewport.y.saturating_add(height) {
        (caret.y - height, true)
    } else {
        (viewport.bottom().saturating_sub(height).max(viewport.y), false)
    };

    let (x, flipped_left) = if caret.x.saturating_add(width) <= viewport.right() {
        (caret.x.max(viewport.x), false)
    } else {
        let flipped = caret.x.saturating_add(1).saturating_sub(width);
        if flipped >= viewport.x {
            (flipped, true)
        } else {
            (viewport.right().saturating_sub(width).max(viewport.x), false)
        }
    };

    Placement {
        x,
        y,
        width,
        height,
        above,
        flipped_left,
    }
}
