//! Cursor position in file coordinates, and the viewport that follows it.

use crate::geom::{Expanse, Point};

/// Cursor location in the buffer. `row` indexes lines, `col` is a byte
/// offset within the line where `col == len` means "after the last byte".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Cursor {
    /// Zero-based line index.
    pub row: usize,
    /// Zero-based byte offset.
    pub col: usize,
}

impl Cursor {
    /// Construct a cursor.
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// The visible window onto the buffer.
///
/// The bottom terminal row holds the status line, so the text area is one
/// row shorter than the terminal. Horizontal scrolling keeps the cursor
/// within `max_col()` columns of the left edge, leaving `margin` columns of
/// lookahead on the right.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    /// First visible line.
    pub row: usize,
    /// First visible column.
    pub col: usize,
    /// Text rows on screen.
    rows: usize,
    /// Text columns on screen.
    cols: usize,
    /// Terminal height, including the status line.
    height: usize,
    /// Columns reserved to the right of the cursor.
    margin: usize,
}

impl Viewport {
    /// A viewport for a terminal of `size`, scrolled to the origin.
    pub fn new(size: Expanse, margin: usize) -> Self {
        let mut vp = Self {
            row: 0,
            col: 0,
            rows: 1,
            cols: 1,
            height: 0,
            margin,
        };
        vp.set_size(size);
        vp
    }

    /// Recompute dimensions for a new terminal size. Offsets are left for
    /// [`Viewport::reconcile`] to fix up.
    pub fn set_size(&mut self, size: Expanse) {
        self.height = size.h as usize;
        self.rows = (size.h as usize).saturating_sub(1).max(1);
        self.cols = (size.w as usize).max(1);
    }

    /// Text rows on screen.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Text columns on screen.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Maximum distance between the left edge and the cursor.
    pub fn max_col(&self) -> usize {
        self.cols.saturating_sub(self.margin)
    }

    /// The screen row of the status line, or `None` when the terminal is
    /// too short to fit one below the text area.
    pub fn status_row(&self) -> Option<usize> {
        (self.rows < self.height).then_some(self.rows)
    }

    /// Scroll the minimum amount needed to bring `cursor` into view.
    pub fn reconcile(&mut self, cursor: Cursor) {
        if cursor.row < self.row {
            self.row = cursor.row;
        } else if cursor.row >= self.row + self.rows {
            self.row = cursor.row + 1 - self.rows;
        }

        let max_col = self.max_col();
        if cursor.col < self.col {
            self.col = cursor.col;
        } else if cursor.col > self.col + max_col {
            self.col = cursor.col - max_col;
        }
    }

    /// True if the viewport invariants hold for `cursor`.
    pub fn contains(&self, cursor: Cursor) -> bool {
        self.row <= cursor.row
            && cursor.row < self.row + self.rows
            && self.col <= cursor.col
            && cursor.col <= self.col + self.max_col()
    }

    /// Screen location of `cursor`. Only meaningful once reconciled.
    pub fn screen_position(&self, cursor: Cursor) -> Point {
        let x = cursor.col.saturating_sub(self.col);
        let y = cursor.row.saturating_sub(self.row);
        Point::new(
            u32::try_from(x).unwrap_or(u32::MAX),
            u32::try_from(y).unwrap_or(u32::MAX),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_row_is_reserved() {
        let vp = Viewport::new(Expanse::new(80, 24), 10);
        assert_eq!(vp.rows(), 23);
        assert_eq!(vp.cols(), 80);
        assert_eq!(vp.max_col(), 70);
        assert_eq!(vp.status_row(), Some(23));
    }

    #[test]
    fn degenerate_sizes() {
        let vp = Viewport::new(Expanse::new(0, 0), 10);
        assert_eq!(vp.rows(), 1);
        assert_eq!(vp.cols(), 1);
        assert_eq!(vp.max_col(), 0);
        assert_eq!(vp.status_row(), None);

        let vp = Viewport::new(Expanse::new(20, 1), 10);
        assert_eq!(vp.rows(), 1);
        assert_eq!(vp.status_row(), None);

        let vp = Viewport::new(Expanse::new(20, 2), 10);
        assert_eq!(vp.status_row(), Some(1));
    }

    #[test]
    fn vertical_scroll() {
        let mut vp = Viewport::new(Expanse::new(80, 11), 10);
        vp.reconcile(Cursor::new(15, 0));
        assert_eq!(vp.row, 6);
        vp.reconcile(Cursor::new(10, 0));
        assert_eq!(vp.row, 6);
        vp.reconcile(Cursor::new(2, 0));
        assert_eq!(vp.row, 2);
    }

    #[test]
    fn horizontal_scroll() {
        let mut vp = Viewport::new(Expanse::new(20, 10), 5);
        vp.reconcile(Cursor::new(0, 15));
        assert_eq!(vp.col, 0);
        vp.reconcile(Cursor::new(0, 16));
        assert_eq!(vp.col, 1);
        vp.reconcile(Cursor::new(0, 40));
        assert_eq!(vp.col, 25);
        vp.reconcile(Cursor::new(0, 3));
        assert_eq!(vp.col, 3);
        assert_eq!(vp.screen_position(Cursor::new(0, 3)), Point::zero());
    }

    #[test]
    fn shrink_below_cursor() {
        let mut vp = Viewport::new(Expanse::new(100, 50), 10);
        let c = Cursor::new(40, 85);
        vp.reconcile(c);
        assert!(vp.contains(c));
        vp.set_size(Expanse::new(12, 3));
        vp.reconcile(c);
        assert!(vp.contains(c));
        assert_eq!(vp.screen_position(c), Point::new(2, 1));
    }
}
