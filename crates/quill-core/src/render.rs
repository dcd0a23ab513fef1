//! Draws the visible part of the buffer and the status line.

use crate::{
    backend::{RenderBackend, Style},
    editor::Editor,
    error::Result,
    geom::Point,
};

/// Glyph drawn on rows past the end of the buffer.
pub const FILLER: &[u8] = b"~";

/// The status line text: 1-based cursor position and the size of the text
/// area.
pub fn status_text(editor: &Editor) -> String {
    let c = editor.cursor();
    let vp = editor.viewport();
    format!(
        "Line: {} Col: {} [{}x{}]",
        c.row + 1,
        c.col + 1,
        vp.cols(),
        vp.rows()
    )
}

/// Convert a screen offset to a cell coordinate.
fn cell(v: usize) -> u32 {
    u32::try_from(v).unwrap_or(u32::MAX)
}

/// Render a full frame. The viewport is reconciled against the cursor
/// first, and the cursor is clamped to the buffer once the frame is drawn.
pub fn render(editor: &mut Editor, r: &mut dyn RenderBackend) -> Result<()> {
    editor.reconcile_viewport();
    r.reset()?;
    r.style(Style::Plain)?;

    let vp = *editor.viewport();
    let store = editor.store();
    let mut lines = store.nth(vp.row).map(|id| store.iter_from(id));
    for y in 0..vp.rows() {
        let loc = Point::new(0, cell(y));
        match lines.as_mut().and_then(Iterator::next) {
            Some(line) => r.text(loc, line.visible(vp.col, vp.cols()))?,
            None => r.text(loc, FILLER)?,
        }
    }

    if let Some(y) = vp.status_row() {
        let mut status = status_text(editor).into_bytes();
        status.resize(vp.cols(), b' ');
        r.style(Style::Inverted)?;
        r.text(Point::new(0, cell(y)), &status)?;
        r.style(Style::Plain)?;
    }

    r.cursor(vp.screen_position(editor.cursor()))?;
    r.flush()?;
    editor.clamp_cursor();
    Ok(())
}
