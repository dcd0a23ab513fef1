//! The editing session: a line store, the cursor within it, and the
//! viewport onto it.

use std::{
    fs::{self, File},
    io::{BufWriter, ErrorKind, Write},
    path::{Path, PathBuf},
};

use crate::{
    cursor::{Cursor, Viewport},
    error::{Error, Result},
    geom::Expanse,
    key::Key,
    line::{Line, LineId, LineStore, Unlinked},
};

/// Default number of columns kept free to the right of the cursor.
pub const DEFAULT_SCROLL_MARGIN: usize = 10;

/// Editor configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorConfig {
    /// Columns of lookahead kept to the right of the cursor when scrolling
    /// horizontally.
    pub scroll_margin: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            scroll_margin: DEFAULT_SCROLL_MARGIN,
        }
    }
}

impl EditorConfig {
    /// Set the horizontal scroll margin.
    pub fn with_scroll_margin(mut self, margin: usize) -> Self {
        self.scroll_margin = margin;
        self
    }
}

/// Result of dispatching a key to the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The key changed the buffer, the cursor, or the file on disk.
    Handled,
    /// The key has no binding, or had nothing to act on.
    Ignored,
    /// The user asked to quit.
    Quit,
}

/// A single open file and all the state needed to edit it.
#[derive(Debug, Clone)]
pub struct Editor {
    /// Buffer contents.
    store: LineStore,
    /// The line at `cursor.row`.
    current: LineId,
    /// Cursor position.
    cursor: Cursor,
    /// Visible window.
    viewport: Viewport,
    /// File that `save` writes to.
    path: PathBuf,
    /// Editor configuration.
    config: EditorConfig,
}

impl Editor {
    /// Open `path` for editing. A file that doesn't exist yet starts out as a
    /// single empty line and is created on first save.
    pub fn open(path: impl Into<PathBuf>, size: Expanse, config: EditorConfig) -> Result<Self> {
        let path = path.into();
        let store = match fs::read(&path) {
            Ok(bytes) => LineStore::from_bytes(&bytes)?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "new file");
                LineStore::new()?
            }
            Err(e) => return Err(Error::file(&path, &e)),
        };
        tracing::info!(
            path = %path.display(),
            lines = store.total_lines(),
            "opened"
        );
        Ok(Self::with_store(store, path, size, config))
    }

    /// An editor over in-memory content, saving to `path`.
    pub fn from_bytes(
        bytes: &[u8],
        path: impl Into<PathBuf>,
        size: Expanse,
        config: EditorConfig,
    ) -> Result<Self> {
        let store = LineStore::from_bytes(bytes)?;
        Ok(Self::with_store(store, path.into(), size, config))
    }

    /// Assemble an editor with the cursor at the origin.
    fn with_store(store: LineStore, path: PathBuf, size: Expanse, config: EditorConfig) -> Self {
        let viewport = Viewport::new(size, config.scroll_margin);
        Self {
            current: store.first(),
            store,
            cursor: Cursor::default(),
            viewport,
            path,
            config,
        }
    }

    /// The line store.
    pub fn store(&self) -> &LineStore {
        &self.store
    }

    /// The cursor position.
    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// The viewport.
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// The file this editor saves to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The editor configuration.
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// The id of the line under the cursor.
    pub fn current_id(&self) -> LineId {
        self.current
    }

    /// The line under the cursor.
    pub fn current_line(&self) -> Option<&Line> {
        self.store.get(self.current)
    }

    /// Length of the line under the cursor.
    fn current_len(&self) -> usize {
        self.current_line().map_or(0, Line::len)
    }

    /// The full buffer content, as it would be saved.
    pub fn text(&self) -> Vec<u8> {
        self.store.to_bytes()
    }

    /// Dispatch a key.
    pub fn handle_key(&mut self, key: Key) -> Result<Outcome> {
        let before = (self.cursor, self.store.total_lines());
        match key {
            Key::Ctrl('q') => return Ok(Outcome::Quit),
            Key::Ctrl('s') => {
                self.save()?;
                return Ok(Outcome::Handled);
            }
            Key::Up => self.move_up(),
            Key::Down => self.move_down(),
            Key::Left => self.move_left(),
            Key::Right => self.move_right(),
            Key::Enter => self.split_line()?,
            Key::Backspace => {
                if !self.delete_char()? {
                    return Ok(Outcome::Ignored);
                }
            }
            Key::Char(b) if Key::is_printable(b) => self.insert_char(b)?,
            Key::Char(_) | Key::Ctrl(_) | Key::Esc => return Ok(Outcome::Ignored),
        }
        if matches!(key, Key::Up | Key::Down | Key::Left | Key::Right)
            && before == (self.cursor, self.store.total_lines())
        {
            return Ok(Outcome::Ignored);
        }
        Ok(Outcome::Handled)
    }

    /// Insert `c` at the cursor and advance past it.
    pub fn insert_char(&mut self, c: u8) -> Result<()> {
        let col = self.cursor.col;
        if let Some(line) = self.store.get_mut(self.current) {
            line.insert(col, c)?;
            self.cursor.col += 1;
        }
        self.clamp_cursor();
        Ok(())
    }

    /// Split the current line at the cursor. The tail moves to a new line
    /// below and the cursor moves to its start.
    pub fn split_line(&mut self) -> Result<()> {
        let col = self.cursor.col;
        let tail = match self.store.get_mut(self.current) {
            Some(line) => line.split_off(col)?,
            None => self.store.create_line()?,
        };
        self.current = self.store.link_after(self.current, tail);
        self.cursor = Cursor::new(self.cursor.row + 1, 0);
        tracing::debug!(row = self.cursor.row, "split line");
        self.clamp_cursor();
        Ok(())
    }

    /// Backspace. Removes the byte left of the cursor, or joins the current
    /// line onto the previous one when the cursor is at column zero. Returns
    /// false if there was nothing before the cursor.
    pub fn delete_char(&mut self) -> Result<bool> {
        if self.cursor.col > 0 {
            let col = self.cursor.col - 1;
            if let Some(line) = self.store.get_mut(self.current) {
                line.remove(col);
            }
            self.cursor.col = col;
            self.clamp_cursor();
            Ok(true)
        } else if self.cursor.row > 0 {
            self.merge_line()
        } else {
            Ok(false)
        }
    }

    /// Append the current line to its predecessor and remove it.
    fn merge_line(&mut self) -> Result<bool> {
        let Some(prev) = self.store.prev(self.current) else {
            return Ok(false);
        };
        let tail = self
            .current_line()
            .map(|l| l.as_bytes().to_vec())
            .unwrap_or_default();
        let Some(prev_line) = self.store.get_mut(prev) else {
            return Ok(false);
        };
        let join = prev_line.len();
        prev_line.extend(&tail)?;
        self.current = match self.store.unlink(self.current) {
            Unlinked::Removed { moved_to } => moved_to,
            Unlinked::Cleared(id) => id,
        };
        self.cursor = Cursor::new(self.cursor.row - 1, join);
        tracing::debug!(row = self.cursor.row, "merged line");
        self.clamp_cursor();
        Ok(true)
    }

    /// Move up one line, keeping the column where possible.
    pub fn move_up(&mut self) {
        if let Some(prev) = self.store.prev(self.current) {
            self.current = prev;
            self.cursor.row -= 1;
        }
        self.clamp_cursor();
    }

    /// Move down one line, keeping the column where possible.
    pub fn move_down(&mut self) {
        if let Some(next) = self.store.next(self.current) {
            self.current = next;
            self.cursor.row += 1;
        }
        self.clamp_cursor();
    }

    /// Move left one byte, wrapping to the end of the previous line.
    pub fn move_left(&mut self) {
        if self.cursor.col > 0 {
            self.cursor.col -= 1;
        } else if let Some(prev) = self.store.prev(self.current) {
            self.current = prev;
            self.cursor.row -= 1;
            self.cursor.col = self.current_len();
        }
        self.clamp_cursor();
    }

    /// Move right one byte, wrapping to the start of the next line.
    pub fn move_right(&mut self) {
        if self.cursor.col < self.current_len() {
            self.cursor.col += 1;
        } else if let Some(next) = self.store.next(self.current) {
            self.current = next;
            self.cursor.row += 1;
            self.cursor.col = 0;
        }
        self.clamp_cursor();
    }

    /// Pull the cursor back inside the buffer: the row onto the last line and
    /// the column onto the end of its line.
    pub fn clamp_cursor(&mut self) {
        let last = self.store.total_lines() - 1;
        if self.cursor.row > last || !self.store.contains(self.current) {
            self.cursor.row = self.cursor.row.min(last);
            self.current = self
                .store
                .nth(self.cursor.row)
                .unwrap_or_else(|| self.store.last());
        }
        let len = self.current_len();
        if self.cursor.col > len {
            self.cursor.col = len;
        }
    }

    /// Scroll the viewport so the cursor is visible.
    pub fn reconcile_viewport(&mut self) {
        self.viewport.reconcile(self.cursor);
    }

    /// Adapt to a new terminal size.
    pub fn resize(&mut self, size: Expanse) {
        tracing::debug!(w = size.w, h = size.h, "resize");
        self.viewport.set_size(size);
        self.clamp_cursor();
        self.reconcile_viewport();
    }

    /// Write the buffer to its file, replacing any existing content.
    pub fn save(&self) -> Result<()> {
        let file = File::create(&self.path).map_err(|e| Error::file(&self.path, &e))?;
        self.store
            .write_to(BufWriter::new(file))
            .map_err(|e| Error::file(&self.path, &e))?;
        tracing::info!(
            path = %self.path.display(),
            lines = self.store.total_lines(),
            "saved"
        );
        Ok(())
    }

    /// Write the buffer to `w`: lines separated by newlines, with no newline
    /// after the last line.
    pub fn save_to(&self, w: impl Write) -> Result<()> {
        self.store
            .write_to(w)
            .map_err(|e| Error::Io(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::key::ctrl;

    fn editor(text: &str) -> Result<Editor> {
        Editor::from_bytes(
            text.as_bytes(),
            "unused.txt",
            Expanse::new(80, 24),
            EditorConfig::default(),
        )
    }

    fn text(ed: &Editor) -> String {
        String::from_utf8_lossy(&ed.text()).into_owned()
    }

    #[test]
    fn type_split_type() -> Result<()> {
        let mut ed = editor("")?;
        for b in b"hi" {
            ed.insert_char(*b)?;
        }
        ed.split_line()?;
        ed.insert_char(b'!')?;
        assert_eq!(text(&ed), "hi\n!");
        assert_eq!(ed.cursor(), Cursor::new(1, 1));
        Ok(())
    }

    #[test]
    fn split_mid_line() -> Result<()> {
        let mut ed = editor("abcdef")?;
        ed.move_right();
        ed.move_right();
        ed.split_line()?;
        assert_eq!(text(&ed), "ab\ncdef");
        assert_eq!(ed.cursor(), Cursor::new(1, 0));
        assert_eq!(ed.current_line().map(Line::as_bytes), Some(&b"cdef"[..]));
        Ok(())
    }

    #[test]
    fn backspace_at_origin_is_noop() -> Result<()> {
        let mut ed = editor("abc")?;
        assert!(!ed.delete_char()?);
        assert_eq!(ed.handle_key(Key::Backspace)?, Outcome::Ignored);
        assert_eq!(text(&ed), "abc");
        assert_eq!(ed.cursor(), Cursor::new(0, 0));
        Ok(())
    }

    #[test]
    fn arrows_at_origin() -> Result<()> {
        let mut ed = editor("abc")?;
        assert_eq!(ed.handle_key(Key::Left)?, Outcome::Ignored);
        assert_eq!(ed.cursor(), Cursor::new(0, 0));
        assert_eq!(ed.handle_key(Key::Right)?, Outcome::Handled);
        assert_eq!(ed.cursor(), Cursor::new(0, 1));
        Ok(())
    }

    #[test]
    fn arrows_wrap_lines() -> Result<()> {
        let mut ed = editor("abc\ndef")?;
        for _ in 0..3 {
            ed.move_right();
        }
        assert_eq!(ed.cursor(), Cursor::new(0, 3));
        ed.move_right();
        assert_eq!(ed.cursor(), Cursor::new(1, 0));
        ed.move_left();
        assert_eq!(ed.cursor(), Cursor::new(0, 3));
        Ok(())
    }

    #[test]
    fn vertical_moves_clamp_column() -> Result<()> {
        let mut ed = editor("long line\nab\nlonger line")?;
        for _ in 0..7 {
            ed.move_right();
        }
        ed.move_down();
        assert_eq!(ed.cursor(), Cursor::new(1, 2));
        ed.move_down();
        assert_eq!(ed.cursor(), Cursor::new(2, 2));
        ed.move_down();
        assert_eq!(ed.cursor(), Cursor::new(2, 2));
        ed.move_up();
        ed.move_up();
        ed.move_up();
        assert_eq!(ed.cursor(), Cursor::new(0, 2));
        Ok(())
    }

    #[test]
    fn merge_into_previous() -> Result<()> {
        let mut ed = editor("abc\ndef\nghi")?;
        ed.move_down();
        assert!(ed.delete_char()?);
        assert_eq!(text(&ed), "abcdef\nghi");
        assert_eq!(ed.cursor(), Cursor::new(0, 3));
        assert_eq!(ed.store().total_lines(), 2);
        ed.move_down();
        ed.move_up();
        assert_eq!(ed.cursor(), Cursor::new(0, 3));
        Ok(())
    }

    #[test]
    fn merge_first_of_two_lines_keeps_cursor_valid() -> Result<()> {
        let mut ed = editor("\nx")?;
        ed.move_down();
        assert!(ed.delete_char()?);
        assert_eq!(text(&ed), "x");
        assert_eq!(ed.cursor(), Cursor::new(0, 0));
        assert_eq!(ed.store().first(), ed.current_id());
        Ok(())
    }

    #[test]
    fn delete_within_line() -> Result<()> {
        let mut ed = editor("abc")?;
        ed.move_right();
        ed.move_right();
        assert!(ed.delete_char()?);
        assert_eq!(text(&ed), "ac");
        assert_eq!(ed.cursor(), Cursor::new(0, 1));
        Ok(())
    }

    #[test]
    fn control_keys() -> Result<()> {
        let mut ed = editor("abc")?;
        assert_eq!(ed.handle_key(Key::Ctrl('q'))?, Outcome::Quit);
        assert_eq!(ed.handle_key(Key::Esc)?, Outcome::Ignored);
        assert_eq!(ed.handle_key(Key::from_byte(ctrl('x')))?, Outcome::Ignored);
        assert_eq!(ed.handle_key(Key::Char(b'\t'))?, Outcome::Ignored);
        assert_eq!(ed.handle_key(Key::Char(0xc3))?, Outcome::Ignored);
        assert_eq!(text(&ed), "abc");
        Ok(())
    }

    #[test]
    fn resize_keeps_cursor_visible() -> Result<()> {
        let mut ed = editor(&"x".repeat(200))?;
        for _ in 0..150 {
            ed.move_right();
        }
        ed.reconcile_viewport();
        ed.resize(Expanse::new(20, 2));
        assert!(ed.viewport().contains(ed.cursor()));
        assert_eq!(ed.viewport().col, 140);
        Ok(())
    }

    #[test]
    fn session_settings() -> Result<()> {
        let ed = Editor::from_bytes(
            b"",
            "notes/today.txt",
            Expanse::new(80, 24),
            EditorConfig::default().with_scroll_margin(4),
        )?;
        assert_eq!(ed.path(), Path::new("notes/today.txt"));
        assert_eq!(ed.config().scroll_margin, 4);
        assert_eq!(ed.viewport().max_col(), 76);
        Ok(())
    }

    #[test]
    fn save_to_writer() -> Result<()> {
        let ed = editor("a\nb")?;
        let mut out = vec![];
        ed.save_to(&mut out)?;
        assert_eq!(out, b"a\nb");
        Ok(())
    }
}
