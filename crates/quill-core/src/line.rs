//! The line store: an arena of individually growable lines, linked into a
//! sequence by stable ids.

use std::{
    io::{self, Write},
    iter,
};

use slotmap::{SlotMap, new_key_type};

use crate::error::Result;

/// Capacity of a freshly created line.
pub const INITIAL_CAPACITY: usize = 128;

new_key_type! {
    /// Stable identifier for a line stored in a [`LineStore`].
    pub struct LineId;
}

/// One line of text. The buffer always keeps at least one byte of slack, so
/// `len() < capacity()` holds after every operation.
#[derive(Debug, Clone)]
pub struct Line {
    /// Line content, without any terminator.
    text: Vec<u8>,
    /// Previous line in the store.
    prev: Option<LineId>,
    /// Next line in the store.
    next: Option<LineId>,
}

impl Line {
    /// Allocate an empty, unlinked line with [`INITIAL_CAPACITY`] bytes of
    /// storage.
    pub fn new() -> Result<Self> {
        let mut text = Vec::new();
        text.try_reserve_exact(INITIAL_CAPACITY)?;
        Ok(Self {
            text,
            prev: None,
            next: None,
        })
    }

    /// Allocate an unlinked line holding `bytes`.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut line = Self::new()?;
        line.extend(bytes)?;
        Ok(line)
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// True if the line holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Allocated capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.text.capacity()
    }

    /// The line content.
    pub fn as_bytes(&self) -> &[u8] {
        &self.text
    }

    /// Ensure there is room for `additional` more bytes while keeping a byte
    /// of slack. When the buffer has to be reallocated, the new capacity is
    /// double the required size.
    pub fn grow(&mut self, additional: usize) -> Result<()> {
        let needed = self.text.len().saturating_add(additional);
        if needed >= self.text.capacity() {
            let target = needed.saturating_mul(2);
            self.text.try_reserve_exact(target - self.text.len())?;
        }
        Ok(())
    }

    /// Insert `byte` at `col`, shifting the tail right. `col` is clamped to
    /// the line length.
    pub fn insert(&mut self, col: usize, byte: u8) -> Result<()> {
        self.grow(1)?;
        let col = col.min(self.text.len());
        self.text.insert(col, byte);
        Ok(())
    }

    /// Remove and return the byte at `col`, shifting the tail left.
    pub fn remove(&mut self, col: usize) -> Option<u8> {
        if col < self.text.len() {
            Some(self.text.remove(col))
        } else {
            None
        }
    }

    /// Append `bytes` to the end of the line.
    pub fn extend(&mut self, bytes: &[u8]) -> Result<()> {
        self.grow(bytes.len())?;
        self.text.extend_from_slice(bytes);
        Ok(())
    }

    /// Split the line at `col`. The tail `[col, len)` moves into a new
    /// unlinked line and this line is truncated to `col`.
    pub fn split_off(&mut self, col: usize) -> Result<Self> {
        let col = col.min(self.text.len());
        let tail = Self::from_bytes(&self.text[col..])?;
        self.text.truncate(col);
        Ok(tail)
    }

    /// Drop all content, keeping the allocation.
    pub fn clear(&mut self) {
        self.text.clear();
    }

    /// The bytes in `[start, min(len, start + width))`. Out of range requests
    /// produce an empty slice.
    pub fn visible(&self, start: usize, width: usize) -> &[u8] {
        let len = self.text.len();
        let start = start.min(len);
        let end = start.saturating_add(width).min(len);
        &self.text[start..end]
    }
}

/// Outcome of [`LineStore::unlink`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unlinked {
    /// The line was removed. `moved_to` is the previous line if there was
    /// one, otherwise the next line.
    Removed {
        /// Where the caller should move its cursor.
        moved_to: LineId,
    },
    /// The line was the only one in the store, so it was cleared in place.
    Cleared(LineId),
}

/// An ordered, never-empty collection of lines.
#[derive(Debug, Clone)]
pub struct LineStore {
    /// Arena holding every line in the store.
    lines: SlotMap<LineId, Line>,
    /// Head of the sequence.
    first: LineId,
}

impl LineStore {
    /// A store holding a single empty line.
    pub fn new() -> Result<Self> {
        let mut lines = SlotMap::with_key();
        let first = lines.insert(Line::new()?);
        Ok(Self { lines, first })
    }

    /// Build a store from file content, splitting on line feeds. `n`
    /// separators produce `n + 1` lines, so a trailing newline yields a
    /// trailing empty line. Carriage returns are kept as content.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut parts = bytes.split(|b| *b == b'\n');
        let mut lines = SlotMap::with_key();
        let head = parts.next().unwrap_or_default();
        let first = lines.insert(Line::from_bytes(head)?);
        let mut store = Self { lines, first };
        let mut tail = first;
        for part in parts {
            tail = store.link_after(tail, Line::from_bytes(part)?);
        }
        Ok(store)
    }

    /// Allocate a new, unlinked line. It becomes part of the store once
    /// passed to [`LineStore::link_after`].
    pub fn create_line(&self) -> Result<Line> {
        Line::new()
    }

    /// Insert `line` immediately after `anchor`, returning its id.
    pub fn link_after(&mut self, anchor: LineId, mut line: Line) -> LineId {
        let next = self.lines.get(anchor).and_then(|l| l.next);
        line.prev = Some(anchor);
        line.next = next;
        let id = self.lines.insert(line);
        if let Some(next) = next
            && let Some(n) = self.lines.get_mut(next)
        {
            n.prev = Some(id);
        }
        if let Some(a) = self.lines.get_mut(anchor) {
            a.next = Some(id);
        }
        id
    }

    /// Remove `id` from the store. If it is the only line it is cleared in
    /// place instead, keeping the store non-empty. Unknown ids leave the store
    /// untouched.
    pub fn unlink(&mut self, id: LineId) -> Unlinked {
        let Some(line) = self.lines.get(id) else {
            return Unlinked::Cleared(self.first);
        };
        let (prev, next) = (line.prev, line.next);
        let Some(moved_to) = prev.or(next) else {
            if let Some(line) = self.lines.get_mut(id) {
                line.clear();
            }
            return Unlinked::Cleared(id);
        };
        if let Some(p) = prev.and_then(|p| self.lines.get_mut(p)) {
            p.next = next;
        }
        if let Some(n) = next.and_then(|n| self.lines.get_mut(n)) {
            n.prev = prev;
        }
        if self.first == id
            && let Some(next) = next
        {
            self.first = next;
        }
        self.lines.remove(id);
        Unlinked::Removed { moved_to }
    }

    /// Make room for `additional` bytes in line `id`.
    pub fn grow(&mut self, id: LineId, additional: usize) -> Result<()> {
        match self.lines.get_mut(id) {
            Some(line) => line.grow(additional),
            None => Ok(()),
        }
    }

    /// Number of lines in the store. Always at least one.
    pub fn total_lines(&self) -> usize {
        self.lines.len()
    }

    /// The first line.
    pub fn first(&self) -> LineId {
        self.first
    }

    /// The last line.
    pub fn last(&self) -> LineId {
        let mut id = self.first;
        while let Some(next) = self.next(id) {
            id = next;
        }
        id
    }

    /// The line after `id`.
    pub fn next(&self, id: LineId) -> Option<LineId> {
        self.lines.get(id).and_then(|l| l.next)
    }

    /// The line before `id`.
    pub fn prev(&self, id: LineId) -> Option<LineId> {
        self.lines.get(id).and_then(|l| l.prev)
    }

    /// The `n`th line, counting from zero.
    pub fn nth(&self, n: usize) -> Option<LineId> {
        self.ids_from(self.first).nth(n)
    }

    /// True if `id` refers to a line in this store.
    pub fn contains(&self, id: LineId) -> bool {
        self.lines.contains_key(id)
    }

    /// Look up a line.
    pub fn get(&self, id: LineId) -> Option<&Line> {
        self.lines.get(id)
    }

    /// Look up a line mutably.
    pub fn get_mut(&mut self, id: LineId) -> Option<&mut Line> {
        self.lines.get_mut(id)
    }

    /// Walk the store from the first line.
    pub fn iter(&self) -> Lines<'_> {
        self.iter_from(self.first)
    }

    /// Walk the store forward, starting at `id`.
    pub fn iter_from(&self, id: LineId) -> Lines<'_> {
        Lines {
            store: self,
            next: Some(id),
        }
    }

    /// Walk line ids forward, starting at `id`.
    fn ids_from(&self, id: LineId) -> impl Iterator<Item = LineId> + '_ {
        iter::successors(Some(id), |id| self.next(*id))
    }

    /// Write every line, separated by newlines. No newline follows the last
    /// line.
    pub fn write_to(&self, mut w: impl Write) -> io::Result<()> {
        for (i, line) in self.iter().enumerate() {
            if i > 0 {
                w.write_all(b"\n")?;
            }
            w.write_all(line.as_bytes())?;
        }
        w.flush()
    }

    /// The serialized store content.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        // Writing into a Vec is infallible.
        drop(self.write_to(&mut out));
        out
    }
}

/// Forward iterator over the lines of a [`LineStore`].
pub struct Lines<'a> {
    /// Store being walked.
    store: &'a LineStore,
    /// Next line to yield.
    next: Option<LineId>,
}

impl<'a> Iterator for Lines<'a> {
    type Item = &'a Line;

    fn next(&mut self) -> Option<Self::Item> {
        let line = self.store.get(self.next?)?;
        self.next = line.next;
        Some(line)
    }
}
