//! In-memory backends for driving the editor in tests.

use std::{collections::VecDeque, time::Duration};

use crate::{
    backend::{BackendControl, ByteSource, RenderBackend, Style},
    error::{Error, Result},
    geom::{Expanse, Point},
};

/// A byte source fed from a script. Pauses in the script read as timeouts.
#[derive(Debug, Default)]
pub struct ScriptedInput {
    /// Pending bytes; `None` marks a pause.
    script: VecDeque<Option<u8>>,
    /// Fail with a terminal error once the script runs out.
    fail_when_empty: bool,
}

impl ScriptedInput {
    /// A source that yields `bytes` and then times out forever.
    pub fn new(bytes: &[u8]) -> Self {
        let mut s = Self::default();
        s.push(bytes);
        s
    }

    /// Append bytes to the script.
    pub fn push(&mut self, bytes: &[u8]) {
        self.script.extend(bytes.iter().copied().map(Some));
    }

    /// Append a single timeout to the script.
    pub fn pause(&mut self) {
        self.script.push_back(None);
    }

    /// Report a read failure once the script is exhausted, instead of timing
    /// out.
    pub fn fail_when_empty(mut self) -> Self {
        self.fail_when_empty = true;
        self
    }

    /// Number of script entries not yet consumed.
    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl ByteSource for ScriptedInput {
    fn read_byte(&mut self, _timeout: Duration) -> Result<Option<u8>> {
        match self.script.pop_front() {
            Some(b) => Ok(b),
            None if self.fail_when_empty => Err(Error::Terminal("input closed".into())),
            None => Ok(None),
        }
    }
}

/// A terminal controller that records mode switches.
#[derive(Debug)]
pub struct TestControl {
    /// Reported terminal size.
    pub size: Expanse,
    /// Whether raw mode is active.
    pub raw: bool,
    /// Number of `start` calls.
    pub starts: usize,
    /// Number of `stop` calls.
    pub stops: usize,
}

impl TestControl {
    /// A controller reporting `size`.
    pub fn new(size: Expanse) -> Self {
        Self {
            size,
            raw: false,
            starts: 0,
            stops: 0,
        }
    }
}

impl BackendControl for TestControl {
    fn start(&mut self) -> Result<()> {
        self.raw = true;
        self.starts += 1;
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        self.raw = false;
        self.stops += 1;
        Ok(())
    }

    fn size(&self) -> Result<Expanse> {
        Ok(self.size)
    }
}

/// A render backend that paints into a grid of cells.
#[derive(Debug)]
pub struct TestRender {
    /// Canvas size.
    size: Expanse,
    /// Character cells, row-major.
    cells: Vec<Vec<u8>>,
    /// Cells painted with [`Style::Inverted`].
    inverted: Vec<Vec<bool>>,
    /// Active style.
    style: Style,
    /// Last cursor placement.
    pub cursor: Point,
    /// Number of frames flushed.
    pub frames: usize,
}

impl TestRender {
    /// A blank canvas of `size`.
    pub fn new(size: Expanse) -> Self {
        let mut r = Self {
            size,
            cells: vec![],
            inverted: vec![],
            style: Style::Plain,
            cursor: Point::zero(),
            frames: 0,
        };
        r.clear();
        r
    }

    /// Change the canvas size, clearing it.
    pub fn resize(&mut self, size: Expanse) {
        self.size = size;
        self.clear();
    }

    /// Blank every cell.
    fn clear(&mut self) {
        let (w, h) = (self.size.w as usize, self.size.h as usize);
        self.cells = vec![vec![b' '; w]; h];
        self.inverted = vec![vec![false; w]; h];
    }

    /// Row `y` exactly as painted, including padding.
    pub fn row(&self, y: u32) -> String {
        self.cells
            .get(y as usize)
            .map(|r| String::from_utf8_lossy(r).into_owned())
            .unwrap_or_default()
    }

    /// Every row, with trailing blanks trimmed.
    pub fn lines(&self) -> Vec<String> {
        (0..self.size.h)
            .map(|y| self.row(y).trim_end().to_string())
            .collect()
    }

    /// True if the cell at `p` was painted inverted.
    pub fn is_inverted(&self, p: Point) -> bool {
        self.inverted
            .get(p.y as usize)
            .and_then(|r| r.get(p.x as usize))
            .copied()
            .unwrap_or(false)
    }
}

impl RenderBackend for TestRender {
    fn reset(&mut self) -> Result<()> {
        self.clear();
        Ok(())
    }

    fn style(&mut self, style: Style) -> Result<()> {
        self.style = style;
        Ok(())
    }

    fn text(&mut self, loc: Point, txt: &[u8]) -> Result<()> {
        let y = loc.y as usize;
        let (Some(row), Some(inv)) = (self.cells.get_mut(y), self.inverted.get_mut(y)) else {
            return Ok(());
        };
        for (i, b) in txt.iter().enumerate() {
            let x = loc.x as usize + i;
            if x >= row.len() {
                break;
            }
            row[x] = *b;
            inv[x] = self.style == Style::Inverted;
        }
        Ok(())
    }

    fn cursor(&mut self, loc: Point) -> Result<()> {
        self.cursor = loc;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.frames += 1;
        Ok(())
    }
}
