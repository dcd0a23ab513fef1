//! Crossterm-backed terminal backends.

use std::{
    io::{self, Read, Stdout, Write},
    sync::mpsc::{self, RecvTimeoutError},
    thread,
    time::Duration,
};

use crossterm::{ExecutableCommand, QueueableCommand, cursor as ccursor, style, terminal};
use quill_core::{
    backend::{BackendControl, ByteSource, RenderBackend, Style},
    error::{Error, Result},
    geom::{Expanse, Point},
};

/// Size assumed when the terminal can't tell us its own.
pub const FALLBACK_SIZE: Expanse = Expanse { w: 80, h: 24 };

/// Map IO results into terminal errors.
fn translate_result<T>(e: io::Result<T>) -> Result<T> {
    e.map_err(|e| Error::Terminal(e.to_string()))
}

/// Map IO results from frame output into render errors.
fn render_result<T>(e: io::Result<T>) -> Result<T> {
    e.map_err(|e| Error::Render(e.to_string()))
}

/// Convert a cell coordinate to crossterm's `u16`.
fn coord(v: u32) -> u16 {
    u16::try_from(v).unwrap_or(u16::MAX)
}

/// Crossterm-backed implementation of `BackendControl`.
#[derive(Debug)]
pub struct CrosstermControl {
    /// Stdout handle used for control output.
    fp: Stdout,
}

impl CrosstermControl {
    /// Enter alternate screen and raw mode.
    fn enter(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        self.fp.execute(terminal::EnterAlternateScreen)?;
        Ok(())
    }

    /// Leave alternate screen and restore terminal state.
    fn exit(&mut self) -> io::Result<()> {
        self.fp.execute(terminal::LeaveAlternateScreen)?;
        self.fp.execute(ccursor::Show)?;
        terminal::disable_raw_mode()?;
        Ok(())
    }
}

impl Default for CrosstermControl {
    fn default() -> Self {
        Self { fp: io::stdout() }
    }
}

impl BackendControl for CrosstermControl {
    fn start(&mut self) -> Result<()> {
        translate_result(self.enter())
    }

    fn stop(&mut self) -> Result<()> {
        translate_result(self.exit())
    }

    fn size(&self) -> Result<Expanse> {
        match terminal::size().map(Expanse::from) {
            Ok(size) if !size.is_empty() => Ok(size),
            Ok(_) => Ok(FALLBACK_SIZE),
            Err(e) => {
                tracing::warn!("terminal size query failed, assuming 80x24: {e}");
                Ok(FALLBACK_SIZE)
            }
        }
    }
}

/// Crossterm-backed render backend.
pub struct CrosstermRender {
    /// Stdout handle used for rendering output.
    fp: Stdout,
}

impl Default for CrosstermRender {
    fn default() -> Self {
        Self { fp: io::stdout() }
    }
}

impl CrosstermRender {
    /// Clear the screen, hiding the cursor until the frame is complete.
    fn clear(&mut self) -> io::Result<()> {
        self.fp.queue(ccursor::Hide)?;
        self.fp.queue(terminal::Clear(terminal::ClearType::All))?;
        Ok(())
    }

    /// Apply a style to subsequent output.
    fn apply_style(&mut self, s: Style) -> io::Result<()> {
        self.fp.queue(style::SetAttribute(style::Attribute::Reset))?;
        if s == Style::Inverted {
            self.fp.queue(style::SetAttribute(style::Attribute::Reverse))?;
        }
        Ok(())
    }

    /// Write bytes at a position.
    fn text(&mut self, loc: Point, txt: &[u8]) -> io::Result<()> {
        self.fp.queue(ccursor::MoveTo(coord(loc.x), coord(loc.y)))?;
        self.fp.write_all(txt)?;
        Ok(())
    }

    /// Move the visible cursor.
    fn place_cursor(&mut self, loc: Point) -> io::Result<()> {
        self.fp.queue(ccursor::MoveTo(coord(loc.x), coord(loc.y)))?;
        self.fp.queue(ccursor::Show)?;
        Ok(())
    }
}

impl RenderBackend for CrosstermRender {
    fn reset(&mut self) -> Result<()> {
        render_result(self.clear())
    }

    fn style(&mut self, style: Style) -> Result<()> {
        render_result(self.apply_style(style))
    }

    fn text(&mut self, loc: Point, txt: &[u8]) -> Result<()> {
        render_result(self.text(loc, txt))
    }

    fn cursor(&mut self, loc: Point) -> Result<()> {
        render_result(self.place_cursor(loc))
    }

    fn flush(&mut self) -> Result<()> {
        render_result(self.fp.flush())
    }
}

/// Raw bytes from stdin, read on a background thread so the run loop can
/// wait with a timeout.
#[derive(Debug, Default)]
pub struct StdinSource {
    /// Byte receiver, created on first read.
    rx: Option<mpsc::Receiver<u8>>,
}

impl StdinSource {
    /// A source that starts reading on first use, once raw mode is active.
    pub fn new() -> Self {
        Self::default()
    }
}

impl ByteSource for StdinSource {
    fn read_byte(&mut self, timeout: Duration) -> Result<Option<u8>> {
        let rx = self.rx.get_or_insert_with(|| {
            let (tx, rx) = mpsc::channel();
            byte_emitter(tx);
            rx
        });
        match rx.recv_timeout(timeout) {
            Ok(b) => Ok(Some(b)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => {
                Err(Error::Terminal("failed to read from stdin".into()))
            }
        }
    }
}

/// Thread entry that forwards stdin bytes into the channel. The thread exits
/// on read failure or end of input, which the receiver sees as a
/// disconnect.
fn byte_emitter(tx: mpsc::Sender<u8>) {
    thread::spawn(move || {
        let mut stdin = io::stdin().lock();
        let mut buf = [0u8; 64];
        loop {
            match stdin.read(&mut buf) {
                Ok(0) => {
                    tracing::error!("stdin closed");
                    return;
                }
                Ok(n) => {
                    for b in &buf[..n] {
                        if tx.send(*b).is_err() {
                            // The receiver has been dropped, so we're shutting down.
                            return;
                        }
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => {
                    tracing::error!("stdin read error: {e}");
                    return;
                }
            }
        }
    });
}
