//! The seams between the editor and the terminal it runs on.

use std::{
    fmt::Debug,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use crate::{
    error::Result,
    geom::{Expanse, Point},
};

/// A handle for switching the terminal in and out of raw mode and querying
/// its size.
pub trait BackendControl: Debug {
    /// Save the current terminal mode and enter raw mode.
    fn start(&mut self) -> Result<()>;

    /// Restore the terminal mode saved by `start`.
    fn stop(&mut self) -> Result<()>;

    /// The current terminal dimensions, including the status row.
    fn size(&self) -> Result<Expanse>;
}

/// A source of raw input bytes.
pub trait ByteSource {
    /// Read one byte, waiting at most `timeout`. Returns `None` if nothing
    /// arrived in time.
    fn read_byte(&mut self, timeout: Duration) -> Result<Option<u8>>;
}

/// Text attributes understood by render backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Style {
    /// Normal text.
    #[default]
    Plain,
    /// Reverse video, used for the status line.
    Inverted,
}

/// A display surface.
pub trait RenderBackend {
    /// Clear the screen.
    fn reset(&mut self) -> Result<()>;
    /// Apply a style to the following text output.
    fn style(&mut self, style: Style) -> Result<()>;
    /// Output bytes starting at a screen location.
    fn text(&mut self, loc: Point, txt: &[u8]) -> Result<()>;
    /// Place the terminal cursor.
    fn cursor(&mut self, loc: Point) -> Result<()>;
    /// Flush output to the terminal.
    fn flush(&mut self) -> Result<()>;
}

/// Guard that ensures backend start/stop are paired for a terminal session.
/// The terminal is restored when the guard drops, so every exit path out of
/// the run loop leaves the terminal usable.
#[derive(Debug)]
pub struct TerminalSession<'a> {
    /// Backend controller for the session.
    backend: &'a mut dyn BackendControl,
    /// Whether the session has an active backend start.
    active: bool,
}

impl<'a> TerminalSession<'a> {
    /// Start the backend and create a new session guard.
    pub fn new(backend: &'a mut dyn BackendControl) -> Result<Self> {
        backend.start()?;
        Ok(Self {
            backend,
            active: true,
        })
    }

    /// The current terminal size.
    pub fn size(&self) -> Result<Expanse> {
        self.backend.size()
    }

    /// Stop the backend if the session is active.
    pub fn stop(&mut self) -> Result<()> {
        if self.active {
            self.active = false;
            self.backend.stop()?;
        }
        Ok(())
    }
}

impl Drop for TerminalSession<'_> {
    fn drop(&mut self) {
        if self.active {
            self.active = false;
            if let Err(e) = self.backend.stop() {
                tracing::error!("failed to restore terminal: {e}");
            }
        }
    }
}

/// Pending-resize flag, set asynchronously (usually from a SIGWINCH handler)
/// and consumed once per run loop iteration.
#[derive(Debug, Clone, Default)]
pub struct ResizeFlag {
    /// Shared flag.
    flag: Arc<AtomicBool>,
}

impl ResizeFlag {
    /// A flag with no pending resize.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a resize as pending.
    pub fn notify(&self) {
        self.flag.store(true, Ordering::Release);
    }

    /// Clear the flag, returning whether a resize was pending. Reading and
    /// clearing happen in one atomic step, so a notification can't be lost
    /// between the two.
    pub fn take(&self) -> bool {
        self.flag.swap(false, Ordering::AcqRel)
    }

    /// The underlying flag, for registration with a signal handler.
    pub fn handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.flag)
    }
}
