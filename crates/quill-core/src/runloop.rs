//! The control loop: poll input, dispatch keys, redraw.

use std::{thread, time::Duration};

use crate::{
    backend::{BackendControl, ByteSource, RenderBackend, ResizeFlag, TerminalSession},
    editor::{Editor, Outcome},
    error::Result,
    input::Decoder,
    render::render,
};

/// Default time to wait for each input byte.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(100);
/// Default pause between polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Options for configuring the run loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunloopOptions {
    /// How long a single byte read may wait. Also bounds how long a resize
    /// can go unnoticed.
    pub read_timeout: Duration,
    /// Sleep between iterations, bounding CPU use while idle.
    pub poll_interval: Duration,
}

impl Default for RunloopOptions {
    fn default() -> Self {
        Self {
            read_timeout: DEFAULT_READ_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl RunloopOptions {
    /// Set the per-byte read timeout.
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Set the sleep between polls.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

/// Run the editor until the user quits, returning the process exit code.
///
/// Raw mode is entered on start and restored on every way out of this
/// function, errors included.
pub fn runloop(
    editor: &mut Editor,
    control: &mut dyn BackendControl,
    input: &mut impl ByteSource,
    r: &mut dyn RenderBackend,
    resize: &ResizeFlag,
    options: RunloopOptions,
) -> Result<i32> {
    let mut session = TerminalSession::new(control)?;
    editor.resize(session.size()?);
    render(editor, r)?;

    let mut decoder = Decoder::new();
    loop {
        if resize.take() {
            editor.resize(session.size()?);
            render(editor, r)?;
        }

        if let Some(key) = decoder.next_key(input, options.read_timeout)? {
            match editor.handle_key(key)? {
                Outcome::Quit => {
                    session.stop()?;
                    return Ok(0);
                }
                Outcome::Handled | Outcome::Ignored => render(editor, r)?,
            }
        }

        if !options.poll_interval.is_zero() {
            thread::sleep(options.poll_interval);
        }
    }
}
