//! Quill: a minimal full-screen terminal text editor.
//!
//! `quill FILE` opens (or creates) FILE for editing. Ctrl-S saves, Ctrl-Q
//! quits.

mod terminal;

use std::{
    fs::File,
    io,
    panic,
    path::PathBuf,
    process::ExitCode,
    sync::Mutex,
    time::Duration,
};

use anyhow::Context;
use clap::{Parser, error::ErrorKind};
use color_backtrace::{BacktracePrinter, default_output_stream};
use crossterm::{cursor as ccursor, terminal as cterm};
use quill_core::{
    Editor, EditorConfig, RunloopOptions,
    backend::{BackendControl, ResizeFlag},
    editor::DEFAULT_SCROLL_MARGIN,
    runloop,
};
use scopeguard::guard;

use crate::terminal::{CrosstermControl, CrosstermRender, StdinSource};

/// Command line arguments.
#[derive(Parser, Debug)]
#[command(name = "quill", version, about = "A minimal terminal text editor")]
struct Args {
    /// File to edit. Created on first save if it doesn't exist.
    file: PathBuf,

    /// Write diagnostic logs to this file
    #[arg(long, value_name = "PATH")]
    log: Option<PathBuf>,

    /// Maximum level for log output
    #[arg(long, default_value = "info")]
    log_level: tracing::Level,

    /// Columns kept between the cursor and the right edge before scrolling
    #[arg(long, default_value_t = DEFAULT_SCROLL_MARGIN)]
    scroll_margin: usize,

    /// How long to wait for a key before checking for resizes
    #[arg(long, default_value_t = 100)]
    read_timeout_ms: u64,

    /// Sleep between loop iterations
    #[arg(long, default_value_t = 10)]
    poll_interval_ms: u64,
}

impl Args {
    /// Editor configuration from the command line.
    fn editor_config(&self) -> EditorConfig {
        EditorConfig::default().with_scroll_margin(self.scroll_margin)
    }

    /// Run loop timing from the command line.
    fn runloop_options(&self) -> RunloopOptions {
        RunloopOptions::default()
            .with_read_timeout(Duration::from_millis(self.read_timeout_ms))
            .with_poll_interval(Duration::from_millis(self.poll_interval_ms))
    }
}

/// Install the file log sink if one was requested.
fn init_logging(args: &Args) -> anyhow::Result<()> {
    let Some(path) = &args.log else {
        return Ok(());
    };
    let file = File::create(path)
        .with_context(|| format!("could not create log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_line_number(true)
        .with_max_level(args.log_level)
        .init();
    Ok(())
}

/// Route SIGWINCH into the resize flag.
#[cfg(unix)]
fn watch_resize(flag: &ResizeFlag) -> anyhow::Result<()> {
    signal_hook::flag::register(signal_hook::consts::SIGWINCH, flag.handle())
        .context("could not install resize handler")?;
    Ok(())
}

/// Resize notifications are unavailable on this platform.
#[cfg(not(unix))]
fn watch_resize(_flag: &ResizeFlag) -> anyhow::Result<()> {
    Ok(())
}

/// Open the file and run the editor until it quits.
fn run(args: &Args) -> anyhow::Result<i32> {
    init_logging(args)?;

    let resize = ResizeFlag::new();
    watch_resize(&resize)?;

    let mut control = CrosstermControl::default();
    let size = control.size()?;
    let mut editor = Editor::open(&args.file, size, args.editor_config())?;
    tracing::info!(
        path = %editor.path().display(),
        scroll_margin = editor.config().scroll_margin,
        "editing"
    );

    let previous = panic::take_hook();
    panic::set_hook(Box::new(|pi| {
        let mut stderr = io::stderr();
        #[allow(unused_must_use)]
        {
            crossterm::execute!(stderr, cterm::LeaveAlternateScreen, ccursor::Show);
            cterm::disable_raw_mode();
            BacktracePrinter::new().print_panic_info(pi, &mut default_output_stream());
        }
    }));
    let _restore = guard(previous, |hook| {
        panic::set_hook(hook);
    });

    let code = runloop(
        &mut editor,
        &mut control,
        &mut StdinSource::new(),
        &mut CrosstermRender::default(),
        &resize,
        args.runloop_options(),
    )?;
    Ok(code)
}

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => e.exit(),
            _ => {
                drop(e.print());
                return ExitCode::from(1);
            }
        },
    };
    match run(&args) {
        Ok(code) => ExitCode::from(u8::try_from(code).unwrap_or(1)),
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("quill: {e:#}");
            ExitCode::from(1)
        }
    }
}
