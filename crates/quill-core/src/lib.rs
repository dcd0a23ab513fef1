//! Quill: the engine behind a minimal full-screen terminal text editor.
//!
//! The buffer is a [`line::LineStore`], an arena of growable byte lines
//! linked into a sequence. An [`Editor`] owns the store together with the
//! cursor and viewport, and applies one edit per decoded [`key::Key`]. The
//! [`runloop`](runloop::runloop) ties it to a terminal through the traits in
//! [`backend`].
//!
//! # Module Organization
//!
//! - [`line`] - Line store
//! - [`cursor`] - Cursor and viewport model
//! - [`editor`] - Editing operations and the session structure
//! - [`input`] - Escape sequence decoder
//! - [`render`] - Screen renderer
//! - [`runloop`] - Control loop

#![warn(missing_docs)]

pub mod backend;
pub mod cursor;
pub mod editor;
pub mod error;
pub mod geom;
pub mod input;
pub mod key;
pub mod line;
pub mod render;
pub mod runloop;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use editor::{Editor, EditorConfig, Outcome};
pub use error::{Error, Result};
pub use runloop::{RunloopOptions, runloop};
