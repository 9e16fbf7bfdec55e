//! Drawing surface for the overlay.
//!
//! Two backends share one small interface: `ansi` writes raw escape sequences over whatever
//! is on the terminal, `fullscreen` drives the terminal through crossterm on the alternate
//! screen. The backend is picked once from `Config` and kept for the whole run.

mod ansi;
mod fullscreen;

pub use ansi::AnsiScreen;
pub use fullscreen::FullScreen;

use std::io;
use std::ops::{Deref, DerefMut};

use anyhow::Result;

use crate::config::Backend;
use crate::types::Style;

pub trait Screen {
    /// Prepare the terminal (at least: hide the cursor).
    fn init(&mut self) -> Result<()>;
    /// Undo everything `init` did (at least: show the cursor, reset attributes).
    fn cleanup(&mut self) -> Result<()>;
    /// Write `text` at `row`, `col` (0-based screen cells) with `style`.
    fn put(&mut self, row: usize, col: usize, text: &str, style: Style) -> Result<()>;
    /// Make pending writes visible.
    fn refresh(&mut self) -> Result<()>;
}

/// Backend writing to stdout.
pub fn open(backend: Backend) -> Result<Box<dyn Screen>> {
    Ok(match backend {
        Backend::Ansi => Box::new(AnsiScreen::new(io::stdout())),
        Backend::FullScreen => Box::new(FullScreen::new(io::stdout(), crossterm::terminal::size()?)),
    })
}

/// Owns an initialized screen and cleans it up when dropped.
///
/// Cleanup runs on every way out of the session: normal return, `?` errors and panics.
pub struct ScreenGuard {
    screen: Box<dyn Screen>,
}

impl ScreenGuard {
    pub fn new(mut screen: Box<dyn Screen>) -> Result<Self> {
        if let Err(e) = screen.init() {
            let _ = screen.cleanup();
            return Err(e);
        }
        Ok(Self { screen })
    }
}

impl Deref for ScreenGuard {
    type Target = dyn Screen;

    fn deref(&self) -> &Self::Target {
        self.screen.as_ref()
    }
}

impl DerefMut for ScreenGuard {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.screen.as_mut()
    }
}

impl Drop for ScreenGuard {
    fn drop(&mut self) {
        if let Err(e) = self.screen.cleanup() {
            log::error!("screen cleanup failed: {e:?}");
        }
    }
}
