//! Raw escape-sequence backend.
//!
//! Draws straight over the current terminal contents without switching screens, so the
//! overlay appears in place with no flicker.

use std::io::Write;

use anyhow::Result;

use super::Screen;
use crate::types::Style;

const ESC: &str = "\x1b";
const HIDE_CURSOR: &str = "\x1b[?25l";
const SHOW_CURSOR: &str = "\x1b[?25h";
const RESET: &str = "\x1b[0m";
const DIM: &str = "\x1b[2m";
const RED: &str = "\x1b[1;31m";
const GREEN: &str = "\x1b[1;32m";

pub struct AnsiScreen<W: Write> {
    out: W,
}

impl<W: Write> AnsiScreen<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }
}

fn attr(style: Style) -> &'static str {
    match style {
        Style::Normal => "",
        Style::Dim => DIM,
        Style::HintPrimary => RED,
        Style::HintSecondary => GREEN,
    }
}

impl<W: Write> Screen for AnsiScreen<W> {
    fn init(&mut self) -> Result<()> {
        self.out.write_all(HIDE_CURSOR.as_bytes())?;
        self.out.flush()?;
        Ok(())
    }

    fn cleanup(&mut self) -> Result<()> {
        self.out.write_all(SHOW_CURSOR.as_bytes())?;
        self.out.write_all(RESET.as_bytes())?;
        self.out.flush()?;
        Ok(())
    }

    fn put(&mut self, row: usize, col: usize, text: &str, style: Style) -> Result<()> {
        let attr = attr(style);
        if attr.is_empty() {
            write!(self.out, "{ESC}[{};{}H{text}", row + 1, col + 1)?;
        } else {
            write!(self.out, "{ESC}[{};{}H{attr}{text}{RESET}", row + 1, col + 1)?;
        }
        Ok(())
    }

    fn refresh(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}
