//! Full-screen backend driven through crossterm on the alternate screen.

use std::io::Write;

use anyhow::Result;
use crossterm::{
    cursor,
    style::{self, Attribute, Color},
    terminal::{self, ClearType},
    QueueableCommand,
};

use super::Screen;
use crate::types::Style;

pub struct FullScreen<W: Write> {
    out: W,
    /// Terminal size as (columns, rows); writes starting outside it are dropped.
    size: (u16, u16),
}

impl<W: Write> FullScreen<W> {
    pub fn new(out: W, size: (u16, u16)) -> Self {
        Self { out, size }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Screen for FullScreen<W> {
    fn init(&mut self) -> Result<()> {
        self.out.queue(terminal::EnterAlternateScreen)?;
        self.out.queue(cursor::Hide)?;
        self.out.queue(terminal::Clear(ClearType::All))?;
        self.out.flush()?;
        Ok(())
    }

    fn cleanup(&mut self) -> Result<()> {
        self.out.queue(style::ResetColor)?;
        self.out.queue(style::SetAttribute(Attribute::Reset))?;
        self.out.queue(cursor::Show)?;
        self.out.queue(terminal::LeaveAlternateScreen)?;
        self.out.flush()?;
        Ok(())
    }

    fn put(&mut self, row: usize, col: usize, text: &str, attr: Style) -> Result<()> {
        let (cols, rows) = self.size;
        let (Ok(x), Ok(y)) = (u16::try_from(col), u16::try_from(row)) else {
            return Ok(());
        };
        if x >= cols || y >= rows {
            return Ok(());
        }

        self.out.queue(cursor::MoveTo(x, y))?;
        match attr {
            Style::Normal => {}
            Style::Dim => {
                self.out.queue(style::SetAttribute(Attribute::Dim))?;
            }
            Style::HintPrimary => {
                self.out.queue(style::SetAttribute(Attribute::Bold))?;
                self.out.queue(style::SetForegroundColor(Color::Red))?;
            }
            Style::HintSecondary => {
                self.out.queue(style::SetAttribute(Attribute::Bold))?;
                self.out.queue(style::SetForegroundColor(Color::Green))?;
            }
        }
        self.out.queue(style::Print(text))?;
        if attr != Style::Normal {
            self.out.queue(style::SetAttribute(Attribute::Reset))?;
            self.out.queue(style::ResetColor)?;
        }
        Ok(())
    }

    fn refresh(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_outside_terminal_are_dropped() {
        let mut screen = FullScreen::new(Vec::new(), (10, 5));
        screen.put(5, 0, "x", Style::Normal).unwrap();
        screen.put(0, 10, "x", Style::Normal).unwrap();
        assert!(screen.into_inner().is_empty());
    }

    #[test]
    fn hint_text_is_written() {
        let mut screen = FullScreen::new(Vec::new(), (10, 5));
        screen.put(1, 2, "q", Style::HintPrimary).unwrap();
        let out = String::from_utf8(screen.into_inner()).unwrap();
        assert!(out.starts_with("\x1b[2;3H"));
        assert!(out.contains('q'));
    }

    #[test]
    fn cleanup_shows_cursor_and_leaves_alternate_screen() {
        let mut screen = FullScreen::new(Vec::new(), (10, 5));
        screen.init().unwrap();
        screen.cleanup().unwrap();
        let out = String::from_utf8(screen.into_inner()).unwrap();
        assert!(out.contains("\x1b[?25l"));
        assert!(out.contains("\x1b[?25h"));
        assert!(out.contains("\x1b[?1049l"));
    }
}
