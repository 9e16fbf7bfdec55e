//! Visual width of characters and strings as tmux draws them.
//!
//! Pane text comes back from `capture-pane` as plain strings, but hints are placed in screen
//! cells. Wide (CJK) characters take two cells and tabs take up to eight, so every mapping
//! between a string index ("true" column) and a screen column goes through here.

use std::cell::RefCell;
use std::collections::HashMap;
use unicode_width::UnicodeWidthChar;

/// Distance between tab stops.
pub const TAB_STOP: usize = 8;

/// How tmux renders a tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabMode {
    /// Always eight cells (tmux before 3.6).
    Fixed,
    /// Advance to the next multiple of eight (tmux 3.6 and later).
    PositionAware,
}

/// Width of a tab that starts at visual column `position`.
pub fn tab_width(position: usize) -> usize {
    TAB_STOP - (position % TAB_STOP)
}

/// Two cells for East Asian Wide/Fullwidth characters, one for everything else.
pub fn east_asian_width(ch: char) -> usize {
    match UnicodeWidthChar::width(ch) {
        Some(2) => 2,
        _ => 1,
    }
}

/// Memoized width calculator.
///
/// Owned by the session and shared by reference with the matcher and the renderer, which
/// both ask for the width of every visible character on every frame.
pub struct Widths {
    tabs: TabMode,
    chars: RefCell<HashMap<char, usize>>,
    strings: RefCell<HashMap<String, usize>>,
}

impl Widths {
    pub fn new(tabs: TabMode) -> Self {
        Self {
            tabs,
            chars: RefCell::new(HashMap::new()),
            strings: RefCell::new(HashMap::new()),
        }
    }

    /// Width of `ch` when drawn at visual column `position`.
    ///
    /// `position` only matters for tabs in position-aware mode.
    pub fn char_width(&self, ch: char, position: usize) -> usize {
        if ch == '\t' {
            return match self.tabs {
                TabMode::Fixed => TAB_STOP,
                TabMode::PositionAware => tab_width(position),
            };
        }
        let cached = self.chars.borrow().get(&ch).copied();
        if let Some(w) = cached {
            return w;
        }
        let w = east_asian_width(ch);
        self.chars.borrow_mut().insert(ch, w);
        w
    }

    /// Total visual width of `s` starting at column 0.
    pub fn string_width(&self, s: &str) -> usize {
        let cached = self.strings.borrow().get(s).copied();
        if let Some(w) = cached {
            return w;
        }
        let w = s.chars().fold(0, |pos, ch| pos + self.char_width(ch, pos));
        self.strings.borrow_mut().insert(s.to_string(), w);
        w
    }

    /// Visual column at which each character of `chars` starts.
    pub fn columns(&self, chars: &[char]) -> Vec<usize> {
        let mut cols = Vec::with_capacity(chars.len());
        let mut pos = 0;
        for &ch in chars {
            cols.push(pos);
            pos += self.char_width(ch, pos);
        }
        cols
    }

    /// Translate a visual column into a character index of `line`.
    ///
    /// Returns the index of the first character whose cumulative width reaches `target`, or
    /// the character count when the line is shorter than `target`.
    pub fn visual_to_true_offset(&self, line: &str, target: usize) -> usize {
        let mut visual = 0;
        let mut true_pos = 0;
        let mut chars = line.chars();
        while visual < target {
            let Some(ch) = chars.next() else { break };
            visual += self.char_width(ch, visual);
            true_pos += 1;
        }
        true_pos
    }

    /// Drop all memoized widths.
    #[cfg(test)]
    pub fn clear(&self) {
        self.chars.borrow_mut().clear();
        self.strings.borrow_mut().clear();
    }
}
