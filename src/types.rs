//! Common types used throughout the jump session.

use std::str::FromStr;

use crate::errors::Error;

/// How many characters the user types to describe the jump target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    /// `s`: one character.
    Single,
    /// `s2`: two characters.
    Double,
}

/// Parses the motion name used on the command line and in the tmux options.
impl FromStr for SearchMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "s" => Ok(Self::Single),
            "s2" => Ok(Self::Double),
            _ => Err(Error::Config {
                message: format!("invalid motion type {s:?}, expected `s` or `s2`"),
            }),
        }
    }
}

impl SearchMode {
    /// Number of pattern characters this mode reads.
    pub fn pattern_len(self) -> usize {
        match self {
            Self::Single => 1,
            Self::Double => 2,
        }
    }
}

/// One tmux pane as seen at startup.
///
/// Coordinates are screen cells: `start_y`/`start_x` are the pane origin on the client
/// terminal, `cursor_y`/`cursor_x` are relative to that origin.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pane {
    pub id: String,
    pub active: bool,
    pub start_y: usize,
    pub start_x: usize,
    pub height: usize,
    pub width: usize,
    pub copy_mode: bool,
    pub scroll_position: usize,
    pub cursor_y: usize,
    pub cursor_x: usize,
    /// Captured visible text, one entry per screen row.
    pub lines: Vec<String>,
}

impl Pane {
    /// Column just past the pane's right edge.
    pub fn right_edge(&self) -> usize {
        self.start_x + self.width
    }

    /// Row just past the pane's bottom edge.
    pub fn bottom_edge(&self) -> usize {
        self.start_y + self.height
    }
}

/// A search hit: index of the owning pane, line within the pane, visual column within the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Match {
    pub pane: usize,
    pub line: usize,
    pub col: usize,
}

/// Everything the renderer needs to draw and later erase one hint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HintPosition {
    /// Absolute screen row.
    pub row: usize,
    /// Absolute screen column of the matched character.
    pub col: usize,
    /// First column that belongs to the next pane (or the border).
    pub right_edge: usize,
    /// Original character under the first label cell.
    pub ch: char,
    /// Cells `ch` occupies; the second label cell starts right after it.
    pub ch_width: usize,
    /// Original character under the second label cell, `None` at end of line.
    pub next: Option<char>,
    pub label: String,
}

/// Screen attributes shared by both backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Normal,
    Dim,
    HintPrimary,
    HintSecondary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn motion_names_parse() {
        assert_eq!("s".parse::<SearchMode>().unwrap(), SearchMode::Single);
        assert_eq!("s2".parse::<SearchMode>().unwrap(), SearchMode::Double);
        assert_eq!("s2".parse::<SearchMode>().unwrap().pattern_len(), 2);
    }

    #[test]
    fn unknown_motion_is_config_error() {
        let err = "s3".parse::<SearchMode>().unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
        assert!(err.to_string().contains("s3"));
    }
}
