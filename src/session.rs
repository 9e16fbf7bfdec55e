//! One jump, from reading the search pattern to moving the tmux cursor.
//!
//! The session walks through a small state machine:
//!
//! ```text
//! AwaitingSearchInput ─▶ AwaitingFirstKey ─▶ AwaitingSecondKey ─▶ Done
//!          │                    │                    │
//!          └────────────────────┴────────────────────┴──────────▶ Done
//! ```
//!
//! No match, a single match, an unknown key, or a complete label all end in `Done`. The
//! caller owns the screen guard, so leaving `run` by any path restores the terminal.

use anyhow::Result;

use crate::config::Config;
use crate::errors;
use crate::hints::{self, Assignment};
use crate::input::{self, Key, KeySource, PatternSource};
use crate::matcher;
use crate::render::{self, Borders, PadCache};
use crate::screen::Screen;
use crate::tmux::{self, Tmux};
use crate::types::{HintPosition, Match, Pane, SearchMode};
use crate::utils::timed;
use crate::width::Widths;

/// How a session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Empty pattern, Esc/Ctrl-C, a key outside the hint alphabet, or no label left.
    Cancelled,
    NoMatch,
    /// The cursor of `pane` was moved to `line` and character index `col`.
    Jumped { pane: String, line: usize, col: usize },
}

/// Hints currently on screen.
struct Overlay {
    assignment: Assignment,
    positions: Vec<HintPosition>,
    term_height: usize,
}

enum Phase {
    AwaitingSearchInput,
    AwaitingFirstKey(Overlay),
    AwaitingSecondKey(Overlay, String),
    Done(Outcome),
}

/// Query every pane and capture the text of the visible ones.
pub fn init_panes(tmux: &dyn Tmux) -> errors::Result<Vec<Pane>> {
    let mut panes = Vec::new();
    for mut pane in tmux::list_panes(tmux)? {
        if pane.height == 0 || pane.width == 0 {
            continue;
        }
        pane.lines = tmux::capture_pane(tmux, &pane)?;
        panes.push(pane);
    }
    Ok(panes)
}

pub struct Session<'a> {
    config: &'a Config,
    tmux: &'a dyn Tmux,
    widths: Widths,
    pads: PadCache,
    panes: Vec<Pane>,
    term_height: Option<usize>,
    panes_drawn: bool,
}

impl<'a> Session<'a> {
    /// Snapshot the current tmux window.
    pub fn new(config: &'a Config, tmux: &'a dyn Tmux) -> Result<Self> {
        let panes = timed(config.perf, "init_panes", || init_panes(tmux))?;
        Ok(Self::with_panes(config, tmux, panes))
    }

    pub fn with_panes(config: &'a Config, tmux: &'a dyn Tmux, panes: Vec<Pane>) -> Self {
        Self {
            config,
            tmux,
            widths: Widths::new(config.tab_mode),
            pads: PadCache::new(),
            panes,
            term_height: None,
            panes_drawn: false,
        }
    }

    /// Drive the session to completion.
    pub fn run(
        &mut self,
        mode: SearchMode,
        source: &PatternSource,
        screen: &mut dyn Screen,
        keys: &mut dyn KeySource,
    ) -> Result<Outcome> {
        let mut phase = Phase::AwaitingSearchInput;
        loop {
            phase = match phase {
                Phase::AwaitingSearchInput => self.search(mode, source, screen, keys)?,
                Phase::AwaitingFirstKey(overlay) => self.pick(overlay, String::new(), screen, keys)?,
                Phase::AwaitingSecondKey(overlay, typed) => self.pick(overlay, typed, screen, keys)?,
                Phase::Done(outcome) => return Ok(outcome),
            };
        }
    }

    fn term_height(&mut self) -> Result<usize> {
        if let Some(h) = self.term_height {
            return Ok(h);
        }
        let (_, h) = tmux::client_size(self.tmux)?;
        self.term_height = Some(h);
        Ok(h)
    }

    fn draw_panes(&mut self, screen: &mut dyn Screen) -> Result<()> {
        if self.panes_drawn {
            return Ok(());
        }
        let term_height = self.term_height()?;
        let borders = Borders {
            vertical: &self.config.vertical_border,
            horizontal: &self.config.horizontal_border,
        };
        timed(self.config.perf, "draw_panes", || {
            render::draw_panes(screen, &self.panes, term_height, &self.widths, &mut self.pads, &borders)
        })?;
        self.panes_drawn = true;
        Ok(())
    }

    /// Cursor of the active pane in absolute screen cells.
    fn cursor(&self) -> (usize, usize) {
        self.panes
            .iter()
            .find(|p| p.active)
            .or_else(|| self.panes.first())
            .map_or((0, 0), |p| (p.start_y + p.cursor_y, p.start_x + p.cursor_x))
    }

    fn search(
        &mut self,
        mode: SearchMode,
        source: &PatternSource,
        screen: &mut dyn Screen,
        keys: &mut dyn KeySource,
    ) -> Result<Phase> {
        let pattern = match source {
            PatternSource::File(path) => input::read_pattern_file(path, mode.pattern_len())?,
            PatternSource::Keys => {
                self.draw_panes(screen)?;
                input::read_pattern_keys(keys, mode.pattern_len())?
            }
        };
        let Some(pattern) = pattern else {
            return Ok(Phase::Done(Outcome::Cancelled));
        };
        log::debug!("search pattern: {pattern:?}");

        let matches = timed(self.config.perf, "Finding matches", || {
            matcher::find_matches(
                &self.panes,
                &pattern,
                self.config.case_sensitive,
                self.config.smartsign,
                &self.widths,
            )
        });

        match matches.as_slice() {
            [] => {
                tmux::display_message(self.tmux, "no match")?;
                return Ok(Phase::Done(Outcome::NoMatch));
            }
            [only] => return Ok(Phase::Done(self.jump(*only)?)),
            _ => {}
        }

        let (cursor_y, cursor_x) = self.cursor();
        log::debug!("cursor position: {cursor_y}, {cursor_x}");
        let assignment = hints::assign_labels(&matches, &self.panes, cursor_y, cursor_x, &self.config.hints);
        let positions = hints::build_positions(&assignment, &self.panes, &self.widths);

        let term_height = self.term_height()?;
        self.draw_panes(screen)?;
        timed(self.config.perf, "Drawing hints", || {
            render::draw_hints(screen, &positions, term_height)
        })?;
        if matches!(source, PatternSource::File(_)) {
            // Launched in a detached window; show it now that it is fully drawn.
            tmux::select_window(self.tmux, "{end}")?;
        }

        Ok(Phase::AwaitingFirstKey(Overlay {
            assignment,
            positions,
            term_height,
        }))
    }

    fn pick(
        &mut self,
        overlay: Overlay,
        mut typed: String,
        screen: &mut dyn Screen,
        keys: &mut dyn KeySource,
    ) -> Result<Phase> {
        let ch = match keys.next_key()? {
            Key::Char(c) if self.config.hints.contains(&c) => c,
            _ => return Ok(Phase::Done(Outcome::Cancelled)),
        };
        typed.push(ch);

        if let Some(target) = overlay.assignment.get(&typed) {
            return Ok(Phase::Done(self.jump(target)?));
        }
        if typed.chars().count() >= 2 || !overlay.assignment.has_prefix(&typed) {
            return Ok(Phase::Done(Outcome::Cancelled));
        }

        render::update_hints(screen, &overlay.positions, &typed, overlay.term_height)?;
        Ok(Phase::AwaitingSecondKey(overlay, typed))
    }

    fn jump(&self, target: Match) -> Result<Outcome> {
        let pane = &self.panes[target.pane];
        let line = pane.lines.get(target.line).map_or("", String::as_str);
        let col = self.widths.visual_to_true_offset(line, target.col);
        tmux::move_cursor(self.tmux, pane, target.line, col)?;
        Ok(Outcome::Jumped {
            pane: pane.id.clone(),
            line: target.line,
            col,
        })
    }
}
