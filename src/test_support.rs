//! Test doubles for the tmux, screen and keyboard seams.

use std::cell::{Ref, RefCell};
use std::collections::{HashMap, HashSet, VecDeque};
use std::rc::Rc;

use anyhow::Result;

use crate::errors::{self, Error};
use crate::input::{Key, KeySource};
use crate::screen::Screen;
use crate::tmux::Tmux;
use crate::types::Style;

/// In-memory tmux that answers from canned output and records every command.
///
/// Responses are looked up by the full command line first, then by subcommand name.
#[derive(Default)]
pub struct FakeTmux {
    responses: HashMap<String, String>,
    failures: HashSet<String>,
    calls: RefCell<Vec<Vec<String>>>,
}

impl FakeTmux {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, command: &str, output: &str) -> Self {
        self.responses.insert(command.to_string(), output.to_string());
        self
    }

    pub fn fail(mut self, command: &str) -> Self {
        self.failures.insert(command.to_string());
        self
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.borrow().clone()
    }

    /// Recorded commands whose subcommand is `name`.
    pub fn calls_to(&self, name: &str) -> Vec<Vec<String>> {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.first().is_some_and(|n| n == name))
            .cloned()
            .collect()
    }
}

impl Tmux for FakeTmux {
    fn run(&self, args: &[&str]) -> errors::Result<String> {
        self.calls
            .borrow_mut()
            .push(args.iter().map(|a| (*a).to_string()).collect());

        let name = args.first().copied().unwrap_or_default();
        if self.failures.contains(name) {
            return Err(Error::Tmux {
                message: format!("stub error for {name}"),
            });
        }
        let full = args.join(" ");
        Ok(self
            .responses
            .get(&full)
            .or_else(|| self.responses.get(name))
            .cloned()
            .unwrap_or_default())
    }
}

/// Everything a `GridScreen` has been asked to do.
#[derive(Default)]
pub struct GridState {
    pub cells: HashMap<(usize, usize), (char, Style)>,
    pub writes: Vec<(usize, usize, String, Style)>,
    pub inits: usize,
    pub cleanups: usize,
    pub refreshes: usize,
}

/// Screen that keeps a cell grid in memory. Clones share the same grid.
#[derive(Clone, Default)]
pub struct GridScreen {
    state: Rc<RefCell<GridState>>,
}

impl GridScreen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> Ref<'_, GridState> {
        self.state.borrow()
    }

    /// Forget recorded writes, keeping the grid.
    pub fn take_writes(&self) -> Vec<(usize, usize, String, Style)> {
        std::mem::take(&mut self.state.borrow_mut().writes)
    }

    pub fn char_at(&self, row: usize, col: usize) -> Option<char> {
        self.state.borrow().cells.get(&(row, col)).map(|(c, _)| *c)
    }

    pub fn style_at(&self, row: usize, col: usize) -> Option<Style> {
        self.state.borrow().cells.get(&(row, col)).map(|(_, s)| *s)
    }

    /// `len` cells of `row` starting at `col`, blanks for untouched cells.
    pub fn text(&self, row: usize, col: usize, len: usize) -> String {
        (col..col + len)
            .map(|c| self.char_at(row, c).unwrap_or(' '))
            .collect()
    }
}

impl Screen for GridScreen {
    fn init(&mut self) -> Result<()> {
        self.state.borrow_mut().inits += 1;
        Ok(())
    }

    fn cleanup(&mut self) -> Result<()> {
        self.state.borrow_mut().cleanups += 1;
        Ok(())
    }

    fn put(&mut self, row: usize, col: usize, text: &str, style: Style) -> Result<()> {
        let mut state = self.state.borrow_mut();
        for (i, ch) in text.chars().enumerate() {
            state.cells.insert((row, col + i), (ch, style));
        }
        state.writes.push((row, col, text.to_string(), style));
        Ok(())
    }

    fn refresh(&mut self) -> Result<()> {
        self.state.borrow_mut().refreshes += 1;
        Ok(())
    }
}

/// Keyboard that replays a fixed script, then cancels.
pub struct ScriptedKeys {
    keys: VecDeque<Key>,
    pub reads: usize,
}

impl ScriptedKeys {
    pub fn new(keys: &str) -> Self {
        Self {
            keys: keys.chars().map(Key::Char).collect(),
            reads: 0,
        }
    }

    pub fn with(keys: Vec<Key>) -> Self {
        Self {
            keys: keys.into(),
            reads: 0,
        }
    }
}

impl KeySource for ScriptedKeys {
    fn next_key(&mut self) -> Result<Key> {
        self.reads += 1;
        Ok(self.keys.pop_front().unwrap_or(Key::Cancel))
    }
}
