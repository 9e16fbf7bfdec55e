//! Keyboard input: the search pattern and hint keys.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::terminal::{InterruptFlag, RawModeGuard};

/// ETX, what Ctrl-C produces when it is written to the pattern file.
const INTERRUPT: char = '\x03';

/// How long to wait for a terminal event before checking for a signal again.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// One key as far as the jump session cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    /// Esc, Ctrl-C, or any key that cannot be part of a pattern or label.
    Cancel,
}

/// Blocking source of keys.
pub trait KeySource {
    fn next_key(&mut self) -> Result<Key>;
}

/// Map a terminal key event. Release and repeat events give `None`.
pub fn key_from_event(key: KeyEvent) -> Option<Key> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    let k = match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Key::Cancel,
        KeyCode::Char(c) => Key::Char(c),
        KeyCode::Enter => Key::Char('\n'),
        KeyCode::Tab => Key::Char('\t'),
        _ => Key::Cancel,
    };
    Some(k)
}

/// Wait for the next key from `poll`, which yields `None` when no event arrived in time.
///
/// A raised `interrupt` ends the wait with `Key::Cancel`.
fn wait_for_key(
    interrupt: &InterruptFlag,
    mut poll: impl FnMut() -> Result<Option<Event>>,
) -> Result<Key> {
    loop {
        if interrupt.is_raised() {
            log::info!("Interrupted by signal");
            return Ok(Key::Cancel);
        }
        if let Some(Event::Key(key)) = poll()? {
            if let Some(k) = key_from_event(key) {
                if k == Key::Cancel {
                    log::info!("Operation cancelled by user");
                }
                return Ok(k);
            }
        }
    }
}

/// Keys from the controlling terminal, read in raw mode.
pub struct TerminalKeys {
    interrupt: InterruptFlag,
    _raw: RawModeGuard,
}

impl TerminalKeys {
    pub fn new(interrupt: InterruptFlag) -> Result<Self> {
        Ok(Self {
            interrupt,
            _raw: RawModeGuard::new()?,
        })
    }
}

impl KeySource for TerminalKeys {
    fn next_key(&mut self) -> Result<Key> {
        wait_for_key(&self.interrupt, || {
            if event::poll(POLL_INTERVAL).context("polling for key")? {
                Ok(Some(event::read().context("reading key")?))
            } else {
                Ok(None)
            }
        })
    }
}

/// Where the search pattern comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternSource {
    /// Written to a file by the tmux key binding before the overlay starts.
    File(std::path::PathBuf),
    /// Typed on the overlay itself.
    Keys,
}

fn clean(raw: &str) -> Option<String> {
    if raw == INTERRUPT.to_string() {
        log::info!("Operation cancelled by user");
        return None;
    }
    let pattern: String = raw.chars().filter(|c| *c != '\n' && *c != '\r').collect();
    if pattern.is_empty() {
        None
    } else {
        Some(pattern)
    }
}

/// Read up to `len` characters of pattern from `path`.
///
/// `None` means the user cancelled or entered nothing.
pub fn read_pattern_file(path: &Path, len: usize) -> Result<Option<String>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read pattern file: {}", path.display()))?;
    let raw: String = content.chars().take(len).collect();
    log::debug!("raw input: {raw:?}");
    Ok(clean(&raw))
}

/// Read up to `len` pattern characters from the keyboard; Enter ends the pattern early.
pub fn read_pattern_keys(keys: &mut dyn KeySource, len: usize) -> Result<Option<String>> {
    let mut raw = String::new();
    while raw.chars().count() < len {
        match keys.next_key()? {
            Key::Cancel => return Ok(None),
            Key::Char('\n' | '\r') => break,
            Key::Char(c) => raw.push(c),
        }
    }
    Ok(clean(&raw))
}
