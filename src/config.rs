//! User configuration, read once at startup.
//!
//! Each setting is looked up as an environment variable first (`TMUX_EASYMOTION_*`), then as
//! a global tmux user option (`@easymotion-*`), then falls back to its default. The result is
//! an immutable `Config` handed to every component that needs it.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use crate::errors::{Error, Result};
use crate::tmux::{self, Tmux};
use crate::types::SearchMode;
use crate::width::TabMode;

pub const DEFAULT_HINTS: &str = "asdghklqwertyuiopzxcvbnmfj;";
pub const DEFAULT_VERTICAL_BORDER: &str = "│";
pub const DEFAULT_HORIZONTAL_BORDER: &str = "─";

/// Which `Screen` implementation draws the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// Raw escape sequences over the existing screen.
    Ansi,
    /// crossterm on the alternate screen.
    FullScreen,
}

impl Backend {
    /// Short tag used in log lines.
    pub fn tag(self) -> &'static str {
        match self {
            Self::Ansi => "ANSI",
            Self::FullScreen => "CURSE",
        }
    }
}

/// Global tmux options, fetched with a single `show-options -g` on first use.
pub struct OptionCache<'a> {
    tmux: &'a dyn Tmux,
    options: RefCell<Option<HashMap<String, String>>>,
}

impl<'a> OptionCache<'a> {
    pub fn new(tmux: &'a dyn Tmux) -> Self {
        Self {
            tmux,
            options: RefCell::new(None),
        }
    }

    pub fn get(&self, name: &str) -> Result<Option<String>> {
        if self.options.borrow().is_none() {
            let fetched = tmux::show_options(self.tmux)?;
            *self.options.borrow_mut() = Some(fetched);
        }
        Ok(self
            .options
            .borrow()
            .as_ref()
            .and_then(|opts| opts.get(name).cloned()))
    }

    /// Forget fetched options; the next `get` asks tmux again.
    #[cfg(test)]
    pub fn clear(&self) {
        self.options.borrow_mut().take();
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Hint alphabet, in label priority order.
    pub hints: Vec<char>,
    pub case_sensitive: bool,
    pub smartsign: bool,
    pub vertical_border: String,
    pub horizontal_border: String,
    pub backend: Backend,
    pub debug: bool,
    pub perf: bool,
    /// Mode used when none is given on the command line.
    pub motion: SearchMode,
    pub tab_mode: TabMode,
}

/// One setting's environment variable and tmux option names.
struct Setting {
    env: &'static str,
    option: &'static str,
}

const HINTS: Setting = Setting { env: "TMUX_EASYMOTION_HINTS", option: "@easymotion-hints" };
const CASE_SENSITIVE: Setting = Setting {
    env: "TMUX_EASYMOTION_CASE_SENSITIVE",
    option: "@easymotion-case-sensitive",
};
const SMARTSIGN: Setting = Setting { env: "TMUX_EASYMOTION_SMARTSIGN", option: "@easymotion-smartsign" };
const VERTICAL_BORDER: Setting = Setting {
    env: "TMUX_EASYMOTION_VERTICAL_BORDER",
    option: "@easymotion-vertical-border",
};
const HORIZONTAL_BORDER: Setting = Setting {
    env: "TMUX_EASYMOTION_HORIZONTAL_BORDER",
    option: "@easymotion-horizontal-border",
};
const USE_CURSES: Setting = Setting { env: "TMUX_EASYMOTION_USE_CURSES", option: "@easymotion-use-curses" };
const DEBUG: Setting = Setting { env: "TMUX_EASYMOTION_DEBUG", option: "@easymotion-debug" };
const PERF: Setting = Setting { env: "TMUX_EASYMOTION_PERF", option: "@easymotion-perf" };
const MOTION_TYPE: Setting = Setting {
    env: "TMUX_EASYMOTION_MOTION_TYPE",
    option: "@easymotion-motion-type",
};

/// Version from which tmux advances tabs to the next tab stop.
const POSITION_AWARE_TABS: (u32, u32) = (3, 6);

struct Lookup<'a, 'b> {
    options: &'a OptionCache<'b>,
    env: &'a dyn Fn(&str) -> Option<String>,
}

impl Lookup<'_, '_> {
    fn raw(&self, setting: &Setting) -> Result<Option<String>> {
        if let Some(v) = (self.env)(setting.env) {
            return Ok(Some(v));
        }
        self.options.get(setting.option)
    }

    fn string(&self, setting: &Setting, default: &str) -> Result<String> {
        Ok(self.raw(setting)?.unwrap_or_else(|| default.to_string()))
    }

    fn flag(&self, setting: &Setting) -> Result<bool> {
        Ok(self.raw(setting)?.is_some_and(|v| v.eq_ignore_ascii_case("true")))
    }
}

fn parse_hints(value: &str) -> Result<Vec<char>> {
    let hints: Vec<char> = value.chars().collect();
    if hints.is_empty() {
        return Err(Error::Config {
            message: "hint alphabet is empty".into(),
        });
    }
    let mut seen = HashSet::new();
    if let Some(dup) = hints.iter().find(|c| !seen.insert(**c)) {
        return Err(Error::Config {
            message: format!("hint alphabet repeats {dup:?}"),
        });
    }
    Ok(hints)
}

impl Config {
    /// Resolve every setting. `env` stands in for `std::env::var`.
    pub fn load(
        options: &OptionCache<'_>,
        env: &dyn Fn(&str) -> Option<String>,
        tmux_version: (u32, u32),
    ) -> Result<Self> {
        let lookup = Lookup { options, env };

        let motion: SearchMode = lookup.string(&MOTION_TYPE, "s")?.parse()?;

        Ok(Self {
            hints: parse_hints(&lookup.string(&HINTS, DEFAULT_HINTS)?)?,
            case_sensitive: lookup.flag(&CASE_SENSITIVE)?,
            smartsign: lookup.flag(&SMARTSIGN)?,
            vertical_border: lookup.string(&VERTICAL_BORDER, DEFAULT_VERTICAL_BORDER)?,
            horizontal_border: lookup.string(&HORIZONTAL_BORDER, DEFAULT_HORIZONTAL_BORDER)?,
            backend: if lookup.flag(&USE_CURSES)? {
                Backend::FullScreen
            } else {
                Backend::Ansi
            },
            debug: lookup.flag(&DEBUG)?,
            perf: lookup.flag(&PERF)?,
            motion,
            tab_mode: if tmux_version >= POSITION_AWARE_TABS {
                TabMode::PositionAware
            } else {
                TabMode::Fixed
            },
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            hints: DEFAULT_HINTS.chars().collect(),
            case_sensitive: false,
            smartsign: false,
            vertical_border: DEFAULT_VERTICAL_BORDER.to_string(),
            horizontal_border: DEFAULT_HORIZONTAL_BORDER.to_string(),
            backend: Backend::Ansi,
            debug: false,
            perf: false,
            motion: SearchMode::Single,
            tab_mode: TabMode::PositionAware,
        }
    }
}
