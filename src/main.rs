//! `easymotion`: vim-easymotion style jumps across every pane of a tmux window.
//!
//! ## Reading guide (high level architecture)
//! - **`main()` / `run()`**: reads settings, sets up logging, and runs one jump session.
//! - **`tmux`**: everything that talks to the tmux server (pane geometry, captures, cursor moves).
//! - **`matcher` / `width`**: find the pattern in the captured text and map it to screen cells.
//! - **`hints`**: label generation and distance-ordered assignment.
//! - **`render` / `screen`**: draw the pane snapshot and the hints on an ANSI or full-screen
//!   backend; `screen::ScreenGuard` restores the terminal on every exit path (even on panic unwind).
//! - **`session::Session`**: the state machine tying the above together.

mod config;
mod errors;
mod hints;
mod input;
mod matcher;
mod render;
mod screen;
mod session;
mod terminal;
#[cfg(test)]
mod test_support;
mod tmux;
mod types;
mod utils;
mod width;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::LevelFilter;

use crate::config::{Config, OptionCache};
use crate::input::{PatternSource, TerminalKeys};
use crate::screen::ScreenGuard;
use crate::session::{Outcome, Session};
use crate::terminal::InterruptFlag;
use crate::tmux::CliTmux;
use crate::types::SearchMode;
use crate::utils::timed;

#[derive(Parser, Debug)]
#[command(name = "easymotion")]
#[command(about = "Jump to any visible character in a tmux window")]
#[command(version)]
struct Cli {
    /// Motion type: `s` (one character) or `s2` (two characters)
    motion: Option<String>,

    /// File holding the search pattern, written by the tmux key binding
    input: Option<PathBuf>,
}

/// Program entry point.
fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:?}", e);
        std::process::exit(1);
    }
}

/// Send `log` output to `~/easymotion.log` when debug or perf logging is enabled.
fn setup_logging(config: &Config) -> Result<()> {
    if !config.debug && !config.perf {
        return Ok(());
    }
    let path = utils::log_file_path().context("no home directory for the log file")?;
    let level = if config.debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let tag = config.backend.tag();

    fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "{} - {} - {} - {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                tag,
                message
            ));
        })
        .level(level)
        .chain(fern::log_file(&path).with_context(|| format!("opening {}", path.display()))?)
        .apply()
        .context("installing logger")?;
    Ok(())
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let tmux = CliTmux;

    let options = OptionCache::new(&tmux);
    let config = Config::load(&options, &|name: &str| std::env::var(name).ok(), tmux::version(&tmux))
        .context("loading configuration")?;
    setup_logging(&config)?;

    let mode = match cli.motion.as_deref() {
        Some(name) => name.parse::<SearchMode>()?,
        None => config.motion,
    };
    let source = cli.input.map_or(PatternSource::Keys, PatternSource::File);
    log::debug!("motion {mode:?}, pattern from {source:?}, tabs {:?}", config.tab_mode);

    // From here on SIGINT/SIGTERM only raise the flag, so the guards below always unwind.
    let interrupt = InterruptFlag::install()?;

    timed(config.perf, "Total execution", || -> Result<()> {
        let mut session = Session::new(&config, &tmux)?;
        let mut screen = ScreenGuard::new(screen::open(config.backend)?)?;
        // Declared after the screen so raw mode is left before the screen is torn down.
        let mut keys = TerminalKeys::new(interrupt.clone())?;

        match session.run(mode, &source, &mut *screen, &mut keys) {
            Ok(Outcome::Jumped { pane, line, col }) => {
                log::debug!("jumped to {pane} line {line} col {col}");
                Ok(())
            }
            Ok(outcome) => {
                log::debug!("session ended: {outcome:?}");
                Ok(())
            }
            Err(e) => {
                log::error!("session failed: {e:?}");
                Err(e)
            }
        }
    })
}
