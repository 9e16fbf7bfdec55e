//! Controlling-terminal mode while keys are being read.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use crossterm::terminal;

/// RAII guard for raw mode.
///
/// Raw mode delivers every key immediately and turns Ctrl-C into an ordinary key press, so
/// an interrupt goes through the normal cancel path and every guard still gets dropped.
pub struct RawModeGuard;

impl RawModeGuard {
    pub fn new() -> Result<Self> {
        terminal::enable_raw_mode().context("enable_raw_mode failed")?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

/// Raised by SIGINT or SIGTERM instead of letting the signal kill the process.
///
/// The key reader polls it and turns a raised flag into a cancel, so the screen and raw-mode
/// guards unwind normally.
#[derive(Clone, Default)]
pub struct InterruptFlag(Arc<AtomicBool>);

impl InterruptFlag {
    /// Route SIGINT and SIGTERM into a fresh flag.
    pub fn install() -> Result<Self> {
        let flag = Self::default();
        #[cfg(unix)]
        for signal in [signal_hook::consts::SIGINT, signal_hook::consts::SIGTERM] {
            signal_hook::flag::register(signal, Arc::clone(&flag.0))
                .with_context(|| format!("registering handler for signal {signal}"))?;
        }
        Ok(flag)
    }

    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    #[cfg(test)]
    pub fn raise(&self) {
        self.0.store(true, Ordering::Relaxed);
    }
}
