//! Utility functions.

use std::path::PathBuf;
use std::time::Instant;

/// Run `f`, logging how long it took when perf logging is on.
pub fn timed<T>(enabled: bool, name: &str, f: impl FnOnce() -> T) -> T {
    if !enabled {
        return f();
    }
    let start = Instant::now();
    let result = f();
    log::info!("{name} took: {:.3} seconds", start.elapsed().as_secs_f64());
    result
}

/// Where debug and perf logs go: `~/easymotion.log`.
pub fn log_file_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join("easymotion.log"))
}
