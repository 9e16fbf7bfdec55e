//! Error types for the tmux and configuration layers.

use thiserror::Error;

/// Convenience result type for the tmux/config layer.
pub type Result<T> = std::result::Result<T, Error>;

/// Failures talking to tmux or interpreting what it told us.
#[derive(Debug, Error)]
pub enum Error {
    /// tmux could not be spawned or exited non-zero.
    #[error("tmux error: {message}")]
    Tmux { message: String },

    /// tmux output did not have the expected shape.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// A configuration value is unusable.
    #[error("config error: {message}")]
    Config { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
