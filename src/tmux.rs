//! The tmux collaborator: a narrow command seam plus the queries built on it.
//!
//! Every call is a blocking `tmux` subprocess. Failures are fatal for the invocation and are
//! never retried, since tmux state is authoritative and short-lived.

use std::collections::HashMap;
use std::process::Command;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;

use crate::errors::{Error, Result};
use crate::types::Pane;

/// Anything that can run a tmux command and hand back its stdout.
pub trait Tmux {
    fn run(&self, args: &[&str]) -> Result<String>;
}

/// Runs the real `tmux` binary found on `PATH`.
pub struct CliTmux;

impl Tmux for CliTmux {
    fn run(&self, args: &[&str]) -> Result<String> {
        let output = Command::new("tmux")
            .args(args)
            .output()
            .map_err(|e| Error::Tmux {
                message: format!("failed to spawn tmux: {e}"),
            })?;

        log::debug!("command: tmux {}", args.join(" "));
        if output.status.success() {
            let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
            log::debug!("result: {stdout}");
            Ok(stdout)
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            log::error!("tmux {} failed: {stderr}", args.join(" "));
            Err(Error::Tmux { message: stderr })
        }
    }
}

/// Fields requested from `list-panes`, in the order `parse_panes` expects them.
pub const PANE_FORMAT: &str = "#{pane_id},#{window_zoomed_flag},#{pane_active},\
#{pane_top},#{pane_height},#{pane_left},#{pane_width},\
#{pane_in_mode},#{scroll_position},\
#{cursor_y},#{cursor_x},#{copy_cursor_y},#{copy_cursor_x}";

const PANE_FIELDS: usize = 13;

fn number<T: FromStr>(value: &str, name: &str) -> Result<T> {
    value.trim().parse().map_err(|_| Error::Parse {
        message: format!("invalid {name}: {value:?}"),
    })
}

/// Like `number`, but tmux leaves some fields empty outside copy-mode.
fn number_or_zero(value: &str, name: &str) -> Result<usize> {
    if value.trim().is_empty() {
        Ok(0)
    } else {
        number(value, name)
    }
}

/// Parse `list-panes -F PANE_FORMAT` output.
///
/// In a zoomed window only the active pane is kept. The cursor is the copy-mode cursor for
/// panes in copy-mode and the regular cursor otherwise.
pub fn parse_panes(output: &str) -> Result<Vec<Pane>> {
    let mut panes = Vec::new();
    for line in output.lines().filter(|l| !l.trim().is_empty()) {
        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() != PANE_FIELDS {
            return Err(Error::Parse {
                message: format!("expected {PANE_FIELDS} pane fields, got {}: {line:?}", fields.len()),
            });
        }

        let zoomed = fields[1] == "1";
        let active = fields[2] == "1";
        if zoomed && !active {
            continue;
        }

        let copy_mode = fields[7] == "1";
        let (cursor_y, cursor_x) = if copy_mode {
            (number_or_zero(fields[11], "copy_cursor_y")?, number_or_zero(fields[12], "copy_cursor_x")?)
        } else {
            (number_or_zero(fields[9], "cursor_y")?, number_or_zero(fields[10], "cursor_x")?)
        };

        panes.push(Pane {
            id: fields[0].to_string(),
            active,
            start_y: number(fields[3], "pane_top")?,
            height: number(fields[4], "pane_height")?,
            start_x: number(fields[5], "pane_left")?,
            width: number(fields[6], "pane_width")?,
            copy_mode,
            scroll_position: number_or_zero(fields[8], "scroll_position")?,
            cursor_y,
            cursor_x,
            lines: Vec::new(),
        });
    }
    Ok(panes)
}

/// Geometry and cursor state of every pane in the current window.
pub fn list_panes(tmux: &dyn Tmux) -> Result<Vec<Pane>> {
    parse_panes(&tmux.run(&["list-panes", "-F", PANE_FORMAT])?)
}

/// Visible text of `pane`, one string per row, at most `pane.height` rows.
///
/// A pane scrolled back in copy-mode is captured at its scroll offset.
pub fn capture_pane(tmux: &dyn Tmux, pane: &Pane) -> Result<Vec<String>> {
    if pane.height == 0 || pane.width == 0 {
        return Ok(Vec::new());
    }

    let start;
    let end;
    let mut args = vec!["capture-pane", "-p", "-t", pane.id.as_str()];
    if pane.scroll_position > 0 {
        let scroll = pane.scroll_position as i64;
        start = (-scroll).to_string();
        end = (-(scroll - pane.height as i64 + 1)).to_string();
        args.extend(["-S", start.as_str(), "-E", end.as_str()]);
    }

    let output = tmux.run(&args)?;
    let body = output.strip_suffix('\n').unwrap_or(&output);
    Ok(body
        .split('\n')
        .take(pane.height)
        .map(ToString::to_string)
        .collect())
}

/// Parse `display-message -p '#{client_width},#{client_height}'` into usable (width, height).
///
/// One row is taken off the height for the status line.
pub fn parse_client_size(output: &str) -> Result<(usize, usize)> {
    let (w, h) = output.trim().split_once(',').ok_or_else(|| Error::Parse {
        message: format!("invalid client size: {output:?}"),
    })?;
    let width: usize = number(w, "client_width")?;
    let height: usize = number(h, "client_height")?;
    Ok((width, height.saturating_sub(1)))
}

pub fn client_size(tmux: &dyn Tmux) -> Result<(usize, usize)> {
    parse_client_size(&tmux.run(&["display-message", "-p", "#{client_width},#{client_height}"])?)
}

/// Put the copy-mode cursor of `pane` on `line` (visible row) and character index `col`.
///
/// The commands run in order: select pane, enter copy-mode, top line, down, start of line,
/// right. Going to the start of the line after moving down keeps wrapped logical lines from
/// pulling the cursor back to their first row.
pub fn move_cursor(tmux: &dyn Tmux, pane: &Pane, line: usize, col: usize) -> Result<()> {
    let id = pane.id.as_str();
    let line_arg = line.to_string();
    let col_arg = col.to_string();

    let mut cmds: Vec<Vec<&str>> = vec![vec!["select-pane", "-t", id]];
    if !pane.copy_mode {
        cmds.push(vec!["copy-mode", "-t", id]);
    }
    cmds.push(vec!["send-keys", "-X", "-t", id, "top-line"]);
    if line > 0 {
        cmds.push(vec!["send-keys", "-X", "-t", id, "-N", line_arg.as_str(), "cursor-down"]);
    }
    cmds.push(vec!["send-keys", "-X", "-t", id, "start-of-line"]);
    if col > 0 {
        cmds.push(vec!["send-keys", "-X", "-t", id, "-N", col_arg.as_str(), "cursor-right"]);
    }

    for cmd in cmds {
        tmux.run(&cmd)?;
    }
    Ok(())
}

/// Show a transient message in the tmux status line.
pub fn display_message(tmux: &dyn Tmux, message: &str) -> Result<()> {
    tmux.run(&["display-message", message]).map(|_| ())
}

pub fn select_window(tmux: &dyn Tmux, target: &str) -> Result<()> {
    tmux.run(&["select-window", "-t", target]).map(|_| ())
}

/// Parse `show-options -g` output into name → value.
///
/// tmux quotes values containing special characters; the quotes are removed.
pub fn parse_options(output: &str) -> HashMap<String, String> {
    output
        .lines()
        .filter_map(|line| {
            let line = line.trim();
            if line.is_empty() {
                return None;
            }
            let (name, value) = line.split_once(' ').unwrap_or((line, ""));
            Some((name.to_string(), unquote(value.trim())))
        })
        .collect()
}

fn unquote(value: &str) -> String {
    let bytes = value.as_bytes();
    if bytes.len() >= 2 && bytes[0] == bytes[bytes.len() - 1] && (bytes[0] == b'"' || bytes[0] == b'\'') {
        let inner = &value[1..value.len() - 1];
        if bytes[0] == b'"' {
            return inner.replace("\\\"", "\"").replace("\\\\", "\\");
        }
        return inner.to_string();
    }
    value.to_string()
}

/// All global options in one call.
pub fn show_options(tmux: &dyn Tmux) -> Result<HashMap<String, String>> {
    Ok(parse_options(&tmux.run(&["show-options", "-g"])?))
}

/// Extract `(major, minor)` from `tmux -V` output.
///
/// Development builds (`master`) and OpenBSD's base tmux (`openbsd-6.6`) report no usable
/// version and give `(0, 0)`, as does anything unparsable.
pub fn parse_version(output: &str) -> (u32, u32) {
    static VERSION: OnceLock<Regex> = OnceLock::new();

    if output.contains("openbsd-") || output.contains("master") {
        return (0, 0);
    }
    let re = VERSION.get_or_init(|| Regex::new(r"(?:next-)?(\d+)\.(\d+)").expect("static regex"));
    re.captures(output)
        .and_then(|c| Some((c[1].parse().ok()?, c[2].parse().ok()?)))
        .unwrap_or((0, 0))
}

/// Detected tmux version, `(0, 0)` when tmux cannot tell us.
pub fn version(tmux: &dyn Tmux) -> (u32, u32) {
    tmux.run(&["-V"]).map_or((0, 0), |out| parse_version(&out))
}
