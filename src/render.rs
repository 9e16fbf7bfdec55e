//! Rendering: mirroring the panes and drawing hints over them.
//!
//! Panes and borders are drawn once. After that each keystroke only rewrites the cells that
//! belong to hints, so the overlay never needs a full repaint.

use std::collections::HashMap;

use anyhow::Result;

use crate::screen::Screen;
use crate::types::{HintPosition, Pane, Style};
use crate::width::Widths;

/// Space runs used to pad short lines, keyed by length.
#[derive(Default)]
pub struct PadCache {
    pads: HashMap<usize, String>,
}

impl PadCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&mut self, len: usize) -> &str {
        self.pads.entry(len).or_insert_with(|| " ".repeat(len))
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.pads.len()
    }

    #[cfg(test)]
    pub fn clear(&mut self) {
        self.pads.clear();
    }
}

/// Glyphs used between panes.
pub struct Borders<'a> {
    pub vertical: &'a str,
    pub horizontal: &'a str,
}

/// Pad `line` with spaces to exactly `width` cells, cutting it first when it is wider.
fn fit_line(line: &str, width: usize, widths: &Widths, pads: &mut PadCache) -> String {
    let visual = widths.string_width(line);
    if visual <= width {
        let mut out = String::with_capacity(line.len() + width - visual);
        out.push_str(line);
        if visual < width {
            out.push_str(pads.get(width - visual));
        }
        return out;
    }

    let mut out = String::with_capacity(line.len());
    let mut used = 0;
    for ch in line.chars() {
        let w = widths.char_width(ch, used);
        if used + w > width {
            break;
        }
        out.push(ch);
        used += w;
    }
    if used < width {
        out.push_str(pads.get(width - used));
    }
    out
}

/// Is there a pane below `pane` that shares at least one of its columns?
fn has_pane_below(pane: &Pane, panes: &[Pane]) -> bool {
    panes.iter().any(|other| {
        other.start_y >= pane.bottom_edge()
            && other.start_x < pane.right_edge()
            && pane.start_x < other.right_edge()
    })
}

/// Draw every pane's text at its screen offset, plus dim borders between panes.
///
/// Panes are drawn top to bottom (by bottom edge) and clipped to `term_height`.
pub fn draw_panes(
    screen: &mut dyn Screen,
    panes: &[Pane],
    term_height: usize,
    widths: &Widths,
    pads: &mut PadCache,
    borders: &Borders<'_>,
) -> Result<()> {
    let max_x = panes.iter().map(Pane::right_edge).max().unwrap_or(0);
    let mut sorted: Vec<&Pane> = panes.iter().collect();
    sorted.sort_by_key(|p| p.bottom_edge());

    for pane in sorted {
        let visible_height = pane.height.min(term_height.saturating_sub(pane.start_y));

        for (y, line) in pane.lines.iter().take(visible_height).enumerate() {
            let text = fit_line(line, pane.width, widths, pads);
            screen.put(pane.start_y + y, pane.start_x, &text, Style::Normal)?;
        }

        if pane.right_edge() < max_x {
            for y in pane.start_y..pane.start_y + visible_height {
                screen.put(y, pane.right_edge(), borders.vertical, Style::Dim)?;
            }
        }

        let end_y = pane.start_y + visible_height;
        if end_y < term_height && has_pane_below(pane, panes) {
            let rule = borders.horizontal.repeat(pane.width);
            screen.put(end_y, pane.start_x, &rule, Style::Dim)?;
        }
    }

    screen.refresh()
}

/// Draw the first label key of every hint, and the second one when it fits inside the pane.
pub fn draw_hints(screen: &mut dyn Screen, positions: &[HintPosition], term_height: usize) -> Result<()> {
    for pos in positions.iter().filter(|p| p.row < term_height) {
        let mut label = pos.label.chars();
        let Some(first) = label.next() else { continue };
        screen.put(pos.row, pos.col, &first.to_string(), Style::HintPrimary)?;

        if let Some(second) = label.next() {
            let next_x = pos.col + pos.ch_width;
            if next_x < pos.right_edge {
                screen.put(pos.row, next_x, &second.to_string(), Style::HintSecondary)?;
            }
        }
    }
    screen.refresh()
}

/// Put back the original character after the hint cell, or a space past the end of the line.
fn restore_next(screen: &mut dyn Screen, pos: &HintPosition) -> Result<()> {
    let next_x = pos.col + pos.ch_width;
    if next_x < pos.right_edge {
        let restore = pos.next.unwrap_or(' ');
        screen.put(pos.row, next_x, &restore.to_string(), Style::Normal)?;
    }
    Ok(())
}

/// Update hints after the user typed `typed`.
///
/// Hints still reachable from `typed` shift their remaining key into the first cell; all
/// other hints are erased back to the original text. Only hint cells are written.
///
/// Every second cell is restored before any first cell is drawn, so a hint directly left of
/// another cannot blank out its neighbour's remaining key.
pub fn update_hints(
    screen: &mut dyn Screen,
    positions: &[HintPosition],
    typed: &str,
    term_height: usize,
) -> Result<()> {
    let typed_len = typed.chars().count();
    let visible = || positions.iter().filter(move |p| p.row < term_height);
    for pos in visible() {
        restore_next(screen, pos)?;
    }

    for pos in visible() {
        let remaining = if pos.label.starts_with(typed) {
            pos.label.chars().nth(typed_len)
        } else {
            None
        };
        match remaining {
            Some(key) => screen.put(pos.row, pos.col, &key.to_string(), Style::HintSecondary)?,
            None => screen.put(pos.row, pos.col, &pos.ch.to_string(), Style::Normal)?,
        }
    }
    screen.refresh()
}
