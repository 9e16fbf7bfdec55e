//! Finding every occurrence of the search pattern in the captured panes.

use crate::types::{Match, Pane};
use crate::width::Widths;

/// Unshifted key and the symbol the same key produces with Shift on a US layout.
pub const SMARTSIGN_TABLE: &[(char, char)] = &[
    (',', '<'),
    ('.', '>'),
    ('/', '?'),
    ('1', '!'),
    ('2', '@'),
    ('3', '#'),
    ('4', '$'),
    ('5', '%'),
    ('6', '^'),
    ('7', '&'),
    ('8', '*'),
    ('9', '('),
    ('0', ')'),
    ('-', '_'),
    ('=', '+'),
    (';', ':'),
    ('[', '{'),
    (']', '}'),
    ('`', '~'),
    ('\'', '"'),
    ('\\', '|'),
];

/// Shifted symbol for `ch`, if `ch` is an unshifted key in the smartsign table.
pub fn shifted(ch: char) -> Option<char> {
    SMARTSIGN_TABLE
        .iter()
        .find(|(plain, _)| *plain == ch)
        .map(|(_, shift)| *shift)
}

/// Every search string equivalent to `pattern`.
///
/// With smartsign off this is just the pattern. With it on, each position independently
/// offers its literal character and its shifted symbol, and all combinations are returned
/// (literal-first, first position varying slowest).
pub fn expand_pattern(pattern: &str, smartsign: bool) -> Vec<Vec<char>> {
    let literal: Vec<char> = pattern.chars().collect();
    if !smartsign {
        return vec![literal];
    }

    let mut variants: Vec<Vec<char>> = vec![Vec::with_capacity(literal.len())];
    for ch in literal {
        let options: Vec<char> = std::iter::once(ch).chain(shifted(ch)).collect();
        variants = variants
            .into_iter()
            .flat_map(|prefix| {
                options.iter().map(move |&opt| {
                    let mut v = prefix.clone();
                    v.push(opt);
                    v
                })
            })
            .collect();
    }
    variants
}

fn chars_eq(a: char, b: char, case_sensitive: bool) -> bool {
    if case_sensitive || a == b {
        return a == b;
    }
    a.to_lowercase().eq(b.to_lowercase())
}

fn window_matches(window: &[char], pattern: &[char], case_sensitive: bool) -> bool {
    window.len() == pattern.len()
        && window
            .iter()
            .zip(pattern)
            .all(|(&a, &b)| chars_eq(a, b, case_sensitive))
}

/// Scan every line of every pane for `pattern`.
///
/// Each start position is reported at most once even when several smartsign variants match
/// there. Columns are visual columns, so a match always starts on a character boundary and
/// never inside the right half of a wide character. The result is unordered.
pub fn find_matches(
    panes: &[Pane],
    pattern: &str,
    case_sensitive: bool,
    smartsign: bool,
    widths: &Widths,
) -> Vec<Match> {
    let patterns = expand_pattern(pattern, smartsign);
    let plen = patterns[0].len();
    if plen == 0 {
        return Vec::new();
    }

    let mut matches = Vec::new();
    for (pane_idx, pane) in panes.iter().enumerate() {
        for (line_idx, line) in pane.lines.iter().enumerate() {
            let chars: Vec<char> = line.chars().collect();
            if chars.len() < plen {
                continue;
            }
            let cols = widths.columns(&chars);
            for pos in 0..=chars.len() - plen {
                let window = &chars[pos..pos + plen];
                if patterns
                    .iter()
                    .any(|p| window_matches(window, p, case_sensitive))
                {
                    matches.push(Match {
                        pane: pane_idx,
                        line: line_idx,
                        col: cols[pos],
                    });
                }
            }
        }
    }
    matches
}
