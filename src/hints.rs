//! Hint labels: generating them, handing them out by distance, and flattening them for drawing.

use crate::types::{HintPosition, Match, Pane};
use crate::width::Widths;

/// Generate `needed` unique labels over `alphabet`.
///
/// Up to `alphabet.len()` matches get one-key labels. Beyond that, the first `k` keys stay
/// single-key labels and every two-key label starts with one of the remaining keys, so typing
/// a single-key label always completes a jump and never starts a longer one. `k` is the
/// largest value that still leaves room for `needed` labels.
///
/// `needed == 0` means "as many as possible" (`alphabet.len()²`); larger requests are clamped
/// to that maximum.
pub fn generate_labels(alphabet: &[char], needed: usize) -> Vec<String> {
    let n = alphabet.len();
    let max = n * n;
    let needed = if needed == 0 { max } else { needed.min(max) };

    if needed <= n {
        return alphabet[..needed].iter().map(ToString::to_string).collect();
    }

    let single = (0..=n)
        .rev()
        .find(|&k| needed <= (n - k) * n + k)
        .unwrap_or(0);
    let singles = &alphabet[..single];

    let mut labels: Vec<String> = singles.iter().map(ToString::to_string).collect();
    let doubles = alphabet
        .iter()
        .filter(|prefix| !singles.contains(prefix))
        .flat_map(|&prefix| alphabet.iter().map(move |&suffix| [prefix, suffix].iter().collect::<String>()));
    labels.extend(doubles.take(needed - single));
    labels.truncate(needed);
    labels
}

/// Labels paired with the match they jump to, closest match first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Assignment {
    entries: Vec<(String, Match)>,
}

impl Assignment {
    pub fn get(&self, label: &str) -> Option<Match> {
        self.entries
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, m)| *m)
    }

    /// Whether some label still starts with what has been typed so far.
    pub fn has_prefix(&self, typed: &str) -> bool {
        self.entries.iter().any(|(l, _)| l.starts_with(typed))
    }

    pub fn entries(&self) -> &[(String, Match)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Squared distance between a match and an absolute screen position.
pub fn distance(panes: &[Pane], m: &Match, cursor_y: usize, cursor_x: usize) -> usize {
    let pane = &panes[m.pane];
    let dy = (pane.start_y + m.line).abs_diff(cursor_y);
    let dx = (pane.start_x + m.col).abs_diff(cursor_x);
    dy * dy + dx * dx
}

/// Give the shortest labels to the matches closest to the cursor.
///
/// Ties keep their discovery order. When there are more matches than possible labels, the
/// farthest ones stay unlabeled.
pub fn assign_labels(
    matches: &[Match],
    panes: &[Pane],
    cursor_y: usize,
    cursor_x: usize,
    alphabet: &[char],
) -> Assignment {
    let mut sorted: Vec<Match> = matches.to_vec();
    sorted.sort_by_key(|m| distance(panes, m, cursor_y, cursor_x));

    let labels = generate_labels(alphabet, sorted.len());
    log::debug!("labels: {labels:?}");
    Assignment {
        entries: labels.into_iter().zip(sorted).collect(),
    }
}

/// Flatten an assignment into per-hint render records.
///
/// Matches whose line or column no longer exists in the captured text are skipped.
pub fn build_positions(assignment: &Assignment, panes: &[Pane], widths: &Widths) -> Vec<HintPosition> {
    let mut positions = Vec::with_capacity(assignment.len());
    for (label, m) in assignment.entries() {
        let pane = &panes[m.pane];
        let Some(line) = pane.lines.get(m.line) else { continue };
        let true_col = widths.visual_to_true_offset(line, m.col);
        let mut rest = line.chars().skip(true_col);
        let Some(ch) = rest.next() else { continue };
        positions.push(HintPosition {
            row: pane.start_y + m.line,
            col: pane.start_x + m.col,
            right_edge: pane.right_edge(),
            ch,
            ch_width: widths.char_width(ch, m.col),
            next: rest.next(),
            label: label.clone(),
        });
    }
    positions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::width::TabMode;
    use std::collections::HashSet;

    fn keys(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    fn split(labels: &[String]) -> (Vec<&String>, Vec<&String>) {
        labels.iter().partition(|l| l.chars().count() == 1)
    }

    // ==================== generate_labels tests ====================

    #[test]
    fn zero_means_all_doubles() {
        assert_eq!(generate_labels(&keys("ab"), 0), vec!["aa", "ab", "ba", "bb"]);
    }

    #[test]
    fn few_matches_get_single_keys() {
        assert_eq!(generate_labels(&keys("asdf"), 4), vec!["a", "s", "d", "f"]);
        assert_eq!(generate_labels(&keys("asdf"), 2), vec!["a", "s"]);
    }

    #[test]
    fn seven_of_four_keys() {
        let labels = generate_labels(&keys("asdf"), 7);
        assert_eq!(labels, vec!["a", "s", "d", "fa", "fs", "fd", "ff"]);
    }

    #[test]
    fn distribution_per_count() {
        let alphabet = keys("asdf");
        for (count, singles) in [(4, 4), (7, 3), (10, 2), (13, 1), (16, 0)] {
            let labels = generate_labels(&alphabet, count);
            let (one, two) = split(&labels);
            assert_eq!(labels.len(), count);
            assert_eq!(one.len(), singles, "count {count}");
            assert_eq!(two.len(), count - singles, "count {count}");
        }
    }

    #[test]
    fn labels_are_unique_and_prefix_free() {
        let alphabet = keys("asdf");
        for count in 1..=16 {
            let labels = generate_labels(&alphabet, count);
            assert_eq!(labels.len(), count);

            let unique: HashSet<&String> = labels.iter().collect();
            assert_eq!(unique.len(), count, "duplicates for {count}");

            let (one, two) = split(&labels);
            let singles: HashSet<char> = one.iter().filter_map(|l| l.chars().next()).collect();
            for label in two {
                let first = label.chars().next().unwrap();
                assert!(!singles.contains(&first), "{label} collides for {count}");
            }
            assert!(labels.iter().flat_map(|l| l.chars()).all(|c| alphabet.contains(&c)));
        }
    }

    #[test]
    fn too_many_is_clamped() {
        assert_eq!(generate_labels(&keys("ab"), 100).len(), 4);
        assert!(generate_labels(&[], 3).is_empty());
    }

    #[test]
    fn default_alphabet_large_counts() {
        let alphabet = keys("asdghklqwertyuiopzxcvbnmfj;");
        let labels = generate_labels(&alphabet, 30);
        let (one, two) = split(&labels);
        assert_eq!(labels.len(), 30);
        assert_eq!(one.len(), 26);
        assert_eq!(two.len(), 4);
        assert!(two.iter().all(|l| l.starts_with(';')));
    }

    // ==================== assign_labels tests ====================

    fn pane_at(start_y: usize, start_x: usize) -> Pane {
        Pane {
            id: "%0".into(),
            start_y,
            start_x,
            height: 10,
            width: 40,
            ..Pane::default()
        }
    }

    #[test]
    fn closest_match_gets_first_label() {
        let panes = vec![pane_at(0, 0)];
        let far = Match { pane: 0, line: 9, col: 30 };
        let near = Match { pane: 0, line: 1, col: 1 };
        let mid = Match { pane: 0, line: 4, col: 4 };
        let a = assign_labels(&[far, near, mid], &panes, 0, 0, &keys("asd"));
        assert_eq!(a.get("a"), Some(near));
        assert_eq!(a.get("s"), Some(mid));
        assert_eq!(a.get("d"), Some(far));
    }

    #[test]
    fn distance_uses_pane_origin() {
        let panes = vec![pane_at(0, 0), pane_at(0, 41)];
        let left = Match { pane: 0, line: 0, col: 0 };
        let right = Match { pane: 1, line: 0, col: 0 };
        let a = assign_labels(&[left, right], &panes, 0, 45, &keys("ab"));
        assert_eq!(a.get("a"), Some(right));
        assert_eq!(distance(&panes, &right, 0, 45), 16);
    }

    #[test]
    fn ties_keep_discovery_order() {
        let panes = vec![pane_at(0, 0)];
        let first = Match { pane: 0, line: 2, col: 0 };
        let second = Match { pane: 0, line: 0, col: 2 };
        let a = assign_labels(&[first, second], &panes, 0, 0, &keys("xy"));
        assert_eq!(a.get("x"), Some(first));
        assert_eq!(a.get("y"), Some(second));
    }

    #[test]
    fn overflow_uses_double_labels_for_far_matches() {
        let panes = vec![pane_at(0, 0)];
        let matches: Vec<Match> = (0..5).map(|i| Match { pane: 0, line: 0, col: i }).collect();
        let a = assign_labels(&matches, &panes, 0, 0, &keys("abc"));
        let labels: Vec<&str> = a.entries().iter().map(|(l, _)| l.as_str()).collect();
        assert_eq!(labels, vec!["a", "b", "ca", "cb", "cc"]);
        assert_eq!(a.get("cc"), Some(matches[4]));
        assert_eq!(a.get("c"), None);
    }

    // ==================== build_positions tests ====================

    #[test]
    fn positions_record_original_chars() {
        let mut pane = pane_at(2, 10);
        pane.lines = vec!["ab漢c".into()];
        let panes = vec![pane];
        let widths = Widths::new(TabMode::PositionAware);
        let a = assign_labels(
            &[
                Match { pane: 0, line: 0, col: 2 },
                Match { pane: 0, line: 0, col: 4 },
            ],
            &panes,
            2,
            10,
            &keys("qw"),
        );
        let positions = build_positions(&a, &panes, &widths);
        assert_eq!(
            positions,
            vec![
                HintPosition {
                    row: 2,
                    col: 12,
                    right_edge: 50,
                    ch: '漢',
                    ch_width: 2,
                    next: Some('c'),
                    label: "q".into(),
                },
                HintPosition {
                    row: 2,
                    col: 14,
                    right_edge: 50,
                    ch: 'c',
                    ch_width: 1,
                    next: None,
                    label: "w".into(),
                },
            ]
        );
    }

    #[test]
    fn positions_skip_missing_lines() {
        let panes = vec![pane_at(0, 0)];
        let widths = Widths::new(TabMode::PositionAware);
        let a = assign_labels(&[Match { pane: 0, line: 3, col: 0 }], &panes, 0, 0, &keys("a"));
        assert!(build_positions(&a, &panes, &widths).is_empty());
    }
}
