//! Grapheme-aware helpers for single-line text fields.
//!
//! Byte offsets passed in are always grapheme boundaries; the helpers
//! only ever return boundaries too.

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Width in terminal cells
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Cut `s` to at most `max_cells` cells, ending in `…` when anything was cut
pub fn truncate_to_width(s: &str, max_cells: usize) -> String {
    if display_width(s) <= max_cells {
        return s.to_string();
    }
    if max_cells == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for g in s.graphemes(true) {
        let w = display_width(g);
        if used + w > max_cells - 1 {
            break;
        }
        used += w;
        out.push_str(g);
    }
    out.push('\u{2026}');
    out
}

/// Boundary before `offset`, or `None` at the start
pub fn prev_boundary(s: &str, offset: usize) -> Option<usize> {
    s[..offset].grapheme_indices(true).next_back().map(|(i, _)| i)
}

/// Boundary after `offset`, or `None` at the end
pub fn next_boundary(s: &str, offset: usize) -> Option<usize> {
    s[offset..]
        .graphemes(true)
        .next()
        .map(|g| offset + g.len())
}

fn is_space(g: &str) -> bool {
    g.chars().all(char::is_whitespace)
}

/// Start of the word left of `offset` (skips trailing spaces first)
pub fn word_left(s: &str, offset: usize) -> usize {
    let mut pos = offset;
    let mut seen_word = false;
    for (i, g) in s[..offset].grapheme_indices(true).rev() {
        if is_space(g) {
            if seen_word {
                break;
            }
        } else {
            seen_word = true;
        }
        pos = i;
    }
    pos
}

/// Start of the next word right of `offset`, or the end of `s`
pub fn word_right(s: &str, offset: usize) -> usize {
    let mut left_word = false;
    for (i, g) in s[offset..].grapheme_indices(true) {
        if is_space(g) {
            left_word = true;
        } else if left_word {
            return offset + i;
        }
    }
    s.len()
}

/// Terminal column of a byte offset
pub fn cursor_col(s: &str, offset: usize) -> usize {
    display_width(&s[..offset.min(s.len())])
}

/// One bullet per grapheme, for password fields
pub fn mask(s: &str) -> String {
    "\u{2022}".repeat(s.graphemes(true).count())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn width_counts_wide_chars() {
        assert_eq!(display_width("abc"), 3);
        assert_eq!(display_width("日本"), 4);
    }

    #[test]
    fn truncate_short_string_unchanged() {
        assert_eq!(truncate_to_width("Buy milk", 20), "Buy milk");
    }

    #[test]
    fn truncate_adds_ellipsis() {
        assert_eq!(truncate_to_width("Buy milk today", 8), "Buy mil\u{2026}");
        assert_eq!(truncate_to_width("日本語", 4), "日\u{2026}");
        assert_eq!(truncate_to_width("abc", 0), "");
    }

    #[test]
    fn boundaries_step_over_clusters() {
        let s = "ae\u{301}b"; // e + combining acute
        assert_eq!(next_boundary(s, 0), Some(1));
        assert_eq!(next_boundary(s, 1), Some(4));
        assert_eq!(prev_boundary(s, 4), Some(1));
        assert_eq!(prev_boundary(s, 0), None);
        assert_eq!(next_boundary(s, s.len()), None);
    }

    #[test]
    fn word_motion() {
        let s = "buy  oat milk";
        assert_eq!(word_left(s, s.len()), 9);
        assert_eq!(word_left(s, 9), 5);
        assert_eq!(word_left(s, 5), 0);
        assert_eq!(word_left(s, 0), 0);
        assert_eq!(word_right(s, 0), 5);
        assert_eq!(word_right(s, 5), 9);
        assert_eq!(word_right(s, 9), s.len());
    }

    #[test]
    fn cursor_col_and_mask() {
        assert_eq!(cursor_col("日本", 3), 2);
        assert_eq!(cursor_col("abc", 99), 3);
        assert_eq!(mask("pässword"), "\u{2022}".repeat(8));
    }
}
