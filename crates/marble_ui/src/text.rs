//! Text helpers: width-bounded truncation and multi-line splitting.

use serde::{Deserialize, Serialize};

/// Appended or prepended when text is cut.
pub const ELLIPSIS: &str = "\u{2026}";

/// Most lines a multi-line label will split into.
pub const MAX_LINES: usize = 16;

/// Where to cut text that is too wide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Truncation {
    /// Never cut.
    #[default]
    None,
    /// Cut the beginning: "…end of text".
    Head,
    /// Cut the end: "start of te…".
    Tail,
}

/// Shortens `text` until it fits `max_width`.
///
/// Cuts only on character boundaries and keeps as many characters as fit
/// alongside the ellipsis (binary search, so `measure` runs O(log n) times).
///
/// # Arguments
///
/// * `text` - Full text
/// * `max_width` - Available width in pixels
/// * `mode` - Which end to cut
/// * `measure` - Pixel width of a candidate string
#[must_use]
pub fn truncate(text: &str, max_width: i32, mode: Truncation, measure: impl Fn(&str) -> i32) -> String {
    if mode == Truncation::None || measure(text) <= max_width {
        return text.to_owned();
    }

    // Byte offsets of every character boundary, end included.
    let bounds: Vec<usize> = text
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .collect();

    let mut left = 0;
    let mut right = bounds.len() - 1;

    match mode {
        Truncation::Head => {
            // Find the smallest cut that fits.
            while right - left > 1 {
                let mid = (left + right) / 2;
                let candidate = format!("{ELLIPSIS}{}", &text[bounds[mid]..]);
                if measure(&candidate) <= max_width {
                    right = mid;
                } else {
                    left = mid;
                }
            }
            format!("{ELLIPSIS}{}", &text[bounds[right]..])
        }
        Truncation::Tail => {
            // Find the longest prefix that fits.
            while right - left > 1 {
                let mid = (left + right) / 2;
                let candidate = format!("{}{ELLIPSIS}", &text[..bounds[mid]]);
                if measure(&candidate) <= max_width {
                    left = mid;
                } else {
                    right = mid;
                }
            }
            format!("{}{ELLIPSIS}", &text[..bounds[left]])
        }
        Truncation::None => text.to_owned(),
    }
}

/// Splits multi-line text on `\` or newline, dropping carriage returns.
///
/// Yields at most `max_lines` lines; a trailing separator does not start
/// an empty line.
#[must_use]
pub fn split_lines(text: &str, max_lines: usize) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut rest = text;

    while !rest.is_empty() && lines.len() < max_lines {
        let (line, tail) = match rest.find(['\\', '\n']) {
            Some(at) => (&rest[..at], &rest[at + 1..]),
            None => (rest, ""),
        };
        lines.push(line.trim_end_matches('\r'));
        rest = tail;
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 10 pixels per character.
    fn mono(s: &str) -> i32 {
        s.chars().count() as i32 * 10
    }

    #[test]
    fn test_fitting_text_is_untouched() {
        assert_eq!(truncate("hello", 50, Truncation::Tail, mono), "hello");
        assert_eq!(truncate("hello", 0, Truncation::None, mono), "hello");
    }

    #[test]
    fn test_tail_truncation() {
        let out = truncate("abcdefghij", 50, Truncation::Tail, mono);
        assert_eq!(out, "abcd\u{2026}");
        assert!(mono(&out) <= 50);
    }

    #[test]
    fn test_head_truncation() {
        let out = truncate("abcdefghij", 50, Truncation::Head, mono);
        assert_eq!(out, "\u{2026}ghij");
        assert!(mono(&out) <= 50);
    }

    #[test]
    fn test_truncation_respects_char_boundaries() {
        let out = truncate("ééééééé", 40, Truncation::Tail, mono);
        assert_eq!(out, "ééé\u{2026}");
    }

    #[test]
    fn test_nothing_fits() {
        assert_eq!(truncate("abc", 0, Truncation::Tail, mono), ELLIPSIS);
        assert_eq!(truncate("abc", 0, Truncation::Head, mono), ELLIPSIS);
    }

    #[test]
    fn test_split_lines() {
        assert_eq!(split_lines("one\\two\nthree", MAX_LINES), vec!["one", "two", "three"]);
        assert_eq!(split_lines("a\r\nb\\", MAX_LINES), vec!["a", "b"]);
        assert_eq!(split_lines("\\b", MAX_LINES), vec!["", "b"]);
        assert_eq!(split_lines("a\\b\\c", 2), vec!["a", "b"]);
        assert!(split_lines("", MAX_LINES).is_empty());
    }
}
