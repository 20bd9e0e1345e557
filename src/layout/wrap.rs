//! Greedy word wrapping for title text boxes.
use crate::common::unit::emu_to_pt_f64;

/// Font size assumed when a box reports none.
const FALLBACK_FONT_PT: f64 = 11.0;

/// How many characters fit on one line of a box `width` EMU wide.
///
/// Never less than `min_chars`.
pub fn chars_per_line(width: i64, font_pt: f64, char_factor: f64, min_chars: usize) -> usize {
    let font_pt = if font_pt > 0.0 { font_pt } else { FALLBACK_FONT_PT };
    let fit = (emu_to_pt_f64(width) / (font_pt * char_factor)).floor();
    if fit.is_finite() && fit > 0.0 {
        (fit as usize).max(min_chars)
    } else {
        min_chars
    }
}

/// Wrap `text` to at most `max_lines` lines of `limit` characters.
///
/// Explicit newlines are kept; words longer than a line are not broken.
/// When lines are dropped, the last kept line ends in an ellipsis.
pub fn wrap_lines(text: &str, limit: usize, max_lines: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for segment in text.split('\n') {
        if segment.trim().is_empty() {
            lines.push(String::new());
            continue;
        }

        let mut current = String::new();
        let mut current_len = 0;
        for word in segment.split_whitespace() {
            let word_len = word.chars().count();
            if current.is_empty() {
                current.push_str(word);
                current_len = word_len;
            } else if current_len + 1 + word_len <= limit {
                current.push(' ');
                current.push_str(word);
                current_len += 1 + word_len;
            } else {
                lines.push(std::mem::take(&mut current));
                current.push_str(word);
                current_len = word_len;
            }
        }
        lines.push(current);
    }

    if max_lines > 0 && lines.len() > max_lines {
        lines.truncate(max_lines);
        if let Some(last) = lines.last_mut() {
            let trimmed = last.trim_end_matches([' ', '.', ',', ';']).len();
            last.truncate(trimmed);
            last.push('…');
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_chars_per_line() {
        // 2_109_600 EMU = 166.11pt; 166.11 / (11 * 0.56) = 26.9
        assert_eq!(chars_per_line(2_109_600, 11.0, 0.56, 6), 26);
        assert_eq!(chars_per_line(12_700, 11.0, 0.56, 6), 6);
        assert_eq!(chars_per_line(2_109_600, 0.0, 0.56, 6), 26);
    }

    #[test]
    fn test_wrap_short_text() {
        assert_eq!(wrap_lines("Fleet analytics", 26, 2), ["Fleet analytics"]);
        assert_eq!(wrap_lines("", 26, 2), [""]);
    }

    #[test]
    fn test_wrap_breaks_on_words() {
        let lines = wrap_lines("Predictive maintenance for high speed rail", 20, 3);
        assert_eq!(lines, ["Predictive", "maintenance for high", "speed rail"]);
    }

    #[test]
    fn test_wrap_truncates_with_ellipsis() {
        let lines = wrap_lines("one two three four five six seven eight", 9, 2);
        assert_eq!(lines, ["one two", "three…"]);

        let lines = wrap_lines("alpha, beta, gamma, delta", 6, 2);
        assert_eq!(lines, ["alpha,", "beta…"]);
    }

    #[test]
    fn test_wrap_keeps_newlines_and_long_words() {
        assert_eq!(wrap_lines("a\n\nb", 10, 5), ["a", "", "b"]);
        assert_eq!(wrap_lines("supercalifragilistic", 5, 2), ["supercalifragilistic"]);
    }

    proptest! {
        #[test]
        fn wrapped_lines_respect_limits(
            words in prop::collection::vec("[a-z]{1,8}", 0..30),
            limit in 8usize..40,
            max_lines in 1usize..4,
        ) {
            let text = words.join(" ");
            let lines = wrap_lines(&text, limit, max_lines);
            prop_assert!(!lines.is_empty());
            prop_assert!(lines.len() <= max_lines);
            for line in &lines {
                // one extra char for a trailing ellipsis
                prop_assert!(line.chars().count() <= limit + 1);
            }
        }

        #[test]
        fn wrapping_keeps_every_word_when_it_fits(words in prop::collection::vec("[a-z]{1,8}", 1..10)) {
            let text = words.join(" ");
            let lines = wrap_lines(&text, 40, 100);
            prop_assert_eq!(lines.join(" "), text);
        }
    }
}
