//! Raw-text chunkers.
//!
//! Splits one input blob into ordered, trimmed, non-empty units of
//! analysis. Line mode is used for log-shaped text (a log line that
//! happens to contain a period must never fragment); sentence mode
//! additionally breaks on sentence-terminator runs and is used for
//! event-shaped text.
//!
//! A terminator run only splits when followed by whitespace or the end of
//! the input, so decimal literals like `12.50` survive sentence mode.

use std::sync::LazyLock;

use regex::Regex;

static SENTENCE_BREAK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?]+(\s+|$)").unwrap());

/// Split on CRLF/LF line breaks. Trims each line, drops empty ones,
/// preserves order. Whitespace-only input yields an empty list.
pub fn split_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

/// Split on line breaks, then on `.`/`!`/`?` runs within each line.
pub fn split_sentences(text: &str) -> Vec<String> {
    text.lines()
        .flat_map(|line| SENTENCE_BREAK_RE.split(line))
        .map(str::trim)
        .filter(|fragment| !fragment.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_trim_and_drop_empties() {
        let chunks = split_lines("  first \n\n\t\nsecond\r\nthird  ");
        assert_eq!(chunks, vec!["first", "second", "third"]);
    }

    #[test]
    fn lines_preserve_order() {
        let text = (0..10).map(|i| format!("line {i}")).collect::<Vec<_>>().join("\n");
        let chunks = split_lines(&text);
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk, &format!("line {i}"));
        }
    }

    #[test]
    fn whitespace_only_input_yields_no_chunks() {
        assert!(split_lines("   \n \t \r\n ").is_empty());
        assert!(split_sentences("   \n \t ").is_empty());
        assert!(split_lines("").is_empty());
    }

    #[test]
    fn sentences_split_on_terminator_runs() {
        let chunks = split_sentences("Bought lunch. Then coffee!? And done...");
        assert_eq!(chunks, vec!["Bought lunch", "Then coffee", "And done"]);
    }

    #[test]
    fn sentences_keep_decimal_literals_whole() {
        let chunks = split_sentences("paid 12.50 EUR for salad + coffee");
        assert_eq!(chunks, vec!["paid 12.50 EUR for salad + coffee"]);
    }

    #[test]
    fn sentences_also_split_on_line_breaks() {
        let chunks = split_sentences("one. two\nthree");
        assert_eq!(chunks, vec!["one", "two", "three"]);
    }
}
