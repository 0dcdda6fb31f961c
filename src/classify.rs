//! LOG/EVENT blob classification.
//!
//! A blob is LOG-shaped if any of its first [`CLASSIFY_LOOKAHEAD_LINES`]
//! lines carries both a severity token and a `YYYY-MM-DD` date substring.
//! Requiring the co-occurrence keeps diary sentences that merely mention
//! a date (or happen to contain a level-like word) out of the log schema.
//!
//! The decision is made once per blob and applied to every chunk derived
//! from it.

use crate::models::Schema;
use crate::patterns;

/// Fixed lookahead limit. A qualifying log line past this prefix does not
/// flip the classification.
pub const CLASSIFY_LOOKAHEAD_LINES: usize = 20;

/// Classify a whole raw blob as EVENT- or LOG-shaped.
pub fn classify(raw_text: &str) -> Schema {
    let log_shaped = raw_text
        .lines()
        .take(CLASSIFY_LOOKAHEAD_LINES)
        .any(|line| patterns::log_level(line).is_some() && patterns::has_date(line));

    if log_shaped {
        Schema::Log
    } else {
        Schema::Event
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_and_date_together_mean_log() {
        let blob = "2026-02-19 10:15:03 INFO AuthService User login success code=OK";
        assert_eq!(classify(blob), Schema::Log);
    }

    #[test]
    fn level_alone_or_date_alone_stays_event() {
        assert_eq!(classify("I got an error at the bank today"), Schema::Event);
        assert_eq!(classify("2026-02-19 18:40 paid 12.50 EUR"), Schema::Event);
        assert_eq!(classify(""), Schema::Event);
    }

    #[test]
    fn one_qualifying_line_anywhere_in_the_prefix_wins() {
        let blob = "dear diary, nothing structured\n\
                    2026-02-19 10:17:45 ERROR OrderService boom code=DB_ERR\n\
                    more prose";
        assert_eq!(classify(blob), Schema::Log);
    }

    #[test]
    fn severity_match_is_whole_word_and_case_insensitive() {
        assert_eq!(classify("2026-02-19 10:00 debug PaymentService"), Schema::Log);
        // "errors" is not the token "error"
        assert_eq!(classify("2026-02-19 saw many errors happen"), Schema::Event);
    }

    // The 20-line lookahead is a documented limit of the heuristic, not
    // inferred intent: a qualifying line at position 21 is never seen.
    #[test]
    fn lookahead_stops_at_line_twenty() {
        let mut lines: Vec<String> = (0..CLASSIFY_LOOKAHEAD_LINES)
            .map(|i| format!("plain diary line {i}"))
            .collect();
        lines.push("2026-02-19 10:17:45 ERROR OrderService code=DB_ERR".to_string());
        assert_eq!(classify(&lines.join("\n")), Schema::Event);

        // The same qualifying line at position 20 still flips it.
        let mut lines: Vec<String> = (0..CLASSIFY_LOOKAHEAD_LINES - 1)
            .map(|i| format!("plain diary line {i}"))
            .collect();
        lines.push("2026-02-19 10:17:45 ERROR OrderService code=DB_ERR".to_string());
        assert_eq!(classify(&lines.join("\n")), Schema::Log);
    }
}
