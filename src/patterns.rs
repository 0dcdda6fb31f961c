//! Field-level pattern matchers for the structuring engine.
//!
//! Each matcher takes one chunk of text and returns an optional typed
//! value. Matchers never fail: absence of a match is a first-class `None`,
//! and values that survive the pattern but not conversion (an impossible
//! calendar date, a non-finite number) degrade to `None` as well.
//!
//! The gazetteer and the keyword-to-category table are ordered lists, and
//! the first entry in **table order** wins — that precedence is a stated
//! contract of this module, not an implementation accident.

use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;

use crate::models::LogLevel;

/// Recognized city names, in precedence order.
pub const GAZETTEER: &[&str] = &[
    "Vilnius",
    "Kaunas",
    "Klaipėda",
    "Šiauliai",
    "Panevėžys",
    "Riga",
    "Tallinn",
    "Warsaw",
    "Berlin",
    "London",
];

/// Keyword patterns mapped to category labels, in precedence order.
const CATEGORY_TABLE: &[(&str, &str)] = &[
    (
        r"(?i)\b(salad|coffee|lunch|dinner|breakfast|restaurant|groceries|pizza|beer)\b",
        "Food",
    ),
    (
        r"(?i)\b(bus|train|taxi|tram|fuel|parking|ticket)\b",
        "Transport",
    ),
    (
        r"(?i)\b(rent|utilities|electricity|heating|internet)\b",
        "Housing",
    ),
    (r"(?i)\b(pharmacy|doctor|dentist|gym|medicine)\b", "Health"),
    (r"(?i)\b(salary|bonus|payout|refund)\b", "Income"),
];

static TIMESTAMP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{4})-(\d{2})-(\d{2})[ T](\d{2}):(\d{2})(?::(\d{2}))?").unwrap()
});

static DATE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d{4}-\d{2}-\d{2}").unwrap());

static AMOUNT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+(?:[.,]\d{1,2})?)\s*(?:€|eur(?:os?)?\b)").unwrap());

static CITY_RES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    GAZETTEER
        .iter()
        .map(|city| {
            let re = Regex::new(&format!(r"(?i)\b{}\b", regex::escape(city))).unwrap();
            (re, *city)
        })
        .collect()
});

static PERSON_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\p{Lu}\p{Ll}+)\s+(\p{Lu}\p{Ll}+)\b").unwrap());

static CATEGORY_EXPLICIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bcategory\s*=\s*([^|,\r\n]+)").unwrap());

static CATEGORY_RES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    CATEGORY_TABLE
        .iter()
        .map(|(pattern, label)| (Regex::new(pattern).unwrap(), *label))
        .collect()
});

static NOTES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bnotes\s*[:=]\s*(.*)").unwrap());

static PIPE_RUN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*\|+\s*").unwrap());

static LEVEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(info|warn|error|debug)\b").unwrap());

static SERVICE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([A-Z][a-z]+Service)\b").unwrap());

static CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bcode=([A-Za-z0-9_:-]+)").unwrap());

/// First `YYYY-MM-DD HH:MM[:SS]` (space or `T` separator) in the text, at
/// the most specific precision present. A first match with impossible
/// calendar components yields `None`; there is no retry on later matches.
pub fn timestamp(text: &str) -> Option<NaiveDateTime> {
    let caps = TIMESTAMP_RE.captures(text)?;
    let year: i32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    let day: u32 = caps[3].parse().ok()?;
    let hour: u32 = caps[4].parse().ok()?;
    let minute: u32 = caps[5].parse().ok()?;
    let second: u32 = caps
        .get(6)
        .map(|m| m.as_str().parse().ok())
        .unwrap_or(Some(0))?;

    NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, minute, second)
}

/// First decimal number followed by a euro marker (`€`, `EUR`, `euro`).
/// A `,` fractional separator is normalized to `.` before conversion;
/// a conversion that does not produce a finite non-negative number is
/// treated as no match.
pub fn amount(text: &str) -> Option<f64> {
    let caps = AMOUNT_RE.captures(text)?;
    let normalized = caps[1].replace(',', ".");
    let value: f64 = normalized.parse().ok()?;
    if value.is_finite() && value >= 0.0 {
        Some(value)
    } else {
        None
    }
}

/// Case-insensitive whole-word gazetteer lookup. The first gazetteer
/// entry found anywhere in the text wins, regardless of text position.
pub fn city(text: &str) -> Option<&'static str> {
    CITY_RES
        .iter()
        .find(|(re, _)| re.is_match(text))
        .map(|(_, city)| *city)
}

/// First pair of consecutive capitalized word tokens, joined by a single
/// space. Unicode letter classes apply, so accented names match. A lone
/// capitalized token is never accepted.
pub fn person(text: &str) -> Option<String> {
    PERSON_RE
        .captures(text)
        .map(|caps| format!("{} {}", &caps[1], &caps[2]))
}

/// Two-tier category lookup: an explicit `category = <value>` marker
/// (value up to the next pipe or comma) takes precedence; otherwise the
/// first keyword-table row that matches wins.
pub fn category(text: &str) -> Option<String> {
    if let Some(caps) = CATEGORY_EXPLICIT_RE.captures(text) {
        let value = caps[1].trim();
        if !value.is_empty() {
            return Some(value.to_string());
        }
    }
    CATEGORY_RES
        .iter()
        .find(|(re, _)| re.is_match(text))
        .map(|(_, label)| (*label).to_string())
}

/// Explicit `notes:` / `notes=` remainder, or a cleaned copy of the whole
/// chunk with pipe separators collapsed to single spaces. Never empty for
/// a non-empty chunk.
pub fn notes(text: &str) -> String {
    if let Some(caps) = NOTES_RE.captures(text) {
        let value = caps[1].trim();
        if !value.is_empty() {
            return value.to_string();
        }
    }
    PIPE_RUN_RE.replace_all(text, " ").trim().to_string()
}

/// First case-insensitive whole-word severity token, normalized upper.
pub fn log_level(text: &str) -> Option<LogLevel> {
    LEVEL_RE
        .captures(text)
        .and_then(|caps| LogLevel::parse(&caps[1]))
}

/// First token following the `CapitalizedwordService` naming convention.
pub fn log_service(text: &str) -> Option<String> {
    SERVICE_RE.captures(text).map(|caps| caps[1].to_string())
}

/// First `code=<token>` machine code.
pub fn log_code(text: &str) -> Option<String> {
    CODE_RE.captures(text).map(|caps| caps[1].to_string())
}

/// Whether the text contains a `YYYY-MM-DD` date substring anywhere.
/// Used by the classifier's co-occurrence rule.
pub fn has_date(text: &str) -> bool {
    DATE_RE.is_match(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn timestamp_minute_precision() {
        let ts = timestamp("2026-02-19 18:40 Jonas Petrauskas").unwrap();
        assert_eq!(ts.to_string(), "2026-02-19 18:40:00");
    }

    #[test]
    fn timestamp_second_precision_and_t_separator() {
        let ts = timestamp("at 2026-02-19T10:17:45 something happened").unwrap();
        assert_eq!(ts.second(), 45);
    }

    #[test]
    fn timestamp_impossible_date_is_absent() {
        assert_eq!(timestamp("2026-13-40 10:00 nonsense"), None);
        assert_eq!(timestamp("no dates here"), None);
    }

    #[test]
    fn amount_comma_and_dot_normalize_identically() {
        assert_eq!(amount("paid 12,50 EUR"), Some(12.50));
        assert_eq!(amount("paid 12.50 EUR"), Some(12.50));
    }

    #[test]
    fn amount_integer_and_symbol_markers() {
        assert_eq!(amount("paid 7 EUR bus ticket"), Some(7.0));
        assert_eq!(amount("7€ for parking"), Some(7.0));
        assert_eq!(amount("120 euro rent"), Some(120.0));
    }

    #[test]
    fn amount_requires_a_currency_marker() {
        assert_eq!(amount("paid 12.50 USD"), None);
        assert_eq!(amount("score was 12.50"), None);
        // "eurasia" must not count as a marker
        assert_eq!(amount("5 eurasia tours"), None);
    }

    #[test]
    fn city_precedence_is_gazetteer_order_not_text_order() {
        // Riga appears first in the text, Vilnius first in the table.
        assert_eq!(city("flew Riga to Vilnius overnight"), Some("Vilnius"));
        assert_eq!(city("just Riga this time"), Some("Riga"));
        assert_eq!(city("lowercase vilnius still counts"), Some("Vilnius"));
        assert_eq!(city("Vilniustown is not a word match"), None);
    }

    #[test]
    fn person_needs_two_capitalized_tokens() {
        assert_eq!(
            person("2026-02-19 18:40 Jonas Petrauskas Vilnius paid"),
            Some("Jonas Petrauskas".to_string())
        );
        assert_eq!(person("only Jonas was there"), None);
    }

    #[test]
    fn person_accepts_accented_names() {
        assert_eq!(
            person("20:10 Ieva Kazlauskaitė Kaunas paid 7 EUR"),
            Some("Ieva Kazlauskaitė".to_string())
        );
    }

    #[test]
    fn category_keyword_table_first_row_wins() {
        assert_eq!(category("salad + coffee"), Some("Food".to_string()));
        assert_eq!(category("bus ticket home"), Some("Transport".to_string()));
        // "coffee" (Food row) beats "ticket" (Transport row) by table order
        assert_eq!(category("ticket and coffee"), Some("Food".to_string()));
        assert_eq!(category("nothing matching"), None);
    }

    #[test]
    fn category_explicit_marker_takes_precedence() {
        assert_eq!(
            category("coffee run, category = Travel | rest"),
            Some("Travel".to_string())
        );
    }

    #[test]
    fn notes_marker_captures_remainder() {
        assert_eq!(notes("paid rent notes: late this month"), "late this month");
        assert_eq!(notes("notes=weekly | shop"), "weekly | shop");
    }

    #[test]
    fn notes_fallback_collapses_pipes() {
        assert_eq!(notes("salad | coffee || juice"), "salad coffee juice");
        assert_eq!(notes("Bad line without structure"), "Bad line without structure");
    }

    #[test]
    fn log_matchers() {
        let line = "2026-02-19 10:17:45 error OrderService failed code=DB_ERR";
        assert_eq!(log_level(line), Some(LogLevel::Error));
        assert_eq!(log_service(line), Some("OrderService".to_string()));
        assert_eq!(log_code(line), Some("DB_ERR".to_string()));
        assert_eq!(log_service("no services here"), None);
        assert_eq!(log_code("code= missing token"), None);
    }

    #[test]
    fn service_must_be_a_whole_token() {
        assert_eq!(log_service("MicroAuthService calls"), None);
        assert_eq!(log_service("AuthService calls"), Some("AuthService".into()));
    }
}
