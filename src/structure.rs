//! The structuring engine: per-chunk extractors and the orchestrator.
//!
//! `structure` is the single entry point the rest of the system calls.
//! It is pure and total over text content: malformed input produces
//! degraded records (`parse_ok = false`, absent fields), never an error.
//! Every non-empty chunk becomes exactly one record, in input order, so
//! the original blob remains fully auditable from its records.

use crate::chunk;
use crate::classify;
use crate::models::{Event, KindHint, LogEvent, Schema};
use crate::patterns;

/// The outcome of structuring one blob: a schema decision applied
/// uniformly to every chunk, and the ordered records it produced.
#[derive(Debug, Clone, PartialEq)]
pub enum StructuredText {
    Events(Vec<Event>),
    Logs(Vec<LogEvent>),
}

impl StructuredText {
    pub fn schema(&self) -> Schema {
        match self {
            StructuredText::Events(_) => Schema::Event,
            StructuredText::Logs(_) => Schema::Log,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            StructuredText::Events(records) => records.len(),
            StructuredText::Logs(records) => records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Build one [`Event`] from one chunk. `parse_ok` is true iff any field
/// other than notes was extracted; notes always has a fallback value and
/// never counts.
pub fn extract_event(chunk: &str) -> Event {
    let event_timestamp = patterns::timestamp(chunk);
    let person = patterns::person(chunk);
    let city = patterns::city(chunk).map(String::from);
    let amount = patterns::amount(chunk);
    let category = patterns::category(chunk);

    let parse_ok = event_timestamp.is_some()
        || person.is_some()
        || city.is_some()
        || amount.is_some()
        || category.is_some();

    Event {
        event_timestamp,
        person,
        city,
        amount,
        category,
        notes: Some(patterns::notes(chunk)),
        parse_ok,
        source_line: chunk.to_string(),
    }
}

/// Build one [`LogEvent`] from one chunk. The verbatim message is always
/// kept, so the record is emitted no matter how many fields matched.
pub fn extract_log(chunk: &str) -> LogEvent {
    LogEvent {
        timestamp: patterns::timestamp(chunk),
        level: patterns::log_level(chunk),
        service: patterns::log_service(chunk),
        code: patterns::log_code(chunk),
        message: chunk.to_string(),
    }
}

/// Structure one raw blob into an ordered record list.
///
/// A logs hint skips classification and forces line-chunked log
/// extraction; any other hint defers to the classifier. Log-shaped text
/// is always line-chunked (sentence splitting would fragment a log line
/// containing a period); event-shaped text is sentence-chunked.
/// Empty or whitespace-only input yields zero records.
pub fn structure(raw_text: &str, hint: KindHint) -> StructuredText {
    let schema = if hint == KindHint::Logs {
        Schema::Log
    } else {
        classify::classify(raw_text)
    };

    match schema {
        Schema::Log => StructuredText::Logs(
            chunk::split_lines(raw_text)
                .iter()
                .map(|c| extract_log(c))
                .collect(),
        ),
        Schema::Event => StructuredText::Events(
            chunk::split_sentences(raw_text)
                .iter()
                .map(|c| extract_event(c))
                .collect(),
        ),
    }
}
