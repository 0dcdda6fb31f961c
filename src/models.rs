//! Core data models used throughout textlake.
//!
//! These types represent the blobs, schema decisions, and structured
//! records that flow through the ingestion pipeline.

use chrono::NaiveDateTime;
use serde::Serialize;

/// Content kind assigned to an ingested blob.
///
/// Detection is by declared content type first, filename extension second;
/// anything unrecognized lands in `Unknown` and is stored raw without a
/// curated record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContentKind {
    TextEvents,
    TextLogs,
    Image,
    Audio,
    Unknown,
}

impl ContentKind {
    pub fn detect(content_type: &str, filename: &str) -> Self {
        let ct = content_type.to_ascii_lowercase();
        let ext = filename
            .rsplit_once('.')
            .map(|(_, e)| e.to_ascii_lowercase())
            .unwrap_or_default();

        if ct.starts_with("image/") || matches!(ext.as_str(), "jpg" | "jpeg" | "png" | "webp") {
            ContentKind::Image
        } else if ct.starts_with("audio/")
            || matches!(ext.as_str(), "mp3" | "wav" | "m4a" | "aac" | "flac" | "ogg")
        {
            ContentKind::Audio
        } else if ct.starts_with("text/") || matches!(ext.as_str(), "txt" | "log" | "csv" | "eml") {
            ContentKind::TextEvents
        } else {
            ContentKind::Unknown
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::TextEvents => "TEXT_EVENTS",
            ContentKind::TextLogs => "TEXT_LOGS",
            ContentKind::Image => "IMAGE",
            ContentKind::Audio => "AUDIO",
            ContentKind::Unknown => "UNKNOWN",
        }
    }

    /// Parses the wire/CLI spelling. Only curated kinds are accepted;
    /// `UNKNOWN` is not addressable through the API.
    pub fn parse_curated(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "TEXT_EVENTS" => Some(ContentKind::TextEvents),
            "TEXT_LOGS" => Some(ContentKind::TextLogs),
            "IMAGE" => Some(ContentKind::Image),
            "AUDIO" => Some(ContentKind::Audio),
            _ => None,
        }
    }
}

/// Caller-declared shape of pasted or uploaded text.
///
/// Only a logs hint bypasses classification; everything else is resolved
/// by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KindHint {
    Events,
    Logs,
    #[default]
    None,
}

/// The record shape chosen once per blob, never mixed within one blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Schema {
    Event,
    Log,
}

/// Log severity, case-normalized to upper case on extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Info,
    Warn,
    Error,
    Debug,
}

impl LogLevel {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "INFO" => Some(LogLevel::Info),
            "WARN" => Some(LogLevel::Warn),
            "ERROR" => Some(LogLevel::Error),
            "DEBUG" => Some(LogLevel::Debug),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
            LogLevel::Debug => "DEBUG",
        }
    }
}

/// One structured occurrence extracted from an event-shaped chunk.
///
/// Every chunk yields exactly one record; `parse_ok` records whether any
/// semantic field beyond `notes` was found, and `source_line` keeps the
/// verbatim chunk for audit either way.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    pub event_timestamp: Option<NaiveDateTime>,
    pub person: Option<String>,
    pub city: Option<String>,
    pub amount: Option<f64>,
    pub category: Option<String>,
    pub notes: Option<String>,
    pub parse_ok: bool,
    pub source_line: String,
}

/// One structured log line.
///
/// There is no `parse_ok` here: the verbatim `message` is the primary
/// payload, so a line with zero extracted fields is still a useful record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEvent {
    pub timestamp: Option<NaiveDateTime>,
    pub level: Option<LogLevel>,
    pub service: Option<String>,
    pub code: Option<String>,
    pub message: String,
}
