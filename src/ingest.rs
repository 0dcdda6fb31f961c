//! Ingestion pipeline orchestration.
//!
//! Coordinates the full flow for pasted text and uploaded files:
//! kind detection → structuring (text) or metadata decoding (media) →
//! storage. The structuring engine itself never fails on content; the
//! errors surfaced here are storage/IO errors or caller mistakes (empty
//! paste, oversized upload).

use anyhow::{bail, Result};
use sqlx::SqlitePool;
use tracing::info;

use crate::config::Config;
use crate::media;
use crate::models::{ContentKind, KindHint, Schema};
use crate::store;
use crate::structure;

/// Summary of one accepted blob.
#[derive(Debug, Clone)]
pub struct IngestOutcome {
    pub id: String,
    pub kind: ContentKind,
    pub schema: Option<Schema>,
    pub records: usize,
}

/// Ingest pasted text. A logs hint bypasses classification; otherwise the
/// classifier decides the schema, and the stored content kind reflects
/// its decision.
pub async fn ingest_text(
    pool: &SqlitePool,
    config: &Config,
    source: &str,
    hint: KindHint,
    raw_text: &str,
) -> Result<IngestOutcome> {
    if raw_text.trim().is_empty() {
        bail!("raw text must not be empty");
    }

    let capped = cap_chars(raw_text, config.ingest.max_text_chars);
    let structured = structure::structure(capped, hint);
    let kind = match structured.schema() {
        Schema::Log => ContentKind::TextLogs,
        Schema::Event => ContentKind::TextEvents,
    };

    let id = store::store_text_blob(pool, source, "text/plain", kind, capped, &structured).await?;
    info!(
        blob_id = %id,
        kind = kind.as_str(),
        records = structured.len(),
        "ingested pasted text"
    );

    Ok(IngestOutcome {
        id,
        kind,
        schema: Some(structured.schema()),
        records: structured.len(),
    })
}

/// Ingest an uploaded file. Text files run through the structuring
/// engine; image and audio files go to the opaque metadata decoders;
/// anything else is kept raw as `UNKNOWN`.
pub async fn ingest_file(
    pool: &SqlitePool,
    config: &Config,
    filename: &str,
    content_type: &str,
    bytes: &[u8],
) -> Result<IngestOutcome> {
    if bytes.is_empty() {
        bail!("uploaded file is empty");
    }
    if bytes.len() > config.ingest.max_file_bytes {
        bail!(
            "uploaded file exceeds size limit ({} > {} bytes)",
            bytes.len(),
            config.ingest.max_file_bytes
        );
    }

    let detected = ContentKind::detect(content_type, filename);
    let outcome = match detected {
        ContentKind::TextEvents | ContentKind::TextLogs => {
            let text = String::from_utf8_lossy(bytes);
            let capped = cap_chars(&text, config.ingest.max_text_chars);
            let hint = if detected == ContentKind::TextLogs {
                KindHint::Logs
            } else {
                KindHint::None
            };
            let structured = structure::structure(capped, hint);
            let kind = match structured.schema() {
                Schema::Log => ContentKind::TextLogs,
                Schema::Event => ContentKind::TextEvents,
            };
            let id =
                store::store_text_blob(pool, filename, content_type, kind, capped, &structured)
                    .await?;
            IngestOutcome {
                id,
                kind,
                schema: Some(structured.schema()),
                records: structured.len(),
            }
        }
        ContentKind::Image => {
            let attrs = media::decode_image(bytes);
            let id = store::store_image_blob(pool, filename, content_type, bytes, &attrs).await?;
            IngestOutcome {
                id,
                kind: ContentKind::Image,
                schema: None,
                records: 1,
            }
        }
        ContentKind::Audio => {
            let attrs = media::decode_audio(bytes, content_type);
            let id = store::store_audio_blob(pool, filename, content_type, bytes, &attrs).await?;
            IngestOutcome {
                id,
                kind: ContentKind::Audio,
                schema: None,
                records: 1,
            }
        }
        ContentKind::Unknown => {
            let id = store::store_unknown_blob(pool, filename, content_type, bytes).await?;
            IngestOutcome {
                id,
                kind: ContentKind::Unknown,
                schema: None,
                records: 0,
            }
        }
    };

    info!(
        blob_id = %outcome.id,
        kind = outcome.kind.as_str(),
        records = outcome.records,
        "ingested file"
    );
    Ok(outcome)
}

/// CLI entry point for pasted/piped text.
pub async fn run_ingest_text(
    config: &Config,
    source: &str,
    hint: KindHint,
    raw_text: &str,
) -> Result<()> {
    let pool = store::open_pool(config).await?;
    let outcome = ingest_text(&pool, config, source, hint, raw_text).await?;
    print_outcome(&outcome);
    pool.close().await;
    Ok(())
}

/// CLI entry point for a file on disk.
pub async fn run_ingest_file(config: &Config, path: &std::path::Path) -> Result<()> {
    let bytes = std::fs::read(path)?;
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "upload.bin".to_string());
    // No transport to declare a type for us; the extension decides.
    let content_type = "application/octet-stream";

    let pool = store::open_pool(config).await?;
    let outcome = ingest_file(&pool, config, &filename, content_type, &bytes).await?;
    print_outcome(&outcome);
    pool.close().await;
    Ok(())
}

fn print_outcome(outcome: &IngestOutcome) {
    println!("ingest");
    println!("  id: {}", outcome.id);
    println!("  kind: {}", outcome.kind.as_str());
    if let Some(schema) = outcome.schema {
        println!("  schema: {:?}", schema);
    }
    println!("  records: {}", outcome.records);
    println!("ok");
}

/// Truncate to a character budget without splitting a code point.
fn cap_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
