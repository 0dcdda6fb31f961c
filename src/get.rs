//! Per-blob record retrieval.
//!
//! Fetches the raw ledger row and the curated records derived from one
//! blob. Used by both the `tlk get` CLI command and the
//! `GET /api/results/{id}` HTTP endpoint.

use anyhow::{bail, Result};
use serde::Serialize;

use crate::config::Config;
use crate::models::ContentKind;
use crate::store::{self, BlobRow, TableRows};

/// Results payload: the originating blob plus its curated rows.
#[derive(Debug, Clone, Serialize)]
pub struct ResultsResponse {
    pub blob: BlobRow,
    pub rows: TableRows,
}

/// Core fetch returning structured data (used by CLI and server).
///
/// When `kind` is absent the blob's stored content kind is used. A blob
/// ingested as `UNKNOWN` has no curated table to read from.
pub async fn get_results(
    pool: &sqlx::SqlitePool,
    id: &str,
    kind: Option<ContentKind>,
) -> Result<ResultsResponse> {
    let blob = match store::fetch_blob(pool, id).await? {
        Some(blob) => blob,
        None => bail!("blob not found: {}", id),
    };

    let kind = match kind {
        Some(kind) => kind,
        None => match ContentKind::parse_curated(&blob.content_kind) {
            Some(kind) => kind,
            None => bail!("blob {} has no curated records (kind UNKNOWN)", id),
        },
    };

    let rows = store::fetch_records(pool, kind, id).await?;
    Ok(ResultsResponse { blob, rows })
}

/// CLI entry point — fetches and prints to stdout.
pub async fn run_get(config: &Config, id: &str, kind: Option<ContentKind>) -> Result<()> {
    let pool = store::open_pool(config).await?;
    let results = match get_results(&pool, id, kind).await {
        Ok(r) => r,
        Err(e) => {
            pool.close().await;
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    pool.close().await;

    let blob = &results.blob;
    println!("--- Blob ---");
    println!("id:           {}", blob.id);
    println!("source:       {}", blob.source);
    println!("content_type: {}", blob.content_type);
    println!("kind:         {}", blob.content_kind);
    println!("ingested_at:  {}", format_ts_iso(blob.ingested_at));
    if let Some(ref raw) = blob.raw_text {
        println!("raw preview:  {}", preview(raw, config.ingest.preview_chars));
    }
    println!();

    println!("--- Records ({}) ---", results.rows.len());
    match &results.rows {
        TableRows::Events(rows) => {
            for row in rows {
                println!(
                    "[{}] ts={} person={} city={} amount={} category={} parse_ok={}",
                    row.seq,
                    row.event_timestamp.as_deref().unwrap_or("-"),
                    row.person.as_deref().unwrap_or("-"),
                    row.city.as_deref().unwrap_or("-"),
                    row.amount.map(|a| a.to_string()).unwrap_or_else(|| "-".into()),
                    row.category.as_deref().unwrap_or("-"),
                    row.parse_ok,
                );
            }
        }
        TableRows::Logs(rows) => {
            for row in rows {
                println!(
                    "[{}] ts={} level={} service={} code={} message={}",
                    row.seq,
                    row.timestamp.as_deref().unwrap_or("-"),
                    row.level.as_deref().unwrap_or("-"),
                    row.service.as_deref().unwrap_or("-"),
                    row.code.as_deref().unwrap_or("-"),
                    row.message,
                );
            }
        }
        TableRows::Images(rows) => {
            for row in rows {
                println!(
                    "{} {}x{} taken_at={} camera={} {}",
                    row.filename,
                    row.width.map(|w| w.to_string()).unwrap_or_else(|| "?".into()),
                    row.height.map(|h| h.to_string()).unwrap_or_else(|| "?".into()),
                    row.taken_at.as_deref().unwrap_or("-"),
                    row.camera_make.as_deref().unwrap_or("-"),
                    row.camera_model.as_deref().unwrap_or(""),
                );
            }
        }
        TableRows::Audio(rows) => {
            for row in rows {
                println!(
                    "{} duration={}s codec={} rate={} channels={}",
                    row.filename,
                    row.duration_s.map(|d| d.to_string()).unwrap_or_else(|| "?".into()),
                    row.codec.as_deref().unwrap_or("-"),
                    row.sample_rate.map(|r| r.to_string()).unwrap_or_else(|| "?".into()),
                    row.channels.map(|c| c.to_string()).unwrap_or_else(|| "?".into()),
                );
            }
        }
    }

    Ok(())
}

/// Truncated single-line preview for display surfaces.
pub fn preview(text: &str, max_chars: usize) -> String {
    let mut out: String = text.chars().take(max_chars).collect();
    if text.chars().count() > max_chars {
        out.push('…');
    }
    out.replace('\n', " ")
}

fn format_ts_iso(ts: i64) -> String {
    chrono::DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.format("%Y-%m-%dT%H:%M:%SZ").to_string())
        .unwrap_or_else(|| ts.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_truncates_and_flattens() {
        assert_eq!(preview("short", 200), "short");
        assert_eq!(preview("one\ntwo", 200), "one two");
        let long = "x".repeat(300);
        let p = preview(&long, 200);
        assert_eq!(p.chars().count(), 201); // 200 chars + ellipsis
    }
}
