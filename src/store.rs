//! SQLite persistence for raw blobs and curated records.
//!
//! The structuring engine never touches this module; the ingestion
//! pipeline hands it finished values. The store assigns blob ids (UUID
//! v4) and row positions, and exposes fetch/update/delete by curated
//! kind for the CLI and the HTTP API.

use anyhow::{bail, Result};
use serde::Serialize;
use sha2::{Digest, Sha256};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::{QueryBuilder, Row, Sqlite};
use std::str::FromStr;
use uuid::Uuid;

use crate::config::Config;
use crate::media::{AudioAttrs, ImageAttrs};
use crate::models::ContentKind;
use crate::structure::StructuredText;

pub async fn open_pool(config: &Config) -> Result<SqlitePool> {
    let db_path = &config.db.path;

    // Ensure parent directory exists
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", db_path.display()))?
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    Ok(pool)
}

fn dedup_hash(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    format!("{:x}", hasher.finalize())
}

async fn insert_blob(
    tx: &mut sqlx::Transaction<'_, Sqlite>,
    source: &str,
    content_type: &str,
    kind: ContentKind,
    raw_text: Option<&str>,
    content: &[u8],
) -> Result<String> {
    let id = Uuid::new_v4().to_string();
    let now = chrono::Utc::now().timestamp();

    sqlx::query(
        r#"
        INSERT INTO ingest_blobs (id, source, content_type, content_kind, raw_text, dedup_hash, ingested_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(source)
    .bind(content_type)
    .bind(kind.as_str())
    .bind(raw_text)
    .bind(dedup_hash(content))
    .bind(now)
    .execute(&mut **tx)
    .await?;

    Ok(id)
}

/// Persist a structured text blob: the raw text plus one curated row per
/// record, in chunk order.
pub async fn store_text_blob(
    pool: &SqlitePool,
    source: &str,
    content_type: &str,
    kind: ContentKind,
    raw_text: &str,
    structured: &StructuredText,
) -> Result<String> {
    let mut tx = pool.begin().await?;
    let blob_id = insert_blob(
        &mut tx,
        source,
        content_type,
        kind,
        Some(raw_text),
        raw_text.as_bytes(),
    )
    .await?;

    match structured {
        StructuredText::Events(records) => {
            for (seq, event) in records.iter().enumerate() {
                sqlx::query(
                    r#"
                    INSERT INTO events (blob_id, seq, event_timestamp, person, city, amount, category, notes, parse_ok, source_line)
                    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                    "#,
                )
                .bind(&blob_id)
                .bind(seq as i64)
                .bind(event.event_timestamp.map(|ts| ts.to_string()))
                .bind(&event.person)
                .bind(&event.city)
                .bind(event.amount)
                .bind(&event.category)
                .bind(&event.notes)
                .bind(event.parse_ok)
                .bind(&event.source_line)
                .execute(&mut *tx)
                .await?;
            }
        }
        StructuredText::Logs(records) => {
            for (seq, record) in records.iter().enumerate() {
                sqlx::query(
                    r#"
                    INSERT INTO log_events (blob_id, seq, timestamp, level, service, code, message)
                    VALUES (?, ?, ?, ?, ?, ?, ?)
                    "#,
                )
                .bind(&blob_id)
                .bind(seq as i64)
                .bind(record.timestamp.map(|ts| ts.to_string()))
                .bind(record.level.map(|l| l.as_str()))
                .bind(&record.service)
                .bind(&record.code)
                .bind(&record.message)
                .execute(&mut *tx)
                .await?;
            }
        }
    }

    tx.commit().await?;
    Ok(blob_id)
}

/// Persist an image upload and its decoded attribute bag.
pub async fn store_image_blob(
    pool: &SqlitePool,
    filename: &str,
    content_type: &str,
    bytes: &[u8],
    attrs: &ImageAttrs,
) -> Result<String> {
    let mut tx = pool.begin().await?;
    let blob_id = insert_blob(&mut tx, filename, content_type, ContentKind::Image, None, bytes).await?;

    sqlx::query(
        r#"
        INSERT INTO image_features (blob_id, filename, taken_at, camera_make, camera_model, width, height, has_gps, lat, lon)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&blob_id)
    .bind(filename)
    .bind(attrs.taken_at.map(|ts| ts.to_string()))
    .bind(&attrs.camera_make)
    .bind(&attrs.camera_model)
    .bind(attrs.width)
    .bind(attrs.height)
    .bind(attrs.has_gps)
    .bind(attrs.lat)
    .bind(attrs.lon)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(blob_id)
}

/// Persist an audio upload and its decoded attribute bag.
pub async fn store_audio_blob(
    pool: &SqlitePool,
    filename: &str,
    content_type: &str,
    bytes: &[u8],
    attrs: &AudioAttrs,
) -> Result<String> {
    let mut tx = pool.begin().await?;
    let blob_id = insert_blob(&mut tx, filename, content_type, ContentKind::Audio, None, bytes).await?;

    sqlx::query(
        r#"
        INSERT INTO audio_features (blob_id, filename, duration_s, codec, sample_rate, channels)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&blob_id)
    .bind(filename)
    .bind(attrs.duration_s)
    .bind(&attrs.codec)
    .bind(attrs.sample_rate)
    .bind(attrs.channels)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(blob_id)
}

/// Persist a blob nobody could decode. Raw ledger row only.
pub async fn store_unknown_blob(
    pool: &SqlitePool,
    filename: &str,
    content_type: &str,
    bytes: &[u8],
) -> Result<String> {
    let mut tx = pool.begin().await?;
    let blob_id = insert_blob(
        &mut tx,
        filename,
        content_type,
        ContentKind::Unknown,
        None,
        bytes,
    )
    .await?;
    tx.commit().await?;
    Ok(blob_id)
}

// ============ Fetch ============

/// One raw ledger row.
#[derive(Debug, Clone, Serialize)]
pub struct BlobRow {
    pub id: String,
    pub source: String,
    pub content_type: String,
    pub content_kind: String,
    pub raw_text: Option<String>,
    pub ingested_at: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct EventRow {
    pub blob_id: String,
    pub seq: i64,
    pub event_timestamp: Option<String>,
    pub person: Option<String>,
    pub city: Option<String>,
    pub amount: Option<f64>,
    pub category: Option<String>,
    pub notes: Option<String>,
    pub parse_ok: bool,
    pub source_line: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LogRow {
    pub blob_id: String,
    pub seq: i64,
    pub timestamp: Option<String>,
    pub level: Option<String>,
    pub service: Option<String>,
    pub code: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageRow {
    pub blob_id: String,
    pub filename: String,
    pub taken_at: Option<String>,
    pub camera_make: Option<String>,
    pub camera_model: Option<String>,
    pub width: Option<i64>,
    pub height: Option<i64>,
    pub has_gps: Option<bool>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AudioRow {
    pub blob_id: String,
    pub filename: String,
    pub duration_s: Option<f64>,
    pub codec: Option<String>,
    pub sample_rate: Option<i64>,
    pub channels: Option<i64>,
}

/// Typed rows from one curated table.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum TableRows {
    Events(Vec<EventRow>),
    Logs(Vec<LogRow>),
    Images(Vec<ImageRow>),
    Audio(Vec<AudioRow>),
}

impl TableRows {
    pub fn len(&self) -> usize {
        match self {
            TableRows::Events(rows) => rows.len(),
            TableRows::Logs(rows) => rows.len(),
            TableRows::Images(rows) => rows.len(),
            TableRows::Audio(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub async fn fetch_blob(pool: &SqlitePool, id: &str) -> Result<Option<BlobRow>> {
    let row = sqlx::query(
        "SELECT id, source, content_type, content_kind, raw_text, ingested_at FROM ingest_blobs WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|row| BlobRow {
        id: row.get("id"),
        source: row.get("source"),
        content_type: row.get("content_type"),
        content_kind: row.get("content_kind"),
        raw_text: row.get("raw_text"),
        ingested_at: row.get("ingested_at"),
    }))
}

/// Records for one blob, in chunk order.
pub async fn fetch_records(pool: &SqlitePool, kind: ContentKind, blob_id: &str) -> Result<TableRows> {
    fetch_rows(pool, kind, Some(blob_id), 10_000).await
}

/// Most recent rows of one curated table (table browsing surface).
pub async fn fetch_table(pool: &SqlitePool, kind: ContentKind, limit: i64) -> Result<TableRows> {
    fetch_rows(pool, kind, None, limit).await
}

async fn fetch_rows(
    pool: &SqlitePool,
    kind: ContentKind,
    blob_id: Option<&str>,
    limit: i64,
) -> Result<TableRows> {
    let (table, order) = match kind {
        ContentKind::TextEvents => ("events", "blob_id, seq"),
        ContentKind::TextLogs => ("log_events", "blob_id, seq"),
        ContentKind::Image => ("image_features", "rowid DESC"),
        ContentKind::Audio => ("audio_features", "rowid DESC"),
        ContentKind::Unknown => bail!("kind has no curated table: UNKNOWN"),
    };

    let sql = match blob_id {
        Some(_) => format!("SELECT * FROM {table} WHERE blob_id = ? ORDER BY {order} LIMIT ?"),
        None => format!("SELECT * FROM {table} ORDER BY {order} LIMIT ?"),
    };

    let mut query = sqlx::query(&sql);
    if let Some(id) = blob_id {
        query = query.bind(id);
    }
    let rows = query.bind(limit).fetch_all(pool).await?;

    let table_rows = match kind {
        ContentKind::TextEvents => TableRows::Events(
            rows.iter()
                .map(|row| EventRow {
                    blob_id: row.get("blob_id"),
                    seq: row.get("seq"),
                    event_timestamp: row.get("event_timestamp"),
                    person: row.get("person"),
                    city: row.get("city"),
                    amount: row.get("amount"),
                    category: row.get("category"),
                    notes: row.get("notes"),
                    parse_ok: row.get("parse_ok"),
                    source_line: row.get("source_line"),
                })
                .collect(),
        ),
        ContentKind::TextLogs => TableRows::Logs(
            rows.iter()
                .map(|row| LogRow {
                    blob_id: row.get("blob_id"),
                    seq: row.get("seq"),
                    timestamp: row.get("timestamp"),
                    level: row.get("level"),
                    service: row.get("service"),
                    code: row.get("code"),
                    message: row.get("message"),
                })
                .collect(),
        ),
        ContentKind::Image => TableRows::Images(
            rows.iter()
                .map(|row| ImageRow {
                    blob_id: row.get("blob_id"),
                    filename: row.get("filename"),
                    taken_at: row.get("taken_at"),
                    camera_make: row.get("camera_make"),
                    camera_model: row.get("camera_model"),
                    width: row.get("width"),
                    height: row.get("height"),
                    has_gps: row.get("has_gps"),
                    lat: row.get("lat"),
                    lon: row.get("lon"),
                })
                .collect(),
        ),
        ContentKind::Audio => TableRows::Audio(
            rows.iter()
                .map(|row| AudioRow {
                    blob_id: row.get("blob_id"),
                    filename: row.get("filename"),
                    duration_s: row.get("duration_s"),
                    codec: row.get("codec"),
                    sample_rate: row.get("sample_rate"),
                    channels: row.get("channels"),
                })
                .collect(),
        ),
        ContentKind::Unknown => unreachable!(),
    };

    Ok(table_rows)
}

// ============ Update / delete ============

fn editable_columns(kind: ContentKind) -> Result<(&'static str, &'static [&'static str])> {
    match kind {
        ContentKind::TextEvents => Ok((
            "events",
            &[
                "event_timestamp",
                "person",
                "city",
                "amount",
                "category",
                "notes",
                "parse_ok",
                "source_line",
            ][..],
        )),
        ContentKind::TextLogs => Ok((
            "log_events",
            &["timestamp", "level", "service", "code", "message"][..],
        )),
        ContentKind::Image => Ok((
            "image_features",
            &[
                "filename",
                "taken_at",
                "camera_make",
                "camera_model",
                "width",
                "height",
                "has_gps",
                "lat",
                "lon",
            ][..],
        )),
        ContentKind::Audio => Ok((
            "audio_features",
            &["filename", "duration_s", "codec", "sample_rate", "channels"][..],
        )),
        ContentKind::Unknown => bail!("kind has no curated table: UNKNOWN"),
    }
}

/// Apply a column → value map to every record of one blob. Column names
/// are checked against a per-table whitelist; the key columns are never
/// editable. Returns the number of affected rows (0 when the id is
/// unknown).
pub async fn update_records(
    pool: &SqlitePool,
    kind: ContentKind,
    blob_id: &str,
    updates: &serde_json::Map<String, serde_json::Value>,
) -> Result<u64> {
    let (table, allowed) = editable_columns(kind)?;

    let fields: Vec<(&String, &serde_json::Value)> = updates
        .iter()
        .filter(|(col, _)| allowed.contains(&col.as_str()))
        .collect();
    if fields.is_empty() {
        bail!("no editable fields in update payload");
    }

    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(format!("UPDATE {table} SET "));
    for (i, (col, value)) in fields.iter().enumerate() {
        if i > 0 {
            qb.push(", ");
        }
        // col is whitelisted above, never caller-controlled SQL
        qb.push(format!("{col} = "));
        match value {
            serde_json::Value::Null => {
                qb.push_bind(Option::<String>::None);
            }
            serde_json::Value::Bool(b) => {
                qb.push_bind(*b);
            }
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    qb.push_bind(i);
                } else {
                    qb.push_bind(n.as_f64());
                }
            }
            serde_json::Value::String(s) => {
                qb.push_bind(s.clone());
            }
            other => {
                qb.push_bind(other.to_string());
            }
        }
    }
    qb.push(" WHERE blob_id = ");
    qb.push_bind(blob_id);

    let result = qb.build().execute(pool).await?;
    Ok(result.rows_affected())
}

/// Delete every curated record of one blob. Returns affected rows.
pub async fn delete_records(pool: &SqlitePool, kind: ContentKind, blob_id: &str) -> Result<u64> {
    let (table, _) = editable_columns(kind)?;
    let result = sqlx::query(&format!("DELETE FROM {table} WHERE blob_id = ?"))
        .bind(blob_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
