use anyhow::Result;
use sqlx::SqlitePool;

use crate::config::Config;
use crate::store;

/// Create the schema on an already-open pool. Idempotent.
pub async fn run_migrations_on(pool: &SqlitePool) -> Result<()> {
    // Raw ingest ledger: every accepted blob lands here, whatever its kind.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS ingest_blobs (
            id TEXT PRIMARY KEY,
            source TEXT NOT NULL,
            content_type TEXT NOT NULL,
            content_kind TEXT NOT NULL,
            raw_text TEXT,
            dedup_hash TEXT NOT NULL,
            ingested_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Curated event records, one row per chunk, ordered by seq.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS events (
            blob_id TEXT NOT NULL,
            seq INTEGER NOT NULL,
            event_timestamp TEXT,
            person TEXT,
            city TEXT,
            amount REAL,
            category TEXT,
            notes TEXT,
            parse_ok INTEGER NOT NULL,
            source_line TEXT NOT NULL,
            PRIMARY KEY (blob_id, seq),
            FOREIGN KEY (blob_id) REFERENCES ingest_blobs(id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Curated log records.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS log_events (
            blob_id TEXT NOT NULL,
            seq INTEGER NOT NULL,
            timestamp TEXT,
            level TEXT,
            service TEXT,
            code TEXT,
            message TEXT NOT NULL,
            PRIMARY KEY (blob_id, seq),
            FOREIGN KEY (blob_id) REFERENCES ingest_blobs(id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Image metadata, one row per blob.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS image_features (
            blob_id TEXT PRIMARY KEY,
            filename TEXT NOT NULL,
            taken_at TEXT,
            camera_make TEXT,
            camera_model TEXT,
            width INTEGER,
            height INTEGER,
            has_gps INTEGER,
            lat REAL,
            lon REAL,
            FOREIGN KEY (blob_id) REFERENCES ingest_blobs(id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Audio metadata, one row per blob.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS audio_features (
            blob_id TEXT PRIMARY KEY,
            filename TEXT NOT NULL,
            duration_s REAL,
            codec TEXT,
            sample_rate INTEGER,
            channels INTEGER,
            FOREIGN KEY (blob_id) REFERENCES ingest_blobs(id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_events_blob_id ON events(blob_id)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_log_events_blob_id ON log_events(blob_id)")
        .execute(pool)
        .await?;
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_ingest_blobs_ingested_at ON ingest_blobs(ingested_at DESC)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn run_migrations(config: &Config) -> Result<()> {
    let pool = store::open_pool(config).await?;
    run_migrations_on(&pool).await?;
    pool.close().await;
    Ok(())
}
