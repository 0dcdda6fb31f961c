//! Curated-table administration commands: browse recent rows, delete a
//! blob's records.

use anyhow::Result;

use crate::config::Config;
use crate::get::preview;
use crate::models::ContentKind;
use crate::store::{self, TableRows};

/// CLI entry point for `tlk show <kind>`.
pub async fn run_show(config: &Config, kind: ContentKind, limit: i64) -> Result<()> {
    let pool = store::open_pool(config).await?;
    let rows = store::fetch_table(&pool, kind, limit).await?;
    pool.close().await;

    println!("{} ({} rows)", kind.as_str(), rows.len());
    let max = config.ingest.preview_chars;
    match &rows {
        TableRows::Events(rows) => {
            for row in rows {
                println!(
                    "{}#{} {} {} {} {}",
                    row.blob_id,
                    row.seq,
                    row.event_timestamp.as_deref().unwrap_or("-"),
                    row.amount
                        .map(|a| format!("{a} EUR"))
                        .unwrap_or_else(|| "-".into()),
                    row.category.as_deref().unwrap_or("-"),
                    preview(row.notes.as_deref().unwrap_or(""), max),
                );
            }
        }
        TableRows::Logs(rows) => {
            for row in rows {
                println!(
                    "{}#{} {} {} {}",
                    row.blob_id,
                    row.seq,
                    row.level.as_deref().unwrap_or("-"),
                    row.service.as_deref().unwrap_or("-"),
                    preview(&row.message, max),
                );
            }
        }
        TableRows::Images(rows) => {
            for row in rows {
                println!(
                    "{} {} {}x{}",
                    row.blob_id,
                    row.filename,
                    row.width.map(|w| w.to_string()).unwrap_or_else(|| "?".into()),
                    row.height.map(|h| h.to_string()).unwrap_or_else(|| "?".into()),
                );
            }
        }
        TableRows::Audio(rows) => {
            for row in rows {
                println!(
                    "{} {} {}s {}",
                    row.blob_id,
                    row.filename,
                    row.duration_s.map(|d| d.to_string()).unwrap_or_else(|| "?".into()),
                    row.codec.as_deref().unwrap_or("-"),
                );
            }
        }
    }

    Ok(())
}

/// CLI entry point for `tlk delete <kind> <id>`.
pub async fn run_delete(config: &Config, kind: ContentKind, blob_id: &str) -> Result<()> {
    let pool = store::open_pool(config).await?;
    let deleted = store::delete_records(&pool, kind, blob_id).await?;
    pool.close().await;

    if deleted == 0 {
        eprintln!("Error: no records for blob {blob_id}");
        std::process::exit(1);
    }

    println!("deleted {deleted} records");
    Ok(())
}
