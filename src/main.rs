//! # textlake CLI (`tlk`)
//!
//! The `tlk` binary is the primary interface for textlake. It provides
//! commands for database initialization, text and file ingestion,
//! browsing curated tables, and starting the JSON HTTP server.
//!
//! ## Usage
//!
//! ```bash
//! tlk --config ./config/tlk.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `tlk init` | Create the SQLite database and run schema migrations |
//! | `tlk ingest [FILE]` | Structure pasted/piped text into records |
//! | `tlk ingest-file <path>` | Upload a file (text, image, or audio) |
//! | `tlk show <kind>` | Browse recent rows of a curated table |
//! | `tlk get <id>` | Show the records derived from one blob |
//! | `tlk delete <kind> <id>` | Delete a blob's curated records |
//! | `tlk serve` | Start the JSON HTTP server |

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use textlake::config;
use textlake::ingest;
use textlake::migrate;
use textlake::models::{ContentKind, KindHint};
use textlake::server;
use textlake::tables;

/// textlake — a local-first lab for structuring messy text and media
/// into queryable records.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/tlk.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "tlk",
    about = "textlake — structure messy text and media into queryable records",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/tlk.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Creates the SQLite database file and all required tables. This
    /// command is idempotent — running it multiple times is safe.
    Init,

    /// Structure pasted or piped text into records.
    ///
    /// Reads from FILE when given, otherwise from stdin. Without a
    /// `--kind` hint the classifier decides whether the text is
    /// log-shaped or event-shaped.
    Ingest {
        /// File to read the raw text from (stdin when omitted).
        file: Option<PathBuf>,

        /// Declared shape of the text: `events` or `logs`. Only `logs`
        /// bypasses classification.
        #[arg(long)]
        kind: Option<String>,

        /// Label stored with the blob (defaults to `paste`).
        #[arg(long, default_value = "paste")]
        source: String,
    },

    /// Ingest a file from disk: text is structured, images and audio are
    /// metadata-decoded, anything else is kept raw.
    IngestFile {
        /// Path to the file to ingest.
        path: PathBuf,
    },

    /// Browse recent rows of a curated table.
    ///
    /// Kind is one of `text_events`, `text_logs`, `image`, `audio`.
    Show {
        kind: String,

        /// Maximum number of rows to print.
        #[arg(long, default_value_t = 50)]
        limit: i64,
    },

    /// Show the records derived from one blob.
    Get {
        /// Blob UUID (printed by `ingest`).
        id: String,

        /// Curated kind to read (defaults to the blob's stored kind).
        #[arg(long)]
        kind: Option<String>,
    },

    /// Delete a blob's curated records.
    Delete {
        kind: String,
        id: String,
    },

    /// Start the JSON HTTP server.
    ///
    /// Binds to the address configured in `[server].bind`.
    Serve,
}

fn parse_kind_arg(kind: &str) -> Result<ContentKind> {
    ContentKind::parse_curated(kind)
        .ok_or_else(|| anyhow::anyhow!("invalid kind: '{}' (expected text_events, text_logs, image, or audio)", kind))
}

fn parse_hint_arg(hint: Option<&str>) -> Result<KindHint> {
    match hint.map(|h| h.to_ascii_lowercase()) {
        None => Ok(KindHint::None),
        Some(h) if h == "logs" => Ok(KindHint::Logs),
        Some(h) if h == "events" => Ok(KindHint::Events),
        Some(h) => anyhow::bail!("invalid --kind: '{}' (expected events or logs)", h),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Ingest { file, kind, source } => {
            let raw_text = match file {
                Some(path) => std::fs::read_to_string(&path)?,
                None => std::io::read_to_string(std::io::stdin())?,
            };
            let hint = parse_hint_arg(kind.as_deref())?;
            ingest::run_ingest_text(&cfg, &source, hint, &raw_text).await?;
        }
        Commands::IngestFile { path } => {
            ingest::run_ingest_file(&cfg, &path).await?;
        }
        Commands::Show { kind, limit } => {
            tables::run_show(&cfg, parse_kind_arg(&kind)?, limit).await?;
        }
        Commands::Get { id, kind } => {
            let kind = kind.as_deref().map(parse_kind_arg).transpose()?;
            textlake::get::run_get(&cfg, &id, kind).await?;
        }
        Commands::Delete { kind, id } => {
            tables::run_delete(&cfg, parse_kind_arg(&kind)?, &id).await?;
        }
        Commands::Serve => {
            tracing_subscriber::fmt()
                .with_env_filter(
                    tracing_subscriber::EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| "info".into()),
                )
                .init();
            server::run_server(&cfg).await?;
        }
    }

    Ok(())
}
