use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    pub server: ServerConfig,
    #[serde(default)]
    pub ingest: IngestConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub bind: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct IngestConfig {
    /// Upload size cap for `ingest-file` and the multipart endpoint.
    #[serde(default = "default_max_file_bytes")]
    pub max_file_bytes: usize,
    /// Cap on raw text retained from a text upload.
    #[serde(default = "default_max_text_chars")]
    pub max_text_chars: usize,
    /// Truncation length for raw-text previews on display surfaces.
    #[serde(default = "default_preview_chars")]
    pub preview_chars: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            max_file_bytes: default_max_file_bytes(),
            max_text_chars: default_max_text_chars(),
            preview_chars: default_preview_chars(),
        }
    }
}

fn default_max_file_bytes() -> usize {
    25 * 1024 * 1024
}
fn default_max_text_chars() -> usize {
    5_000_000
}
fn default_preview_chars() -> usize {
    200
}

impl Config {
    /// Minimal in-memory configuration for tests and ad-hoc tooling.
    pub fn minimal() -> Self {
        Self {
            db: DbConfig {
                path: PathBuf::from("data/textlake.sqlite"),
            },
            server: ServerConfig {
                bind: "127.0.0.1:4000".to_string(),
            },
            ingest: IngestConfig::default(),
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    if config.ingest.max_file_bytes == 0 {
        anyhow::bail!("ingest.max_file_bytes must be > 0");
    }
    if config.ingest.max_text_chars == 0 {
        anyhow::bail!("ingest.max_text_chars must be > 0");
    }
    if config.ingest.preview_chars == 0 {
        anyhow::bail!("ingest.preview_chars must be > 0");
    }
    if config.server.bind.is_empty() {
        anyhow::bail!("server.bind must not be empty");
    }

    Ok(config)
}
