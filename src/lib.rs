//! # textlake
//!
//! A local-first lab for turning messy text and media into queryable
//! structured records.
//!
//! textlake ingests pasted notes and uploaded files, decides whether a
//! text blob is log-shaped or event-shaped, extracts typed fields from
//! every chunk with deterministic surface patterns, and persists both
//! the raw blob and its derived records in SQLite — browsable from a
//! CLI and a JSON HTTP API.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌───────────────────┐   ┌──────────┐
//! │ Paste/Upload │──▶│ Classify + Extract │──▶│  SQLite  │
//! │ text · media │   │  or Media Decode  │   │  tables  │
//! └──────────────┘   └───────────────────┘   └────┬─────┘
//!                                                 │
//!                             ┌───────────────────┤
//!                             ▼                   ▼
//!                        ┌──────────┐       ┌──────────┐
//!                        │   CLI    │       │   HTTP   │
//!                        │  (tlk)   │       │  (JSON)  │
//!                        └──────────┘       └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! tlk init                        # create database
//! tlk ingest notes.txt            # structure pasted/piped text
//! tlk ingest --kind logs app.log  # force the log schema
//! tlk show text_events            # browse a curated table
//! tlk serve                       # start the JSON API
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types and kind detection |
//! | [`patterns`] | Field-level pattern matchers |
//! | [`chunk`] | Line and sentence chunkers |
//! | [`classify`] | LOG/EVENT blob classification |
//! | [`structure`] | Extractors and the structuring orchestrator |
//! | [`media`] | Opaque image/audio metadata decoders |
//! | [`ingest`] | Ingestion pipeline |
//! | [`store`] | SQLite persistence |
//! | [`migrate`] | Schema migrations |
//! | [`get`] | Per-blob record retrieval |
//! | [`tables`] | Curated-table administration |
//! | [`server`] | JSON HTTP server |

pub mod chunk;
pub mod classify;
pub mod config;
pub mod get;
pub mod ingest;
pub mod media;
pub mod migrate;
pub mod models;
pub mod patterns;
pub mod server;
pub mod store;
pub mod structure;
pub mod tables;
