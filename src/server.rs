//! JSON HTTP API over the ingestion pipeline and record store.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/api/ingest` | Structure pasted text and persist it |
//! | `POST` | `/api/ingest-file` | Upload a file (multipart `file` field) |
//! | `GET`  | `/api/tables/{kind}` | Recent rows of one curated table |
//! | `GET`  | `/api/results/{id}` | Records derived from one blob |
//! | `PATCH` | `/api/data/{kind}/{id}` | Update a blob's curated records |
//! | `DELETE` | `/api/data/{kind}/{id}` | Delete a blob's curated records |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! # Error Contract
//!
//! All error responses share one envelope:
//!
//! ```json
//! { "error": { "code": "bad_request", "message": "raw text must not be empty" } }
//! ```
//!
//! Error codes: `bad_request` (400), `not_found` (404), `internal` (500).
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted so browser-based
//! clients can call the API directly.

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::config::Config;
use crate::get::get_results;
use crate::ingest;
use crate::models::{ContentKind, KindHint, Schema};
use crate::store;

/// Rows returned by the table-browsing endpoint.
const TABLE_PAGE_LIMIT: i64 = 50;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
struct AppState {
    config: Arc<Config>,
    pool: sqlx::SqlitePool,
}

/// Starts the HTTP server. Binds to `[server].bind` and runs until the
/// process is terminated. The database must already be initialized
/// (`tlk init`).
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let bind_addr = config.server.bind.clone();
    let pool = store::open_pool(config).await?;
    let state = AppState {
        config: Arc::new(config.clone()),
        pool,
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let body_limit = state.config.ingest.max_file_bytes + 64 * 1024; // multipart framing overhead

    let app = Router::new()
        .route("/api/ingest", post(handle_ingest))
        .route("/api/ingest-file", post(handle_ingest_file))
        .route("/api/tables/{kind}", get(handle_table))
        .route("/api/results/{id}", get(handle_results))
        .route(
            "/api/data/{kind}/{id}",
            patch(handle_update).delete(handle_delete),
        )
        .route("/health", get(handle_health))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .with_state(state);

    info!(bind = %bind_addr, "textlake API listening");
    println!("textlake API listening on http://{}", bind_addr);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request".to_string(),
        message: message.into(),
    }
}

fn not_found(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::NOT_FOUND,
        code: "not_found".to_string(),
        message: message.into(),
    }
}

fn internal(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        code: "internal".to_string(),
        message: message.into(),
    }
}

/// Maps pipeline/storage errors to the most appropriate status. Caller
/// mistakes (empty paste, oversized upload, bad payload) are 400s;
/// missing ids are 404s; everything else is a 500.
fn classify_error(err: anyhow::Error) -> AppError {
    let msg = err.to_string();
    if msg.contains("not found") || msg.contains("no curated records") {
        not_found(msg)
    } else if msg.contains("must not be empty")
        || msg.contains("is empty")
        || msg.contains("exceeds size limit")
        || msg.contains("no editable fields")
        || msg.contains("has no curated table")
    {
        bad_request(msg)
    } else {
        internal(msg)
    }
}

fn parse_kind(kind: &str) -> Result<ContentKind, AppError> {
    ContentKind::parse_curated(kind)
        .ok_or_else(|| bad_request(format!("invalid kind: {kind}")))
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ POST /api/ingest ============

#[derive(Deserialize)]
struct IngestRequest {
    raw_text: String,
    #[serde(default)]
    kind_hint: Option<String>,
    #[serde(default)]
    source: Option<String>,
}

#[derive(Serialize)]
struct IngestResponse {
    id: String,
    kind: ContentKind,
    schema: Option<Schema>,
    records: usize,
}

fn parse_hint(hint: Option<&str>) -> Result<KindHint, AppError> {
    match hint.map(|h| h.to_ascii_lowercase()) {
        None => Ok(KindHint::None),
        Some(h) if h == "logs" => Ok(KindHint::Logs),
        Some(h) if h == "events" => Ok(KindHint::Events),
        Some(h) => Err(bad_request(format!("invalid kind_hint: {h}"))),
    }
}

async fn handle_ingest(
    State(state): State<AppState>,
    Json(request): Json<IngestRequest>,
) -> Result<Json<IngestResponse>, AppError> {
    let hint = parse_hint(request.kind_hint.as_deref())?;
    let source = request.source.as_deref().unwrap_or("paste");

    let outcome = ingest::ingest_text(&state.pool, &state.config, source, hint, &request.raw_text)
        .await
        .map_err(classify_error)?;

    Ok(Json(IngestResponse {
        id: outcome.id,
        kind: outcome.kind,
        schema: outcome.schema,
        records: outcome.records,
    }))
}

// ============ POST /api/ingest-file ============

async fn handle_ingest_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<IngestResponse>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(format!("invalid multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field
            .file_name()
            .unwrap_or("upload.bin")
            .to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| bad_request(format!("failed to read upload: {e}")))?;

        let outcome =
            ingest::ingest_file(&state.pool, &state.config, &filename, &content_type, &bytes)
                .await
                .map_err(classify_error)?;

        return Ok(Json(IngestResponse {
            id: outcome.id,
            kind: outcome.kind,
            schema: outcome.schema,
            records: outcome.records,
        }));
    }

    Err(bad_request("missing multipart field: file"))
}

// ============ GET /api/tables/{kind} ============

#[derive(Serialize)]
struct RowsResponse {
    rows: store::TableRows,
}

async fn handle_table(
    State(state): State<AppState>,
    Path(kind): Path<String>,
) -> Result<Json<RowsResponse>, AppError> {
    let kind = parse_kind(&kind)?;
    let rows = store::fetch_table(&state.pool, kind, TABLE_PAGE_LIMIT)
        .await
        .map_err(classify_error)?;
    Ok(Json(RowsResponse { rows }))
}

// ============ GET /api/results/{id} ============

#[derive(Deserialize)]
struct ResultsQuery {
    #[serde(default)]
    kind: Option<String>,
}

async fn handle_results(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<ResultsQuery>,
) -> Result<Json<crate::get::ResultsResponse>, AppError> {
    let kind = match query.kind.as_deref() {
        Some(k) => Some(parse_kind(k)?),
        None => None,
    };
    let results = get_results(&state.pool, &id, kind)
        .await
        .map_err(classify_error)?;
    Ok(Json(results))
}

// ============ PATCH /api/data/{kind}/{id} ============

#[derive(Serialize)]
struct UpdateResponse {
    success: bool,
    updated: u64,
}

async fn handle_update(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, String)>,
    Json(payload): Json<serde_json::Value>,
) -> Result<Json<UpdateResponse>, AppError> {
    let kind = parse_kind(&kind)?;
    let serde_json::Value::Object(updates) = payload else {
        return Err(bad_request("update payload must be a JSON object"));
    };

    let updated = store::update_records(&state.pool, kind, &id, &updates)
        .await
        .map_err(classify_error)?;
    if updated == 0 {
        return Err(not_found(format!("no records for blob {id}")));
    }

    Ok(Json(UpdateResponse {
        success: true,
        updated,
    }))
}

// ============ DELETE /api/data/{kind}/{id} ============

#[derive(Serialize)]
struct DeleteResponse {
    success: bool,
    deleted: u64,
}

async fn handle_delete(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, String)>,
) -> Result<Json<DeleteResponse>, AppError> {
    let kind = parse_kind(&kind)?;
    let deleted = store::delete_records(&state.pool, kind, &id)
        .await
        .map_err(classify_error)?;
    if deleted == 0 {
        return Err(not_found(format!("no records for blob {id}")));
    }

    Ok(Json(DeleteResponse {
        success: true,
        deleted,
    }))
}
