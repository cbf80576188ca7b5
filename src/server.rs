//! HTTP report server.
//!
//! Exposes the resolver as a small read-only REST-style API. Every request
//! triggers a fresh fetch of the source page and a merge into the store
//! before the report is rendered.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/api/v1.0/results` | Newest stored entries (default window) |
//! | `GET` | `/api/v1.0/results/{n}` | `n` entries, live page first, store fallback |
//! | `GET` | `/api/v1.0/resultsForArea/{area}` | Stored entries for an area code |
//! | `GET` | `/api/v1.0/resultsForArea/{area}/{n}` | As above, truncated to `n` |
//! | `GET` | `/health` | Health check (returns version) |
//!
//! Reports are `text/plain`. Errors are JSON:
//!
//! ```json
//! { "error": { "code": "fetch_error", "message": "fetch failed: ..." } }
//! ```
//!
//! Error codes: `bad_request` (400), `fetch_error` (502),
//! `extract_error` (502), `store_error` (500).

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

use notes_reporter_core::report::{self, ReportQuery};
use notes_reporter_core::resolver::{ResolveError, Resolver};

use crate::app;
use crate::config::Config;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
struct AppState {
    resolver: Arc<Resolver>,
}

/// Starts the report server on `[server].bind` and runs until the process
/// is terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let resolver = app::build_resolver(config).await?;
    run_server_with_resolver(&config.server.bind, Arc::new(resolver)).await
}

/// Starts the server with an already-built resolver.
pub async fn run_server_with_resolver(bind: &str, resolver: Arc<Resolver>) -> anyhow::Result<()> {
    let app = router(resolver);

    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!("Report server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}

/// Builds the route table over `resolver`.
pub fn router(resolver: Arc<Resolver>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/v1.0/results", get(handle_results))
        .route("/api/v1.0/results/{n}", get(handle_results_with_limit))
        .route("/api/v1.0/resultsForArea/{area}", get(handle_area))
        .route(
            "/api/v1.0/resultsForArea/{area}/{n}",
            get(handle_area_with_limit),
        )
        .route("/health", get(handle_health))
        .layer(cors)
        .with_state(AppState { resolver })
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
    code: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code.to_string(),
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request",
        message: message.into(),
    }
}

impl From<ResolveError> for AppError {
    fn from(err: ResolveError) -> Self {
        let (status, code) = match &err {
            ResolveError::Fetch(_) => (StatusCode::BAD_GATEWAY, "fetch_error"),
            ResolveError::Extract(_) => (StatusCode::BAD_GATEWAY, "extract_error"),
            ResolveError::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, "store_error"),
        };
        error!("{}", err);
        AppError {
            status,
            code,
            message: err.to_string(),
        }
    }
}

fn parse_count(raw: &str) -> Result<usize, AppError> {
    raw.parse::<usize>()
        .map_err(|_| bad_request(format!("result count must be a non-negative integer, got '{}'", raw)))
}

// ============ Handlers ============

async fn render_report(state: &AppState, query: ReportQuery) -> Result<String, AppError> {
    let entries = report::select(&state.resolver, &query).await?;
    Ok(report::render(&entries))
}

async fn handle_results(State(state): State<AppState>) -> Result<String, AppError> {
    render_report(&state, ReportQuery::latest(None)).await
}

async fn handle_results_with_limit(
    State(state): State<AppState>,
    Path(n): Path<String>,
) -> Result<String, AppError> {
    let n = parse_count(&n)?;
    render_report(&state, ReportQuery::latest(Some(n))).await
}

async fn handle_area(
    State(state): State<AppState>,
    Path(area): Path<String>,
) -> Result<String, AppError> {
    render_report(&state, ReportQuery::area(area, None)).await
}

async fn handle_area_with_limit(
    State(state): State<AppState>,
    Path((area, n)): Path<(String, String)>,
) -> Result<String, AppError> {
    let n = parse_count(&n)?;
    render_report(&state, ReportQuery::area(area, Some(n))).await
}

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
