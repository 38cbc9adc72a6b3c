//! HTTP server for the analysis proxy
//!
//! Routes:
//! - `GET /api/analyze/stream?url=` relays (or replays) an analysis as an event stream
//! - `POST /api/analyze` answers with a fixed stub verdict
//! - `GET /api/history/stats` proxies admin statistics
//! - `GET /api/library` and `GET /api/article/{id}` serve the article catalog
//! - `GET /health` reports liveness and the analysis mode

use axum::{
    Json, Router,
    body::Body,
    extract::{Path, Query, State},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use futures::StreamExt;
use serde::Deserialize;
use serde_json::{Value, json};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use super::error::ApiError;
use super::relay::{canned_stream, spawn_live_relay};
use crate::admin::handlers::history_stats_handler;
use crate::analysis::{AnalysisRequest, CannedScript};
use crate::catalog::{Article, ArticleCatalog};
use crate::config::{AnalysisMode, Config};
use crate::error::{FactGuardError, Result};
use crate::sse::EVENT_STREAM_CONTENT_TYPE;

/// Shared application state for all handlers
///
/// Everything here is fixed at startup; handlers only read it.
pub struct AppState {
    pub config: Config,
    /// HTTP client for upstream requests (no overall timeout; streams may run long)
    pub client: reqwest::Client,
    pub canned: Arc<CannedScript>,
    pub catalog: Arc<ArticleCatalog>,
}

impl AppState {
    pub fn new(config: Config, canned: CannedScript, catalog: ArticleCatalog) -> Result<Self> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| FactGuardError::Server(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            config,
            client,
            canned: Arc::new(canned),
            catalog: Arc::new(catalog),
        })
    }
}

/// The Fact Guard HTTP server
pub struct FactGuardServer {
    state: Arc<AppState>,
}

impl FactGuardServer {
    pub fn new(state: AppState) -> Self {
        Self {
            state: Arc::new(state),
        }
    }

    /// Bind the configured address and serve until Ctrl+C / SIGTERM
    pub async fn serve(&self) -> Result<()> {
        let config = &self.state.config;
        let addr: SocketAddr = config
            .server
            .listen_addr
            .parse()
            .map_err(|e| FactGuardError::Config(format!("Invalid listen address: {e}")))?;

        match config.analysis.mode() {
            AnalysisMode::Fake => tracing::info!("Analysis mode: fake (canned analysis replay)"),
            AnalysisMode::Live => tracing::info!(
                "Analysis mode: live (upstream {})",
                config.analysis.upstream_url
            ),
        }
        tracing::info!("Admin stats upstream: {}", config.admin.stats_url);
        if config.admin.token.is_empty() {
            tracing::warn!("No admin token configured, stats requests will likely be rejected");
        }
        tracing::info!("Library: {} articles", self.state.catalog.len());

        let app = create_router(self.state.clone());

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| FactGuardError::Server(format!("Failed to bind to {addr}: {e}")))?;

        tracing::info!("Listening on {addr}");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| FactGuardError::Server(format!("Server error: {e}")))?;

        tracing::info!("Server shut down gracefully");
        Ok(())
    }
}

/// Create the router with all routes configured
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/analyze", post(analyze_stub_handler))
        .route("/api/analyze/stream", get(analyze_stream_handler))
        .route("/api/history/stats", get(history_stats_handler))
        .route("/api/library", get(library_handler))
        .route("/api/article/{id}", get(article_handler))
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-cache, no-store, must-revalidate"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::PRAGMA,
            HeaderValue::from_static("no-cache"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::EXPIRES,
            HeaderValue::from_static("0"),
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_handler(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "mode": state.config.analysis.mode().as_str(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct StreamQuery {
    pub url: Option<String>,
}

/// Stream an analysis of `url` as `text/event-stream`
async fn analyze_stream_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<StreamQuery>,
) -> std::result::Result<Response, ApiError> {
    let url = query.url.ok_or(ApiError::MissingUrl)?;

    let body = match state.config.analysis.mode() {
        AnalysisMode::Fake => {
            tracing::debug!("Replaying canned analysis for {url}");
            let events = state
                .canned
                .events_for(&url)
                .map_err(|e| ApiError::Internal(e.to_string()))?;
            let delay = Duration::from_millis(state.config.analysis.fake_event_delay_ms);
            Body::from_stream(canned_stream(events, delay).map(Ok::<_, Infallible>))
        }
        AnalysisMode::Live => {
            let stream = spawn_live_relay(
                state.client.clone(),
                state.config.analysis.upstream_url.clone(),
                AnalysisRequest::new(url),
            );
            Body::from_stream(stream.map(Ok::<_, Infallible>))
        }
    };

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, EVENT_STREAM_CONTENT_TYPE)],
        body,
    )
        .into_response())
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeStubRequest {
    pub url: Option<String>,
}

/// Fixed verdict kept for clients of the pre-streaming API
async fn analyze_stub_handler(Json(request): Json<AnalyzeStubRequest>) -> Json<Value> {
    Json(json!({
        "result": "ok",
        "url": request.url,
        "verdict": "likely true",
        "score": 0.87,
    }))
}

async fn library_handler(State(state): State<Arc<AppState>>) -> Json<Vec<Article>> {
    Json(state.catalog.all().to_vec())
}

async fn article_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> std::result::Result<Json<Article>, ApiError> {
    state
        .catalog
        .get(id)
        .cloned()
        .map(Json)
        .ok_or(ApiError::NotFound(id))
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        },
    }
}
