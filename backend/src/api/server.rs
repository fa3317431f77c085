//! HTTP server for the pool dashboard configuration.
//!
//! The dashboard fetches its configuration record at start-up instead of
//! having it baked into the build.
//!
//! # API Endpoints
//!
//! | Method | Path                          | Description                        |
//! |--------|-------------------------------|------------------------------------|
//! | GET    | `/health`                     | Health check                       |
//! | GET    | `/config/environment`         | Record for the server environment  |
//! | GET    | `/api/config?environment=E`   | Record for `E`                     |
//! | GET    | `/api/config/{environment}`   | Record for the path segment        |
//! | GET    | `/api/environments`           | Known and current environments     |
//! | GET    | `/api/logs`                   | SSE stream for real-time logs      |

use std::{convert::Infallible, net::SocketAddr, sync::Arc, time::Duration};

use axum::{
    extract::{Path, Query, State},
    http::{header, Method, StatusCode},
    response::{sse::Event, Json, Sse},
    routing::get,
    Router,
};
use futures::stream::Stream;
use serde_json::{json, Value};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::CorsLayer;

use super::logs::{log_error, log_info, log_success, LOG_BROADCASTER};
use super::types::{error_response, ConfigQuery, EnvironmentsResponse};
use crate::config::{ConfigurationProvider, ConfigurationRecord};
use crate::environment::Environment;
use crate::error::{ConfigError, ServerResult};

/// Shared, read-only server state.
pub struct AppState {
    pub provider: ConfigurationProvider,
    /// Environment served at `/config/environment`.
    pub environment: Environment,
}

pub type SharedState = Arc<AppState>;

type ApiError = (StatusCode, Json<Value>);

/// Build the router.
pub fn router(state: SharedState) -> Router {
    // the dashboard may be served from another origin
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/config/environment", get(current_config))
        .route("/api/config", get(config_by_query))
        .route("/api/config/{environment}", get(config_by_path))
        .route("/api/environments", get(environments))
        .route("/api/logs", get(sse_logs))
        .layer(cors)
        .with_state(state)
}

/// Start the HTTP server
pub async fn start_server(
    port: u16,
    provider: ConfigurationProvider,
    environment: Environment,
) -> ServerResult<()> {
    // fail at start-up, not on the first request
    let record = provider.resolve_env(&environment)?;

    let state = Arc::new(AppState {
        provider,
        environment,
    });
    let app = router(state.clone());

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    log_success(format!(
        "Pool config server running on http://localhost:{} ({})",
        port, state.environment
    ));
    eprintln!("   GET  /config/environment        - Current configuration");
    eprintln!("   GET  /api/config/{{environment}}  - Configuration by name");
    eprintln!("   GET  /api/environments          - Known environments");
    eprintln!("   GET  /api/logs                  - SSE log stream");
    eprintln!("   GET  /health                    - Health check");
    for line in pool_endpoints(&record) {
        log_info(line);
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Miner-facing endpoints advertised by a record.
fn pool_endpoints(record: &ConfigurationRecord) -> Vec<String> {
    vec![
        format!("Pool '{}' stratum: {}", record.app.pool_name, record.app.stratum_url()),
        format!("Pool '{}' http:    {}", record.app.pool_name, record.app.http_endpoint()),
    ]
}

/// Health check endpoint
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "kaspapool",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "config": "GET /config/environment",
            "configByName": "GET /api/config/{environment}",
            "logs": "GET /api/logs (SSE)"
        }
    }))
}

async fn current_config(
    State(state): State<SharedState>,
) -> Result<Json<ConfigurationRecord>, ApiError> {
    resolve(&state, state.environment.as_str())
}

async fn config_by_query(
    State(state): State<SharedState>,
    Query(query): Query<ConfigQuery>,
) -> Result<Json<ConfigurationRecord>, ApiError> {
    let environment = query
        .environment
        .unwrap_or_else(|| state.environment.to_string());
    resolve(&state, &environment)
}

async fn config_by_path(
    State(state): State<SharedState>,
    Path(environment): Path<String>,
) -> Result<Json<ConfigurationRecord>, ApiError> {
    resolve(&state, &environment)
}

async fn environments(State(state): State<SharedState>) -> Json<EnvironmentsResponse> {
    Json(EnvironmentsResponse::new(
        &state.environment,
        state.provider.is_strict(),
    ))
}

fn resolve(state: &AppState, environment: &str) -> Result<Json<ConfigurationRecord>, ApiError> {
    state.provider.resolve(environment).map(Json).map_err(|e| {
        log_error(format!("Config request failed: {}", e));
        let status = match e {
            ConfigError::UnknownEnvironment(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(error_response(&e.to_string())))
    })
}

/// SSE endpoint for real-time log streaming
async fn sse_logs() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = LOG_BROADCASTER.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(entry) => {
            let json = serde_json::to_string(&entry).ok()?;
            Some(Ok(Event::default().data(json)))
        }
        // lagged receivers skip what they missed
        Err(_) => None,
    });

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}
