//! HTTP server for the importer API.
//!
//! Thin plumbing over the core pipeline: handlers parse the request, call
//! into [`crate::parser`] / [`crate::import`], and shape the response. No
//! import logic lives here.
//!
//! # API Endpoints
//!
//! | Method | Path              | Description                            |
//! |--------|-------------------|----------------------------------------|
//! | GET    | `/health`         | Health check                           |
//! | GET    | `/api/config`     | Service configuration (token omitted)  |
//! | POST   | `/api/parse-csv`  | Upload CSV, get columns + preview      |
//! | POST   | `/api/import`     | Run the import pipeline                |
//! | GET    | `/api/logs`       | SSE stream of progress logs            |

use std::{convert::Infallible, net::SocketAddr, sync::Arc, time::Duration};

use axum::{
    extract::{Multipart, State},
    http::{header, Method, StatusCode},
    response::{sse::Event, Json, Sse},
    routing::{get, post},
    Router,
};
use futures::stream::Stream;
use serde_json::Value;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::CorsLayer;

use super::logs::LOG_BROADCASTER;
use super::types::{error_response, ConfigResponse, ImportRequest, ImportResponse, ParseResponse};
use crate::config::ImportConfig;
use crate::import::Importer;
use crate::ledger::http::HttpLedgerClient;
use crate::parser::parse_bytes_auto;

/// Rows shown in the upload preview.
const PREVIEW_ROWS: usize = 5;

struct AppState {
    config: ImportConfig,
    client: HttpLedgerClient,
}

/// Start the HTTP server.
pub async fn start_server(port: u16, config: ImportConfig) -> Result<(), Box<dyn std::error::Error>> {
    let client = HttpLedgerClient::new(&config)?;
    let state = Arc::new(AppState { config, client });

    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    let app = Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/api/config", get(get_config))
        .route("/api/parse-csv", post(parse_csv))
        .route("/api/import", post(import_transactions))
        .route("/api/logs", get(sse_logs))
        .layer(cors)
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    println!("🚀 Ledgerload server running on http://localhost:{}", port);
    println!("   POST /api/parse-csv - Upload CSV file");
    println!("   POST /api/import    - Import transactions");
    println!("   GET  /api/logs      - SSE log stream");
    println!("   GET  /health        - Health check");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Health check endpoint.
async fn health() -> Json<Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "ledgerload",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Current configuration, without the token.
async fn get_config(State(state): State<Arc<AppState>>) -> Json<ConfigResponse> {
    Json(ConfigResponse {
        configured: !state.config.token.is_empty(),
        base_url: state.config.base_url.clone(),
        default_currency: state.config.default_currency.clone(),
    })
}

/// SSE endpoint for real-time progress logs.
async fn sse_logs() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = LOG_BROADCASTER.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(entry) => {
            let json = serde_json::to_string(&entry).ok()?;
            Some(Ok(Event::default().data(json)))
        }
        Err(_) => None,
    });

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

/// Upload a CSV and return its columns plus a row preview.
async fn parse_csv(
    mut multipart: Multipart,
) -> Result<Json<ParseResponse>, (StatusCode, Json<Value>)> {
    let mut file_data: Option<Vec<u8>> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            Json(error_response(&format!("Multipart error: {e}"))),
        )
    })? {
        if field.name() == Some("file") {
            let bytes = field.bytes().await.map_err(|e| {
                (
                    StatusCode::BAD_REQUEST,
                    Json(error_response(&format!("Read error: {e}"))),
                )
            })?;
            file_data = Some(bytes.to_vec());
        }
    }

    let bytes = file_data.ok_or_else(|| {
        (
            StatusCode::BAD_REQUEST,
            Json(error_response("No file provided")),
        )
    })?;

    let parsed = parse_bytes_auto(&bytes).map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            Json(error_response(&e.to_string())),
        )
    })?;

    let preview = parsed.rows.iter().take(PREVIEW_ROWS).cloned().collect();

    Ok(Json(ParseResponse {
        columns: parsed.headers,
        encoding: parsed.encoding,
        delimiter: parsed.delimiter.to_string(),
        total_rows: parsed.rows.len(),
        preview,
        rows: parsed.rows,
    }))
}

/// Run the import pipeline over already-parsed rows.
async fn import_transactions(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ImportRequest>,
) -> Result<Json<ImportResponse>, (StatusCode, Json<Value>)> {
    let importer = Importer::new(&state.client, state.config.default_currency.clone());

    let result = importer
        .run(&request.rows, &request.mapping)
        .await
        .map_err(|e| {
            (
                StatusCode::BAD_REQUEST,
                Json(error_response(&e.to_string())),
            )
        })?;

    Ok(Json(ImportResponse::from(result)))
}
