/// HTTP endpoint for running flood-discharge analyses
///
/// A thin JSON shell over `compute_analysis` so external tools (spreadsheets,
/// notebooks, the old web form) can submit a station table and parameters.
/// Nothing is stored between requests.
///
/// Endpoints:
/// - GET  /health       - Service health check
/// - GET  /example-data - Preview of the configured example station table
/// - POST /analyze      - Run an analysis on posted rows or the example table

use crate::analysis::report::compute_analysis;
use crate::config::{ParameterDefaults, ServiceConfig};
use crate::dataset::Dataset;
use chrono::Utc;
use log::{error, info, warn};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::io::Read;

const SERVICE_NAME: &str = env!("CARGO_PKG_NAME");
const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");

const AVAILABLE_ENDPOINTS: [&str; 3] = ["GET /health", "GET /example-data", "POST /analyze"];

// ---------------------------------------------------------------------------
// Request Types
// ---------------------------------------------------------------------------

/// State shared by every request.
#[derive(Debug, Clone)]
pub struct EndpointState {
    pub config: ServiceConfig,
}

/// Body of `POST /analyze`.
///
/// `parameters` is kept as raw JSON so a malformed value can be echoed back
/// unchanged in the error response.
#[derive(Debug, Default, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub parameters: Value,
    #[serde(default)]
    pub rows: Option<Vec<Map<String, Value>>>,
    #[serde(default)]
    pub use_example_data: bool,
}

// ---------------------------------------------------------------------------
// Routing
// ---------------------------------------------------------------------------

/// Maps a request to a status code and JSON body. Pure apart from reading
/// the example dataset from disk.
pub fn route(method: &str, url: &str, body: &str, state: &EndpointState) -> (u16, Value) {
    let path = url.split('?').next().unwrap_or(url);

    match (method, path) {
        ("GET", "/health") => handle_health(),
        ("GET", "/example-data") => handle_example_data(state),
        ("POST", "/analyze") => handle_analyze(body, state),
        (_, "/health") | (_, "/example-data") | (_, "/analyze") => (
            405,
            json!({
                "error": format!("Method {} not allowed on {}", method, path),
                "available_endpoints": AVAILABLE_ENDPOINTS,
            }),
        ),
        _ => (
            404,
            json!({
                "error": "Not found",
                "available_endpoints": AVAILABLE_ENDPOINTS,
            }),
        ),
    }
}

/// Handle /health endpoint
fn handle_health() -> (u16, Value) {
    (
        200,
        json!({
            "status": "ok",
            "service": SERVICE_NAME,
            "version": SERVICE_VERSION,
            "time": Utc::now().to_rfc3339(),
        }),
    )
}

/// Handle /example-data endpoint
fn handle_example_data(state: &EndpointState) -> (u16, Value) {
    match Dataset::from_path(&state.config.dataset.example_path) {
        Ok(dataset) => {
            let preview = dataset.preview();
            (
                200,
                json!({
                    "status": "success",
                    "columns": preview.columns,
                    "sample_data": preview.sample_data,
                    "total_rows": preview.total_rows,
                }),
            )
        }
        Err(e) => {
            error!("Failed to load example data: {}", e);
            (
                500,
                json!({
                    "status": "error",
                    "message": format!("Error loading example data: {}", e),
                }),
            )
        }
    }
}

/// Handle /analyze endpoint
fn handle_analyze(body: &str, state: &EndpointState) -> (u16, Value) {
    let request: AnalyzeRequest = match serde_json::from_str(body) {
        Ok(request) => request,
        Err(e) => {
            return bad_request(format!("Invalid request body: {}", e), Value::Null);
        }
    };

    let overrides = if request.parameters.is_null() {
        ParameterDefaults::default()
    } else {
        match ParameterDefaults::deserialize(&request.parameters) {
            Ok(overrides) => overrides,
            Err(e) => {
                return bad_request(format!("Invalid parameters: {}", e), request.parameters);
            }
        }
    };

    let params = match state.config.parameters.overlay(&overrides).resolve() {
        Ok(params) => params,
        Err(e) => return bad_request(e.to_string(), request.parameters),
    };

    let dataset = match (request.rows, request.use_example_data) {
        (Some(rows), _) => Dataset::from_records(&rows),
        (None, true) => Dataset::from_path(&state.config.dataset.example_path),
        (None, false) => {
            return bad_request(
                "No data provided: send \"rows\" or set \"use_example_data\"".to_string(),
                request.parameters,
            );
        }
    };
    let dataset = match dataset {
        Ok(dataset) => dataset,
        Err(e) => return bad_request(e.to_string(), request.parameters),
    };

    match compute_analysis(&dataset, &params) {
        Ok(result) => match serde_json::to_value(&result) {
            Ok(value) => {
                info!(
                    "Analysis complete: {} stations in radius, {} flood metrics",
                    result.filtered_stations.len(),
                    result.flood_metrics.len()
                );
                (200, value)
            }
            Err(e) => (500, json!({ "error": format!("Failed to serialize result: {}", e) })),
        },
        Err(e) => {
            warn!("Analysis rejected: {}", e);
            bad_request(e.to_string(), request.parameters)
        }
    }
}

fn bad_request(message: String, parameters: Value) -> (u16, Value) {
    (400, json!({ "error": message, "parameters": parameters }))
}

// ---------------------------------------------------------------------------
// HTTP Server
// ---------------------------------------------------------------------------

/// Start HTTP endpoint server on the specified port. Blocks forever.
pub fn start_endpoint_server(port: u16, state: EndpointState) -> Result<(), String> {
    let server = tiny_http::Server::http(format!("0.0.0.0:{}", port))
        .map_err(|e| format!("Failed to start HTTP server: {}", e))?;

    println!("📡 HTTP endpoint listening on http://0.0.0.0:{}", port);
    println!("   GET  /health       - Service health check");
    println!("   GET  /example-data - Preview the example station table");
    println!("   POST /analyze      - Run a flood-discharge analysis\n");

    let max_body_bytes = state.config.endpoint.max_body_bytes;

    for mut request in server.incoming_requests() {
        let method = request.method().as_str().to_uppercase();
        let url = request.url().to_string();

        let (status, json) = match read_body(&mut request, max_body_bytes) {
            Ok(body) => route(&method, &url, &body, &state),
            Err((status, message)) => (status, json!({ "error": message })),
        };
        info!("{} {} -> {}", method, url, status);

        if let Err(e) = request.respond(create_response(status, json)) {
            error!("Failed to send response: {}", e);
        }
    }

    Ok(())
}

/// Reads the request body, refusing anything over `max_bytes`.
fn read_body(request: &mut tiny_http::Request, max_bytes: usize) -> Result<String, (u16, String)> {
    if request.body_length().is_some_and(|len| len > max_bytes) {
        return Err((413, format!("Request body exceeds {} bytes", max_bytes)));
    }

    let mut bytes = Vec::new();
    request
        .as_reader()
        .take(max_bytes as u64 + 1)
        .read_to_end(&mut bytes)
        .map_err(|e| (400, format!("Failed to read request body: {}", e)))?;
    if bytes.len() > max_bytes {
        return Err((413, format!("Request body exceeds {} bytes", max_bytes)));
    }

    String::from_utf8(bytes).map_err(|_| (400, "Request body is not valid UTF-8".to_string()))
}

/// Create HTTP response with JSON body
fn create_response(status_code: u16, json: Value) -> tiny_http::Response<std::io::Cursor<Vec<u8>>> {
    let body = serde_json::to_string_pretty(&json).unwrap_or_else(|_| json.to_string());
    let mut response = tiny_http::Response::from_data(body.into_bytes())
        .with_status_code(tiny_http::StatusCode::from(status_code));

    if let Ok(header) = tiny_http::Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]) {
        response = response.with_header(header);
    }
    response
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
