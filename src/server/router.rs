use crate::server::routes;
use crate::service::Catalog;

use axum::{
    Router,
    extract::{MatchedPath, Request},
    http::{HeaderName, HeaderValue, Method, StatusCode, Version},
    middleware::{self, Next},
    response::Response,
};
use base64::Engine as _;
use rand::RngCore;
use std::time::Instant;
use tracing::{error, info, warn};

const MAX_REQUEST_ID_LEN: usize = 128;
const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

fn generate_request_id() -> String {
    // 96 bits => 16 chars base64url (no padding).
    let mut bytes = [0u8; 12];
    rand::rng().fill_bytes(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

fn format_http_version(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "HTTP/0.9",
        Version::HTTP_10 => "HTTP/1.0",
        Version::HTTP_11 => "HTTP/1.1",
        Version::HTTP_2 => "HTTP/2",
        Version::HTTP_3 => "HTTP/3",
        _ => "HTTP/?",
    }
}

#[derive(Clone)]
pub struct CinemaState {
    pub catalog: Catalog,
}

impl CinemaState {
    pub fn new(catalog: Catalog) -> Self {
        Self { catalog }
    }
}

async fn not_found_handler() -> StatusCode {
    StatusCode::NOT_FOUND
}

/// One access-log line. `route` is the matched template (e.g. `/api/movie/{id}`),
/// so requests for different ids group together; `-` when nothing matched.
fn access_line(
    status: StatusCode,
    request_id: &str,
    method: &Method,
    version: Version,
    route: &str,
    path: &str,
    latency_ms: u64,
) -> String {
    format!(
        "| {:>3} | {} | {:^7} | {:<8} | {} {} | {}ms",
        status.as_u16(),
        request_id,
        method.as_str(),
        format_http_version(version),
        route,
        path,
        latency_ms,
    )
}

async fn access_log(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let version = req.version();
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| "-".to_string(), |m| m.as_str().to_string());

    let request_id = req
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty() && v.len() <= MAX_REQUEST_ID_LEN)
        .map_or_else(generate_request_id, str::to_string);

    let start = Instant::now();
    let mut resp = next.run(req).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        resp.headers_mut().insert(X_REQUEST_ID, value);
    }

    let status = resp.status();
    let latency_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
    let line = access_line(
        status, &request_id, &method, version, &route, &path, latency_ms,
    );

    if status.is_server_error() {
        error!("{line}");
    } else if status.is_client_error() {
        warn!("{line}");
    } else {
        info!("{line}");
    }

    resp
}

pub fn cinema_router(state: CinemaState) -> Router {
    Router::new()
        .merge(routes::router())
        .fallback(not_found_handler)
        .with_state(state)
        .layer(middleware::from_fn(access_log))
}
