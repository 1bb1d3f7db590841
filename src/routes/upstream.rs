use std::time::Duration;

use axum::{
    body::{to_bytes, Body, Bytes},
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    response::Response,
};
use http_body_util::LengthLimitError;

use crate::AppState;

/// Largest request body forwarded to the web client server.
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Headers that describe a single hop and must not be forwarded.
const HOP_BY_HOP: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
    "host",
    "content-length",
];

/// The web client server allowed requests are forwarded to.
#[derive(Debug, Clone)]
pub struct Upstream {
    client: reqwest::Client,
    base: String,
}

impl Upstream {
    pub fn new(base: &str) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            // Redirects from the client server go back to the browser untouched.
            .redirect(reqwest::redirect::Policy::none())
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            base: base.trim_end_matches('/').to_string(),
        })
    }

    pub fn base(&self) -> &str {
        &self.base
    }
}

fn forwardable(headers: &HeaderMap) -> HeaderMap {
    headers
        .iter()
        .filter(|(name, _)| !HOP_BY_HOP.contains(&name.as_str()))
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect()
}

/// Buffers the request body; only an oversized body is a 413.
async fn read_body(body: Body, limit: usize) -> Result<Bytes, StatusCode> {
    to_bytes(body, limit).await.map_err(|e| {
        if e.into_inner().is::<LengthLimitError>() {
            StatusCode::PAYLOAD_TOO_LARGE
        } else {
            StatusCode::BAD_REQUEST
        }
    })
}

/// Fallback handler: replays the request against the upstream once.
pub async fn proxy(State(state): State<AppState>, request: Request) -> Result<Response, StatusCode> {
    let upstream = state.upstream.as_ref().ok_or(StatusCode::NOT_FOUND)?;

    let (parts, body) = request.into_parts();
    let path_and_query = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    let url = format!("{}{}", upstream.base, path_and_query);

    let body = read_body(body, MAX_BODY_BYTES).await?;

    let response = upstream
        .client
        .request(parts.method, &url)
        .headers(forwardable(&parts.headers))
        .body(body)
        .send()
        .await
        .map_err(|e| {
            tracing::warn!(error = %e, url = %url, "Upstream request failed");
            StatusCode::BAD_GATEWAY
        })?;

    let status = response.status();
    let headers = forwardable(response.headers());
    let bytes = response.bytes().await.map_err(|e| {
        tracing::warn!(error = %e, url = %url, "Upstream body read failed");
        StatusCode::BAD_GATEWAY
    })?;

    let mut out = Response::new(Body::from(bytes));
    *out.status_mut() = status;
    *out.headers_mut() = headers;
    Ok(out)
}
