use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;

use crate::{
    models::decision::Decision,
    services::metrics::record_decision,
    AppState,
};

/// Extract a named cookie value from request headers.
pub fn get_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    let prefix = format!("{name}=");
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .find_map(|part| part.trim().strip_prefix(&prefix).map(str::to_string))
}

/// Path as a client router resolves it: percent-decoded once, empty and `.`
/// segments dropped, `..` applied, no trailing slash.
pub fn normalize_path(raw: &str) -> String {
    let decoded = percent_decode(raw);
    let mut segments: Vec<&str> = Vec::new();
    for segment in decoded.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    format!("/{}", segments.join("/"))
}

/// Malformed `%` sequences are kept as literal text.
fn percent_decode(raw: &str) -> String {
    let bytes = raw.as_bytes();
    let mut out: Vec<u8> = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let escaped = bytes
            .get(i + 1..i + 3)
            .filter(|hex| hex.iter().all(u8::is_ascii_hexdigit))
            .and_then(|hex| std::str::from_utf8(hex).ok())
            .and_then(|hex| u8::from_str_radix(hex, 16).ok());

        match (bytes[i], escaped) {
            (b'%', Some(value)) => {
                out.push(value);
                i += 3;
            }
            (b, _) => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// Runs the access rules on every request before it reaches a handler.
pub async fn enforce_access(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let token = get_cookie(request.headers(), &state.config.auth_cookie);
    let session = state
        .sessions
        .session(token.as_deref(), Utc::now().timestamp());

    let path = normalize_path(request.uri().path());
    let decision = state.rules.evaluate(&path, session.as_ref());
    record_decision(&decision);

    match decision {
        Decision::Continue => next.run(request).await,
        Decision::Redirect(target) => {
            tracing::debug!(
                path = %path,
                raw_path = request.uri().path(),
                area = state.rules.area_for(&path).unwrap_or("-"),
                role = ?session.as_ref().and_then(|c| c.role),
                authenticated = session.is_some(),
                target = target.path(),
                "Access redirect"
            );
            Redirect::temporary(target.path()).into_response()
        }
    }
}
