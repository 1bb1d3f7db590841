use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

use crate::AppState;

pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let upstream = if state.upstream.is_some() { "proxy" } else { "static" };
    (
        StatusCode::OK,
        Json(json!({ "status": "ok", "upstream": upstream })),
    )
}
