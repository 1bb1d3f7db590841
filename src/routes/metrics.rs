use axum::{
    http::{header, StatusCode},
    response::IntoResponse,
};
use prometheus::{Encoder, TextEncoder};

use crate::services::metrics::{DECISIONS_COUNTER, TOKEN_REJECTIONS_COUNTER};

/// GET /metrics: Prometheus text exposition of the gate counters.
pub async fn metrics_handler() -> Result<impl IntoResponse, StatusCode> {
    // Register the counters even if no request has touched them yet.
    lazy_static::initialize(&DECISIONS_COUNTER);
    lazy_static::initialize(&TOKEN_REJECTIONS_COUNTER);

    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder
        .encode(&prometheus::gather(), &mut buffer)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok(([(header::CONTENT_TYPE, encoder.format_type().to_string())], buffer))
}
