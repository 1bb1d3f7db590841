pub mod health;
pub mod metrics;
pub mod upstream;

use std::path::Path;

use axum::{middleware::from_fn_with_state, routing::get, Router};
use tower_http::{
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

use crate::{middleware::access::enforce_access, AppState};

/// Operational routes plus the pass-through fallback, all behind the access gate.
pub fn router(state: AppState) -> Router {
    let app = Router::new()
        .route("/health", get(health::health_check))
        .route("/metrics", get(metrics::metrics_handler));

    let app = if state.upstream.is_some() {
        app.fallback(upstream::proxy)
    } else {
        let dir = state.config.static_dir.clone();
        // Client-side routes have no file of their own; hand them the SPA shell.
        let index = Path::new(&dir).join("index.html");
        app.fallback_service(ServeDir::new(dir).fallback(ServeFile::new(index)))
    };

    app.layer(from_fn_with_state(state.clone(), enforce_access))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
