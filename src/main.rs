use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use devcore_gate::{config::Config, routes, services::access::AccessRules, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let rules = AccessRules::load(config.access_rules_path.as_deref())?;
    info!(
        source = config.access_rules_path.as_deref().unwrap_or("built-in"),
        public = rules.public_paths.len(),
        areas = rules.guarded_areas.len(),
        "Access rules loaded"
    );

    let addr = format!("{}:{}", config.host, config.port);
    let state = AppState::new(config, rules)?;

    if state.sessions.verifies_signature() {
        info!("Session tokens verified with HS256");
    } else {
        info!("JWT_SECRET not set, session tokens decoded without signature check");
    }

    match &state.upstream {
        Some(upstream) => info!("Proxying allowed requests to {}", upstream.base()),
        None => info!("Serving static bundle from {}", state.config.static_dir),
    }

    let app = routes::router(state);

    info!("DevCore gate listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
