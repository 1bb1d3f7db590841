pub mod config;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use config::Config;
use routes::upstream::Upstream;
use services::{access::AccessRules, session::SessionDecoder};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub rules: Arc<AccessRules>,
    pub sessions: Arc<SessionDecoder>,
    pub upstream: Option<Upstream>,
}

impl AppState {
    pub fn new(config: Config, rules: AccessRules) -> anyhow::Result<Self> {
        let sessions = SessionDecoder::from_secret(config.jwt_secret.as_deref());
        let upstream = config
            .upstream_url
            .as_deref()
            .map(Upstream::new)
            .transpose()?;

        Ok(Self {
            config: Arc::new(config),
            rules: Arc::new(rules),
            sessions: Arc::new(sessions),
            upstream,
        })
    }
}
