use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Cookie carrying the session token.
    pub auth_cookie: String,
    /// When set, token signatures are verified (HS256) before claims are trusted.
    pub jwt_secret: Option<String>,
    /// JSON rule table overriding the built-in DevCore routes.
    pub access_rules_path: Option<String>,
    /// Origin of the web client server; allowed requests are proxied there.
    pub upstream_url: Option<String>,
    /// Served when no upstream is configured.
    pub static_dir: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".into())
                .parse()?,
            auth_cookie: env::var("AUTH_COOKIE_NAME")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "token".into()),
            jwt_secret: env::var("JWT_SECRET").ok().filter(|s| !s.is_empty()),
            access_rules_path: env::var("ACCESS_RULES_PATH").ok().filter(|s| !s.is_empty()),
            upstream_url: env::var("UPSTREAM_URL").ok().filter(|s| !s.is_empty()),
            static_dir: env::var("STATIC_DIR").unwrap_or_else(|_| "./dist".into()),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 3000,
            auth_cookie: "token".into(),
            jwt_secret: None,
            access_rules_path: None,
            upstream_url: None,
            static_dir: "./dist".into(),
        }
    }
}
