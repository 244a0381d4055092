use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind the HTTP server to, e.g. "0.0.0.0"
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Public base URL shown in front of every short code, e.g. "http://localhost:3000".
    /// Must NOT have a trailing slash.
    pub base_url: String,

    /// How many hours a browser session (and its URLs) is kept after creation
    pub session_duration_hours: u64,

    /// Upper bound on sessions held in memory; the oldest is evicted beyond it
    pub max_sessions: usize,
}

impl AppConfig {
    /// Load configuration from environment variables (populated by dotenvy before this is called).
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any key lookup.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let port = var("PORT")
            .unwrap_or_else(|| "3000".into())
            .parse::<u16>()
            .context("PORT must be a valid port number (1–65535)")?;

        let session_duration_hours = var("SESSION_DURATION_HOURS")
            .unwrap_or_else(|| "24".into())
            .parse::<u64>()
            .unwrap_or(24);

        if session_duration_hours == 0 {
            anyhow::bail!("SESSION_DURATION_HOURS must be at least 1");
        }

        let max_sessions = var("MAX_SESSIONS")
            .unwrap_or_else(|| "10000".into())
            .parse::<usize>()
            .context("MAX_SESSIONS must be a positive number")?;

        if max_sessions == 0 {
            anyhow::bail!("MAX_SESSIONS must be at least 1");
        }

        let base_url = var("BASE_URL")
            .unwrap_or_else(|| format!("http://localhost:{port}"))
            .trim_end_matches('/')
            .to_owned();

        Ok(Self {
            host: var("HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            base_url,
            session_duration_hours,
            max_sessions,
        })
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 3000,
            base_url: "http://localhost:3000".into(),
            session_duration_hours: 24,
            max_sessions: 10_000,
        }
    }
}
