use std::path::PathBuf;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Path of the annotation store document.
    pub annotations_path: PathBuf,
}

/// Default location of the annotation store document. The file stem is the
/// store's key in the durable medium.
pub const DEFAULT_ANNOTATIONS_PATH: &str = "data/blumira-finding-annotations.json";

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                                  |
    /// |------------------------|------------------------------------------|
    /// | `HOST`                 | `0.0.0.0`                                |
    /// | `PORT`                 | `3000`                                   |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`                  |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                                     |
    /// | `ANNOTATIONS_PATH`     | `data/blumira-finding-annotations.json`  |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let annotations_path = std::env::var("ANNOTATIONS_PATH")
            .unwrap_or_else(|_| DEFAULT_ANNOTATIONS_PATH.into())
            .into();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            annotations_path,
        }
    }
}
