use std::sync::Arc;

use mspdash_blumira::BlumiraClient;
use mspdash_store::AnnotationStore;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Local annotation store (the only durable state this server owns).
    pub store: Arc<AnnotationStore>,
    /// Upstream API client with its credential store and token cache.
    pub blumira: Arc<BlumiraClient>,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
}
