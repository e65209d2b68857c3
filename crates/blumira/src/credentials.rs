//! Process-lifetime credential storage.
//!
//! Credentials arrive from the environment at startup and can be replaced
//! at runtime through the settings flow. They are held in memory only —
//! there is no durable credential persistence. Each flag in
//! [`CredentialStatus`] is reported separately because the settings view
//! tells the operator exactly which half is missing.

use std::sync::RwLock;

use serde::Serialize;

use crate::error::BlumiraError;

/// Environment variable holding the OAuth client id.
pub const CLIENT_ID_VAR: &str = "BLUMIRA_CLIENT_ID";
/// Environment variable holding the OAuth client secret.
pub const CLIENT_SECRET_VAR: &str = "BLUMIRA_CLIENT_SECRET";

/// A complete credential pair.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
}

/// Presence flags for the credentials view.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CredentialStatus {
    pub has_credentials: bool,
    pub has_client_id: bool,
    pub has_client_secret: bool,
}

#[derive(Debug, Default)]
struct Stored {
    client_id: Option<String>,
    client_secret: Option<String>,
}

/// In-memory credential store, shared behind the client instance.
#[derive(Debug, Default)]
pub struct CredentialStore {
    inner: RwLock<Stored>,
}

impl CredentialStore {
    /// Seed from the process environment. Empty values count as absent.
    pub fn from_env() -> Self {
        let read = |var: &str| std::env::var(var).ok().filter(|v| !v.is_empty());
        Self {
            inner: RwLock::new(Stored {
                client_id: read(CLIENT_ID_VAR),
                client_secret: read(CLIENT_SECRET_VAR),
            }),
        }
    }

    /// Construct with an explicit pair (tests, programmatic setup).
    pub fn with(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            inner: RwLock::new(Stored {
                client_id: Some(client_id.into()),
                client_secret: Some(client_secret.into()),
            }),
        }
    }

    /// Replace both values for the rest of the process lifetime.
    pub fn set(&self, client_id: impl Into<String>, client_secret: impl Into<String>) {
        let mut inner = self.inner.write().expect("credential store lock poisoned");
        inner.client_id = Some(client_id.into());
        inner.client_secret = Some(client_secret.into());
    }

    /// The configured pair, or [`BlumiraError::MissingCredentials`] when
    /// either half is absent.
    pub fn get(&self) -> Result<Credentials, BlumiraError> {
        let inner = self.inner.read().expect("credential store lock poisoned");
        match (&inner.client_id, &inner.client_secret) {
            (Some(client_id), Some(client_secret)) => Ok(Credentials {
                client_id: client_id.clone(),
                client_secret: client_secret.clone(),
            }),
            _ => Err(BlumiraError::MissingCredentials),
        }
    }

    /// Per-field presence flags.
    pub fn status(&self) -> CredentialStatus {
        let inner = self.inner.read().expect("credential store lock poisoned");
        let has_client_id = inner.client_id.is_some();
        let has_client_secret = inner.client_secret.is_some();
        CredentialStatus {
            has_credentials: has_client_id && has_client_secret,
            has_client_id,
            has_client_secret,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
