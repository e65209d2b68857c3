//! Bearer-token cache for the OAuth client-credentials flow.
//!
//! Owned by the client instance rather than living at module scope, with an
//! explicit invalidate hook, so independent client instances (and tests)
//! never share cached state.

use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};

/// Tokens are treated as expired this long before their actual expiry, so a
/// token returned from the cache is still valid for at least the next
/// request.
pub const EXPIRY_SKEW_SECS: i64 = 60;

/// Fallback lifetime when the token endpoint omits `expires_in`.
pub const DEFAULT_EXPIRES_IN_SECS: i64 = 3600;

#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    expires_at: DateTime<Utc>,
}

/// Instance-owned token cache.
#[derive(Debug, Default)]
pub struct TokenCache {
    inner: Mutex<Option<CachedToken>>,
}

impl TokenCache {
    /// Return the cached token if it is still valid at `now`.
    pub fn get_valid(&self, now: DateTime<Utc>) -> Option<String> {
        let inner = self.inner.lock().expect("token cache lock poisoned");
        inner
            .as_ref()
            .filter(|cached| now < cached.expires_at)
            .map(|cached| cached.token.clone())
    }

    /// Cache a freshly issued token. `expires_in_secs` falls back to
    /// [`DEFAULT_EXPIRES_IN_SECS`] when the endpoint omitted it; the skew
    /// is subtracted here so `get_valid` stays a plain comparison.
    pub fn store(&self, token: impl Into<String>, expires_in_secs: Option<i64>, now: DateTime<Utc>) {
        let lifetime = expires_in_secs.unwrap_or(DEFAULT_EXPIRES_IN_SECS);
        let expires_at = now + Duration::seconds(lifetime - EXPIRY_SKEW_SECS);
        let mut inner = self.inner.lock().expect("token cache lock poisoned");
        *inner = Some(CachedToken {
            token: token.into(),
            expires_at,
        });
    }

    /// Drop the cached token, forcing a refresh on the next request.
    pub fn invalidate(&self) {
        let mut inner = self.inner.lock().expect("token cache lock poisoned");
        *inner = None;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
