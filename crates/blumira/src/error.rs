/// Errors from the upstream API layer.
///
/// The taxonomy keeps "credentials absent" distinguishable from
/// "credentials rejected" so the presentation layer can route the operator
/// to the credentials flow instead of showing a generic upstream failure.
#[derive(Debug, thiserror::Error)]
pub enum BlumiraError {
    /// Credentials are not configured at all.
    #[error("BLUMIRA_CLIENT_ID and BLUMIRA_CLIENT_SECRET are required")]
    MissingCredentials,

    /// The token endpoint rejected the configured credentials, or returned
    /// a body without an access token.
    #[error("Authentication failed ({status}): {body}")]
    Authentication {
        /// HTTP status code from the token endpoint.
        status: u16,
        /// Raw response body for operator-visible detail.
        body: String,
    },

    /// A REST call returned a non-2xx status.
    #[error("API request failed ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// A 2xx response carried a body that does not match the expected
    /// shape.
    #[error("Unexpected response shape: {0}")]
    Decode(#[from] serde_json::Error),
}
