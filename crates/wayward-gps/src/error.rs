use thiserror::Error;

/// Errors returned by location providers.
#[derive(Debug, Error)]
pub enum GpsError {
    /// Network or TLS failure from the underlying HTTP client, including
    /// non-2xx statuses surfaced via `error_for_status`.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The provider cannot serve requests at all (bad base URL, shut down).
    #[error("location provider unavailable: {reason}")]
    Unavailable { reason: String },
}
