//! HTTP client for a remote GPS service.
//!
//! Wraps `reqwest` with typed response deserialization and retry on transient
//! failures. The service exposes `GET /users/{id}/location` and
//! `GET /attractions`; both bodies are plain JSON renderings of the core
//! domain types.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use wayward_core::{Attraction, VisitedLocation};

use crate::error::GpsError;
use crate::retry::retry_with_backoff;
use crate::LocationProvider;

/// Client for a remote GPS service.
///
/// The base URL comes from configuration; tests point it at a wiremock
/// server. Transient failures (timeouts, connect errors, 5xx) are retried
/// with exponential back-off before surfacing.
pub struct GpsHttpClient {
    client: Client,
    base_url: String,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl GpsHttpClient {
    /// Creates a new client for the GPS service at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`GpsError::Http`] if the underlying `reqwest::Client` cannot
    /// be constructed, or [`GpsError::Unavailable`] if `base_url` is not a
    /// valid URL.
    pub fn new(
        base_url: &str,
        timeout_secs: u64,
        max_retries: u32,
        backoff_base_ms: u64,
    ) -> Result<Self, GpsError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("wayward/0.1 (location-tracking)")
            .build()?;

        let trimmed = base_url.trim_end_matches('/');
        Url::parse(trimmed).map_err(|e| GpsError::Unavailable {
            reason: format!("invalid base URL '{base_url}': {e}"),
        })?;

        Ok(Self {
            client,
            base_url: trimmed.to_owned(),
            max_retries,
            backoff_base_ms,
        })
    }

    fn location_url(&self, user_id: Uuid) -> String {
        format!("{}/users/{user_id}/location", self.base_url)
    }

    fn attractions_url(&self) -> String {
        format!("{}/attractions", self.base_url)
    }

    /// Sends a GET request through the retry wrapper and parses the body.
    ///
    /// The deserialize step sits outside the retry loop: a malformed body is
    /// not going to parse on a second fetch.
    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, GpsError> {
        let body = retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            let client = self.client.clone();
            let url = url.to_owned();
            async move {
                let response = client.get(&url).send().await?;
                let response = response.error_for_status()?;
                Ok::<String, GpsError>(response.text().await?)
            }
        })
        .await?;

        serde_json::from_str(&body).map_err(|e| GpsError::Deserialize {
            context: url.to_owned(),
            source: e,
        })
    }
}

#[async_trait]
impl LocationProvider for GpsHttpClient {
    async fn current_location(&self, user_id: Uuid) -> Result<VisitedLocation, GpsError> {
        self.get_json(&self.location_url(user_id)).await
    }

    async fn attractions(&self) -> Result<Vec<Attraction>, GpsError> {
        self.get_json(&self.attractions_url()).await
    }
}
