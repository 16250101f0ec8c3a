//! HTTP client for the places search, place details, and geocoding APIs.
//!
//! Wraps `reqwest` with key management, the status-aware retry policy, and
//! typed response decoding. Every endpoint checks the `"status"` field of the
//! JSON envelope in addition to the HTTP status.

use std::time::Duration;

use reqwest::{Client, StatusCode, Url};
use serde_json::Value;

use crate::error::PlacesError;
use crate::grid::GridPoint;
use crate::query::{PageRequest, PlacesApi};
use crate::retry::{retry_with_backoff, RetryPolicy};
use crate::types::{ApiStatus, DetailsResponse, GeocodeResponse, PlaceRecord, SearchResponse};

const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api/";
const TEXT_SEARCH_PATH: &str = "place/textsearch/json";
const DETAILS_PATH: &str = "place/details/json";
const GEOCODE_PATH: &str = "geocode/json";

/// Fields requested from the details endpoint.
const DETAILS_FIELDS: &str =
    "place_id,name,formatted_address,rating,formatted_phone_number,website,opening_hours,url";

#[derive(Debug, Clone)]
struct Endpoints {
    text_search: Url,
    details: Url,
    geocode: Url,
}

/// Client for the keyed places and geocoding endpoints.
///
/// Use [`PlacesClient::new`] for production or [`PlacesClient::with_base_url`]
/// to point at a mock server in tests.
pub struct PlacesClient {
    client: Client,
    api_key: String,
    endpoints: Endpoints,
    retry: RetryPolicy,
}

impl PlacesClient {
    /// Creates a client pointed at the production Google Maps APIs.
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        api_key: &str,
        timeout_secs: u64,
        user_agent: &str,
        retry: RetryPolicy,
    ) -> Result<Self, PlacesError> {
        Self::with_base_url(api_key, timeout_secs, user_agent, retry, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Http`] if the `reqwest::Client` cannot be
    /// built, or [`PlacesError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        user_agent: &str,
        retry: RetryPolicy,
        base_url: &str,
    ) -> Result<Self, PlacesError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // Exactly one trailing slash, so `join` appends rather than replacing
        // the last path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base = Url::parse(&normalised).map_err(|e| invalid_base_url(base_url, &e))?;
        let join = |path: &str| base.join(path).map_err(|e| invalid_base_url(base_url, &e));
        let endpoints = Endpoints {
            text_search: join(TEXT_SEARCH_PATH)?,
            details: join(DETAILS_PATH)?,
            geocode: join(GEOCODE_PATH)?,
        };

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            endpoints,
            retry,
        })
    }

    /// Issues a GET with the retry policy applied and returns the JSON body.
    ///
    /// Returns `None` when the request was rejected outright (400, 403,
    /// `INVALID_REQUEST`, `REQUEST_DENIED`) or when every attempt failed with
    /// a transient error. The failure is logged here; callers only need to
    /// treat `None` as "this sub-call produced nothing".
    pub async fn request_json(&self, url: &Url) -> Option<Value> {
        let endpoint = url.path().to_owned();
        match retry_with_backoff(&self.retry, &endpoint, || self.fetch_once(url)).await {
            Ok(body) => Some(body),
            Err(err) => {
                tracing::error!(endpoint, error = %err, "places request failed");
                None
            }
        }
    }

    /// Builds a request URL with the API key and percent-encoded parameters.
    fn build_url(&self, endpoint: &Url, params: &[(&str, String)]) -> Url {
        let mut url = endpoint.clone();
        {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in params {
                pairs.append_pair(k, v);
            }
            pairs.append_pair("key", &self.api_key);
        }
        url
    }

    /// One attempt: classify the HTTP status, parse JSON, check the envelope.
    async fn fetch_once(&self, url: &Url) -> Result<Value, PlacesError> {
        let endpoint = url.path().to_owned();
        // The query string carries the key; transport errors must not echo it.
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(reqwest::Error::without_url)?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(PlacesError::RateLimited { endpoint });
        }
        if status.is_server_error() {
            return Err(PlacesError::ServerError {
                status: status.as_u16(),
                endpoint,
            });
        }
        if !status.is_success() {
            return Err(PlacesError::ClientError {
                status: status.as_u16(),
                endpoint,
            });
        }

        let body = response.text().await.map_err(reqwest::Error::without_url)?;
        let value: Value = serde_json::from_str(&body).map_err(|e| PlacesError::Deserialize {
            context: endpoint,
            source: e,
        })?;
        Self::check_api_status(&value)?;
        Ok(value)
    }

    /// Maps the envelope `"status"` onto the retry taxonomy.
    ///
    /// `OK` and `ZERO_RESULTS` pass; `OVER_QUERY_LIMIT` and `UNKNOWN_ERROR`
    /// are transient; everything else is a rejection.
    fn check_api_status(body: &Value) -> Result<(), PlacesError> {
        let Some(raw) = body.get("status").and_then(Value::as_str) else {
            return Ok(());
        };
        let status = ApiStatus::from_wire(raw);
        match status {
            ApiStatus::Ok | ApiStatus::ZeroResults => Ok(()),
            ApiStatus::OverQueryLimit | ApiStatus::UnknownError => {
                Err(PlacesError::Transient { status })
            }
            ApiStatus::InvalidRequest
            | ApiStatus::RequestDenied
            | ApiStatus::NotFound
            | ApiStatus::Unrecognized => {
                let message = body
                    .get("error_message")
                    .and_then(Value::as_str)
                    .unwrap_or("no error message")
                    .to_owned();
                Err(PlacesError::Rejected { status, message })
            }
        }
    }
}

fn invalid_base_url(url: &str, reason: &impl std::fmt::Display) -> PlacesError {
    PlacesError::InvalidBaseUrl {
        url: url.to_owned(),
        reason: reason.to_string(),
    }
}

impl PlacesApi for PlacesClient {
    async fn search_page(&self, request: &PageRequest<'_>) -> Option<SearchResponse> {
        let url = self.build_url(&self.endpoints.text_search, &request.params());
        let body = self.request_json(&url).await?;
        serde_json::from_value(body)
            .map_err(|e| tracing::error!(error = %e, "malformed text search response"))
            .ok()
    }

    async fn place_details(&self, place_id: &str) -> Option<PlaceRecord> {
        let params = [
            ("place_id", place_id.to_owned()),
            ("fields", DETAILS_FIELDS.to_owned()),
        ];
        let url = self.build_url(&self.endpoints.details, &params);
        let body = self.request_json(&url).await?;
        let parsed: DetailsResponse = serde_json::from_value(body)
            .map_err(|e| tracing::error!(place_id, error = %e, "malformed details response"))
            .ok()?;
        if parsed.status != ApiStatus::Ok {
            tracing::warn!(place_id, status = %parsed.status, "details lookup returned no result");
            return None;
        }
        parsed.result
    }

    async fn geocode(&self, location: &str) -> Option<GridPoint> {
        let url = self.build_url(&self.endpoints.geocode, &[("address", location.to_owned())]);
        let body = match self.fetch_once(&url).await {
            Ok(body) => body,
            Err(err) => {
                tracing::error!(location, error = %err, "geocoding request failed");
                return None;
            }
        };
        let parsed: GeocodeResponse = serde_json::from_value(body)
            .map_err(|e| tracing::error!(location, error = %e, "malformed geocoding response"))
            .ok()?;
        let point = parsed.first_point();
        if point.is_none() {
            tracing::error!(location, status = %parsed.status, "geocoding returned no coordinates");
        }
        point
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
