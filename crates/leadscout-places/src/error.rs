use thiserror::Error;

use crate::types::ApiStatus;

/// Errors produced while talking to the places, details, and geocoding endpoints.
#[derive(Debug, Error)]
pub enum PlacesError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// HTTP 429 from the upstream API.
    #[error("rate limited by {endpoint}")]
    RateLimited { endpoint: String },

    /// HTTP 5xx from the upstream API.
    #[error("server error {status} from {endpoint}")]
    ServerError { status: u16, endpoint: String },

    /// Any other non-2xx HTTP status (400, 403, 404, ...).
    #[error("client error {status} from {endpoint}")]
    ClientError { status: u16, endpoint: String },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The API answered with a status that will not change on retry
    /// (`INVALID_REQUEST`, `REQUEST_DENIED`, `NOT_FOUND`, ...).
    #[error("places API rejected request with {status}: {message}")]
    Rejected { status: ApiStatus, message: String },

    /// The API answered with `OVER_QUERY_LIMIT` or `UNKNOWN_ERROR`.
    #[error("places API transient status {status}")]
    Transient { status: ApiStatus },

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}
