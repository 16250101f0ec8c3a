//! Places, details, and geocoding response types.
//!
//! Every endpoint wraps its payload in a `{"status": "...", ...}` envelope.
//! The status is modelled as a closed enum so branching on it is exhaustive.

use serde::{Deserialize, Serialize};

use crate::grid::GridPoint;

/// The `status` field carried by every places/geocoding response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApiStatus {
    Ok,
    ZeroResults,
    OverQueryLimit,
    InvalidRequest,
    RequestDenied,
    UnknownError,
    NotFound,
    #[serde(other)]
    Unrecognized,
}

impl ApiStatus {
    /// Parses the raw `status` string without going through serde.
    #[must_use]
    pub fn from_wire(raw: &str) -> Self {
        match raw {
            "OK" => Self::Ok,
            "ZERO_RESULTS" => Self::ZeroResults,
            "OVER_QUERY_LIMIT" => Self::OverQueryLimit,
            "INVALID_REQUEST" => Self::InvalidRequest,
            "REQUEST_DENIED" => Self::RequestDenied,
            "UNKNOWN_ERROR" => Self::UnknownError,
            "NOT_FOUND" => Self::NotFound,
            _ => Self::Unrecognized,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::ZeroResults => "ZERO_RESULTS",
            Self::OverQueryLimit => "OVER_QUERY_LIMIT",
            Self::InvalidRequest => "INVALID_REQUEST",
            Self::RequestDenied => "REQUEST_DENIED",
            Self::UnknownError => "UNKNOWN_ERROR",
            Self::NotFound => "NOT_FOUND",
            Self::Unrecognized => "UNRECOGNIZED",
        }
    }
}

impl std::fmt::Display for ApiStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// textsearch
// ---------------------------------------------------------------------------

/// One page of a text search.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    pub status: ApiStatus,
    #[serde(default)]
    pub results: Vec<PlaceRecord>,
    #[serde(default)]
    pub next_page_token: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
}

impl SearchResponse {
    /// Continuation token, ignoring the empty string some responses carry.
    #[must_use]
    pub fn continuation(&self) -> Option<&str> {
        self.next_page_token
            .as_deref()
            .filter(|token| !token.trim().is_empty())
    }
}

/// A business as returned by the search or details endpoints.
///
/// `place_id` is the system-wide uniqueness key. Search results carry only a
/// subset of the fields; the details endpoint fills in the rest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaceRecord {
    #[serde(default)]
    pub place_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub formatted_address: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub formatted_phone_number: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub opening_hours: Option<OpeningHours>,
    /// Google Maps URL for the place.
    #[serde(default)]
    pub url: Option<String>,
}

impl PlaceRecord {
    /// True when the details endpoint could still contribute contact fields.
    #[must_use]
    pub fn needs_details(&self) -> bool {
        self.formatted_phone_number.is_none() || self.website.is_none()
    }

    /// Fills fields missing here from a details lookup of the same place.
    #[must_use]
    pub fn merge_details(mut self, details: PlaceRecord) -> Self {
        self.name = self.name.or(details.name);
        self.formatted_address = self.formatted_address.or(details.formatted_address);
        self.rating = self.rating.or(details.rating);
        self.formatted_phone_number = self
            .formatted_phone_number
            .or(details.formatted_phone_number);
        self.website = self.website.or(details.website);
        self.url = self.url.or(details.url);
        let has_weekday_text = self
            .opening_hours
            .as_ref()
            .is_some_and(|h| !h.weekday_text.is_empty());
        if !has_weekday_text && details.opening_hours.is_some() {
            self.opening_hours = details.opening_hours;
        }
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OpeningHours {
    #[serde(default)]
    pub open_now: Option<bool>,
    #[serde(default)]
    pub weekday_text: Vec<String>,
}

// ---------------------------------------------------------------------------
// details
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct DetailsResponse {
    pub status: ApiStatus,
    #[serde(default)]
    pub result: Option<PlaceRecord>,
    #[serde(default)]
    pub error_message: Option<String>,
}

// ---------------------------------------------------------------------------
// geocode
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct GeocodeResponse {
    pub status: ApiStatus,
    #[serde(default)]
    pub results: Vec<GeocodeResult>,
    #[serde(default)]
    pub error_message: Option<String>,
}

impl GeocodeResponse {
    /// The first result's coordinates, only when the status is `OK`.
    #[must_use]
    pub fn first_point(&self) -> Option<GridPoint> {
        if self.status != ApiStatus::Ok {
            return None;
        }
        self.results.first().map(|r| GridPoint {
            lat: r.geometry.location.lat,
            lng: r.geometry.location.lng,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct GeocodeResult {
    pub geometry: Geometry,
}

#[derive(Debug, Deserialize)]
pub struct Geometry {
    pub location: LatLng,
}

#[derive(Debug, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}
